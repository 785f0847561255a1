//! Upstream Config

use std::time::Duration;

use clap::Args;

/// Grafana Cloud API client settings.
#[derive(Debug, Args)]
pub struct UpstreamConfig {
    /// Timeout in seconds for each request to Grafana Cloud
    #[arg(long, env = "UPSTREAM_TIMEOUT_SECONDS", default_value_t = 30_u64)]
    pub upstream_timeout_seconds: u64,
}

impl UpstreamConfig {
    #[must_use]
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.upstream_timeout_seconds)
    }
}
