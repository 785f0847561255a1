//! Server configuration module

use clap::Parser;

use crate::config::{
    leases::LeaseConfig, logging::LoggingConfig, server::ServerRuntimeConfig,
    upstream::UpstreamConfig,
};

pub(crate) mod leases;
pub(crate) mod logging;
pub(crate) mod server;
pub(crate) mod upstream;

/// Development host configuration
#[derive(Debug, Parser)]
#[command(
    name = "grafana-cloud-secrets",
    about = "Grafana Cloud credential engine development host",
    long_about = None
)]
pub struct ServerConfig {
    /// Server network settings.
    #[command(flatten)]
    pub server: ServerRuntimeConfig,

    /// Logging output settings.
    #[command(flatten)]
    pub logging: LoggingConfig,

    /// Grafana Cloud API client settings.
    #[command(flatten)]
    pub upstream: UpstreamConfig,

    /// Host lease defaults.
    #[command(flatten)]
    pub leases: LeaseConfig,
}

impl ServerConfig {
    /// Load configuration from environment and CLI arguments
    pub fn load() -> Result<Self, clap::Error> {
        // Load .env file if present (ignore if missing)
        _ = dotenvy::dotenv();

        Self::try_parse()
    }

    /// Get the socket address for binding
    #[must_use]
    pub fn socket_addr(&self) -> String {
        self.server.socket_addr()
    }
}
