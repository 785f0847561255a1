//! Lease Config

use std::time::Duration;

use clap::Args;

use crate::lease_table::LeasePolicy;

/// Lease durations used when a role leaves them unset.
#[derive(Debug, Args)]
pub struct LeaseConfig {
    /// Default lease duration in seconds
    #[arg(long, env = "DEFAULT_LEASE_TTL_SECONDS", default_value_t = 3_600_u64)]
    pub default_lease_ttl_seconds: u64,

    /// Maximum lease duration in seconds
    #[arg(long, env = "MAX_LEASE_TTL_SECONDS", default_value_t = 86_400_u64)]
    pub max_lease_ttl_seconds: u64,
}

impl LeaseConfig {
    #[must_use]
    pub fn policy(&self) -> LeasePolicy {
        LeasePolicy {
            default_ttl: Duration::from_secs(self.default_lease_ttl_seconds),
            max_ttl: Duration::from_secs(self.max_lease_ttl_seconds),
        }
    }
}
