//! In-memory lease table.
//!
//! Leases are kept for the life of the process. They end when revoked; expiry
//! is advisory and only reported back to callers.

use std::{collections::HashMap, time::Duration};

use jiff::Timestamp;
use serde::Serialize;
use tokio::sync::RwLock;
use uuid::Uuid;

use grafana_cloud_secrets::credentials::{LeaseMetadata, LeaseTtl};

/// Host defaults applied when a role leaves its TTLs unset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LeasePolicy {
    pub default_ttl: Duration,
    pub max_ttl: Duration,
}

impl Default for LeasePolicy {
    fn default() -> Self {
        Self {
            default_ttl: Duration::from_secs(3_600),
            max_ttl: Duration::from_secs(86_400),
        }
    }
}

/// A recorded lease.
#[derive(Debug, Clone)]
pub(crate) struct Lease {
    internal: LeaseMetadata,
    issued_at: Timestamp,
    max_ttl: Duration,
}

impl Lease {
    pub(crate) fn internal(&self) -> &LeaseMetadata {
        &self.internal
    }
}

/// Duration granted to a lease on issue or renewal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub(crate) struct LeaseGrant {
    pub lease_id: Uuid,

    /// Granted duration in seconds.
    pub lease_duration: u64,

    pub renewable: bool,
}

#[derive(Debug, Default)]
pub(crate) struct LeaseTable {
    policy: LeasePolicy,
    leases: RwLock<HashMap<Uuid, Lease>>,
}

impl LeaseTable {
    pub(crate) fn new(policy: LeasePolicy) -> Self {
        Self {
            policy,
            leases: RwLock::default(),
        }
    }

    /// Record a newly issued credential.
    pub(crate) async fn record(
        &self,
        internal: LeaseMetadata,
        ttl: LeaseTtl,
        now: Timestamp,
    ) -> LeaseGrant {
        let lease_id = Uuid::now_v7();
        let max_ttl = ttl.max_ttl.unwrap_or(self.policy.max_ttl);

        let grant = self.grant(lease_id, ttl, max_ttl, Duration::ZERO);

        self.leases.write().await.insert(
            lease_id,
            Lease {
                internal,
                issued_at: now,
                max_ttl,
            },
        );

        grant
    }

    /// Internal data of the lease `lease_id`.
    pub(crate) async fn get(&self, lease_id: Uuid) -> Option<LeaseMetadata> {
        self.leases
            .read()
            .await
            .get(&lease_id)
            .map(|lease| lease.internal.clone())
    }

    /// Extend the lease by `ttl`, never past its maximum lifetime.
    pub(crate) async fn extend(
        &self,
        lease_id: Uuid,
        ttl: LeaseTtl,
        now: Timestamp,
    ) -> Option<LeaseGrant> {
        let mut leases = self.leases.write().await;
        let lease = leases.get_mut(&lease_id)?;

        if let Some(max_ttl) = ttl.max_ttl {
            lease.max_ttl = max_ttl;
        }

        let elapsed = Duration::try_from(now.duration_since(lease.issued_at)).unwrap_or_default();

        Some(self.grant(lease_id, ttl, lease.max_ttl, elapsed))
    }

    /// Take the lease out of the table. Only one caller gets it.
    pub(crate) async fn take(&self, lease_id: Uuid) -> Option<Lease> {
        self.leases.write().await.remove(&lease_id)
    }

    /// Put back a lease that was taken but not ended.
    pub(crate) async fn restore(&self, lease_id: Uuid, lease: Lease) {
        self.leases.write().await.insert(lease_id, lease);
    }

    fn grant(&self, lease_id: Uuid, ttl: LeaseTtl, max_ttl: Duration, elapsed: Duration) -> LeaseGrant {
        let requested = ttl.ttl.unwrap_or(self.policy.default_ttl);
        let remaining = max_ttl.saturating_sub(elapsed);
        let granted = requested.min(remaining);

        LeaseGrant {
            lease_id,
            lease_duration: granted.as_secs(),
            renewable: granted < remaining,
        }
    }
}
