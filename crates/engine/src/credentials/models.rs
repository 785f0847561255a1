//! Issued credential and lease models.

use std::{collections::BTreeMap, time::Duration};

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{
    credentials::CredentialsError,
    roles::{CredentialKind, Role},
    secret::SecretString,
};

/// A key created upstream for a caller.
#[derive(Debug, Clone)]
pub struct IssuedCredential {
    /// Upstream identifier. Numeric for instance keys, possibly empty for
    /// organisation keys.
    pub external_id: String,

    /// Generated `<role>_<uuid>` name.
    pub external_name: String,

    /// Key value.
    pub token: SecretString,

    /// Issuance protocol used.
    pub kind: CredentialKind,

    /// Stack the key is bound to, for instance keys.
    pub target_instance: Option<String>,

    /// Configured telemetry users and URLs, surfaced for convenience.
    pub telemetry: BTreeMap<String, String>,
}

impl IssuedCredential {
    /// Payload handed to the caller once. It is the only place the token appears.
    #[must_use]
    pub fn response(&self) -> CredentialResponse {
        CredentialResponse {
            token: self.token.clone(),
            kind: self.kind,
            telemetry: self.telemetry.clone(),
        }
    }

    /// Non-secret data the host keeps with the lease.
    #[must_use]
    pub fn lease_metadata(&self, role: &str) -> LeaseMetadata {
        LeaseMetadata {
            id: self.external_id.clone(),
            name: self.external_name.clone(),
            kind: self.kind,
            stack_slug: self.target_instance.clone(),
            role: Some(role.to_string()),
        }
    }
}

/// Response data returned to the caller of an issue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CredentialResponse {
    /// Key value.
    pub token: SecretString,

    /// Credential kind.
    #[serde(rename = "type")]
    pub kind: CredentialKind,

    /// Telemetry users and URLs.
    #[serde(flatten)]
    pub telemetry: BTreeMap<String, String>,
}

/// Internal lease data used to renew and revoke a credential.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "StoredLeaseMetadata")]
pub struct LeaseMetadata {
    /// Upstream key id.
    pub id: String,

    /// Upstream key name.
    pub name: String,

    /// Credential kind. Defaults to organisation scoped when absent.
    #[serde(rename = "type")]
    pub kind: CredentialKind,

    /// Stack of an instance key.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stack_slug: Option<String>,

    /// Role the key was issued for.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
}

impl LeaseMetadata {
    /// Decode lease metadata from the host's internal data.
    pub fn from_internal(data: Value) -> Result<Self, CredentialsError> {
        serde_json::from_value(data).map_err(CredentialsError::InvalidLease)
    }

    /// Encode as host internal data.
    pub fn to_internal(&self) -> Result<Value, CredentialsError> {
        serde_json::to_value(self).map_err(CredentialsError::InvalidLease)
    }
}

/// Lease metadata as it may have been written by any release.
#[derive(Deserialize)]
struct StoredLeaseMetadata {
    #[serde(default)]
    id: String,

    #[serde(default)]
    name: String,

    #[serde(rename = "type", default)]
    kind: Option<CredentialKind>,

    #[serde(default)]
    stack_slug: Option<String>,

    #[serde(default)]
    role: Option<String>,
}

impl From<StoredLeaseMetadata> for LeaseMetadata {
    fn from(stored: StoredLeaseMetadata) -> Self {
        // Leases issued before instance keys existed carry no type and are
        // always organisation keys.
        Self {
            id: stored.id,
            name: stored.name,
            kind: stored.kind.unwrap_or(CredentialKind::OrganisationScoped),
            stack_slug: stored.stack_slug.filter(|slug| !slug.is_empty()),
            role: stored.role,
        }
    }
}

/// Advisory lease durations. `None` leaves the host default in place.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LeaseTtl {
    /// Default lease duration.
    pub ttl: Option<Duration>,
    /// Upper bound on the lease lifetime.
    pub max_ttl: Option<Duration>,
}

impl From<&Role> for LeaseTtl {
    fn from(role: &Role) -> Self {
        let non_zero = |duration: Duration| (!duration.is_zero()).then_some(duration);

        Self {
            ttl: non_zero(role.ttl),
            max_ttl: non_zero(role.max_ttl),
        }
    }
}

/// Result of an issue: response data, lease internal data and advisory TTLs.
#[derive(Debug, Clone)]
pub struct IssuedSecret {
    /// The created key.
    pub credential: IssuedCredential,
    /// Data the host keeps with the lease.
    pub internal: LeaseMetadata,
    /// Advisory durations from the role.
    pub ttl: LeaseTtl,
}
