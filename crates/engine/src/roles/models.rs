//! Role models.

use std::{fmt, str::FromStr, time::Duration};

use serde::{Deserialize, Serialize};

use crate::roles::{RoleUpdate, RolesServiceError};

/// Which issuance protocol a role uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum CredentialKind {
    /// Grafana Cloud API key valid across the organisation.
    #[default]
    #[serde(rename = "Cloud")]
    OrganisationScoped,

    /// Grafana API key valid on one stack only.
    #[serde(rename = "Grafana")]
    InstanceScoped,
}

impl CredentialKind {
    /// Wire name, `Cloud` or `Grafana`.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::OrganisationScoped => "Cloud",
            Self::InstanceScoped => "Grafana",
        }
    }

    /// Authorization levels that can be granted to keys of this kind.
    #[must_use]
    pub const fn allowed_levels(self) -> &'static [AuthorizationLevel] {
        match self {
            Self::OrganisationScoped => &[
                AuthorizationLevel::Viewer,
                AuthorizationLevel::Editor,
                AuthorizationLevel::Admin,
                AuthorizationLevel::MetricsPublisher,
                AuthorizationLevel::PluginPublisher,
            ],
            Self::InstanceScoped => &[
                AuthorizationLevel::Viewer,
                AuthorizationLevel::Editor,
                AuthorizationLevel::Admin,
            ],
        }
    }
}

impl fmt::Display for CredentialKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CredentialKind {
    type Err = RolesServiceError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "Cloud" => Ok(Self::OrganisationScoped),
            "Grafana" => Ok(Self::InstanceScoped),
            _ => Err(RolesServiceError::Invalid(format!(
                "provided api_type {value} is not valid. Valid values are 'Cloud' and 'Grafana'"
            ))),
        }
    }
}

/// Role granted to an issued key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AuthorizationLevel {
    /// Read only.
    Viewer,
    /// Read and write.
    Editor,
    /// Full control.
    Admin,
    /// Push metrics only.
    MetricsPublisher,
    /// Publish plugins only.
    PluginPublisher,
}

impl AuthorizationLevel {
    /// Wire name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Viewer => "Viewer",
            Self::Editor => "Editor",
            Self::Admin => "Admin",
            Self::MetricsPublisher => "MetricsPublisher",
            Self::PluginPublisher => "PluginPublisher",
        }
    }
}

impl fmt::Display for AuthorizationLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AuthorizationLevel {
    type Err = RolesServiceError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "Viewer" => Ok(Self::Viewer),
            "Editor" => Ok(Self::Editor),
            "Admin" => Ok(Self::Admin),
            "MetricsPublisher" => Ok(Self::MetricsPublisher),
            "PluginPublisher" => Ok(Self::PluginPublisher),
            _ => Err(RolesServiceError::Invalid(format!(
                "provided gc_role {value} is not valid"
            ))),
        }
    }
}

/// Stored role definition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Role {
    /// Issuance protocol.
    #[serde(rename = "api_type", default)]
    pub credential_kind: CredentialKind,

    /// Stack slug, present only for instance-scoped roles.
    #[serde(rename = "stack_slug", default, skip_serializing_if = "Option::is_none")]
    pub target_instance: Option<String>,

    /// Role granted to issued keys.
    #[serde(rename = "gc_role")]
    pub authorization_level: AuthorizationLevel,

    /// Default lease duration; zero defers to the host.
    #[serde(with = "seconds", default)]
    pub ttl: Duration,

    /// Maximum lease duration; zero defers to the host.
    #[serde(with = "seconds", default)]
    pub max_ttl: Duration,
}

impl Role {
    /// Apply `update` on top of `existing` and validate the result.
    ///
    /// Fields missing from `update` keep their `existing` values. Nothing is
    /// returned unless every invariant holds.
    pub fn merge(existing: Option<&Self>, update: RoleUpdate) -> Result<Self, RolesServiceError> {
        let credential_kind = match update.credential_kind.as_deref() {
            Some(kind) => kind.parse()?,
            None => existing.map(|role| role.credential_kind).unwrap_or_default(),
        };

        let authorization_level = match update.authorization_level.as_deref() {
            Some(level) => level.parse()?,
            None => existing
                .map(|role| role.authorization_level)
                .ok_or_else(|| RolesServiceError::Invalid("missing gc_role value".to_string()))?,
        };

        if !credential_kind.allowed_levels().contains(&authorization_level) {
            return Err(RolesServiceError::Invalid(format!(
                "gc_role {authorization_level} is not valid for api_type {credential_kind}"
            )));
        }

        let target_instance = match credential_kind {
            CredentialKind::OrganisationScoped => None,
            CredentialKind::InstanceScoped => {
                let slug = update
                    .target_instance
                    .or_else(|| existing.and_then(|role| role.target_instance.clone()))
                    .filter(|slug| !slug.is_empty())
                    .ok_or_else(|| {
                        RolesServiceError::Invalid(
                            "need to specify a stack_slug for Grafana API keys.".to_string(),
                        )
                    })?;

                Some(slug)
            }
        };

        let ttl = update
            .ttl
            .or_else(|| existing.map(|role| role.ttl))
            .unwrap_or_default();

        let max_ttl = update
            .max_ttl
            .or_else(|| existing.map(|role| role.max_ttl))
            .unwrap_or_default();

        if !max_ttl.is_zero() && ttl > max_ttl {
            return Err(RolesServiceError::Invalid(
                "ttl cannot be greater than max_ttl".to_string(),
            ));
        }

        Ok(Self {
            credential_kind,
            target_instance,
            authorization_level,
            ttl,
            max_ttl,
        })
    }

    /// Caller-facing representation.
    #[must_use]
    pub fn view(&self) -> RoleView {
        RoleView {
            api_type: self.credential_kind,
            stack_slug: self.target_instance.clone().unwrap_or_default(),
            gc_role: self.authorization_level,
            ttl: self.ttl.as_secs(),
            max_ttl: self.max_ttl.as_secs(),
        }
    }
}

/// Role as presented to callers, with lease durations in seconds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleView {
    /// Credential kind.
    pub api_type: CredentialKind,
    /// Stack slug, empty for organisation roles.
    pub stack_slug: String,
    /// Granted role.
    pub gc_role: AuthorizationLevel,
    /// Default lease duration in seconds.
    pub ttl: u64,
    /// Maximum lease duration in seconds.
    pub max_ttl: u64,
}

mod seconds {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub(super) fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(value.as_secs())
    }

    pub(super) fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        u64::deserialize(deserializer).map(Duration::from_secs)
    }
}
