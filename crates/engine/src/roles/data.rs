//! Role write payload.

use std::{str::FromStr, time::Duration};

use jiff::SignedDuration;
use serde::{Deserialize, Deserializer, de};
use serde_json::Value;

use crate::roles::RolesServiceError;

/// Partial role write. Absent fields keep their stored values.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RoleUpdate {
    /// `Cloud` or `Grafana`.
    #[serde(rename = "api_type", default)]
    pub credential_kind: Option<String>,

    /// Stack for instance keys.
    #[serde(rename = "stack_slug", default)]
    pub target_instance: Option<String>,

    /// Role granted to issued keys.
    #[serde(rename = "gc_role", default)]
    pub authorization_level: Option<String>,

    /// Default lease duration.
    #[serde(default, deserialize_with = "lease_duration")]
    pub ttl: Option<Duration>,

    /// Maximum lease duration.
    #[serde(default, deserialize_with = "lease_duration")]
    pub max_ttl: Option<Duration>,
}

impl RoleUpdate {
    /// Decode a role update from host supplied fields.
    pub fn from_fields(fields: Value) -> Result<Self, RolesServiceError> {
        serde_json::from_value(fields).map_err(RolesServiceError::InvalidFields)
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum DurationField {
    Seconds(u64),
    Text(String),
}

/// Accepts whole seconds or a duration string such as `"5m"` or `"1h 30m"`.
fn lease_duration<'de, D>(deserializer: D) -> Result<Option<Duration>, D::Error>
where
    D: Deserializer<'de>,
{
    let Some(field) = Option::<DurationField>::deserialize(deserializer)? else {
        return Ok(None);
    };

    match field {
        DurationField::Seconds(secs) => Ok(Some(Duration::from_secs(secs))),
        DurationField::Text(text) => parse_duration(&text).map(Some).map_err(de::Error::custom),
    }
}

fn parse_duration(text: &str) -> Result<Duration, String> {
    let text = text.trim();

    if let Ok(secs) = text.parse::<u64>() {
        return Ok(Duration::from_secs(secs));
    }

    let signed = SignedDuration::from_str(text)
        .map_err(|error| format!("invalid duration {text:?}: {error}"))?;

    Duration::try_from(signed).map_err(|error| format!("invalid duration {text:?}: {error}"))
}
