//! Configuration models.

use std::{collections::BTreeMap, fmt};

use serde::{Deserialize, Serialize};

use crate::secret::SecretString;

/// Telemetry endpoints whose connection details are handed out with credentials.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TelemetryEndpoint {
    /// Metrics.
    Prometheus,
    /// Logs.
    Loki,
    /// Traces.
    Tempo,
    /// Alerting.
    Alertmanager,
    /// Graphite metrics.
    Graphite,
}

impl TelemetryEndpoint {
    /// Every endpoint, in field order.
    pub const ALL: [Self; 5] = [
        Self::Prometheus,
        Self::Loki,
        Self::Tempo,
        Self::Alertmanager,
        Self::Graphite,
    ];

    /// Lowercase endpoint name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Prometheus => "prometheus",
            Self::Loki => "loki",
            Self::Tempo => "tempo",
            Self::Alertmanager => "alertmanager",
            Self::Graphite => "graphite",
        }
    }

    /// Host field name carrying this endpoint's user.
    #[must_use]
    pub fn user_field(self) -> String {
        format!("{}_user", self.as_str())
    }

    /// Host field name carrying this endpoint's URL.
    #[must_use]
    pub fn url_field(self) -> String {
        format!("{}_url", self.as_str())
    }
}

impl fmt::Display for TelemetryEndpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// User and URL for one telemetry endpoint.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EndpointSettings {
    /// Tenant user for the endpoint.
    #[serde(default)]
    pub user: String,

    /// Endpoint URL.
    #[serde(default)]
    pub url: String,
}

/// Stored backend configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CloudConfig {
    /// Organisation slug keys are created in.
    #[serde(default)]
    pub organisation: String,

    /// Admin API key used to mint and delete keys.
    #[serde(default)]
    pub key: SecretString,

    /// Grafana Cloud URL as configured, before normalisation.
    #[serde(default)]
    pub url: String,

    /// Legacy alias of the Prometheus user.
    #[serde(default)]
    pub user: String,

    /// Telemetry endpoint details.
    #[serde(default)]
    pub endpoints: BTreeMap<TelemetryEndpoint, EndpointSettings>,
}

impl CloudConfig {
    /// Non-empty telemetry details as flat host fields.
    ///
    /// These are surfaced next to every issued credential.
    #[must_use]
    pub fn telemetry_fields(&self) -> BTreeMap<String, String> {
        let mut fields = BTreeMap::new();

        if !self.user.is_empty() {
            fields.insert("user".to_string(), self.user.clone());
        }

        for (endpoint, settings) in &self.endpoints {
            if !settings.user.is_empty() {
                fields.insert(endpoint.user_field(), settings.user.clone());
            }

            if !settings.url.is_empty() {
                fields.insert(endpoint.url_field(), settings.url.clone());
            }
        }

        fields
    }
}

/// Configuration as presented to callers. The admin key is never included.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConfigView {
    /// Organisation slug.
    pub organisation: String,

    /// Grafana Cloud URL.
    pub url: String,

    /// Non-empty telemetry fields.
    #[serde(flatten)]
    pub telemetry: BTreeMap<String, String>,
}

impl From<&CloudConfig> for ConfigView {
    fn from(config: &CloudConfig) -> Self {
        Self {
            organisation: config.organisation.clone(),
            url: config.url.clone(),
            telemetry: config.telemetry_fields(),
        }
    }
}
