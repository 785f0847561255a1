//! Configuration write payload.

use serde::Deserialize;
use serde_json::Value;

use crate::{
    config::{ConfigServiceError, TelemetryEndpoint},
    secret::SecretString,
};

/// Fields supplied on a configuration write. Absent fields keep their
/// stored values.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConfigUpdate {
    /// Organisation slug.
    pub organisation: Option<String>,
    /// Admin API key.
    pub key: Option<SecretString>,
    /// Grafana Cloud URL.
    pub url: Option<String>,
    /// Legacy Prometheus user.
    pub user: Option<String>,
    /// Prometheus user.
    pub prometheus_user: Option<String>,
    /// Prometheus URL.
    pub prometheus_url: Option<String>,
    /// Loki user.
    pub loki_user: Option<String>,
    /// Loki URL.
    pub loki_url: Option<String>,
    /// Tempo user.
    pub tempo_user: Option<String>,
    /// Tempo URL.
    pub tempo_url: Option<String>,
    /// Alertmanager user.
    pub alertmanager_user: Option<String>,
    /// Alertmanager URL.
    pub alertmanager_url: Option<String>,
    /// Graphite user.
    pub graphite_user: Option<String>,
    /// Graphite URL.
    pub graphite_url: Option<String>,
}

impl ConfigUpdate {
    /// Decode host field data into a typed update.
    pub fn from_fields(fields: Value) -> Result<Self, ConfigServiceError> {
        serde_json::from_value(fields).map_err(ConfigServiceError::InvalidFields)
    }

    /// The `(user, url)` pair supplied for `endpoint`.
    #[must_use]
    pub fn endpoint(&self, endpoint: TelemetryEndpoint) -> (Option<&str>, Option<&str>) {
        let (user, url) = match endpoint {
            TelemetryEndpoint::Prometheus => (&self.prometheus_user, &self.prometheus_url),
            TelemetryEndpoint::Loki => (&self.loki_user, &self.loki_url),
            TelemetryEndpoint::Tempo => (&self.tempo_user, &self.tempo_url),
            TelemetryEndpoint::Alertmanager => (&self.alertmanager_user, &self.alertmanager_url),
            TelemetryEndpoint::Graphite => (&self.graphite_user, &self.graphite_url),
        };

        (user.as_deref(), url.as_deref())
    }
}
