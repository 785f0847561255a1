//! Grafana Cloud wire types.

use serde::{Deserialize, Serialize};

use crate::secret::SecretString;

/// Organisation API key returned on creation.
#[derive(Debug, Clone, Deserialize)]
pub struct CloudApiKey {
    /// Upstream id, when the platform reports one.
    #[serde(default)]
    pub id: Option<i64>,

    /// Key name.
    pub name: String,

    /// Granted role.
    #[serde(default)]
    pub role: String,

    /// Token value, only returned on creation.
    pub token: SecretString,
}

/// Instance API key returned on creation.
#[derive(Debug, Clone, Deserialize)]
pub struct InstanceApiKey {
    /// Numeric id used to delete the key.
    pub id: i64,

    /// Key name.
    pub name: String,

    /// Key value, only returned on creation.
    pub key: SecretString,
}

/// Subset of the stack description needed to reach an instance.
#[derive(Debug, Clone, Deserialize)]
pub struct Stack {
    /// Base URL of the stack's Grafana instance.
    pub url: String,

    /// Stack slug.
    #[serde(default)]
    pub slug: String,
}

#[derive(Debug, Serialize)]
pub(crate) struct CreateCloudApiKeyRequest<'a> {
    pub name: &'a str,
    pub role: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct CreateInstanceApiKeyRequest<'a> {
    pub name: &'a str,
    pub role: &'a str,
    pub seconds_to_live: u64,
}
