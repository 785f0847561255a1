//! Backend configuration.

mod data;
mod errors;
mod models;
mod service;

pub use data::ConfigUpdate;
pub use errors::ConfigServiceError;
pub use models::{CloudConfig, ConfigView, EndpointSettings, TelemetryEndpoint};
pub use service::*;

use crate::storage::{Storage, StorageError, read_json};

/// Storage key of the configuration record.
pub const CONFIG_STORAGE_KEY: &str = "config";

/// Load the stored configuration, if any.
pub async fn read_config(storage: &dyn Storage) -> Result<Option<CloudConfig>, StorageError> {
    read_json(storage, CONFIG_STORAGE_KEY).await
}
