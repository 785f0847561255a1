//! Host storage boundary.
//!
//! The host owns durability and encryption at rest. The engine only reads and
//! writes opaque JSON records under a small set of keys.

use async_trait::async_trait;
use mockall::automock;
use serde::{Serialize, de::DeserializeOwned};

mod errors;
mod memory;

pub use errors::StorageError;
pub use memory::InMemoryStorage;

#[automock]
#[async_trait]
/// Key-value storage supplied by the host.
pub trait Storage: Send + Sync {
    /// Fetch the raw record stored under `key`.
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StorageError>;

    /// Store `value` under `key`, replacing any previous record.
    async fn put(&self, key: &str, value: Vec<u8>) -> Result<(), StorageError>;

    /// Remove the record under `key`. Missing keys are not an error.
    async fn delete(&self, key: &str) -> Result<(), StorageError>;

    /// List the immediate child names below `prefix`.
    async fn list(&self, prefix: &str) -> Result<Vec<String>, StorageError>;
}

/// Read and decode the JSON record stored under `key`.
pub async fn read_json<T: DeserializeOwned>(
    storage: &dyn Storage,
    key: &str,
) -> Result<Option<T>, StorageError> {
    let Some(bytes) = storage.get(key).await? else {
        return Ok(None);
    };

    serde_json::from_slice(&bytes)
        .map(Some)
        .map_err(|source| StorageError::Decode {
            key: key.to_string(),
            source,
        })
}

/// Encode `value` as JSON and store it under `key`.
pub async fn write_json<T: Serialize + Sync>(
    storage: &dyn Storage,
    key: &str,
    value: &T,
) -> Result<(), StorageError> {
    let bytes = serde_json::to_vec(value).map_err(|source| StorageError::Encode {
        key: key.to_string(),
        source,
    })?;

    storage.put(key, bytes).await
}
