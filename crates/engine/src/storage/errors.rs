//! Storage errors.

use thiserror::Error;

/// Storage error variants.
#[derive(Debug, Error)]
pub enum StorageError {
    /// The host storage reported a failure.
    #[error("storage backend error: {0}")]
    Backend(String),

    /// A stored record was not valid JSON for its type.
    #[error("failed to decode record at {key}")]
    Decode {
        /// Storage key.
        key: String,
        /// Decode failure.
        #[source]
        source: serde_json::Error,
    },

    /// A record could not be serialized.
    #[error("failed to encode record for {key}")]
    Encode {
        /// Storage key.
        key: String,
        /// Encode failure.
        #[source]
        source: serde_json::Error,
    },
}
