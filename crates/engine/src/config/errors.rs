//! Configuration service errors.

use thiserror::Error;

use crate::storage::StorageError;

/// Configuration service error variants.
#[derive(Debug, Error)]
pub enum ConfigServiceError {
    /// No configuration is stored.
    #[error("config not found")]
    NotFound,

    /// A required field was absent or empty.
    #[error("missing {0} in configuration")]
    MissingField(&'static str),

    /// A URL field did not parse as an absolute URL.
    #[error("invalid {0} in configuration")]
    InvalidUrl(String),

    /// Host fields could not be decoded.
    #[error("invalid configuration fields: {0}")]
    InvalidFields(#[source] serde_json::Error),

    /// Storage failed.
    #[error("storage error")]
    Storage(#[from] StorageError),
}

impl ConfigServiceError {
    /// Whether the error was caused by the request rather than the backend.
    #[must_use]
    pub fn is_invalid_request(&self) -> bool {
        matches!(
            self,
            Self::MissingField(_) | Self::InvalidUrl(_) | Self::InvalidFields(_)
        )
    }
}
