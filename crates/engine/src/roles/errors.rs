//! Roles service errors.

use thiserror::Error;

use crate::storage::StorageError;

/// Roles service error variants.
#[derive(Debug, Error)]
pub enum RolesServiceError {
    /// The role name was empty.
    #[error("missing role name")]
    MissingName,

    /// The role does not exist.
    #[error("role not found")]
    NotFound,

    /// The merged role failed validation.
    #[error("{0}")]
    Invalid(String),

    /// Host fields could not be decoded.
    #[error("invalid role fields: {0}")]
    InvalidFields(#[source] serde_json::Error),

    /// Storage failed.
    #[error(transparent)]
    Storage(#[from] StorageError),
}

impl RolesServiceError {
    /// Whether the caller supplied bad input, as opposed to an internal failure.
    #[must_use]
    pub const fn is_invalid_request(&self) -> bool {
        matches!(
            self,
            Self::MissingName | Self::Invalid(_) | Self::InvalidFields(_)
        )
    }
}
