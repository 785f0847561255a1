//! Credentials service errors.

use thiserror::Error;

use crate::{
    cache::ClientCacheError, cloud::CloudError, roles::CredentialKind, roles::RolesServiceError,
    storage::StorageError,
};

/// Credentials service error variants.
#[derive(Debug, Error)]
pub enum CredentialsError {
    /// The named role does not exist.
    #[error("role {0:?} not found")]
    RoleNotFound(String),

    /// An instance-scoped role has no stack.
    #[error("role {0} has no stack_slug")]
    MissingTargetInstance(String),

    /// The role store failed.
    #[error("error retrieving role")]
    Roles(#[from] RolesServiceError),

    /// Configuration could not be read.
    #[error("error reading secrets engine configuration")]
    Config(#[from] StorageError),

    /// No upstream client could be obtained.
    #[error("error getting client")]
    Client(#[from] ClientCacheError),

    /// The upstream rejected key creation.
    #[error("error creating {kind} key")]
    CreateKey {
        /// Kind of key being created.
        kind: CredentialKind,
        /// Upstream failure.
        #[source]
        source: CloudError,
    },

    /// The upstream rejected key deletion.
    #[error("error deleting {kind} key")]
    DeleteKey {
        /// Kind of key being deleted.
        kind: CredentialKind,
        /// Upstream failure.
        #[source]
        source: CloudError,
    },

    /// The temporary admin key for a stack could not be created.
    #[error("error creating scoped admin key for stack {instance}")]
    ScopedAdmin {
        /// Stack slug.
        instance: String,
        /// Upstream failure.
        #[source]
        source: CloudError,
    },

    /// Lease internal data lacks a required field.
    #[error("lease is missing {0} internal data")]
    MissingLeaseField(&'static str),

    /// Configuration lacks a field needed to reach the upstream key.
    #[error("configuration is missing {0}")]
    MissingConfigField(&'static str),

    /// An instance key id is not a number.
    #[error("lease key id {0:?} is not numeric")]
    InvalidKeyId(String),

    /// Lease internal data could not be decoded or encoded.
    #[error("invalid lease internal data")]
    InvalidLease(#[source] serde_json::Error),
}

impl CredentialsError {
    /// The upstream error behind this failure, if any.
    #[must_use]
    pub fn upstream(&self) -> Option<&CloudError> {
        match self {
            Self::CreateKey { source, .. }
            | Self::DeleteKey { source, .. }
            | Self::ScopedAdmin { source, .. } => Some(source),
            _ => None,
        }
    }
}
