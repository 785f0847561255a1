//! Credential lifecycle: issue, renew and revoke Grafana Cloud keys.

mod errors;
mod models;
mod scoped;
mod service;

pub use errors::CredentialsError;
pub use models::{CredentialResponse, IssuedCredential, IssuedSecret, LeaseMetadata, LeaseTtl};
pub use scoped::{SCOPED_ADMIN_NAME_PREFIX, SCOPED_ADMIN_TTL};
pub use service::*;
