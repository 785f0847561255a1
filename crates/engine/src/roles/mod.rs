//! Roles

mod data;
mod errors;
mod models;
mod service;

pub use data::RoleUpdate;
pub use errors::RolesServiceError;
pub use models::{AuthorizationLevel, CredentialKind, Role, RoleView};
pub use service::*;

/// Storage prefix under which roles are kept.
pub const ROLE_STORAGE_PREFIX: &str = "roles/";

/// Storage key for the role called `name`.
#[must_use]
pub fn role_storage_key(name: &str) -> String {
    format!("{ROLE_STORAGE_PREFIX}{name}")
}
