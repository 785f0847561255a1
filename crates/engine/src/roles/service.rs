//! Roles service.

use std::{fmt, sync::Arc};

use async_trait::async_trait;
use mockall::automock;
use tracing::info;

use crate::{
    backend::WriteOperation,
    roles::{ROLE_STORAGE_PREFIX, Role, RoleUpdate, RolesServiceError, role_storage_key},
    storage::{Storage, read_json, write_json},
};

/// [`RolesService`] persisted in host storage.
#[derive(Clone)]
pub struct StoredRolesService {
    storage: Arc<dyn Storage>,
}

impl StoredRolesService {
    /// Create a service over `storage`.
    #[must_use]
    pub fn new(storage: Arc<dyn Storage>) -> Self {
        Self { storage }
    }
}

impl fmt::Debug for StoredRolesService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StoredRolesService").finish_non_exhaustive()
    }
}

#[async_trait]
impl RolesService for StoredRolesService {
    async fn get_role(&self, name: &str) -> Result<Option<Role>, RolesServiceError> {
        let key = storage_key(name)?;

        Ok(read_json(self.storage.as_ref(), &key).await?)
    }

    async fn write_role(
        &self,
        operation: WriteOperation,
        name: &str,
        update: RoleUpdate,
    ) -> Result<Role, RolesServiceError> {
        let key = storage_key(name)?;

        let existing: Option<Role> = read_json(self.storage.as_ref(), &key).await?;

        if existing.is_none() && operation == WriteOperation::Update {
            return Err(RolesServiceError::NotFound);
        }

        let role = Role::merge(existing.as_ref(), update)?;

        write_json(self.storage.as_ref(), &key, &role).await?;

        info!(
            role = name,
            kind = %role.credential_kind,
            level = %role.authorization_level,
            "role written"
        );

        Ok(role)
    }

    async fn list_roles(&self) -> Result<Vec<String>, RolesServiceError> {
        Ok(self.storage.list(ROLE_STORAGE_PREFIX).await?)
    }

    async fn delete_role(&self, name: &str) -> Result<(), RolesServiceError> {
        let key = storage_key(name)?;

        self.storage.delete(&key).await?;

        info!(role = name, "role deleted");

        Ok(())
    }
}

#[automock]
#[async_trait]
/// Role persistence operations.
pub trait RolesService: Send + Sync {
    /// Load a role, returning `None` if it does not exist.
    async fn get_role(&self, name: &str) -> Result<Option<Role>, RolesServiceError>;

    /// Merge `update` onto the stored role, validate, and persist.
    ///
    /// Creating starts from an empty role when none is stored. Updating a role
    /// that does not exist fails with [`RolesServiceError::NotFound`].
    async fn write_role(
        &self,
        operation: WriteOperation,
        name: &str,
        update: RoleUpdate,
    ) -> Result<Role, RolesServiceError>;

    /// Names of all stored roles.
    async fn list_roles(&self) -> Result<Vec<String>, RolesServiceError>;

    /// Delete a role. Deleting a missing role succeeds.
    async fn delete_role(&self, name: &str) -> Result<(), RolesServiceError>;
}

fn storage_key(name: &str) -> Result<String, RolesServiceError> {
    if name.is_empty() {
        return Err(RolesServiceError::MissingName);
    }

    Ok(role_storage_key(name))
}
