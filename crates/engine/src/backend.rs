//! Backend

use std::{fmt, sync::Arc};

use tracing::debug;

use crate::{
    cache::{ClientCache, ClientFactory},
    config::{CONFIG_STORAGE_KEY, ConfigService, StoredConfigService},
    credentials::{CloudCredentialsService, CredentialsService},
    roles::{RolesService, StoredRolesService},
    storage::Storage,
};

/// Whether a write creates a record or updates an existing one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteOperation {
    /// No record is stored yet.
    Create,

    /// A record is already stored and is merged into.
    Update,
}

/// The services a host mounts, sharing one storage and one client cache.
#[derive(Clone)]
pub struct Backend {
    /// Configuration store.
    pub config: Arc<dyn ConfigService>,
    /// Role store.
    pub roles: Arc<dyn RolesService>,
    /// Credential lifecycle engine.
    pub credentials: Arc<dyn CredentialsService>,
    cache: Arc<ClientCache>,
}

impl Backend {
    /// Wire the services over `storage`, building upstream clients with `factory`.
    #[must_use]
    pub fn new(storage: Arc<dyn Storage>, factory: Arc<dyn ClientFactory>) -> Self {
        let cache = Arc::new(ClientCache::new(Arc::clone(&storage), factory));
        let roles: Arc<dyn RolesService> = Arc::new(StoredRolesService::new(Arc::clone(&storage)));

        Self {
            config: Arc::new(StoredConfigService::new(
                Arc::clone(&storage),
                Arc::clone(&cache),
            )),
            credentials: Arc::new(CloudCredentialsService::new(
                storage,
                Arc::clone(&roles),
                Arc::clone(&cache),
            )),
            roles,
            cache,
        }
    }

    /// Notify the backend that `key` was changed outside of it.
    ///
    /// Only a change to the configuration record affects the engine.
    pub async fn invalidate(&self, key: &str) {
        if key == CONFIG_STORAGE_KEY {
            debug!(key, "storage key invalidated");
            self.cache.invalidate().await;
        }
    }
}

impl fmt::Debug for Backend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Backend")
            .field("cache", &self.cache)
            .finish_non_exhaustive()
    }
}
