//! Grafana Cloud upstream API.
//!
//! The engine talks to the platform through two traits: [`CloudApi`] for
//! organisation-level operations authenticated with the configured admin key,
//! and [`InstanceApi`] for operations against a single stack, authenticated
//! with a short-lived scoped admin key.

use std::{fmt, sync::Arc, time::Duration};

use async_trait::async_trait;
use mockall::automock;

pub mod client;
mod errors;
mod models;

pub use client::{GrafanaCloudClient, GrafanaInstanceClient};
pub use errors::CloudError;
pub use models::{CloudApiKey, InstanceApiKey, Stack};

#[automock]
#[async_trait]
/// Organisation-level operations of the Grafana Cloud API.
pub trait CloudApi: Send + Sync {
    /// Create an organisation API key named `name` with the given role.
    async fn create_organisation_key(
        &self,
        organisation: &str,
        name: &str,
        role: &str,
    ) -> Result<CloudApiKey, CloudError>;

    /// Delete the organisation API key named `name`.
    async fn delete_organisation_key(&self, organisation: &str, name: &str)
    -> Result<(), CloudError>;

    /// Mint a temporary admin key for `instance` and return a client bound to it.
    ///
    /// The caller owns the returned key and must delete it through
    /// [`ScopedInstanceClient::release`].
    async fn create_instance_scoped_client(
        &self,
        instance: &str,
        name_prefix: &str,
        ttl: Duration,
    ) -> Result<ScopedInstanceClient, CloudError>;
}

#[automock]
#[async_trait]
/// Operations against a single Grafana instance.
pub trait InstanceApi: Send + Sync {
    /// Create an instance API key.
    async fn create_instance_key(
        &self,
        name: &str,
        role: &str,
        seconds_to_live: u64,
    ) -> Result<InstanceApiKey, CloudError>;

    /// Delete the instance API key with the given numeric id.
    async fn delete_instance_key(&self, id: i64) -> Result<(), CloudError>;
}

/// A client bound to one instance through a temporary admin key.
#[derive(Clone)]
pub struct ScopedInstanceClient {
    api: Arc<dyn InstanceApi>,
    admin_key_id: i64,
}

impl ScopedInstanceClient {
    /// Bind `api` to the temporary admin key with id `admin_key_id`.
    #[must_use]
    pub fn new(api: Arc<dyn InstanceApi>, admin_key_id: i64) -> Self {
        Self { api, admin_key_id }
    }

    /// The instance API authenticated with the temporary admin key.
    #[must_use]
    pub fn api(&self) -> &Arc<dyn InstanceApi> {
        &self.api
    }

    /// Upstream id of the temporary admin key.
    #[must_use]
    pub fn admin_key_id(&self) -> i64 {
        self.admin_key_id
    }

    /// Delete the temporary admin key.
    pub async fn release(&self) -> Result<(), CloudError> {
        self.api.delete_instance_key(self.admin_key_id).await
    }
}

impl fmt::Debug for ScopedInstanceClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScopedInstanceClient")
            .field("admin_key_id", &self.admin_key_id)
            .finish_non_exhaustive()
    }
}
