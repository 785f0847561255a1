//! Upstream client cache.
//!
//! One [`CloudApi`] client is shared by every request. It is built lazily from
//! the stored configuration and dropped whenever that configuration is written
//! or deleted, so the next request rebuilds it with the new settings.

use std::{fmt, sync::Arc, time::Duration};

use mockall::automock;
use reqwest::Client;
use thiserror::Error;
use tokio::sync::RwLock;
use tracing::debug;

use crate::{
    cloud::{CloudApi, CloudError, GrafanaCloudClient},
    config::{self, CloudConfig},
    secret::SecretString,
    storage::{Storage, StorageError},
};

/// Path segment of the API root that callers commonly include in the URL.
const API_ROOT_SEGMENT: &str = "api";

/// Connection settings derived from configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientSettings {
    /// Platform root URL, with any trailing API root segment removed.
    pub base_url: String,

    /// Admin credential used to mint and delete keys.
    pub api_key: SecretString,
}

impl From<CloudConfig> for ClientSettings {
    fn from(config: CloudConfig) -> Self {
        Self {
            base_url: normalize_base_url(&config.url),
            api_key: config.key,
        }
    }
}

#[automock]
/// Builds upstream clients from connection settings.
pub trait ClientFactory: Send + Sync {
    /// Build a client bound to `settings`.
    fn build(&self, settings: ClientSettings) -> Result<Arc<dyn CloudApi>, CloudError>;
}

/// Builds [`GrafanaCloudClient`]s sharing one HTTP connection pool.
#[derive(Debug, Clone)]
pub struct HttpClientFactory {
    http: Client,
}

impl HttpClientFactory {
    /// Create a factory whose clients time out requests after `timeout`.
    pub fn new(timeout: Duration) -> Result<Self, CloudError> {
        let http = Client::builder().timeout(timeout).build()?;

        Ok(Self { http })
    }
}

impl ClientFactory for HttpClientFactory {
    fn build(&self, settings: ClientSettings) -> Result<Arc<dyn CloudApi>, CloudError> {
        Ok(Arc::new(GrafanaCloudClient::new(
            settings.base_url,
            settings.api_key,
            self.http.clone(),
        )))
    }
}

/// Client cache error variants.
#[derive(Debug, Error)]
pub enum ClientCacheError {
    /// Configuration could not be read.
    #[error("error reading configuration")]
    Storage(#[from] StorageError),

    /// The factory failed to build a client.
    #[error("error building client")]
    Build(#[from] CloudError),
}

/// Lazily built, shared upstream client.
pub struct ClientCache {
    storage: Arc<dyn Storage>,
    factory: Arc<dyn ClientFactory>,
    client: RwLock<Option<Arc<dyn CloudApi>>>,
}

impl ClientCache {
    /// Create an empty cache. The first [`ClientCache::get`] builds the client.
    #[must_use]
    pub fn new(storage: Arc<dyn Storage>, factory: Arc<dyn ClientFactory>) -> Self {
        Self {
            storage,
            factory,
            client: RwLock::new(None),
        }
    }

    /// Return the cached client, building it from storage if necessary.
    pub async fn get(&self) -> Result<Arc<dyn CloudApi>, ClientCacheError> {
        if let Some(client) = self.client.read().await.as_ref() {
            return Ok(Arc::clone(client));
        }

        let mut slot = self.client.write().await;

        // Another request may have rebuilt the client while we waited.
        if let Some(client) = slot.as_ref() {
            return Ok(Arc::clone(client));
        }

        let config = config::read_config(self.storage.as_ref())
            .await?
            .unwrap_or_default();

        let settings = ClientSettings::from(config);

        debug!(base_url = %settings.base_url, "building grafana cloud client");

        let client = self.factory.build(settings)?;

        *slot = Some(Arc::clone(&client));

        Ok(client)
    }

    /// Drop the cached client.
    pub async fn invalidate(&self) {
        let mut slot = self.client.write().await;

        if slot.take().is_some() {
            debug!("invalidated cached grafana cloud client");
        }
    }
}

impl fmt::Debug for ClientCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientCache").finish_non_exhaustive()
    }
}

/// Strip a trailing `api` or `api/` path segment, ignoring case.
#[must_use]
pub fn normalize_base_url(url: &str) -> String {
    let trimmed = url.strip_suffix('/').unwrap_or(url);

    let split = trimmed
        .len()
        .checked_sub(API_ROOT_SEGMENT.len())
        .and_then(|index| trimmed.split_at_checked(index));

    match split {
        Some((head, tail)) if tail.eq_ignore_ascii_case(API_ROOT_SEGMENT) && head.ends_with('/') => {
            head.to_string()
        }
        _ => url.to_string(),
    }
}
