//! Configuration service.

use std::{fmt, sync::Arc};

use async_trait::async_trait;
use mockall::automock;
use reqwest::Url;
use tracing::info;

use crate::{
    backend::WriteOperation,
    cache::ClientCache,
    config::{
        CONFIG_STORAGE_KEY, CloudConfig, ConfigServiceError, ConfigUpdate, ConfigView,
        TelemetryEndpoint, read_config,
    },
    storage::{Storage, write_json},
};

/// [`ConfigService`] persisted in host storage.
#[derive(Clone)]
pub struct StoredConfigService {
    storage: Arc<dyn Storage>,
    cache: Arc<ClientCache>,
}

impl StoredConfigService {
    /// Create a service that invalidates `cache` on every change.
    #[must_use]
    pub fn new(storage: Arc<dyn Storage>, cache: Arc<ClientCache>) -> Self {
        Self { storage, cache }
    }
}

impl fmt::Debug for StoredConfigService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StoredConfigService")
            .field("cache", &self.cache)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl ConfigService for StoredConfigService {
    async fn config_exists(&self) -> Result<bool, ConfigServiceError> {
        Ok(self.storage.get(CONFIG_STORAGE_KEY).await?.is_some())
    }

    async fn read_config(&self) -> Result<ConfigView, ConfigServiceError> {
        read_config(self.storage.as_ref())
            .await?
            .as_ref()
            .map(ConfigView::from)
            .ok_or(ConfigServiceError::NotFound)
    }

    async fn write_config(
        &self,
        operation: WriteOperation,
        update: ConfigUpdate,
    ) -> Result<(), ConfigServiceError> {
        let stored = read_config(self.storage.as_ref()).await?;

        let config = match (stored, operation) {
            (Some(config), _) => config,
            (None, WriteOperation::Create) => CloudConfig::default(),
            (None, WriteOperation::Update) => return Err(ConfigServiceError::NotFound),
        };

        let config = apply_update(config, update, operation)?;

        write_json(self.storage.as_ref(), CONFIG_STORAGE_KEY, &config).await?;

        self.cache.invalidate().await;

        info!(organisation = %config.organisation, "configuration written");

        Ok(())
    }

    async fn delete_config(&self) -> Result<(), ConfigServiceError> {
        self.storage.delete(CONFIG_STORAGE_KEY).await?;

        self.cache.invalidate().await;

        info!("configuration deleted");

        Ok(())
    }
}

#[automock]
#[async_trait]
/// Configuration persistence operations.
pub trait ConfigService: Send + Sync {
    /// Whether a configuration record is stored.
    async fn config_exists(&self) -> Result<bool, ConfigServiceError>;

    /// Read the stored configuration without its admin key.
    async fn read_config(&self) -> Result<ConfigView, ConfigServiceError>;

    /// Merge `update` onto the stored configuration and invalidate the client.
    async fn write_config(
        &self,
        operation: WriteOperation,
        update: ConfigUpdate,
    ) -> Result<(), ConfigServiceError>;

    /// Delete the stored configuration and invalidate the client.
    async fn delete_config(&self) -> Result<(), ConfigServiceError>;
}

fn apply_update(
    mut config: CloudConfig,
    update: ConfigUpdate,
    operation: WriteOperation,
) -> Result<CloudConfig, ConfigServiceError> {
    let creating = operation == WriteOperation::Create;

    for endpoint in TelemetryEndpoint::ALL {
        let (user, url) = update.endpoint(endpoint);

        if let Some(url) = url {
            ensure_absolute_url(url, &endpoint.url_field())?;
        }

        if user.is_none() && url.is_none() {
            continue;
        }

        let settings = config.endpoints.entry(endpoint).or_default();

        if let Some(user) = user {
            settings.user = user.to_string();
        }

        if let Some(url) = url {
            settings.url = url.to_string();
        }
    }

    if let Some(user) = update.user {
        config.user = user;
    }

    // The legacy `user` field mirrors the Prometheus user.
    if let Some(user) = update.prometheus_user {
        config.user = user;
    }

    if let Some(organisation) = update.organisation {
        config.organisation = organisation;
    }

    if creating && config.organisation.is_empty() {
        return Err(ConfigServiceError::MissingField("organisation"));
    }

    if let Some(key) = update.key {
        config.key = key;
    }

    if creating && config.key.is_empty() {
        return Err(ConfigServiceError::MissingField("key"));
    }

    match update.url {
        Some(url) => {
            ensure_absolute_url(&url, "url")?;
            config.url = url;
        }
        None if creating => return Err(ConfigServiceError::MissingField("url")),
        None => {}
    }

    Ok(config)
}

fn ensure_absolute_url(value: &str, field: &str) -> Result<(), ConfigServiceError> {
    match Url::parse(value) {
        Ok(url) if !url.cannot_be_a_base() => Ok(()),
        _ => Err(ConfigServiceError::InvalidUrl(field.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use testresult::TestResult;

    use crate::test::TestContext;

    use super::*;

    fn valid_create() -> ConfigUpdate {
        ConfigUpdate::from_fields(json!({
            "organisation": "acme",
            "key": "admin-key",
            "url": "https://grafana.com/api/",
        }))
        .expect("valid fields")
    }

    async fn assert_create_rejected(fields: serde_json::Value) {
        let ctx = TestContext::new();
        let update = ConfigUpdate::from_fields(fields).expect("valid fields");

        let result = ctx.config.write_config(WriteOperation::Create, update).await;

        assert!(
            result.as_ref().is_err_and(ConfigServiceError::is_invalid_request),
            "expected invalid request, got {result:?}"
        );
        assert!(
            !ctx.config.config_exists().await.expect("exists check"),
            "rejected write must not persist"
        );
    }

    #[tokio::test]
    async fn create_config_persists_all_fields() -> TestResult {
        let ctx = TestContext::new();

        let update = ConfigUpdate::from_fields(json!({
            "organisation": "acme",
            "key": "admin-key",
            "url": "https://grafana.com/",
            "prometheus_user": "1234",
            "prometheus_url": "https://prometheus.example.com",
            "graphite_url": "https://graphite.example.com",
        }))?;

        ctx.config.write_config(WriteOperation::Create, update).await?;

        let stored = read_config(ctx.storage.as_ref()).await?.ok_or("missing config")?;

        assert_eq!(stored.organisation, "acme");
        assert_eq!(stored.key.expose(), "admin-key");
        assert_eq!(stored.user, "1234", "prometheus user sets legacy user");
        assert_eq!(
            stored.endpoints[&TelemetryEndpoint::Prometheus].url,
            "https://prometheus.example.com"
        );
        assert_eq!(
            stored.endpoints[&TelemetryEndpoint::Graphite].url,
            "https://graphite.example.com"
        );

        Ok(())
    }

    #[tokio::test]
    async fn create_config_rejects_missing_or_empty_fields() {
        assert_create_rejected(json!({ "key": "k", "url": "https://grafana.com/" })).await;
        assert_create_rejected(json!({
            "organisation": "acme", "key": "", "url": "https://grafana.com/"
        }))
        .await;
        assert_create_rejected(json!({ "organisation": "acme", "key": "k", "url": "" })).await;
        assert_create_rejected(json!({ "organisation": "acme", "key": "k" })).await;
    }

    #[tokio::test]
    async fn create_config_rejects_relative_urls() {
        assert_create_rejected(json!({
            "organisation": "acme", "key": "k", "url": "/addd"
        }))
        .await;

        for endpoint in TelemetryEndpoint::ALL {
            let mut fields = json!({
                "organisation": "acme", "key": "k", "url": "https://grafana.com/"
            });

            fields[endpoint.url_field()] = json!("/relative");

            assert_create_rejected(fields).await;
        }
    }

    #[tokio::test]
    async fn update_without_stored_config_is_not_found() {
        let ctx = TestContext::new();

        let result = ctx
            .config
            .write_config(WriteOperation::Update, ConfigUpdate::default())
            .await;

        assert!(
            matches!(result, Err(ConfigServiceError::NotFound)),
            "expected not found, got {result:?}"
        );
    }

    #[tokio::test]
    async fn update_merges_onto_stored_config() -> TestResult {
        let ctx = TestContext::new();

        ctx.config
            .write_config(WriteOperation::Create, valid_create())
            .await?;

        ctx.config
            .write_config(
                WriteOperation::Update,
                ConfigUpdate {
                    organisation: Some("acme-two".to_string()),
                    ..ConfigUpdate::default()
                },
            )
            .await?;

        let stored = read_config(ctx.storage.as_ref()).await?.ok_or("missing config")?;

        assert_eq!(stored.organisation, "acme-two");
        assert_eq!(stored.key.expose(), "admin-key");
        assert_eq!(stored.url, "https://grafana.com/api/");

        Ok(())
    }

    #[tokio::test]
    async fn read_config_without_record_is_not_found() {
        let ctx = TestContext::new();

        let result = ctx.config.read_config().await;

        assert!(
            matches!(result, Err(ConfigServiceError::NotFound)),
            "expected not found, got {result:?}"
        );
    }

    #[tokio::test]
    async fn write_and_delete_invalidate_cached_client() -> TestResult {
        let ctx = TestContext::with_client_builds(3);

        ctx.config
            .write_config(WriteOperation::Create, valid_create())
            .await?;

        let first = ctx.cache.get().await?;
        let second = ctx.cache.get().await?;

        assert!(Arc::ptr_eq(&first, &second), "expected cached client");

        ctx.config
            .write_config(
                WriteOperation::Update,
                ConfigUpdate {
                    url: Some("https://grafana.com/".to_string()),
                    ..ConfigUpdate::default()
                },
            )
            .await?;

        let third = ctx.cache.get().await?;

        assert!(!Arc::ptr_eq(&second, &third), "write must invalidate");

        ctx.config.delete_config().await?;

        let fourth = ctx.cache.get().await?;

        assert!(!Arc::ptr_eq(&third, &fourth), "delete must invalidate");

        Ok(())
    }

    #[tokio::test]
    async fn rejected_write_keeps_cached_client() -> TestResult {
        let ctx = TestContext::with_client_builds(1);

        ctx.config
            .write_config(WriteOperation::Create, valid_create())
            .await?;

        let first = ctx.cache.get().await?;

        let result = ctx
            .config
            .write_config(
                WriteOperation::Update,
                ConfigUpdate {
                    url: Some("not a url".to_string()),
                    ..ConfigUpdate::default()
                },
            )
            .await;

        assert!(result.is_err(), "invalid url must be rejected");

        let second = ctx.cache.get().await?;

        assert!(Arc::ptr_eq(&first, &second), "failed write must not invalidate");

        Ok(())
    }
}
