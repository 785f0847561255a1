//! HTTP clients for the Grafana Cloud and Grafana instance APIs.

use std::{sync::Arc, time::Duration};

use async_trait::async_trait;
use reqwest::{Client, Method, RequestBuilder, Response, Url};
use serde::de::DeserializeOwned;
use tracing::debug;
use uuid::Uuid;

use crate::{
    cloud::{
        CloudApi, CloudError, InstanceApi, ScopedInstanceClient,
        models::{
            CloudApiKey, CreateCloudApiKeyRequest, CreateInstanceApiKeyRequest, InstanceApiKey,
            Stack,
        },
    },
    secret::SecretString,
};

/// Role granted to temporary instance admin keys.
const SCOPED_ADMIN_ROLE: &str = "Admin";

/// HTTP client for the Grafana Cloud API, authenticated with an admin key.
#[derive(Debug, Clone)]
pub struct GrafanaCloudClient {
    base_url: String,
    api_key: SecretString,
    http: Client,
}

impl GrafanaCloudClient {
    /// Create a client for the platform root `base_url`.
    ///
    /// The URL is only parsed when a request is made, so a client can be
    /// built from an incomplete configuration and fail at call time.
    #[must_use]
    pub fn new(base_url: impl Into<String>, api_key: SecretString, http: Client) -> Self {
        Self {
            base_url: base_url.into(),
            api_key,
            http,
        }
    }

    /// The platform root this client sends requests to.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Fetch the stack identified by `slug`.
    pub async fn stack_by_slug(&self, slug: &str) -> Result<Stack, CloudError> {
        let url = endpoint(&self.base_url, &["api", "instances", slug])?;

        let response = authorized(self.http.request(Method::GET, url), &self.api_key)
            .send()
            .await?;

        parse_json(response, "stack lookup").await
    }

    async fn create_grafana_api_key_from_cloud(
        &self,
        instance: &str,
        request: &CreateInstanceApiKeyRequest<'_>,
    ) -> Result<InstanceApiKey, CloudError> {
        let url = endpoint(
            &self.base_url,
            &["api", "instances", instance, "api", "auth", "keys"],
        )?;

        let response = authorized(self.http.request(Method::POST, url), &self.api_key)
            .json(request)
            .send()
            .await?;

        parse_json(response, "scoped admin key creation").await
    }
}

#[async_trait]
impl CloudApi for GrafanaCloudClient {
    async fn create_organisation_key(
        &self,
        organisation: &str,
        name: &str,
        role: &str,
    ) -> Result<CloudApiKey, CloudError> {
        let url = endpoint(&self.base_url, &["api", "orgs", organisation, "api-keys"])?;

        let response = authorized(self.http.request(Method::POST, url), &self.api_key)
            .json(&CreateCloudApiKeyRequest { name, role })
            .send()
            .await?;

        parse_json(response, "organisation key creation").await
    }

    async fn delete_organisation_key(
        &self,
        organisation: &str,
        name: &str,
    ) -> Result<(), CloudError> {
        let url = endpoint(
            &self.base_url,
            &["api", "orgs", organisation, "api-keys", name],
        )?;

        let response = authorized(self.http.request(Method::DELETE, url), &self.api_key)
            .send()
            .await?;

        expect_success(response).await
    }

    async fn create_instance_scoped_client(
        &self,
        instance: &str,
        name_prefix: &str,
        ttl: Duration,
    ) -> Result<ScopedInstanceClient, CloudError> {
        let stack = self.stack_by_slug(instance).await?;

        let name = format!("{name_prefix}{}", Uuid::new_v4().simple());

        let admin_key = self
            .create_grafana_api_key_from_cloud(
                instance,
                &CreateInstanceApiKeyRequest {
                    name: &name,
                    role: SCOPED_ADMIN_ROLE,
                    seconds_to_live: ttl.as_secs(),
                },
            )
            .await?;

        debug!(
            instance,
            admin_key_id = admin_key.id,
            "created scoped admin key"
        );

        let api = GrafanaInstanceClient::new(stack.url, admin_key.key, self.http.clone());

        Ok(ScopedInstanceClient::new(Arc::new(api), admin_key.id))
    }
}

/// HTTP client for a single Grafana instance.
#[derive(Debug, Clone)]
pub struct GrafanaInstanceClient {
    base_url: String,
    api_key: SecretString,
    http: Client,
}

impl GrafanaInstanceClient {
    /// Create a client for the instance at `base_url`, authenticated with `api_key`.
    #[must_use]
    pub fn new(base_url: impl Into<String>, api_key: SecretString, http: Client) -> Self {
        Self {
            base_url: base_url.into(),
            api_key,
            http,
        }
    }
}

#[async_trait]
impl InstanceApi for GrafanaInstanceClient {
    async fn create_instance_key(
        &self,
        name: &str,
        role: &str,
        seconds_to_live: u64,
    ) -> Result<InstanceApiKey, CloudError> {
        let url = endpoint(&self.base_url, &["api", "auth", "keys"])?;

        let response = authorized(self.http.request(Method::POST, url), &self.api_key)
            .json(&CreateInstanceApiKeyRequest {
                name,
                role,
                seconds_to_live,
            })
            .send()
            .await?;

        parse_json(response, "instance key creation").await
    }

    async fn delete_instance_key(&self, id: i64) -> Result<(), CloudError> {
        let id = id.to_string();
        let url = endpoint(&self.base_url, &["api", "auth", "keys", &id])?;

        let response = authorized(self.http.request(Method::DELETE, url), &self.api_key)
            .send()
            .await?;

        expect_success(response).await
    }
}

/// Build the URL for `segments` below `base`, percent-encoding each segment.
fn endpoint(base: &str, segments: &[&str]) -> Result<Url, CloudError> {
    let invalid = |reason: String| CloudError::InvalidUrl {
        url: base.to_string(),
        reason,
    };

    let mut url = Url::parse(base).map_err(|error| invalid(error.to_string()))?;

    url.path_segments_mut()
        .map_err(|()| invalid("url cannot be a base".to_string()))?
        .pop_if_empty()
        .extend(segments);

    Ok(url)
}

fn authorized(request: RequestBuilder, api_key: &SecretString) -> RequestBuilder {
    request.bearer_auth(api_key.expose())
}

async fn parse_json<T: DeserializeOwned>(
    response: Response,
    operation: &str,
) -> Result<T, CloudError> {
    let response = check_status(response).await?;

    debug!(operation, status = %response.status(), "grafana cloud request succeeded");

    Ok(response.json().await?)
}

async fn expect_success(response: Response) -> Result<(), CloudError> {
    check_status(response).await.map(|_response| ())
}

async fn check_status(response: Response) -> Result<Response, CloudError> {
    if response.status().is_success() {
        return Ok(response);
    }

    let status = response.status();
    let body = response.text().await.unwrap_or_default();

    Err(CloudError::Status { status, body })
}
