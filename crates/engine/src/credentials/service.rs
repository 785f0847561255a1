//! Credentials service.

use std::{fmt, sync::Arc};

use async_trait::async_trait;
use mockall::automock;
use tracing::info;
use uuid::Uuid;

use crate::{
    cache::ClientCache,
    cloud::CloudApi,
    config::{CloudConfig, read_config},
    credentials::{
        CredentialsError, IssuedCredential, IssuedSecret, LeaseMetadata, LeaseTtl,
        scoped::with_scoped_admin,
    },
    roles::{CredentialKind, Role, RolesService},
    storage::Storage,
};

/// [`CredentialsService`] issuing keys through the cached upstream client.
#[derive(Clone)]
pub struct CloudCredentialsService {
    storage: Arc<dyn Storage>,
    roles: Arc<dyn RolesService>,
    cache: Arc<ClientCache>,
}

impl CloudCredentialsService {
    /// Create the service over shared storage, roles and client cache.
    #[must_use]
    pub fn new(
        storage: Arc<dyn Storage>,
        roles: Arc<dyn RolesService>,
        cache: Arc<ClientCache>,
    ) -> Self {
        Self {
            storage,
            roles,
            cache,
        }
    }

    async fn role(&self, name: &str) -> Result<Role, CredentialsError> {
        if name.is_empty() {
            return Err(CredentialsError::RoleNotFound(String::new()));
        }

        self.roles
            .get_role(name)
            .await?
            .ok_or_else(|| CredentialsError::RoleNotFound(name.to_string()))
    }

    async fn config(&self) -> Result<CloudConfig, CredentialsError> {
        Ok(read_config(self.storage.as_ref()).await?.unwrap_or_default())
    }
}

impl fmt::Debug for CloudCredentialsService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CloudCredentialsService")
            .field("cache", &self.cache)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl CredentialsService for CloudCredentialsService {
    async fn issue(&self, role_name: &str) -> Result<IssuedSecret, CredentialsError> {
        let role = self.role(role_name).await?;
        let cloud = self.cache.get().await?;
        let config = self.config().await?;

        let external_name = format!("{role_name}_{}", Uuid::new_v4());

        let credential = match role.credential_kind {
            CredentialKind::OrganisationScoped => {
                issue_organisation_key(cloud.as_ref(), &config, &role, external_name).await?
            }
            CredentialKind::InstanceScoped => {
                let instance = role
                    .target_instance
                    .as_deref()
                    .ok_or_else(|| CredentialsError::MissingTargetInstance(role_name.to_string()))?;

                issue_instance_key(cloud.as_ref(), &config, &role, instance, external_name).await?
            }
        };

        info!(
            role = role_name,
            kind = %credential.kind,
            name = %credential.external_name,
            stack_slug = credential.target_instance.as_deref(),
            "issued credential"
        );

        Ok(IssuedSecret {
            internal: credential.lease_metadata(role_name),
            ttl: LeaseTtl::from(&role),
            credential,
        })
    }

    async fn renew(&self, lease: &LeaseMetadata) -> Result<LeaseTtl, CredentialsError> {
        let role_name = lease
            .role
            .as_deref()
            .ok_or(CredentialsError::MissingLeaseField("role"))?;

        let role = self.role(role_name).await?;

        Ok(LeaseTtl::from(&role))
    }

    async fn revoke(&self, lease: &LeaseMetadata) -> Result<(), CredentialsError> {
        match lease.kind {
            CredentialKind::OrganisationScoped => {
                let name = non_empty(&lease.name)
                    .ok_or(CredentialsError::MissingLeaseField("name"))?;

                let config = self.config().await?;
                let organisation = non_empty(&config.organisation)
                    .ok_or(CredentialsError::MissingConfigField("organisation"))?;

                let cloud = self.cache.get().await?;

                cloud
                    .delete_organisation_key(organisation, name)
                    .await
                    .map_err(|source| CredentialsError::DeleteKey {
                        kind: lease.kind,
                        source,
                    })?;
            }
            CredentialKind::InstanceScoped => {
                let instance = lease
                    .stack_slug
                    .as_deref()
                    .and_then(non_empty)
                    .ok_or(CredentialsError::MissingLeaseField("stack_slug"))?;

                let id = non_empty(&lease.id)
                    .ok_or(CredentialsError::MissingLeaseField("id"))?
                    .parse::<i64>()
                    .map_err(|_error| CredentialsError::InvalidKeyId(lease.id.clone()))?;

                let cloud = self.cache.get().await?;

                with_scoped_admin(cloud.as_ref(), instance, |api| async move {
                    api.delete_instance_key(id)
                        .await
                        .map_err(|source| CredentialsError::DeleteKey {
                            kind: CredentialKind::InstanceScoped,
                            source,
                        })
                })
                .await?;
            }
        }

        info!(
            kind = %lease.kind,
            name = %lease.name,
            stack_slug = lease.stack_slug.as_deref(),
            "revoked credential"
        );

        Ok(())
    }
}

#[automock]
#[async_trait]
/// Credential lifecycle operations.
pub trait CredentialsService: Send + Sync {
    /// Create a new upstream key for the role called `role_name`.
    async fn issue(&self, role_name: &str) -> Result<IssuedSecret, CredentialsError>;

    /// Re-read the lease's role and return its current TTLs. No upstream call is made.
    async fn renew(&self, lease: &LeaseMetadata) -> Result<LeaseTtl, CredentialsError>;

    /// Delete the upstream key described by `lease`.
    ///
    /// Deleting a key that no longer exists upstream fails with the upstream error.
    async fn revoke(&self, lease: &LeaseMetadata) -> Result<(), CredentialsError>;
}

fn non_empty(value: &str) -> Option<&str> {
    (!value.is_empty()).then_some(value)
}

async fn issue_organisation_key(
    cloud: &dyn CloudApi,
    config: &CloudConfig,
    role: &Role,
    external_name: String,
) -> Result<IssuedCredential, CredentialsError> {
    let kind = CredentialKind::OrganisationScoped;

    let key = cloud
        .create_organisation_key(
            &config.organisation,
            &external_name,
            role.authorization_level.as_str(),
        )
        .await
        .map_err(|source| CredentialsError::CreateKey { kind, source })?;

    Ok(IssuedCredential {
        external_id: key.id.map(|id| id.to_string()).unwrap_or_default(),
        external_name,
        token: key.token,
        kind,
        target_instance: None,
        telemetry: config.telemetry_fields(),
    })
}

async fn issue_instance_key(
    cloud: &dyn CloudApi,
    config: &CloudConfig,
    role: &Role,
    instance: &str,
    external_name: String,
) -> Result<IssuedCredential, CredentialsError> {
    let kind = CredentialKind::InstanceScoped;
    let level = role.authorization_level.as_str();
    let seconds_to_live = role.ttl.as_secs();
    let name = external_name.as_str();

    let key = with_scoped_admin(cloud, instance, |api| async move {
        api.create_instance_key(name, level, seconds_to_live)
            .await
            .map_err(|source| CredentialsError::CreateKey { kind, source })
    })
    .await?;

    Ok(IssuedCredential {
        external_id: key.id.to_string(),
        external_name,
        token: key.key,
        kind,
        target_instance: Some(instance.to_string()),
        telemetry: config.telemetry_fields(),
    })
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use reqwest::StatusCode;
    use serde_json::json;
    use testresult::TestResult;

    use crate::{
        cloud::{CloudApiKey, CloudError, InstanceApiKey, MockCloudApi, MockInstanceApi},
        credentials::{SCOPED_ADMIN_NAME_PREFIX, SCOPED_ADMIN_TTL},
        secret::SecretString,
        test::{TestContext, scoped_client},
    };

    use super::*;

    const ADMIN_KEY_ID: i64 = 99;

    fn organisation_role() -> serde_json::Value {
        json!({ "api_type": "Cloud", "gc_role": "Viewer", "ttl": 300, "max_ttl": 3600 })
    }

    fn instance_role() -> serde_json::Value {
        json!({
            "api_type": "Grafana",
            "stack_slug": "stack1",
            "gc_role": "Viewer",
            "ttl": 120,
            "max_ttl": 300,
        })
    }

    fn not_found() -> CloudError {
        CloudError::Status {
            status: StatusCode::NOT_FOUND,
            body: "api key not found".to_string(),
        }
    }

    /// Expect exactly one scoped admin key for `stack1`, deleted afterwards.
    fn expect_scoped_admin(cloud: &mut MockCloudApi, mut instance_api: MockInstanceApi) {
        instance_api
            .expect_delete_instance_key()
            .withf(|id| *id == ADMIN_KEY_ID)
            .times(1)
            .returning(|_| Ok(()));

        cloud
            .expect_create_instance_scoped_client()
            .withf(|instance, prefix, ttl| {
                instance == "stack1" && prefix == SCOPED_ADMIN_NAME_PREFIX && *ttl == SCOPED_ADMIN_TTL
            })
            .times(1)
            .return_once(move |_, _, _| Ok(scoped_client(instance_api, ADMIN_KEY_ID)));
    }

    #[tokio::test]
    async fn issue_organisation_key() -> TestResult {
        let mut cloud = MockCloudApi::new();

        cloud
            .expect_create_organisation_key()
            .withf(|organisation, name, role| {
                organisation == "acme" && name.starts_with("r1_") && role == "Viewer"
            })
            .times(2)
            .returning(|_, name, role| {
                Ok(CloudApiKey {
                    id: None,
                    name: name.to_string(),
                    role: role.to_string(),
                    token: SecretString::new(format!("glc_{name}")),
                })
            });

        let ctx = TestContext::with_cloud(cloud);

        ctx.write_config().await;
        ctx.write_role("r1", organisation_role()).await;

        let first = ctx.credentials.issue("r1").await?;
        let second = ctx.credentials.issue("r1").await?;

        assert!(!first.credential.token.is_empty(), "expected a token");
        assert_ne!(first.credential.token, second.credential.token);
        assert_ne!(first.internal.name, second.internal.name);

        assert_eq!(first.internal.kind, CredentialKind::OrganisationScoped);
        assert_eq!(first.internal.stack_slug, None);
        assert_eq!(first.internal.role.as_deref(), Some("r1"));
        assert_eq!(
            first.ttl,
            LeaseTtl {
                ttl: Some(Duration::from_secs(300)),
                max_ttl: Some(Duration::from_secs(3_600)),
            }
        );

        let response = first.credential.response();

        assert_eq!(response.telemetry["prometheus_user"], "1234");
        assert_eq!(response.telemetry["user"], "1234");
        assert_eq!(response.telemetry["loki_user"], "5678");

        Ok(())
    }

    #[tokio::test]
    async fn issue_instance_key_through_scoped_admin() -> TestResult {
        let mut cloud = MockCloudApi::new();
        let mut instance_api = MockInstanceApi::new();

        instance_api
            .expect_create_instance_key()
            .withf(|name, role, seconds_to_live| {
                name.starts_with("r2_") && role == "Viewer" && *seconds_to_live == 120
            })
            .times(1)
            .returning(|name, _, _| {
                Ok(InstanceApiKey {
                    id: 42,
                    name: name.to_string(),
                    key: SecretString::new("glsa_token"),
                })
            });

        expect_scoped_admin(&mut cloud, instance_api);

        let ctx = TestContext::with_cloud(cloud);

        ctx.write_config().await;
        ctx.write_role("r2", instance_role()).await;

        let issued = ctx.credentials.issue("r2").await?;

        assert_eq!(issued.internal.id, "42");
        assert_eq!(issued.internal.kind, CredentialKind::InstanceScoped);
        assert_eq!(issued.internal.stack_slug.as_deref(), Some("stack1"));
        assert_eq!(issued.credential.token.expose(), "glsa_token");

        Ok(())
    }

    #[tokio::test]
    async fn failed_instance_issue_still_deletes_admin_key() -> TestResult {
        let mut cloud = MockCloudApi::new();
        let mut instance_api = MockInstanceApi::new();

        instance_api
            .expect_create_instance_key()
            .times(1)
            .returning(|_, _, _| {
                Err(CloudError::Status {
                    status: StatusCode::FORBIDDEN,
                    body: "denied".to_string(),
                })
            });

        expect_scoped_admin(&mut cloud, instance_api);

        let ctx = TestContext::with_cloud(cloud);

        ctx.write_config().await;
        ctx.write_role("r2", instance_role()).await;

        let result = ctx.credentials.issue("r2").await;

        assert!(
            matches!(
                result,
                Err(CredentialsError::CreateKey {
                    kind: CredentialKind::InstanceScoped,
                    ..
                })
            ),
            "expected create key error, got {result:?}"
        );

        Ok(())
    }

    #[tokio::test]
    async fn issue_against_missing_role_fails() {
        let ctx = TestContext::new();

        for name in ["", "missing"] {
            let result = ctx.credentials.issue(name).await;

            assert!(
                matches!(result, Err(CredentialsError::RoleNotFound(_))),
                "expected role not found, got {result:?}"
            );
        }
    }

    #[tokio::test]
    async fn revoke_instance_key_deletes_recorded_id() -> TestResult {
        let mut cloud = MockCloudApi::new();
        let mut instance_api = MockInstanceApi::new();

        instance_api
            .expect_delete_instance_key()
            .withf(|id| *id == 42)
            .times(1)
            .returning(|_| Ok(()));

        expect_scoped_admin(&mut cloud, instance_api);

        let ctx = TestContext::with_cloud(cloud);

        ctx.write_config().await;

        let lease = LeaseMetadata {
            id: "42".to_string(),
            name: "r2_abc".to_string(),
            kind: CredentialKind::InstanceScoped,
            stack_slug: Some("stack1".to_string()),
            role: Some("r2".to_string()),
        };

        ctx.credentials.revoke(&lease).await?;

        Ok(())
    }

    #[tokio::test]
    async fn revoke_organisation_key_deletes_recorded_name() -> TestResult {
        let mut cloud = MockCloudApi::new();

        cloud
            .expect_delete_organisation_key()
            .withf(|organisation, name| organisation == "acme" && name == "r1_abc")
            .times(1)
            .returning(|_, _| Ok(()));

        let ctx = TestContext::with_cloud(cloud);

        ctx.write_config().await;

        let lease = LeaseMetadata::from_internal(json!({
            "id": "",
            "name": "r1_abc",
            "type": "Cloud",
            "role": "r1",
        }))?;

        ctx.credentials.revoke(&lease).await?;

        Ok(())
    }

    #[tokio::test]
    async fn revoke_legacy_lease_without_type_deletes_organisation_key() -> TestResult {
        let mut cloud = MockCloudApi::new();

        cloud
            .expect_delete_organisation_key()
            .withf(|_, name| name == "r1_legacy")
            .times(1)
            .returning(|_, _| Ok(()));

        let ctx = TestContext::with_cloud(cloud);

        ctx.write_config().await;

        let lease = LeaseMetadata::from_internal(json!({ "name": "r1_legacy" }))?;

        ctx.credentials.revoke(&lease).await?;

        Ok(())
    }

    #[tokio::test]
    async fn revoke_of_deleted_key_surfaces_not_found() {
        let mut cloud = MockCloudApi::new();

        cloud
            .expect_delete_organisation_key()
            .times(1)
            .returning(|_, _| Err(not_found()));

        let ctx = TestContext::with_cloud(cloud);

        ctx.write_config().await;

        let lease = LeaseMetadata {
            id: String::new(),
            name: "r1_gone".to_string(),
            kind: CredentialKind::OrganisationScoped,
            stack_slug: None,
            role: None,
        };

        let result = ctx.credentials.revoke(&lease).await;

        assert!(
            result
                .as_ref()
                .err()
                .and_then(CredentialsError::upstream)
                .is_some_and(CloudError::is_not_found),
            "expected upstream not found, got {result:?}"
        );
    }

    #[tokio::test]
    async fn revoke_instance_lease_with_bad_id_fails_before_upstream() {
        let ctx = TestContext::new();

        let lease = LeaseMetadata {
            id: "abc".to_string(),
            name: "r2_abc".to_string(),
            kind: CredentialKind::InstanceScoped,
            stack_slug: Some("stack1".to_string()),
            role: None,
        };

        let result = ctx.credentials.revoke(&lease).await;

        assert!(
            matches!(result, Err(CredentialsError::InvalidKeyId(ref id)) if id == "abc"),
            "expected invalid key id, got {result:?}"
        );
    }

    #[tokio::test]
    async fn revoke_organisation_lease_without_name_fails_before_upstream() -> TestResult {
        let ctx = TestContext::new();

        ctx.write_config().await;

        let lease = LeaseMetadata::from_internal(json!({ "id": "", "type": "Cloud" }))?;

        let result = ctx.credentials.revoke(&lease).await;

        assert!(
            matches!(result, Err(CredentialsError::MissingLeaseField("name"))),
            "expected missing name, got {result:?}"
        );

        Ok(())
    }

    #[tokio::test]
    async fn revoke_instance_lease_without_id_fails_before_upstream() {
        let ctx = TestContext::new();

        let lease = LeaseMetadata {
            id: String::new(),
            name: "r2_abc".to_string(),
            kind: CredentialKind::InstanceScoped,
            stack_slug: Some("stack1".to_string()),
            role: None,
        };

        let result = ctx.credentials.revoke(&lease).await;

        assert!(
            matches!(result, Err(CredentialsError::MissingLeaseField("id"))),
            "expected missing id, got {result:?}"
        );
    }

    #[tokio::test]
    async fn revoke_without_configured_organisation_fails_before_upstream() {
        let ctx = TestContext::new();

        let lease = LeaseMetadata {
            id: String::new(),
            name: "r1_abc".to_string(),
            kind: CredentialKind::OrganisationScoped,
            stack_slug: None,
            role: None,
        };

        let result = ctx.credentials.revoke(&lease).await;

        assert!(
            matches!(
                result,
                Err(CredentialsError::MissingConfigField("organisation"))
            ),
            "expected missing organisation, got {result:?}"
        );
    }

    #[tokio::test]
    async fn renew_returns_current_role_ttls() -> TestResult {
        let ctx = TestContext::new();

        ctx.write_role("r1", organisation_role()).await;

        let lease = LeaseMetadata {
            id: String::new(),
            name: "r1_abc".to_string(),
            kind: CredentialKind::OrganisationScoped,
            stack_slug: None,
            role: Some("r1".to_string()),
        };

        let ttl = ctx.credentials.renew(&lease).await?;

        assert_eq!(ttl.ttl, Some(Duration::from_secs(300)));
        assert_eq!(ttl.max_ttl, Some(Duration::from_secs(3_600)));

        Ok(())
    }

    #[tokio::test]
    async fn renew_fails_when_role_vanished() {
        let ctx = TestContext::new();

        let lease = LeaseMetadata {
            id: String::new(),
            name: "gone_abc".to_string(),
            kind: CredentialKind::OrganisationScoped,
            stack_slug: None,
            role: Some("gone".to_string()),
        };

        let result = ctx.credentials.renew(&lease).await;

        assert!(
            matches!(result, Err(CredentialsError::RoleNotFound(ref name)) if name == "gone"),
            "expected role not found, got {result:?}"
        );
    }

    #[tokio::test]
    async fn renew_requires_role_in_lease() {
        let ctx = TestContext::new();

        let lease = LeaseMetadata::from_internal(json!({ "name": "r1_abc" }))
            .expect("valid lease data");

        let result = ctx.credentials.renew(&lease).await;

        assert!(
            matches!(result, Err(CredentialsError::MissingLeaseField("role"))),
            "expected missing role, got {result:?}"
        );
    }
}
