//! Read Role Handler

use std::sync::Arc;

use salvo::prelude::*;

use grafana_cloud_secrets::roles::RoleView;

use crate::{extensions::*, roles::errors::into_status_error, state::State};

/// Returns the role with TTLs in seconds.
#[handler]
pub(crate) async fn handler(
    req: &mut Request,
    depot: &mut Depot,
) -> Result<Json<RoleView>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let name = req.param_or_400("name")?;

    let role = state
        .roles
        .get_role(&name)
        .await
        .map_err(into_status_error)?
        .ok_or_else(|| StatusError::not_found().brief("role not found"))?;

    Ok(Json(role.view()))
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use salvo::test::{ResponseExt, TestClient};
    use serde_json::{Value, json};
    use testresult::TestResult;

    use grafana_cloud_secrets::roles::{AuthorizationLevel, CredentialKind, Role};

    use crate::test_helpers::{Mocks, service};

    use super::*;

    fn make_service(mocks: Mocks) -> Service {
        service(mocks, Router::with_path("roles/{name}").get(handler))
    }

    #[tokio::test]
    async fn test_read_role_surfaces_seconds() -> TestResult {
        let mut mocks = Mocks::default();

        mocks
            .roles
            .expect_get_role()
            .once()
            .withf(|name| name == "r2")
            .return_once(|_| {
                Ok(Some(Role {
                    credential_kind: CredentialKind::InstanceScoped,
                    target_instance: Some("stack1".to_string()),
                    authorization_level: AuthorizationLevel::Viewer,
                    ttl: Duration::from_secs(120),
                    max_ttl: Duration::from_secs(300),
                }))
            });

        let mut res = TestClient::get("http://example.com/roles/r2")
            .send(&make_service(mocks))
            .await;

        let body: Value = res.take_json().await?;

        assert_eq!(res.status_code, Some(StatusCode::OK));
        assert_eq!(
            body,
            json!({
                "api_type": "Grafana",
                "stack_slug": "stack1",
                "gc_role": "Viewer",
                "ttl": 120,
                "max_ttl": 300,
            })
        );

        Ok(())
    }

    #[tokio::test]
    async fn test_read_missing_role_returns_404() {
        let mut mocks = Mocks::default();

        mocks
            .roles
            .expect_get_role()
            .once()
            .return_once(|_| Ok(None));

        let res = TestClient::get("http://example.com/roles/nope")
            .send(&make_service(mocks))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::NOT_FOUND));
    }
}
