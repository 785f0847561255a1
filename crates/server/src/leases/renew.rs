//! Renew Lease Handler

use std::sync::Arc;

use jiff::Timestamp;
use salvo::prelude::*;

use crate::{
    creds::errors::into_status_error,
    extensions::*,
    leases::{lease_id, lease_not_found},
    lease_table::LeaseGrant,
    state::State,
};

/// Re-applies the role's TTLs to the lease.
#[handler]
pub(crate) async fn handler(
    req: &mut Request,
    depot: &mut Depot,
) -> Result<Json<LeaseGrant>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let lease_id = lease_id(req)?;

    let internal = state.leases.get(lease_id).await.ok_or_else(lease_not_found)?;

    let ttl = state
        .credentials
        .renew(&internal)
        .await
        .map_err(into_status_error)?;

    let grant = state
        .leases
        .extend(lease_id, ttl, Timestamp::now())
        .await
        .ok_or_else(lease_not_found)?;

    Ok(Json(grant))
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use salvo::test::{ResponseExt, TestClient};
    use serde_json::Value;
    use testresult::TestResult;
    use uuid::Uuid;

    use grafana_cloud_secrets::{
        credentials::{CredentialsError, LeaseMetadata, LeaseTtl},
        roles::CredentialKind,
    };

    use crate::test_helpers::{Mocks, service_with_state, state};

    use super::*;

    fn lease() -> LeaseMetadata {
        LeaseMetadata {
            id: String::new(),
            name: "r1_abc".to_string(),
            kind: CredentialKind::OrganisationScoped,
            stack_slug: None,
            role: Some("r1".to_string()),
        }
    }

    fn make_service(state: Arc<State>) -> Service {
        service_with_state(state, Router::with_path("leases/{id}/renew").post(handler))
    }

    #[tokio::test]
    async fn test_renew_applies_role_ttl() -> TestResult {
        let mut mocks = Mocks::default();

        mocks
            .credentials
            .expect_renew()
            .once()
            .withf(|lease| lease.role.as_deref() == Some("r1"))
            .return_once(|_| {
                Ok(LeaseTtl {
                    ttl: Some(Duration::from_secs(600)),
                    max_ttl: None,
                })
            });

        let state = state(mocks);
        let grant = state
            .leases
            .record(lease(), LeaseTtl::default(), Timestamp::now())
            .await;

        let mut res = TestClient::post(format!(
            "http://example.com/leases/{}/renew",
            grant.lease_id
        ))
        .send(&make_service(state))
        .await;

        let body: Value = res.take_json().await?;

        assert_eq!(res.status_code, Some(StatusCode::OK));
        assert_eq!(body["lease_duration"], 600);

        Ok(())
    }

    #[tokio::test]
    async fn test_renew_with_vanished_role_returns_500() {
        let mut mocks = Mocks::default();

        mocks
            .credentials
            .expect_renew()
            .once()
            .return_once(|_| Err(CredentialsError::RoleNotFound("r1".to_string())));

        let state = state(mocks);
        let grant = state
            .leases
            .record(lease(), LeaseTtl::default(), Timestamp::now())
            .await;

        let res = TestClient::post(format!(
            "http://example.com/leases/{}/renew",
            grant.lease_id
        ))
        .send(&make_service(state))
        .await;

        assert_eq!(res.status_code, Some(StatusCode::INTERNAL_SERVER_ERROR));
    }

    #[tokio::test]
    async fn test_renew_unknown_lease_returns_404() {
        let mut mocks = Mocks::default();

        mocks.credentials.expect_renew().never();

        let res = TestClient::post(format!(
            "http://example.com/leases/{}/renew",
            Uuid::now_v7()
        ))
        .send(&make_service(state(mocks)))
        .await;

        assert_eq!(res.status_code, Some(StatusCode::NOT_FOUND));
    }

    #[tokio::test]
    async fn test_renew_malformed_lease_id_returns_400() {
        let res = TestClient::post("http://example.com/leases/not-a-uuid/renew")
            .send(&make_service(state(Mocks::default())))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::BAD_REQUEST));
    }
}
