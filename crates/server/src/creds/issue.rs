//! Issue Credential Handler

use std::sync::Arc;

use jiff::Timestamp;
use salvo::prelude::*;
use serde::Serialize;
use uuid::Uuid;

use grafana_cloud_secrets::credentials::CredentialResponse;

use crate::{creds::errors::into_status_error, extensions::*, state::State};

#[derive(Debug, Serialize)]
pub(crate) struct IssuedResponse {
    pub lease_id: Uuid,

    /// Lease duration in seconds
    pub lease_duration: u64,

    pub renewable: bool,

    pub data: CredentialResponse,
}

/// Issues a credential for the role and starts a lease for it.
#[handler]
pub(crate) async fn handler(
    req: &mut Request,
    depot: &mut Depot,
) -> Result<Json<IssuedResponse>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let name = req.param_or_400("name")?;

    let issued = state
        .credentials
        .issue(&name)
        .await
        .map_err(into_status_error)?;

    let grant = state
        .leases
        .record(issued.internal, issued.ttl, Timestamp::now())
        .await;

    Ok(Json(IssuedResponse {
        lease_id: grant.lease_id,
        lease_duration: grant.lease_duration,
        renewable: grant.renewable,
        data: issued.credential.response(),
    }))
}
