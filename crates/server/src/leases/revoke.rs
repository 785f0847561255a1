//! Revoke Lease Handler

use std::sync::Arc;

use salvo::prelude::*;
use tracing::info;

use crate::{
    creds::errors::into_status_error,
    extensions::*,
    leases::{lease_id, lease_not_found},
    state::State,
};

/// Takes the lease out of the table and deletes the credential upstream.
///
/// The lease is put back when the upstream delete fails so the revoke can be retried.
/// Concurrent revokes of one lease reach the upstream at most once.
#[handler]
pub(crate) async fn handler(
    req: &mut Request,
    depot: &mut Depot,
) -> Result<StatusCode, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let lease_id = lease_id(req)?;

    let lease = state.leases.take(lease_id).await.ok_or_else(lease_not_found)?;

    let revoked = state.credentials.revoke(lease.internal()).await;

    if let Err(error) = revoked {
        state.leases.restore(lease_id, lease).await;

        return Err(into_status_error(error));
    }

    info!(%lease_id, "lease revoked");

    Ok(StatusCode::NO_CONTENT)
}
