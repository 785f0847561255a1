//! Write Role Handler

use std::sync::Arc;

use salvo::prelude::*;

use grafana_cloud_secrets::{WriteOperation, roles::RoleUpdate};

use crate::{extensions::*, roles::errors::into_status_error, state::State};

/// Creates the role, or merges the supplied fields into the stored one.
#[handler]
pub(crate) async fn handler(
    req: &mut Request,
    depot: &mut Depot,
) -> Result<StatusCode, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let name = req.param_or_400("name")?;
    let fields = req.fields_or_400().await?;

    let update = RoleUpdate::from_fields(fields).map_err(into_status_error)?;

    let operation = match state.roles.get_role(&name).await.map_err(into_status_error)? {
        Some(_) => WriteOperation::Update,
        None => WriteOperation::Create,
    };

    state
        .roles
        .write_role(operation, &name, update)
        .await
        .map_err(into_status_error)?;

    Ok(StatusCode::NO_CONTENT)
}
