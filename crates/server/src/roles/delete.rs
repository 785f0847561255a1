//! Delete Role Handler

use std::sync::Arc;

use salvo::prelude::*;

use crate::{extensions::*, roles::errors::into_status_error, state::State};

#[handler]
pub(crate) async fn handler(
    req: &mut Request,
    depot: &mut Depot,
) -> Result<StatusCode, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let name = req.param_or_400("name")?;

    state
        .roles
        .delete_role(&name)
        .await
        .map_err(into_status_error)?;

    Ok(StatusCode::NO_CONTENT)
}
