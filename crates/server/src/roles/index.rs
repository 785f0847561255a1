//! Role Index Handler

use std::sync::Arc;

use salvo::prelude::*;
use serde::{Deserialize, Serialize};

use crate::{extensions::*, state::State};

#[derive(Debug, Serialize, Deserialize)]
pub(crate) struct RolesResponse {
    /// Names of all stored roles
    pub keys: Vec<String>,
}

#[handler]
pub(crate) async fn handler(depot: &mut Depot) -> Result<Json<RolesResponse>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;

    let keys = state
        .roles
        .list_roles()
        .await
        .or_500("failed to list roles")?;

    Ok(Json(RolesResponse { keys }))
}
