//! Delete Configuration Handler

use std::sync::Arc;

use salvo::prelude::*;

use crate::{cloud_config::errors::into_status_error, extensions::*, state::State};

#[handler]
pub(crate) async fn handler(depot: &mut Depot) -> Result<StatusCode, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;

    state
        .config
        .delete_config()
        .await
        .map_err(into_status_error)?;

    Ok(StatusCode::NO_CONTENT)
}
