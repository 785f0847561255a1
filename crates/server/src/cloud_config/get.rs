//! Read Configuration Handler

use std::sync::Arc;

use salvo::prelude::*;

use grafana_cloud_secrets::config::ConfigView;

use crate::{cloud_config::errors::into_status_error, extensions::*, state::State};

/// Returns the stored configuration without its admin key.
#[handler]
pub(crate) async fn handler(depot: &mut Depot) -> Result<Json<ConfigView>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;

    let config = state
        .config
        .read_config()
        .await
        .map_err(into_status_error)?;

    Ok(Json(config))
}
