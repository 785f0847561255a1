//! Write Configuration Handler

use std::sync::Arc;

use salvo::prelude::*;

use grafana_cloud_secrets::{WriteOperation, config::ConfigUpdate};

use crate::{cloud_config::errors::into_status_error, extensions::*, state::State};

/// Creates the configuration, or merges the supplied fields into the stored one.
#[handler]
pub(crate) async fn handler(
    req: &mut Request,
    depot: &mut Depot,
) -> Result<StatusCode, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let fields = req.fields_or_400().await?;

    let update = ConfigUpdate::from_fields(fields).map_err(into_status_error)?;

    let operation = if state
        .config
        .config_exists()
        .await
        .map_err(into_status_error)?
    {
        WriteOperation::Update
    } else {
        WriteOperation::Create
    };

    state
        .config
        .write_config(operation, update)
        .await
        .map_err(into_status_error)?;

    Ok(StatusCode::NO_CONTENT)
}
