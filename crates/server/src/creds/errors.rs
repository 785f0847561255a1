//! Credential Errors

use salvo::http::StatusError;
use tracing::error;

use grafana_cloud_secrets::credentials::CredentialsError;

pub(crate) fn into_status_error(error: CredentialsError) -> StatusError {
    error!("credential operation failed: {error}");

    if error.upstream().is_some() {
        return StatusError::bad_gateway().brief(error.to_string());
    }

    StatusError::internal_server_error().brief(error.to_string())
}
