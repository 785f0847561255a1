//! Configuration Errors

use salvo::http::StatusError;
use tracing::error;

use grafana_cloud_secrets::config::ConfigServiceError;

pub(crate) fn into_status_error(error: ConfigServiceError) -> StatusError {
    match error {
        ConfigServiceError::NotFound => StatusError::not_found().brief("config not found"),
        error if error.is_invalid_request() => StatusError::bad_request().brief(error.to_string()),
        error => {
            error!("configuration storage failed: {error}");

            StatusError::internal_server_error()
        }
    }
}
