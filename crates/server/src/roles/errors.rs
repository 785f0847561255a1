//! Role Errors

use salvo::http::StatusError;
use tracing::error;

use grafana_cloud_secrets::roles::RolesServiceError;

pub(crate) fn into_status_error(error: RolesServiceError) -> StatusError {
    match error {
        RolesServiceError::NotFound => StatusError::not_found().brief("role not found"),
        error if error.is_invalid_request() => StatusError::bad_request().brief(error.to_string()),
        error => {
            error!("role storage failed: {error}");

            StatusError::internal_server_error()
        }
    }
}
