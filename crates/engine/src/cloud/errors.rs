//! Upstream API errors.

use reqwest::StatusCode;
use thiserror::Error;

/// Errors that can occur when communicating with Grafana Cloud.
#[derive(Debug, Error)]
pub enum CloudError {
    /// An HTTP transport or serialization error occurred.
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    /// The configured base URL cannot be used to build a request.
    #[error("invalid url {url:?}: {reason}")]
    InvalidUrl { url: String, reason: String },

    /// Grafana Cloud returned a non-2xx response.
    #[error("request failed with status {status}: {body}")]
    Status { status: StatusCode, body: String },
}

impl CloudError {
    /// Whether the upstream reported that the target does not exist.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::Status { status, .. } if *status == StatusCode::NOT_FOUND)
    }
}
