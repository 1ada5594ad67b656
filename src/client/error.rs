use std::time::Duration;

use axum::http::StatusCode;

#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("No auth token available after waiting {waited:?}")]
    AuthTimeout { waited: Duration },

    #[error("Backend request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Backend returned {status} for {url}")]
    Status { status: u16, url: String },
}

impl ClientError {
    /// Status the dashboard answers with when a backend call fails.
    pub fn status_code(&self) -> StatusCode {
        match self {
            ClientError::AuthTimeout { .. } => StatusCode::SERVICE_UNAVAILABLE,
            ClientError::Request(_) => StatusCode::BAD_GATEWAY,
            ClientError::Status { status, .. } if *status == 404 => StatusCode::NOT_FOUND,
            ClientError::Status { .. } => StatusCode::BAD_GATEWAY,
        }
    }
}
