use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use std::fmt;

/// Application-specific error types.
#[derive(Debug, Clone)]
pub enum AppError {
    /// Transport failure: the upstream API produced no usable response.
    Transport(String),
    /// The upstream API answered with a non-2xx status.
    UpstreamStatus {
        /// HTTP status code returned by the upstream.
        status: u16,
        /// Body text (or a placeholder when the body could not be read).
        message: String,
    },
    /// Bad request error (invalid input).
    BadRequest(String),
    /// Internal server error.
    Internal(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Transport(msg) => write!(f, "Transport error: {}", msg),
            AppError::UpstreamStatus { status, message } => {
                write!(f, "Upstream API returned {}: {}", status, message)
            }
            AppError::BadRequest(msg) => write!(f, "Bad request: {}", msg),
            AppError::Internal(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl AppError {
    /// The upstream status code, when this error carries one.
    #[allow(dead_code)]
    pub fn status_code(&self) -> Option<u16> {
        match self {
            AppError::UpstreamStatus { status, .. } => Some(*status),
            _ => None,
        }
    }
}

impl IntoResponse for AppError {
    /// Converts the error into an HTTP response.
    ///
    /// Upstream faults map to 502 so callers can tell a broken backend from
    /// a broken viewer.
    fn into_response(self) -> Response {
        let (status, error_message) = match &self {
            AppError::Transport(msg) => {
                tracing::error!("Transport error: {}", msg);
                (StatusCode::BAD_GATEWAY, format!("Transport error: {}", msg))
            }
            AppError::UpstreamStatus { status, message } => {
                tracing::error!("Upstream API error {}: {}", status, message);
                (
                    StatusCode::BAD_GATEWAY,
                    format!("Upstream API returned {}", status),
                )
            }
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            AppError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
        };

        let body = Json(json!({
            "error": error_message,
        }));

        (status, body).into_response()
    }
}

impl From<reqwest::Error> for AppError {
    /// Classifies a `reqwest::Error`.
    ///
    /// Timeouts, connect failures, and body read failures are transport
    /// errors; anything that made it to a status line keeps its code.
    fn from(err: reqwest::Error) -> Self {
        if let Some(status) = err.status() {
            AppError::UpstreamStatus {
                status: status.as_u16(),
                message: err.to_string(),
            }
        } else {
            AppError::Transport(err.to_string())
        }
    }
}
