//! Unified error handling with Sentry integration.
//!
//! Provides a unified `AppError` type that captures server errors to Sentry
//! before responding to the client. All route handlers return
//! `Result<T, AppError>`.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use cartwheel_core::CartError;
use serde::Serialize;
use thiserror::Error;

/// Application-level error type for the storefront.
#[derive(Debug, Error)]
pub enum AppError {
    /// A cart operation was rejected. Always the client's to fix.
    #[error(transparent)]
    Cart(#[from] CartError),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// JSON body of an error response.
#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    reason: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    message: Option<&'static str>,
}

impl AppError {
    /// HTTP status for this error.
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::Cart(_) => StatusCode::BAD_REQUEST,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // Capture server errors to Sentry
        if matches!(self, Self::Internal(_)) {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                event = "server.error",
                error = %self,
                sentry_event_id = %event_id,
                "Request error"
            );
        }

        // Don't expose internal error details to clients
        let body = match &self {
            Self::Cart(err) => ErrorBody {
                error: err.to_string(),
                reason: Some(err.reason()),
                message: None,
            },
            Self::NotFound(_) => ErrorBody {
                error: "not_found".to_string(),
                reason: None,
                message: None,
            },
            Self::Internal(_) => ErrorBody {
                error: "internal_server_error".to_string(),
                reason: None,
                message: Some("Internal server error"),
            },
        };

        (self.status(), Json(body)).into_response()
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;
