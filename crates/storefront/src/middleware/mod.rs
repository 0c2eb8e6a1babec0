//! HTTP middleware stack for the storefront.
//!
//! # Middleware Order (outermost first)
//!
//! 1. Sentry layers (capture errors, added in `main`)
//! 2. `TraceLayer` (one span per request, see [`make_request_span`])
//! 3. Request ID (record request id and client address in the span)
//! 4. Session (resolve `X-Session-Id`, echo it on every response)
//! 5. Panic catcher (render handler panics as the generic 500 body)

pub mod request_id;
pub mod session;

use axum::{extract::Request, response::IntoResponse, response::Response};
use tracing::{Span, field::Empty};

use crate::error::AppError;

pub use request_id::{REQUEST_ID_HEADER, request_id_middleware};
pub use session::{CurrentSession, SESSION_ID_HEADER, session_middleware};

/// Create the per-request tracing span.
///
/// `request_id`, `session_id` and `remote_addr` start empty and are recorded
/// by the middlewares that resolve them.
pub fn make_request_span(request: &Request) -> Span {
    tracing::info_span!(
        "request",
        method = %request.method(),
        path = %request.uri().path(),
        request_id = Empty,
        session_id = Empty,
        remote_addr = Empty,
    )
}

/// Convert a handler panic into a 500 response.
///
/// Cart mutations commit with a single write, so a panic never leaves a cart
/// half-updated; the session simply keeps its pre-request state.
pub fn handle_panic(panic: Box<dyn std::any::Any + Send + 'static>) -> Response {
    let detail = panic
        .downcast_ref::<String>()
        .cloned()
        .or_else(|| panic.downcast_ref::<&str>().map(ToString::to_string))
        .unwrap_or_else(|| "unknown panic".to_string());
    AppError::Internal(format!("handler panicked: {detail}")).into_response()
}
