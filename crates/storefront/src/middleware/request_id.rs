//! Request ID middleware for request tracing and correlation.
//!
//! Generates a UUID v4 for each request if not provided by an upstream proxy
//! (e.g., a load balancer). The request ID is:
//! - Recorded in the current tracing span, along with the client address
//! - Added to the Sentry scope for error correlation
//! - Returned in the response headers

use std::net::SocketAddr;

use axum::{
    extract::{ConnectInfo, Request},
    http::HeaderValue,
    middleware::Next,
    response::Response,
};
use tracing::Span;
use uuid::Uuid;

/// The HTTP header name for request IDs.
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// The HTTP header carrying the original client address behind a proxy.
pub const FORWARDED_FOR_HEADER: &str = "x-forwarded-for";

/// Middleware that ensures every request has a unique request ID.
///
/// If the incoming request has an `x-request-id` header, that value is used.
/// Otherwise, a new UUID v4 is generated.
pub async fn request_id_middleware(request: Request, next: Next) -> Response {
    let request_id = request
        .headers()
        .get(REQUEST_ID_HEADER)
        .and_then(|h| h.to_str().ok())
        .filter(|value| !value.is_empty())
        .map_or_else(|| Uuid::new_v4().to_string(), String::from);

    let span = Span::current();
    span.record("request_id", request_id.as_str());
    if let Some(remote_addr) = remote_addr(&request) {
        span.record("remote_addr", remote_addr.as_str());
    }

    // Set in Sentry scope for error correlation
    sentry::configure_scope(|scope| {
        scope.set_tag("request_id", &request_id);
    });

    let mut response = next.run(request).await;

    // Add to response headers so clients can reference the request ID
    if let Ok(value) = HeaderValue::from_str(&request_id) {
        response.headers_mut().insert(REQUEST_ID_HEADER, value);
    }

    response
}

/// Client address: the proxy-supplied `x-forwarded-for` value, else the peer.
fn remote_addr(request: &Request) -> Option<String> {
    request
        .headers()
        .get(FORWARDED_FOR_HEADER)
        .and_then(|h| h.to_str().ok())
        .map(String::from)
        .or_else(|| {
            request
                .extensions()
                .get::<ConnectInfo<SocketAddr>>()
                .map(|ConnectInfo(addr)| addr.ip().to_string())
        })
}
