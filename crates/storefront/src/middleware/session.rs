//! Session id resolution.
//!
//! Sessions are identified by an opaque token carried in the `X-Session-Id`
//! header. A request that carries a usable header keeps that session;
//! any other request gets a freshly minted id. Either way the effective id is
//! echoed on the response, and clients keep their session by replaying it.

use axum::{
    extract::{FromRequestParts, Request},
    http::{HeaderValue, request::Parts},
    middleware::Next,
    response::Response,
};
use cartwheel_core::SessionId;
use tracing::Span;

/// The HTTP header carrying the session id, in both directions.
pub const SESSION_ID_HEADER: &str = "x-session-id";

/// The session id resolved for the current request.
#[derive(Clone, Debug)]
pub struct CurrentSession(pub SessionId);

/// Session id from the request header, if the header holds a usable value.
fn session_from_header(request: &Request) -> Option<SessionId> {
    request
        .headers()
        .get(SESSION_ID_HEADER)
        .and_then(|h| h.to_str().ok())
        .filter(|value| !value.is_empty())
        .map(SessionId::from)
}

/// Middleware that resolves the session id and echoes it on the response.
///
/// Must wrap every route: handlers read the id through [`CurrentSession`].
pub async fn session_middleware(mut request: Request, next: Next) -> Response {
    let session_id = session_from_header(&request).unwrap_or_else(SessionId::generate);

    Span::current().record("session_id", session_id.as_str());
    request
        .extensions_mut()
        .insert(CurrentSession(session_id.clone()));

    let mut response = next.run(request).await;

    if let Ok(value) = HeaderValue::from_str(session_id.as_str()) {
        response.headers_mut().insert(SESSION_ID_HEADER, value);
    }

    response
}

/// Extractor for the session id resolved by [`session_middleware`].
///
/// # Example
///
/// ```ignore
/// async fn handler(CurrentSession(session_id): CurrentSession) -> impl IntoResponse {
///     // ...
/// }
/// ```
impl<S> FromRequestParts<S> for CurrentSession
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(parts.extensions.get::<Self>().cloned().unwrap_or_else(|| {
            tracing::warn!(
                "Session id not found in request extensions - middleware may be misconfigured"
            );
            Self(SessionId::generate())
        }))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use axum::{Router, body::Body, http::Request as HttpRequest, middleware, routing::get};
    use tower::ServiceExt;

    use super::*;

    fn app() -> Router {
        Router::new()
            .route(
                "/",
                get(|CurrentSession(id): CurrentSession| async move { id.into_inner() }),
            )
            .layer(middleware::from_fn(session_middleware))
    }

    async fn call(header: Option<&str>) -> (String, String) {
        let mut builder = HttpRequest::get("/");
        if let Some(value) = header {
            builder = builder.header(SESSION_ID_HEADER, value);
        }
        let response = app()
            .oneshot(builder.body(Body::empty()).unwrap())
            .await
            .unwrap();
        let echoed = response
            .headers()
            .get(SESSION_ID_HEADER)
            .unwrap()
            .to_str()
            .unwrap()
            .to_string();
        let body = axum::body::to_bytes(response.into_body(), 1024)
            .await
            .unwrap();
        (echoed, String::from_utf8(body.to_vec()).unwrap())
    }

    #[tokio::test]
    async fn test_header_session_is_kept() {
        let (echoed, seen) = call(Some("my-session")).await;
        assert_eq!(echoed, "my-session");
        assert_eq!(seen, "my-session");
    }

    #[tokio::test]
    async fn test_missing_header_mints_distinct_ids() {
        let (first, seen) = call(None).await;
        let (second, _) = call(None).await;
        assert_eq!(first, seen);
        assert_ne!(first, second);
        assert!(uuid::Uuid::parse_str(&first).is_ok());
    }

    #[tokio::test]
    async fn test_empty_header_mints_new_id() {
        let (echoed, _) = call(Some("")).await;
        assert!(!echoed.is_empty());
    }
}
