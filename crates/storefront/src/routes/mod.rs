//! HTTP route handlers for the storefront.
//!
//! # Route Structure
//!
//! ```text
//! GET    /healthz        - Liveness check
//! GET    /catalog        - Product listing
//!
//! # Cart
//! GET    /cart           - Cart contents with line items and subtotal
//! POST   /cart/add       - Add {"item_id", "qty"} to the cart
//! POST   /cart/remove    - Remove {"item_id", "qty"} from the cart
//! DELETE /cart           - Empty the cart
//!
//! # Checkout
//! POST   /checkout       - Place an order and empty the cart
//! ```
//!
//! Every response carries `X-Session-Id` and `X-Request-Id`.

pub mod cart;
pub mod catalog;
pub mod checkout;

use axum::{
    Json, Router, middleware as axum_middleware,
    extract::Request,
    routing::{get, post},
};
use serde::Serialize;
use tower_http::{catch_panic::CatchPanicLayer, trace::TraceLayer};

use crate::error::AppError;
use crate::middleware::{
    handle_panic, make_request_span, request_id_middleware, session_middleware,
};
use crate::state::AppState;

/// Response body of `GET /healthz`.
#[derive(Debug, Serialize)]
pub struct Health {
    pub status: &'static str,
}

/// Liveness health check endpoint.
///
/// Returns ok if the server is running. The store is in-memory, so there is
/// no dependency to check.
pub async fn healthz() -> Json<Health> {
    tracing::info!(event = "healthz", "Health check");
    Json(Health { status: "ok" })
}

/// Fallback for unknown routes.
async fn not_found(request: Request) -> AppError {
    AppError::NotFound(request.uri().path().to_string())
}

/// Create the cart routes router.
pub fn cart_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(cart::show).delete(cart::clear))
        .route("/add", post(cart::add))
        .route("/remove", post(cart::remove))
}

/// Create all routes for the storefront.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/healthz", get(healthz))
        .route("/catalog", get(catalog::index))
        .nest("/cart", cart_routes())
        .route("/checkout", post(checkout::checkout))
        .fallback(not_found)
}

/// Build the complete application with its middleware stack.
///
/// Sentry layers are added by the binary on top of this.
pub fn app(state: AppState) -> Router {
    routes()
        .layer(CatchPanicLayer::custom(handle_panic))
        .layer(axum_middleware::from_fn(session_middleware))
        .layer(axum_middleware::from_fn(request_id_middleware))
        .layer(TraceLayer::new_for_http().make_span_with(make_request_span))
        .with_state(state)
}
