//! Checkout route handler.
//!
//! Payment is out of scope: a checkout succeeds whenever the cart has at
//! least one priced line.

use axum::{Json, extract::State};
use cartwheel_core::Order;

use crate::error::Result;
use crate::middleware::CurrentSession;
use crate::state::AppState;

/// Place an order for the session's cart and empty it.
pub async fn checkout(
    State(state): State<AppState>,
    CurrentSession(session_id): CurrentSession,
) -> Result<Json<Order>> {
    let order = state.store().checkout(&session_id).inspect_err(|err| {
        tracing::info!(
            event = "checkout.error",
            reason = err.reason(),
            "Checkout rejected"
        );
    })?;

    tracing::info!(
        event = "checkout.success",
        order_id = %order.order_id,
        subtotal = %order.total,
        items = order.item_count(),
        "Order placed"
    );

    Ok(Json(order))
}
