//! Cart route handlers.
//!
//! Every handler works on the session resolved by the session middleware and
//! goes through the session store; pricing is computed fresh from the snapshot
//! the store returns.

use axum::{Json, body::Bytes, extract::State};
use cartwheel_core::{PricedCart, SessionId, price_cart};
use serde::Serialize;
use serde_json::Value;

use crate::error::Result;
use crate::middleware::CurrentSession;
use crate::state::AppState;

/// Response body of `GET /cart`.
#[derive(Debug, Serialize)]
pub struct CartView {
    pub session_id: SessionId,
    #[serde(flatten)]
    pub cart: PricedCart,
}

/// Response body of cart mutations.
#[derive(Debug, Serialize)]
pub struct CartUpdated {
    pub message: &'static str,
    #[serde(flatten)]
    pub cart: PricedCart,
}

/// Response body of `DELETE /cart`.
#[derive(Debug, Serialize)]
pub struct CartCleared {
    pub message: &'static str,
}

/// `{"item_id", "qty"}` request body, parsed leniently.
///
/// A missing or malformed body counts as `{}`. `item_id` may be a string or a
/// number and is trimmed. `qty` defaults to 1 and may be a whole number
/// written as a float (`2.0`); any other value that is not an integer becomes
/// 0 so that the store rejects it after validating the item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CartLineInput {
    pub item_id: String,
    pub qty: i64,
}

impl CartLineInput {
    /// Parse a request body.
    #[must_use]
    pub fn parse(body: &[u8]) -> Self {
        let value: Value = serde_json::from_slice(body).unwrap_or(Value::Null);

        let item_id = match value.get("item_id") {
            Some(Value::String(s)) => s.trim().to_string(),
            Some(Value::Number(n)) => n.to_string(),
            _ => String::new(),
        };

        let qty = match value.get("qty") {
            None | Some(Value::Null) => 1,
            Some(Value::Number(n)) => whole_number(n).unwrap_or(0),
            Some(Value::String(s)) => s.trim().parse().unwrap_or(0),
            Some(_) => 0,
        };

        Self { item_id, qty }
    }
}

/// Integer value of `n`, including floats with no fractional part.
#[allow(clippy::cast_possible_truncation, clippy::float_cmp)]
fn whole_number(n: &serde_json::Number) -> Option<i64> {
    n.as_i64().or_else(|| {
        n.as_f64()
            .filter(|f| f.fract() == 0.0 && f.abs() < 9.0e18)
            .map(|f| f as i64)
    })
}

/// Show the session's cart, creating the session if it is new.
pub async fn show(
    State(state): State<AppState>,
    CurrentSession(session_id): CurrentSession,
) -> Result<Json<CartView>> {
    let cart = state.store().get_or_create(&session_id);
    let priced = price_cart(&cart, state.catalog())?;

    tracing::info!(
        event = "cart.view",
        subtotal = %priced.subtotal,
        items_count = priced.item_count(),
        "Cart viewed"
    );

    Ok(Json(CartView {
        session_id,
        cart: priced,
    }))
}

/// Add an item to the cart.
pub async fn add(
    State(state): State<AppState>,
    CurrentSession(session_id): CurrentSession,
    body: Bytes,
) -> Result<Json<CartUpdated>> {
    let input = CartLineInput::parse(&body);

    let cart = state
        .store()
        .add(&session_id, &input.item_id, input.qty)
        .inspect_err(|err| {
            tracing::info!(
                event = "cart.add.error",
                reason = err.reason(),
                item_id = %input.item_id,
                qty = input.qty,
                "Add to cart rejected"
            );
        })?;
    let priced = price_cart(&cart, state.catalog())?;

    tracing::info!(
        event = "cart.add",
        item_id = %input.item_id,
        qty = input.qty,
        subtotal = %priced.subtotal,
        "Item added to cart"
    );

    Ok(Json(CartUpdated {
        message: "added",
        cart: priced,
    }))
}

/// Remove a quantity of an item from the cart.
pub async fn remove(
    State(state): State<AppState>,
    CurrentSession(session_id): CurrentSession,
    body: Bytes,
) -> Result<Json<CartUpdated>> {
    let input = CartLineInput::parse(&body);

    let cart = state
        .store()
        .remove(&session_id, &input.item_id, input.qty)
        .inspect_err(|err| {
            tracing::info!(
                event = "cart.remove.error",
                reason = err.reason(),
                item_id = %input.item_id,
                qty = input.qty,
                "Remove from cart rejected"
            );
        })?;
    let priced = price_cart(&cart, state.catalog())?;

    tracing::info!(
        event = "cart.remove",
        item_id = %input.item_id,
        qty = input.qty,
        subtotal = %priced.subtotal,
        "Item removed from cart"
    );

    Ok(Json(CartUpdated {
        message: "removed",
        cart: priced,
    }))
}

/// Empty the cart.
pub async fn clear(
    State(state): State<AppState>,
    CurrentSession(session_id): CurrentSession,
) -> Json<CartCleared> {
    state.store().clear(&session_id);
    tracing::info!(event = "cart.clear", "Cart cleared");
    Json(CartCleared { message: "cleared" })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(body: &str) -> CartLineInput {
        CartLineInput::parse(body.as_bytes())
    }

    #[test]
    fn test_parse_full_body() {
        assert_eq!(
            parse(r#"{"item_id": " 2 ", "qty": 3}"#),
            CartLineInput {
                item_id: "2".to_string(),
                qty: 3
            }
        );
    }

    #[test]
    fn test_parse_numeric_item_and_default_qty() {
        assert_eq!(
            parse(r#"{"item_id": 4}"#),
            CartLineInput {
                item_id: "4".to_string(),
                qty: 1
            }
        );
    }

    #[test]
    fn test_parse_malformed_body_is_empty() {
        let input = parse("not json");
        assert!(input.item_id.is_empty());
        assert_eq!(input.qty, 1);

        assert!(CartLineInput::parse(b"").item_id.is_empty());
    }

    #[test]
    fn test_parse_whole_float_quantities() {
        assert_eq!(parse(r#"{"item_id": "1", "qty": 2.0}"#).qty, 2);
        assert_eq!(parse(r#"{"item_id": "1", "qty": 1e2}"#).qty, 100);
        assert_eq!(parse(r#"{"item_id": "1", "qty": -3.0}"#).qty, -3);
        assert_eq!(parse(r#"{"item_id": "1", "qty": 0.0}"#).qty, 0);
    }

    #[test]
    fn test_parse_bad_quantities() {
        assert_eq!(parse(r#"{"item_id": "1", "qty": 1.5}"#).qty, 0);
        assert_eq!(parse(r#"{"item_id": "1", "qty": 1e300}"#).qty, 0);
        assert_eq!(parse(r#"{"item_id": "1", "qty": "abc"}"#).qty, 0);
        assert_eq!(parse(r#"{"item_id": "1", "qty": true}"#).qty, 0);
        assert_eq!(parse(r#"{"item_id": "1", "qty": "7"}"#).qty, 7);
        assert_eq!(parse(r#"{"item_id": "1", "qty": -2}"#).qty, -2);
    }
}
