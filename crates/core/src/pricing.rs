//! Cart pricing.
//!
//! [`price_cart`] is a pure function of a cart snapshot and the catalog. Each
//! line total and the running subtotal are rounded with
//! [`round_money`](crate::round_money).

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::cart::Cart;
use crate::catalog::Catalog;
use crate::error::CartError;
use crate::types::{ItemId, round_money};

/// A priced cart line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineItem {
    pub id: ItemId,
    pub name: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub unit_price: Decimal,
    pub qty: u32,
    #[serde(with = "rust_decimal::serde::float")]
    pub line_total: Decimal,
}

/// Line items and subtotal for one cart snapshot.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PricedCart {
    pub items: Vec<LineItem>,
    #[serde(with = "rust_decimal::serde::float")]
    pub subtotal: Decimal,
}

impl PricedCart {
    /// Number of priced lines.
    #[must_use]
    pub fn item_count(&self) -> usize {
        self.items.len()
    }

    /// Whether no line could be priced.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// Price a cart against the catalog.
///
/// Items missing from the catalog are skipped. Lines come out in item id
/// order.
///
/// # Errors
///
/// Returns [`CartError::InvalidQuantity`] if a line total or the subtotal
/// does not fit in a `Decimal`.
pub fn price_cart(cart: &Cart, catalog: &Catalog) -> Result<PricedCart, CartError> {
    let mut priced = PricedCart::default();
    for (item_id, qty) in cart.iter() {
        let Some(product) = catalog.get(item_id.as_str()) else {
            continue;
        };
        let line_total = product
            .unit_price
            .line_total(qty)
            .ok_or(CartError::InvalidQuantity)?;
        priced.subtotal = priced
            .subtotal
            .checked_add(line_total)
            .map(round_money)
            .ok_or(CartError::InvalidQuantity)?;
        priced.items.push(LineItem {
            id: product.id.clone(),
            name: product.name.clone(),
            unit_price: product.unit_price.amount(),
            qty,
            line_total,
        });
    }
    Ok(priced)
}
