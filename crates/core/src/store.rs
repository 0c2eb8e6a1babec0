//! The session store.
//!
//! [`SessionStore`] is the single owner of per-session cart state. Sessions
//! live in a sharded [`DashMap`]; every operation holds the write lock of its
//! session's shard for the whole read-validate-mutate sequence, so operations
//! on one session are linearized while sessions in other shards proceed in
//! parallel. No lock is ever handed to callers, and no lock is held once an
//! operation returns.
//!
//! Mutations compute the new cart value before writing it, so a failed
//! operation leaves the cart exactly as it was.

use std::sync::Arc;
use std::time::{Duration, Instant};

use dashmap::DashMap;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::cart::Cart;
use crate::catalog::Catalog;
use crate::error::CartError;
use crate::pricing::{LineItem, price_cart};
use crate::types::{ItemId, OrderId, SessionId};

/// Result of a successful checkout.
///
/// Orders are not retained by the store; the only lasting effect of a
/// checkout is the cleared cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    pub order_id: OrderId,
    #[serde(with = "rust_decimal::serde::float")]
    pub total: Decimal,
    pub items: Vec<LineItem>,
}

impl Order {
    /// Number of lines in the order.
    #[must_use]
    pub fn item_count(&self) -> usize {
        self.items.len()
    }
}

#[derive(Debug)]
struct SessionEntry {
    cart: Cart,
    last_seen: Instant,
}

impl SessionEntry {
    fn touch(&mut self) {
        self.last_seen = Instant::now();
    }
}

impl Default for SessionEntry {
    fn default() -> Self {
        Self {
            cart: Cart::default(),
            last_seen: Instant::now(),
        }
    }
}

/// Concurrent mapping from session id to cart.
#[derive(Debug)]
pub struct SessionStore {
    catalog: Arc<Catalog>,
    sessions: DashMap<SessionId, SessionEntry>,
}

impl SessionStore {
    /// Create an empty store validating items against `catalog`.
    #[must_use]
    pub fn new(catalog: Arc<Catalog>) -> Self {
        Self {
            catalog,
            sessions: DashMap::new(),
        }
    }

    /// The catalog this store validates against.
    #[must_use]
    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// Return the session's cart, creating an empty session if absent.
    pub fn get_or_create(&self, session_id: &SessionId) -> Cart {
        let mut entry = self.sessions.entry(session_id.clone()).or_default();
        entry.touch();
        entry.cart.clone()
    }

    /// Return the session's cart without creating the session.
    #[must_use]
    pub fn peek(&self, session_id: &SessionId) -> Option<Cart> {
        self.sessions.get(session_id).map(|entry| entry.cart.clone())
    }

    /// Whether a session exists.
    #[must_use]
    pub fn contains(&self, session_id: &SessionId) -> bool {
        self.sessions.contains_key(session_id)
    }

    /// Number of live sessions.
    #[must_use]
    pub fn session_count(&self) -> usize {
        self.sessions.len()
    }

    /// Add `qty` of `item_id` to the session's cart.
    ///
    /// # Errors
    ///
    /// - [`CartError::InvalidItem`] if the item is not in the catalog
    /// - [`CartError::InvalidQuantity`] if `qty` is not positive, the line
    ///   quantity would exceed `u32::MAX`, or the cart total would no longer
    ///   fit in a `Decimal`
    pub fn add(
        &self,
        session_id: &SessionId,
        item_id: &str,
        qty: i64,
    ) -> Result<Cart, CartError> {
        let item_id = self.catalog_item(item_id)?;
        let qty = u32::try_from(qty)
            .ok()
            .filter(|&qty| qty > 0)
            .ok_or(CartError::InvalidQuantity)?;

        let mut entry = self.sessions.entry(session_id.clone()).or_default();
        entry.touch();
        let mut updated = entry.cart.clone();
        updated.add(&item_id, qty)?;
        // Every stored cart must stay priceable
        price_cart(&updated, &self.catalog)?;
        entry.cart = updated.clone();
        Ok(updated)
    }

    /// Remove `qty` of `item_id` from the session's cart.
    ///
    /// Removing at least the current quantity deletes the line.
    ///
    /// # Errors
    ///
    /// - [`CartError::InvalidItem`] if the item is not in the catalog
    /// - [`CartError::InvalidQuantity`] if `qty` is not positive
    /// - [`CartError::NotInCart`] if the cart has no line for the item
    pub fn remove(
        &self,
        session_id: &SessionId,
        item_id: &str,
        qty: i64,
    ) -> Result<Cart, CartError> {
        let item_id = self.catalog_item(item_id)?;
        let qty = u64::try_from(qty)
            .ok()
            .filter(|&qty| qty > 0)
            .ok_or(CartError::InvalidQuantity)?;

        let mut entry = self.sessions.entry(session_id.clone()).or_default();
        entry.touch();
        entry.cart.remove(item_id.as_str(), qty)?;
        Ok(entry.cart.clone())
    }

    /// Reset the session's cart to empty.
    pub fn clear(&self, session_id: &SessionId) {
        let mut entry = self.sessions.entry(session_id.clone()).or_default();
        entry.touch();
        entry.cart = Cart::default();
    }

    /// Atomically price and clear the session's cart.
    ///
    /// Snapshot, emptiness check, order creation and clear all happen under
    /// one lock, so concurrent checkouts of the same cart produce exactly one
    /// order. Checking out an unknown session does not create it.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::EmptyCart`] if no line of the cart can be priced,
    /// or [`CartError::InvalidQuantity`] if the total does not fit in a
    /// `Decimal`. The cart is left untouched.
    pub fn checkout(&self, session_id: &SessionId) -> Result<Order, CartError> {
        let Some(mut entry) = self.sessions.get_mut(session_id) else {
            return Err(CartError::EmptyCart);
        };
        entry.touch();

        let priced = price_cart(&entry.cart, &self.catalog)?;
        if priced.is_empty() {
            return Err(CartError::EmptyCart);
        }

        let order = Order {
            order_id: OrderId::generate(),
            total: priced.subtotal,
            items: priced.items,
        };
        entry.cart = Cart::default();
        Ok(order)
    }

    /// Drop sessions that have not been used for at least `max_idle`.
    ///
    /// Returns the number of sessions evicted.
    pub fn evict_idle(&self, max_idle: Duration) -> usize {
        let mut evicted = 0;
        self.sessions.retain(|_, entry| {
            let keep = entry.last_seen.elapsed() < max_idle;
            if !keep {
                evicted += 1;
            }
            keep
        });
        evicted
    }

    fn catalog_item(&self, item_id: &str) -> Result<ItemId, CartError> {
        self.catalog
            .get(item_id)
            .map(|product| product.id.clone())
            .ok_or(CartError::InvalidItem)
    }
}
