//! Cart contents.
//!
//! A [`Cart`] maps item ids to positive quantities. Only the session store
//! can mutate one; every cart handed out by the store is an owned snapshot.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::error::CartError;
use crate::types::ItemId;

/// Mapping from item id to quantity.
///
/// Invariant: every stored quantity is at least 1. Lines are kept ordered by
/// item id, so iteration is deterministic.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Cart {
    lines: BTreeMap<ItemId, u32>,
}

impl Cart {
    /// Quantity of an item, or `None` if the item has no entry.
    #[must_use]
    pub fn quantity(&self, item_id: &str) -> Option<u32> {
        self.lines.get(item_id).copied()
    }

    /// Whether the cart has no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Number of distinct items.
    #[must_use]
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    /// Sum of all quantities.
    #[must_use]
    pub fn total_quantity(&self) -> u64 {
        self.lines.values().map(|&qty| u64::from(qty)).sum()
    }

    /// Iterate over `(item id, quantity)` pairs in item id order.
    pub fn iter(&self) -> impl Iterator<Item = (&ItemId, u32)> {
        self.lines.iter().map(|(id, &qty)| (id, qty))
    }

    /// Increase the quantity of `item_id` by `qty`.
    ///
    /// The new quantity is computed before anything is written, so on error
    /// the cart is unchanged.
    pub(crate) fn add(&mut self, item_id: &ItemId, qty: u32) -> Result<(), CartError> {
        if qty == 0 {
            return Err(CartError::InvalidQuantity);
        }
        let current = self.quantity(item_id.as_str()).unwrap_or(0);
        let updated = current
            .checked_add(qty)
            .ok_or(CartError::InvalidQuantity)?;
        self.lines.insert(item_id.clone(), updated);
        Ok(())
    }

    /// Decrease the quantity of `item_id` by `qty`, deleting the entry when
    /// nothing would remain.
    pub(crate) fn remove(&mut self, item_id: &str, qty: u64) -> Result<(), CartError> {
        if qty == 0 {
            return Err(CartError::InvalidQuantity);
        }
        let current = self.quantity(item_id).ok_or(CartError::NotInCart)?;
        match u32::try_from(qty) {
            Ok(qty) if qty < current => {
                if let Some(line) = self.lines.get_mut(item_id) {
                    *line = current - qty;
                }
            }
            _ => {
                self.lines.remove(item_id);
            }
        }
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn item(id: &str) -> ItemId {
        ItemId::new(id)
    }

    #[test]
    fn test_add_accumulates() {
        let mut cart = Cart::default();
        cart.add(&item("1"), 2).unwrap();
        cart.add(&item("1"), 3).unwrap();
        assert_eq!(cart.quantity("1"), Some(5));
        assert_eq!(cart.len(), 1);
    }

    #[test]
    fn test_add_overflow_leaves_cart_unchanged() {
        let mut cart = Cart::default();
        cart.add(&item("1"), u32::MAX).unwrap();
        assert_eq!(cart.add(&item("1"), 1), Err(CartError::InvalidQuantity));
        assert_eq!(cart.quantity("1"), Some(u32::MAX));
    }

    #[test]
    fn test_remove_partial() {
        let mut cart = Cart::default();
        cart.add(&item("1"), 3).unwrap();
        cart.remove("1", 1).unwrap();
        assert_eq!(cart.quantity("1"), Some(2));
    }

    #[test]
    fn test_remove_floor_deletes_entry() {
        let mut cart = Cart::default();
        cart.add(&item("1"), 3).unwrap();
        cart.remove("1", 3).unwrap();
        assert_eq!(cart.quantity("1"), None);

        cart.add(&item("2"), 1).unwrap();
        cart.remove("2", u64::MAX).unwrap();
        assert!(cart.is_empty());
    }

    #[test]
    fn test_remove_missing_item() {
        let mut cart = Cart::default();
        assert_eq!(cart.remove("1", 1), Err(CartError::NotInCart));
    }

    #[test]
    fn test_iteration_is_ordered_by_id() {
        let mut cart = Cart::default();
        cart.add(&item("3"), 1).unwrap();
        cart.add(&item("1"), 4).unwrap();
        let ids: Vec<&str> = cart.iter().map(|(id, _)| id.as_str()).collect();
        assert_eq!(ids, ["1", "3"]);
        assert_eq!(cart.total_quantity(), 5);
    }

    #[test]
    fn test_serializes_as_map() {
        let mut cart = Cart::default();
        cart.add(&item("1"), 2).unwrap();
        assert_eq!(
            serde_json::to_value(&cart).unwrap(),
            serde_json::json!({"1": 2})
        );
    }
}
