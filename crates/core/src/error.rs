//! Error types for cart operations and catalog loading.

use thiserror::Error;

/// Expected, caller-correctable failures of cart operations.
///
/// None of these are faults: the store state is unchanged whenever one is
/// returned, and the caller can fix the request and try again.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum CartError {
    /// Item id missing or not in the catalog.
    #[error("Invalid or missing item_id")]
    InvalidItem,
    /// Quantity is not a positive integer (or would overflow the line).
    #[error("qty must be positive")]
    InvalidQuantity,
    /// Removal targets an item that has no entry in the cart.
    #[error("Item not in cart")]
    NotInCart,
    /// Checkout attempted with no line items.
    #[error("Cart is empty")]
    EmptyCart,
}

impl CartError {
    /// Machine-readable reason code.
    #[must_use]
    pub const fn reason(&self) -> &'static str {
        match self {
            Self::InvalidItem => "invalid_item",
            Self::InvalidQuantity => "invalid_qty",
            Self::NotInCart => "not_in_cart",
            Self::EmptyCart => "empty_cart",
        }
    }
}

/// Errors that can occur when building a [`Catalog`](crate::Catalog).
#[derive(Debug, Error)]
pub enum CatalogError {
    /// The catalog JSON could not be parsed.
    #[error("invalid catalog JSON: {0}")]
    Json(#[from] serde_json::Error),
    /// A product has an empty id.
    #[error("product at position {0} has an empty id")]
    EmptyId(usize),
    /// A product has an empty name.
    #[error("product {0} has an empty name")]
    EmptyName(String),
    /// Two products share an id.
    #[error("duplicate product id: {0}")]
    DuplicateId(String),
    /// A product has a negative price.
    #[error("product {0} has a negative price")]
    NegativePrice(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reason_codes() {
        assert_eq!(CartError::InvalidItem.reason(), "invalid_item");
        assert_eq!(CartError::InvalidQuantity.reason(), "invalid_qty");
        assert_eq!(CartError::NotInCart.reason(), "not_in_cart");
        assert_eq!(CartError::EmptyCart.reason(), "empty_cart");
    }

    #[test]
    fn test_messages() {
        assert_eq!(CartError::EmptyCart.to_string(), "Cart is empty");
        assert_eq!(
            CatalogError::DuplicateId("1".to_string()).to_string(),
            "duplicate product id: 1"
        );
    }
}
