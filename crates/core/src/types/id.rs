//! Newtype identifiers for type-safe references.
//!
//! Use the `define_token!` macro to create string-backed identifier wrappers
//! that prevent accidentally mixing session ids with item ids.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Macro to define an opaque string-backed identifier.
///
/// Creates a newtype wrapper around `String` with:
/// - `Serialize`/`Deserialize` with `#[serde(transparent)]`
/// - `Debug`, `Clone`, `PartialEq`, `Eq`, `Hash`, `PartialOrd`, `Ord`
/// - Conversion methods: `new()`, `as_str()`, `into_inner()`
/// - `From<String>`, `From<&str>` and `Borrow<str>` implementations
///
/// `Borrow<str>` lets maps keyed by the identifier be queried with a plain
/// `&str`.
///
/// # Example
///
/// ```rust
/// # use cartwheel_core::define_token;
/// define_token!(CouponCode);
/// define_token!(GiftCardCode);
///
/// let coupon = CouponCode::new("SPRING");
/// assert_eq!(coupon.as_str(), "SPRING");
///
/// // These are different types, so this won't compile:
/// // let _: GiftCardCode = coupon;
/// ```
#[macro_export]
macro_rules! define_token {
    ($name:ident) => {
        #[derive(
            Debug,
            Clone,
            PartialEq,
            Eq,
            Hash,
            PartialOrd,
            Ord,
            ::serde::Serialize,
            ::serde::Deserialize
        )]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Create a new identifier from any string-like value.
            #[must_use]
            pub fn new(value: impl Into<String>) -> Self {
                Self(value.into())
            }

            /// Get the identifier as a string slice.
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// Consume the identifier and return the underlying string.
            #[must_use]
            pub fn into_inner(self) -> String {
                self.0
            }
        }

        impl ::core::fmt::Display for $name {
            fn fmt(&self, f: &mut ::core::fmt::Formatter<'_>) -> ::core::fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<String> for $name {
            fn from(value: String) -> Self {
                Self(value)
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                Self(value.to_owned())
            }
        }

        impl ::core::borrow::Borrow<str> for $name {
            fn borrow(&self) -> &str {
                &self.0
            }
        }
    };
}

define_token!(SessionId);
define_token!(ItemId);

impl SessionId {
    /// Mint a fresh, random session id (UUID v4).
    #[must_use]
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }
}

/// Identifier of a completed checkout.
///
/// Order ids are never looked up again after checkout returns; they only need
/// to be unique, so a random UUID is enough.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OrderId(Uuid);

impl OrderId {
    /// Generate a new random order id.
    #[must_use]
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }

    /// Get the underlying UUID.
    #[must_use]
    pub const fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl std::fmt::Display for OrderId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    #[test]
    fn test_generated_session_ids_are_unique() {
        let ids: HashSet<SessionId> = (0..100).map(|_| SessionId::generate()).collect();
        assert_eq!(ids.len(), 100);
    }

    #[test]
    fn test_token_serializes_transparently() {
        let id = ItemId::new("1");
        assert_eq!(serde_json::to_string(&id).ok().as_deref(), Some("\"1\""));
    }

    #[test]
    fn test_token_borrows_as_str() {
        let mut set = HashSet::new();
        set.insert(SessionId::new("abc"));
        assert!(set.contains("abc"));
    }

    #[test]
    fn test_order_id_display_is_uuid() {
        let id = OrderId::generate();
        assert_eq!(id.to_string(), id.as_uuid().to_string());
        assert_ne!(OrderId::generate(), id);
    }
}
