//! Cartwheel Core - catalog, cart pricing and session state.
//!
//! This crate holds everything the shop service needs to keep per-session
//! carts consistent under concurrent requests:
//! - [`catalog`] - The immutable product catalog
//! - [`cart`] - Cart contents and the mutations the store applies to them
//! - [`pricing`] - Pure pricing of a cart snapshot against the catalog
//! - [`store`] - The session store, the only owner of mutable cart state
//!
//! # Architecture
//!
//! The core crate does no I/O: no HTTP, no logging, no filesystem access
//! beyond parsing catalog JSON handed to it. All operations are synchronous
//! and short, so callers on an async runtime can invoke them directly.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod cart;
pub mod catalog;
pub mod error;
pub mod pricing;
pub mod store;
pub mod types;

pub use cart::Cart;
pub use catalog::{Catalog, Product};
pub use error::{CartError, CatalogError};
pub use pricing::{LineItem, PricedCart, price_cart};
pub use store::{Order, SessionStore};
pub use types::*;
