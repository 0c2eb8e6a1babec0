//! Core types for Cartwheel.
//!
//! This module provides type-safe wrappers for identifiers and money.

pub mod id;
pub mod price;

pub use id::{ItemId, OrderId, SessionId};
pub use price::{MONEY_SCALE, Price, round_money};
