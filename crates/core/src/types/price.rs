//! Decimal money handling.
//!
//! All money values are [`Decimal`]s rounded to two places with banker's
//! rounding (round-half-to-even), so halfway cases come out the same on every
//! platform. Amounts are serialized as JSON numbers.

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

/// Number of decimal places kept for money amounts.
pub const MONEY_SCALE: u32 = 2;

/// Round an amount to [`MONEY_SCALE`] places using banker's rounding.
#[must_use]
pub fn round_money(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(MONEY_SCALE, RoundingStrategy::MidpointNearestEven)
}

/// A non-negative unit price.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Price(#[serde(with = "rust_decimal::serde::float")] Decimal);

impl Price {
    /// Create a price from a decimal amount.
    ///
    /// Returns `None` if the amount is negative.
    #[must_use]
    pub fn new(amount: Decimal) -> Option<Self> {
        if amount.is_sign_negative() && !amount.is_zero() {
            None
        } else {
            Some(Self(amount))
        }
    }

    /// Create a price from a whole number of cents.
    #[must_use]
    pub fn from_cents(cents: u32) -> Self {
        Self(Decimal::new(i64::from(cents), MONEY_SCALE))
    }

    /// Get the amount.
    #[must_use]
    pub const fn amount(&self) -> Decimal {
        self.0
    }

    /// Total for `qty` units, rounded to [`MONEY_SCALE`] places.
    ///
    /// Returns `None` if the total does not fit in a `Decimal`.
    #[must_use]
    pub fn line_total(&self, qty: u32) -> Option<Decimal> {
        self.0.checked_mul(Decimal::from(qty)).map(round_money)
    }
}

impl std::fmt::Display for Price {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.2}", self.0)
    }
}
