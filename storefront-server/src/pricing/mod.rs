//! Money calculation utilities using rust_decimal for precision
//!
//! Amounts are stored as `f64` already rounded to cents. Every calculation
//! converts to `Decimal`, works there, and converts back with
//! half-away-from-zero rounding to 2 places.

pub mod fee;
pub mod tax;

pub use fee::ServiceFee;
pub use tax::{StaticTaxTable, TaxProvider, bounded_tax_rate};

use rust_decimal::prelude::*;

const DECIMAL_PLACES: u32 = 2;

const HUNDRED: Decimal = Decimal::from_parts(100, 0, 0, false, 0);

/// Convert f64 to Decimal; non-finite input becomes zero
#[inline]
pub fn to_decimal(value: f64) -> Decimal {
    Decimal::from_f64(value).unwrap_or_else(|| {
        tracing::error!(value = ?value, "Non-finite f64 in monetary calculation, defaulting to zero");
        Decimal::ZERO
    })
}

/// Round to cents
#[inline]
pub fn round_money(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(DECIMAL_PLACES, RoundingStrategy::MidpointAwayFromZero)
}

/// Convert Decimal back to f64 for storage, rounded to 2 decimal places
#[inline]
pub fn to_f64(value: Decimal) -> f64 {
    round_money(value).to_f64().unwrap_or_default()
}

/// `amount × percent / 100`, unrounded
#[inline]
pub fn percent_of(amount: Decimal, percent: Decimal) -> Decimal {
    amount * percent / HUNDRED
}

/// Sum f64 amounts exactly
pub fn sum<I: IntoIterator<Item = f64>>(values: I) -> Decimal {
    values.into_iter().map(to_decimal).sum()
}
