//! Exact monetary amounts
//!
//! Amounts are `Decimal` values with two fractional digits in memory and
//! integer cents at rest. Nothing here goes through binary floating point.

use rust_decimal::{Decimal, RoundingStrategy};
use std::str::FromStr;
use thiserror::Error;

/// Largest storable magnitude: ten digits, two of them fractional.
pub const MAX_CENTS: i64 = 9_999_999_999;

/// Errors raised while converting money values
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MoneyError {
    #[error("'{0}' is not a decimal number")]
    Invalid(String),

    #[error("{0} exceeds the maximum of 99999999.99")]
    OutOfRange(String),
}

/// Parse a textual amount into a two-place decimal.
///
/// Accepts plain (`"500"`, `"-12.5"`) and scientific (`"1.5E3"`) notation.
/// More than two fractional digits are rounded half-to-even.
pub fn parse_amount(text: &str) -> Result<Decimal, MoneyError> {
    let trimmed = text.trim();
    let parsed = Decimal::from_str(trimmed)
        .or_else(|_| Decimal::from_scientific(trimmed))
        .map_err(|_| MoneyError::Invalid(text.to_string()))?;
    normalize(parsed)
}

/// Round to cents and check the storable range
pub fn normalize(amount: Decimal) -> Result<Decimal, MoneyError> {
    let mut rounded = amount.round_dp_with_strategy(2, RoundingStrategy::MidpointNearestEven);
    rounded.rescale(2);
    if rounded.mantissa().abs() > i128::from(MAX_CENTS) {
        return Err(MoneyError::OutOfRange(amount.to_string()));
    }
    Ok(rounded)
}

/// Convert a decimal amount into integer cents
pub fn to_cents(amount: Decimal) -> Result<i64, MoneyError> {
    let normalized = normalize(amount)?;
    i64::try_from(normalized.mantissa()).map_err(|_| MoneyError::OutOfRange(amount.to_string()))
}

/// Convert stored cents back into a two-place decimal
pub fn from_cents(cents: i64) -> Decimal {
    Decimal::new(cents, 2)
}
