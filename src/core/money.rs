//! Fixed-precision money amounts.
//!
//! Every amount that reaches the ledger passes through [`Money`]. Amounts carry at
//! most two fractional digits and never exceed [`Money::MAX`], which is also the
//! largest value the `DECIMAL(12, 2)` columns can hold. Input with more precision
//! is rejected instead of rounded.

use crate::errors::{Error, Result};
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize, de};
use std::fmt;
use std::str::FromStr;

/// Number of fractional digits stored for every amount
pub const SCALE: u32 = 2;

/// A validated, non-negative amount with cent precision
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "Decimal", into = "Decimal")]
pub struct Money(Decimal);

impl Money {
    /// Zero
    pub const ZERO: Self = Self(Decimal::ZERO);
    /// 9,999,999,999.99
    pub const MAX: Self = Self(Decimal::from_parts(3_567_587_327, 232, 0, false, SCALE));
    /// 0.01
    pub const MIN_POSITIVE: Self = Self(Decimal::from_parts(1, 0, 0, false, SCALE));

    /// Validates an amount that must be strictly positive (`0.01..=MAX`).
    pub fn positive(value: Decimal) -> Result<Self> {
        let money = Self::non_negative(value)?;
        if money.0.is_zero() {
            return Err(invalid(value, "amount must be greater than zero"));
        }
        Ok(money)
    }

    /// Validates an amount that may be zero (`0..=MAX`).
    pub fn non_negative(value: Decimal) -> Result<Self> {
        if value.is_sign_negative() && !value.is_zero() {
            return Err(invalid(value, "amount must not be negative"));
        }
        let normalized = value.normalize();
        if normalized.scale() > SCALE {
            return Err(invalid(
                value,
                &format!("amount must have at most {SCALE} decimal places"),
            ));
        }
        if normalized > Self::MAX.0 {
            return Err(invalid(value, &format!("amount must not exceed {}", Self::MAX)));
        }
        let mut cents = normalized;
        cents.rescale(SCALE);
        Ok(Self(cents))
    }

    /// Parses and validates a strictly positive amount from a decimal string.
    pub fn parse(input: &str) -> Result<Self> {
        let value = Decimal::from_str(input.trim()).map_err(|_| Error::InvalidAmount {
            value: input.to_string(),
            reason: "amount is not a number".to_string(),
        })?;
        Self::positive(value)
    }

    /// The underlying decimal value
    #[must_use]
    pub const fn amount(self) -> Decimal {
        self.0
    }
}

/// Returns `value` with exactly two fractional digits.
///
/// `SQLite` keeps decimal columns as `REAL`, so amounts read back lose their
/// trailing zeros (`40` instead of `40.00`).
pub(crate) fn with_cents(mut value: Decimal) -> Decimal {
    value.rescale(SCALE);
    value
}

/// Deserializes an amount sent as a decimal string such as `"12.50"`.
///
/// JSON numbers are rejected, so a binary float never becomes an amount.
pub fn deserialize_decimal_string<'de, D>(
    deserializer: D,
) -> std::result::Result<Decimal, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    Decimal::from_str(raw.trim()).map_err(de::Error::custom)
}

fn invalid(value: Decimal, reason: &str) -> Error {
    Error::InvalidAmount {
        value: value.to_string(),
        reason: reason.to_string(),
    }
}

impl FromStr for Money {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl TryFrom<Decimal> for Money {
    type Error = Error;

    fn try_from(value: Decimal) -> Result<Self> {
        Self::non_negative(value)
    }
}

impl From<Money> for Decimal {
    fn from(value: Money) -> Self {
        value.0
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}", self.0)
    }
}
