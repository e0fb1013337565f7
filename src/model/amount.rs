//! Amount type for handling monetary values.
//!
//! This module provides the `Amount` type which wraps `Decimal`, parses the loosely formatted
//! money cells found in point-of-sale exports, and applies the half-up rounding used for every
//! derived financial field.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::error::Error;
use std::fmt;
use std::fmt::{Debug, Display, Formatter};
use std::iter::Sum;
use std::ops::Add;
use std::str::FromStr;

/// The number of fractional digits that every stored amount carries.
pub const MONEY_SCALE: u32 = 2;

/// Represents a monetary value such as a unit price, a sale total or a profit.
///
/// Equality and ordering are numeric, so `45.0` and `45.00` are equal. The `Display`
/// implementation always renders exactly two fractional digits.
///
/// # Examples
///
/// Parsing a price cell that uses a comma as the decimal separator:
/// ```
/// # use pos_sync::model::Amount;
/// # use std::str::FromStr;
/// let amount = Amount::from_str("45,5").unwrap();
/// assert_eq!(amount.to_string(), "45.50");
/// ```
///
/// Half-up rounding to two places:
/// ```
/// # use pos_sync::model::Amount;
/// # use std::str::FromStr;
/// let amount = Amount::from_str("2.345").unwrap().round2();
/// assert_eq!(amount.to_string(), "2.35");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Amount {
    value: Decimal,
}

impl Amount {
    pub const ZERO: Amount = Amount::new(Decimal::ZERO);

    /// Creates a new Amount from a Decimal value. No rounding is applied.
    pub const fn new(value: Decimal) -> Self {
        Self { value }
    }

    /// Returns the underlying Decimal value.
    pub fn value(&self) -> Decimal {
        self.value
    }

    /// Renders the amount rounded to two places with thousands separators, e.g. `1,234.50`.
    pub fn grouped(&self) -> String {
        let (sign, num) = if self.is_negative() {
            ("-", self.value.abs())
        } else {
            ("", self.value)
        };
        format!(
            "{sign}{}",
            format_num::format_num!(",.2f", round2(num).to_f64().unwrap_or_default())
        )
    }

    /// Returns a copy rounded half-up (away from zero on exact halves) to exactly two fractional
    /// digits.
    pub fn round2(&self) -> Self {
        Self::new(round2(self.value))
    }

    /// Returns true if the amount is zero.
    pub fn is_zero(&self) -> bool {
        self.value().is_zero()
    }

    /// Returns true if the amount is negative.
    pub fn is_negative(&self) -> bool {
        !self.is_zero() && self.value().is_sign_negative()
    }

    /// Multiplies by a whole quantity and rounds the product with `round2`. Returns `None` if the
    /// product does not fit in a `Decimal`.
    pub fn times(&self, quantity: i64) -> Option<Self> {
        self.value
            .checked_mul(Decimal::from(quantity))
            .map(|product| Self::new(round2(product)))
    }
}

/// Rounds `value` half-up to two fractional digits and pads the scale to exactly two digits.
pub fn round2(value: Decimal) -> Decimal {
    let mut rounded = value.round_dp_with_strategy(MONEY_SCALE, RoundingStrategy::MidpointAwayFromZero);
    rounded.rescale(MONEY_SCALE);
    rounded
}

/// An error that can occur when parsing strings into `Amount` values.
pub struct AmountError(rust_decimal::Error);

impl Debug for AmountError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        Debug::fmt(&self.0, f)
    }
}

impl Display for AmountError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        Display::fmt(&self.0, f)
    }
}

impl std::error::Error for AmountError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        Some(&self.0)
    }
}

impl FromStr for Amount {
    type Err = AmountError;

    /// Accepts `45`, `45.00`, `1,234.50` (comma as thousands separator) and `45,50` (comma as
    /// decimal separator, only when no `.` is present). Surrounding whitespace and inner spaces,
    /// which some locales use as thousands separators, are ignored. An empty string is zero.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let compact: String = s.chars().filter(|c| !c.is_whitespace()).collect();
        if compact.is_empty() {
            return Ok(Amount::default());
        }

        let normalized = if compact.contains('.') {
            compact.replace(',', "")
        } else {
            compact.replace(',', ".")
        };

        let value = Decimal::from_str(&normalized).map_err(AmountError)?;
        Ok(Amount { value })
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", round2(self.value))
    }
}

impl Serialize for Amount {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for Amount {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Amount::from_str(&s).map_err(serde::de::Error::custom)
    }
}

impl From<Decimal> for Amount {
    fn from(value: Decimal) -> Self {
        Amount::new(value)
    }
}

impl From<Amount> for Decimal {
    fn from(amount: Amount) -> Self {
        amount.value()
    }
}

/// Saturates at the bounds of `Decimal`.
impl Add for Amount {
    type Output = Amount;

    fn add(self, rhs: Self) -> Self::Output {
        Amount::new(self.value.saturating_add(rhs.value))
    }
}

impl Sum for Amount {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Amount::ZERO, Add::add)
    }
}
