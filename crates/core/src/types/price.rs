//! Type-safe price representation using decimal arithmetic.

use core::fmt;
use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use super::Quantity;

/// Errors that can occur when parsing a [`Price`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum PriceError {
    /// The input is not a decimal number.
    #[error("invalid price: {0}")]
    Invalid(String),
    /// The amount is below zero.
    #[error("price cannot be negative")]
    Negative,
}

/// A unit price in the store's currency.
///
/// Persisted as a plain JSON number (`"price": 10.5`) so stored carts keep the
/// same shape the catalog delivers. Values read back from storage are not
/// validated; [`Price::parse`] is the checked entry point for user input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Price(Decimal);

impl Price {
    /// Create a price from a decimal amount.
    #[must_use]
    pub const fn new(amount: Decimal) -> Self {
        Self(amount)
    }

    /// Create a price from an amount in cents.
    #[must_use]
    pub fn from_cents(cents: i64) -> Self {
        Self(Decimal::new(cents, 2))
    }

    /// Parse a non-negative price such as `"19.99"`.
    ///
    /// # Errors
    ///
    /// Returns an error if the input is not a decimal number or is negative.
    pub fn parse(s: &str) -> Result<Self, PriceError> {
        let amount =
            Decimal::from_str(s.trim()).map_err(|_| PriceError::Invalid(s.to_owned()))?;
        if amount.is_sign_negative() && !amount.is_zero() {
            return Err(PriceError::Negative);
        }
        Ok(Self(amount))
    }

    /// The decimal amount.
    #[must_use]
    pub const fn amount(&self) -> Decimal {
        self.0
    }

    /// Line total for `quantity` units, saturating at the decimal range.
    #[must_use]
    pub fn times(&self, quantity: Quantity) -> Decimal {
        self.0.saturating_mul(Decimal::from(quantity.get()))
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "${:.2}", self.0)
    }
}

impl FromStr for Price {
    type Err = PriceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl Serialize for Price {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        rust_decimal::serde::float::serialize(&self.0, serializer)
    }
}

impl<'de> Deserialize<'de> for Price {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        rust_decimal::serde::float::deserialize(deserializer).map(Self)
    }
}

impl From<Decimal> for Price {
    fn from(amount: Decimal) -> Self {
        Self(amount)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_serializes_as_json_number() {
        let price = Price::from_cents(1050);
        let json = serde_json::to_value(price).unwrap();
        assert!(json.is_number(), "expected a number, got: {json}");
        assert_eq!(json.as_f64(), Some(10.5));
    }

    #[test]
    fn test_deserializes_integer_and_float() {
        let whole: Price = serde_json::from_str("10").unwrap();
        assert_eq!(whole, Price::from_cents(1000));

        let fractional: Price = serde_json::from_str("19.5").unwrap();
        assert_eq!(fractional, Price::from_cents(1950));
    }

    #[test]
    fn test_parse() {
        assert_eq!(Price::parse("19.99").unwrap(), Price::from_cents(1999));
        assert_eq!(Price::parse(" 5 ").unwrap(), Price::from_cents(500));
        assert_eq!(Price::parse("0").unwrap(), Price::default());
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(matches!(Price::parse("ten"), Err(PriceError::Invalid(_))));
        assert!(matches!(Price::parse(""), Err(PriceError::Invalid(_))));
    }

    #[test]
    fn test_parse_rejects_negative() {
        assert_eq!(Price::parse("-1.00"), Err(PriceError::Negative));
    }

    #[test]
    fn test_amount() {
        assert_eq!(Price::from_cents(1999).amount(), Decimal::new(1999, 2));
        assert_eq!(Price::parse("3").unwrap().amount(), Decimal::from(3));
    }

    #[test]
    fn test_times() {
        let price = Price::from_cents(250);
        let qty = Quantity::new(3).unwrap();
        assert_eq!(price.times(qty), Decimal::new(750, 2));
    }

    #[test]
    fn test_display() {
        assert_eq!(Price::from_cents(1000).to_string(), "$10.00");
        assert_eq!(Price::from_cents(1999).to_string(), "$19.99");
    }
}
