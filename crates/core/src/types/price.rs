//! Type-safe price representation using decimal arithmetic.
//!
//! The marketplace API reports prices in Peruvian soles, sometimes as JSON
//! strings (`"20.00"`) and sometimes as bare numbers (`20`). [`Price`]
//! accepts both and always serializes back as a string so no precision is
//! lost on a round trip through local storage.

use core::fmt;
use core::iter::Sum;
use core::ops::Add;
use core::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};

/// Currency symbol used when formatting prices for display.
pub const CURRENCY_SYMBOL: &str = "S/";

/// A non-negative monetary amount.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize)]
#[serde(transparent)]
pub struct Price(Decimal);

impl Price {
    /// Zero soles.
    pub const ZERO: Self = Self(Decimal::ZERO);

    /// Create a new price.
    #[must_use]
    pub const fn new(amount: Decimal) -> Self {
        Self(amount)
    }

    /// Create a price from an amount in céntimos (1/100 of a sol).
    #[must_use]
    pub fn from_cents(cents: i64) -> Self {
        Self(Decimal::new(cents, 2))
    }

    /// Get the underlying decimal amount.
    #[must_use]
    pub const fn amount(&self) -> Decimal {
        self.0
    }

    /// Returns true if the amount is zero.
    #[must_use]
    pub const fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    /// Multiply by a quantity, as for a cart line.
    #[must_use]
    pub fn times(self, quantity: u32) -> Self {
        Self(self.0 * Decimal::from(quantity))
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{CURRENCY_SYMBOL} {:.2}", self.0)
    }
}

impl FromStr for Price {
    type Err = rust_decimal::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Decimal::from_str(s.trim()).map(Self)
    }
}

impl From<Decimal> for Price {
    fn from(amount: Decimal) -> Self {
        Self(amount)
    }
}

impl Add for Price {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self(self.0 + rhs.0)
    }
}

impl Sum for Price {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::ZERO, Add::add)
    }
}

impl<'de> Deserialize<'de> for Price {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum RawPrice {
            Text(String),
            Number(serde_json::Number),
        }

        let text = match RawPrice::deserialize(deserializer)? {
            RawPrice::Text(text) => text,
            RawPrice::Number(number) => number.to_string(),
        };

        // Floats such as 1e-7 come through in exponent form
        Decimal::from_str(text.trim())
            .or_else(|_| Decimal::from_scientific(text.trim()))
            .map(Self)
            .map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_price_accepts_string_and_number() {
        let from_text: Price = serde_json::from_str("\"19.90\"").unwrap();
        let from_number: Price = serde_json::from_str("19.9").unwrap();
        assert_eq!(from_text, from_number);

        let integer: Price = serde_json::from_str("20").unwrap();
        assert_eq!(integer, Price::from_cents(2000));
    }

    #[test]
    fn test_price_rejects_garbage() {
        assert!(serde_json::from_str::<Price>("\"twenty\"").is_err());
        assert!(serde_json::from_str::<Price>("true").is_err());
    }

    #[test]
    fn test_price_serializes_as_string() {
        let json = serde_json::to_string(&Price::from_cents(1999)).unwrap();
        assert_eq!(json, "\"19.99\"");
    }

    #[test]
    fn test_price_arithmetic() {
        let unit = Price::from_cents(2000);
        assert_eq!(unit.times(3), Price::from_cents(6000));

        let total: Price = [unit, unit.times(2)].into_iter().sum();
        assert_eq!(total, Price::from_cents(6000));

        let empty: Price = core::iter::empty().sum();
        assert_eq!(empty, Price::ZERO);
    }

    #[test]
    fn test_price_display() {
        assert_eq!(Price::from_cents(2000).to_string(), "S/ 20.00");
        assert_eq!(Price::from_cents(5).to_string(), "S/ 0.05");
    }
}
