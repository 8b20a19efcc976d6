//! Type-safe price representation using decimal arithmetic.
//!
//! Prices are stored as [`Decimal`] so cart totals never pick up binary
//! floating point error. On the wire a price is a plain JSON number, which
//! keeps persisted carts readable by the storefront's browser widget.

use core::fmt;
use core::iter::Sum;
use core::ops::Add;
use core::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Errors that can occur when constructing a [`Price`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum PriceError {
    /// The input is not a decimal number.
    #[error("invalid price: {0}")]
    Invalid(String),
    /// The amount is below zero.
    #[error("price cannot be negative")]
    Negative,
    /// The amount is above [`Price::MAX`].
    #[error("price cannot exceed 1000000000000")]
    TooLarge,
}

/// A non-negative amount in the shop currency's standard unit.
///
/// Amounts are capped at [`Price::MAX`] so that a cart full of lines at
/// [`LineItem::MAX_QUANTITY`](crate::LineItem::MAX_QUANTITY) still totals
/// well inside `Decimal`'s range.
///
/// ```
/// use aromiq_core::Price;
///
/// let price = Price::parse("100").unwrap();
/// assert_eq!(price.times(2), Price::parse("200").unwrap());
/// assert!(Price::parse("-1").is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Price(Decimal);

impl Price {
    /// A price of zero.
    pub const ZERO: Self = Self(Decimal::ZERO);

    /// The largest accepted price, one trillion.
    pub const MAX: Self = Self(Decimal::from_parts(0xD4A5_1000, 0xE8, 0, false, 0));

    /// Create a price from a decimal amount.
    ///
    /// # Errors
    ///
    /// Returns [`PriceError::Negative`] if `amount` is below zero and
    /// [`PriceError::TooLarge`] if it is above [`Price::MAX`].
    pub fn new(amount: Decimal) -> Result<Self, PriceError> {
        if amount.is_sign_negative() && !amount.is_zero() {
            return Err(PriceError::Negative);
        }
        if amount > Self::MAX.0 {
            return Err(PriceError::TooLarge);
        }
        Ok(Self(amount))
    }

    /// Parse a price from user input such as `"100"` or `"19.99"`.
    ///
    /// # Errors
    ///
    /// Returns an error if the input is not a number or is out of range.
    pub fn parse(s: &str) -> Result<Self, PriceError> {
        let amount =
            Decimal::from_str(s.trim()).map_err(|_| PriceError::Invalid(s.trim().to_owned()))?;
        Self::new(amount)
    }

    /// The underlying decimal amount.
    #[must_use]
    pub const fn amount(&self) -> Decimal {
        self.0
    }

    /// Price of `quantity` units. Saturates instead of overflowing.
    #[must_use]
    pub fn times(self, quantity: u32) -> Self {
        Self(self.0.saturating_mul(Decimal::from(quantity)))
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.normalize())
    }
}

impl FromStr for Price {
    type Err = PriceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<Decimal> for Price {
    type Error = PriceError;

    fn try_from(amount: Decimal) -> Result<Self, Self::Error> {
        Self::new(amount)
    }
}

impl Add for Price {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Self(self.0.saturating_add(rhs.0))
    }
}

impl Sum for Price {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::ZERO, Add::add)
    }
}

impl Serialize for Price {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        rust_decimal::serde::float::serialize(&self.0, serializer)
    }
}

impl<'de> Deserialize<'de> for Price {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let amount = rust_decimal::serde::float::deserialize(deserializer)?;
        Self::new(amount).map_err(serde::de::Error::custom)
    }
}

/// Error returned when a currency code is not supported.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("unsupported currency code: {0}")]
pub struct CurrencyError(pub String);

/// ISO 4217 currency codes the storefront can display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum CurrencyCode {
    /// Bangladeshi taka, the storefront's home currency.
    #[default]
    BDT,
    USD,
    EUR,
    GBP,
    CAD,
    AUD,
}

impl CurrencyCode {
    /// The ISO 4217 code.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::BDT => "BDT",
            Self::USD => "USD",
            Self::EUR => "EUR",
            Self::GBP => "GBP",
            Self::CAD => "CAD",
            Self::AUD => "AUD",
        }
    }

    /// Format a price for display, e.g. `"200 Tk"` or `"$19.99"`.
    #[must_use]
    pub fn format(&self, price: Price) -> String {
        match self {
            Self::BDT => format!("{price} Tk"),
            Self::USD | Self::CAD | Self::AUD => format!("${:.2}", price.amount()),
            Self::EUR => format!("€{:.2}", price.amount()),
            Self::GBP => format!("£{:.2}", price.amount()),
        }
    }
}

impl fmt::Display for CurrencyCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for CurrencyCode {
    type Err = CurrencyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "BDT" => Ok(Self::BDT),
            "USD" => Ok(Self::USD),
            "EUR" => Ok(Self::EUR),
            "GBP" => Ok(Self::GBP),
            "CAD" => Ok(Self::CAD),
            "AUD" => Ok(Self::AUD),
            other => Err(CurrencyError(other.to_owned())),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_valid() {
        assert_eq!(Price::parse("100").unwrap().amount(), Decimal::from(100));
        assert_eq!(
            Price::parse(" 19.99 ").unwrap().amount(),
            Decimal::new(1999, 2)
        );
        assert_eq!(Price::parse("0").unwrap(), Price::ZERO);
    }

    #[test]
    fn test_parse_invalid() {
        assert_eq!(
            Price::parse("abc"),
            Err(PriceError::Invalid("abc".to_string()))
        );
        assert_eq!(Price::parse("-5"), Err(PriceError::Negative));
    }

    #[test]
    fn test_max_bound() {
        assert_eq!(Price::MAX, Price::parse("1000000000000").unwrap());
        assert_eq!(
            Price::parse("1000000000000.01"),
            Err(PriceError::TooLarge)
        );
        assert_eq!(
            Price::parse("100000000000000000000"),
            Err(PriceError::TooLarge)
        );
    }

    #[test]
    fn test_deserialize_rejects_too_large() {
        let result: Result<Price, _> = serde_json::from_str("1e28");
        assert!(result.is_err());
    }

    #[test]
    fn test_arithmetic_saturates() {
        let huge = Price(Decimal::MAX);
        assert_eq!(huge.times(9).amount(), Decimal::MAX);
        assert_eq!((huge + huge).amount(), Decimal::MAX);
    }

    #[test]
    fn test_times_and_sum() {
        let price = Price::parse("12.50").unwrap();
        assert_eq!(price.times(3), Price::parse("37.5").unwrap());

        let total: Price = [price, price.times(2)].into_iter().sum();
        assert_eq!(total, Price::parse("37.50").unwrap());
    }

    #[test]
    fn test_serializes_as_number() {
        let json = serde_json::to_string(&Price::parse("100").unwrap()).unwrap();
        assert_eq!(json, "100.0");
    }

    #[test]
    fn test_deserializes_integers_and_floats() {
        let from_int: Price = serde_json::from_str("1200").unwrap();
        assert_eq!(from_int, Price::parse("1200").unwrap());

        let from_float: Price = serde_json::from_str("19.99").unwrap();
        assert_eq!(from_float, Price::parse("19.99").unwrap());
    }

    #[test]
    fn test_deserialize_rejects_negative() {
        let result: Result<Price, _> = serde_json::from_str("-3");
        assert!(result.is_err());
    }

    #[test]
    fn test_display_normalizes() {
        assert_eq!(Price::parse("200.00").unwrap().to_string(), "200");
        assert_eq!(Price::parse("19.90").unwrap().to_string(), "19.9");
    }

    #[test]
    fn test_currency_format() {
        let price = Price::parse("200").unwrap();
        assert_eq!(CurrencyCode::BDT.format(price), "200 Tk");
        assert_eq!(
            CurrencyCode::USD.format(Price::parse("19.99").unwrap()),
            "$19.99"
        );
    }

    #[test]
    fn test_currency_from_str() {
        assert_eq!("bdt".parse::<CurrencyCode>().unwrap(), CurrencyCode::BDT);
        assert_eq!("USD".parse::<CurrencyCode>().unwrap(), CurrencyCode::USD);
        assert!("XYZ".parse::<CurrencyCode>().is_err());
        assert_eq!(CurrencyCode::default(), CurrencyCode::BDT);
    }
}
