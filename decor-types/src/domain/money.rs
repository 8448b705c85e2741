//! Type-safe monetary value with embedded currency.

use serde::{Deserialize, Serialize};
use std::fmt;
use utoipa::ToSchema;

use crate::error::DomainError;

/// Currencies accepted at the checkout gateway.
///
/// Serialized as the gateway's lowercase ISO code (`"usd"`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Currency {
    USD,
    EUR,
    GBP,
    INR,
}

impl Currency {
    /// Returns the number of decimal places for this currency.
    pub fn decimal_places(&self) -> u32 {
        match self {
            Currency::USD | Currency::EUR | Currency::GBP | Currency::INR => 2,
        }
    }

    /// Returns the currency symbol.
    pub fn symbol(&self) -> &'static str {
        match self {
            Currency::USD => "$",
            Currency::EUR => "€",
            Currency::GBP => "£",
            Currency::INR => "₹",
        }
    }

    /// Lowercase ISO code as used on the wire and in storage.
    pub fn code(&self) -> &'static str {
        match self {
            Currency::USD => "usd",
            Currency::EUR => "eur",
            Currency::GBP => "gbp",
            Currency::INR => "inr",
        }
    }

    fn minor_per_major(&self) -> i64 {
        10_i64.pow(self.decimal_places())
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl std::str::FromStr for Currency {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "usd" => Ok(Currency::USD),
            "eur" => Ok(Currency::EUR),
            "gbp" => Ok(Currency::GBP),
            "inr" => Ok(Currency::INR),
            other => Err(DomainError::ValidationError(format!(
                "Unsupported currency: {}",
                other
            ))),
        }
    }
}

/// Type-safe money representation with embedded currency.
///
/// Amount is stored in the smallest unit of the currency (cents, paise, etc.)
/// to avoid floating-point precision issues.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Money {
    amount: i64,
    currency: Currency,
}

impl Money {
    /// Creates a new Money value.
    pub fn new(amount: i64, currency: Currency) -> Result<Self, DomainError> {
        if amount < 0 {
            return Err(DomainError::NegativeAmount);
        }
        Ok(Self { amount, currency })
    }

    /// Creates a zero-value Money for the given currency.
    pub fn zero(currency: Currency) -> Self {
        Self {
            amount: 0,
            currency,
        }
    }

    /// Converts a major-unit value (e.g. dollars) into minor units.
    ///
    /// Digits beyond the currency's precision are truncated toward zero.
    /// The conversion reads the shortest decimal form of `value`, so `19.99`
    /// yields `1999` rather than the `1998` a naive `(value * 100.0) as i64`
    /// would produce.
    pub fn from_major(value: f64, currency: Currency) -> Result<Self, DomainError> {
        if !value.is_finite() {
            return Err(DomainError::NonFiniteAmount);
        }
        if value < 0.0 {
            return Err(DomainError::NegativeAmount);
        }

        let repr = value.to_string();
        let (whole, fraction) = repr.split_once('.').unwrap_or((repr.as_str(), ""));
        let places = currency.decimal_places() as usize;

        let whole: i64 = whole
            .parse()
            .map_err(|_| DomainError::AmountOutOfRange(repr.clone()))?;
        let minor: i64 = fraction
            .chars()
            .chain(std::iter::repeat('0'))
            .take(places)
            .collect::<String>()
            .parse()
            .map_err(|_| DomainError::AmountOutOfRange(repr.clone()))?;

        let amount = whole
            .checked_mul(currency.minor_per_major())
            .and_then(|m| m.checked_add(minor))
            .ok_or(DomainError::AmountOutOfRange(repr))?;

        Ok(Self { amount, currency })
    }

    /// Returns the amount in smallest currency unit.
    pub fn amount(&self) -> i64 {
        self.amount
    }

    /// Returns the currency.
    pub fn currency(&self) -> Currency {
        self.currency
    }

    /// Returns the amount in major units (e.g. `5000` cents -> `50.0`).
    pub fn to_major(&self) -> f64 {
        self.amount as f64 / self.currency.minor_per_major() as f64
    }

    pub fn is_zero(&self) -> bool {
        self.amount == 0
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let per_major = self.currency.minor_per_major();
        let major = self.amount / per_major;
        let minor = (self.amount % per_major).abs();
        write!(f, "{}{}.{:02}", self.currency.symbol(), major, minor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_money_creation() {
        let money = Money::new(1000, Currency::USD).unwrap();
        assert_eq!(money.amount(), 1000);
        assert_eq!(money.currency(), Currency::USD);
    }

    #[test]
    fn test_negative_money_fails() {
        let result = Money::new(-100, Currency::USD);
        assert!(matches!(result, Err(DomainError::NegativeAmount)));
    }

    #[test]
    fn test_from_major_keeps_cents_exact() {
        assert_eq!(Money::from_major(19.99, Currency::USD).unwrap().amount(), 1999);
        assert_eq!(Money::from_major(10.0, Currency::USD).unwrap().amount(), 1000);
        assert_eq!(Money::from_major(0.29, Currency::USD).unwrap().amount(), 29);
    }

    #[test]
    fn test_from_major_truncates_extra_precision() {
        assert_eq!(Money::from_major(12.345, Currency::USD).unwrap().amount(), 1234);
        assert_eq!(Money::from_major(12.5, Currency::USD).unwrap().amount(), 1250);
    }

    #[test]
    fn test_from_major_rejects_bad_values() {
        assert!(matches!(
            Money::from_major(f64::NAN, Currency::USD),
            Err(DomainError::NonFiniteAmount)
        ));
        assert!(matches!(
            Money::from_major(-1.0, Currency::USD),
            Err(DomainError::NegativeAmount)
        ));
        assert!(matches!(
            Money::from_major(1e300, Currency::USD),
            Err(DomainError::AmountOutOfRange(_))
        ));
    }

    #[test]
    fn test_to_major() {
        let money = Money::new(5000, Currency::USD).unwrap();
        assert_eq!(money.to_major(), 50.0);
    }

    #[test]
    fn test_currency_codes() {
        assert_eq!("USD".parse::<Currency>().unwrap(), Currency::USD);
        assert_eq!(Currency::EUR.code(), "eur");
        assert!("xyz".parse::<Currency>().is_err());
    }

    #[test]
    fn test_money_display() {
        let money = Money::new(1050, Currency::USD).unwrap();
        assert_eq!(format!("{}", money), "$10.50");
    }
}
