//! Amount type for handling monetary values with optional dollar signs.
//!
//! This module provides the `Amount` type which wraps `Decimal` and handles parsing values that may
//! or may not include a dollar sign and commas, e.g. `$52,000` or `52000.00`.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::error::Error;
use std::fmt;
use std::fmt::{Debug, Display, Formatter};
use std::str::FromStr;

/// Number of decimal places kept for currency.
const CENTS: u32 = 2;

/// Represents a dollar amount.
///
/// Equality and ordering are numeric, so `Amount::from_str("$5,000")` equals
/// `Amount::from_str("5000.00")`.
///
/// # Examples
///
/// ```
/// # use household_budget::model::Amount;
/// # use std::str::FromStr;
/// let amount = Amount::from_str("-$1,250.5").unwrap();
/// assert_eq!(amount.to_string(), "-$1,250.50");
/// assert_eq!(amount.to_db(), "-1250.50");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Amount(Decimal);

impl Amount {
    pub const ZERO: Amount = Amount(Decimal::ZERO);

    /// Creates a new Amount from a Decimal value.
    pub const fn new(value: Decimal) -> Self {
        Self(value)
    }

    /// Returns the underlying Decimal value.
    pub fn value(&self) -> Decimal {
        self.0
    }

    /// Rounds half away from zero to whole cents and fixes the scale at two places, so that the
    /// stored text always looks like `2000.00`.
    pub fn round_cents(&self) -> Self {
        let mut value = self
            .0
            .round_dp_with_strategy(CENTS, RoundingStrategy::MidpointAwayFromZero);
        value.rescale(CENTS);
        Self(value)
    }

    /// Returns true if the amount is zero.
    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    /// Returns true if the amount is negative.
    pub fn is_negative(&self) -> bool {
        !self.is_zero() && self.0.is_sign_negative()
    }

    /// `None` if the result does not fit in a `Decimal`.
    pub fn checked_add(self, rhs: Amount) -> Option<Amount> {
        self.0.checked_add(rhs.0).map(Amount)
    }

    /// `None` if the result does not fit in a `Decimal`.
    pub fn checked_sub(self, rhs: Amount) -> Option<Amount> {
        self.0.checked_sub(rhs.0).map(Amount)
    }

    /// Adds up `amounts`, or returns `None` if the total overflows.
    pub fn checked_sum(amounts: impl IntoIterator<Item = Amount>) -> Option<Amount> {
        amounts
            .into_iter()
            .try_fold(Amount::ZERO, Amount::checked_add)
    }

    /// The plain text form used for SQLite columns, e.g. `-1250.50`.
    pub fn to_db(&self) -> String {
        self.round_cents().0.to_string()
    }
}

/// An error that can occur when parsing strings into `Decimal` values.
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

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Ok(Amount::default());
        }

        // "-$50.00", "$50.00", "-50.00" and "50.00" are all accepted
        let without_dollar = if let Some(after_minus) = trimmed.strip_prefix('-') {
            match after_minus.strip_prefix('$') {
                Some(after_dollar) => format!("-{after_dollar}"),
                None => trimmed.to_string(),
            }
        } else {
            trimmed.strip_prefix('$').unwrap_or(trimmed).to_string()
        };

        let without_commas = without_dollar.replace(',', "");
        let value = Decimal::from_str(&without_commas).map_err(AmountError)?;
        Ok(Amount(value))
    }
}

impl Display for Amount {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let sign = if self.is_negative() { "-" } else { "" };
        let num = self.round_cents().0.abs();
        write!(
            f,
            "{sign}${}",
            format_num::format_num!(",.2", num.to_f64().unwrap_or_default())
        )
    }
}

impl Serialize for Amount {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.to_db())
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

#[cfg(test)]
mod tests {
    use super::*;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn test_parse_with_dollar_sign_and_commas() {
        let amount = Amount::from_str("$52,000").unwrap();
        assert_eq!(amount.value(), dec("52000"));
    }

    #[test]
    fn test_parse_negative_with_dollar_sign() {
        let amount = Amount::from_str("-$50.00").unwrap();
        assert_eq!(amount.value(), dec("-50.00"));
    }

    #[test]
    fn test_parse_plain() {
        let amount = Amount::from_str("  1234.5 ").unwrap();
        assert_eq!(amount.value(), dec("1234.5"));
    }

    #[test]
    fn test_parse_empty_string() {
        assert!(Amount::from_str("").unwrap().is_zero());
    }

    #[test]
    fn test_parse_garbage() {
        assert!(Amount::from_str("twelve").is_err());
    }

    #[test]
    fn test_round_cents_midpoint() {
        assert_eq!(Amount::new(dec("1.005")).round_cents().value(), dec("1.01"));
        assert_eq!(Amount::new(dec("-1.005")).round_cents().value(), dec("-1.01"));
        assert_eq!(Amount::new(dec("2000")).round_cents().to_db(), "2000.00");
    }

    #[test]
    fn test_display() {
        assert_eq!(Amount::new(dec("2000")).to_string(), "$2,000.00");
        assert_eq!(Amount::new(dec("-12.5")).to_string(), "-$12.50");
        assert_eq!(Amount::ZERO.to_string(), "$0.00");
    }

    #[test]
    fn test_numeric_equality() {
        let a = Amount::from_str("$5,000").unwrap();
        let b = Amount::from_str("5000.00").unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_checked_sum() {
        let total = Amount::checked_sum(
            ["1.10", "2.20", "-0.30"]
                .iter()
                .map(|s| Amount::from_str(s).unwrap()),
        )
        .unwrap();
        assert_eq!(total.value(), dec("3.00"));
    }

    #[test]
    fn test_checked_arithmetic_overflow() {
        let max = Amount::new(Decimal::MAX);
        let min = Amount::new(Decimal::MIN);
        assert_eq!(max.checked_add(Amount::new(dec("1"))), None);
        assert_eq!(min.checked_sub(max), None);
        assert_eq!(Amount::checked_sum([max, max]), None);
        assert_eq!(
            max.checked_sub(Amount::new(dec("1"))),
            Some(Amount::new(Decimal::MAX - Decimal::ONE))
        );
    }

    #[test]
    fn test_serde() {
        let amount = Amount::new(dec("50"));
        let json = serde_json::to_string(&amount).unwrap();
        assert_eq!(json, "\"50.00\"");
        let back: Amount = serde_json::from_str("\"$50\"").unwrap();
        assert_eq!(back, amount);
    }
}
