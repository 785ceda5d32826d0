//! Entry amounts in integer minor currency units.
//!
//! Records carry cents; human-facing inputs (the CSV manifest) carry decimal
//! major units. Conversion goes through `rust_decimal` so `12.34` never passes
//! through floating point.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// A non-negative amount of minor currency units (cents).
///
/// # Examples
///
/// ```
/// use ach_builder::Amount;
///
/// let amount: Amount = "73.5".parse().unwrap();
/// assert_eq!(amount.cents(), 7350);
/// assert_eq!(amount.to_string(), "73.50");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Amount(u64);

/// Why a decimal amount string could not become an [`Amount`].
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AmountError {
    #[error("not a decimal number: {0}")]
    Invalid(String),

    #[error("amount is negative")]
    Negative,

    #[error("amount has more than {} decimal places", Amount::SCALE)]
    TooPrecise,

    #[error("amount is too large")]
    TooLarge,
}

impl Amount {
    /// Decimal places between major and minor units.
    pub const SCALE: u32 = 2;

    pub const ZERO: Self = Amount(0);

    pub fn from_cents(cents: u64) -> Self {
        Amount(cents)
    }

    pub fn cents(&self) -> u64 {
        self.0
    }

    pub fn checked_add(self, rhs: Self) -> Option<Self> {
        self.0.checked_add(rhs.0).map(Amount)
    }
}

impl FromStr for Amount {
    type Err = AmountError;

    /// Parses decimal major units, e.g. `"12.34"` or `"7000"`.
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let trimmed = s.trim();
        let decimal =
            Decimal::from_str(trimmed).map_err(|e| AmountError::Invalid(e.to_string()))?;
        if decimal.is_sign_negative() && !decimal.is_zero() {
            return Err(AmountError::Negative);
        }

        let normalized = decimal.normalize();
        if normalized.scale() > Self::SCALE {
            return Err(AmountError::TooPrecise);
        }

        let cents = normalized
            .checked_mul(Decimal::from(100u32))
            .ok_or(AmountError::TooLarge)?;
        cents.to_u64().map(Amount).ok_or(AmountError::TooLarge)
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{:02}", self.0 / 100, self.0 % 100)
    }
}
