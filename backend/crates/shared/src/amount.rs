//! Money Amounts
//!
//! Monetary values are stored and computed in gateway minor units
//! (1 currency unit = 100 minor units) to avoid floating-point money.
//! DTOs accept major units; the conversion happens exactly once at the
//! API boundary.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Minor units per major currency unit
pub const MINOR_PER_UNIT: i64 = 100;

/// Error for invalid monetary amounts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum AmountError {
    /// Amount must be strictly positive
    #[error("Amount must be positive")]
    NotPositive,

    /// Amount exceeds the allowed maximum
    #[error("Amount exceeds the maximum of {max} currency units")]
    AboveCeiling { max: i64 },
}

/// A positive monetary amount in minor units
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Amount(i64);

impl Amount {
    /// Build from minor units, rejecting non-positive values
    pub fn from_minor(minor: i64) -> Result<Self, AmountError> {
        if minor <= 0 {
            return Err(AmountError::NotPositive);
        }
        Ok(Self(minor))
    }

    /// Build from major currency units (what API callers send)
    pub fn from_units(units: i64) -> Result<Self, AmountError> {
        if units <= 0 {
            return Err(AmountError::NotPositive);
        }
        units
            .checked_mul(MINOR_PER_UNIT)
            .map(Self)
            .ok_or(AmountError::AboveCeiling {
                max: i64::MAX / MINOR_PER_UNIT,
            })
    }

    /// Build from major units with an inclusive ceiling in major units
    pub fn from_units_capped(units: i64, max_units: i64) -> Result<Self, AmountError> {
        if units > max_units {
            return Err(AmountError::AboveCeiling { max: max_units });
        }
        Self::from_units(units)
    }

    /// Minor units (what the gateway and the database see)
    pub fn minor(&self) -> i64 {
        self.0
    }

    /// Whole major units, truncating
    pub fn units(&self) -> i64 {
        self.0 / MINOR_PER_UNIT
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{:02}", self.0 / MINOR_PER_UNIT, self.0 % MINOR_PER_UNIT)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_units() {
        let amount = Amount::from_units(250).unwrap();
        assert_eq!(amount.minor(), 25_000);
        assert_eq!(amount.units(), 250);
    }

    #[test]
    fn test_rejects_non_positive() {
        assert_eq!(Amount::from_units(0), Err(AmountError::NotPositive));
        assert_eq!(Amount::from_units(-5), Err(AmountError::NotPositive));
        assert_eq!(Amount::from_minor(0), Err(AmountError::NotPositive));
    }

    #[test]
    fn test_ceiling() {
        assert!(Amount::from_units_capped(100_000, 100_000).is_ok());
        assert_eq!(
            Amount::from_units_capped(100_001, 100_000),
            Err(AmountError::AboveCeiling { max: 100_000 })
        );
    }

    #[test]
    fn test_display() {
        let amount = Amount::from_minor(123_45).unwrap();
        assert_eq!(amount.to_string(), "123.45");
    }
}
