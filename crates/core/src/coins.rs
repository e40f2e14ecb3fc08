//! Integer coin amounts.

use serde::{Deserialize, Serialize};

use crate::error::{DomainError, DomainResult};
use crate::value_object::ValueObject;

/// A non-negative whole number of coins.
///
/// Balances, prices and transfer amounts are all `Coins`. Signed adjustments
/// are expressed as a plain `i64` delta and only become `Coins` again after
/// the ledger has checked the result.
#[derive(
    Debug, Copy, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(try_from = "i64", into = "i64")]
pub struct Coins(i64);

impl Coins {
    pub const ZERO: Coins = Coins(0);

    /// Validate a raw amount. Negative amounts are rejected.
    pub fn new(amount: i64) -> DomainResult<Self> {
        if amount < 0 {
            return Err(DomainError::validation(format!(
                "coin amount must not be negative (got {amount})"
            )));
        }
        Ok(Self(amount))
    }

    /// Build a constant amount. Only for literals known to be non-negative.
    pub const fn from_const(amount: u32) -> Self {
        Self(amount as i64)
    }

    pub fn get(self) -> i64 {
        self.0
    }

    pub fn checked_add(self, other: Coins) -> DomainResult<Coins> {
        self.0
            .checked_add(other.0)
            .map(Coins)
            .ok_or(DomainError::Overflow)
    }

    /// Subtract, returning `None` when the result would be negative.
    pub fn checked_sub(self, other: Coins) -> Option<Coins> {
        let rest = self.0 - other.0;
        (rest >= 0).then_some(Coins(rest))
    }
}

impl ValueObject for Coins {}

impl TryFrom<i64> for Coins {
    type Error = DomainError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Coins> for i64 {
    fn from(value: Coins) -> Self {
        value.0
    }
}

impl core::fmt::Display for Coins {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.0, f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn negative_amount_is_rejected() {
        assert!(matches!(Coins::new(-1), Err(DomainError::Validation(_))));
        assert_eq!(Coins::new(0).unwrap(), Coins::ZERO);
    }

    #[test]
    fn subtraction_below_zero_yields_none() {
        let ten = Coins::from_const(10);
        assert_eq!(ten.checked_sub(Coins::from_const(11)), None);
        assert_eq!(ten.checked_sub(ten), Some(Coins::ZERO));
    }

    #[test]
    fn addition_overflow_is_reported() {
        let max = Coins::new(i64::MAX).unwrap();
        assert_eq!(max.checked_add(Coins::from_const(1)), Err(DomainError::Overflow));
    }

    #[test]
    fn deserialization_enforces_non_negative() {
        assert_eq!(serde_json::from_str::<Coins>("42").unwrap(), Coins::from_const(42));
        assert!(serde_json::from_str::<Coins>("-5").is_err());
    }

    proptest! {
        #[test]
        fn add_then_sub_restores_original(a in 0i64..1_000_000_000, b in 0i64..1_000_000_000) {
            let a = Coins::new(a).unwrap();
            let b = Coins::new(b).unwrap();
            let sum = a.checked_add(b).unwrap();
            prop_assert_eq!(sum.checked_sub(b), Some(a));
        }
    }
}
