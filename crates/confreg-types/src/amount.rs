use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::TypeError;

/// A value in the smallest currency unit.
///
/// Amounts are never negative and never wrap: addition and subtraction are
/// checked and report [`TypeError`] instead.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Amount(u64);

impl Amount {
    /// The zero amount.
    pub const ZERO: Self = Self(0);

    pub const fn new(value: u64) -> Self {
        Self(value)
    }

    pub const fn value(self) -> u64 {
        self.0
    }

    pub const fn is_zero(self) -> bool {
        self.0 == 0
    }

    /// Checked addition.
    pub fn checked_add(self, rhs: Self) -> Result<Self, TypeError> {
        self.0
            .checked_add(rhs.0)
            .map(Self)
            .ok_or(TypeError::AmountOverflow {
                left: self.0,
                right: rhs.0,
            })
    }

    /// Checked subtraction.
    pub fn checked_sub(self, rhs: Self) -> Result<Self, TypeError> {
        self.0
            .checked_sub(rhs.0)
            .map(Self)
            .ok_or(TypeError::AmountUnderflow {
                left: self.0,
                right: rhs.0,
            })
    }
}

impl From<u64> for Amount {
    fn from(value: u64) -> Self {
        Self(value)
    }
}

impl FromStr for Amount {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim()
            .parse::<u64>()
            .map(Self)
            .map_err(|e| TypeError::InvalidAmount(format!("{s:?}: {e}")))
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Maximum number of registrants the registry admits.
///
/// Unsigned by construction; there is no runtime range check.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Quota(u64);

impl Quota {
    pub const fn new(value: u64) -> Self {
        Self(value)
    }

    pub const fn value(self) -> u64 {
        self.0
    }

    /// Returns `true` if a registrant count of `count` fits within the quota.
    pub const fn admits(self, count: u64) -> bool {
        count <= self.0
    }
}

impl From<u64> for Quota {
    fn from(value: u64) -> Self {
        Self(value)
    }
}

impl fmt::Display for Quota {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn checked_add_reports_overflow() {
        let err = Amount::new(u64::MAX).checked_add(Amount::new(1)).unwrap_err();
        assert_eq!(
            err,
            TypeError::AmountOverflow {
                left: u64::MAX,
                right: 1
            }
        );
    }

    #[test]
    fn checked_sub_reports_underflow() {
        let err = Amount::new(5).checked_sub(Amount::new(6)).unwrap_err();
        assert_eq!(err, TypeError::AmountUnderflow { left: 5, right: 6 });
    }

    #[test]
    fn parse_amount() {
        assert_eq!(" 20 ".parse::<Amount>().unwrap(), Amount::new(20));
        assert!(matches!(
            "-3".parse::<Amount>(),
            Err(TypeError::InvalidAmount(_))
        ));
    }

    #[test]
    fn quota_admits_up_to_and_including_limit() {
        let quota = Quota::new(2);
        assert!(quota.admits(2));
        assert!(!quota.admits(3));
        assert!(Quota::new(0).admits(0));
    }

    #[test]
    fn amount_serializes_as_plain_number() {
        assert_eq!(serde_json::to_string(&Amount::new(20)).unwrap(), "20");
        assert_eq!(serde_json::to_string(&Quota::new(650)).unwrap(), "650");
    }

    proptest! {
        #[test]
        fn add_then_sub_restores(a in 0u64..u64::MAX / 2, b in 0u64..u64::MAX / 2) {
            let sum = Amount::new(a).checked_add(Amount::new(b)).unwrap();
            prop_assert_eq!(sum.checked_sub(Amount::new(b)).unwrap(), Amount::new(a));
        }
    }
}
