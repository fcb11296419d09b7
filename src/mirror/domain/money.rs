//! Fixed-point money for rewards and bonuses.
//!
//! The marketplace quotes amounts as decimal strings with at most three
//! fractional digits (e.g. `"0.05"`). Amounts are held as an integer count of
//! thousandths of a currency unit so that merging and comparison never touch
//! floating point.

use super::MirrorDomainError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A non-negative monetary amount in thousandths of a currency unit.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
#[serde(transparent)]
pub struct Reward(u64);

impl Reward {
    /// Creates an amount from a raw count of thousandths.
    #[must_use]
    pub const fn from_thousandths(thousandths: u64) -> Self {
        Self(thousandths)
    }

    /// Parses a marketplace decimal string such as `"1.25"` or `"0.050"`.
    ///
    /// # Errors
    ///
    /// Returns [`MirrorDomainError::MalformedAmount`] when the value is not a
    /// plain non-negative decimal or carries more than three fractional
    /// digits.
    pub fn from_wire(value: &str) -> Result<Self, MirrorDomainError> {
        let malformed = || MirrorDomainError::MalformedAmount(value.to_owned());
        let trimmed = value.trim();
        let (units_part, fraction_part) = trimmed
            .split_once('.')
            .map_or((trimmed, ""), |(units, fraction)| (units, fraction));

        if units_part.is_empty() || fraction_part.len() > 3 {
            return Err(malformed());
        }
        let units: u64 = units_part.parse().map_err(|_| malformed())?;
        let mut thousandths: u64 = 0;
        if !fraction_part.is_empty() {
            let digits: u64 = fraction_part.parse().map_err(|_| malformed())?;
            let scale = match fraction_part.len() {
                1 => 100,
                2 => 10,
                _ => 1,
            };
            thousandths = digits
                .checked_mul(scale)
                .ok_or_else(malformed)?;
        }
        units
            .checked_mul(1000)
            .and_then(|scaled| scaled.checked_add(thousandths))
            .map(Self)
            .ok_or_else(malformed)
    }

    /// Returns the raw count of thousandths.
    #[must_use]
    pub const fn thousandths(self) -> u64 {
        self.0
    }

    /// Returns `true` when the amount is strictly greater than zero.
    #[must_use]
    pub const fn is_positive(self) -> bool {
        self.0 > 0
    }

    /// Formats the amount as a marketplace decimal string.
    #[must_use]
    pub fn to_wire(self) -> String {
        self.to_string()
    }
}

impl fmt::Display for Reward {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let units = self.0.div_euclid(1000);
        let fraction = self.0.rem_euclid(1000);
        write!(f, "{units}.{fraction:03}")
    }
}
