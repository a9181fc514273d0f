//! Rupee amounts using decimal arithmetic.

use core::fmt;

use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde::{Deserialize, Serialize};

/// Rupees spent per loyalty point earned.
pub const RUPEES_PER_POINT: Decimal = Decimal::ONE_HUNDRED;

/// A currency amount in Indian rupees.
///
/// The API sends amounts as JSON numbers (`45000`, `159900.0`); both numbers
/// and decimal strings deserialize. Amounts serialize as decimal strings.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Price(Decimal);

impl Price {
    /// Zero rupees.
    pub const ZERO: Self = Self(Decimal::ZERO);

    /// Create a price from a decimal amount.
    #[must_use]
    pub const fn new(amount: Decimal) -> Self {
        Self(amount)
    }

    /// Create a price from a whole number of rupees.
    #[must_use]
    pub fn from_rupees(rupees: i64) -> Self {
        Self(Decimal::from(rupees))
    }

    /// The underlying decimal amount.
    #[must_use]
    pub const fn amount(&self) -> Decimal {
        self.0
    }

    /// Points a purchase of this amount would earn: `floor(amount / 100)`.
    ///
    /// This is a display estimate; the API computes the real figure when
    /// an order is placed. Negative amounts earn nothing.
    #[must_use]
    pub fn points_estimate(&self) -> u64 {
        (self.0 / RUPEES_PER_POINT).floor().to_u64().unwrap_or(0)
    }

    /// The non-negative difference `self - other`.
    #[must_use]
    pub fn saturating_sub(self, other: Self) -> Self {
        if other.0 >= self.0 {
            Self::ZERO
        } else {
            Self(self.0 - other.0)
        }
    }
}

impl fmt::Display for Price {
    /// Formats with the rupee sign and Indian digit grouping, e.g.
    /// `₹1,59,900` or `₹29,990.50`. Paise are shown only when non-zero.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rounded = self.0.round_dp(2);
        let sign = if rounded.is_sign_negative() && !rounded.is_zero() {
            "-"
        } else {
            ""
        };
        let abs = rounded.abs();
        let whole = abs.trunc();
        let paise = ((abs - whole) * Decimal::ONE_HUNDRED)
            .round()
            .to_u32()
            .unwrap_or(0);

        let digits = whole.normalize().to_string();
        let digits = digits.split('.').next().unwrap_or("0");

        write!(f, "{sign}₹{}", group_indian(digits))?;
        if paise > 0 {
            write!(f, ".{paise:02}")?;
        }
        Ok(())
    }
}

/// Insert separators the en-IN way: the last three digits, then pairs.
fn group_indian(digits: &str) -> String {
    if digits.len() <= 3 {
        return digits.to_owned();
    }

    let (head, tail) = digits.split_at(digits.len() - 3);
    let mut groups: Vec<&str> = Vec::new();
    let mut rest = head;
    while rest.len() > 2 {
        let (more, pair) = rest.split_at(rest.len() - 2);
        groups.push(pair);
        rest = more;
    }
    if !rest.is_empty() {
        groups.push(rest);
    }
    groups.reverse();

    format!("{},{tail}", groups.join(","))
}

impl From<Decimal> for Price {
    fn from(amount: Decimal) -> Self {
        Self(amount)
    }
}
