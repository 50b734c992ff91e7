//! # Money Module
//!
//! Provides the `Money` type for handling monetary values safely.
//!
//! ## Why Integer Money?
//! Floating point cannot represent decimal amounts exactly, and meal rates
//! are billed to client companies at month end - a one-peso drift across
//! thousands of consumptions is a real invoice dispute. Chilean pesos have
//! no minor unit in practice, so `Money` is a whole-peso `i64` and all
//! arithmetic stays in integers.
//!
//! ## Usage
//! ```rust
//! use foodpass_core::money::Money;
//!
//! let lunch = Money::from_pesos(4500);
//! let enhanced = Money::from_pesos(5500);
//!
//! assert_eq!((lunch + enhanced).pesos(), 10_000);
//! assert_eq!(format!("{}", lunch), "$4.500");
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Mul, Sub, SubAssign};
use ts_rs::TS;

/// A monetary amount in whole Chilean pesos.
///
/// ## Design Decisions
/// - **i64 (signed)**: allows negative values in aggregations/adjustments
/// - **Single field tuple struct**: zero-cost abstraction over i64
/// - **No float constructor**: amounts always enter as integers
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS,
)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(transparent))]
#[ts(export)]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from whole pesos.
    #[inline]
    pub const fn from_pesos(pesos: i64) -> Self {
        Money(pesos)
    }

    /// Returns the amount in whole pesos.
    #[inline]
    pub const fn pesos(&self) -> i64 {
        self.0
    }

    /// Zero amount.
    #[inline]
    pub const fn zero() -> Self {
        Money(0)
    }

    /// Checks if the amount is zero.
    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Checks if the amount is negative.
    ///
    /// Rate tables must never contain negative amounts; this is the check
    /// validation uses.
    #[inline]
    pub const fn is_negative(&self) -> bool {
        self.0 < 0
    }
}

impl Add for Money {
    type Output = Money;

    fn add(self, rhs: Money) -> Money {
        Money(self.0 + rhs.0)
    }
}

impl AddAssign for Money {
    fn add_assign(&mut self, rhs: Money) {
        self.0 += rhs.0;
    }
}

impl Sub for Money {
    type Output = Money;

    fn sub(self, rhs: Money) -> Money {
        Money(self.0 - rhs.0)
    }
}

impl SubAssign for Money {
    fn sub_assign(&mut self, rhs: Money) {
        self.0 -= rhs.0;
    }
}

impl Mul<i64> for Money {
    type Output = Money;

    fn mul(self, rhs: i64) -> Money {
        Money(self.0 * rhs)
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Money {
        iter.fold(Money::zero(), Add::add)
    }
}

/// Formats as Chilean pesos with dot thousands separators: `$4.500`.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let negative = self.0 < 0;
        let digits = self.0.unsigned_abs().to_string();

        // Insert a dot every three digits from the right.
        let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
        let offset = digits.len() % 3;
        for (i, c) in digits.chars().enumerate() {
            if i != 0 && (i + 3 - offset) % 3 == 0 {
                grouped.push('.');
            }
            grouped.push(c);
        }

        if negative {
            write!(f, "-${}", grouped)
        } else {
            write!(f, "${}", grouped)
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
