//! # Money Module
//!
//! Provides the `Money` type for handling monetary values safely.
//!
//! ## Why Integer Money?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  THE FLOATING POINT PROBLEM                                             │
//! │                                                                         │
//! │  A spreadsheet hands us prices as text: "5.00", "1.10", "2.2"           │
//! │  Summed as floats:                                                      │
//! │    1.10 + 2.20 = 3.3000000000000003  ❌ WRONG!                          │
//! │                                                                         │
//! │  OUR SOLUTION: Integer Cents                                            │
//! │    "1.10" → 110, "2.2" → 220, 110 + 220 = 330 → "3.30"                 │
//! │                                                                         │
//! │  Cell text is parsed once at the store boundary, every total is         │
//! │  computed in cents, and written back as two-decimal text.               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use stockbook_core::money::Money;
//!
//! let price = Money::from_cents(500);         // $5.00
//! let subtotal = price.multiply_quantity(8);  // $40.00
//! assert_eq!(subtotal.to_decimal_string(), "40.00");
//!
//! let parsed = Money::parse_decimal("2.5").unwrap();
//! assert_eq!(parsed.cents(), 250);
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign};
use ts_rs::TS;

use crate::error::ValidationError;

// =============================================================================
// Money Type
// =============================================================================

/// Represents a monetary value in the smallest currency unit (cents).
///
/// ## Design Decisions
/// - **i64 (signed)**: Subtraction never panics on underflow of an unsigned type
/// - **Single field tuple struct**: Zero-cost abstraction over i64
/// - **Serializes as cents**: The wire carries integers, never floats
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from cents (the smallest currency unit).
    ///
    /// ## Example
    /// ```rust
    /// use stockbook_core::money::Money;
    ///
    /// let price = Money::from_cents(1099); // Represents $10.99
    /// assert_eq!(price.cents(), 1099);
    /// ```
    #[inline]
    pub const fn from_cents(cents: i64) -> Self {
        Money(cents)
    }

    /// Returns the value in cents (smallest currency unit).
    #[inline]
    pub const fn cents(&self) -> i64 {
        self.0
    }

    /// Returns the major unit portion.
    #[inline]
    pub const fn dollars(&self) -> i64 {
        self.0 / 100
    }

    /// Returns the minor unit portion (always 0-99).
    #[inline]
    pub const fn cents_part(&self) -> i64 {
        (self.0 % 100).abs()
    }

    /// Returns zero money value.
    #[inline]
    pub const fn zero() -> Self {
        Money(0)
    }

    /// Multiplies money by a quantity.
    ///
    /// ## User Workflow
    /// ```text
    /// Product: CAM001 $5.00
    /// Quantity sold: 8
    ///      │
    ///      ▼
    /// multiply_quantity(8) ← THIS FUNCTION
    ///      │
    ///      ▼
    /// Line subtotal: $40.00
    /// ```
    ///
    /// Saturates at the `i64` bounds. Use [`Money::checked_multiply_quantity`]
    /// where an overflow has to be reported.
    #[inline]
    pub const fn multiply_quantity(&self, qty: i64) -> Self {
        Money(self.0.saturating_mul(qty))
    }

    /// Multiplies money by a quantity, or `None` on overflow.
    ///
    /// ## Example
    /// ```rust
    /// use stockbook_core::money::Money;
    ///
    /// assert_eq!(Money::from_cents(500).checked_multiply_quantity(8), Some(Money::from_cents(4000)));
    /// assert_eq!(Money::from_cents(i64::MAX).checked_multiply_quantity(2), None);
    /// ```
    #[inline]
    pub const fn checked_multiply_quantity(&self, qty: i64) -> Option<Self> {
        match self.0.checked_mul(qty) {
            Some(cents) => Some(Money(cents)),
            None => None,
        }
    }

    /// Adds two amounts, or `None` on overflow.
    #[inline]
    pub const fn checked_add(&self, other: Money) -> Option<Self> {
        match self.0.checked_add(other.0) {
            Some(cents) => Some(Money(cents)),
            None => None,
        }
    }

    /// Sums amounts, or `None` if any partial sum overflows.
    pub fn checked_sum(amounts: impl IntoIterator<Item = Money>) -> Option<Self> {
        amounts
            .into_iter()
            .try_fold(Money::zero(), |total, amount| total.checked_add(amount))
    }

    /// Parses decimal text as stored in a sheet cell.
    ///
    /// ## Accepted Forms
    /// - `"5"`, `"5.5"`, `"5.50"`, `"-1.25"`, `" 12.00 "`
    /// - At most two fractional digits; anything else is rejected rather
    ///   than silently rounded.
    ///
    /// ## Example
    /// ```rust
    /// use stockbook_core::money::Money;
    ///
    /// assert_eq!(Money::parse_decimal("5.00").unwrap().cents(), 500);
    /// assert_eq!(Money::parse_decimal("0.5").unwrap().cents(), 50);
    /// assert!(Money::parse_decimal("5.001").is_err());
    /// assert!(Money::parse_decimal("abc").is_err());
    /// ```
    pub fn parse_decimal(text: &str) -> Result<Money, ValidationError> {
        let text = text.trim();
        let invalid = |reason: &str| ValidationError::invalid_format("amount", reason);

        let (negative, digits) = match text.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, text),
        };

        let (whole, frac) = digits.split_once('.').unwrap_or((digits, ""));

        if whole.is_empty() && frac.is_empty() {
            return Err(invalid("expected a decimal number"));
        }
        if !whole.chars().all(|c| c.is_ascii_digit()) || !frac.chars().all(|c| c.is_ascii_digit())
        {
            return Err(invalid("expected a decimal number"));
        }
        if frac.len() > 2 {
            return Err(invalid("at most 2 decimal places"));
        }

        let whole_value: i64 = if whole.is_empty() {
            0
        } else {
            whole.parse().map_err(|_| invalid("amount is too large"))?
        };
        let frac_value: i64 = match frac.len() {
            0 => 0,
            1 => frac.parse::<i64>().map_err(|_| invalid("expected a decimal number"))? * 10,
            _ => frac.parse::<i64>().map_err(|_| invalid("expected a decimal number"))?,
        };

        let cents = whole_value
            .checked_mul(100)
            .and_then(|c| c.checked_add(frac_value))
            .ok_or_else(|| invalid("amount is too large"))?;

        Ok(Money(if negative { -cents } else { cents }))
    }

    /// Formats as plain two-decimal text for a sheet cell (`"40.00"`).
    pub fn to_decimal_string(&self) -> String {
        let sign = if self.0 < 0 { "-" } else { "" };
        format!("{}{}.{:02}", sign, self.dollars().abs(), self.cents_part())
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// Display shows money with a currency sign (`$40.00`), for logs and messages.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        write!(
            f,
            "{}${}.{:02}",
            sign,
            self.dollars().abs(),
            self.cents_part()
        )
    }
}

impl Default for Money {
    fn default() -> Self {
        Money::zero()
    }
}

/// Saturating; see [`Money::checked_add`].
impl Add for Money {
    type Output = Self;

    #[inline]
    fn add(self, other: Self) -> Self {
        Money(self.0.saturating_add(other.0))
    }
}

impl AddAssign for Money {
    #[inline]
    fn add_assign(&mut self, other: Self) {
        self.0 = self.0.saturating_add(other.0);
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Self {
        iter.fold(Money::zero(), Add::add)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_cents() {
        let money = Money::from_cents(1099);
        assert_eq!(money.cents(), 1099);
        assert_eq!(money.dollars(), 10);
        assert_eq!(money.cents_part(), 99);
    }

    #[test]
    fn test_display() {
        assert_eq!(format!("{}", Money::from_cents(1099)), "$10.99");
        assert_eq!(format!("{}", Money::from_cents(500)), "$5.00");
        assert_eq!(format!("{}", Money::from_cents(-550)), "-$5.50");
        assert_eq!(format!("{}", Money::from_cents(0)), "$0.00");
    }

    #[test]
    fn test_decimal_string() {
        assert_eq!(Money::from_cents(4000).to_decimal_string(), "40.00");
        assert_eq!(Money::from_cents(5).to_decimal_string(), "0.05");
        assert_eq!(Money::from_cents(-125).to_decimal_string(), "-1.25");
    }

    #[test]
    fn test_parse_decimal_forms() {
        assert_eq!(Money::parse_decimal("5").unwrap().cents(), 500);
        assert_eq!(Money::parse_decimal("5.").unwrap().cents(), 500);
        assert_eq!(Money::parse_decimal("5.5").unwrap().cents(), 550);
        assert_eq!(Money::parse_decimal("5.05").unwrap().cents(), 505);
        assert_eq!(Money::parse_decimal(".75").unwrap().cents(), 75);
        assert_eq!(Money::parse_decimal(" 12.00 ").unwrap().cents(), 1200);
        assert_eq!(Money::parse_decimal("-1.25").unwrap().cents(), -125);
    }

    #[test]
    fn test_parse_decimal_rejects_garbage() {
        assert!(Money::parse_decimal("").is_err());
        assert!(Money::parse_decimal(".").is_err());
        assert!(Money::parse_decimal("abc").is_err());
        assert!(Money::parse_decimal("1,50").is_err());
        assert!(Money::parse_decimal("1.234").is_err());
        assert!(Money::parse_decimal("99999999999999999999").is_err());
    }

    #[test]
    fn test_arithmetic() {
        let a = Money::from_cents(1000);
        let b = Money::from_cents(500);

        assert_eq!((a + b).cents(), 1500);
        assert_eq!(a.multiply_quantity(3).cents(), 3000);

        let mut total = Money::zero();
        total += b;
        assert_eq!(total, b);
    }

    #[test]
    fn test_sum_avoids_float_drift() {
        let total: Money = ["1.10", "2.20"]
            .iter()
            .map(|s| Money::parse_decimal(s).unwrap())
            .sum();
        assert_eq!(total.to_decimal_string(), "3.30");
    }

    #[test]
    fn test_multiply_quantity() {
        let unit_price = Money::from_cents(500);
        assert_eq!(unit_price.multiply_quantity(8).cents(), 4000);
    }

    #[test]
    fn test_overflow_is_checked_or_saturated() {
        let huge = Money::from_cents(i64::MAX);

        assert_eq!(huge.checked_multiply_quantity(2), None);
        assert_eq!(huge.checked_add(Money::from_cents(1)), None);
        assert_eq!(Money::checked_sum([huge, Money::from_cents(1)]), None);
        assert_eq!(
            Money::checked_sum([Money::from_cents(110), Money::from_cents(220)]),
            Some(Money::from_cents(330))
        );

        assert_eq!(huge.multiply_quantity(2), huge);
        assert_eq!(huge + Money::from_cents(1), huge);
        let mut total = huge;
        total += huge;
        assert_eq!(total, huge);
        assert_eq!([huge, huge].into_iter().sum::<Money>(), huge);
    }
}
