//! # Money Module
//!
//! Provides the `Money` type used for every price, contribution and total.
//!
//! ## Why Integer Money?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  THE FLOATING POINT PROBLEM                                             │
//! │                                                                         │
//! │  With floats, a 10% discount on 24.90 + 9.90:                           │
//! │    34.8 * 0.9 = 31.319999999999997  ❌ needs rounding everywhere         │
//! │                                                                         │
//! │  OUR SOLUTION: Integer Cents                                            │
//! │    3480 cents - round_half_up(3480 * 1000 / 10000) = 3132 cents         │
//! │    Every contribution is already rounded to 2 decimals                  │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use tally_core::money::Money;
//!
//! let price: Money = "24.90".parse().unwrap();
//! assert_eq!(price.cents(), 2490);
//!
//! let three = price * 3;
//! assert_eq!(three.to_string(), "$74.70");
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Mul, Neg, Sub, SubAssign};
use std::str::FromStr;
use ts_rs::TS;

use crate::error::ValidationError;
use crate::types::DiscountRate;

// =============================================================================
// Money Type
// =============================================================================

/// A monetary value in the smallest currency unit (cents).
///
/// ## Design Decisions
/// - **i64 (signed)**: discount contributions are negative
/// - **Single field tuple struct**: serializes as a bare integer of cents
/// - **No float constructor**: amounts come from cents or decimal strings
///
/// ## Where Money Flows
/// ```text
/// Product.price ──► rule contribution ──► PricingResult.subtotal
///                                              │
///                                              ▼
///                                   ShoppingCart::total_price()
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from cents.
    ///
    /// ```rust
    /// use tally_core::money::Money;
    ///
    /// let price = Money::from_cents(2490);
    /// assert_eq!(price.to_string(), "$24.90");
    /// ```
    #[inline]
    pub const fn from_cents(cents: i64) -> Self {
        Money(cents)
    }

    /// Returns the value in cents.
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

    #[inline]
    pub const fn zero() -> Self {
        Money(0)
    }

    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    #[inline]
    pub const fn is_positive(&self) -> bool {
        self.0 > 0
    }

    #[inline]
    pub const fn is_negative(&self) -> bool {
        self.0 < 0
    }

    #[inline]
    pub const fn abs(&self) -> Self {
        Money(self.0.abs())
    }

    /// Applies a percentage discount and returns the discounted amount.
    ///
    /// The amount kept, `self * (1 - rate)`, is rounded half away from zero
    /// to the nearest cent, so 1.05 at 10% off is 0.95.
    ///
    /// ```rust
    /// use tally_core::money::Money;
    /// use tally_core::types::DiscountRate;
    ///
    /// let subtotal = Money::from_cents(3480);
    /// let discounted = subtotal.apply_percentage_discount(DiscountRate::from_bps(1000));
    /// assert_eq!(discounted.cents(), 3132);
    /// ```
    pub fn apply_percentage_discount(&self, rate: DiscountRate) -> Money {
        let kept_bps = DiscountRate::FULL.bps().saturating_sub(rate.bps()) as i128;
        let magnitude = (self.0.unsigned_abs() as i128 * kept_bps + 5000) / 10000;
        let kept = if self.0 < 0 { -magnitude } else { magnitude };
        Money(kept as i64)
    }

    // -------------------------------------------------------------------------
    // Checked arithmetic (used by the rule pipeline)
    // -------------------------------------------------------------------------

    #[inline]
    pub fn checked_add(self, other: Money) -> Option<Money> {
        self.0.checked_add(other.0).map(Money)
    }

    #[inline]
    pub fn checked_sub(self, other: Money) -> Option<Money> {
        self.0.checked_sub(other.0).map(Money)
    }

    #[inline]
    pub fn checked_mul(self, qty: i64) -> Option<Money> {
        self.0.checked_mul(qty).map(Money)
    }

    /// Sums an iterator of amounts, returning `None` on overflow.
    pub fn checked_sum<I>(amounts: I) -> Option<Money>
    where
        I: IntoIterator<Item = Money>,
    {
        amounts
            .into_iter()
            .try_fold(Money::zero(), |acc, amount| acc.checked_add(amount))
    }
}

// =============================================================================
// Parsing
// =============================================================================

/// Parses a decimal amount such as `"24.90"`, `"24.9"`, `"3"`, `"-5.50"` or
/// `"$24.90"`.
///
/// More than two fractional digits is rejected rather than rounded, so a
/// catalog can never carry sub-cent prices.
impl FromStr for Money {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = |reason: &str| ValidationError::InvalidAmount {
            input: s.to_string(),
            reason: reason.to_string(),
        };

        let trimmed = s.trim();
        let (negative, rest) = match trimmed.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, trimmed),
        };
        let digits = rest.strip_prefix('$').unwrap_or(rest);

        let (major, minor) = digits.split_once('.').unwrap_or((digits, ""));

        if major.is_empty() || !major.bytes().all(|b| b.is_ascii_digit()) {
            return Err(invalid("expected digits before the decimal point"));
        }
        if (digits.contains('.') && minor.is_empty()) || !minor.bytes().all(|b| b.is_ascii_digit()) {
            return Err(invalid("expected digits after the decimal point"));
        }
        if minor.len() > 2 {
            return Err(invalid("at most two decimal places are allowed"));
        }

        let major: i64 = major
            .parse()
            .map_err(|_| invalid("amount is too large"))?;
        let minor: i64 = match minor.len() {
            0 => 0,
            1 => minor.parse::<i64>().map_err(|_| invalid("bad fraction"))? * 10,
            _ => minor.parse().map_err(|_| invalid("bad fraction"))?,
        };

        let cents = major
            .checked_mul(100)
            .and_then(|c| c.checked_add(minor))
            .ok_or_else(|| invalid("amount is too large"))?;

        Ok(Money(if negative { -cents } else { cents }))
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// Shows money as `$24.90` / `-$2.49`. Presentation layers that need
/// localization should format from [`Money::cents`] instead.
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

impl Add for Money {
    type Output = Self;

    #[inline]
    fn add(self, other: Self) -> Self {
        Money(self.0 + other.0)
    }
}

impl AddAssign for Money {
    #[inline]
    fn add_assign(&mut self, other: Self) {
        self.0 += other.0;
    }
}

impl Sub for Money {
    type Output = Self;

    #[inline]
    fn sub(self, other: Self) -> Self {
        Money(self.0 - other.0)
    }
}

impl SubAssign for Money {
    #[inline]
    fn sub_assign(&mut self, other: Self) {
        self.0 -= other.0;
    }
}

impl Neg for Money {
    type Output = Self;

    #[inline]
    fn neg(self) -> Self {
        Money(-self.0)
    }
}

impl Mul<i64> for Money {
    type Output = Self;

    #[inline]
    fn mul(self, qty: i64) -> Self {
        Money(self.0 * qty)
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Self {
        iter.fold(Money::zero(), Add::add)
    }
}

impl<'a> Sum<&'a Money> for Money {
    fn sum<I: Iterator<Item = &'a Money>>(iter: I) -> Self {
        iter.copied().sum()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn money(s: &str) -> Money {
        s.parse().unwrap()
    }

    #[test]
    fn test_from_cents() {
        let money = Money::from_cents(2490);
        assert_eq!(money.cents(), 2490);
        assert_eq!(money.dollars(), 24);
        assert_eq!(money.cents_part(), 90);
    }

    #[test]
    fn test_display() {
        assert_eq!(Money::from_cents(2490).to_string(), "$24.90");
        assert_eq!(Money::from_cents(500).to_string(), "$5.00");
        assert_eq!(Money::from_cents(-249).to_string(), "-$2.49");
        assert_eq!(Money::zero().to_string(), "$0.00");
    }

    #[test]
    fn test_parse_decimal_strings() {
        assert_eq!(money("24.90").cents(), 2490);
        assert_eq!(money("24.9").cents(), 2490);
        assert_eq!(money("3").cents(), 300);
        assert_eq!(money("0.05").cents(), 5);
        assert_eq!(money("-5.50").cents(), -550);
        assert_eq!(money(" $9.90 ").cents(), 990);
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!("".parse::<Money>().is_err());
        assert!("abc".parse::<Money>().is_err());
        assert!("24.".parse::<Money>().is_err());
        assert!(".90".parse::<Money>().is_err());
        assert!("24.905".parse::<Money>().is_err());
        assert!("1e3".parse::<Money>().is_err());
        assert!("99999999999999999999".parse::<Money>().is_err());
    }

    #[test]
    fn test_display_parses_back() {
        for cents in [0, 5, 990, 2490, 123_456, -249] {
            let m = Money::from_cents(cents);
            assert_eq!(money(&m.to_string()), m);
        }
    }

    #[test]
    fn test_arithmetic() {
        let a = Money::from_cents(1000);
        let b = Money::from_cents(500);

        assert_eq!((a + b).cents(), 1500);
        assert_eq!((a - b).cents(), 500);
        assert_eq!((a * 3).cents(), 3000);
        assert_eq!((-a).cents(), -1000);
        assert_eq!([a, b, b].iter().sum::<Money>().cents(), 2000);
    }

    #[test]
    fn test_percentage_discount_rounds_kept_amount_half_up() {
        // 34.80 at 10% off = 31.32
        let discounted = Money::from_cents(3480).apply_percentage_discount(DiscountRate::from_bps(1000));
        assert_eq!(discounted.cents(), 3132);

        // 1.05 at 10% off = 0.945, rounds to 0.95
        let discounted = Money::from_cents(105).apply_percentage_discount(DiscountRate::from_bps(1000));
        assert_eq!(discounted.cents(), 95);

        // 0.05 at 10% off = 0.045, rounds to 0.05
        let discounted = Money::from_cents(5).apply_percentage_discount(DiscountRate::from_bps(1000));
        assert_eq!(discounted.cents(), 5);

        let none = Money::from_cents(2490).apply_percentage_discount(DiscountRate::zero());
        assert_eq!(none.cents(), 2490);

        let all = Money::from_cents(2490).apply_percentage_discount(DiscountRate::from_bps(10_000));
        assert!(all.is_zero());
    }

    #[test]
    fn test_discount_on_negative_amount_is_symmetric() {
        let rate = DiscountRate::from_bps(1000);
        let pos = Money::from_cents(5).apply_percentage_discount(rate);
        let neg = Money::from_cents(-5).apply_percentage_discount(rate);
        assert_eq!(pos.cents(), -neg.cents());

        let min = Money::from_cents(i64::MIN).apply_percentage_discount(DiscountRate::zero());
        assert_eq!(min.cents(), i64::MIN);
    }

    #[test]
    fn test_checked_arithmetic() {
        let max = Money::from_cents(i64::MAX);
        assert!(max.checked_add(Money::from_cents(1)).is_none());
        assert!(max.checked_mul(2).is_none());
        assert!(Money::from_cents(i64::MIN).checked_sub(Money::from_cents(1)).is_none());
        assert_eq!(
            Money::checked_sum([Money::from_cents(1), Money::from_cents(2)]),
            Some(Money::from_cents(3))
        );
        assert_eq!(Money::checked_sum([max, Money::from_cents(1)]), None);
    }

    #[test]
    fn test_zero_and_checks() {
        let zero = Money::zero();
        assert!(zero.is_zero());
        assert!(!zero.is_positive());
        assert!(!zero.is_negative());
        assert!(Money::from_cents(-100).is_negative());
        assert_eq!(Money::from_cents(-100).abs().cents(), 100);
        assert_eq!(Money::default(), zero);
    }

    #[test]
    fn test_serializes_as_bare_cents() {
        let json = serde_json::to_string(&Money::from_cents(2490)).unwrap();
        assert_eq!(json, "2490");
        let back: Money = serde_json::from_str("990").unwrap();
        assert_eq!(back.cents(), 990);
    }
}
