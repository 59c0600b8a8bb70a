//! # Money Module
//!
//! Provides the `Money` type for handling monetary values safely.
//!
//! ## Why Integer Money?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  THE FLOATING POINT PROBLEM                                             │
//! │                                                                         │
//! │  In JavaScript/floating point:                                          │
//! │    0.1 + 0.2 = 0.30000000000000004  ❌ WRONG!                           │
//! │                                                                         │
//! │  OUR SOLUTION: Integer Rupiah                                           │
//! │    Rupiah has no circulating minor unit, so one Money unit = Rp 1.     │
//! │    3500 × 9 = 31500, exactly, every time.                              │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use kasir_core::money::Money;
//!
//! let price = Money::from_rupiah(3500);
//! let subtotal = price.multiply_quantity(9);
//! assert_eq!(subtotal.rupiah(), 31500);
//! assert_eq!(subtotal.to_string(), "Rp 31.500");
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Mul, Sub, SubAssign};
use ts_rs::TS;

// =============================================================================
// Money Type
// =============================================================================

/// A monetary value in whole Rupiah.
///
/// ## Design Decisions
/// - **i64 (signed)**: change owed can be negative while payment is short
/// - **Single field tuple struct**: zero-cost abstraction over i64
///
/// ## Where Money is Used
/// ```text
/// ┌─────────────────────────────────────────────────────────────────────────┐
/// │  Product.unit_price ──┬──► CartLine.applied_unit_price ──► line_subtotal│
/// │  Product.wholesale ───┘                                                 │
/// │                                                                         │
/// │  Cart total ──► CheckoutTotals.change ──► InsufficientPayment check    │
/// │                                                                         │
/// │  SoldLineItem.unit_price_at_sale ──► PeriodReport.total_revenue        │
/// │  Product.purchase_price ──────────► PeriodReport.total_cost            │
/// └─────────────────────────────────────────────────────────────────────────┘
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from a whole Rupiah amount.
    ///
    /// ## Example
    /// ```rust
    /// use kasir_core::money::Money;
    ///
    /// let price = Money::from_rupiah(3500);
    /// assert_eq!(price.rupiah(), 3500);
    /// ```
    #[inline]
    pub const fn from_rupiah(amount: i64) -> Self {
        Money(amount)
    }

    /// Returns the value in whole Rupiah.
    #[inline]
    pub const fn rupiah(&self) -> i64 {
        self.0
    }

    /// Returns zero money value.
    #[inline]
    pub const fn zero() -> Self {
        Money(0)
    }

    /// Checks if the value is zero.
    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Checks if the value is positive (greater than zero).
    #[inline]
    pub const fn is_positive(&self) -> bool {
        self.0 > 0
    }

    /// Checks if the value is negative (less than zero).
    #[inline]
    pub const fn is_negative(&self) -> bool {
        self.0 < 0
    }

    /// Returns the absolute value.
    #[inline]
    pub const fn abs(&self) -> Self {
        Money(self.0.abs())
    }

    /// Clamps negative values to zero.
    ///
    /// Presentation only: the checkout validation works on the signed value.
    ///
    /// ```rust
    /// use kasir_core::money::Money;
    ///
    /// assert_eq!(Money::from_rupiah(-10000).clamp_non_negative(), Money::zero());
    /// assert_eq!(Money::from_rupiah(2000).clamp_non_negative().rupiah(), 2000);
    /// ```
    #[inline]
    pub const fn clamp_non_negative(&self) -> Self {
        if self.0 < 0 {
            Money(0)
        } else {
            Money(self.0)
        }
    }

    /// Multiplies money by a quantity.
    ///
    /// ## Example
    /// ```rust
    /// use kasir_core::money::Money;
    ///
    /// let unit_price = Money::from_rupiah(3000);
    /// assert_eq!(unit_price.multiply_quantity(10).rupiah(), 30000);
    /// ```
    #[inline]
    pub const fn multiply_quantity(&self, qty: i64) -> Self {
        Money(self.0 * qty)
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// Shows money the way an Indonesian receipt does: `Rp 31.500`.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let digits = self.0.unsigned_abs().to_string();
        let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
        for (i, ch) in digits.chars().enumerate() {
            if i > 0 && (digits.len() - i) % 3 == 0 {
                grouped.push('.');
            }
            grouped.push(ch);
        }
        let sign = if self.0 < 0 { "-" } else { "" };
        write!(f, "{}Rp {}", sign, grouped)
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

/// Multiplication by i64 (for quantity calculations).
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

    #[test]
    fn test_from_rupiah() {
        let money = Money::from_rupiah(3500);
        assert_eq!(money.rupiah(), 3500);
    }

    #[test]
    fn test_display() {
        assert_eq!(format!("{}", Money::from_rupiah(31500)), "Rp 31.500");
        assert_eq!(format!("{}", Money::from_rupiah(500)), "Rp 500");
        assert_eq!(format!("{}", Money::from_rupiah(45200000)), "Rp 45.200.000");
        assert_eq!(format!("{}", Money::from_rupiah(-10000)), "-Rp 10.000");
        assert_eq!(format!("{}", Money::from_rupiah(0)), "Rp 0");
    }

    #[test]
    fn test_arithmetic() {
        let a = Money::from_rupiah(1000);
        let b = Money::from_rupiah(500);

        assert_eq!((a + b).rupiah(), 1500);
        assert_eq!((a - b).rupiah(), 500);
        assert_eq!((b - a).rupiah(), -500);
        assert_eq!((a * 3).rupiah(), 3000);
    }

    #[test]
    fn test_sum() {
        let amounts = [Money::from_rupiah(31500), Money::from_rupiah(4000)];
        let total: Money = amounts.iter().sum();
        assert_eq!(total.rupiah(), 35500);

        let empty: Vec<Money> = Vec::new();
        assert_eq!(empty.into_iter().sum::<Money>(), Money::zero());
    }

    #[test]
    fn test_zero_and_checks() {
        let zero = Money::zero();
        assert!(zero.is_zero());
        assert!(!zero.is_positive());
        assert!(!zero.is_negative());

        let negative = Money::from_rupiah(-100);
        assert!(negative.is_negative());
        assert_eq!(negative.abs().rupiah(), 100);
        assert_eq!(negative.clamp_non_negative(), Money::zero());
    }

    #[test]
    fn test_serializes_as_plain_number() {
        let json = serde_json::to_string(&Money::from_rupiah(3500)).unwrap();
        assert_eq!(json, "3500");
    }
}
