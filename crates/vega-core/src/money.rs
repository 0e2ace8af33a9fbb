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
//! │  OUR SOLUTION: Integer Minor Units                                      │
//! │    Every amount is an i64 count of the smallest currency unit.          │
//! │    The tax derivation is exact integer division with explicit           │
//! │    rounding - reproducible on every machine, every time.                │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Tax Derivation Contract
//!
//! Shelf prices are **tax-inclusive**. The tax-exclusive unit price is
//! derived as `round_half_up(P / (1 + r))` at the UNIT level; a line's
//! exclusive subtotal is the rounded unit price multiplied by quantity.
//! Rounding the unit before multiplying is a fixed contract of this
//! engine:
//!
//! ```text
//!   line_excl = round(unit_incl / (1+r)) * qty      ← what we do
//!   line_excl = round(unit_incl * qty / (1+r))      ← what we must NOT do
//!
//!   unit 105, rate 10%, qty 3:
//!     per-unit:   round(105/1.1) = 95,  95 * 3 = 285
//!     per-line:   round(315/1.1) = 286            (different!)
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, AddAssign, Mul, Sub, SubAssign};

use crate::types::TaxRate;

// =============================================================================
// Money Type
// =============================================================================

/// A monetary value in the smallest currency unit.
///
/// ## Design Decisions
/// - **i64 (signed)**: Allows negative values for refunds, corrections
/// - **Single field tuple struct**: Zero-cost abstraction over i64
/// - **Derives**: Full serde support for wire serialization
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from minor currency units.
    ///
    /// ## Example
    /// ```rust
    /// use vega_core::money::Money;
    ///
    /// let price = Money::from_minor(105);
    /// assert_eq!(price.minor(), 105);
    /// ```
    #[inline]
    pub const fn from_minor(minor: i64) -> Self {
        Money(minor)
    }

    /// Returns the value in minor currency units.
    #[inline]
    pub const fn minor(&self) -> i64 {
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

    /// Checks if the value is negative (less than zero).
    #[inline]
    pub const fn is_negative(&self) -> bool {
        self.0 < 0
    }

    /// Derives the tax-exclusive amount from this tax-inclusive amount.
    ///
    /// `round_half_up(P / (1 + r))`, computed in integer arithmetic:
    /// with the rate in basis points the divisor is `10000 + bps`, so
    /// `P * 10000 / (10000 + bps)` rounded half-up. i128 intermediates
    /// keep large amounts from overflowing.
    ///
    /// Negative amounts round half-away-from-zero, the mirror image of
    /// half-up for the refund case.
    ///
    /// ## Example
    /// ```rust
    /// use vega_core::money::Money;
    /// use vega_core::types::TaxRate;
    ///
    /// let rate = TaxRate::from_bps(1000); // 10%
    /// assert_eq!(Money::from_minor(100).excl_tax(rate).minor(), 91);
    /// assert_eq!(Money::from_minor(105).excl_tax(rate).minor(), 95);
    /// ```
    pub fn excl_tax(&self, rate: TaxRate) -> Money {
        let numer = self.0 as i128 * 10_000;
        let denom = 10_000 + rate.bps() as i128;
        let rounded = if numer >= 0 {
            (numer + denom / 2) / denom
        } else {
            -((-numer + denom / 2) / denom)
        };
        Money(rounded as i64)
    }

    /// Returns the tax portion of this tax-inclusive amount.
    ///
    /// Defined as `self - self.excl_tax(rate)` so that the exclusive
    /// amount and the tax always recombine to the shelf price exactly.
    pub fn tax_portion(&self, rate: TaxRate) -> Money {
        *self - self.excl_tax(rate)
    }

    /// Multiplies money by a quantity.
    ///
    /// ## Example
    /// ```rust
    /// use vega_core::money::Money;
    ///
    /// let unit_price = Money::from_minor(105);
    /// assert_eq!(unit_price.multiply_quantity(3).minor(), 315);
    /// ```
    #[inline]
    pub const fn multiply_quantity(&self, qty: i64) -> Self {
        Money(self.0 * qty)
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// Display implementation shows the raw minor-unit amount.
///
/// Currency symbols and localization belong to the embedding layer.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Default money is zero.
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

/// Multiplication by quantity.
impl Mul<i64> for Money {
    type Output = Self;

    #[inline]
    fn mul(self, qty: i64) -> Self {
        Money(self.0 * qty)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
