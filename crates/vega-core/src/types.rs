//! # Domain Types
//!
//! Core domain types used throughout Vega POS.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐                             │
//! │  │    Product      │   │    TaxRate      │                             │
//! │  │  ─────────────  │   │  ─────────────  │                             │
//! │  │  barcode        │   │  bps (u32)      │                             │
//! │  │  name           │   │  1000 = 10.00%  │                             │
//! │  │  unit_price     │   └─────────────────┘                             │
//! │  │  (incl. tax)    │                                                   │
//! │  └─────────────────┘   Cart types live in [`crate::cart`].             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The barcode is the business identity of a product: the catalog keys
//! on it, cart lines reference it, and the purchase wire format carries
//! it back to the server.

use serde::{Deserialize, Serialize};

use crate::money::Money;

// =============================================================================
// Tax Rate
// =============================================================================

/// Tax rate represented in basis points (bps).
///
/// ## Why Basis Points?
/// 1 basis point = 0.01% = 1/10000
/// 1000 bps = 10.00% (e.g., Japanese consumption tax)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxRate(u32);

impl TaxRate {
    /// Creates a tax rate from basis points.
    #[inline]
    pub const fn from_bps(bps: u32) -> Self {
        TaxRate(bps)
    }

    /// Returns the rate in basis points.
    #[inline]
    pub const fn bps(&self) -> u32 {
        self.0
    }

    /// Returns the rate as a percentage (for display only).
    #[inline]
    pub fn percentage(&self) -> f64 {
        self.0 as f64 / 100.0
    }

    /// Zero tax rate.
    #[inline]
    pub const fn zero() -> Self {
        TaxRate(0)
    }

    /// Checks if tax rate is zero.
    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }
}

impl Default for TaxRate {
    fn default() -> Self {
        TaxRate::zero()
    }
}

// =============================================================================
// Product
// =============================================================================

/// A product resolved from the catalog.
///
/// Immutable once fetched: the catalog response is copied into cart
/// lines, and later catalog changes never reach a line already in the
/// cart (no mid-transaction price drift).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    /// Barcode (EAN-13, UPC-A, etc.) - business identifier.
    pub barcode: String,

    /// Display name shown to cashier and on receipt.
    pub name: String,

    /// Tax-inclusive shelf price in minor currency units.
    pub unit_price: Money,
}

impl Product {
    /// Creates a product record.
    pub fn new(barcode: impl Into<String>, name: impl Into<String>, unit_price: Money) -> Self {
        Product {
            barcode: barcode.into(),
            name: name.into(),
            unit_price,
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
