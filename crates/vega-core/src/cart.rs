//! # Cart Engine
//!
//! The in-progress purchase list and its derived totals.
//!
//! ## Cart Operations Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Cart Engine Operations                             │
//! │                                                                         │
//! │  Register Action            Cart Operation         State Change         │
//! │  ───────────────            ──────────────         ────────────         │
//! │                                                                         │
//! │  Scan/enter product ───────► add_line() ──────────► lines.push(line)   │
//! │                                                                         │
//! │  Remove list entry ────────► remove_line(i) ──────► lines.remove(i)    │
//! │                                                                         │
//! │  Committed purchase ───────► clear() ─────────────► lines.clear()      │
//! │                                                                         │
//! │  Display totals ───────────► totals() ────────────► (read only)        │
//! │                                                                         │
//! │  Checkout ─────────────────► Transaction::snapshot (read only)         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Invariants
//! - Every line has quantity in `1..=MAX_LINE_QUANTITY`
//! - Line prices are frozen at add time (no mid-transaction price drift)
//! - `totals()` is recomputed from the lines on every call, so the
//!   displayed total can never drift from the line contents
//! - Duplicate barcodes stay separate lines: repeated scans are separate
//!   receipt entries, in scan order
//! - Mutating operations validate first, mutate second - an error leaves
//!   the cart untouched

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult};
use crate::money::Money;
use crate::types::{Product, TaxRate};
use crate::{MAX_CART_LINES, MAX_LINE_QUANTITY};

// =============================================================================
// Cart Line
// =============================================================================

/// A line in the purchase list.
///
/// ## Price Freezing
/// `name` and `unit_price` are copied out of the catalog response at add
/// time. If the catalog changes afterwards, this line keeps showing what
/// the customer was quoted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartLine {
    /// Barcode of the product this line was created from.
    pub barcode: String,

    /// Product name at add time (frozen).
    pub name: String,

    /// Tax-inclusive unit price at add time (frozen).
    pub unit_price: Money,

    /// Quantity, always >= 1.
    pub quantity: i64,
}

impl CartLine {
    /// Creates a cart line from a product and quantity.
    ///
    /// Quantity is validated by [`Cart::add_line`]; constructing a line
    /// directly is crate-internal.
    fn from_product(product: &Product, quantity: i64) -> Self {
        CartLine {
            barcode: product.barcode.clone(),
            name: product.name.clone(),
            unit_price: product.unit_price,
            quantity,
        }
    }

    /// Tax-inclusive line total (unit price × quantity).
    pub fn line_total(&self) -> Money {
        self.unit_price.multiply_quantity(self.quantity)
    }

    /// Tax-exclusive unit price at the given rate.
    ///
    /// Rounded half-up at the unit level; see [`Money::excl_tax`].
    pub fn unit_price_excl_tax(&self, rate: TaxRate) -> Money {
        self.unit_price.excl_tax(rate)
    }

    /// Tax-exclusive line total: the ROUNDED unit price times quantity.
    ///
    /// This is the per-unit rounding contract - the line total is never
    /// derived by dividing the inclusive line total.
    pub fn line_total_excl_tax(&self, rate: TaxRate) -> Money {
        self.unit_price_excl_tax(rate).multiply_quantity(self.quantity)
    }
}

// =============================================================================
// Totals
// =============================================================================

/// Tax-inclusive and tax-exclusive totals, derived from the cart.
///
/// Never mutated independently: every value of this type is the output
/// of a recomputation over cart lines (or the server's confirmation of
/// one).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Totals {
    /// Sum of tax-inclusive line totals.
    pub total_incl_tax: Money,

    /// Sum of tax-exclusive line totals (per-unit rounded).
    pub total_excl_tax: Money,
}

impl Totals {
    /// Zero totals (empty cart).
    pub const fn zero() -> Self {
        Totals {
            total_incl_tax: Money::zero(),
            total_excl_tax: Money::zero(),
        }
    }

    /// Checks whether both totals are zero.
    pub const fn is_zero(&self) -> bool {
        self.total_incl_tax.is_zero() && self.total_excl_tax.is_zero()
    }
}

/// Cart summary for the embedding layer (receipt footer, cart header).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartTotals {
    /// Number of lines in the cart.
    pub line_count: usize,

    /// Total quantity across all lines.
    pub total_quantity: i64,

    /// Derived monetary totals.
    pub totals: Totals,
}

impl From<&Cart> for CartTotals {
    fn from(cart: &Cart) -> Self {
        CartTotals {
            line_count: cart.line_count(),
            total_quantity: cart.total_quantity(),
            totals: cart.totals(),
        }
    }
}

// =============================================================================
// Cart
// =============================================================================

/// The purchase list.
///
/// Lines are kept in insertion order - the cart order IS the receipt
/// order. The tax rate is fixed per cart (per register, from
/// configuration), not per product.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Cart {
    /// Lines in scan order.
    lines: Vec<CartLine>,

    /// Tax rate used to derive exclusive totals.
    tax_rate: TaxRate,
}

impl Cart {
    /// Creates a new empty cart with the given tax rate.
    pub fn new(tax_rate: TaxRate) -> Self {
        Cart {
            lines: Vec::new(),
            tax_rate,
        }
    }

    /// Returns the tax rate this cart prices with.
    pub fn tax_rate(&self) -> TaxRate {
        self.tax_rate
    }

    /// Returns the lines in insertion order.
    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    /// Appends a product to the purchase list.
    ///
    /// ## Behavior
    /// - Quantity must be in `1..=MAX_LINE_QUANTITY`
    /// - A duplicate barcode gets its own line (repeated scans are
    ///   separate receipt entries - this is defined behavior, not a
    ///   missing merge)
    /// - Validation happens before mutation: on error the cart is
    ///   unchanged
    pub fn add_line(&mut self, product: &Product, quantity: i64) -> CoreResult<()> {
        if quantity < 1 || quantity > MAX_LINE_QUANTITY {
            return Err(CoreError::InvalidQuantity {
                requested: quantity,
                max: MAX_LINE_QUANTITY,
            });
        }

        if self.lines.len() >= MAX_CART_LINES {
            return Err(CoreError::CartFull {
                max: MAX_CART_LINES,
            });
        }

        self.lines.push(CartLine::from_product(product, quantity));
        Ok(())
    }

    /// Removes and returns the line at `index`.
    pub fn remove_line(&mut self, index: usize) -> CoreResult<CartLine> {
        if index >= self.lines.len() {
            return Err(CoreError::LineOutOfRange {
                index,
                len: self.lines.len(),
            });
        }

        Ok(self.lines.remove(index))
    }

    /// Clears all lines; used after a committed purchase.
    pub fn clear(&mut self) {
        self.lines.clear();
    }

    /// Returns the number of lines.
    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    /// Returns the total quantity across all lines.
    pub fn total_quantity(&self) -> i64 {
        self.lines.iter().map(|l| l.quantity).sum()
    }

    /// Checks if the cart is empty.
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Recomputes the tax-inclusive/exclusive totals from the lines.
    ///
    /// Standing invariant: `total_incl_tax` equals the exact sum of
    /// `unit_price × quantity` over all lines, `total_excl_tax` the sum
    /// of per-unit-rounded exclusive line totals. Recomputing on every
    /// call (O(n), n <= MAX_CART_LINES) means no mutation path can leave
    /// a stale cached total behind.
    pub fn totals(&self) -> Totals {
        let total_incl_tax = self
            .lines
            .iter()
            .fold(Money::zero(), |acc, l| acc + l.line_total());
        let total_excl_tax = self
            .lines
            .iter()
            .fold(Money::zero(), |acc, l| acc + l.line_total_excl_tax(self.tax_rate));

        Totals {
            total_incl_tax,
            total_excl_tax,
        }
    }
}

// =============================================================================
// Transaction
// =============================================================================

/// An immutable snapshot of the cart at checkout time.
///
/// Created once per user-initiated checkout action. The submission id is
/// the server-side dedup key: automatic retries and user retries of the
/// SAME logical checkout reuse this snapshot unchanged, so the server
/// can commit at most once.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    /// Unique token for at-most-once submission (UUID v4).
    pub submission_id: String,

    /// Cart lines frozen at snapshot time.
    pub lines: Vec<CartLine>,

    /// Locally computed totals at snapshot time.
    pub totals: Totals,
}

impl Transaction {
    /// Snapshots the cart under the given submission id.
    ///
    /// Fails with [`CoreError::EmptyCart`] rather than producing an
    /// empty purchase request.
    pub fn snapshot(cart: &Cart, submission_id: String) -> CoreResult<Self> {
        if cart.is_empty() {
            return Err(CoreError::EmptyCart);
        }

        Ok(Transaction {
            submission_id,
            lines: cart.lines().to_vec(),
            totals: cart.totals(),
        })
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
