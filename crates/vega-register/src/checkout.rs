//! # Checkout Pipeline State
//!
//! Bookkeeping that makes checkout idempotent and reconciliation
//! explicit.
//!
//! ## Submission Id Lifetime
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │             One submission id per LOGICAL checkout action               │
//! │                                                                         │
//! │  checkout pressed ──► snapshot cart, id = uuid-A                        │
//! │        │                                                                │
//! │        ├── submit fails/times out ──► pending kept                      │
//! │        │        │                                                       │
//! │        │        ├── user retries ─────────► SAME snapshot, id uuid-A    │
//! │        │        │                                                       │
//! │        │        └── user edits cart ──────► pending invalidated;        │
//! │        │                                    next checkout = uuid-B      │
//! │        │                                                                │
//! │        └── submit succeeds                                              │
//! │                 ├── totals match ─────────► cart cleared, done          │
//! │                 └── totals differ ────────► held for acknowledgment;    │
//! │                                             cart cleared only on ack    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde::{Deserialize, Serialize};
use tracing::debug;

use vega_core::{Cart, CoreResult, Totals, Transaction};

// =============================================================================
// Checkout Outcome
// =============================================================================

/// Result of a successful submit call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", tag = "outcome")]
pub enum CheckoutOutcome {
    /// Server confirmed the locally computed totals; the cart has been
    /// cleared.
    Confirmed {
        /// The confirmed totals for the receipt.
        totals: Totals,
    },

    /// Server-confirmed totals differ from the local computation.
    ///
    /// The sale IS committed server-side (the server totals are
    /// authoritative for the receipt), but the cart is held until the
    /// operator acknowledges the discrepancy - it must be surfaced,
    /// never silently overwritten.
    TotalsMismatch {
        /// What this register computed.
        local: Totals,
        /// What the server confirmed.
        server: Totals,
    },
}

// =============================================================================
// Checkout State
// =============================================================================

/// Pending-submission and pending-acknowledgment bookkeeping.
///
/// Pure state transitions - all I/O lives in the register.
#[derive(Debug, Default)]
pub struct CheckoutState {
    /// Snapshot awaiting (re)submission. Survives failures so retries
    /// reuse the same submission id.
    pending: Option<Transaction>,

    /// Server totals awaiting operator acknowledgment.
    awaiting_ack: Option<Totals>,
}

impl CheckoutState {
    /// Creates an empty checkout state.
    pub fn new() -> Self {
        Self::default()
    }

    /// True while a totals mismatch awaits acknowledgment.
    ///
    /// New checkouts are refused in this window.
    pub fn needs_acknowledgment(&self) -> bool {
        self.awaiting_ack.is_some()
    }

    /// Returns the transaction to submit for the current checkout
    /// action.
    ///
    /// Reuses the pending snapshot if one exists (a retry of the same
    /// logical action keeps its submission id); otherwise snapshots the
    /// cart under a fresh id from `new_id`.
    pub fn begin<F>(&mut self, cart: &Cart, new_id: F) -> CoreResult<Transaction>
    where
        F: FnOnce() -> String,
    {
        if let Some(txn) = &self.pending {
            debug!(submission_id = %txn.submission_id, "Reusing pending transaction for retry");
            return Ok(txn.clone());
        }

        let txn = Transaction::snapshot(cart, new_id())?;
        self.pending = Some(txn.clone());
        Ok(txn)
    }

    /// Records a successful submit and classifies the outcome.
    ///
    /// The pending snapshot is done either way - the server committed.
    /// A mismatch parks the server totals for acknowledgment.
    pub fn on_success(&mut self, local: Totals, server: Totals) -> CheckoutOutcome {
        self.pending = None;

        if server == local {
            CheckoutOutcome::Confirmed { totals: server }
        } else {
            self.awaiting_ack = Some(server);
            CheckoutOutcome::TotalsMismatch { local, server }
        }
    }

    /// Consumes the parked server totals on operator acknowledgment.
    pub fn acknowledge(&mut self) -> Option<Totals> {
        self.awaiting_ack.take()
    }

    /// Invalidates the pending snapshot after a cart mutation.
    ///
    /// An edited cart means the next checkout is a NEW logical action:
    /// it gets a fresh snapshot and a fresh submission id.
    pub fn invalidate_pending(&mut self) {
        if let Some(txn) = self.pending.take() {
            debug!(submission_id = %txn.submission_id, "Cart changed, pending transaction discarded");
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
