//! # Register Orchestration
//!
//! The register wires the scan session, the catalog, the cart, and the
//! purchase submitter into one pipeline.
//!
//! ## Pipeline
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Scan → Sale Pipeline                                 │
//! │                                                                         │
//! │  start_scan ──► capture active                                         │
//! │       │                                                                 │
//! │  scan_detected(code) ──► session validates & stops capture             │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  catalog.lookup(code) ──── NotFound? ──► error, cart untouched         │
//! │       │                                                                 │
//! │       ▼ (stale ticket? discard)                                        │
//! │  staged product ──► add_staged(qty) ──► cart line, totals              │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  checkout() ──► snapshot + submission id ──► submit (idempotent)       │
//! │       │                                                                 │
//! │       ├── Confirmed ──────► cart cleared                               │
//! │       ├── TotalsMismatch ─► cart held until acknowledgment             │
//! │       └── failure ────────► cart + pending snapshot preserved          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Within one scan→detect→lookup→add sequence the steps are strictly
//! ordered: nothing reaches the cart before the lookup resolves, and a
//! lookup tied to a stopped session is discarded. Locks are scoped
//! tightly and never held across an await.

use std::sync::{Arc, Mutex};
use tracing::{debug, info, warn};
use uuid::Uuid;

use vega_api::{CatalogLookup, SubmitPurchase};
use vega_core::{CartTotals, Product, TaxRate, Totals};

use crate::checkout::{CheckoutOutcome, CheckoutState};
use crate::error::RegisterError;
use crate::session::{CaptureBackend, ScanSession, SessionState};
use crate::state::CartState;

/// The register: one scanning surface, one cart, one checkout pipeline.
pub struct Register<C, S> {
    catalog: C,
    submitter: S,
    cart: CartState,
    session: Mutex<ScanSession>,
    checkout: Mutex<CheckoutState>,
    staged: Mutex<Option<Product>>,
}

impl<C, S> Register<C, S>
where
    C: CatalogLookup,
    S: SubmitPurchase,
{
    /// Creates a register over the given capabilities.
    pub fn new(
        catalog: C,
        submitter: S,
        tax_rate: TaxRate,
        capture: Arc<dyn CaptureBackend>,
    ) -> Self {
        Register {
            catalog,
            submitter,
            cart: CartState::new(tax_rate),
            session: Mutex::new(ScanSession::new(capture)),
            checkout: Mutex::new(CheckoutState::new()),
            staged: Mutex::new(None),
        }
    }

    // =========================================================================
    // Scanning
    // =========================================================================

    /// Starts a scan session. No-op if one is already active.
    pub fn start_scan(&self) -> Result<(), RegisterError> {
        debug!("start_scan");
        self.session
            .lock()
            .expect("Session mutex poisoned")
            .start()?;
        Ok(())
    }

    /// Stops the scan session and cancels any in-flight lookup.
    pub fn stop_scan(&self) {
        debug!("stop_scan");
        self.session.lock().expect("Session mutex poisoned").stop();
    }

    /// Returns the scan session state.
    pub fn session_state(&self) -> SessionState {
        self.session.lock().expect("Session mutex poisoned").state()
    }

    /// Feeds a decoded symbol event from the capture backend.
    ///
    /// Resolves the code against the catalog and stages the product for
    /// [`Self::add_staged`]. Returns `Ok(None)` when the event was
    /// discarded: session not active (duplicate/late callback), or the
    /// session was stopped while the lookup was in flight.
    pub async fn scan_detected(&self, code: &str) -> Result<Option<Product>, RegisterError> {
        let detection = self
            .session
            .lock()
            .expect("Session mutex poisoned")
            .on_detected(code);

        let Some(detection) = detection else {
            return Ok(None);
        };

        // Lookup suspends; the session lock is NOT held here.
        let product = self.catalog.lookup(&detection.code).await?;

        let still_current = self
            .session
            .lock()
            .expect("Session mutex poisoned")
            .is_current(detection.ticket);
        if !still_current {
            debug!(barcode = %detection.code, "Discarding stale lookup result");
            return Ok(None);
        }

        self.stage(product.clone());
        Ok(Some(product))
    }

    /// Manual barcode entry: same lookup, no scan session involved.
    pub async fn enter_code(&self, barcode: &str) -> Result<Product, RegisterError> {
        debug!(barcode = %barcode, "enter_code");
        let product = self.catalog.lookup(barcode).await?;
        self.stage(product.clone());
        Ok(product)
    }

    /// Returns the product staged by the last lookup, if any.
    pub fn staged_product(&self) -> Option<Product> {
        self.staged.lock().expect("Staged mutex poisoned").clone()
    }

    fn stage(&self, product: Product) {
        info!(barcode = %product.barcode, name = %product.name, "Product staged");
        *self.staged.lock().expect("Staged mutex poisoned") = Some(product);
    }

    // =========================================================================
    // Cart
    // =========================================================================

    /// Moves the staged product into the cart with the given quantity.
    ///
    /// On an invalid quantity the product STAYS staged so the operator
    /// can correct the quantity and retry.
    pub fn add_staged(&self, quantity: i64) -> Result<CartTotals, RegisterError> {
        let product = self
            .staged_product()
            .ok_or(RegisterError::NothingStaged)?;

        let totals = self.add_to_cart(&product, quantity)?;
        *self.staged.lock().expect("Staged mutex poisoned") = None;
        Ok(totals)
    }

    /// Appends a product to the cart and returns the updated totals.
    pub fn add_to_cart(
        &self,
        product: &Product,
        quantity: i64,
    ) -> Result<CartTotals, RegisterError> {
        self.cart
            .with_cart_mut(|cart| cart.add_line(product, quantity))?;
        self.invalidate_pending();

        let totals = self.cart_totals();
        info!(
            barcode = %product.barcode,
            quantity,
            total = totals.totals.total_incl_tax.minor(),
            "Line added"
        );
        Ok(totals)
    }

    /// Removes the cart line at `index`.
    pub fn remove_line(&self, index: usize) -> Result<CartTotals, RegisterError> {
        let removed = self.cart.with_cart_mut(|cart| cart.remove_line(index))?;
        self.invalidate_pending();
        info!(barcode = %removed.barcode, index, "Line removed");
        Ok(self.cart_totals())
    }

    /// Empties the cart (explicit cancel).
    pub fn clear_cart(&self) {
        self.cart.with_cart_mut(|cart| cart.clear());
        self.invalidate_pending();
        info!("Cart cleared");
    }

    /// Returns the current cart summary.
    pub fn cart_totals(&self) -> CartTotals {
        self.cart.with_cart(|cart| CartTotals::from(cart))
    }

    fn invalidate_pending(&self) {
        self.checkout
            .lock()
            .expect("Checkout mutex poisoned")
            .invalidate_pending();
    }

    // =========================================================================
    // Checkout
    // =========================================================================

    /// Submits the cart as a purchase.
    ///
    /// The snapshot and its submission id are created once per logical
    /// checkout action; retries after a failure or timeout reuse them,
    /// so the server can dedup. On failure the cart is untouched. A
    /// totals mismatch parks the cart until
    /// [`Self::acknowledge_server_totals`].
    pub async fn checkout(&self) -> Result<CheckoutOutcome, RegisterError> {
        // Snapshot under the cart lock, then release before awaiting.
        let cart_copy = self.cart.with_cart(|cart| cart.clone());
        let transaction = {
            let mut checkout = self.checkout.lock().expect("Checkout mutex poisoned");
            if checkout.needs_acknowledgment() {
                return Err(RegisterError::AcknowledgmentRequired);
            }
            checkout.begin(&cart_copy, || Uuid::new_v4().to_string())?
        };

        debug!(
            submission_id = %transaction.submission_id,
            lines = transaction.lines.len(),
            "checkout"
        );

        match self.submitter.submit(&transaction).await {
            Ok(server_totals) => {
                let outcome = self
                    .checkout
                    .lock()
                    .expect("Checkout mutex poisoned")
                    .on_success(transaction.totals, server_totals);

                match &outcome {
                    CheckoutOutcome::Confirmed { totals } => {
                        self.cart.with_cart_mut(|cart| cart.clear());
                        info!(
                            submission_id = %transaction.submission_id,
                            total = totals.total_incl_tax.minor(),
                            "Purchase committed, cart cleared"
                        );
                    }
                    CheckoutOutcome::TotalsMismatch { local, server } => {
                        warn!(
                            submission_id = %transaction.submission_id,
                            local = local.total_incl_tax.minor(),
                            server = server.total_incl_tax.minor(),
                            "Server totals differ from local, awaiting acknowledgment"
                        );
                    }
                }
                Ok(outcome)
            }
            Err(e) => {
                // Cart and pending snapshot stay as they are: the next
                // checkout retries under the same submission id.
                warn!(
                    submission_id = %transaction.submission_id,
                    error = %e,
                    "Purchase submission failed, cart preserved"
                );
                Err(e.into())
            }
        }
    }

    /// Accepts the server-confirmed totals after a mismatch.
    ///
    /// The server totals are authoritative for the receipt; the cart is
    /// cleared only here, on explicit acknowledgment.
    pub fn acknowledge_server_totals(&self) -> Result<Totals, RegisterError> {
        let server = self
            .checkout
            .lock()
            .expect("Checkout mutex poisoned")
            .acknowledge()
            .ok_or(RegisterError::NoPendingAcknowledgment)?;

        self.cart.with_cart_mut(|cart| cart.clear());
        info!(
            total = server.total_incl_tax.minor(),
            "Server totals acknowledged, cart cleared"
        );
        Ok(server)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
// The full pipeline (idempotent resubmit, stale tickets, mismatch
// acknowledgment) is exercised in tests/checkout_flow.rs; these cover
// the staging surface.

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::SessionError;
    use std::sync::atomic::{AtomicBool, Ordering};
    use vega_api::{ApiError, ApiResult, MemoryCatalog};
    use vega_core::{Money, Transaction};

    #[derive(Default)]
    struct UnusedCapture(AtomicBool);

    impl CaptureBackend for UnusedCapture {
        fn acquire(&self) -> Result<(), SessionError> {
            self.0.store(true, Ordering::SeqCst);
            Ok(())
        }
        fn release(&self) {
            self.0.store(false, Ordering::SeqCst);
        }
    }

    /// Submitter that echoes the locally computed totals back.
    struct EchoSubmitter;

    #[async_trait::async_trait]
    impl SubmitPurchase for EchoSubmitter {
        async fn submit(&self, transaction: &Transaction) -> ApiResult<Totals> {
            Ok(transaction.totals)
        }
    }

    fn register() -> Register<MemoryCatalog, EchoSubmitter> {
        let catalog = MemoryCatalog::new()
            .with(Product::new("123456", "Apple", Money::from_minor(100)))
            .with(Product::new("789012", "Banana", Money::from_minor(150)));
        Register::new(
            catalog,
            EchoSubmitter,
            TaxRate::from_bps(1000),
            Arc::new(UnusedCapture::default()),
        )
    }

    #[tokio::test]
    async fn test_enter_code_stages_product() {
        let register = register();
        let product = register.enter_code("123456").await.unwrap();
        assert_eq!(product.name, "Apple");
        assert_eq!(register.staged_product().unwrap().barcode, "123456");
    }

    #[tokio::test]
    async fn test_unknown_code_stages_nothing() {
        let register = register();
        let err = register.enter_code("000000").await.unwrap_err();
        assert!(matches!(
            err,
            RegisterError::Api(ApiError::NotFound { .. })
        ));
        assert!(register.staged_product().is_none());
        assert_eq!(register.cart_totals().line_count, 0);
    }

    #[tokio::test]
    async fn test_add_staged_consumes_stage() {
        let register = register();
        register.enter_code("123456").await.unwrap();

        let totals = register.add_staged(2).unwrap();
        assert_eq!(totals.totals.total_incl_tax.minor(), 200);
        assert!(register.staged_product().is_none());

        assert!(matches!(
            register.add_staged(1),
            Err(RegisterError::NothingStaged)
        ));
    }

    #[tokio::test]
    async fn test_invalid_quantity_keeps_stage() {
        let register = register();
        register.enter_code("123456").await.unwrap();

        assert!(register.add_staged(0).is_err());
        // Operator corrects the quantity and retries
        assert!(register.staged_product().is_some());
        assert!(register.add_staged(1).is_ok());
    }
}
