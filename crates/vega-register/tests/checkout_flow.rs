//! End-to-end pipeline tests: scan session → catalog lookup → cart →
//! idempotent checkout, driven entirely through in-memory capabilities.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tokio::sync::Notify;

use vega_api::{ApiError, ApiResult, CatalogLookup, MemoryCatalog, SubmitPurchase};
use vega_core::{Money, Product, TaxRate, Totals, Transaction};
use vega_register::{
    CaptureBackend, CheckoutOutcome, Register, RegisterError, SessionError, SessionState,
};

// =============================================================================
// Test Capabilities
// =============================================================================

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .try_init();
}

/// Capture backend with exclusivity and acquire/release accounting.
#[derive(Default)]
struct FakeCapture {
    held: AtomicBool,
    acquires: AtomicUsize,
    releases: AtomicUsize,
}

impl CaptureBackend for FakeCapture {
    fn acquire(&self) -> Result<(), SessionError> {
        if self.held.swap(true, Ordering::SeqCst) {
            return Err(SessionError::DeviceBusy);
        }
        self.acquires.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn release(&self) {
        self.held.store(false, Ordering::SeqCst);
        self.releases.fetch_add(1, Ordering::SeqCst);
    }
}

/// Scripted response for one submit attempt.
enum Scripted {
    Unavailable,
    RejectStatus(u16),
    ConfirmWith(Totals),
}

#[derive(Default)]
struct SubmitterInner {
    script: Mutex<VecDeque<Scripted>>,
    seen: Mutex<Vec<String>>,
    committed: Mutex<Vec<String>>,
}

/// Mock purchase endpoint tracking seen submission ids.
///
/// Commits a transaction at most once per id - the server-side dedup
/// the Idempotency-Key exists for.
#[derive(Clone, Default)]
struct FakeSubmitter {
    inner: Arc<SubmitterInner>,
}

impl FakeSubmitter {
    fn script(self, response: Scripted) -> Self {
        self.inner.script.lock().unwrap().push_back(response);
        self
    }

    fn seen(&self) -> Vec<String> {
        self.inner.seen.lock().unwrap().clone()
    }

    fn committed(&self) -> Vec<String> {
        self.inner.committed.lock().unwrap().clone()
    }

    fn commit(&self, id: &str) {
        let mut committed = self.inner.committed.lock().unwrap();
        if !committed.iter().any(|c| c == id) {
            committed.push(id.to_string());
        }
    }
}

#[async_trait]
impl SubmitPurchase for FakeSubmitter {
    async fn submit(&self, transaction: &Transaction) -> ApiResult<Totals> {
        self.inner
            .seen
            .lock()
            .unwrap()
            .push(transaction.submission_id.clone());

        let next = self.inner.script.lock().unwrap().pop_front();
        match next {
            Some(Scripted::Unavailable) => Err(ApiError::Unavailable("connection refused".into())),
            Some(Scripted::RejectStatus(status)) => Err(ApiError::SubmissionFailed { status }),
            Some(Scripted::ConfirmWith(totals)) => {
                self.commit(&transaction.submission_id);
                Ok(totals)
            }
            // Default behavior: confirm with the locally computed totals
            None => {
                self.commit(&transaction.submission_id);
                Ok(transaction.totals)
            }
        }
    }
}

/// Catalog that parks each lookup until the test lets it proceed.
/// Used to stop the session while a lookup is in flight.
struct SlowCatalog {
    inner: MemoryCatalog,
    started: Arc<Notify>,
    release: Arc<Notify>,
}

#[async_trait]
impl CatalogLookup for SlowCatalog {
    async fn lookup(&self, barcode: &str) -> ApiResult<Product> {
        self.started.notify_one();
        self.release.notified().await;
        self.inner.lookup(barcode).await
    }
}

// =============================================================================
// Fixtures
// =============================================================================

fn catalog() -> MemoryCatalog {
    MemoryCatalog::new()
        .with(Product::new("123456", "Apple", Money::from_minor(100)))
        .with(Product::new("789012", "Banana", Money::from_minor(150)))
        .with(Product::new("555555", "Onigiri", Money::from_minor(105)))
}

fn register_with(
    submitter: FakeSubmitter,
) -> (Register<MemoryCatalog, FakeSubmitter>, Arc<FakeCapture>) {
    let capture = Arc::new(FakeCapture::default());
    let register = Register::new(
        catalog(),
        submitter,
        TaxRate::from_bps(1000),
        Arc::clone(&capture) as Arc<dyn CaptureBackend>,
    );
    (register, capture)
}

// =============================================================================
// Totals Properties
// =============================================================================

#[tokio::test]
async fn totals_track_every_add_exactly() {
    init_tracing();
    let (register, _) = register_with(FakeSubmitter::default());

    let apple = register.enter_code("123456").await.unwrap();
    register.add_to_cart(&apple, 2).unwrap();
    let banana = register.enter_code("789012").await.unwrap();
    register.add_to_cart(&banana, 1).unwrap();
    // Same barcode again: separate line, still exact accumulation
    register.add_to_cart(&apple, 3).unwrap();

    let summary = register.cart_totals();
    assert_eq!(summary.line_count, 3);
    assert_eq!(summary.total_quantity, 6);
    // 100*2 + 150 + 100*3
    assert_eq!(summary.totals.total_incl_tax.minor(), 650);
}

#[tokio::test]
async fn exclusive_totals_round_per_unit_before_quantity() {
    let (register, _) = register_with(FakeSubmitter::default());

    // 105 at 10%: unit excl = 95, line of 3 = 285.
    // Rounding the line total would give round(315/1.1) = 286.
    let onigiri = register.enter_code("555555").await.unwrap();
    let summary = register.add_to_cart(&onigiri, 3).unwrap();

    assert_eq!(summary.totals.total_incl_tax.minor(), 315);
    assert_eq!(summary.totals.total_excl_tax.minor(), 285);
}

// =============================================================================
// Scan Session Properties
// =============================================================================

#[tokio::test]
async fn double_start_is_noop_and_one_code_yields_one_detection() {
    let (register, capture) = register_with(FakeSubmitter::default());

    register.start_scan().unwrap();
    register.start_scan().unwrap(); // no-op: still one acquisition
    assert_eq!(register.session_state(), SessionState::Active);
    assert_eq!(capture.acquires.load(Ordering::SeqCst), 1);

    // One decoded code → one staged product
    let product = register.scan_detected("123456").await.unwrap();
    assert_eq!(product.unwrap().name, "Apple");
    assert_eq!(capture.releases.load(Ordering::SeqCst), 1);

    // The decoder firing again for the same frame is discarded
    let duplicate = register.scan_detected("123456").await.unwrap();
    assert!(duplicate.is_none());
    assert_eq!(register.cart_totals().line_count, 0);
}

#[tokio::test]
async fn unknown_barcode_is_not_found_and_cart_untouched() {
    let (register, _) = register_with(FakeSubmitter::default());

    register.start_scan().unwrap();
    let err = register.scan_detected("000000").await.unwrap_err();
    assert!(matches!(err, RegisterError::Api(ApiError::NotFound { .. })));

    assert!(register.staged_product().is_none());
    assert_eq!(register.cart_totals().line_count, 0);
    assert!(register.cart_totals().totals.is_zero());
}

#[tokio::test]
async fn stopping_session_discards_in_flight_lookup() {
    init_tracing();
    let started = Arc::new(Notify::new());
    let release = Arc::new(Notify::new());
    let slow = SlowCatalog {
        inner: catalog(),
        started: Arc::clone(&started),
        release: Arc::clone(&release),
    };
    let register = Arc::new(Register::new(
        slow,
        FakeSubmitter::default(),
        TaxRate::from_bps(1000),
        Arc::new(FakeCapture::default()) as Arc<dyn CaptureBackend>,
    ));

    register.start_scan().unwrap();

    let worker = Arc::clone(&register);
    let lookup = tokio::spawn(async move { worker.scan_detected("123456").await });

    // Lookup is in flight; the operator tears the session down
    started.notified().await;
    register.stop_scan();
    release.notify_one();

    // The stale result is discarded, not applied
    let result = lookup.await.unwrap().unwrap();
    assert!(result.is_none());
    assert!(register.staged_product().is_none());
    assert_eq!(register.cart_totals().line_count, 0);
}

// =============================================================================
// Checkout Properties
// =============================================================================

#[tokio::test]
async fn successful_purchase_clears_cart() {
    let submitter = FakeSubmitter::default();
    let (register, _) = register_with(submitter.clone());

    let apple = register.enter_code("123456").await.unwrap();
    register.add_to_cart(&apple, 2).unwrap();

    let outcome = register.checkout().await.unwrap();
    assert!(matches!(outcome, CheckoutOutcome::Confirmed { totals } if totals.total_incl_tax.minor() == 200));

    assert_eq!(register.cart_totals().line_count, 0);
    assert!(register.cart_totals().totals.is_zero());
    assert_eq!(submitter.committed().len(), 1);
}

#[tokio::test]
async fn failed_purchase_preserves_cart() {
    let submitter = FakeSubmitter::default().script(Scripted::RejectStatus(422));
    let (register, _) = register_with(submitter.clone());

    let banana = register.enter_code("789012").await.unwrap();
    register.add_to_cart(&banana, 2).unwrap();
    let before = register.cart_totals();

    let err = register.checkout().await.unwrap_err();
    assert!(matches!(
        err,
        RegisterError::Api(ApiError::SubmissionFailed { status: 422 })
    ));

    // Cart and totals bit-identical to pre-submit
    assert_eq!(register.cart_totals(), before);
    assert!(submitter.committed().is_empty());
}

#[tokio::test]
async fn retry_after_failure_reuses_submission_id() {
    init_tracing();
    let submitter = FakeSubmitter::default().script(Scripted::Unavailable);
    let (register, _) = register_with(submitter.clone());

    let apple = register.enter_code("123456").await.unwrap();
    register.add_to_cart(&apple, 1).unwrap();

    // First attempt: endpoint unreachable, cart preserved
    let err = register.checkout().await.unwrap_err();
    assert!(err.is_retryable());
    assert_eq!(register.cart_totals().line_count, 1);

    // Second attempt succeeds
    let outcome = register.checkout().await.unwrap();
    assert!(matches!(outcome, CheckoutOutcome::Confirmed { .. }));

    // Same id on both attempts; exactly one committed transaction
    let seen = submitter.seen();
    assert_eq!(seen.len(), 2);
    assert_eq!(seen[0], seen[1]);
    assert_eq!(submitter.committed(), vec![seen[0].clone()]);
}

#[tokio::test]
async fn editing_cart_after_failure_starts_new_logical_checkout() {
    let submitter = FakeSubmitter::default().script(Scripted::Unavailable);
    let (register, _) = register_with(submitter.clone());

    let apple = register.enter_code("123456").await.unwrap();
    register.add_to_cart(&apple, 1).unwrap();
    register.checkout().await.unwrap_err();

    // Operator edits the cart: the old snapshot no longer applies
    register.add_to_cart(&apple, 1).unwrap();
    register.checkout().await.unwrap();

    let seen = submitter.seen();
    assert_eq!(seen.len(), 2);
    assert_ne!(seen[0], seen[1]);
}

#[tokio::test]
async fn checkout_on_empty_cart_is_rejected() {
    let (register, _) = register_with(FakeSubmitter::default());
    let err = register.checkout().await.unwrap_err();
    assert!(matches!(
        err,
        RegisterError::Core(vega_core::CoreError::EmptyCart)
    ));
}

#[tokio::test]
async fn totals_mismatch_holds_cart_until_acknowledged() {
    let server_totals = Totals {
        total_incl_tax: Money::from_minor(210),
        total_excl_tax: Money::from_minor(191),
    };
    let submitter = FakeSubmitter::default().script(Scripted::ConfirmWith(server_totals));
    let (register, _) = register_with(submitter.clone());

    let apple = register.enter_code("123456").await.unwrap();
    register.add_to_cart(&apple, 2).unwrap();

    let outcome = register.checkout().await.unwrap();
    match outcome {
        CheckoutOutcome::TotalsMismatch { local, server } => {
            assert_eq!(local.total_incl_tax.minor(), 200);
            assert_eq!(server, server_totals);
        }
        other => panic!("expected TotalsMismatch, got {:?}", other),
    }

    // Cart held, new checkouts gated until the operator acknowledges
    assert_eq!(register.cart_totals().line_count, 1);
    assert!(matches!(
        register.checkout().await.unwrap_err(),
        RegisterError::AcknowledgmentRequired
    ));

    let confirmed = register.acknowledge_server_totals().unwrap();
    assert_eq!(confirmed, server_totals);
    assert_eq!(register.cart_totals().line_count, 0);

    // Nothing left to acknowledge
    assert!(matches!(
        register.acknowledge_server_totals().unwrap_err(),
        RegisterError::NoPendingAcknowledgment
    ));
}
