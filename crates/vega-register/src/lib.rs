//! # vega-register: Scan Session + Checkout Orchestration
//!
//! The embedding surface of the Vega POS engine. A [`Register`] ties a
//! scan session, a catalog, a cart, and a purchase submitter into the
//! pipeline from "scanned code" to "committed sale" - with no rendering
//! dependency, so the whole flow runs under test with in-memory
//! capabilities.
//!
//! ## Typical Flow
//! ```rust,no_run
//! use std::sync::Arc;
//! use vega_api::{ApiConfig, HttpCatalog, HttpPurchaseClient};
//! use vega_register::{CaptureBackend, Register};
//!
//! # async fn run(capture: Arc<dyn CaptureBackend>) -> Result<(), Box<dyn std::error::Error>> {
//! let config = ApiConfig::load_or_default(None);
//! let register = Register::new(
//!     HttpCatalog::new(&config)?,
//!     HttpPurchaseClient::new(&config)?,
//!     config.tax_rate(),
//!     capture,
//! );
//!
//! register.start_scan()?;
//! // capture backend decodes a symbol and the embedder forwards it:
//! if let Some(product) = register.scan_detected("4901234567894").await? {
//!     register.add_staged(1)?;
//! }
//! let outcome = register.checkout().await?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Modules
//!
//! - [`register`] - The orchestration surface
//! - [`session`] - Scan session state machine + capture ownership
//! - [`checkout`] - Idempotent checkout bookkeeping
//! - [`state`] - Shared cart state
//! - [`error`] - Register-level errors

pub mod checkout;
pub mod error;
pub mod register;
pub mod session;
pub mod state;

pub use checkout::{CheckoutOutcome, CheckoutState};
pub use error::RegisterError;
pub use register::Register;
pub use session::{CaptureBackend, Detection, ScanSession, ScanTicket, SessionError, SessionState};
pub use state::CartState;
