//! # vega-api: HTTP Boundary for Vega POS
//!
//! Clients for the two external endpoints the engine talks to, plus the
//! configuration that points at them.
//!
//! ## External Interface
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      vega-api (THIS CRATE)                              │
//! │                                                                         │
//! │  ┌───────────────┐    GET /product/{barcode}     ┌──────────────────┐  │
//! │  │  HttpCatalog  │ ─────────────────────────────►│                  │  │
//! │  │               │ ◄───── { name, price } / 404  │                  │  │
//! │  └───────────────┘                               │   Store Server   │  │
//! │                                                  │                  │  │
//! │  ┌───────────────┐    POST /purchase             │                  │  │
//! │  │ HttpPurchase  │ ─────────────────────────────►│                  │  │
//! │  │ Client        │    Idempotency-Key: <uuid>    │                  │  │
//! │  │               │ ◄── { totalAmt, totalAmtExTax }                  │  │
//! │  └───────────────┘                               └──────────────────┘  │
//! │                                                                         │
//! │  Both clients sit behind capability traits so tests substitute          │
//! │  in-memory implementations.                                             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`config`] - API configuration (TOML file + env overrides)
//! - [`catalog`] - Catalog lookup: barcode → product
//! - [`purchase`] - Idempotent purchase submission with backoff
//! - [`error`] - Client error taxonomy with retryability

pub mod catalog;
pub mod config;
pub mod error;
pub mod purchase;

pub use catalog::{CatalogLookup, HttpCatalog, MemoryCatalog};
pub use config::ApiConfig;
pub use error::{ApiError, ApiResult};
pub use purchase::{HttpPurchaseClient, SubmitPurchase, IDEMPOTENCY_KEY_HEADER};
