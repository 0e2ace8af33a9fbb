//! # Register Error Type
//!
//! Unified error type for register operations - what the embedding
//! layer sees.
//!
//! ## Error Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  vega-core  CoreError ───┐                                              │
//! │  vega-api   ApiError  ───┼──► RegisterError ──► embedding layer         │
//! │  session    SessionError ┘                                              │
//! │                                                                         │
//! │  Plus register-level conditions: nothing staged, acknowledgment gate.   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Whatever surfaces here, the cart is intact: every failing operation
//! leaves it exactly as it was.

use thiserror::Error;

use crate::session::SessionError;
use vega_api::ApiError;
use vega_core::CoreError;

/// Register operation errors.
#[derive(Debug, Error)]
pub enum RegisterError {
    /// Cart or transaction rule violation.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// Catalog lookup or purchase submission failure.
    #[error(transparent)]
    Api(#[from] ApiError),

    /// Scan session / capture device failure.
    #[error(transparent)]
    Session(#[from] SessionError),

    /// `add_staged` called with no product staged.
    #[error("No product staged; scan or enter a barcode first")]
    NothingStaged,

    /// A totals mismatch awaits acknowledgment; no new checkout until
    /// the operator confirms the server totals.
    #[error("Server totals await acknowledgment before a new checkout")]
    AcknowledgmentRequired,

    /// `acknowledge_server_totals` called with nothing to acknowledge.
    #[error("No server totals awaiting acknowledgment")]
    NoPendingAcknowledgment,
}

impl RegisterError {
    /// True if retrying the same operation may succeed (transient
    /// transport conditions).
    pub fn is_retryable(&self) -> bool {
        matches!(self, RegisterError::Api(e) if e.is_retryable())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_errors_pass_through() {
        let err: RegisterError = ApiError::NotFound {
            barcode: "000000".into(),
        }
        .into();
        assert_eq!(err.to_string(), "Product not found for barcode 000000");
        assert!(!err.is_retryable());

        let err: RegisterError = ApiError::Timeout(10).into();
        assert!(err.is_retryable());
    }

    #[test]
    fn test_core_errors_pass_through() {
        let err: RegisterError = CoreError::EmptyCart.into();
        assert_eq!(err.to_string(), "Cart is empty");
    }
}
