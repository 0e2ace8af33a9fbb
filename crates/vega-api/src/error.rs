//! # API Error Types
//!
//! Error types for catalog lookup and purchase submission.
//!
//! ## Error Categories
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       API Error Categories                              │
//! │                                                                         │
//! │  ┌─────────────────┐  ┌─────────────────┐  ┌─────────────────────────┐ │
//! │  │  Configuration  │  │   Transport     │  │     Endpoint            │ │
//! │  │                 │  │                 │  │                         │ │
//! │  │  InvalidConfig  │  │  Unavailable    │  │  NotFound               │ │
//! │  │  InvalidUrl     │  │  Timeout        │  │  SubmissionFailed       │ │
//! │  │  ConfigLoad     │  │                 │  │  InvalidResponse        │ │
//! │  └─────────────────┘  └─────────────────┘  └─────────────────────────┘ │
//! │                                                                         │
//! │  NotFound is deliberately distinct from Unavailable: the first means   │
//! │  "this barcode resolves to nothing, re-scan", the second means "the    │
//! │  service didn't answer, retry". Conflating them turns a transient      │
//! │  outage into a phantom 'item not found' on the register.               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use thiserror::Error;

/// Result type alias for API operations.
pub type ApiResult<T> = Result<T, ApiError>;

/// API error type covering configuration, transport, and endpoint
/// failures.
///
/// ## Design Principles
/// - Each variant includes enough context for debugging
/// - Errors are categorized for different handling strategies
/// - All errors are `Send + Sync` for async compatibility
#[derive(Debug, Error)]
pub enum ApiError {
    // =========================================================================
    // Configuration Errors
    // =========================================================================
    /// Invalid API configuration.
    #[error("Invalid API configuration: {0}")]
    InvalidConfig(String),

    /// Invalid base URL.
    #[error("Invalid API base URL: {0}")]
    InvalidUrl(String),

    /// Failed to load config file.
    #[error("Failed to load config: {0}")]
    ConfigLoadFailed(String),

    // =========================================================================
    // Transport Errors
    // =========================================================================
    /// The service didn't answer (connection refused, DNS, 5xx, ...).
    #[error("Service unavailable: {0}")]
    Unavailable(String),

    /// Request exceeded the configured timeout.
    #[error("Request timed out after {0} seconds")]
    Timeout(u64),

    // =========================================================================
    // Endpoint Errors
    // =========================================================================
    /// Barcode resolved to no product (HTTP 404).
    #[error("Product not found for barcode {barcode}")]
    NotFound { barcode: String },

    /// Server rejected the purchase (non-2xx, non-5xx).
    #[error("Purchase submission rejected with status {status}")]
    SubmissionFailed { status: u16 },

    /// Response body didn't match the wire contract.
    #[error("Invalid response from server: {0}")]
    InvalidResponse(String),

    /// Input failed validation before any request was made.
    #[error("Validation error: {0}")]
    Validation(#[from] vega_core::ValidationError),
}

// =============================================================================
// Error Conversions
// =============================================================================

impl From<url::ParseError> for ApiError {
    fn from(err: url::ParseError) -> Self {
        ApiError::InvalidUrl(err.to_string())
    }
}

impl From<std::io::Error> for ApiError {
    fn from(err: std::io::Error) -> Self {
        ApiError::ConfigLoadFailed(err.to_string())
    }
}

impl From<toml::de::Error> for ApiError {
    fn from(err: toml::de::Error) -> Self {
        ApiError::ConfigLoadFailed(err.to_string())
    }
}

// =============================================================================
// Error Categorization (for retry logic)
// =============================================================================

impl ApiError {
    /// Returns true if this error is transient and the operation can be
    /// retried without changing the request.
    ///
    /// ## Retryable
    /// - `Unavailable` (network issues, 5xx)
    /// - `Timeout`
    ///
    /// ## Non-Retryable
    /// - `NotFound` (re-scanning, not retrying, is the recovery)
    /// - `SubmissionFailed` (the server made a decision; repeating the
    ///   identical request repeats the rejection)
    /// - Configuration and validation errors
    pub fn is_retryable(&self) -> bool {
        matches!(self, ApiError::Unavailable(_) | ApiError::Timeout(_))
    }
}
