//! # Error Types
//!
//! Domain-specific error types for vega-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  vega-core errors (this file)                                          │
//! │  ├── CoreError        - Cart/transaction rule violations               │
//! │  └── ValidationError  - Input validation failures                      │
//! │                                                                         │
//! │  vega-api errors (separate crate)                                      │
//! │  └── ApiError         - Catalog/purchase transport failures            │
//! │                                                                         │
//! │  vega-register errors (separate crate)                                 │
//! │  └── RegisterError    - What the embedding layer sees                  │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → RegisterError → Embedder          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Design Principles
//! 1. Use `thiserror` for derive macros (not manual impl)
//! 2. Include context in error messages (barcode, index, limits)
//! 3. Errors are enum variants, never String
//! 4. A failing operation leaves the cart exactly as it found it

use thiserror::Error;

// =============================================================================
// Core Error
// =============================================================================

/// Core business logic errors.
///
/// These errors represent business rule violations. Every mutating cart
/// operation validates first and mutates second, so any of these
/// surfacing means the cart was not touched.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Quantity outside the accepted range.
    ///
    /// Rejected before any cart mutation: a line with quantity 0 or a
    /// fat-fingered 1000 never makes it into the purchase list.
    #[error("Invalid quantity {requested}: must be between 1 and {max}")]
    InvalidQuantity { requested: i64, max: i64 },

    /// Cart has reached the maximum number of lines.
    #[error("Cart cannot have more than {max} lines")]
    CartFull { max: usize },

    /// Line index out of range for remove.
    #[error("Line index {index} out of range (cart has {len} lines)")]
    LineOutOfRange { index: usize, len: usize },

    /// Checkout attempted on an empty cart.
    #[error("Cart is empty")]
    EmptyCart,

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// These occur when raw input (a decoded symbol string, a wire price)
/// doesn't meet shape requirements. Used for early validation before
/// business logic runs.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Invalid format (e.g., non-symbol characters in a barcode).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },

    /// Monetary amount must not be negative.
    #[error("{field} must not be negative")]
    NegativeAmount { field: String },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = CoreError::InvalidQuantity {
            requested: 0,
            max: 999,
        };
        assert_eq!(
            err.to_string(),
            "Invalid quantity 0: must be between 1 and 999"
        );

        let err = CoreError::LineOutOfRange { index: 3, len: 2 };
        assert_eq!(
            err.to_string(),
            "Line index 3 out of range (cart has 2 lines)"
        );
    }

    #[test]
    fn test_validation_converts_to_core_error() {
        let validation_err = ValidationError::Required {
            field: "barcode".to_string(),
        };
        let core_err: CoreError = validation_err.into();
        assert!(matches!(core_err, CoreError::Validation(_)));
    }
}
