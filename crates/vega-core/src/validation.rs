//! # Validation Module
//!
//! Input validation for raw values entering the engine: decoded symbol
//! strings from the scanner (or manual entry) and prices from the
//! catalog wire format. Business rules that need cart context (quantity
//! bounds, cart size) live on [`crate::cart::Cart`] itself.

use crate::error::ValidationError;

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Maximum barcode length we accept.
///
/// EAN-13 is 13 digits; Code 128 symbols can be longer. 64 is a
/// generous cap that still rejects garbage input.
pub const MAX_BARCODE_LEN: usize = 64;

// =============================================================================
// Barcode
// =============================================================================

/// Validates a decoded barcode symbol string.
///
/// ## Rules
/// - Must not be empty (after trimming)
/// - Must be at most [`MAX_BARCODE_LEN`] characters
/// - Must contain only ASCII graphic characters (a decodable symbol
///   never contains whitespace or control bytes)
///
/// ## Returns
/// The trimmed barcode string.
///
/// ## Example
/// ```rust
/// use vega_core::validation::validate_barcode;
///
/// assert_eq!(validate_barcode(" 4901234567894 ").unwrap(), "4901234567894");
/// assert!(validate_barcode("").is_err());
/// assert!(validate_barcode("has space").is_err());
/// ```
pub fn validate_barcode(barcode: &str) -> ValidationResult<String> {
    let barcode = barcode.trim();

    if barcode.is_empty() {
        return Err(ValidationError::Required {
            field: "barcode".to_string(),
        });
    }

    if barcode.len() > MAX_BARCODE_LEN {
        return Err(ValidationError::TooLong {
            field: "barcode".to_string(),
            max: MAX_BARCODE_LEN,
        });
    }

    if !barcode.chars().all(|c| c.is_ascii_graphic()) {
        return Err(ValidationError::InvalidFormat {
            field: "barcode".to_string(),
            reason: "must contain only printable symbol characters".to_string(),
        });
    }

    Ok(barcode.to_string())
}

// =============================================================================
// Price
// =============================================================================

/// Validates a price from the catalog wire format.
///
/// Zero is allowed (free items); negative shelf prices are not.
pub fn validate_price(minor: i64) -> ValidationResult<()> {
    if minor < 0 {
        return Err(ValidationError::NegativeAmount {
            field: "price".to_string(),
        });
    }

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================
