//! # Error Types
//!
//! Domain-specific error types for bakeline-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  bakeline-core errors (this file)                                      │
//! │  ├── CoreError        - Business rule failures                         │
//! │  └── ValidationError  - Input validation failures                      │
//! │                                                                         │
//! │  bakeline-db errors                                                    │
//! │  └── DbError          - Database operation failures                    │
//! │                                                                         │
//! │  billing-api errors                                                    │
//! │  └── ApiError         - What the browser sees (JSON body + status)     │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → DbError → ApiError → Browser      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use thiserror::Error;

// =============================================================================
// Core Error
// =============================================================================

/// Business logic errors.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Product code is not in the cart.
    #[error("Product {0} is not in the cart")]
    NotInCart(String),

    /// Cart has reached its distinct product limit.
    #[error("Cart cannot have more than {max} items")]
    CartTooLarge { max: usize },

    /// Item quantity exceeds maximum allowed.
    #[error("Quantity {requested} exceeds maximum allowed ({max})")]
    QuantityTooLarge { requested: i64, max: i64 },

    /// A document must have at least one line.
    #[error("{kind} has no line items")]
    EmptyDocument { kind: String },

    /// Discount or advance larger than what it applies to.
    #[error("{field} ({amount}) exceeds {limit_field} ({limit})")]
    AmountExceeds {
        field: String,
        amount: i64,
        limit_field: String,
        limit: i64,
    },

    /// An amount does not fit in an i64 count of paise.
    #[error("{0} is too large")]
    AmountOverflow(String),

    /// Draft payload could not be decoded.
    #[error("Draft payload is corrupt: {0}")]
    CorruptDraft(String),

    /// Cart session could not be read or written.
    #[error("Session storage failed: {0}")]
    SessionStore(String),

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Value must be positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Invalid format (phone, GSTIN, pincode, code).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },

    /// Value is not in allowed set.
    #[error("{field} must be one of: {allowed:?}")]
    NotAllowed { field: String, allowed: Vec<String> },
}

impl ValidationError {
    /// Shorthand for [`ValidationError::InvalidFormat`].
    pub fn invalid_format(field: impl Into<String>, reason: impl Into<String>) -> Self {
        ValidationError::InvalidFormat {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = CoreError::QuantityTooLarge {
            requested: 12_000,
            max: 9_999,
        };
        assert_eq!(
            err.to_string(),
            "Quantity 12000 exceeds maximum allowed (9999)"
        );

        let err = CoreError::AmountExceeds {
            field: "discount".to_string(),
            amount: 500,
            limit_field: "subtotal".to_string(),
            limit: 400,
        };
        assert_eq!(err.to_string(), "discount (500) exceeds subtotal (400)");
    }

    #[test]
    fn test_validation_converts_to_core_error() {
        let validation_err = ValidationError::Required {
            field: "phone".to_string(),
        };
        let core_err: CoreError = validation_err.into();
        assert!(matches!(core_err, CoreError::Validation(_)));
        assert_eq!(core_err.to_string(), "Validation error: phone is required");
    }
}
