//! # Error Types
//!
//! Domain-specific error types for foodpass-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  foodpass-core errors (this file)                                      │
//! │  ├── CoreError        - General domain errors                          │
//! │  └── ValidationError  - Input validation failures                      │
//! │                                                                         │
//! │  foodpass-engine outcomes (separate crate)                             │
//! │  └── RegistrationOutcome::Rejected - typed, never thrown               │
//! │                                                                         │
//! │  foodpass-db errors (separate crate)                                   │
//! │  └── DbError          - Database operation failures                    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Design Principles
//! 1. Use `thiserror` for derive macros (not manual impl)
//! 2. Include context in error messages (RUT, field name, etc.)
//! 3. Errors are enum variants, never String

use thiserror::Error;

/// Core business logic errors.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Worker cannot be found by any identifier.
    #[error("Worker not found: {0}")]
    WorkerNotFound(String),

    /// Company cannot be found.
    #[error("Company not found: {0}")]
    CompanyNotFound(String),

    /// Input validation failed.
    #[error("Validation failed: {0}")]
    Validation(#[from] ValidationError),
}

/// Input validation failures.
///
/// Each variant names the offending field so the message can be shown
/// directly to an administrator.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    /// A required field is empty.
    #[error("Field '{field}' is required")]
    Required { field: String },

    /// A field exceeds its maximum length.
    #[error("Field '{field}' exceeds maximum length of {max}")]
    TooLong { field: String, max: usize },

    /// A field has an invalid format.
    #[error("Field '{field}' is invalid: {reason}")]
    InvalidFormat { field: String, reason: String },

    /// A numeric field is outside its allowed range.
    #[error("Field '{field}' is out of range: {reason}")]
    OutOfRange { field: String, reason: String },
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages_carry_context() {
        let err = ValidationError::Required {
            field: "rut".to_string(),
        };
        assert_eq!(err.to_string(), "Field 'rut' is required");

        let err = CoreError::WorkerNotFound("12345678-9".to_string());
        assert!(err.to_string().contains("12345678-9"));
    }

    #[test]
    fn test_validation_error_converts_to_core_error() {
        let err: CoreError = ValidationError::OutOfRange {
            field: "lunch".to_string(),
            reason: "rates must be non-negative".to_string(),
        }
        .into();
        assert!(matches!(err, CoreError::Validation(_)));
    }
}
