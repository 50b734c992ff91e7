//! # Validation Module
//!
//! Business rule validation for data entering the store layer.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: THIS MODULE - business rule validation on insert paths       │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: Database (SQLite)                                            │
//! │  ├── NOT NULL constraints                                              │
//! │  ├── UNIQUE constraints (rut, scan_code, worker/period/day)            │
//! │  └── Foreign key constraints                                           │
//! │                                                                         │
//! │  Defense in depth: both layers catch different errors                  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Note: the *registration* path never validates identifiers - a scan that
//! resolves to nobody is an operator-facing NotFound outcome, not a
//! validation error. These checks guard worker/company creation (seeding,
//! admin tooling).

use crate::error::ValidationError;
use crate::types::RateTable;

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Validates a canonical national id (RUT).
///
/// ## Rules
/// - Not empty, at most 12 characters
/// - Digits followed by a mandatory hyphen and a single check character
///   (digit or K), e.g. `12345678-9`, `7654321-K`
pub fn validate_national_id(rut: &str) -> ValidationResult<()> {
    let rut = rut.trim();

    if rut.is_empty() {
        return Err(ValidationError::Required {
            field: "rut".to_string(),
        });
    }

    if rut.len() > 12 {
        return Err(ValidationError::TooLong {
            field: "rut".to_string(),
            max: 12,
        });
    }

    let invalid = || ValidationError::InvalidFormat {
        field: "rut".to_string(),
        reason: "expected digits, a hyphen and a check character (e.g. 12345678-9)".to_string(),
    };

    let (body, check) = rut.rsplit_once('-').ok_or_else(invalid)?;

    if body.is_empty() || !body.chars().all(|c| c.is_ascii_digit()) {
        return Err(invalid());
    }

    let mut check_chars = check.chars();
    match (check_chars.next(), check_chars.next()) {
        (Some(c), None) if c.is_ascii_digit() || c == 'K' => Ok(()),
        _ => Err(invalid()),
    }
}

/// Validates a badge scan code: the `FP-` prefix followed by a valid RUT.
pub fn validate_scan_code(code: &str) -> ValidationResult<()> {
    let code = code.trim();

    if code.is_empty() {
        return Err(ValidationError::Required {
            field: "scan_code".to_string(),
        });
    }

    let rest = code
        .strip_prefix(crate::SCAN_CODE_PREFIX)
        .ok_or_else(|| ValidationError::InvalidFormat {
            field: "scan_code".to_string(),
            reason: format!("must start with '{}'", crate::SCAN_CODE_PREFIX),
        })?;

    validate_national_id(rest).map_err(|_| ValidationError::InvalidFormat {
        field: "scan_code".to_string(),
        reason: "suffix must be a canonical RUT".to_string(),
    })
}

/// Validates that every rate in a company rate table is non-negative.
pub fn validate_rates(rates: &RateTable) -> ValidationResult<()> {
    let entries = [
        ("breakfast", rates.breakfast),
        ("lunch", rates.lunch),
        ("dinner", rates.dinner),
        ("snack", rates.snack),
        ("enhanced", rates.enhanced),
    ];

    for (field, amount) in entries {
        if amount.is_negative() {
            return Err(ValidationError::OutOfRange {
                field: field.to_string(),
                reason: "rates must be non-negative".to_string(),
            });
        }
    }

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::money::Money;

    #[test]
    fn test_valid_national_ids() {
        assert!(validate_national_id("12345678-9").is_ok());
        assert!(validate_national_id("7654321-K").is_ok());
        assert!(validate_national_id("1-9").is_ok());
    }

    #[test]
    fn test_invalid_national_ids() {
        assert!(validate_national_id("").is_err());
        assert!(validate_national_id("12345678").is_err()); // no check separator
        assert!(validate_national_id("12.345.678-9").is_err()); // not canonical
        assert!(validate_national_id("12345678-99").is_err()); // two check chars
        assert!(validate_national_id("1234a678-9").is_err());
        assert!(validate_national_id("12345678-k").is_err()); // lowercase check
        assert!(validate_national_id("1234567890123-9").is_err()); // too long
    }

    #[test]
    fn test_scan_codes() {
        assert!(validate_scan_code("FP-12345678-9").is_ok());
        assert!(validate_scan_code("12345678-9").is_err()); // missing prefix
        assert!(validate_scan_code("FP-12.345.678-9").is_err());
        assert!(validate_scan_code("").is_err());
    }

    #[test]
    fn test_rates_must_be_non_negative() {
        let mut rates = RateTable {
            breakfast: Money::from_pesos(3500),
            lunch: Money::from_pesos(4500),
            dinner: Money::from_pesos(4000),
            snack: Money::zero(),
            enhanced: Money::from_pesos(5500),
        };
        assert!(validate_rates(&rates).is_ok());

        rates.dinner = Money::from_pesos(-1);
        let err = validate_rates(&rates).unwrap_err();
        assert!(matches!(err, ValidationError::OutOfRange { ref field, .. } if field == "dinner"));
    }
}
