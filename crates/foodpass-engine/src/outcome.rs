//! # Registration Outcomes
//!
//! Typed results of a `register` call.
//!
//! ## Taxonomy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Outcome              Meaning                            Retryable?     │
//! │  ──────────────────   ────────────────────────────────   ────────────   │
//! │  Success              ledger record written              n/a            │
//! │  AlreadyRegistered    duplicate scan, NOT an error       no             │
//! │  Rejected                                                               │
//! │    PersonNotFound     identifier resolved to nobody      rescan         │
//! │    Inactive           worker or employer disabled        admin action   │
//! │    NoOperator         no active user to attribute to     config fault   │
//! │    StorageUnavailable transient storage fault            yes, whole op  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Callers pattern-match on the variants and kinds; the `message` strings
//! are for display and logging only, never for control flow.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use foodpass_core::{MealPeriod, Money, WorkerProfile};

/// Why a registration attempt was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RejectKind {
    /// Identifier did not resolve after all cascades. Operator-recoverable.
    PersonNotFound,

    /// Worker resolved but the worker or their employer is disabled.
    /// Distinct from PersonNotFound so operators can tell "unknown" from
    /// "blocked".
    Inactive,

    /// No active user exists to attribute the record to. A configuration
    /// fault - the engine never fabricates an identity.
    NoOperator,

    /// Storage did not answer in time or failed unexpectedly. The whole
    /// operation is safe to retry from the raw input.
    StorageUnavailable,
}

/// The result of one registration attempt.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(tag = "status", rename_all = "camelCase")]
pub enum RegistrationOutcome {
    /// A consumption record was written.
    #[serde(rename_all = "camelCase")]
    Success {
        worker: WorkerProfile,
        period: MealPeriod,
        enhanced: bool,
        cost: Money,
    },

    /// The worker already has a record for this period today. Carries the
    /// resolved worker and period so the operator sees whose record it is.
    #[serde(rename_all = "camelCase")]
    AlreadyRegistered {
        worker: WorkerProfile,
        period: MealPeriod,
    },

    /// Nothing was written.
    #[serde(rename_all = "camelCase")]
    Rejected { kind: RejectKind, message: String },
}

impl RegistrationOutcome {
    /// Shorthand for a rejection.
    pub fn rejected(kind: RejectKind, message: impl Into<String>) -> Self {
        RegistrationOutcome::Rejected {
            kind,
            message: message.into(),
        }
    }

    /// True only for [`RegistrationOutcome::Success`].
    pub fn is_success(&self) -> bool {
        matches!(self, RegistrationOutcome::Success { .. })
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejected_shorthand() {
        let outcome = RegistrationOutcome::rejected(RejectKind::PersonNotFound, "not found");
        assert!(!outcome.is_success());
        match outcome {
            RegistrationOutcome::Rejected { kind, message } => {
                assert_eq!(kind, RejectKind::PersonNotFound);
                assert_eq!(message, "not found");
            }
            other => panic!("unexpected outcome: {other:?}"),
        }
    }

    #[test]
    fn test_serialized_shape_is_tagged() {
        let outcome = RegistrationOutcome::rejected(RejectKind::StorageUnavailable, "timeout");
        let json = serde_json::to_value(&outcome).unwrap();
        assert_eq!(json["status"], "rejected");
        assert_eq!(json["kind"], "STORAGE_UNAVAILABLE");
    }
}
