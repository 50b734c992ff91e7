//! # Store Traits
//!
//! The collaborator seam between the registration engine and storage.
//!
//! ## Design
//! The engine never owns persistence. It consumes three narrow, object-safe
//! async traits; `foodpass-db` implements them over SQLite, [`crate::memory`]
//! implements them over hash maps for tests. Only the ledger is ever written
//! by the engine - workers, companies and users are read-only here and are
//! mutated by administrative flows elsewhere.
//!
//! ## Error Model
//! Anything a store cannot express as data collapses into
//! [`StoreError::Unavailable`]: the engine treats every unmodeled storage
//! fault as transient and safe to retry. The single exception is the ledger
//! uniqueness constraint, which must surface as [`LedgerError::Conflict`] so
//! the engine can translate it into an AlreadyRegistered outcome instead of
//! a storage failure.

use async_trait::async_trait;
use chrono::NaiveDateTime;
use thiserror::Error;

use foodpass_core::{Consumption, MealPeriod, NewConsumption, User, WorkerProfile};

/// Storage faults not otherwise modeled. Always retryable.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Storage unavailable: {0}")]
    Unavailable(String),
}

/// Result type for read-side store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Ledger write failures.
#[derive(Debug, Error)]
pub enum LedgerError {
    /// The (worker, period, day) uniqueness constraint fired: a concurrent
    /// or earlier registration won. Not a fault.
    #[error("Consumption already recorded for this worker, period and day")]
    Conflict,

    /// Any other storage failure.
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Read access to workers, always employer-joined.
///
/// Implementations must return fresh data on every call: active flags and
/// rate tables are mutated by administrative flows and must never be served
/// from a cache (a rate change applies to the very next scan).
#[async_trait]
pub trait WorkerStore: Send + Sync {
    /// Exact match on the stored badge scan code.
    async fn find_by_scan_code(&self, code: &str) -> StoreResult<Option<WorkerProfile>>;

    /// Exact match on the stored national id.
    async fn find_by_national_id(&self, code: &str) -> StoreResult<Option<WorkerProfile>>;

    /// All workers whose stripped national id or scan code contains `prefix`.
    /// Candidates only - the resolver re-verifies every hit.
    async fn search_by_prefix(&self, prefix: &str) -> StoreResult<Vec<WorkerProfile>>;
}

/// The append-only consumption ledger.
#[async_trait]
pub trait LedgerStore: Send + Sync {
    /// Fast-path duplicate probe: is there a record for this worker and
    /// period with `registered_at` inside `[day_start, day_end]`?
    async fn exists(
        &self,
        worker_id: &str,
        period: MealPeriod,
        day_start: NaiveDateTime,
        day_end: NaiveDateTime,
    ) -> StoreResult<bool>;

    /// Appends a record. The store assigns the id and enforces the
    /// (worker, period, day) uniqueness constraint - this, not [`Self::exists`],
    /// is the correctness mechanism under concurrency.
    async fn insert(&self, record: NewConsumption) -> Result<Consumption, LedgerError>;
}

/// Read access to operator accounts, for audit attribution.
#[async_trait]
pub trait IdentityStore: Send + Sync {
    /// Looks up a user by id (active or not - existence is what matters
    /// for attributing a registration to the session's user).
    async fn find_by_id(&self, user_id: &str) -> StoreResult<Option<User>>;

    /// Any active user, most privileged role first (Admin before Supervisor
    /// before Operator), deterministic tie-break. `None` only when the
    /// system has no active user at all.
    async fn find_one_active(&self) -> StoreResult<Option<User>>;
}
