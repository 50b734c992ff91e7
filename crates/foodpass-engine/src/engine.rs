//! # Registration Engine
//!
//! The state machine that turns one scan into one outcome.
//!
//! ## Pipeline
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  Idle ─► Normalizing ─► Resolving ─► EligibilityCheck                   │
//! │                             │               │                           │
//! │                       none ─┴─► Rejected    ├─► Rejected(Inactive)      │
//! │                        (PersonNotFound)     ▼                           │
//! │                              PeriodDetermination ─► DuplicateCheck      │
//! │                                                          │              │
//! │                                         found ───────────┴─► Already-   │
//! │                                                               Registered│
//! │                                                          ▼              │
//! │                              PricingComputation ─► resolve acting user  │
//! │                                                          │              │
//! │                                       no active user ────┴─► Rejected   │
//! │                                                          ▼ (NoOperator) │
//! │                                                     Persisting          │
//! │                                                     │        │          │
//! │                                          conflict ──┘        └─► Success│
//! │                                     (AlreadyRegistered)                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Persisting is the only step with a side effect, and it fires only after
//! every prior check passes. There is no partial-success state.
//!
//! ## Concurrency
//! Two near-simultaneous scans of the same worker for the same meal must not
//! both succeed. The engine holds no lock across the check-then-act sequence;
//! the duplicate check is a fast path only, and correctness is delegated to
//! the ledger's (worker, period, day) uniqueness constraint. A constraint
//! conflict raised at insert time is translated into AlreadyRegistered - it
//! is a race lost, not a storage fault.
//!
//! ## Timeouts
//! Every store call runs under a bounded timeout. An elapsed timeout or any
//! unmodeled storage fault becomes Rejected(StorageUnavailable); since all
//! pre-persist steps are side-effect free, the caller may retry the whole
//! registration from the raw input.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use chrono::{NaiveDateTime, NaiveTime};
use tokio::time::timeout;
use tracing::{debug, info, warn};

use foodpass_core::clock::meal_period_at;
use foodpass_core::pricing::price;
use foodpass_core::scan::normalize_scan;
use foodpass_core::{NewConsumption, User};

use crate::outcome::{RegistrationOutcome, RejectKind};
use crate::resolver;
use crate::store::{IdentityStore, LedgerError, LedgerStore, StoreError, StoreResult, WorkerStore};

/// Default bound on any single storage interaction.
pub const DEFAULT_STORAGE_TIMEOUT: Duration = Duration::from_secs(5);

/// The consumption registration engine.
///
/// Cheap to share: stores are behind `Arc`s and `register` takes `&self`,
/// so one engine serves all concurrent scan handlers.
pub struct RegistrationEngine {
    workers: Arc<dyn WorkerStore>,
    ledger: Arc<dyn LedgerStore>,
    identity: Arc<dyn IdentityStore>,
    storage_timeout: Duration,
}

impl RegistrationEngine {
    pub fn new(
        workers: Arc<dyn WorkerStore>,
        ledger: Arc<dyn LedgerStore>,
        identity: Arc<dyn IdentityStore>,
    ) -> Self {
        RegistrationEngine {
            workers,
            ledger,
            identity,
            storage_timeout: DEFAULT_STORAGE_TIMEOUT,
        }
    }

    /// Sets the bound on each storage interaction.
    pub fn storage_timeout(mut self, timeout: Duration) -> Self {
        self.storage_timeout = timeout;
        self
    }

    /// Registers one scan.
    ///
    /// ## Arguments
    /// * `raw_input` - decoded scanner text, exactly as delivered
    /// * `enhanced` - the operator's enhanced-meal toggle for this scan
    /// * `dining_hall_id` - the serving location selected upstream
    /// * `acting_user_id` - the session's user, if any; a stale id falls
    ///   back to an active user rather than failing the registration
    /// * `now` - local wall-clock time of the scan (callers pass
    ///   `Local::now().naive_local()`); drives both the meal period and the
    ///   calendar-day duplicate window
    ///
    /// Never returns an error: every failure mode is a typed outcome.
    pub async fn register(
        &self,
        raw_input: &str,
        enhanced: bool,
        dining_hall_id: &str,
        acting_user_id: Option<&str>,
        now: NaiveDateTime,
    ) -> RegistrationOutcome {
        match self
            .try_register(raw_input, enhanced, dining_hall_id, acting_user_id, now)
            .await
        {
            Ok(outcome) => outcome,
            Err(err) => {
                warn!(error = %err, "registration failed on storage");
                RegistrationOutcome::rejected(RejectKind::StorageUnavailable, err.to_string())
            }
        }
    }

    async fn try_register(
        &self,
        raw_input: &str,
        enhanced: bool,
        dining_hall_id: &str,
        acting_user_id: Option<&str>,
        now: NaiveDateTime,
    ) -> StoreResult<RegistrationOutcome> {
        // Normalizing: pure, never fails.
        let candidate = normalize_scan(raw_input);
        debug!(raw = raw_input, candidate = %candidate, "processing scan");

        // Resolving.
        let Some(profile) = self
            .guarded(resolver::resolve(self.workers.as_ref(), &candidate))
            .await?
        else {
            info!(raw = raw_input, "scan did not resolve to a worker");
            return Ok(RegistrationOutcome::rejected(
                RejectKind::PersonNotFound,
                format!(
                    "Person not found (scanned: {}). Check that they are registered.",
                    raw_input.trim()
                ),
            ));
        };

        // EligibilityCheck: worker AND employer must be active.
        if !profile.is_eligible() {
            info!(worker = %profile.worker.id, "worker or company inactive");
            return Ok(RegistrationOutcome::rejected(
                RejectKind::Inactive,
                format!(
                    "{} or their company is inactive in the system",
                    profile.worker.name
                ),
            ));
        }

        // PeriodDetermination: pure.
        let period = meal_period_at(now);

        // DuplicateCheck: fast path over today's local-day window. The
        // ledger constraint at insert time is the real guarantee.
        let day = now.date();
        let day_start = day.and_time(NaiveTime::MIN);
        let day_end = day.and_time(
            NaiveTime::from_hms_milli_opt(23, 59, 59, 999).expect("23:59:59.999 is a valid time"),
        );

        let duplicate = self
            .guarded(
                self.ledger
                    .exists(&profile.worker.id, period, day_start, day_end),
            )
            .await?;
        if duplicate {
            info!(worker = %profile.worker.id, %period, "already registered today");
            return Ok(RegistrationOutcome::AlreadyRegistered {
                worker: profile,
                period,
            });
        }

        // PricingComputation: pure, from the employer's current rates.
        let cost = price(&profile.company.rates, period, enhanced);

        // Resolve the acting user for audit attribution.
        let user = match self.resolve_acting_user(acting_user_id).await? {
            Some(user) => user,
            None => {
                warn!("no active user available to attribute the registration");
                return Ok(RegistrationOutcome::rejected(
                    RejectKind::NoOperator,
                    "No active users in the system to attribute the registration",
                ));
            }
        };

        // Persisting: the only side effect, after all checks passed.
        let record = NewConsumption {
            worker_id: profile.worker.id.clone(),
            company_id: profile.company.id.clone(),
            dining_hall_id: dining_hall_id.to_string(),
            user_id: user.id.clone(),
            period,
            enhanced,
            cost,
            registered_at: now,
            day,
        };

        let inserted = match timeout(self.storage_timeout, self.ledger.insert(record)).await {
            Err(_) => {
                return Err(StoreError::Unavailable(format!(
                    "ledger write exceeded {:?}",
                    self.storage_timeout
                )))
            }
            Ok(Err(LedgerError::Conflict)) => {
                // Lost the race to a concurrent scan of the same worker:
                // same outcome as the fast-path duplicate, never an error.
                info!(worker = %profile.worker.id, %period, "concurrent duplicate detected on insert");
                return Ok(RegistrationOutcome::AlreadyRegistered {
                    worker: profile,
                    period,
                });
            }
            Ok(Err(LedgerError::Store(err))) => return Err(err),
            Ok(Ok(consumption)) => consumption,
        };

        info!(
            consumption = %inserted.id,
            worker = %profile.worker.id,
            %period,
            enhanced,
            cost = %cost,
            "consumption registered"
        );

        Ok(RegistrationOutcome::Success {
            worker: profile,
            period,
            enhanced,
            cost,
        })
    }

    /// The session's user if it still exists, otherwise any active user
    /// (most privileged role first). `None` means the system has no active
    /// user at all.
    async fn resolve_acting_user(
        &self,
        acting_user_id: Option<&str>,
    ) -> StoreResult<Option<User>> {
        if let Some(id) = acting_user_id {
            if let Some(user) = self.guarded(self.identity.find_by_id(id)).await? {
                return Ok(Some(user));
            }
            debug!(user = id, "acting user not found, falling back");
        }

        self.guarded(self.identity.find_one_active()).await
    }

    /// Bounds a store call; an elapsed timeout is a transient storage fault.
    async fn guarded<T>(&self, fut: impl Future<Output = StoreResult<T>>) -> StoreResult<T> {
        match timeout(self.storage_timeout, fut).await {
            Ok(result) => result,
            Err(_) => Err(StoreError::Unavailable(format!(
                "storage call exceeded {:?}",
                self.storage_timeout
            ))),
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use chrono::{NaiveDate, Utc};

    use foodpass_core::{
        Company, Consumption, MealPeriod, Money, RateTable, UserRole, Worker, WorkerProfile,
    };

    use crate::memory::{MemoryIdentity, MemoryLedger, MemoryWorkerStore, DEFAULT_RATES};

    fn profile(
        id: &str,
        rut: &str,
        scan_code: &str,
        rates: RateTable,
        worker_active: bool,
        company_active: bool,
    ) -> WorkerProfile {
        let now = Utc::now();
        WorkerProfile {
            worker: Worker {
                id: id.to_string(),
                name: format!("Worker {id}"),
                rut: rut.to_string(),
                scan_code: scan_code.to_string(),
                company_id: format!("company-{id}"),
                department: "General".to_string(),
                is_active: worker_active,
                created_at: now,
            },
            company: Company {
                id: format!("company-{id}"),
                name: format!("Company of {id}"),
                rut: "76123456-7".to_string(),
                contact_email: "billing@example.cl".to_string(),
                rates,
                is_active: company_active,
                created_at: now,
            },
        }
    }

    struct Harness {
        engine: Arc<RegistrationEngine>,
        ledger: Arc<MemoryLedger>,
    }

    fn harness(profiles: Vec<WorkerProfile>, identity: MemoryIdentity) -> Harness {
        let ledger = Arc::new(MemoryLedger::new());
        let engine = Arc::new(RegistrationEngine::new(
            Arc::new(MemoryWorkerStore::new(profiles)),
            ledger.clone(),
            Arc::new(identity),
        ));
        Harness { engine, ledger }
    }

    fn default_identity() -> MemoryIdentity {
        MemoryIdentity::with_users(vec![
            ("adm-1", UserRole::Admin, true),
            ("op-1", UserRole::Operator, true),
        ])
    }

    fn at(day: (i32, u32, u32), h: u32, m: u32, s: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(day.0, day.1, day.2)
            .unwrap()
            .and_hms_opt(h, m, s)
            .unwrap()
    }

    #[tokio::test]
    async fn test_end_to_end_scenario() {
        // Worker with the standard rates, plus a second worker whose lunch
        // rate is deliberately absurd to prove the enhanced override.
        let mut odd_rates = DEFAULT_RATES;
        odd_rates.lunch = Money::from_pesos(99_999);

        let h = harness(
            vec![
                profile("w-1", "12345678-9", "FP-12345678-9", DEFAULT_RATES, true, true),
                profile("w-2", "98765432-1", "FP-98765432-1", odd_rates, true, true),
            ],
            default_identity(),
        );

        // Dotted RUT scan at 12:30 on an empty ledger: lunch at 4500.
        let outcome = h
            .engine
            .register("12.345.678-9", false, "hall-1", None, at((2026, 8, 25), 12, 30, 0))
            .await;
        match outcome {
            RegistrationOutcome::Success {
                worker,
                period,
                enhanced,
                cost,
            } => {
                assert_eq!(worker.worker.id, "w-1");
                assert_eq!(period, MealPeriod::Lunch);
                assert!(!enhanced);
                assert_eq!(cost.pesos(), 4500);
            }
            other => panic!("expected success, got {other:?}"),
        }

        // Identical scan at 12:45: already registered for lunch.
        let outcome = h
            .engine
            .register("12.345.678-9", false, "hall-1", None, at((2026, 8, 25), 12, 45, 0))
            .await;
        match outcome {
            RegistrationOutcome::AlreadyRegistered { worker, period } => {
                assert_eq!(worker.worker.id, "w-1");
                assert_eq!(period, MealPeriod::Lunch);
            }
            other => panic!("expected already registered, got {other:?}"),
        }

        // Enhanced scan for the other worker at 12:50: enhanced rate wins
        // over the 99.999 lunch rate.
        let outcome = h
            .engine
            .register("98.765.432-1", true, "hall-1", None, at((2026, 8, 25), 12, 50, 0))
            .await;
        match outcome {
            RegistrationOutcome::Success { cost, enhanced, .. } => {
                assert!(enhanced);
                assert_eq!(cost.pesos(), 5500);
            }
            other => panic!("expected success, got {other:?}"),
        }

        assert_eq!(h.ledger.records().await.len(), 2);
    }

    #[tokio::test]
    async fn test_duplicate_window_resets_at_midnight() {
        let h = harness(
            vec![profile("w-1", "12345678-9", "FP-12345678-9", DEFAULT_RATES, true, true)],
            default_identity(),
        );

        // Dinner just before midnight, then dinner just after: two different
        // calendar days, two registrations. Matches production behavior for
        // shifts spanning midnight.
        let first = h
            .engine
            .register("12345678-9", false, "hall-1", None, at((2026, 8, 25), 23, 59, 59))
            .await;
        assert!(first.is_success());

        let second = h
            .engine
            .register("12345678-9", false, "hall-1", None, at((2026, 8, 26), 0, 0, 1))
            .await;
        assert!(second.is_success());
    }

    #[tokio::test]
    async fn test_not_found_reports_raw_input() {
        let h = harness(vec![], default_identity());

        let outcome = h
            .engine
            .register("  55.555.555-5 ", false, "hall-1", None, at((2026, 8, 25), 12, 0, 0))
            .await;
        match outcome {
            RegistrationOutcome::Rejected { kind, message } => {
                assert_eq!(kind, RejectKind::PersonNotFound);
                assert!(message.contains("55.555.555-5"), "message: {message}");
            }
            other => panic!("expected rejection, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_inactive_employer_blocks_active_worker() {
        let h = harness(
            vec![profile("w-1", "12345678-9", "FP-12345678-9", DEFAULT_RATES, true, false)],
            default_identity(),
        );

        let outcome = h
            .engine
            .register("12345678-9", false, "hall-1", None, at((2026, 8, 25), 12, 0, 0))
            .await;
        match outcome {
            RegistrationOutcome::Rejected { kind, .. } => assert_eq!(kind, RejectKind::Inactive),
            other => panic!("expected inactive rejection, got {other:?}"),
        }
        assert!(h.ledger.records().await.is_empty());
    }

    #[tokio::test]
    async fn test_inactive_worker_is_blocked() {
        let h = harness(
            vec![profile("w-1", "12345678-9", "FP-12345678-9", DEFAULT_RATES, false, true)],
            default_identity(),
        );

        let outcome = h
            .engine
            .register("12345678-9", false, "hall-1", None, at((2026, 8, 25), 8, 0, 0))
            .await;
        match outcome {
            RegistrationOutcome::Rejected { kind, .. } => assert_eq!(kind, RejectKind::Inactive),
            other => panic!("expected inactive rejection, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_no_operator_is_a_hard_fail() {
        let h = harness(
            vec![profile("w-1", "12345678-9", "FP-12345678-9", DEFAULT_RATES, true, true)],
            MemoryIdentity::empty(),
        );

        let outcome = h
            .engine
            .register("12345678-9", false, "hall-1", None, at((2026, 8, 25), 12, 0, 0))
            .await;
        match outcome {
            RegistrationOutcome::Rejected { kind, .. } => assert_eq!(kind, RejectKind::NoOperator),
            other => panic!("expected no-operator rejection, got {other:?}"),
        }
        assert!(h.ledger.records().await.is_empty());
    }

    #[tokio::test]
    async fn test_stale_acting_user_falls_back_to_admin() {
        let h = harness(
            vec![profile("w-1", "12345678-9", "FP-12345678-9", DEFAULT_RATES, true, true)],
            default_identity(),
        );

        let outcome = h
            .engine
            .register(
                "12345678-9",
                false,
                "hall-1",
                Some("ghost-session-user"),
                at((2026, 8, 25), 12, 0, 0),
            )
            .await;
        assert!(outcome.is_success());

        let records = h.ledger.records().await;
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].user_id, "adm-1");
    }

    #[tokio::test]
    async fn test_valid_acting_user_is_kept() {
        let h = harness(
            vec![profile("w-1", "12345678-9", "FP-12345678-9", DEFAULT_RATES, true, true)],
            default_identity(),
        );

        let outcome = h
            .engine
            .register("12345678-9", false, "hall-1", Some("op-1"), at((2026, 8, 25), 12, 0, 0))
            .await;
        assert!(outcome.is_success());

        let records = h.ledger.records().await;
        assert_eq!(records[0].user_id, "op-1");
        assert_eq!(records[0].dining_hall_id, "hall-1");
        assert_eq!(records[0].company_id, "company-w-1");
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_duplicate_scans_yield_one_success() {
        let h = harness(
            vec![profile("w-1", "12345678-9", "FP-12345678-9", DEFAULT_RATES, true, true)],
            default_identity(),
        );

        let now = at((2026, 8, 25), 12, 30, 0);
        let mut handles = Vec::new();
        for _ in 0..8 {
            let engine = h.engine.clone();
            handles.push(tokio::spawn(async move {
                engine
                    .register("FP-12345678-9", false, "hall-1", None, now)
                    .await
            }));
        }

        let mut successes = 0;
        let mut duplicates = 0;
        for handle in handles {
            match handle.await.unwrap() {
                RegistrationOutcome::Success { .. } => successes += 1,
                RegistrationOutcome::AlreadyRegistered { .. } => duplicates += 1,
                other => panic!("unexpected outcome: {other:?}"),
            }
        }

        assert_eq!(successes, 1);
        assert_eq!(duplicates, 7);
        assert_eq!(h.ledger.records().await.len(), 1);
    }

    // A ledger that never answers in time.
    struct StalledLedger;

    #[async_trait]
    impl LedgerStore for StalledLedger {
        async fn exists(
            &self,
            _worker_id: &str,
            _period: MealPeriod,
            _day_start: NaiveDateTime,
            _day_end: NaiveDateTime,
        ) -> StoreResult<bool> {
            tokio::time::sleep(Duration::from_secs(60)).await;
            Ok(false)
        }

        async fn insert(&self, _record: NewConsumption) -> Result<Consumption, LedgerError> {
            tokio::time::sleep(Duration::from_secs(60)).await;
            Err(LedgerError::Conflict)
        }
    }

    #[tokio::test]
    async fn test_storage_timeout_is_a_transient_rejection() {
        let engine = RegistrationEngine::new(
            Arc::new(MemoryWorkerStore::with_workers(vec![(
                "w-1",
                "12345678-9",
                "FP-12345678-9",
                true,
                true,
            )])),
            Arc::new(StalledLedger),
            Arc::new(default_identity()),
        )
        .storage_timeout(Duration::from_millis(20));

        let outcome = engine
            .register("12345678-9", false, "hall-1", None, at((2026, 8, 25), 12, 0, 0))
            .await;
        match outcome {
            RegistrationOutcome::Rejected { kind, .. } => {
                assert_eq!(kind, RejectKind::StorageUnavailable)
            }
            other => panic!("expected storage rejection, got {other:?}"),
        }
    }
}
