//! # In-Memory Stores
//!
//! Hash-map implementations of the store traits, for tests and database-less
//! harnesses.
//!
//! These are not toys: [`MemoryLedger`] enforces the same
//! (worker, period, day) uniqueness rule the SQLite schema does and raises a
//! real [`LedgerError::Conflict`], so engine tests exercise the exact
//! conflict-translation path production hits under concurrent scans.

use std::collections::HashSet;
use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use chrono::{NaiveDate, NaiveDateTime, Utc};
use tokio::sync::Mutex;

use foodpass_core::{
    Company, Consumption, MealPeriod, Money, NewConsumption, RateTable, User, UserRole, Worker,
    WorkerProfile,
};

use crate::store::{
    IdentityStore, LedgerError, LedgerStore, StoreResult, WorkerStore,
};

/// Rate table used by [`MemoryWorkerStore::with_workers`] shortcuts.
pub const DEFAULT_RATES: RateTable = RateTable {
    breakfast: Money::from_pesos(3500),
    lunch: Money::from_pesos(4500),
    dinner: Money::from_pesos(4000),
    snack: Money::from_pesos(2000),
    enhanced: Money::from_pesos(5500),
};

// =============================================================================
// Worker Store
// =============================================================================

/// A fixed set of employer-joined workers.
pub struct MemoryWorkerStore {
    profiles: Vec<WorkerProfile>,
}

impl MemoryWorkerStore {
    pub fn new(profiles: Vec<WorkerProfile>) -> Self {
        MemoryWorkerStore { profiles }
    }

    /// Shortcut: builds one profile per `(id, rut, scan_code, worker_active,
    /// company_active)` spec, each with its own company and [`DEFAULT_RATES`].
    pub fn with_workers(specs: Vec<(&str, &str, &str, bool, bool)>) -> Self {
        let profiles = specs
            .into_iter()
            .map(|(id, rut, scan_code, worker_active, company_active)| {
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
                        rates: DEFAULT_RATES,
                        is_active: company_active,
                        created_at: now,
                    },
                }
            })
            .collect();
        MemoryWorkerStore::new(profiles)
    }
}

#[async_trait]
impl WorkerStore for MemoryWorkerStore {
    async fn find_by_scan_code(&self, code: &str) -> StoreResult<Option<WorkerProfile>> {
        Ok(self
            .profiles
            .iter()
            .find(|p| p.worker.scan_code == code)
            .cloned())
    }

    async fn find_by_national_id(&self, code: &str) -> StoreResult<Option<WorkerProfile>> {
        Ok(self.profiles.iter().find(|p| p.worker.rut == code).cloned())
    }

    async fn search_by_prefix(&self, prefix: &str) -> StoreResult<Vec<WorkerProfile>> {
        use foodpass_core::scan::strip_code;
        Ok(self
            .profiles
            .iter()
            .filter(|p| {
                strip_code(&p.worker.rut).contains(prefix)
                    || strip_code(&p.worker.scan_code).contains(prefix)
            })
            .cloned()
            .collect())
    }
}

// =============================================================================
// Ledger
// =============================================================================

#[derive(Default)]
struct LedgerInner {
    /// The uniqueness constraint: one entry per (worker, period, day).
    seen: HashSet<(String, MealPeriod, NaiveDate)>,
    records: Vec<Consumption>,
}

/// An append-only in-memory ledger with the production uniqueness rule.
#[derive(Default)]
pub struct MemoryLedger {
    inner: Mutex<LedgerInner>,
    seq: AtomicU64,
}

impl MemoryLedger {
    pub fn new() -> Self {
        MemoryLedger::default()
    }

    /// Snapshot of all records, in insertion order.
    pub async fn records(&self) -> Vec<Consumption> {
        self.inner.lock().await.records.clone()
    }
}

#[async_trait]
impl LedgerStore for MemoryLedger {
    async fn exists(
        &self,
        worker_id: &str,
        period: MealPeriod,
        day_start: NaiveDateTime,
        day_end: NaiveDateTime,
    ) -> StoreResult<bool> {
        let inner = self.inner.lock().await;
        Ok(inner.records.iter().any(|r| {
            r.worker_id == worker_id
                && r.period == period
                && r.registered_at >= day_start
                && r.registered_at <= day_end
        }))
    }

    async fn insert(&self, record: NewConsumption) -> Result<Consumption, LedgerError> {
        let mut inner = self.inner.lock().await;

        let key = (record.worker_id.clone(), record.period, record.day);
        if !inner.seen.insert(key) {
            return Err(LedgerError::Conflict);
        }

        let id = self.seq.fetch_add(1, Ordering::Relaxed);
        let stored = Consumption {
            id: format!("mem-{id:06}"),
            worker_id: record.worker_id,
            company_id: record.company_id,
            dining_hall_id: record.dining_hall_id,
            user_id: record.user_id,
            period: record.period,
            enhanced: record.enhanced,
            cost: record.cost,
            registered_at: record.registered_at,
            day: record.day,
        };
        inner.records.push(stored.clone());
        Ok(stored)
    }
}

// =============================================================================
// Identity Store
// =============================================================================

/// A fixed set of operator accounts.
pub struct MemoryIdentity {
    users: Vec<User>,
}

impl MemoryIdentity {
    pub fn new(users: Vec<User>) -> Self {
        MemoryIdentity { users }
    }

    /// No users at all - the NoOperator configuration fault.
    pub fn empty() -> Self {
        MemoryIdentity { users: Vec::new() }
    }

    /// Shortcut: builds one user per `(id, role, is_active)` spec.
    pub fn with_users(specs: Vec<(&str, UserRole, bool)>) -> Self {
        let users = specs
            .into_iter()
            .map(|(id, role, is_active)| User {
                id: id.to_string(),
                email: format!("{id}@foodpass.cl"),
                name: format!("User {id}"),
                role,
                is_active,
            })
            .collect();
        MemoryIdentity::new(users)
    }
}

#[async_trait]
impl IdentityStore for MemoryIdentity {
    async fn find_by_id(&self, user_id: &str) -> StoreResult<Option<User>> {
        Ok(self.users.iter().find(|u| u.id == user_id).cloned())
    }

    async fn find_one_active(&self) -> StoreResult<Option<User>> {
        let mut active: Vec<&User> = self.users.iter().filter(|u| u.is_active).collect();
        // Most privileged role first; id as the deterministic tie-break.
        active.sort_by(|a, b| {
            a.role
                .priority()
                .cmp(&b.role.priority())
                .then_with(|| a.id.cmp(&b.id))
        });
        Ok(active.first().map(|u| (*u).clone()))
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn new_record(worker: &str, period: MealPeriod, day: NaiveDate) -> NewConsumption {
        NewConsumption {
            worker_id: worker.to_string(),
            company_id: "c-1".to_string(),
            dining_hall_id: "h-1".to_string(),
            user_id: "u-1".to_string(),
            period,
            enhanced: false,
            cost: Money::from_pesos(4500),
            registered_at: day.and_hms_opt(12, 30, 0).unwrap(),
            day,
        }
    }

    #[tokio::test]
    async fn test_ledger_conflict_on_same_tuple() {
        let ledger = MemoryLedger::new();
        let day = NaiveDate::from_ymd_opt(2026, 8, 25).unwrap();

        ledger
            .insert(new_record("w-1", MealPeriod::Lunch, day))
            .await
            .unwrap();

        let err = ledger
            .insert(new_record("w-1", MealPeriod::Lunch, day))
            .await
            .unwrap_err();
        assert!(matches!(err, LedgerError::Conflict));

        // Different period or day is a different tuple.
        ledger
            .insert(new_record("w-1", MealPeriod::Dinner, day))
            .await
            .unwrap();
        ledger
            .insert(new_record(
                "w-1",
                MealPeriod::Lunch,
                day.succ_opt().unwrap(),
            ))
            .await
            .unwrap();

        assert_eq!(ledger.records().await.len(), 3);
    }

    #[tokio::test]
    async fn test_identity_fallback_prefers_admin() {
        let identity = MemoryIdentity::with_users(vec![
            ("op-1", UserRole::Operator, true),
            ("adm-1", UserRole::Admin, true),
            ("adm-0", UserRole::Admin, false),
        ]);

        let user = identity.find_one_active().await.unwrap().unwrap();
        assert_eq!(user.id, "adm-1");
    }

    #[tokio::test]
    async fn test_identity_empty_means_no_operator() {
        let identity = MemoryIdentity::empty();
        assert!(identity.find_one_active().await.unwrap().is_none());
    }
}
