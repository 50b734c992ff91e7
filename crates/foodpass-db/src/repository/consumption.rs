//! # Consumption Repository
//!
//! The append-only ledger over SQLite.
//!
//! ## Concurrency Contract
//! The duplicate rule is enforced by the table's
//! `UNIQUE (worker_id, meal_period, day)` constraint, not by the
//! read-then-write in the engine. Two stations scanning the same badge at
//! the same instant both pass the engine's `exists` probe; whichever INSERT
//! commits second trips the constraint and comes back as
//! [`LedgerError::Conflict`], which the engine reports as already
//! registered. No transactions or locks needed.

use async_trait::async_trait;
use chrono::{NaiveDate, NaiveDateTime};
use sqlx::{FromRow, SqlitePool};
use tracing::debug;
use uuid::Uuid;

use foodpass_core::{Consumption, MealPeriod, Money, NewConsumption};
use foodpass_engine::{LedgerError, LedgerStore, StoreResult};

use crate::error::DbResult;

#[derive(Debug, FromRow)]
struct ConsumptionRow {
    id: String,
    worker_id: String,
    company_id: String,
    dining_hall_id: String,
    user_id: String,
    meal_period: MealPeriod,
    enhanced: bool,
    cost: Money,
    registered_at: NaiveDateTime,
    day: NaiveDate,
}

impl From<ConsumptionRow> for Consumption {
    fn from(row: ConsumptionRow) -> Self {
        Consumption {
            id: row.id,
            worker_id: row.worker_id,
            company_id: row.company_id,
            dining_hall_id: row.dining_hall_id,
            user_id: row.user_id,
            period: row.meal_period,
            enhanced: row.enhanced,
            cost: row.cost,
            registered_at: row.registered_at,
            day: row.day,
        }
    }
}

/// Repository for the consumption ledger.
#[derive(Debug, Clone)]
pub struct ConsumptionRepository {
    pool: SqlitePool,
}

impl ConsumptionRepository {
    pub fn new(pool: SqlitePool) -> Self {
        ConsumptionRepository { pool }
    }

    /// Appends a ledger record, assigning a fresh UUID.
    ///
    /// A UNIQUE violation on (worker, period, day) comes back as
    /// [`crate::DbError::UniqueViolation`]; the [`LedgerStore`] impl maps
    /// it to [`LedgerError::Conflict`].
    pub async fn append(&self, record: NewConsumption) -> DbResult<Consumption> {
        let id = Uuid::new_v4().to_string();

        sqlx::query(
            "INSERT INTO consumptions
                 (id, worker_id, company_id, dining_hall_id, user_id,
                  meal_period, enhanced, cost, registered_at, day)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
        )
        .bind(&id)
        .bind(&record.worker_id)
        .bind(&record.company_id)
        .bind(&record.dining_hall_id)
        .bind(&record.user_id)
        .bind(record.period)
        .bind(record.enhanced)
        .bind(record.cost)
        .bind(record.registered_at)
        .bind(record.day)
        .execute(&self.pool)
        .await?;

        debug!(
            consumption_id = %id,
            worker_id = %record.worker_id,
            period = %record.period,
            "Consumption recorded"
        );

        Ok(Consumption {
            id,
            worker_id: record.worker_id,
            company_id: record.company_id,
            dining_hall_id: record.dining_hall_id,
            user_id: record.user_id,
            period: record.period,
            enhanced: record.enhanced,
            cost: record.cost,
            registered_at: record.registered_at,
            day: record.day,
        })
    }

    /// Duplicate probe: any record for this worker and period registered
    /// inside `[day_start, day_end]`?
    ///
    /// ISO-8601 text timestamps compare lexicographically, so BETWEEN on
    /// the TEXT column is a correct range check.
    pub async fn exists_in_range(
        &self,
        worker_id: &str,
        period: MealPeriod,
        day_start: NaiveDateTime,
        day_end: NaiveDateTime,
    ) -> DbResult<bool> {
        let found: (i64,) = sqlx::query_as(
            "SELECT EXISTS (
                 SELECT 1 FROM consumptions
                  WHERE worker_id = ?1
                    AND meal_period = ?2
                    AND registered_at BETWEEN ?3 AND ?4
             )",
        )
        .bind(worker_id)
        .bind(period)
        .bind(day_start)
        .bind(day_end)
        .fetch_one(&self.pool)
        .await?;

        Ok(found.0 != 0)
    }

    /// All records for one calendar day, oldest first. Reporting and
    /// end-of-day reconciliation.
    pub async fn list_for_day(&self, day: NaiveDate) -> DbResult<Vec<Consumption>> {
        let rows: Vec<ConsumptionRow> = sqlx::query_as(
            "SELECT id, worker_id, company_id, dining_hall_id, user_id,
                    meal_period, enhanced, cost, registered_at, day
               FROM consumptions
              WHERE day = ?1
              ORDER BY registered_at",
        )
        .bind(day)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(Consumption::from).collect())
    }

    /// Total billed amount for one company over an inclusive day range.
    pub async fn company_total(
        &self,
        company_id: &str,
        from: NaiveDate,
        to: NaiveDate,
    ) -> DbResult<Money> {
        let total: (i64,) = sqlx::query_as(
            "SELECT COALESCE(SUM(cost), 0)
               FROM consumptions
              WHERE company_id = ?1 AND day BETWEEN ?2 AND ?3",
        )
        .bind(company_id)
        .bind(from)
        .bind(to)
        .fetch_one(&self.pool)
        .await?;

        Ok(Money::from_pesos(total.0))
    }
}

#[async_trait]
impl LedgerStore for ConsumptionRepository {
    async fn exists(
        &self,
        worker_id: &str,
        period: MealPeriod,
        day_start: NaiveDateTime,
        day_end: NaiveDateTime,
    ) -> StoreResult<bool> {
        Ok(self
            .exists_in_range(worker_id, period, day_start, day_end)
            .await?)
    }

    async fn insert(&self, record: NewConsumption) -> Result<Consumption, LedgerError> {
        Ok(self.append(record).await?)
    }
}
