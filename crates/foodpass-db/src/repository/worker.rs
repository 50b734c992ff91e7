//! # Worker Repository
//!
//! Worker lookups for the registration path, always employer-joined.
//!
//! ## Query Shape
//! Every read returns a [`WorkerProfile`] (worker + company) in one joined
//! query: the engine needs the company's active flag and rate table on
//! every single scan, and two round trips per scan would double the load
//! on the busiest path in the system.
//!
//! Rows are read fresh on every call - no caching - so administrative
//! changes (deactivations, rate updates) apply to the very next scan.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, SqlitePool};
use tracing::debug;

use foodpass_core::{validation, Company, Money, RateTable, Worker, WorkerProfile};
use foodpass_engine::{StoreResult, WorkerStore};

use crate::error::DbResult;

/// Worker row joined with its employer, as produced by [`PROFILE_SELECT`].
#[derive(Debug, FromRow)]
struct WorkerProfileRow {
    id: String,
    name: String,
    rut: String,
    scan_code: String,
    company_id: String,
    department: String,
    is_active: bool,
    created_at: DateTime<Utc>,

    c_id: String,
    c_name: String,
    c_rut: String,
    c_contact_email: String,
    cost_breakfast: Money,
    cost_lunch: Money,
    cost_dinner: Money,
    cost_snack: Money,
    cost_enhanced: Money,
    c_is_active: bool,
    c_created_at: DateTime<Utc>,
}

impl From<WorkerProfileRow> for WorkerProfile {
    fn from(row: WorkerProfileRow) -> Self {
        WorkerProfile {
            worker: Worker {
                id: row.id,
                name: row.name,
                rut: row.rut,
                scan_code: row.scan_code,
                company_id: row.company_id,
                department: row.department,
                is_active: row.is_active,
                created_at: row.created_at,
            },
            company: Company {
                id: row.c_id,
                name: row.c_name,
                rut: row.c_rut,
                contact_email: row.c_contact_email,
                rates: RateTable {
                    breakfast: row.cost_breakfast,
                    lunch: row.cost_lunch,
                    dinner: row.cost_dinner,
                    snack: row.cost_snack,
                    enhanced: row.cost_enhanced,
                },
                is_active: row.c_is_active,
                created_at: row.c_created_at,
            },
        }
    }
}

/// Shared SELECT clause for all profile reads.
const PROFILE_SELECT: &str = "
    SELECT w.id, w.name, w.rut, w.scan_code, w.company_id, w.department,
           w.is_active, w.created_at,
           c.id AS c_id, c.name AS c_name, c.rut AS c_rut,
           c.contact_email AS c_contact_email,
           c.cost_breakfast, c.cost_lunch, c.cost_dinner, c.cost_snack,
           c.cost_enhanced,
           c.is_active AS c_is_active, c.created_at AS c_created_at
      FROM workers w
      JOIN companies c ON c.id = w.company_id
";

/// Repository for worker and company data.
#[derive(Debug, Clone)]
pub struct WorkerRepository {
    pool: SqlitePool,
}

impl WorkerRepository {
    pub fn new(pool: SqlitePool) -> Self {
        WorkerRepository { pool }
    }

    /// Inserts a company. The caller supplies the id (UUID v4).
    pub async fn insert_company(&self, company: &Company) -> DbResult<()> {
        validation::validate_national_id(&company.rut)?;
        validation::validate_rates(&company.rates)?;

        sqlx::query(
            "INSERT INTO companies
                 (id, name, rut, contact_email,
                  cost_breakfast, cost_lunch, cost_dinner, cost_snack,
                  cost_enhanced, is_active, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
        )
        .bind(&company.id)
        .bind(&company.name)
        .bind(&company.rut)
        .bind(&company.contact_email)
        .bind(company.rates.breakfast)
        .bind(company.rates.lunch)
        .bind(company.rates.dinner)
        .bind(company.rates.snack)
        .bind(company.rates.enhanced)
        .bind(company.is_active)
        .bind(company.created_at)
        .execute(&self.pool)
        .await?;

        debug!(company_id = %company.id, "Company inserted");
        Ok(())
    }

    /// Inserts a worker. The caller supplies the id (UUID v4); the rut and
    /// scan code must already be in canonical form.
    pub async fn insert(&self, worker: &Worker) -> DbResult<()> {
        validation::validate_national_id(&worker.rut)?;
        validation::validate_scan_code(&worker.scan_code)?;

        sqlx::query(
            "INSERT INTO workers
                 (id, name, rut, scan_code, company_id, department,
                  is_active, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        )
        .bind(&worker.id)
        .bind(&worker.name)
        .bind(&worker.rut)
        .bind(&worker.scan_code)
        .bind(&worker.company_id)
        .bind(&worker.department)
        .bind(worker.is_active)
        .bind(worker.created_at)
        .execute(&self.pool)
        .await?;

        debug!(worker_id = %worker.id, rut = %worker.rut, "Worker inserted");
        Ok(())
    }

    /// Finds a worker by exact badge scan code.
    pub async fn get_by_scan_code(&self, code: &str) -> DbResult<Option<WorkerProfile>> {
        let sql = format!("{PROFILE_SELECT} WHERE w.scan_code = ?1");
        let row: Option<WorkerProfileRow> = sqlx::query_as(&sql)
            .bind(code)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(WorkerProfile::from))
    }

    /// Finds a worker by exact national id.
    pub async fn get_by_national_id(&self, rut: &str) -> DbResult<Option<WorkerProfile>> {
        let sql = format!("{PROFILE_SELECT} WHERE w.rut = ?1");
        let row: Option<WorkerProfileRow> = sqlx::query_as(&sql)
            .bind(rut)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(WorkerProfile::from))
    }

    /// All workers whose stripped rut or scan code contains `fragment`.
    ///
    /// Stripping (remove dots and hyphens, uppercase) happens in SQL so it
    /// matches [`foodpass_core::strip_code`] exactly; the resolver
    /// re-verifies every candidate, so over-matching here is harmless but
    /// under-matching would lose workers.
    pub async fn search_by_fragment(&self, fragment: &str) -> DbResult<Vec<WorkerProfile>> {
        let sql = format!(
            "{PROFILE_SELECT}
             WHERE instr(upper(replace(replace(w.rut, '.', ''), '-', '')), ?1) > 0
                OR instr(upper(replace(replace(w.scan_code, '.', ''), '-', '')), ?1) > 0"
        );
        let rows: Vec<WorkerProfileRow> = sqlx::query_as(&sql)
            .bind(fragment)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.into_iter().map(WorkerProfile::from).collect())
    }

    /// All workers of a company, for reporting.
    pub async fn list_by_company(&self, company_id: &str) -> DbResult<Vec<WorkerProfile>> {
        let sql = format!("{PROFILE_SELECT} WHERE w.company_id = ?1 ORDER BY w.name");
        let rows: Vec<WorkerProfileRow> = sqlx::query_as(&sql)
            .bind(company_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.into_iter().map(WorkerProfile::from).collect())
    }
}

#[async_trait]
impl WorkerStore for WorkerRepository {
    async fn find_by_scan_code(&self, code: &str) -> StoreResult<Option<WorkerProfile>> {
        Ok(self.get_by_scan_code(code).await?)
    }

    async fn find_by_national_id(&self, code: &str) -> StoreResult<Option<WorkerProfile>> {
        Ok(self.get_by_national_id(code).await?)
    }

    async fn search_by_prefix(&self, prefix: &str) -> StoreResult<Vec<WorkerProfile>> {
        Ok(self.search_by_fragment(prefix).await?)
    }
}
