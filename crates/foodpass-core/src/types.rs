//! # Domain Types
//!
//! Core domain types used throughout FoodPass.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │     Worker      │   │    Company      │   │   Consumption   │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  id (UUID)      │   │  id (UUID)      │   │  id (UUID)      │       │
//! │  │  rut (national) │   │  rates: Rate-   │   │  worker_id (FK) │       │
//! │  │  scan_code      │   │    Table        │   │  period + day   │       │
//! │  │  company_id     │   │  is_active      │   │  cost (frozen)  │       │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────┘       │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │   MealPeriod    │   │    UserRole     │   │   DiningHall    │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  Breakfast      │   │  Admin (0)      │   │  id, name       │       │
//! │  │  Lunch          │   │  Supervisor (1) │   │  location       │       │
//! │  │  Dinner         │   │  Operator (2)   │   │  capacity       │       │
//! │  │  Snack (manual) │   └─────────────────┘   └─────────────────┘       │
//! │  └─────────────────┘                                                    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Dual-Key Identity Pattern
//! A worker has three identities:
//! - `id`: UUID v4 - immutable, used for database relations
//! - `rut`: national id - unique, what people type or show on paper
//! - `scan_code`: badge payload (`FP-` prefixed) - unique, what the QR scanner emits

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::money::Money;

// =============================================================================
// Meal Period
// =============================================================================

/// One of the meal services offered at a dining hall.
///
/// Breakfast/Lunch/Dinner are assigned by the wall clock (see [`crate::clock`]).
/// `Snack` ("colación") exists in rate tables and in the ledger but is never
/// auto-assigned; it is only reachable through an explicit administrative
/// override outside the normal registration path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[ts(export)]
#[serde(rename_all = "lowercase")]
pub enum MealPeriod {
    Breakfast,
    Lunch,
    Dinner,
    Snack,
}

impl MealPeriod {
    /// Stable lowercase name, matching the stored representation.
    pub const fn as_str(&self) -> &'static str {
        match self {
            MealPeriod::Breakfast => "breakfast",
            MealPeriod::Lunch => "lunch",
            MealPeriod::Dinner => "dinner",
            MealPeriod::Snack => "snack",
        }
    }

    /// Display label for operator feedback.
    pub const fn label(&self) -> &'static str {
        match self {
            MealPeriod::Breakfast => "Breakfast",
            MealPeriod::Lunch => "Lunch",
            MealPeriod::Dinner => "Dinner",
            MealPeriod::Snack => "Snack",
        }
    }
}

impl std::fmt::Display for MealPeriod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// User Role
// =============================================================================

/// Role of an operator account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[ts(export)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    Admin,
    Supervisor,
    Operator,
}

impl UserRole {
    /// Fallback ordering when a registration must be attributed to *some*
    /// active user: lower sorts first, Admin is the most privileged.
    pub const fn priority(&self) -> u8 {
        match self {
            UserRole::Admin => 0,
            UserRole::Supervisor => 1,
            UserRole::Operator => 2,
        }
    }

    pub const fn as_str(&self) -> &'static str {
        match self {
            UserRole::Admin => "admin",
            UserRole::Supervisor => "supervisor",
            UserRole::Operator => "operator",
        }
    }
}

// =============================================================================
// Rate Table
// =============================================================================

/// Per-company meal rates, in whole pesos.
///
/// The `enhanced` rate is a manual override charged regardless of period
/// when the operator flags a consumption as enhanced ("mejorado").
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct RateTable {
    pub breakfast: Money,
    pub lunch: Money,
    pub dinner: Money,
    pub snack: Money,
    pub enhanced: Money,
}

impl RateTable {
    /// Returns the rate for a meal period (without the enhanced override;
    /// see [`crate::pricing::price`] for the full rule).
    pub const fn rate_for(&self, period: MealPeriod) -> Money {
        match period {
            MealPeriod::Breakfast => self.breakfast,
            MealPeriod::Lunch => self.lunch,
            MealPeriod::Dinner => self.dinner,
            MealPeriod::Snack => self.snack,
        }
    }
}

// =============================================================================
// Worker
// =============================================================================

/// A person eligible to eat at a dining hall.
///
/// Read-only to the registration engine; created and edited by the worker
/// management flows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Worker {
    /// Unique identifier (UUID v4).
    pub id: String,

    /// Display name.
    pub name: String,

    /// National id (RUT), canonical form: uppercase, dots stripped except
    /// the mandatory hyphen before the check digit, e.g. `12345678-9`.
    /// Unique across all workers.
    pub rut: String,

    /// Badge payload emitted by the QR scanner, e.g. `FP-12345678-9`.
    /// Unique across all workers; normalizes to the same identity as `rut`.
    pub scan_code: String,

    /// Employer this worker's meals are billed to.
    pub company_id: String,

    /// Free-form department label (reporting only).
    pub department: String,

    /// Inactive workers resolve but cannot register.
    pub is_active: bool,

    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

// =============================================================================
// Company
// =============================================================================

/// A client company: the billing and configuration entity.
///
/// An inactive company blocks registration for all its workers regardless
/// of the worker's own active flag.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Company {
    /// Unique identifier (UUID v4).
    pub id: String,

    /// Legal name.
    pub name: String,

    /// Company RUT.
    pub rut: String,

    /// Billing contact.
    pub contact_email: String,

    /// Current meal rates. Read fresh at every registration - never cached,
    /// so an administrative rate change applies to the next scan.
    pub rates: RateTable,

    pub is_active: bool,

    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

// =============================================================================
// Worker Profile (employer-joined read model)
// =============================================================================

/// A worker together with their employer, as returned by worker lookups.
///
/// The engine always needs both: eligibility checks the two active flags,
/// pricing reads the company rate table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct WorkerProfile {
    pub worker: Worker,
    pub company: Company,
}

impl WorkerProfile {
    /// Both the worker and their employer must be active to register.
    pub fn is_eligible(&self) -> bool {
        self.worker.is_active && self.company.is_active
    }
}

// =============================================================================
// Dining Hall
// =============================================================================

/// A physical serving location. Selection happens upstream of the engine;
/// the id is threaded through for the ledger record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct DiningHall {
    pub id: String,
    pub name: String,
    pub location: String,
    pub capacity: i64,
    pub is_active: bool,
}

// =============================================================================
// User
// =============================================================================

/// An operator account, attributed to each registration for audit purposes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct User {
    pub id: String,
    pub email: String,
    pub name: String,
    pub role: UserRole,
    pub is_active: bool,
}

// =============================================================================
// Consumption
// =============================================================================

/// An immutable audit/billing fact: one meal served to one worker.
///
/// ## Snapshot Pattern
/// `company_id` and `cost` are captured at registration time. Later rate
/// changes or worker transfers never rewrite history - corrections happen
/// by compensating records, not edits.
///
/// ## Uniqueness
/// At most one record per (worker, meal period, calendar day). The `day`
/// column is the day key the storage constraint is built on.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Consumption {
    pub id: String,
    pub worker_id: String,
    pub company_id: String,
    pub dining_hall_id: String,
    pub user_id: String,
    pub period: MealPeriod,
    pub enhanced: bool,
    pub cost: Money,
    /// Local wall-clock time of the scan.
    #[ts(as = "String")]
    pub registered_at: NaiveDateTime,
    /// Local calendar day of the scan, the duplicate-check key.
    #[ts(as = "String")]
    pub day: NaiveDate,
}

/// Insert payload for a new ledger record; the store assigns the id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct NewConsumption {
    pub worker_id: String,
    pub company_id: String,
    pub dining_hall_id: String,
    pub user_id: String,
    pub period: MealPeriod,
    pub enhanced: bool,
    pub cost: Money,
    #[ts(as = "String")]
    pub registered_at: NaiveDateTime,
    #[ts(as = "String")]
    pub day: NaiveDate,
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_meal_period_as_str() {
        assert_eq!(MealPeriod::Breakfast.as_str(), "breakfast");
        assert_eq!(MealPeriod::Snack.as_str(), "snack");
        assert_eq!(MealPeriod::Lunch.to_string(), "lunch");
    }

    #[test]
    fn test_role_priority_ordering() {
        assert!(UserRole::Admin.priority() < UserRole::Supervisor.priority());
        assert!(UserRole::Supervisor.priority() < UserRole::Operator.priority());
    }

    #[test]
    fn test_rate_table_lookup() {
        let rates = RateTable {
            breakfast: Money::from_pesos(3500),
            lunch: Money::from_pesos(4500),
            dinner: Money::from_pesos(4000),
            snack: Money::from_pesos(2000),
            enhanced: Money::from_pesos(5500),
        };

        assert_eq!(rates.rate_for(MealPeriod::Breakfast).pesos(), 3500);
        assert_eq!(rates.rate_for(MealPeriod::Snack).pesos(), 2000);
    }

    #[test]
    fn test_eligibility_requires_both_flags() {
        let mut profile = sample_profile();
        assert!(profile.is_eligible());

        profile.company.is_active = false;
        assert!(!profile.is_eligible());

        profile.company.is_active = true;
        profile.worker.is_active = false;
        assert!(!profile.is_eligible());
    }

    fn sample_profile() -> WorkerProfile {
        let now = Utc::now();
        WorkerProfile {
            worker: Worker {
                id: "w-1".to_string(),
                name: "Juan Pérez".to_string(),
                rut: "12345678-9".to_string(),
                scan_code: "FP-12345678-9".to_string(),
                company_id: "c-1".to_string(),
                department: "Construcción".to_string(),
                is_active: true,
                created_at: now,
            },
            company: Company {
                id: "c-1".to_string(),
                name: "Empresa Constructora A".to_string(),
                rut: "76123456-7".to_string(),
                contact_email: "contacto@constructora-a.cl".to_string(),
                rates: RateTable {
                    breakfast: Money::from_pesos(3500),
                    lunch: Money::from_pesos(4500),
                    dinner: Money::from_pesos(4000),
                    snack: Money::from_pesos(2000),
                    enhanced: Money::from_pesos(5500),
                },
                is_active: true,
                created_at: now,
            },
        }
    }
}
