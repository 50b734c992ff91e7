//! # foodpass-db: Database Layer for FoodPass
//!
//! SQLite persistence for the consumption registration system, built on sqlx.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        FoodPass Data Flow                               │
//! │                                                                         │
//! │  RegistrationEngine (foodpass-engine)                                  │
//! │       │  WorkerStore / LedgerStore / IdentityStore traits              │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                   foodpass-db (THIS CRATE)                      │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌───────────────┐    ┌──────────────┐  │   │
//! │  │   │   Database    │    │  Repositories │    │  Migrations  │  │   │
//! │  │   │   (pool.rs)   │    │  worker.rs    │    │  (embedded)  │  │   │
//! │  │   │               │    │  consumption  │    │              │  │   │
//! │  │   │ SqlitePool    │◄───│  user.rs      │    │ 001_init.sql │  │   │
//! │  │   │ WAL mode      │    │  dining_hall  │    │              │  │   │
//! │  │   └───────────────┘    └───────────────┘    └──────────────┘  │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  SQLite file (./data/foodpass.db), UNIQUE(worker, period, day)         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`pool`] - Connection pool creation and configuration
//! - [`migrations`] - Embedded database migrations
//! - [`error`] - Database error types
//! - [`repository`] - Repository implementations (worker, consumption, ...)
//!
//! ## Usage
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use foodpass_db::{Database, DbConfig};
//! use foodpass_engine::RegistrationEngine;
//!
//! let db = Database::new(DbConfig::new("./data/foodpass.db")).await?;
//! let engine = RegistrationEngine::new(
//!     Arc::new(db.workers()),
//!     Arc::new(db.consumptions()),
//!     Arc::new(db.users()),
//! );
//! ```

pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;

pub use error::{DbError, DbResult};
pub use pool::{Database, DbConfig};
