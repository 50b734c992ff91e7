//! # foodpass-engine: The Consumption Registration Engine
//!
//! One scan, one decision. This crate turns a raw scanner string into exactly
//! one of three outcomes: a persisted consumption, an already-registered
//! notice, or a typed rejection.
//!
//! ## Data Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  raw text ──► normalize ──► resolve worker ──► eligibility             │
//! │                                  │                  │                   │
//! │                                  ▼                  ▼                   │
//! │                            WorkerStore        meal period clock         │
//! │                                                     │                   │
//! │                                                     ▼                   │
//! │                duplicate check ──► pricing ──► acting user ──► persist  │
//! │                      │                              │             │     │
//! │                      ▼                              ▼             ▼     │
//! │                 LedgerStore                  IdentityStore  LedgerStore │
//! │                                                                         │
//! │  Outcome: Success | AlreadyRegistered | Rejected(kind)                  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`store`] - collaborator traits the engine consumes (worker/ledger/identity)
//! - [`resolver`] - cascading worker lookup with false-positive rejection
//! - [`engine`] - the `register` state machine
//! - [`outcome`] - typed outcomes returned to callers
//! - [`memory`] - in-memory store implementations for tests and harnesses

pub mod engine;
pub mod memory;
pub mod outcome;
pub mod resolver;
pub mod store;

pub use engine::RegistrationEngine;
pub use outcome::{RegistrationOutcome, RejectKind};
pub use store::{IdentityStore, LedgerError, LedgerStore, StoreError, StoreResult, WorkerStore};
