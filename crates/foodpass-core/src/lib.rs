//! # foodpass-core: Pure Business Logic for FoodPass
//!
//! FoodPass tracks meal consumption for workers of multiple client companies
//! at shared dining halls. Workers identify themselves with a QR badge or
//! their RUT (Chilean national id) at a keyboard-emulating USB scanner; the
//! registration engine resolves the scan, picks the meal period by wall-clock
//! time, enforces one-registration-per-meal-per-day and charges the worker's
//! employer.
//!
//! This crate is the pure half of that system: every function here is
//! deterministic and does no I/O.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       FoodPass Architecture                             │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │              Boundary (scan router / HTTP / harness)            │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                 foodpass-engine (orchestration)                 │   │
//! │  │        resolve worker ► eligibility ► duplicate ► persist       │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ foodpass-core (THIS CRATE) ★                    │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │   types   │  │   scan    │  │   clock   │  │  pricing  │  │   │
//! │  │   │  Worker   │  │ normalize │  │MealPeriod │  │ RateTable │  │   │
//! │  │   │  Company  │  │ stripping │  │ by hour   │  │  lookup   │  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (Worker, Company, Consumption, etc.)
//! - [`money`] - Money type with integer arithmetic (whole pesos, no floats!)
//! - [`scan`] - Scanner text normalization and code stripping
//! - [`clock`] - Wall-clock hour to meal period mapping
//! - [`pricing`] - Cost computation from a company rate table
//! - [`validation`] - Business rule validation
//! - [`error`] - Domain error types

pub mod clock;
pub mod error;
pub mod money;
pub mod pricing;
pub mod scan;
pub mod types;
pub mod validation;

// Re-exports for convenience: `use foodpass_core::Money` instead of
// `use foodpass_core::money::Money`.
pub use error::{CoreError, ValidationError};
pub use money::Money;
pub use types::*;

/// Prefix of FoodPass-issued badge scan codes.
///
/// A worker with RUT `12.345.678-9` carries a badge encoding `FP-12345678-9`.
/// The resolver strips this prefix when matching a scanned badge against a
/// typed or scanned RUT.
pub const SCAN_CODE_PREFIX: &str = "FP-";

/// Minimum plausible scan length.
///
/// Keyboard-wedge scanners fire ordinary key events; anything shorter than
/// this is treated as human typing, not a completed scan.
pub const MIN_SCAN_LENGTH: usize = 5;
