//! # foodpass-scanner: Scan Assembly and Routing
//!
//! Keyboard-wedge scanners are invisible to software: they type. A badge
//! scan arrives as a burst of ordinary key events milliseconds apart,
//! terminated by Enter, on whatever input surface currently has focus.
//! This crate reassembles those bursts into discrete scans and routes each
//! one to the component that claims it.
//!
//! ## Data Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  key events ──► ScanAssembler ──► completed scan ──► ScanRouter         │
//! │   (char/Enter)   burst detection                        │               │
//! │                  length gate                 interceptor first          │
//! │                                                 │       │               │
//! │                                            claimed   default channel    │
//! │                                           (capture    (registration     │
//! │                                             field)       handler)       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`assembler`] - burst detection and scan-vs-typing discrimination
//! - [`router`] - completed-scan dispatch with an interceptor hook

pub mod assembler;
pub mod router;

pub use assembler::{KeyEvent, ScanAssembler, INTER_KEY_WINDOW};
pub use router::{RouteError, Routed, ScanRouter};
