//! tally core: transport-agnostic protocol primitives, error types, and the
//! upstream failure tracker.
//!
//! This crate defines the wire-level contracts shared by the counting service
//! and the dashboard relay. It carries no transport or runtime dependencies so
//! both binaries (and their tests) can use it directly.
//!
//! # Defensive guarantees
//! Panics, `unwrap`, and `expect` are compile-denied here
//! (`#![deny(clippy::panic, clippy::unwrap_used, clippy::expect_used)]`).
//! All fallible paths surface as `TallyError`/`Result`.

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]

pub mod error;
pub mod health;
pub mod protocol;

/// Shared result type.
pub use error::{Result, TallyError};
pub use health::{FailureTracker, HealthSnapshot};
