//! Counting service library entry.
//!
//! Serves a process-local counter that increments on every request and
//! reports the producing host. Each replica counts independently.

pub mod config;
pub mod handlers;
pub mod router;
pub mod state;

pub use config::CounterConfig;
pub use state::CounterState;
