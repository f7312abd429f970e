//! Dashboard relay library entry.
//!
//! Bridges push-channel clients to the counting service: each client event
//! triggers a bounded fetch, the outcome feeds a shared failure tracker, and
//! the result is pushed back to that client. Consumed by the binary
//! (`main.rs`) and by integration tests.

pub mod app_state;
pub mod config;
pub mod dispatch;
pub mod obs;
pub mod ops;
pub mod realtime;
pub mod relay;
pub mod router;
pub mod services;
pub mod transport;
