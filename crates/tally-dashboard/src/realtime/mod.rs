//! Realtime runtime for the dashboard: connected sessions, broadcast groups,
//! and the per-session context handed to event handlers.

pub mod core;

pub use core::{Connection, Groups, PendingAcks, RealtimeCore, SessionCtx, SessionRegistry};
