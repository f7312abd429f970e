//! Realtime core components.
//!
//! Session registry (with per-session pending acks), group membership, and the
//! session context that implements the relay's `AckChannel`.

mod groups;
mod realtime;
mod session_registry;

pub use groups::Groups;
pub use realtime::{RealtimeCore, SessionCtx};
pub use session_registry::{Connection, PendingAcks, SessionRegistry};
