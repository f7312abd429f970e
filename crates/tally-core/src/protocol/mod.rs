//! Protocol modules.
//!
//! - `count`: the counting service's JSON record and the relay result pushed
//!   to dashboard clients.
//! - `frame`: the push-channel event frame exchanged over WebSocket text
//!   messages.
//!
//! Parsers never panic: malformed input is reported as `TallyError`.

pub mod count;
pub mod frame;
