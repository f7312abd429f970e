//! Built-in event handlers.

mod send;

pub use send::SendService;
