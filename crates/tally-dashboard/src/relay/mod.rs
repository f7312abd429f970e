//! Relay: fetch a count from the counting service, record the outcome, and
//! push the result to the client that asked for it.
//!
//! ```text
//! send event -> handle_send(tracker, fetcher) -> RelayResult -> emit_with_ack
//!                     |
//!                     +-> FailureTracker::record(ok)
//! ```
//!
//! Fetching and delivery sit behind traits (`CountFetcher`, `AckChannel`) so
//! the cycle can be exercised without a network or a socket.

pub mod fetcher;
pub mod handler;

pub use fetcher::{CountFetcher, HttpCountFetcher};
pub use handler::{handle_send, AckChannel, RelayHandler, RelayTimings, SEND_REPLY, VISITS_GROUP};
