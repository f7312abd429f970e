//! Shared error type across tally crates.

use thiserror::Error;

/// Client-facing error codes (stable API).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClientCode {
    /// Invalid input / malformed frame.
    BadRequest,
    /// Frame exceeds the configured size limit.
    PayloadTooLarge,
    /// Event name not handled by the server.
    UnknownEvent,
    /// Upstream counting service could not be reached or decoded.
    Unavailable,
    /// Delivery or fetch did not complete in time.
    Timeout,
    /// Internal server error.
    Internal,
}

impl ClientCode {
    /// String representation used in JSON responses.
    pub fn as_str(self) -> &'static str {
        match self {
            ClientCode::BadRequest => "BAD_REQUEST",
            ClientCode::PayloadTooLarge => "PAYLOAD_TOO_LARGE",
            ClientCode::UnknownEvent => "UNKNOWN_EVENT",
            ClientCode::Unavailable => "UNAVAILABLE",
            ClientCode::Timeout => "TIMEOUT",
            ClientCode::Internal => "INTERNAL",
        }
    }
}

/// Shared result type.
pub type Result<T> = std::result::Result<T, TallyError>;

/// Unified error type used by core, dashboard and counter.
#[derive(Debug, Error)]
pub enum TallyError {
    #[error("bad request: {0}")]
    BadRequest(String),
    #[error("payload too large")]
    PayloadTooLarge,
    #[error("unknown event: {0}")]
    UnknownEvent(String),
    /// Transport-level failure talking to the counting service
    /// (refused, DNS, timeout, non-success status).
    #[error("{0}")]
    Upstream(String),
    /// Upstream answered but the body was not a count record.
    #[error("decode failed: {0}")]
    Decode(String),
    #[error("timed out")]
    Timeout,
    /// The peer channel went away before delivery completed.
    #[error("channel closed")]
    Closed,
    #[error("invalid config: {0}")]
    Config(String),
    #[error("internal: {0}")]
    Internal(String),
}

impl TallyError {
    /// Map internal error to a stable client-facing code.
    pub fn client_code(&self) -> ClientCode {
        match self {
            TallyError::BadRequest(_) | TallyError::Config(_) => ClientCode::BadRequest,
            TallyError::PayloadTooLarge => ClientCode::PayloadTooLarge,
            TallyError::UnknownEvent(_) => ClientCode::UnknownEvent,
            TallyError::Upstream(_) | TallyError::Decode(_) => ClientCode::Unavailable,
            TallyError::Timeout => ClientCode::Timeout,
            TallyError::Closed | TallyError::Internal(_) => ClientCode::Internal,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn upstream_failures_share_a_client_code() {
        assert_eq!(
            TallyError::Upstream("connection refused".into()).client_code(),
            TallyError::Decode("eof".into()).client_code(),
        );
        assert_eq!(ClientCode::Unavailable.as_str(), "UNAVAILABLE");
    }

    #[test]
    fn upstream_message_is_passed_through() {
        let e = TallyError::Upstream("connection refused".into());
        assert_eq!(e.to_string(), "connection refused");
    }
}
