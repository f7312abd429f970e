//! Count payloads.
//!
//! `CountRecord` is what the counting service serves; `RelayResult` is what the
//! dashboard pushes to its clients after each fetch.

use serde::{Deserialize, Serialize};

use crate::error::{Result, TallyError};

/// Count value reported to clients when no valid count is available.
pub const SENTINEL_COUNT: i64 = -1;

/// Origin marker reported to clients when the counting service is unreachable.
pub const UNREACHABLE_HOSTNAME: &str = "[Unreachable]";

/// Counting service response body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CountRecord {
    pub count: u64,
    pub hostname: String,
}

impl CountRecord {
    /// Decode an upstream response body.
    pub fn from_json(body: &[u8]) -> Result<Self> {
        serde_json::from_slice(body).map_err(|e| TallyError::Decode(e.to_string()))
    }
}

/// Payload of a `message` event sent to dashboard clients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelayResult {
    pub count: i64,
    #[serde(default)]
    pub message: String,
    pub hostname: String,
}

impl RelayResult {
    /// Failure shape: sentinel count, error text, unreachable origin.
    pub fn unreachable(err: &TallyError) -> Self {
        Self {
            count: SENTINEL_COUNT,
            message: err.to_string(),
            hostname: UNREACHABLE_HOSTNAME.to_string(),
        }
    }

    pub fn is_unreachable(&self) -> bool {
        self.count == SENTINEL_COUNT
    }
}

impl From<CountRecord> for RelayResult {
    fn from(rec: CountRecord) -> Self {
        Self {
            // Counts past i64::MAX are not reachable by a single process; clamp
            // rather than wrap into the sentinel range.
            count: i64::try_from(rec.count).unwrap_or(i64::MAX),
            message: String::new(),
            hostname: rec.hostname,
        }
    }
}
