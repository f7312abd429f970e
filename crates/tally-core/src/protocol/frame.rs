//! Push-channel event frame (JSON over WebSocket text messages).
//!
//! ```text
//! {"event": "send", "id": 7, "data": {...}}
//! ```
//!
//! `id` correlates a request with its `ack`. Inbound `data` is kept as
//! `RawValue` so handlers only parse what they use.

use serde::{Deserialize, Serialize};
use serde_json::value::RawValue;
use serde_json::{json, Value};

use crate::error::{ClientCode, Result, TallyError};

/// Client asks for a fresh count.
pub const EVENT_SEND: &str = "send";
/// Server pushes a count to the client.
pub const EVENT_MESSAGE: &str = "message";
/// Reply correlated to an earlier frame's `id`.
pub const EVENT_ACK: &str = "ack";
/// Server reports a rejected frame.
pub const EVENT_ERROR: &str = "error";

/// Inbound frame (client -> server).
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Frame {
    /// Event name.
    pub event: String,
    /// Optional correlation id. Present when the sender expects an ack.
    #[serde(default)]
    pub id: Option<u64>,
    /// Optional payload, stored as raw JSON (lazy parsing).
    #[serde(default)]
    pub data: Option<Box<RawValue>>,
}

impl Frame {
    /// Decode a text frame.
    pub fn parse(s: &str) -> Result<Self> {
        let frame: Frame = serde_json::from_str(s)
            .map_err(|e| TallyError::BadRequest(format!("invalid frame json: {e}")))?;
        if frame.event.is_empty() {
            return Err(TallyError::BadRequest("event must not be empty".into()));
        }
        Ok(frame)
    }
}

/// Outbound frame (server -> client).
#[derive(Debug, Clone, Serialize)]
pub struct OutFrame {
    pub event: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

impl OutFrame {
    /// Event carrying `data`, optionally asking the client to ack `id`.
    pub fn event(event: &'static str, id: Option<u64>, data: Value) -> Self {
        Self { event, id, data: Some(data) }
    }

    /// Reply to a client frame that carried `id`.
    pub fn ack(id: u64, data: Value) -> Self {
        Self { event: EVENT_ACK, id: Some(id), data: Some(data) }
    }

    pub fn error(code: ClientCode, msg: &str) -> Self {
        Self {
            event: EVENT_ERROR,
            id: None,
            data: Some(json!({ "code": code.as_str(), "msg": msg })),
        }
    }

    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string(self)
            .map_err(|e| TallyError::Internal(format!("json encode failed: {e}")))
    }
}
