use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use tally_core::error::Result;
use tally_core::protocol::frame::{Frame, EVENT_SEND};

use crate::dispatch::EventHandler;
use crate::realtime::SessionCtx;
use crate::relay::RelayHandler;

/// `send`: fetch a fresh count and push it to the requesting client.
///
/// The client's payload (if any) is ignored.
pub struct SendService {
    relay: Arc<RelayHandler>,
}

impl SendService {
    pub fn new(relay: Arc<RelayHandler>) -> Self {
        Self { relay }
    }
}

#[async_trait]
impl EventHandler for SendService {
    fn event(&self) -> &'static str {
        EVENT_SEND
    }

    async fn handle(&self, ctx: Arc<SessionCtx>, _frame: Frame) -> Result<Value> {
        let reply = self.relay.on_send(ctx.as_ref()).await;
        Ok(Value::from(reply))
    }
}
