use std::sync::Arc;

use async_trait::async_trait;
use dashmap::DashMap;
use serde_json::Value;

use tally_core::error::{Result, TallyError};
use tally_core::protocol::frame::Frame;

use crate::realtime::SessionCtx;

/// Handler for one named client event. The returned value is sent back as the
/// frame's `ack` when the client supplied an `id`.
#[async_trait]
pub trait EventHandler: Send + Sync {
    fn event(&self) -> &'static str;
    async fn handle(&self, ctx: Arc<SessionCtx>, frame: Frame) -> Result<Value>;
}

/// Registry and dispatcher for client events.
#[derive(Default)]
pub struct Dispatcher {
    handlers: DashMap<&'static str, Arc<dyn EventHandler>>,
}

impl Dispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&self, handler: Arc<dyn EventHandler>) {
        self.handlers.insert(handler.event(), handler);
    }

    pub fn registered_events(&self) -> Vec<&'static str> {
        self.handlers.iter().map(|e| *e.key()).collect()
    }

    pub async fn dispatch(&self, ctx: Arc<SessionCtx>, frame: Frame) -> Result<Value> {
        let handler = self
            .handlers
            .get(frame.event.as_str())
            .ok_or_else(|| TallyError::UnknownEvent(frame.event.clone()))?
            .value()
            .clone();
        handler.handle(ctx, frame).await
    }
}
