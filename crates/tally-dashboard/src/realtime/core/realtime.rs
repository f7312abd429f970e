use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use axum::extract::ws::Message;
use serde_json::Value;
use tokio::time::timeout;

use tally_core::error::{Result, TallyError};
use tally_core::protocol::frame::OutFrame;

use crate::realtime::core::{Groups, SessionRegistry};
use crate::relay::AckChannel;

/// RealtimeCore: who is connected and which groups they are in.
#[derive(Default)]
pub struct RealtimeCore {
    pub sessions: Arc<SessionRegistry>,
    pub groups: Arc<Groups>,
}

impl RealtimeCore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a frame for one session, waiting for queue space.
    pub async fn send_to_session(&self, session_id: &str, frame: &OutFrame) -> Result<()> {
        let conn = self.sessions.get(session_id).ok_or(TallyError::Closed)?;
        let text = frame.to_json()?;
        conn.tx
            .send(Message::Text(text))
            .await
            .map_err(|_| TallyError::Closed)
    }

    /// Lossy broadcast: try_send only, members with a full or closed queue
    /// are skipped. Returns how many sessions accepted the frame.
    pub fn publish_group(&self, group: &str, frame: &OutFrame) -> Result<usize> {
        let text = frame.to_json()?;
        let mut delivered = 0;
        for session_id in self.groups.members(group) {
            let Some(conn) = self.sessions.get(&session_id) else {
                continue;
            };
            if conn.try_push(Message::Text(text.clone())) {
                delivered += 1;
            } else {
                tracing::debug!(session = %session_id, group, "broadcast dropped");
            }
        }
        Ok(delivered)
    }
}

/// Per-session context passed to event handlers.
#[derive(Clone)]
pub struct SessionCtx {
    session_id: Arc<str>,
    core: Arc<RealtimeCore>,
}

impl SessionCtx {
    pub fn new(session_id: impl Into<Arc<str>>, core: Arc<RealtimeCore>) -> Self {
        Self {
            session_id: session_id.into(),
            core,
        }
    }

    /// Answer a client frame that carried `id`.
    pub async fn reply(&self, id: u64, data: Value) -> Result<()> {
        self.core
            .send_to_session(&self.session_id, &OutFrame::ack(id, data))
            .await
    }

    pub async fn send_error(&self, err: &TallyError) -> Result<()> {
        self.core
            .send_to_session(
                &self.session_id,
                &OutFrame::error(err.client_code(), &err.to_string()),
            )
            .await
    }
}

#[async_trait]
impl AckChannel for SessionCtx {
    fn session_id(&self) -> &str {
        &self.session_id
    }

    fn join(&self, group: &str) -> Result<()> {
        if self.core.sessions.get(&self.session_id).is_none() {
            return Err(TallyError::Closed);
        }
        self.core.groups.join(group, &self.session_id);
        Ok(())
    }

    async fn emit_with_ack(&self, event: &'static str, data: Value, wait: Duration) -> Result<()> {
        let conn = self
            .core
            .sessions
            .get(&self.session_id)
            .ok_or(TallyError::Closed)?;

        let (ack_id, acked) = conn.acks.register();
        let text = match OutFrame::event(event, Some(ack_id), data).to_json() {
            Ok(t) => t,
            Err(e) => {
                conn.acks.forget(ack_id);
                return Err(e);
            }
        };

        let res = timeout(wait, async {
            conn.tx
                .send(Message::Text(text))
                .await
                .map_err(|_| TallyError::Closed)?;
            acked.await.map_err(|_| TallyError::Closed)
        })
        .await;

        match res {
            Ok(Ok(())) => Ok(()),
            Ok(Err(e)) => {
                conn.acks.forget(ack_id);
                Err(e)
            }
            Err(_) => {
                conn.acks.forget(ack_id);
                Err(TallyError::Timeout)
            }
        }
    }
}
