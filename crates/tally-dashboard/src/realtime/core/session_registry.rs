use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use axum::extract::ws::Message;
use dashmap::DashMap;
use tokio::sync::{mpsc, oneshot};

/// Server-initiated events waiting for the client's `ack`.
#[derive(Default)]
pub struct PendingAcks {
    next_id: AtomicU64,
    waiters: DashMap<u64, oneshot::Sender<()>>,
}

impl PendingAcks {
    /// Allocate an ack id and the receiver that fires when it is acked.
    pub fn register(&self) -> (u64, oneshot::Receiver<()>) {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed) + 1;
        let (tx, rx) = oneshot::channel();
        self.waiters.insert(id, tx);
        (id, rx)
    }

    /// Returns false for ids that are unknown, expired, or already acked.
    pub fn resolve(&self, id: u64) -> bool {
        self.waiters
            .remove(&id)
            .map(|(_, tx)| tx.send(()).is_ok())
            .unwrap_or(false)
    }

    pub fn forget(&self, id: u64) {
        self.waiters.remove(&id);
    }

    /// Drop every waiter; their receivers observe closure.
    pub fn close(&self) {
        self.waiters.clear();
    }
}

/// One session's outbound queue plus its pending acks.
#[derive(Clone)]
pub struct Connection {
    pub tx: mpsc::Sender<Message>,
    pub acks: Arc<PendingAcks>,
}

impl Connection {
    pub fn new(tx: mpsc::Sender<Message>) -> Self {
        Self {
            tx,
            acks: Arc::new(PendingAcks::default()),
        }
    }

    /// Queue without waiting. Returns false when the queue is full or closed.
    pub fn try_push(&self, msg: Message) -> bool {
        self.tx.try_send(msg).is_ok()
    }
}

/// Session registry: `session_id -> Connection`.
#[derive(Default)]
pub struct SessionRegistry {
    sessions: DashMap<String, Connection>,
    seq: AtomicU64,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Next process-unique session id.
    pub fn next_id(&self) -> String {
        format!("s{}", self.seq.fetch_add(1, Ordering::Relaxed) + 1)
    }

    pub fn insert(&self, session_id: String, conn: Connection) {
        self.sessions.insert(session_id, conn);
    }

    /// Remove a session and release anyone still waiting on its acks.
    pub fn remove(&self, session_id: &str) -> Option<Connection> {
        let (_, conn) = self.sessions.remove(session_id)?;
        conn.acks.close();
        Some(conn)
    }

    pub fn get(&self, session_id: &str) -> Option<Connection> {
        self.sessions.get(session_id).map(|r| r.value().clone())
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}
