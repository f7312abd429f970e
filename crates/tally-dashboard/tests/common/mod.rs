//! Shared test doubles for dashboard integration tests.

#![allow(dead_code)]

use std::collections::VecDeque;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;

use tally_core::error::{Result, TallyError};
use tally_core::protocol::count::CountRecord;
use tally_dashboard::config::DashboardConfig;
use tally_dashboard::obs::metrics::DashboardMetrics;
use tally_dashboard::relay::{AckChannel, CountFetcher, RelayHandler, RelayTimings};
use tally_core::FailureTracker;

/// Ordered record of what the doubles saw, shared between them.
pub type Log = Arc<Mutex<Vec<String>>>;

pub fn new_log() -> Log {
    Arc::new(Mutex::new(Vec::new()))
}

pub fn entries(log: &Log) -> Vec<String> {
    log.lock().unwrap().clone()
}

#[derive(Debug, Clone)]
pub enum Scripted {
    Count(u64, &'static str),
    Unreachable,
    Garbage,
}

/// Fetcher that replays a script, then repeats its last entry.
pub struct ScriptedFetcher {
    script: Mutex<VecDeque<Scripted>>,
    last: Mutex<Scripted>,
    log: Log,
}

impl ScriptedFetcher {
    pub fn new(script: Vec<Scripted>, log: Log) -> Arc<Self> {
        let last = script.last().cloned().unwrap_or(Scripted::Unreachable);
        Arc::new(Self {
            script: Mutex::new(script.into()),
            last: Mutex::new(last),
            log,
        })
    }

    pub fn calls(&self) -> usize {
        self.log.lock().unwrap().iter().filter(|e| *e == "fetch").count()
    }
}

#[async_trait]
impl CountFetcher for ScriptedFetcher {
    async fn fetch(&self) -> Result<CountRecord> {
        self.log.lock().unwrap().push("fetch".into());
        let step = {
            let mut script = self.script.lock().unwrap();
            match script.pop_front() {
                Some(s) => {
                    *self.last.lock().unwrap() = s.clone();
                    s
                }
                None => self.last.lock().unwrap().clone(),
            }
        };
        match step {
            Scripted::Count(count, host) => Ok(CountRecord { count, hostname: host.into() }),
            Scripted::Unreachable => Err(TallyError::Upstream("connection refused".into())),
            Scripted::Garbage => CountRecord::from_json(b"not json"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AckBehavior {
    Ack,
    Stall,
    Gone,
}

/// In-memory client channel.
pub struct MockChannel {
    pub id: String,
    pub behavior: AckBehavior,
    pub fail_join: bool,
    pub emitted: Mutex<Vec<(String, Value)>>,
    pub log: Log,
}

impl MockChannel {
    pub fn new(behavior: AckBehavior, log: Log) -> Arc<Self> {
        Arc::new(Self {
            id: "s-test".into(),
            behavior,
            fail_join: false,
            emitted: Mutex::new(Vec::new()),
            log,
        })
    }

    pub fn failing_join(log: Log) -> Arc<Self> {
        Arc::new(Self {
            id: "s-test".into(),
            behavior: AckBehavior::Ack,
            fail_join: true,
            emitted: Mutex::new(Vec::new()),
            log,
        })
    }

    pub fn emitted(&self) -> Vec<(String, Value)> {
        self.emitted.lock().unwrap().clone()
    }
}

#[async_trait]
impl AckChannel for MockChannel {
    fn session_id(&self) -> &str {
        &self.id
    }

    fn join(&self, group: &str) -> Result<()> {
        self.log.lock().unwrap().push(format!("join:{group}"));
        if self.fail_join {
            return Err(TallyError::Closed);
        }
        Ok(())
    }

    async fn emit_with_ack(&self, event: &'static str, data: Value, timeout: Duration) -> Result<()> {
        self.log.lock().unwrap().push(format!("emit:{event}"));
        match self.behavior {
            AckBehavior::Ack => {
                self.emitted.lock().unwrap().push((event.to_string(), data));
                Ok(())
            }
            AckBehavior::Stall => {
                self.emitted.lock().unwrap().push((event.to_string(), data));
                tokio::time::sleep(timeout).await;
                Err(TallyError::Timeout)
            }
            AckBehavior::Gone => Err(TallyError::Closed),
        }
    }
}

pub fn relay_with(fetcher: Arc<dyn CountFetcher>, ack_timeout: Duration) -> (Arc<RelayHandler>, Arc<FailureTracker>, Arc<DashboardMetrics>) {
    let tracker = Arc::new(FailureTracker::new());
    let metrics = Arc::new(DashboardMetrics::default());
    let relay = Arc::new(RelayHandler::new(
        Arc::clone(&tracker),
        fetcher,
        RelayTimings { ack_timeout },
        Arc::clone(&metrics),
    ));
    (relay, tracker, metrics)
}

/// Defaults with a faster heartbeat, no assets, pointed at `upstream`.
pub fn test_config(upstream: &str) -> DashboardConfig {
    let mut cfg = DashboardConfig::default();
    cfg.upstream.url = upstream.to_string();
    cfg.upstream.fetch_timeout_ms = 500;
    cfg.relay.ack_timeout_ms = 1000;
    cfg.server.assets_dir = "does-not-exist".into();
    cfg
}

/// Serve `router` on an ephemeral loopback port.
pub async fn serve(router: axum::Router) -> SocketAddr {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    addr
}

/// A loopback address with nothing listening on it.
pub async fn dead_addr() -> SocketAddr {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    addr
}
