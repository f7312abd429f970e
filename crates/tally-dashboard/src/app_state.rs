//! Shared application state for the dashboard.
//!
//! Owns the failure tracker and hands the same instance to the relay handler
//! and the health probes. The count source is injectable so tests can run the
//! whole router without a counting service.

use std::sync::Arc;
use std::time::Duration;

use tally_core::error::Result;
use tally_core::FailureTracker;

use crate::config::DashboardConfig;
use crate::dispatch::Dispatcher;
use crate::obs::metrics::DashboardMetrics;
use crate::realtime::RealtimeCore;
use crate::relay::{CountFetcher, HttpCountFetcher, RelayHandler, RelayTimings};
use crate::services::SendService;

#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
    realtime: Arc<RealtimeCore>,
    dispatcher: Arc<Dispatcher>,
    relay: Arc<RelayHandler>,
}

struct AppStateInner {
    cfg: DashboardConfig,
    tracker: Arc<FailureTracker>,
    metrics: Arc<DashboardMetrics>,
}

impl AppState {
    /// Build state that fetches from the configured counting service.
    pub fn new(cfg: DashboardConfig) -> Result<Self> {
        let fetcher = HttpCountFetcher::new(&cfg.upstream)?;
        Ok(Self::with_fetcher(cfg, Arc::new(fetcher)))
    }

    pub fn with_fetcher(cfg: DashboardConfig, fetcher: Arc<dyn CountFetcher>) -> Self {
        let tracker = Arc::new(FailureTracker::new());
        let metrics = Arc::new(DashboardMetrics::default());
        let timings = RelayTimings {
            ack_timeout: Duration::from_millis(cfg.relay.ack_timeout_ms),
        };

        let relay = Arc::new(RelayHandler::new(
            Arc::clone(&tracker),
            fetcher,
            timings,
            Arc::clone(&metrics),
        ));

        let dispatcher = Dispatcher::new();
        dispatcher.register(Arc::new(SendService::new(Arc::clone(&relay))));
        tracing::debug!(events = ?dispatcher.registered_events(), "event handlers registered");

        Self {
            inner: Arc::new(AppStateInner { cfg, tracker, metrics }),
            realtime: Arc::new(RealtimeCore::new()),
            dispatcher: Arc::new(dispatcher),
            relay,
        }
    }

    pub fn cfg(&self) -> &DashboardConfig {
        &self.inner.cfg
    }

    pub fn tracker(&self) -> &FailureTracker {
        &self.inner.tracker
    }

    pub fn metrics(&self) -> Arc<DashboardMetrics> {
        Arc::clone(&self.inner.metrics)
    }

    pub fn realtime(&self) -> Arc<RealtimeCore> {
        Arc::clone(&self.realtime)
    }

    pub fn dispatcher(&self) -> Arc<Dispatcher> {
        Arc::clone(&self.dispatcher)
    }

    pub fn relay(&self) -> Arc<RelayHandler> {
        Arc::clone(&self.relay)
    }
}
