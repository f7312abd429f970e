use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use serde_json::Value;
use tokio::task::JoinHandle;

use tally_core::error::{Result, TallyError};
use tally_core::protocol::count::RelayResult;
use tally_core::protocol::frame::EVENT_MESSAGE;
use tally_core::FailureTracker;

use crate::obs::metrics::DashboardMetrics;
use crate::relay::fetcher::CountFetcher;

/// Group every dashboard client joins on connect.
pub const VISITS_GROUP: &str = "visits";

/// What a `send` event returns to the transport, whatever the fetch outcome.
pub const SEND_REPLY: &str = "OK";

/// Client-side half of the relay: group membership and acknowledged delivery.
#[async_trait]
pub trait AckChannel: Send + Sync {
    fn session_id(&self) -> &str;

    fn join(&self, group: &str) -> Result<()>;

    /// Push `event` with `data` and wait up to `timeout` for the client's ack.
    async fn emit_with_ack(&self, event: &'static str, data: Value, timeout: Duration) -> Result<()>;
}

/// One fetch: update the tracker and shape the result for the client.
///
/// Transport and decode failures are folded into the failure-shaped result;
/// this never returns an error.
pub async fn handle_send(tracker: &FailureTracker, fetcher: &dyn CountFetcher) -> RelayResult {
    match fetcher.fetch().await {
        Ok(record) => {
            tracker.record(true);
            RelayResult::from(record)
        }
        Err(e) => {
            tracker.record(false);
            tracing::warn!(error = %e, failures = tracker.snapshot().failures, "count fetch failed");
            RelayResult::unreachable(&e)
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct RelayTimings {
    pub ack_timeout: Duration,
}

/// Per-event relay logic shared by every session.
///
/// Holds no per-client state; concurrent calls only meet in the tracker.
pub struct RelayHandler {
    tracker: Arc<FailureTracker>,
    fetcher: Arc<dyn CountFetcher>,
    timings: RelayTimings,
    metrics: Arc<DashboardMetrics>,
}

impl RelayHandler {
    pub fn new(
        tracker: Arc<FailureTracker>,
        fetcher: Arc<dyn CountFetcher>,
        timings: RelayTimings,
        metrics: Arc<DashboardMetrics>,
    ) -> Self {
        Self {
            tracker,
            fetcher,
            timings,
            metrics,
        }
    }

    /// Fetch once, recording outcome and latency.
    pub async fn fetch(&self) -> RelayResult {
        let started = Instant::now();
        let result = handle_send(&self.tracker, self.fetcher.as_ref()).await;

        let outcome = if result.is_unreachable() { "error" } else { "ok" };
        self.metrics.fetches.inc(&[("outcome", outcome)]);
        self.metrics.fetch_duration.observe(&[("outcome", outcome)], started.elapsed());

        tracing::debug!(count = result.count, hostname = %result.hostname, "fetched count");
        result
    }

    /// Push `result` to the client as a `message` event.
    ///
    /// Fire with timeout: a gone or silent client only costs the wait.
    pub async fn deliver<C: AckChannel + ?Sized>(&self, channel: &C, result: RelayResult) {
        let data = match serde_json::to_value(&result) {
            Ok(v) => v,
            Err(e) => {
                tracing::error!(error = %e, "relay result encode failed");
                return;
            }
        };

        let outcome = match channel
            .emit_with_ack(EVENT_MESSAGE, data, self.timings.ack_timeout)
            .await
        {
            Ok(()) => "ok",
            Err(TallyError::Timeout) => {
                tracing::debug!(session = %channel.session_id(), "client did not ack in time");
                "timeout"
            }
            Err(e) => {
                tracing::debug!(session = %channel.session_id(), error = %e, "delivery dropped");
                "closed"
            }
        };
        self.metrics.ack_deliveries.inc(&[("outcome", outcome)]);
    }

    /// Handle a client `send` event.
    pub async fn on_send<C: AckChannel + ?Sized>(&self, channel: &C) -> &'static str {
        let result = self.fetch().await;
        self.deliver(channel, result).await;
        SEND_REPLY
    }

    /// Enroll a new client and give it an initial count.
    ///
    /// The fetch completes before this returns, so it is ordered ahead of any
    /// `send` the session reads afterwards. Delivery runs on the returned task
    /// because it needs the session reader alive to see the client's ack.
    pub async fn on_connect<C>(self: &Arc<Self>, channel: Arc<C>) -> JoinHandle<()>
    where
        C: AckChannel + ?Sized + 'static,
    {
        if let Err(e) = channel.join(VISITS_GROUP) {
            tracing::warn!(session = %channel.session_id(), error = %e, "group join failed");
        }

        let result = self.fetch().await;
        let relay = Arc::clone(self);
        tokio::spawn(async move {
            relay.deliver(channel.as_ref(), result).await;
        })
    }
}
