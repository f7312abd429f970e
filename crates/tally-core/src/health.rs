//! Upstream failure tracker.
//!
//! Records the outcome of every fetch against the counting service and exposes
//! a consistent `(ok, consecutive_failures)` view to any number of concurrent
//! callers.
//!
//! Both fields live in one `AtomicU64`:
//! - bit 63: outcome of the most recent attempt (1 = ok)
//! - bits 0..63: consecutive failures since the last success
//!
//! A single word means `record` is one compare-and-swap step and `snapshot` is
//! one load, so readers never see a half-applied update and writers never wait
//! on a lock.

use std::sync::atomic::{AtomicU64, Ordering};

const OK_BIT: u64 = 1 << 63;
const FAILURES_MASK: u64 = OK_BIT - 1;

/// Point-in-time view of upstream health.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HealthSnapshot {
    /// Outcome of the most recently completed fetch.
    pub ok: bool,
    /// Consecutive failed fetches since the last success.
    pub failures: u64,
}

impl HealthSnapshot {
    fn unpack(word: u64) -> Self {
        Self {
            ok: word & OK_BIT != 0,
            failures: word & FAILURES_MASK,
        }
    }
}

/// Shared health state for the upstream dependency.
///
/// Starts as "not ok, zero failures": nothing has been fetched yet, so the
/// readiness probe stays unhealthy until the first success.
#[derive(Debug, Default)]
pub struct FailureTracker {
    state: AtomicU64,
}

impl FailureTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the outcome of one fetch attempt.
    pub fn record(&self, ok: bool) {
        let prev = if ok {
            self.state.swap(OK_BIT, Ordering::AcqRel)
        } else {
            // The closure always returns Some, so fetch_update cannot fail.
            match self
                .state
                .fetch_update(Ordering::AcqRel, Ordering::Acquire, |word| {
                    let failures = word & FAILURES_MASK;
                    Some(failures.saturating_add(1).min(FAILURES_MASK))
                }) {
                Ok(prev) | Err(prev) => prev,
            }
        };

        let prev = HealthSnapshot::unpack(prev);
        if ok && !prev.ok && prev.failures > 0 {
            tracing::info!(after_failures = prev.failures, "counting service reachable again");
        } else if !ok && prev.ok {
            tracing::warn!("counting service became unreachable");
        }
    }

    /// Current state, read in a single atomic step.
    pub fn snapshot(&self) -> HealthSnapshot {
        HealthSnapshot::unpack(self.state.load(Ordering::Acquire))
    }
}
