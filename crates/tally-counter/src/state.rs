//! Shared counting state.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use tally_core::protocol::count::CountRecord;

#[derive(Clone)]
pub struct CounterState {
    inner: Arc<CounterInner>,
}

struct CounterInner {
    index: AtomicU64,
    hostname: String,
}

impl CounterState {
    pub fn new(hostname: impl Into<String>) -> Self {
        Self {
            inner: Arc::new(CounterInner {
                index: AtomicU64::new(0),
                hostname: hostname.into(),
            }),
        }
    }

    /// Increment once and return the value this call produced.
    ///
    /// The increment and the read are one `fetch_add`, so concurrent callers
    /// always observe distinct values.
    pub fn next(&self) -> CountRecord {
        let count = self.inner.index.fetch_add(1, Ordering::Relaxed) + 1;
        CountRecord {
            count,
            hostname: self.inner.hostname.clone(),
        }
    }

    /// Current value without incrementing.
    pub fn current(&self) -> u64 {
        self.inner.index.load(Ordering::Relaxed)
    }
}
