//! Lightweight in-process metrics.
//!
//! Counters, gauges and histograms are plain atomics rendered by the
//! `/metrics` handler; no exporter crate is involved.

pub mod metrics;
