//! Minimal metrics registry for the dashboard.
//!
//! Counter/gauge/histogram families keyed by sorted label pairs in a
//! `DashMap`, rendered in the Prometheus text format. Histogram buckets are
//! integer milliseconds sized for upstream fetch latency.

use dashmap::DashMap;
use std::fmt::Write;
use std::sync::atomic::{AtomicI64, AtomicU64, Ordering};
use std::time::Duration;

type LabelKey = Vec<(String, String)>;

fn label_key(labels: &[(&str, &str)]) -> LabelKey {
    let mut key: LabelKey = labels
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    key.sort();
    key
}

fn escape_label(v: &str) -> String {
    v.replace('\\', "\\\\").replace('"', "\\\"").replace('\n', "\\n")
}

/// `k1="v1",k2="v2"` (no braces).
fn label_body(key: &LabelKey) -> String {
    key.iter()
        .map(|(k, v)| format!("{k}=\"{}\"", escape_label(v)))
        .collect::<Vec<_>>()
        .join(",")
}

fn series(name: &str, key: &LabelKey) -> String {
    if key.is_empty() {
        name.to_string()
    } else {
        format!("{name}{{{}}}", label_body(key))
    }
}

#[derive(Default)]
pub struct CounterVec {
    map: DashMap<LabelKey, AtomicU64>,
}

impl CounterVec {
    pub fn inc(&self, labels: &[(&str, &str)]) {
        self.map
            .entry(label_key(labels))
            .or_insert_with(|| AtomicU64::new(0))
            .fetch_add(1, Ordering::Relaxed);
    }

    pub fn get(&self, labels: &[(&str, &str)]) -> u64 {
        self.map
            .get(&label_key(labels))
            .map(|c| c.load(Ordering::Relaxed))
            .unwrap_or(0)
    }

    fn render(&self, name: &str, out: &mut String) {
        let _ = writeln!(out, "# TYPE {name} counter");
        for r in self.map.iter() {
            let _ = writeln!(out, "{} {}", series(name, r.key()), r.value().load(Ordering::Relaxed));
        }
    }
}

#[derive(Default)]
pub struct GaugeVec {
    map: DashMap<LabelKey, AtomicI64>,
}

impl GaugeVec {
    pub fn inc(&self, labels: &[(&str, &str)]) {
        self.add(labels, 1);
    }

    pub fn dec(&self, labels: &[(&str, &str)]) {
        self.add(labels, -1);
    }

    fn add(&self, labels: &[(&str, &str)], v: i64) {
        self.map
            .entry(label_key(labels))
            .or_insert_with(|| AtomicI64::new(0))
            .fetch_add(v, Ordering::Relaxed);
    }

    pub fn get(&self, labels: &[(&str, &str)]) -> i64 {
        self.map
            .get(&label_key(labels))
            .map(|g| g.load(Ordering::Relaxed))
            .unwrap_or(0)
    }

    fn render(&self, name: &str, out: &mut String) {
        let _ = writeln!(out, "# TYPE {name} gauge");
        for r in self.map.iter() {
            let _ = writeln!(out, "{} {}", series(name, r.key()), r.value().load(Ordering::Relaxed));
        }
    }
}

// 5ms .. 2.5s; the default fetch budget is 2s.
const BUCKETS_MILLIS: [u64; 8] = [5, 10, 25, 50, 100, 250, 1_000, 2_500];

#[derive(Default)]
struct AtomicHistogram {
    count: AtomicU64,
    sum: AtomicU64,
    buckets: [AtomicU64; BUCKETS_MILLIS.len()],
}

#[derive(Default)]
pub struct HistogramVec {
    map: DashMap<LabelKey, AtomicHistogram>,
}

impl HistogramVec {
    /// Observe a duration (cumulative buckets, millisecond scale).
    pub fn observe(&self, labels: &[(&str, &str)], duration: Duration) {
        let hist = self.map.entry(label_key(labels)).or_default();
        let millis = u64::try_from(duration.as_millis()).unwrap_or(u64::MAX);

        hist.count.fetch_add(1, Ordering::Relaxed);
        hist.sum.fetch_add(millis, Ordering::Relaxed);
        for (i, &le) in BUCKETS_MILLIS.iter().enumerate() {
            if millis <= le {
                hist.buckets[i].fetch_add(1, Ordering::Relaxed);
            }
        }
    }

    fn render(&self, name: &str, out: &mut String) {
        let _ = writeln!(out, "# TYPE {name} histogram");
        for r in self.map.iter() {
            let body = label_body(r.key());
            let prefix = if body.is_empty() { String::new() } else { format!("{body},") };
            let hist = r.value();

            for (i, le) in BUCKETS_MILLIS.iter().enumerate() {
                let n = hist.buckets[i].load(Ordering::Relaxed);
                let _ = writeln!(out, "{name}_bucket{{{prefix}le=\"{le}\"}} {n}");
            }
            let count = hist.count.load(Ordering::Relaxed);
            let _ = writeln!(out, "{name}_bucket{{{prefix}le=\"+Inf\"}} {count}");
            let _ = writeln!(out, "{} {}", series(&format!("{name}_sum"), r.key()), hist.sum.load(Ordering::Relaxed));
            let _ = writeln!(out, "{} {count}", series(&format!("{name}_count"), r.key()));
        }
    }
}

#[derive(Default)]
pub struct DashboardMetrics {
    pub ws_upgrades: CounterVec,
    pub ws_sessions_active: GaugeVec,
    pub fetches: CounterVec,
    pub fetch_duration: HistogramVec,
    pub ack_deliveries: CounterVec,
    pub frame_errors: CounterVec,
}

impl DashboardMetrics {
    /// Render all families plus caller-supplied gauges sampled at scrape time.
    pub fn render(&self, extra: &[(&str, i64)]) -> String {
        let mut out = String::new();
        self.ws_upgrades.render("tally_ws_upgrades_total", &mut out);
        self.ws_sessions_active.render("tally_ws_sessions_active", &mut out);
        self.fetches.render("tally_upstream_fetches_total", &mut out);
        self.fetch_duration.render("tally_upstream_fetch_duration_millis", &mut out);
        self.ack_deliveries.render("tally_ack_deliveries_total", &mut out);
        self.frame_errors.render("tally_frame_errors_total", &mut out);
        for (k, v) in extra {
            let _ = writeln!(out, "{k} {v}");
        }
        out
    }
}
