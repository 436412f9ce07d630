//! Load and query observability.
//!
//! Ingestion and the planner report what they do through an injected
//! [`Observer`]. The server uses [`Metrics`], which keeps counters that the
//! `/metrics` endpoint serializes; tests use [`NoopObserver`].

use std::collections::BTreeMap;
use std::sync::RwLock;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use serde::Serialize;

use crate::domain::Mode;
use crate::ingest::LoadReport;

/// How a journey query ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum QueryOutcome {
    Found,
    NotFound,
    UnknownStop,
    InvalidTime,
    Timeout,
}

/// Receives load and query events.
pub trait Observer: Send + Sync {
    fn graph_loaded(&self, report: &LoadReport);

    fn query_completed(&self, outcome: QueryOutcome, elapsed: Duration);
}

/// An observer that ignores everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopObserver;

impl Observer for NoopObserver {
    fn graph_loaded(&self, _report: &LoadReport) {}

    fn query_completed(&self, _outcome: QueryOutcome, _elapsed: Duration) {}
}

/// Counters for the `/metrics` endpoint.
#[derive(Debug, Default)]
pub struct Metrics {
    queries: AtomicU64,
    found: AtomicU64,
    not_found: AtomicU64,
    unknown_stop: AtomicU64,
    invalid_time: AtomicU64,
    timeouts: AtomicU64,
    latency_micros: AtomicU64,
    loads: RwLock<BTreeMap<Mode, LoadReport>>,
}

/// A point-in-time copy of [`Metrics`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetricsSnapshot {
    pub queries: u64,
    pub found: u64,
    pub not_found: u64,
    pub unknown_stop: u64,
    pub invalid_time: u64,
    pub timeouts: u64,
    /// Mean query latency in milliseconds.
    pub mean_latency_ms: f64,
    pub loads: Vec<LoadReport>,
}

impl Metrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        let queries = self.queries.load(Ordering::Relaxed);
        let latency = self.latency_micros.load(Ordering::Relaxed);
        let mean_latency_ms = if queries == 0 {
            0.0
        } else {
            latency as f64 / queries as f64 / 1000.0
        };
        let loads = match self.loads.read() {
            Ok(loads) => loads.values().cloned().collect(),
            Err(poisoned) => poisoned.into_inner().values().cloned().collect(),
        };

        MetricsSnapshot {
            queries,
            found: self.found.load(Ordering::Relaxed),
            not_found: self.not_found.load(Ordering::Relaxed),
            unknown_stop: self.unknown_stop.load(Ordering::Relaxed),
            invalid_time: self.invalid_time.load(Ordering::Relaxed),
            timeouts: self.timeouts.load(Ordering::Relaxed),
            mean_latency_ms,
            loads,
        }
    }
}

impl Observer for Metrics {
    fn graph_loaded(&self, report: &LoadReport) {
        let mut loads = match self.loads.write() {
            Ok(loads) => loads,
            Err(poisoned) => poisoned.into_inner(),
        };
        loads.insert(report.mode, report.clone());
    }

    fn query_completed(&self, outcome: QueryOutcome, elapsed: Duration) {
        self.queries.fetch_add(1, Ordering::Relaxed);
        self.latency_micros
            .fetch_add(elapsed.as_micros() as u64, Ordering::Relaxed);
        let counter = match outcome {
            QueryOutcome::Found => &self.found,
            QueryOutcome::NotFound => &self.not_found,
            QueryOutcome::UnknownStop => &self.unknown_stop,
            QueryOutcome::InvalidTime => &self.invalid_time,
            QueryOutcome::Timeout => &self.timeouts,
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_snapshot() {
        let snapshot = Metrics::new().snapshot();
        assert_eq!(snapshot.queries, 0);
        assert_eq!(snapshot.mean_latency_ms, 0.0);
        assert!(snapshot.loads.is_empty());
    }

    #[test]
    fn counts_outcomes_and_latency() {
        let metrics = Metrics::new();
        metrics.query_completed(QueryOutcome::Found, Duration::from_millis(2));
        metrics.query_completed(QueryOutcome::Found, Duration::from_millis(4));
        metrics.query_completed(QueryOutcome::UnknownStop, Duration::from_millis(0));
        metrics.query_completed(QueryOutcome::Timeout, Duration::from_millis(6));

        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.queries, 4);
        assert_eq!(snapshot.found, 2);
        assert_eq!(snapshot.unknown_stop, 1);
        assert_eq!(snapshot.timeouts, 1);
        assert_eq!(snapshot.not_found, 0);
        assert!((snapshot.mean_latency_ms - 3.0).abs() < 1e-9);
    }

    #[test]
    fn latest_load_per_mode_kept() {
        let metrics = Metrics::new();
        let mut first = LoadReport::new(Mode::Train);
        first.stops = 10;
        let mut second = LoadReport::new(Mode::Train);
        second.stops = 12;
        metrics.graph_loaded(&first);
        metrics.graph_loaded(&LoadReport::new(Mode::Taxi));
        metrics.graph_loaded(&second);

        let loads = metrics.snapshot().loads;
        assert_eq!(loads.len(), 2);
        assert_eq!(loads[0].mode, Mode::Train);
        assert_eq!(loads[0].stops, 12);
    }

    #[test]
    fn usable_as_trait_object() {
        let observers: Vec<Box<dyn Observer>> = vec![Box::new(NoopObserver), Box::new(Metrics::new())];
        for observer in &observers {
            observer.query_completed(QueryOutcome::NotFound, Duration::ZERO);
        }
    }
}
