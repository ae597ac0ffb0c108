//! Ingestion metrics for the stats endpoint

use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

/// Counters accumulated over the process lifetime
pub struct MetricsCollector {
    batches_accepted: AtomicU64,
    batches_rejected: AtomicU64,
    started_at: Instant,
}

/// Point-in-time view served by `GET /api/stats`
#[derive(Debug, Clone, Serialize)]
pub struct StatsSnapshot {
    /// Events currently held for replay
    pub backlog: usize,
    /// Live SSE observers
    pub observers: usize,
    /// Events accepted since startup (including any dropped by the
    /// backlog bound)
    pub events_ingested: u64,
    /// Ingestion requests accepted
    pub batches_accepted: u64,
    /// Ingestion requests rejected (malformed or schema-invalid)
    pub batches_rejected: u64,
    /// Seconds since the server started
    pub uptime_secs: u64,
}

impl MetricsCollector {
    /// Create a collector anchored at the current instant
    pub fn new() -> Self {
        Self {
            batches_accepted: AtomicU64::new(0),
            batches_rejected: AtomicU64::new(0),
            started_at: Instant::now(),
        }
    }

    /// Record an accepted ingestion request
    pub fn record_accepted(&self) {
        self.batches_accepted.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a rejected ingestion request
    pub fn record_rejected(&self) {
        self.batches_rejected.fetch_add(1, Ordering::Relaxed);
    }

    /// Build a snapshot; queue-derived gauges are passed in by the caller
    pub fn snapshot(&self, backlog: usize, observers: usize, events_ingested: u64) -> StatsSnapshot {
        StatsSnapshot {
            backlog,
            observers,
            events_ingested,
            batches_accepted: self.batches_accepted.load(Ordering::Relaxed),
            batches_rejected: self.batches_rejected.load(Ordering::Relaxed),
            uptime_secs: self.started_at.elapsed().as_secs(),
        }
    }
}

impl Default for MetricsCollector {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counters() {
        let metrics = MetricsCollector::new();
        metrics.record_accepted();
        metrics.record_accepted();
        metrics.record_rejected();

        let snapshot = metrics.snapshot(5, 2, 7);
        assert_eq!(snapshot.batches_accepted, 2);
        assert_eq!(snapshot.batches_rejected, 1);
        assert_eq!(snapshot.backlog, 5);
        assert_eq!(snapshot.observers, 2);
        assert_eq!(snapshot.events_ingested, 7);
    }
}
