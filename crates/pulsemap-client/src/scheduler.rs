//! Drain scheduler: FIFO, timed batch release, and eviction.
//!
//! The FIFO is fed concurrently by the SSE subscription; a single lock
//! covers push-from-stream and drain-from-tick so no entry is lost or
//! duplicated. Eviction deadlines live in a min-heap keyed by expiry
//! time rather than one timer per event; the run loop sleeps until the
//! nearest deadline. The clock is passed into the core methods so they
//! stay deterministic under test.

use pulsemap_core::{MapEvent, DEFAULT_DURATION_SECS};

use parking_lot::Mutex;
use std::cmp::Reverse;
use std::collections::{BinaryHeap, VecDeque};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Smallest allowed drain period
pub const MIN_DRAIN_INTERVAL: Duration = Duration::from_millis(50);

/// Default drain period
pub const DEFAULT_DRAIN_INTERVAL: Duration = Duration::from_millis(2000);

/// Default events released per tick
pub const DEFAULT_BATCH_SIZE: usize = 20;

/// Extra lifetime granted beyond an event's animation duration
pub const EVICTION_GRACE: Duration = Duration::from_secs(1);

/// Tunables for the drain loop
#[derive(Debug, Clone)]
pub struct DrainConfig {
    /// Period between drain ticks, floored at [`MIN_DRAIN_INTERVAL`]
    pub interval: Duration,
    /// Ceiling on events moved into the active set per tick
    pub batch_size: usize,
    /// Added to each event's duration before eviction
    pub grace: Duration,
}

impl DrainConfig {
    /// Config with a custom drain period; the floor bounds worst-case
    /// responsiveness under heavy traffic
    pub fn with_interval(interval: Duration) -> Self {
        Self {
            interval: interval.max(MIN_DRAIN_INTERVAL),
            ..Self::default()
        }
    }
}

impl Default for DrainConfig {
    fn default() -> Self {
        Self {
            interval: DEFAULT_DRAIN_INTERVAL,
            batch_size: DEFAULT_BATCH_SIZE,
            grace: EVICTION_GRACE,
        }
    }
}

/// Shared handle to the local FIFO.
///
/// Cloned into the subscription task; the scheduler drains the same
/// queue on its tick.
#[derive(Clone, Default)]
pub struct FifoHandle(Arc<Mutex<VecDeque<MapEvent>>>);

impl FifoHandle {
    /// Create an empty FIFO
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a single event
    pub fn push(&self, event: MapEvent) {
        self.0.lock().push_back(event);
    }

    /// Append events in order
    pub fn extend(&self, events: impl IntoIterator<Item = MapEvent>) {
        self.0.lock().extend(events);
    }

    /// Current queue depth
    pub fn len(&self) -> usize {
        self.0.lock().len()
    }

    /// Whether the queue is empty
    pub fn is_empty(&self) -> bool {
        self.0.lock().is_empty()
    }

    /// Remove and return up to `max` events from the front
    pub fn take_batch(&self, max: usize) -> Vec<MapEvent> {
        let mut fifo = self.0.lock();
        let count = fifo.len().min(max);
        fifo.drain(..count).collect()
    }
}

/// An event currently eligible for animation
#[derive(Debug, Clone)]
pub struct ActiveEvent {
    /// The drained event
    pub event: MapEvent,
    /// When the event leaves the active set
    pub expires_at: Instant,
}

/// Moves events FIFO -> active set on a timer and evicts them when
/// their lifetime elapses
pub struct DrainScheduler {
    config: DrainConfig,
    fifo: FifoHandle,
    active: Vec<ActiveEvent>,
    expiries: BinaryHeap<Reverse<(Instant, String)>>,
}

impl DrainScheduler {
    /// Create a scheduler with its own empty FIFO
    pub fn new(config: DrainConfig) -> Self {
        Self {
            config,
            fifo: FifoHandle::new(),
            active: Vec::new(),
            expiries: BinaryHeap::new(),
        }
    }

    /// Handle for feeding the FIFO from the stream
    pub fn fifo(&self) -> FifoHandle {
        self.fifo.clone()
    }

    /// Events currently eligible for animation, in activation order
    pub fn active(&self) -> &[ActiveEvent] {
        &self.active
    }

    /// One drain tick: move up to `batch_size` events from the FIFO
    /// head into the active set and schedule their eviction.
    ///
    /// Returns the number of events moved; an empty FIFO is a no-op.
    pub fn drain_tick(&mut self, now: Instant) -> usize {
        let batch = self.fifo.take_batch(self.config.batch_size);
        let moved = batch.len();

        for event in batch {
            let secs = event.duration_secs();
            // The server rejects non-positive durations, but the FIFO
            // accepts events from any stream
            let secs = if secs.is_finite() && secs > 0.0 {
                secs
            } else {
                DEFAULT_DURATION_SECS
            };
            let expires_at = now + Duration::from_secs_f64(secs) + self.config.grace;

            self.expiries.push(Reverse((expires_at, event.id.clone())));
            self.active.push(ActiveEvent { event, expires_at });
        }

        moved
    }

    /// Evict every active event whose lifetime has elapsed.
    ///
    /// Returns the number of entries removed.
    pub fn evict_due(&mut self, now: Instant) -> usize {
        let mut evicted = 0;
        loop {
            match self.expiries.peek() {
                Some(Reverse((at, _))) if *at <= now => {}
                _ => break,
            }
            if let Some(Reverse((_, id))) = self.expiries.pop() {
                if self.remove(&id) {
                    evicted += 1;
                }
            }
        }
        evicted
    }

    /// Remove an event from the active set by id.
    ///
    /// Removing an absent id is a no-op; returns whether anything was
    /// removed.
    pub fn remove(&mut self, id: &str) -> bool {
        let before = self.active.len();
        self.active.retain(|entry| entry.event.id != id);
        self.active.len() != before
    }

    /// Nearest scheduled eviction, if any
    pub fn next_expiry(&self) -> Option<Instant> {
        self.expiries.peek().map(|Reverse((at, _))| *at)
    }

    /// Drive the scheduler until the task is dropped.
    ///
    /// `on_change` is invoked with the active set whenever it changes,
    /// after a drain tick or an eviction.
    pub async fn run<F>(mut self, mut on_change: F)
    where
        F: FnMut(&[ActiveEvent]) + Send,
    {
        let mut ticker = tokio::time::interval(self.config.interval);

        loop {
            let next = self.next_expiry();
            tokio::select! {
                _ = ticker.tick() => {
                    let now = Instant::now();
                    let evicted = self.evict_due(now);
                    let moved = self.drain_tick(now);
                    if moved > 0 || evicted > 0 {
                        tracing::trace!(moved, evicted, active = self.active.len(), "drain tick");
                        on_change(self.active());
                    }
                }
                _ = sleep_until_opt(next) => {
                    if self.evict_due(Instant::now()) > 0 {
                        on_change(self.active());
                    }
                }
            }
        }
    }
}

async fn sleep_until_opt(at: Option<Instant>) {
    match at {
        Some(at) => tokio::time::sleep_until(at.into()).await,
        None => std::future::pending().await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pulsemap_core::EventKind;

    fn ev(id: &str) -> MapEvent {
        MapEvent::new(id, "Warsaw", EventKind::Pulse)
    }

    fn ev_with_duration(id: &str, duration: f64) -> MapEvent {
        let mut event = ev(id);
        event.duration = Some(duration);
        event
    }

    #[test]
    fn test_drain_moves_min_of_depth_and_batch() {
        let mut scheduler = DrainScheduler::new(DrainConfig::default());
        let fifo = scheduler.fifo();
        fifo.extend((0..25).map(|i| ev(&format!("e{i}"))));

        let now = Instant::now();
        assert_eq!(scheduler.drain_tick(now), 20);
        assert_eq!(fifo.len(), 5);
        assert_eq!(scheduler.active().len(), 20);

        assert_eq!(scheduler.drain_tick(now), 5);
        assert!(fifo.is_empty());
        assert_eq!(scheduler.active().len(), 25);
    }

    #[test]
    fn test_empty_fifo_tick_is_noop() {
        let mut scheduler = DrainScheduler::new(DrainConfig::default());
        assert_eq!(scheduler.drain_tick(Instant::now()), 0);
        assert!(scheduler.active().is_empty());
        assert!(scheduler.next_expiry().is_none());
    }

    #[test]
    fn test_drain_preserves_fifo_order() {
        let mut scheduler = DrainScheduler::new(DrainConfig::default());
        let fifo = scheduler.fifo();
        fifo.push(ev("first"));
        fifo.push(ev("second"));
        fifo.push(ev("third"));

        scheduler.drain_tick(Instant::now());
        let ids: Vec<_> = scheduler
            .active()
            .iter()
            .map(|a| a.event.id.as_str())
            .collect();
        assert_eq!(ids, ["first", "second", "third"]);
    }

    #[test]
    fn test_eviction_after_duration_plus_grace() {
        let mut scheduler = DrainScheduler::new(DrainConfig::default());
        scheduler.fifo().push(ev_with_duration("a", 2.0));

        let t0 = Instant::now();
        scheduler.drain_tick(t0);

        // Lifetime is duration + 1s grace
        assert_eq!(scheduler.evict_due(t0 + Duration::from_millis(2900)), 0);
        assert_eq!(scheduler.active().len(), 1);

        assert_eq!(scheduler.evict_due(t0 + Duration::from_millis(3100)), 1);
        assert!(scheduler.active().is_empty());
    }

    #[test]
    fn test_eviction_is_independent_per_event() {
        let mut scheduler = DrainScheduler::new(DrainConfig::default());
        let fifo = scheduler.fifo();
        fifo.push(ev_with_duration("short", 0.5));
        fifo.push(ev_with_duration("long", 5.0));

        let t0 = Instant::now();
        scheduler.drain_tick(t0);

        assert_eq!(scheduler.evict_due(t0 + Duration::from_secs(2)), 1);
        let ids: Vec<_> = scheduler
            .active()
            .iter()
            .map(|a| a.event.id.as_str())
            .collect();
        assert_eq!(ids, ["long"]);

        assert_eq!(scheduler.evict_due(t0 + Duration::from_secs(7)), 1);
        assert!(scheduler.active().is_empty());
    }

    #[test]
    fn test_default_duration_applies() {
        let mut scheduler = DrainScheduler::new(DrainConfig::default());
        scheduler.fifo().push(ev("a"));

        let t0 = Instant::now();
        scheduler.drain_tick(t0);

        // 1.5s default + 1s grace
        assert_eq!(scheduler.evict_due(t0 + Duration::from_millis(2400)), 0);
        assert_eq!(scheduler.evict_due(t0 + Duration::from_millis(2600)), 1);
    }

    #[test]
    fn test_remove_is_idempotent() {
        let mut scheduler = DrainScheduler::new(DrainConfig::default());
        scheduler.fifo().push(ev("a"));
        scheduler.drain_tick(Instant::now());

        assert!(scheduler.remove("a"));
        assert!(!scheduler.remove("a"));
        assert!(!scheduler.remove("never-existed"));
    }

    #[test]
    fn test_eviction_of_already_removed_id_is_noop() {
        let mut scheduler = DrainScheduler::new(DrainConfig::default());
        scheduler.fifo().push(ev_with_duration("a", 1.0));

        let t0 = Instant::now();
        scheduler.drain_tick(t0);
        scheduler.remove("a");

        // The expiry entry still fires but finds nothing to remove
        assert_eq!(scheduler.evict_due(t0 + Duration::from_secs(3)), 0);
    }

    #[test]
    fn test_interval_floor() {
        let config = DrainConfig::with_interval(Duration::from_millis(1));
        assert_eq!(config.interval, MIN_DRAIN_INTERVAL);

        let config = DrainConfig::with_interval(Duration::from_millis(500));
        assert_eq!(config.interval, Duration::from_millis(500));
    }

    #[tokio::test(start_paused = true)]
    async fn test_run_drains_then_evicts() {
        let scheduler = DrainScheduler::new(DrainConfig::default());
        let fifo = scheduler.fifo();
        fifo.push(ev_with_duration("a", 2.0));

        let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();
        let task = tokio::spawn(scheduler.run(move |active| {
            let ids: Vec<String> = active.iter().map(|a| a.event.id.clone()).collect();
            let _ = tx.send(ids);
        }));

        // First tick fires immediately and drains the event
        let drained = rx.recv().await.unwrap();
        assert_eq!(drained, ["a"]);

        // Paused-clock auto-advance reaches the eviction deadline
        let evicted = rx.recv().await.unwrap();
        assert!(evicted.is_empty());

        task.abort();
    }
}
