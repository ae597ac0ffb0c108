//! The broadcast queue: backlog plus observer registry.
//!
//! One instance is created at process start and shared through the Axum
//! state; there is no module-level singleton. A single mutex guards both
//! the backlog and the registry so that (a) concurrent `append` calls
//! never interleave their per-event notification loops and (b) a
//! subscriber's backlog snapshot and registration happen atomically,
//! which is what guarantees exactly-once delivery over the
//! replay/live-push overlap window.
//!
//! Fan-out goes through one unbounded channel per observer, so a slow
//! consumer buffers instead of stalling the appender or its siblings. A
//! closed channel (consumer gone) deregisters the observer on the spot.

use pulsemap_core::MapEvent;

use parking_lot::Mutex;
use std::collections::{HashMap, VecDeque};
use tokio::sync::mpsc;

/// Handle returned by [`BroadcastQueue::subscribe`], used to deregister
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ObserverHandle(u64);

struct QueueInner {
    backlog: VecDeque<MapEvent>,
    observers: HashMap<u64, mpsc::UnboundedSender<MapEvent>>,
    next_observer_id: u64,
    ingested_total: u64,
}

/// Process-wide event store: append-only backlog plus active observers
pub struct BroadcastQueue {
    inner: Mutex<QueueInner>,
    max_backlog: usize,
}

impl BroadcastQueue {
    /// Create a queue keeping at most `max_backlog` events for replay.
    ///
    /// `0` disables the bound (the original unbounded behavior); otherwise
    /// the oldest events are dropped ring-buffer style once the cap is hit.
    pub fn new(max_backlog: usize) -> Self {
        Self {
            inner: Mutex::new(QueueInner {
                backlog: VecDeque::new(),
                observers: HashMap::new(),
                next_observer_id: 0,
                ingested_total: 0,
            }),
            max_backlog,
        }
    }

    /// Append pre-validated events and fan them out to every observer.
    ///
    /// Events land in the backlog in the given order and are delivered to
    /// each observer in that same order. Observers whose channel has
    /// closed are deregistered immediately and never block delivery to
    /// the rest. Returns the backlog length after the append.
    pub fn append(&self, events: &[MapEvent]) -> usize {
        let mut inner = self.inner.lock();

        for event in events {
            inner.backlog.push_back(event.clone());
        }
        if self.max_backlog > 0 {
            while inner.backlog.len() > self.max_backlog {
                inner.backlog.pop_front();
            }
        }
        inner.ingested_total += events.len() as u64;

        for event in events {
            inner.observers.retain(|id, tx| {
                if tx.send(event.clone()).is_ok() {
                    true
                } else {
                    tracing::debug!(observer = *id, "observer channel closed, deregistering");
                    false
                }
            });
        }

        inner.backlog.len()
    }

    /// Register an observer, atomically snapshotting the backlog.
    ///
    /// The returned replay vector holds every event appended before this
    /// call; the receiver yields every event appended after it. No event
    /// appears in both.
    pub fn subscribe(
        &self,
    ) -> (
        ObserverHandle,
        mpsc::UnboundedReceiver<MapEvent>,
        Vec<MapEvent>,
    ) {
        let (tx, rx) = mpsc::unbounded_channel();
        let mut inner = self.inner.lock();

        let replay: Vec<MapEvent> = inner.backlog.iter().cloned().collect();
        let id = inner.next_observer_id;
        inner.next_observer_id += 1;
        inner.observers.insert(id, tx);

        tracing::debug!(observer = id, replay = replay.len(), "observer registered");
        (ObserverHandle(id), rx, replay)
    }

    /// Remove an observer; removing one already gone is a no-op
    pub fn deregister(&self, handle: ObserverHandle) {
        if self.inner.lock().observers.remove(&handle.0).is_some() {
            tracing::debug!(observer = handle.0, "observer deregistered");
        }
    }

    /// Current backlog length
    pub fn backlog_len(&self) -> usize {
        self.inner.lock().backlog.len()
    }

    /// Number of currently registered observers
    pub fn observer_count(&self) -> usize {
        self.inner.lock().observers.len()
    }

    /// Total events accepted over the process lifetime
    pub fn ingested_total(&self) -> u64 {
        self.inner.lock().ingested_total
    }

    /// Copy of the current backlog, oldest first
    pub fn snapshot(&self) -> Vec<MapEvent> {
        self.inner.lock().backlog.iter().cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pulsemap_core::EventKind;

    fn ev(id: &str) -> MapEvent {
        MapEvent::new(id, "Warsaw", EventKind::Pulse)
    }

    #[test]
    fn test_append_preserves_batch_order() {
        let queue = BroadcastQueue::new(0);
        let (_handle, mut rx, replay) = queue.subscribe();
        assert!(replay.is_empty());

        queue.append(&[ev("a"), ev("b"), ev("c")]);

        assert_eq!(rx.try_recv().unwrap().id, "a");
        assert_eq!(rx.try_recv().unwrap().id, "b");
        assert_eq!(rx.try_recv().unwrap().id, "c");
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_exactly_once_over_replay_boundary() {
        let queue = BroadcastQueue::new(0);
        queue.append(&[ev("a"), ev("b")]);

        let (_handle, mut rx, replay) = queue.subscribe();
        let replayed: Vec<_> = replay.iter().map(|e| e.id.as_str()).collect();
        assert_eq!(replayed, ["a", "b"]);

        queue.append(&[ev("c")]);
        assert_eq!(rx.try_recv().unwrap().id, "c");
        // Nothing delivered twice
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_failed_observer_is_isolated() {
        let queue = BroadcastQueue::new(0);
        let (_h1, rx_dead, _) = queue.subscribe();
        let (_h2, mut rx_live, _) = queue.subscribe();
        assert_eq!(queue.observer_count(), 2);

        drop(rx_dead);
        queue.append(&[ev("a")]);

        // Dead observer deregistered, live one still served
        assert_eq!(queue.observer_count(), 1);
        assert_eq!(rx_live.try_recv().unwrap().id, "a");
    }

    #[test]
    fn test_deregister_is_idempotent() {
        let queue = BroadcastQueue::new(0);
        let (handle, _rx, _) = queue.subscribe();

        queue.deregister(handle);
        queue.deregister(handle);
        assert_eq!(queue.observer_count(), 0);
    }

    #[test]
    fn test_deregistered_observer_receives_nothing() {
        let queue = BroadcastQueue::new(0);
        let (handle, mut rx, _) = queue.subscribe();
        queue.deregister(handle);

        queue.append(&[ev("a")]);
        // Sender side was dropped on deregistration
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_bounded_backlog_drops_oldest() {
        let queue = BroadcastQueue::new(3);
        queue.append(&[ev("a"), ev("b"), ev("c"), ev("d")]);

        assert_eq!(queue.backlog_len(), 3);
        let ids: Vec<_> = queue.snapshot().into_iter().map(|e| e.id).collect();
        assert_eq!(ids, ["b", "c", "d"]);
        // Total ingested still counts dropped events
        assert_eq!(queue.ingested_total(), 4);
    }

    #[test]
    fn test_backlog_len_tracks_appends() {
        let queue = BroadcastQueue::new(0);
        assert_eq!(queue.append(&[ev("a")]), 1);
        assert_eq!(queue.append(&[ev("b"), ev("c")]), 3);
    }
}
