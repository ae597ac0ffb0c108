//! Animation dispatch contract.
//!
//! Rendering itself is out of scope; this module pins down how the
//! active set is consumed. The projection and tween engine are external
//! collaborators behind traits, and the dispatcher's only jobs are
//! duplicate suppression by id, sentinel handling for unknown cities,
//! and handing each eligible event to the tween engine exactly once.

use crate::scheduler::ActiveEvent;
use pulsemap_core::{CityRegistry, EventKind, COORD_SENTINEL};
use std::collections::HashSet;
use std::sync::Arc;

/// Geographic-to-screen projection, `(lng, lat) -> (x, y)`
pub trait Projection {
    /// Project a coordinate pair to screen space
    fn project(&self, lng: f64, lat: f64) -> (f64, f64);
}

/// Cancellation handle for a scheduled tween
pub trait TweenHandle: Send {
    /// Stop the tween before completion
    fn cancel(&mut self);
}

/// Wall-clock progress driver: advances 0..1 over a duration, calling
/// back on each tick and once on completion
pub trait TweenEngine {
    /// Schedule a single-shot tween
    fn schedule(
        &self,
        duration_secs: f64,
        on_update: Box<dyn FnMut(f64) + Send>,
        on_complete: Box<dyn FnOnce() + Send>,
    ) -> Box<dyn TweenHandle>;
}

/// One visual update produced while a tween runs
#[derive(Debug, Clone, PartialEq)]
pub struct EffectFrame {
    /// Event id the frame belongs to
    pub id: String,
    /// Animation kind
    pub kind: EventKind,
    /// Resolved color
    pub color: String,
    /// Screen-space x; interpolated for packets
    pub x: f64,
    /// Screen-space y; interpolated for packets
    pub y: f64,
    /// Tween progress, 0..1
    pub progress: f64,
}

/// Receiver for visual updates; the render surface implements this
pub trait EffectSink: Send + Sync {
    /// A tween produced a frame
    fn frame(&self, frame: EffectFrame);
    /// A tween finished
    fn completed(&self, id: &str);
}

/// Consumes the active set and starts one animation per new event id
pub struct AnimationDispatcher<P, T> {
    projection: P,
    tweens: T,
    registry: CityRegistry,
    sink: Arc<dyn EffectSink>,
    seen: HashSet<String>,
}

impl<P: Projection, T: TweenEngine> AnimationDispatcher<P, T> {
    /// Wire the dispatcher to its collaborators
    pub fn new(projection: P, tweens: T, registry: CityRegistry, sink: Arc<dyn EffectSink>) -> Self {
        Self {
            projection,
            tweens,
            registry,
            sink,
            seen: HashSet::new(),
        }
    }

    /// Process the active set, starting tweens for events not seen
    /// before. Returns the number of animations started.
    ///
    /// Inert events (unknown city or target, packet without target) are
    /// consumed silently. The suppression set is pruned to ids still
    /// active, so it stays bounded by the active set size.
    pub fn dispatch(&mut self, active: &[ActiveEvent]) -> usize {
        let mut started = 0;

        for entry in active {
            let event = &entry.event;
            if !self.seen.insert(event.id.clone()) {
                continue;
            }

            let origin = self.registry.coords(&event.city);
            if origin == COORD_SENTINEL {
                tracing::trace!(id = %event.id, city = %event.city, "unknown city, skipping");
                continue;
            }

            let duration = event.duration_secs();
            let color = event.color().to_string();

            match event.kind {
                EventKind::Pulse | EventKind::Ripple => {
                    let (x, y) = self.projection.project(origin.0, origin.1);
                    self.start_tween(event.id.clone(), event.kind, color, duration, (x, y), None);
                }
                EventKind::Packet => {
                    let Some(target) = event.target.as_deref() else {
                        // Ingestion rejects these now; older backlogs may
                        // still replay them
                        continue;
                    };
                    let dest = self.registry.coords(target);
                    if dest == COORD_SENTINEL {
                        tracing::trace!(id = %event.id, target, "unknown target, skipping");
                        continue;
                    }
                    let from = self.projection.project(origin.0, origin.1);
                    let to = self.projection.project(dest.0, dest.1);
                    self.start_tween(event.id.clone(), event.kind, color, duration, from, Some(to));
                }
            }
            started += 1;
        }

        let live: HashSet<&str> = active.iter().map(|a| a.event.id.as_str()).collect();
        self.seen.retain(|id| live.contains(id.as_str()));

        started
    }

    fn start_tween(
        &self,
        id: String,
        kind: EventKind,
        color: String,
        duration_secs: f64,
        from: (f64, f64),
        to: Option<(f64, f64)>,
    ) {
        let sink = Arc::clone(&self.sink);
        let frame_id = id.clone();
        let on_update: Box<dyn FnMut(f64) + Send> = Box::new(move |progress| {
            let (x, y) = match to {
                Some(to) => (
                    from.0 + (to.0 - from.0) * progress,
                    from.1 + (to.1 - from.1) * progress,
                ),
                None => from,
            };
            sink.frame(EffectFrame {
                id: frame_id.clone(),
                kind,
                color: color.clone(),
                x,
                y,
                progress,
            });
        });

        let sink = Arc::clone(&self.sink);
        let on_complete: Box<dyn FnOnce() + Send> = Box::new(move || sink.completed(&id));

        // Single-shot tween; the engine owns its lifecycle from here
        let _handle = self.tweens.schedule(duration_secs, on_update, on_complete);
    }
}
