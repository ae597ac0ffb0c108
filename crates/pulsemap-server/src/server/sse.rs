//! SSE streaming handler.
//!
//! Each connection replays the current backlog, then live-streams new
//! events, one JSON-encoded event per `data:` frame. The subscription is
//! taken atomically from the broadcast queue so no event is both
//! replayed and live-pushed. A guard deregisters the observer when the
//! response stream is dropped — client disconnect is the only
//! cancellation signal, and a write failure surfaces as exactly that.

use crate::queue::{BroadcastQueue, ObserverHandle};
use crate::state::AppState;
use axum::{
    extract::State,
    response::sse::{Event, KeepAlive, Sse},
};
use futures::stream::{self, Stream, StreamExt};
use pulsemap_core::MapEvent;
use std::convert::Infallible;
use std::sync::Arc;

/// Deregisters the observer when the SSE stream is dropped
struct ObserverGuard {
    queue: Arc<BroadcastQueue>,
    handle: ObserverHandle,
}

impl Drop for ObserverGuard {
    fn drop(&mut self) {
        self.queue.deregister(self.handle);
    }
}

fn frame(event: &MapEvent) -> Result<Event, Infallible> {
    match serde_json::to_string(event) {
        Ok(json) => Ok(Event::default().data(json)),
        Err(err) => {
            // Should not happen for a MapEvent; keep the stream alive
            tracing::error!(error = %err, id = %event.id, "failed to encode event");
            Ok(Event::default().comment("encode error"))
        }
    }
}

/// `GET /api/events` — long-lived event stream
pub async fn stream_events(
    State(state): State<AppState>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let (handle, rx, replay) = state.queue.subscribe();
    let guard = ObserverGuard {
        queue: state.queue.clone(),
        handle,
    };

    tracing::info!(replay = replay.len(), "observer connected");

    let replay_stream = stream::iter(replay).map(|event| frame(&event));

    // The guard rides along with the receiver; dropping the response
    // stream drops both and removes the observer from the registry.
    let live_stream = stream::unfold((rx, guard), |(mut rx, guard)| async move {
        let event = rx.recv().await?;
        Some((frame(&event), (rx, guard)))
    });

    Sse::new(replay_stream.chain(live_stream)).keep_alive(
        KeepAlive::new()
            .interval(state.config.keep_alive())
            .text("keep-alive"),
    )
}
