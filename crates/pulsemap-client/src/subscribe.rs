//! SSE subscription feeding the drain scheduler's FIFO.
//!
//! The decoder is incremental: network chunks can split a frame at any
//! byte, including inside a multi-byte UTF-8 character, so frames are
//! assembled from raw bytes and only decoded to text once complete.
//! Comment frames (keep-alives) are skipped, and a frame that fails to
//! decode is dropped with a debug log so one bad payload never kills
//! the subscription. Dropped or refused connections are retried with
//! capped exponential backoff, the way a browser `EventSource`
//! reconnects on its own.

use crate::scheduler::FifoHandle;
use futures_util::StreamExt;
use pulsemap_core::{Error, MapEvent, OneOrMany, Result};
use std::time::Duration;

/// First retry delay after a dropped or refused connection
pub const INITIAL_RETRY: Duration = Duration::from_secs(1);

/// Retry delay ceiling
pub const MAX_RETRY: Duration = Duration::from_secs(30);

/// Incremental decoder for `text/event-stream` payloads.
///
/// Frames are split on byte boundaries; text decoding happens once per
/// complete frame so chunk boundaries never corrupt multi-byte
/// characters.
#[derive(Debug, Default)]
pub struct FrameDecoder {
    buf: Vec<u8>,
}

impl FrameDecoder {
    /// Create an empty decoder
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed a network chunk; returns the events completed by it
    pub fn feed(&mut self, chunk: &[u8]) -> Vec<MapEvent> {
        // CR never appears inside a multi-byte UTF-8 sequence, so
        // dropping it from the byte stream keeps character boundaries
        // intact while normalizing CRLF frames
        self.buf.extend(chunk.iter().copied().filter(|&b| b != b'\r'));

        let mut events = Vec::new();
        while let Some(pos) = self.buf.windows(2).position(|w| w == b"\n\n") {
            let frame: Vec<u8> = self.buf.drain(..pos + 2).collect();
            events.extend(parse_frame(&String::from_utf8_lossy(&frame)));
        }
        events
    }
}

fn parse_frame(frame: &str) -> Vec<MapEvent> {
    let mut data = String::new();
    for line in frame.lines() {
        if line.starts_with(':') {
            // Comment frame, e.g. the server keep-alive
            continue;
        }
        if let Some(rest) = line.strip_prefix("data:") {
            if !data.is_empty() {
                data.push('\n');
            }
            data.push_str(rest.strip_prefix(' ').unwrap_or(rest));
        }
    }
    if data.is_empty() {
        return Vec::new();
    }

    match serde_json::from_str::<OneOrMany>(&data) {
        Ok(body) => body.into_vec(),
        Err(err) => {
            tracing::debug!(error = %err, "dropping malformed frame");
            Vec::new()
        }
    }
}

/// Subscribe to a streaming endpoint and push decoded events into the
/// FIFO.
///
/// Reconnects whenever the connection drops, is refused, or is closed
/// by the server; runs until the task is dropped. Backoff doubles up
/// to [`MAX_RETRY`] while the endpoint stays unreachable and resets
/// once a connection is established.
pub async fn subscribe(url: &str, fifo: FifoHandle) {
    let mut backoff = INITIAL_RETRY;
    loop {
        match stream_once(url, &fifo).await {
            Ok(()) => {
                tracing::warn!(url, "event stream closed by server, reconnecting");
                backoff = INITIAL_RETRY;
            }
            Err(err) if err.is_connect() => {
                tracing::warn!(url, error = %err, "connect failed, retrying");
            }
            Err(err) => {
                tracing::warn!(url, error = %err, "event stream failed, reconnecting");
                backoff = INITIAL_RETRY;
            }
        }
        tokio::time::sleep(backoff).await;
        backoff = (backoff * 2).min(MAX_RETRY);
    }
}

/// One connection attempt: decode frames until the server closes the
/// stream or the transport fails
async fn stream_once(url: &str, fifo: &FifoHandle) -> Result<()> {
    let response = reqwest::get(url)
        .await
        .and_then(|r| r.error_for_status())
        .map_err(|e| Error::connect(e.to_string()))?;

    tracing::info!(url, "subscribed to event stream");

    let mut stream = response.bytes_stream();
    let mut decoder = FrameDecoder::new();

    while let Some(chunk) = stream.next().await {
        let chunk = chunk.map_err(|e| Error::stream(e.to_string()))?;
        let events = decoder.feed(&chunk);
        if !events.is_empty() {
            fifo.extend(events);
        }
    }

    Ok(())
}
