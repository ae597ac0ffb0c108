//! Ingestion, health, and stats handlers

use crate::state::AppState;
use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use bytes::Bytes;
use pulsemap_core::{validate_batch, MapEvent, ValidationError};
use serde::Serialize;

/// Why an ingestion request was rejected.
///
/// A body that does not parse at all is reported differently from one
/// that parses but violates the event schema; both reject the whole
/// request with no partial append.
#[derive(Debug, thiserror::Error)]
pub enum IngestError {
    /// Body is not valid JSON
    #[error("invalid JSON")]
    Malformed(#[source] serde_json::Error),

    /// Body is JSON but not a map event (missing field, unknown type, ...)
    #[error("{0}")]
    Schema(String),

    /// A field constraint failed
    #[error(transparent)]
    Validation(#[from] ValidationError),
}

impl IngestError {
    fn kind(&self) -> &'static str {
        match self {
            Self::Malformed(_) => "malformed_input",
            Self::Schema(_) | Self::Validation(_) => "schema_invalid",
        }
    }
}

impl IntoResponse for IngestError {
    fn into_response(self) -> Response {
        let body = serde_json::json!({
            "error": self.to_string(),
            "kind": self.kind(),
        });
        (StatusCode::BAD_REQUEST, Json(body)).into_response()
    }
}

/// Successful ingestion response
#[derive(Debug, Serialize)]
pub struct IngestResponse {
    /// Events accepted by this request
    pub queued: usize,
    /// Backlog length after the append
    pub total: usize,
}

/// `POST /api/events` — validate and append one event or an array.
///
/// The batch is atomic: if any event fails validation, none are
/// appended and the response names the violated constraint.
pub async fn ingest(State(state): State<AppState>, body: Bytes) -> Response {
    match ingest_inner(&state, &body) {
        Ok(response) => {
            state.metrics.record_accepted();
            Json(response).into_response()
        }
        Err(err) => {
            state.metrics.record_rejected();
            tracing::debug!(error = %err, "ingestion rejected");
            err.into_response()
        }
    }
}

fn ingest_inner(state: &AppState, body: &[u8]) -> Result<IngestResponse, IngestError> {
    // Two-stage parse keeps "not JSON" distinct from "not an event"
    let value: serde_json::Value =
        serde_json::from_slice(body).map_err(IngestError::Malformed)?;

    // Branch on shape instead of an untagged enum so serde's
    // field-level messages (e.g. "missing field `id`") reach the
    // producer intact
    let events: Vec<MapEvent> = if value.is_array() {
        serde_json::from_value(value).map_err(|e| IngestError::Schema(e.to_string()))?
    } else {
        let event: MapEvent =
            serde_json::from_value(value).map_err(|e| IngestError::Schema(e.to_string()))?;
        vec![event]
    };

    validate_batch(&events)?;

    let queued = events.len();
    let total = state.queue.append(&events);
    tracing::info!(queued, total, "events queued");

    Ok(IngestResponse { queued, total })
}

/// `GET /api/health`
pub async fn health() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "ok" }))
}

/// `GET /api/stats`
pub async fn stats(State(state): State<AppState>) -> impl IntoResponse {
    let snapshot = state.metrics.snapshot(
        state.queue.backlog_len(),
        state.queue.observer_count(),
        state.queue.ingested_total(),
    );
    Json(snapshot)
}
