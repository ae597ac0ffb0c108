//! Per-event validation applied by the ingestion endpoint.
//!
//! The `type` field is already closed by the [`EventKind`] enum at
//! deserialization time; this module covers the constraints serde cannot
//! express: non-empty identifiers, a strictly positive duration, and the
//! packet/target pairing. Batch validation is all-or-nothing so a single
//! bad event never lets its siblings through.

use crate::event::{EventKind, MapEvent};

/// A constraint violation on a single event
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    /// `id` missing or empty
    #[error("event is missing a non-empty id")]
    MissingId,

    /// `city` missing or empty
    #[error("event {0:?} is missing a non-empty city")]
    MissingCity(String),

    /// `duration` present but zero, negative, or not finite
    #[error("event {0:?} has a non-positive duration")]
    InvalidDuration(String),

    /// `target` missing or empty on a packet event
    #[error("packet event {0:?} requires a target city")]
    MissingTarget(String),
}

/// Validate a single event against the ingestion constraints
pub fn validate(event: &MapEvent) -> Result<(), ValidationError> {
    if event.id.trim().is_empty() {
        return Err(ValidationError::MissingId);
    }
    if event.city.trim().is_empty() {
        return Err(ValidationError::MissingCity(event.id.clone()));
    }
    if let Some(duration) = event.duration {
        if !duration.is_finite() || duration <= 0.0 {
            return Err(ValidationError::InvalidDuration(event.id.clone()));
        }
    }
    if event.kind == EventKind::Packet
        && event.target.as_deref().map_or(true, |t| t.trim().is_empty())
    {
        return Err(ValidationError::MissingTarget(event.id.clone()));
    }
    Ok(())
}

/// Validate every event in a batch, failing on the first violation.
///
/// Callers must not append any event when this returns an error.
pub fn validate_batch(events: &[MapEvent]) -> Result<(), ValidationError> {
    for event in events {
        validate(event)?;
    }
    Ok(())
}
