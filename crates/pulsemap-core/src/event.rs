//! The map event data model.
//!
//! A [`MapEvent`] is the atomic unit of the pipeline: an immutable,
//! uniquely identified instruction to animate something at (or between)
//! named locations. Events are created by producers, appended to the
//! server backlog, fanned out to observers, and eventually evicted from
//! the client's active set once their animation lifetime elapses.

use serde::{Deserialize, Serialize};

/// Accent color applied when an event carries no `color` override
pub const DEFAULT_COLOR: &str = "#10b981";

/// Animation length used when an event carries no `duration`
pub const DEFAULT_DURATION_SECS: f64 = 1.5;

/// The closed set of animation kinds.
///
/// Unknown strings fail deserialization, which the ingestion endpoint
/// reports as a schema error rather than a malformed request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventKind {
    /// Expanding filled circle at the origin city
    Pulse,
    /// Concentric rings at the origin city
    Ripple,
    /// A dot travelling from `city` to `target`
    Packet,
}

/// A single map event, immutable once created.
///
/// Re-delivery of the same `id` is a duplicate, not a new animation;
/// consumers key suppression and eviction on it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MapEvent {
    /// Globally unique identifier per logical occurrence
    pub id: String,

    /// Origin city name, resolved against the [`crate::CityRegistry`].
    /// An unknown city is accepted but inert at animation time.
    pub city: String,

    /// Animation kind
    #[serde(rename = "type")]
    pub kind: EventKind,

    /// Override color (default: [`DEFAULT_COLOR`])
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,

    /// Animation duration in seconds (default: [`DEFAULT_DURATION_SECS`]);
    /// also governs client-side eviction timing
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration: Option<f64>,

    /// Destination city name, required for [`EventKind::Packet`]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target: Option<String>,
}

impl MapEvent {
    /// Create an event with only the required fields set
    pub fn new(id: impl Into<String>, city: impl Into<String>, kind: EventKind) -> Self {
        Self {
            id: id.into(),
            city: city.into(),
            kind,
            color: None,
            duration: None,
            target: None,
        }
    }

    /// Effective animation duration in seconds
    pub fn duration_secs(&self) -> f64 {
        self.duration.unwrap_or(DEFAULT_DURATION_SECS)
    }

    /// Effective color
    pub fn color(&self) -> &str {
        self.color.as_deref().unwrap_or(DEFAULT_COLOR)
    }
}

/// Ingestion body shape: producers may POST one event or an array.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum OneOrMany {
    /// A single event object
    One(MapEvent),
    /// An array of events, appended in order
    Many(Vec<MapEvent>),
}

impl OneOrMany {
    /// Flatten into a vector, preserving order
    pub fn into_vec(self) -> Vec<MapEvent> {
        match self {
            Self::One(event) => vec![event],
            Self::Many(events) => events,
        }
    }
}
