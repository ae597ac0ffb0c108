//! Core types for the PulseMap event-distribution pipeline.
//!
//! This crate holds everything shared between the server (ingestion +
//! fan-out) and the client (drain scheduling + animation dispatch):
//! the [`MapEvent`] data model, per-event validation, the city registry,
//! and the common error type.

pub mod error;
pub mod event;
pub mod geo;
pub mod validate;

pub use error::{Error, Result};
pub use event::{EventKind, MapEvent, OneOrMany, DEFAULT_COLOR, DEFAULT_DURATION_SECS};
pub use geo::{CityRegistry, Connection, COORD_SENTINEL, DEFAULT_CONNECTIONS};
pub use validate::{validate, validate_batch, ValidationError};
