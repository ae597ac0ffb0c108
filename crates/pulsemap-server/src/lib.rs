//! PulseMap event server.
//!
//! Producers POST typed map events to the ingestion endpoint; every
//! connected SSE observer receives the full backlog on connect and each
//! new event as it arrives. The [`queue::BroadcastQueue`] owns the
//! backlog and the observer registry; everything else is HTTP plumbing
//! around it.

pub mod cli;
pub mod config;
pub mod metrics;
pub mod queue;
pub mod server;
pub mod state;
pub mod traffic;

pub use config::*;
pub use queue::*;
pub use state::*;
