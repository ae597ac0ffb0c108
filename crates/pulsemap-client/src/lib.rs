//! Observer-side pipeline for PulseMap events.
//!
//! The streaming endpoint can deliver bursts far faster than a renderer
//! can animate them, so events are never handed straight to the render
//! surface. They land in a local FIFO, a fixed-period tick moves a
//! bounded batch into the active set, and each activated event is
//! evicted once its animation lifetime (plus a grace second) elapses.
//! The active set is therefore bounded by arrival rate times duration,
//! not by FIFO depth.

pub mod dispatch;
pub mod scheduler;
pub mod subscribe;

pub use dispatch::{AnimationDispatcher, EffectFrame, EffectSink, Projection, TweenEngine, TweenHandle};
pub use scheduler::{ActiveEvent, DrainConfig, DrainScheduler, FifoHandle};
pub use subscribe::{subscribe, FrameDecoder};
