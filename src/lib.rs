//! `frame-core`: the phase-gated frame execution core of a real-time
//! renderer.
//!
//! This crate owns the frame context (per-frame state, phase gating,
//! double-buffered snapshot publication), the view lifecycle (resource
//! recreation, stable sort, reaping, frame-plan classification), the
//! per-view pass orchestrator, and the surface registry. It never touches a
//! GPU directly or implements a scene graph — those are supplied by the
//! embedding application through the narrow contracts in [`backend`].

pub mod backend;
pub mod capability;
pub mod concurrency;
pub mod config;
pub mod errors;
pub mod frame;
pub mod frame_context;
pub mod phase;
pub mod pipeline;
pub mod surface;
pub mod telemetry;
pub mod view;

pub use capability::EngineTag;
pub use concurrency::Coordinator;
pub use errors::{FrameError, Result};
pub use frame::{Epoch, FrameSequenceNumber, FrameSlot};
pub use frame_context::{FrameContext, FrameContextInit};
pub use phase::Phase;
