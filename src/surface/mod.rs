//! Surface registry and presentable-flag bookkeeping (§3.3, §4.5).
//!
//! A surface is a presentation target owned by the embedding application
//! (a window, an offscreen target the host composites itself); this core
//! only tracks identity, liveness and the per-frame "ready to present" flag
//! for each one, and reconciles the registry against the backend's surface
//! list when asked.

pub mod registry;
pub mod sync;

/// Stable identifier for a registered surface. Index into
/// [`crate::frame_context::state::EngineState`]'s parallel surfaces/
/// presentable-flags vectors, so a surface's key never changes for as long
/// as it stays registered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SurfaceKey(pub u32);

pub use registry::SurfaceRegistry;
pub use sync::{run_frame_start_sync, FramebufferCache};
