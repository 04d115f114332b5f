//! Crate-wide error type.
//!
//! Most of this core's fallible surface is intentionally *not*
//! [`Result`]-returning: phase violations and missing-resource preconditions
//! follow the assert-in-debug / silent-no-op-in-release model described by
//! the error taxonomy (§7), surface registration/destruction/resize report
//! success or failure through a completion callback rather than a `Result`
//! (§4.5, mirroring the source engine's async registry), and recoverable
//! per-view allocation failures are routed through the frame context's error
//! bag ([`crate::frame_context::errors_bag::ErrorBag`]). `FrameError` covers the one
//! remaining operation where returning a typed error to the caller is the
//! right contract: building a [`crate::view::plan::ViewRenderPlan`] from a
//! caller-supplied spec that violates one of its invariants.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, FrameError>;

#[derive(Debug, Error)]
pub enum FrameError {
    #[error("view render plan violates invariant: {0}")]
    InvalidViewRenderPlan(&'static str),
}
