//! Capability token restricting engine-only mutation of [`FrameContext`].
//!
//! [`EngineTag`] is a zero-sized value that can only be constructed from
//! within this crate. Every `FrameContext` method documented as
//! "engine-only" in the data model takes one by reference. External code
//! never manufactures one directly; instead it drives the frame through
//! [`crate::concurrency::Coordinator`], whose phase-stepping methods mint a
//! tag internally and use it to perform the mutation on the caller's
//! behalf. This mirrors a friend-class restriction without requiring a
//! runtime check: the token's constructor visibility *is* the restriction.
//!
//! [`FrameContext`]: crate::frame_context::FrameContext

#[derive(Debug, Clone, Copy)]
pub struct EngineTag(());

impl EngineTag {
    pub(crate) fn issue() -> Self {
        EngineTag(())
    }
}
