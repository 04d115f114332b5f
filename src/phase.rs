//! The fixed, totally-ordered sequence of phases a frame moves through, and
//! the registry that declares which state layers each phase may mutate.
//!
//! Phases are *not* a free-form graph: a frame advances through this list in
//! order, once per phase, every frame. The registry in this module is the
//! single source of truth consulted by [`crate::frame_context::FrameContext`]
//! whenever a mutator needs to check whether it is allowed to run.

use std::fmt;

/// One step of the frame sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Phase {
    FrameStart,
    Input,
    SceneMutation,
    FrameGraph,
    SnapshotBuild,
    ParallelTasks,
    CommandRecord,
    Present,
    FrameEnd,
}

impl Phase {
    /// All phases, in frame order.
    pub const ORDER: [Phase; 9] = [
        Phase::FrameStart,
        Phase::Input,
        Phase::SceneMutation,
        Phase::FrameGraph,
        Phase::SnapshotBuild,
        Phase::ParallelTasks,
        Phase::CommandRecord,
        Phase::Present,
        Phase::FrameEnd,
    ];

    /// The phase that follows this one, wrapping back to [`Phase::FrameStart`]
    /// after [`Phase::FrameEnd`].
    #[must_use]
    pub fn next(self) -> Phase {
        let idx = Self::ORDER.iter().position(|p| *p == self).unwrap();
        Self::ORDER[(idx + 1) % Self::ORDER.len()]
    }

    /// Whether engine-owned state (device handles, fences, thread pool,
    /// surfaces list, timing) may be mutated during this phase.
    ///
    /// Engine-only mutation always additionally requires an [`EngineTag`]
    /// capability token; this flag only reports phase eligibility.
    #[must_use]
    pub fn allows_engine_state_mutation(self) -> bool {
        matches!(
            self,
            Phase::FrameStart
                | Phase::SnapshotBuild
                | Phase::CommandRecord
                | Phase::Present
                | Phase::FrameEnd
        )
    }

    /// Whether game state (views, scene, entity command buffer, user
    /// context) may be mutated during this phase.
    #[must_use]
    pub fn allows_game_state_mutation(self) -> bool {
        matches!(
            self,
            Phase::FrameStart | Phase::Input | Phase::SceneMutation | Phase::FrameEnd
        )
    }

    /// Whether frame-scoped state (render graph assembly, per-frame scratch)
    /// may be mutated during this phase.
    #[must_use]
    pub fn allows_frame_state_mutation(self) -> bool {
        matches!(
            self,
            Phase::FrameStart
                | Phase::Input
                | Phase::SceneMutation
                | Phase::FrameGraph
                | Phase::FrameEnd
        )
    }

    /// Whether view descriptors may be added, updated or cleared during this
    /// phase (§4.1 phase gating rules: FrameStart, SceneMutation, FrameGraph).
    #[must_use]
    pub fn allows_view_mutation(self) -> bool {
        matches!(
            self,
            Phase::FrameStart | Phase::SceneMutation | Phase::FrameGraph
        )
    }

    /// Whether surfaces may be structurally added/removed during this phase
    /// (§4.1: FrameStart or SceneMutation only; presentable flags may be
    /// toggled later, see [`Phase::allows_presentable_flag_mutation`]).
    #[must_use]
    pub fn allows_structural_surface_mutation(self) -> bool {
        matches!(self, Phase::FrameStart | Phase::SceneMutation)
    }

    /// Whether per-surface presentable flags may be toggled during this
    /// phase. Flags are written during `CommandRecord` (workers mark their
    /// surfaces ready) and read during `Present`.
    #[must_use]
    pub fn allows_presentable_flag_mutation(self) -> bool {
        matches!(
            self,
            Phase::FrameStart | Phase::SceneMutation | Phase::CommandRecord
        )
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn order_wraps_from_frame_end_to_frame_start() {
        assert_eq!(Phase::FrameEnd.next(), Phase::FrameStart);
    }

    #[test]
    fn order_is_sequential() {
        for w in Phase::ORDER.windows(2) {
            assert_eq!(w[0].next(), w[1]);
        }
    }

    #[test]
    fn snapshot_build_is_engine_only_for_game_and_frame_state() {
        assert!(Phase::SnapshotBuild.allows_engine_state_mutation());
        assert!(!Phase::SnapshotBuild.allows_game_state_mutation());
        assert!(!Phase::SnapshotBuild.allows_frame_state_mutation());
    }

    #[test]
    fn views_mutable_only_in_three_phases() {
        for p in Phase::ORDER {
            let expected = matches!(
                p,
                Phase::FrameStart | Phase::SceneMutation | Phase::FrameGraph
            );
            assert_eq!(p.allows_view_mutation(), expected, "{p:?}");
        }
    }

    #[test]
    fn presentable_flags_writable_during_command_record() {
        assert!(Phase::CommandRecord.allows_presentable_flag_mutation());
        assert!(!Phase::CommandRecord.allows_structural_surface_mutation());
        assert!(!Phase::Present.allows_presentable_flag_mutation());
    }
}
