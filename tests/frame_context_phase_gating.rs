//! Phase discipline (§8 universal invariant 3): gated mutators debug-assert
//! when called outside their allowed phases. Integration tests build in the
//! `dev` profile by default, so `debug_assert!` is live here exactly as it
//! would be in a debug build of the embedding application.

mod common;

use frame_core::frame_context::{FrameContext, FrameContextInit};
use frame_core::phase::Phase;
use frame_core::surface::{FramebufferCache, SurfaceRegistry};
use frame_core::Coordinator;

use common::FakeBackend;

#[test]
#[should_panic(expected = "set_views")]
fn mutating_views_outside_allowed_phase_panics_in_debug() {
    let ctx = FrameContext::new(FrameContextInit::default());
    let coordinator = Coordinator::new();

    coordinator.enter_phase(&ctx, Phase::ParallelTasks);
    ctx.set_views(vec![]);
}

#[test]
#[should_panic(expected = "reconcile_surfaces")]
fn reconciling_surfaces_outside_allowed_phase_panics_in_debug() {
    let ctx = FrameContext::new(FrameContextInit::default());
    let coordinator = Coordinator::new();
    let registry = SurfaceRegistry::new();
    let mut cache = FramebufferCache::new();
    let backend = FakeBackend::default();

    // Surfaces may only be structurally reconciled during FrameStart or
    // SceneMutation; CommandRecord must not be able to perform one.
    coordinator.enter_phase(&ctx, Phase::CommandRecord);
    coordinator.run_frame_start_surface_sync(&registry, &mut cache, &ctx, &backend);
}

#[test]
fn views_mutate_freely_across_the_three_allowed_phases() {
    let ctx = FrameContext::new(FrameContextInit::default());
    let coordinator = Coordinator::new();

    for phase in [Phase::FrameStart, Phase::SceneMutation, Phase::FrameGraph] {
        coordinator.enter_phase(&ctx, phase);
        ctx.set_views(vec![]);
    }
}
