//! Surface registration, resize and reconciliation (§4.5, E2E-2).

mod common;

use std::sync::atomic::Ordering;
use std::sync::Arc;

use frame_core::frame_context::{FrameContext, FrameContextInit};
use frame_core::phase::Phase;
use frame_core::surface::{FramebufferCache, SurfaceKey, SurfaceRegistry};
use frame_core::Coordinator;

use common::{FakeBackend, FakeSurface};

#[test]
fn registration_commits_and_reconciles_into_the_frame_context() {
    let registry = SurfaceRegistry::new();
    let mut cache = FramebufferCache::new();
    let backend = FakeBackend::default();
    let ctx = FrameContext::new(FrameContextInit::default());
    let coordinator = Coordinator::new();

    let key = SurfaceKey(1);
    let surface: Arc<dyn frame_core::backend::Surface> = Arc::new(FakeSurface::new(800, 600));
    let callback_ran = Arc::new(std::sync::atomic::AtomicBool::new(false));
    let callback_ran_clone = Arc::clone(&callback_ran);
    registry.register_async(
        key,
        surface,
        Box::new(move |ok| callback_ran_clone.store(ok, Ordering::Relaxed)),
    );

    coordinator.enter_phase(&ctx, Phase::FrameStart);
    coordinator.run_frame_start_surface_sync(&registry, &mut cache, &ctx, &backend);

    assert!(callback_ran.load(Ordering::Relaxed));
    assert_eq!(ctx.surfaces(), vec![key]);
    assert!(ctx.is_surface_presentable(0), "reconciliation initializes every surface as presentable");
}

#[test]
fn resize_drops_and_rebuilds_the_framebuffer_cache() {
    let registry = SurfaceRegistry::new();
    let mut cache = FramebufferCache::new();
    let backend = FakeBackend::default();
    let ctx = FrameContext::new(FrameContextInit::default());
    let coordinator = Coordinator::new();

    let key = SurfaceKey(1);
    let surface = Arc::new(FakeSurface::new(800, 600));
    registry.register_async(key, surface.clone(), Box::new(|_| {}));

    coordinator.enter_phase(&ctx, Phase::FrameStart);
    coordinator.run_frame_start_surface_sync(&registry, &mut cache, &ctx, &backend);
    cache.ensure(key, surface.as_ref(), 2, &backend);
    assert_eq!(cache.get(key).map(|fbs| fbs.len()), Some(2));

    surface.request_resize(1920, 1080);
    let resized = Arc::new(std::sync::atomic::AtomicBool::new(false));
    let resized_clone = Arc::clone(&resized);
    registry.request_resize(key, Box::new(move |ok| resized_clone.store(ok, Ordering::Relaxed)));

    coordinator.run_frame_start_surface_sync(&registry, &mut cache, &ctx, &backend);

    assert!(resized.load(Ordering::Relaxed));
    assert!(cache.get(key).is_none(), "resize must drop the stale cached framebuffers");
}

#[test]
fn destruction_removes_the_surface_and_its_cache() {
    let registry = SurfaceRegistry::new();
    let mut cache = FramebufferCache::new();
    let backend = FakeBackend::default();
    let ctx = FrameContext::new(FrameContextInit::default());
    let coordinator = Coordinator::new();

    let key = SurfaceKey(7);
    let surface = Arc::new(FakeSurface::new(640, 480));
    registry.register_async(key, surface.clone(), Box::new(|_| {}));
    coordinator.enter_phase(&ctx, Phase::FrameStart);
    coordinator.run_frame_start_surface_sync(&registry, &mut cache, &ctx, &backend);
    cache.ensure(key, surface.as_ref(), 1, &backend);

    registry.destroy_async(key, Box::new(|_| {}));
    coordinator.run_frame_start_surface_sync(&registry, &mut cache, &ctx, &backend);

    assert!(ctx.surfaces().is_empty());
    assert!(cache.get(key).is_none());
}
