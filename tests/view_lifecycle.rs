//! End-to-end view lifecycle: sync -> publish -> reap (§4.2, E2E-1/E2E-5).

mod common;

use std::sync::atomic::Ordering;

use frame_core::backend::SceneNodeId;
use frame_core::config::EngineConfig;
use frame_core::frame::FrameSequenceNumber;
use frame_core::frame_context::{FrameContext, FrameContextInit};
use frame_core::phase::Phase;
use frame_core::view::lifecycle::ViewLifecycleService;
use frame_core::view::{ViewDescriptor, ViewId, ViewIntent};
use frame_core::Coordinator;

use common::{FakeBackend, NoopRenderer};

fn scene_descriptor(id: u64) -> ViewDescriptor {
    ViewDescriptor {
        id: ViewId(id),
        name: format!("scene-{id}"),
        intent: ViewIntent {
            camera_node: Some(SceneNodeId(id)),
            force_wireframe: false,
        },
        viewport: (1920, 1080),
        enable_hdr: true,
        clear_color: None,
        z_order: 0,
        is_tools_overlay: false,
    }
}

#[test]
fn first_sync_registers_once_later_syncs_only_update() {
    let backend = FakeBackend::default();
    let config = EngineConfig::default();
    let mut svc = ViewLifecycleService::new();
    let mut ctx = FrameContext::new(FrameContextInit::default());
    let coordinator = Coordinator::new();
    let renderer = NoopRenderer::default();

    coordinator.enter_phase(&ctx, Phase::FrameStart);

    svc.sync_active_views(FrameSequenceNumber(1), &[scene_descriptor(1)], None, &backend, &config);
    let first = svc.publish_views(&mut ctx, &renderer);
    assert_eq!(first.len(), 1);
    assert!(first[0].is_ok());
    assert_eq!(renderer.registrations.load(Ordering::Relaxed), 1);
    assert_eq!(renderer.updates.load(Ordering::Relaxed), 0);

    for frame in 2..5 {
        svc.sync_active_views(
            FrameSequenceNumber(frame),
            &[scene_descriptor(1)],
            None,
            &backend,
            &config,
        );
        svc.publish_views(&mut ctx, &renderer);
    }

    assert_eq!(renderer.registrations.load(Ordering::Relaxed), 1, "no re-registration for an unchanged id");
    assert_eq!(renderer.updates.load(Ordering::Relaxed), 3);
}

#[test]
fn stale_view_is_reaped_and_unregistered() {
    let backend = FakeBackend::default();
    let config = EngineConfig::default().with_view_reap_threshold(2);
    let mut svc = ViewLifecycleService::new();
    let mut ctx = FrameContext::new(FrameContextInit::default());
    let coordinator = Coordinator::new();
    let renderer = NoopRenderer::default();

    coordinator.enter_phase(&ctx, Phase::FrameStart);

    svc.sync_active_views(FrameSequenceNumber(1), &[scene_descriptor(9)], None, &backend, &config);
    svc.publish_views(&mut ctx, &renderer);
    assert_eq!(renderer.registrations.load(Ordering::Relaxed), 1);

    // View 9 never syncs again; by frame 10 it is far past the reap threshold.
    svc.unpublish_stale_views(FrameSequenceNumber(10), config.view_reap_threshold, &mut ctx, &renderer);

    assert!(svc.record(ViewId(9)).is_none());
    assert_eq!(renderer.unregistrations.load(Ordering::Relaxed), 1);
}

#[test]
fn views_are_ordered_by_z_order_then_submission_order() {
    let backend = FakeBackend::default();
    let config = EngineConfig::default();
    let mut svc = ViewLifecycleService::new();

    let mut back = scene_descriptor(1);
    back.z_order = 10;
    let mut front = scene_descriptor(2);
    front.z_order = -5;

    svc.sync_active_views(FrameSequenceNumber(1), &[back, front], None, &backend, &config);

    assert_eq!(svc.ordered_active_views(), &[ViewId(2), ViewId(1)]);
}
