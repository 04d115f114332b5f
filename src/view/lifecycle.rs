//! View lifecycle service (§4.2). Keeps one [`ViewRecord`] per active view
//! descriptor in sync, publishes views into the frame context, and reaps
//! records that have gone idle for too long.

use std::sync::Arc;

use rustc_hash::FxHashMap;

use crate::backend::{Framebuffer, GraphicsBackend, RendererRuntime};
use crate::config::EngineConfig;
use crate::frame::FrameSequenceNumber;
use crate::frame_context::FrameContext;
use crate::view::{ViewDescriptor, ViewId};
use crate::view::record::ViewRecord;

/// Per-view render-target wiring built by [`ViewLifecycleService::publish_views`],
/// handed to the renderer/pipeline layer (§4.2 operation 2).
pub struct ViewContext {
    pub view_id: ViewId,
    pub is_scene: bool,
    pub render_target: Arc<dyn Framebuffer>,
    pub composite_source: Arc<dyn Framebuffer>,
}

/// Reason a view was skipped during publication.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PublishSkipReason {
    MissingSdrResources,
    SceneViewMissingHdrResources,
}

#[derive(Default)]
pub struct ViewLifecycleService {
    pool: FxHashMap<ViewId, ViewRecord>,
    ordered_active_views: Vec<ViewId>,
    next_submission_order: u32,
}

impl ViewLifecycleService {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Operation 1 (§4.2): normalizes viewports, ensures resources, and
    /// rebuilds the stable-sorted active-view order.
    ///
    /// # Panics
    /// Panics if `descriptors` contains the same [`ViewId`] twice; a
    /// duplicate id within a single sync is a caller bug (§4.2 failure
    /// model: "asserted").
    pub fn sync_active_views(
        &mut self,
        current_frame: FrameSequenceNumber,
        descriptors: &[ViewDescriptor],
        composite_target_size: Option<(u32, u32)>,
        backend: &dyn GraphicsBackend,
        config: &EngineConfig,
    ) {
        self.ordered_active_views.clear();

        let mut seen = rustc_hash::FxHashSet::default();
        for descriptor in descriptors {
            assert!(
                seen.insert(descriptor.id),
                "duplicate view id {:?} within a single sync",
                descriptor.id
            );

            let (mut width, mut height) = descriptor.viewport;
            if width == 0 || height == 0 {
                let (fw, fh) = composite_target_size.unwrap_or(config.fallback_viewport);
                width = fw;
                height = fh;
            }

            let submission_order = self.next_submission_order;
            self.next_submission_order = self.next_submission_order.wrapping_add(1);

            let record = self
                .pool
                .entry(descriptor.id)
                .or_insert_with(|| ViewRecord::new(descriptor.clone(), submission_order));
            record.touch(descriptor.clone(), submission_order, current_frame);

            let clear_color = descriptor.clear_color.unwrap_or(config.default_clear_color);
            record.ensure_resources(width, height, descriptor.enable_hdr, clear_color, backend);

            self.ordered_active_views.push(descriptor.id);
        }

        let pool = &self.pool;
        self.ordered_active_views.sort_by(|a, b| {
            let ra = &pool[a];
            let rb = &pool[b];
            ra.descriptor()
                .z_order
                .cmp(&rb.descriptor().z_order)
                .then(ra.submission_order().cmp(&rb.submission_order()))
        });
    }

    /// Operation 2 (§4.2): builds a [`ViewContext`] per ordered record and
    /// registers/updates it with the frame context.
    /// Operations 2 and 3 (§4.2) merged: §4.2 describes `PublishViews`
    /// deciding register-vs-update against the frame context, and a
    /// separate `RegisterRenderGraphs` calling the renderer for every
    /// ordered record every sync. The renderer call is the only
    /// observable effect of either decision (E2E-1 requires "no new
    /// `RegisterViewRenderGraph` call unless the id changed"), so both are
    /// folded into one pass here: first publication of a view id calls
    /// `register_view_render_graph`, every later sync for the same id
    /// calls `update_view_render_graph`.
    pub fn publish_views(
        &mut self,
        ctx: &mut FrameContext,
        renderer: &dyn RendererRuntime,
    ) -> Vec<Result<ViewContext, (ViewId, PublishSkipReason)>> {
        let mut results = Vec::with_capacity(self.ordered_active_views.len());

        for &id in &self.ordered_active_views {
            let record = self.pool.get_mut(&id).expect("ordered view must be in pool");
            let is_scene = record.descriptor().intent.has_camera();

            let Some(sdr_fb) = record.sdr_framebuffer().cloned() else {
                results.push(Err((id, PublishSkipReason::MissingSdrResources)));
                continue;
            };

            let render_target = if let Some(hdr_fb) = record.hdr_framebuffer() {
                if is_scene && !record.uses_hdr_render_targets() {
                    results.push(Err((id, PublishSkipReason::SceneViewMissingHdrResources)));
                    continue;
                }
                hdr_fb.clone()
            } else {
                if is_scene {
                    results.push(Err((id, PublishSkipReason::SceneViewMissingHdrResources)));
                    continue;
                }
                sdr_fb.clone()
            };

            let camera_node = record.descriptor().intent.camera_node;
            ctx.add_view(id, record.descriptor().clone());
            if record.published_view_id().is_valid() {
                renderer.update_view_render_graph(id, camera_node);
            } else {
                record.set_published_view_id(id);
                renderer.register_view_render_graph(id, camera_node);
            }

            results.push(Ok(ViewContext {
                view_id: id,
                is_scene,
                render_target,
                composite_source: sdr_fb,
            }));
        }

        results
    }

    /// Operation 4 (§4.2): removes every record whose `current_frame -
    /// last_seen_frame > reap_threshold`, unregistering it first.
    pub fn unpublish_stale_views(
        &mut self,
        current_frame: FrameSequenceNumber,
        reap_threshold: u64,
        ctx: &mut FrameContext,
        renderer: &dyn RendererRuntime,
    ) {
        let stale: Vec<ViewId> = self
            .pool
            .iter()
            .filter(|(_, record)| {
                current_frame.0.saturating_sub(record.last_seen_frame().0) > reap_threshold
            })
            .map(|(id, _)| *id)
            .collect();

        for id in stale {
            if let Some(record) = self.pool.get(&id) {
                crate::telemetry::view_reaped(id, record.last_seen_frame());
                if record.published_view_id().is_valid() {
                    renderer.unregister_view_render_graph(record.published_view_id());
                    ctx.remove_view(record.published_view_id());
                }
            }
            self.pool.remove(&id);
            self.ordered_active_views.retain(|v| *v != id);
        }
    }

    #[must_use]
    pub fn ordered_active_views(&self) -> &[ViewId] {
        &self.ordered_active_views
    }

    #[must_use]
    pub fn record(&self, id: ViewId) -> Option<&ViewRecord> {
        self.pool.get(&id)
    }

    #[must_use]
    pub fn pool_len(&self) -> usize {
        self.pool.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::{FramebufferDescriptor, Texture, TextureDescriptor};
    use crate::view::ViewIntent;

    #[derive(Debug)]
    struct FakeTexture {
        w: u32,
        h: u32,
    }
    impl Texture for FakeTexture {
        fn width(&self) -> u32 {
            self.w
        }
        fn height(&self) -> u32 {
            self.h
        }
    }

    #[derive(Debug)]
    struct FakeFramebuffer;
    impl Framebuffer for FakeFramebuffer {}

    struct FakeBackend;
    impl GraphicsBackend for FakeBackend {
        fn acquire_command_recorder(
            &self,
            _queue: crate::backend::QueueKey,
            _label: &str,
        ) -> Box<dyn crate::backend::CommandRecorder> {
            unimplemented!()
        }
        fn flush(&self) {}
        fn queue_key_for(&self, _role: crate::backend::QueueRole) -> crate::backend::QueueKey {
            crate::backend::QueueKey(0)
        }
        fn register_deferred_release(&self, _resource: Arc<dyn Texture>) {}
        fn create_texture(&self, desc: TextureDescriptor) -> Option<Arc<dyn Texture>> {
            Some(Arc::new(FakeTexture {
                w: desc.width,
                h: desc.height,
            }))
        }
        fn create_framebuffer(&self, _desc: FramebufferDescriptor<'_>) -> Option<Arc<dyn Framebuffer>> {
            Some(Arc::new(FakeFramebuffer))
        }
    }

    fn descriptor(id: u64, has_camera: bool, enable_hdr: bool) -> ViewDescriptor {
        ViewDescriptor {
            id: ViewId(id),
            name: format!("view-{id}"),
            intent: ViewIntent {
                camera_node: has_camera.then_some(crate::backend::SceneNodeId(id)),
                force_wireframe: false,
            },
            viewport: (800, 600),
            enable_hdr,
            clear_color: None,
            z_order: 0,
            is_tools_overlay: false,
        }
    }

    #[test]
    fn sync_creates_sdr_only_record_for_composite_only_view() {
        let mut svc = ViewLifecycleService::new();
        let backend = FakeBackend;
        let config = EngineConfig::default();
        let descs = [descriptor(7, false, false)];

        svc.sync_active_views(FrameSequenceNumber(1), &descs, None, &backend, &config);

        let record = svc.record(ViewId(7)).unwrap();
        assert!(record.sdr_texture().is_some());
        assert!(record.hdr_texture().is_none());
        assert!(!record.uses_hdr_render_targets());
    }

    #[test]
    fn view_upgrade_adds_hdr_resources_without_new_registration() {
        let mut svc = ViewLifecycleService::new();
        let backend = FakeBackend;
        let config = EngineConfig::default();

        let frame1 = [descriptor(7, false, false)];
        svc.sync_active_views(FrameSequenceNumber(1), &frame1, None, &backend, &config);
        assert_eq!(svc.pool_len(), 1);

        let frame2 = [descriptor(7, true, true)];
        svc.sync_active_views(FrameSequenceNumber(2), &frame2, None, &backend, &config);

        assert_eq!(svc.pool_len(), 1, "same id must reuse the existing record");
        let record = svc.record(ViewId(7)).unwrap();
        assert!(record.hdr_texture().is_some());
        assert!(record.uses_hdr_render_targets());
    }

    #[test]
    fn reaping_removes_only_the_stale_view() {
        let mut svc = ViewLifecycleService::new();
        let backend = FakeBackend;
        let config = EngineConfig::default();

        svc.sync_active_views(
            FrameSequenceNumber(1),
            &[descriptor(1, false, false), descriptor(2, false, false)],
            None,
            &backend,
            &config,
        );
        // Only view 1 is synced again; view 2 goes idle.
        svc.sync_active_views(
            FrameSequenceNumber(2),
            &[descriptor(1, false, false)],
            None,
            &backend,
            &config,
        );

        let mut ctx = crate::frame_context::FrameContext::new(crate::frame_context::FrameContextInit::default());
        struct NoopRenderer;
        impl RendererRuntime for NoopRenderer {
            fn register_view_render_graph(
                &self,
                _view_id: ViewId,
                _resolved_camera_node: Option<crate::backend::SceneNodeId>,
            ) {
            }
            fn update_view_render_graph(
                &self,
                _view_id: ViewId,
                _resolved_camera_node: Option<crate::backend::SceneNodeId>,
            ) {
            }
            fn unregister_view_render_graph(&self, _view_id: ViewId) {}
        }
        let renderer = NoopRenderer;
        ctx.force_phase_for_test(crate::phase::Phase::SceneMutation);

        svc.unpublish_stale_views(FrameSequenceNumber(63), 60, &mut ctx, &renderer);

        assert!(svc.record(ViewId(2)).is_none());
        assert!(svc.record(ViewId(1)).is_some());
    }
}
