//! Shared fakes for the integration suite: a backend that actually allocates
//! (counting) fake GPU resources, rather than mocks that assert call order.

use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::{Arc, Mutex};

use frame_core::backend::{
    CommandRecorder, Framebuffer, FramebufferDescriptor, GraphicsBackend, QueueKey, QueueRole,
    ResourceState, Surface, Texture, TextureDescriptor,
};
use frame_core::view::ViewId;

#[derive(Debug)]
pub struct FakeTexture {
    pub w: u32,
    pub h: u32,
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
pub struct FakeFramebuffer;

impl Framebuffer for FakeFramebuffer {}

/// Allocates every texture/framebuffer it's asked for; never fails. Counts
/// allocations so tests can assert on resource-recreation behavior.
#[derive(Default)]
pub struct FakeBackend {
    pub textures_created: AtomicU32,
    pub framebuffers_created: AtomicU32,
}

impl GraphicsBackend for FakeBackend {
    fn acquire_command_recorder(&self, _queue: QueueKey, _label: &str) -> Box<dyn CommandRecorder> {
        Box::new(FakeRecorder::default())
    }

    fn flush(&self) {}

    fn queue_key_for(&self, _role: QueueRole) -> QueueKey {
        QueueKey(0)
    }

    fn register_deferred_release(&self, _resource: Arc<dyn Texture>) {}

    fn create_texture(&self, desc: TextureDescriptor) -> Option<Arc<dyn Texture>> {
        self.textures_created.fetch_add(1, Ordering::Relaxed);
        Some(Arc::new(FakeTexture {
            w: desc.width,
            h: desc.height,
        }))
    }

    fn create_framebuffer(&self, _desc: FramebufferDescriptor<'_>) -> Option<Arc<dyn Framebuffer>> {
        self.framebuffers_created.fetch_add(1, Ordering::Relaxed);
        Some(Arc::new(FakeFramebuffer))
    }
}

/// Records nothing; just a valid, inert sink for orchestrator calls.
#[derive(Default)]
pub struct FakeRecorder {
    pub barrier_calls: u32,
    pub clear_calls: u32,
}

impl CommandRecorder for FakeRecorder {
    fn require_resource_state(&mut self, _resource: &dyn Texture, _state: ResourceState) {}
    fn flush_barriers(&mut self) {
        self.barrier_calls += 1;
    }
    fn bind_framebuffer(&mut self, _framebuffer: &dyn Framebuffer) {}
    fn clear_framebuffer(&mut self, _framebuffer: &dyn Framebuffer, _clear_color: glam::Vec4, _clear_depth: bool) {
        self.clear_calls += 1;
    }
    fn begin_tracking_resource_state(&mut self, _resource: &dyn Texture, _initial_state: ResourceState, _keep: bool) {}
    fn is_resource_tracked(&self, _resource: &dyn Texture) -> bool {
        false
    }
}

/// A presentation surface whose size/backbuffer/resize-pending state can be
/// driven from the test.
#[derive(Debug)]
pub struct FakeSurface {
    width: AtomicU32,
    height: AtomicU32,
    pending_resize: AtomicBool,
    back_buffer: Mutex<Option<Arc<dyn Texture>>>,
}

impl FakeSurface {
    #[must_use]
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width: AtomicU32::new(width),
            height: AtomicU32::new(height),
            pending_resize: AtomicBool::new(false),
            back_buffer: Mutex::new(Some(Arc::new(FakeTexture { w: width, h: height }))),
        }
    }

    pub fn request_resize(&self, width: u32, height: u32) {
        self.width.store(width, Ordering::Relaxed);
        self.height.store(height, Ordering::Relaxed);
        self.pending_resize.store(true, Ordering::Relaxed);
    }
}

impl Surface for FakeSurface {
    fn width(&self) -> u32 {
        self.width.load(Ordering::Relaxed)
    }
    fn height(&self) -> u32 {
        self.height.load(Ordering::Relaxed)
    }
    fn should_resize(&self) -> bool {
        self.pending_resize.load(Ordering::Relaxed)
    }
    fn resize(&self) {
        let (w, h) = (self.width(), self.height());
        *self.back_buffer.lock().unwrap() = Some(Arc::new(FakeTexture { w, h }));
        self.pending_resize.store(false, Ordering::Relaxed);
    }
    fn current_back_buffer_index(&self) -> u32 {
        0
    }
    fn current_back_buffer(&self) -> Option<Arc<dyn Texture>> {
        self.back_buffer.lock().unwrap().clone()
    }
}

pub struct NoopRenderer {
    pub registrations: AtomicU32,
    pub updates: AtomicU32,
    pub unregistrations: AtomicU32,
}

impl Default for NoopRenderer {
    fn default() -> Self {
        Self {
            registrations: AtomicU32::new(0),
            updates: AtomicU32::new(0),
            unregistrations: AtomicU32::new(0),
        }
    }
}

impl frame_core::backend::RendererRuntime for NoopRenderer {
    fn register_view_render_graph(
        &self,
        _view_id: ViewId,
        _resolved_camera_node: Option<frame_core::backend::SceneNodeId>,
    ) {
        self.registrations.fetch_add(1, Ordering::Relaxed);
    }
    fn update_view_render_graph(
        &self,
        _view_id: ViewId,
        _resolved_camera_node: Option<frame_core::backend::SceneNodeId>,
    ) {
        self.updates.fetch_add(1, Ordering::Relaxed);
    }
    fn unregister_view_render_graph(&self, _view_id: ViewId) {
        self.unregistrations.fetch_add(1, Ordering::Relaxed);
    }
}
