//! Narrow trait contracts for the five external collaborators (§6).
//!
//! This core never implements a graphics backend, a scene graph or an ImGui
//! integration — it only calls through these traits. Each trait exposes
//! exactly the surface §6 names; anything else about a real backend
//! (device creation, shader compilation, asset I/O) is out of scope.

use std::fmt;
use std::sync::Arc;

/// Opaque handle to a GPU texture. The core never inspects texture
/// contents — it only tracks identity and the small descriptor fields it
/// needs to decide whether to recreate one.
pub trait Texture: fmt::Debug + Send + Sync {
    fn width(&self) -> u32;
    fn height(&self) -> u32;
}

/// Opaque handle to a framebuffer (a bound set of color/depth attachments).
pub trait Framebuffer: fmt::Debug + Send + Sync {}

/// A presentation surface as exposed by the graphics backend (§6).
pub trait Surface: fmt::Debug + Send + Sync {
    fn width(&self) -> u32;
    fn height(&self) -> u32;
    fn should_resize(&self) -> bool;
    /// Resizes the underlying swapchain. Must only be called after all
    /// cached references to its backbuffers have been dropped.
    fn resize(&self);
    fn current_back_buffer_index(&self) -> u32;
    /// Returns the current backbuffer as a texture, or `None` if the
    /// surface has no live backbuffer (e.g. immediately after a failed
    /// resize).
    fn current_back_buffer(&self) -> Option<Arc<dyn Texture>>;
}

/// Resource lifetime states a command recorder tracks per resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceState {
    Undefined,
    RenderTarget,
    DepthWrite,
    ShaderResource,
}

/// The role a command queue serves; used to look up the right queue key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueueRole {
    Graphics,
    Compute,
    Copy,
}

/// Opaque per-backend queue identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct QueueKey(pub u32);

/// Per-recorder barrier and binding operations (§6).
pub trait CommandRecorder: Send {
    fn require_resource_state(&mut self, resource: &dyn Texture, state: ResourceState);
    fn flush_barriers(&mut self);
    fn bind_framebuffer(&mut self, framebuffer: &dyn Framebuffer);
    fn clear_framebuffer(&mut self, framebuffer: &dyn Framebuffer, clear_color: glam::Vec4, clear_depth: bool);
    fn begin_tracking_resource_state(
        &mut self,
        resource: &dyn Texture,
        initial_state: ResourceState,
        keep: bool,
    );
    fn is_resource_tracked(&self, resource: &dyn Texture) -> bool;
}

/// Descriptor used to request a new texture from the backend.
#[derive(Debug, Clone, Copy)]
pub struct TextureDescriptor {
    pub width: u32,
    pub height: u32,
    pub format: TextureFormat,
    pub usage: TextureUsage,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextureFormat {
    /// HDR color: 16-bit float RGBA.
    Rgba16Float,
    /// HDR depth: 32-bit float depth.
    Depth32Float,
    /// SDR color: 8-bit unorm RGBA.
    Rgba8Unorm,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextureUsage {
    pub render_target: bool,
    pub shader_resource: bool,
}

/// Descriptor used to request a new framebuffer from the backend.
pub struct FramebufferDescriptor<'a> {
    pub color: &'a Arc<dyn Texture>,
    pub depth: Option<&'a Arc<dyn Texture>>,
}

/// The graphics device and queue surface the core drives (§6).
pub trait GraphicsBackend: Send + Sync {
    fn acquire_command_recorder(&self, queue: QueueKey, label: &str) -> Box<dyn CommandRecorder>;
    /// Waits for GPU completion on all queues.
    fn flush(&self);
    fn queue_key_for(&self, role: QueueRole) -> QueueKey;
    /// Safely schedules destruction of `resource` after all in-flight
    /// frames referencing it have completed.
    fn register_deferred_release(&self, resource: Arc<dyn Texture>);
    fn create_texture(&self, desc: TextureDescriptor) -> Option<Arc<dyn Texture>>;
    fn create_framebuffer(&self, desc: FramebufferDescriptor<'_>) -> Option<Arc<dyn Framebuffer>>;
}

/// Opaque scene-graph node identifier (§6 "Scene layer").
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SceneNodeId(pub u64);

/// Camera parameters resolved from a scene node.
pub trait PerspectiveCamera: Send + Sync {
    fn fov_y_radians(&self) -> f32;
    fn aspect(&self) -> f32;
    fn near(&self) -> f32;
    fn far(&self) -> f32;
    fn viewport(&self) -> (u32, u32);
}

/// Environment subsystem presence/enablement (§6, §4.3).
pub trait SceneEnvironment: Send + Sync {
    fn sky_atmosphere_enabled(&self) -> bool;
    fn sky_sphere_enabled(&self) -> bool;
}

/// Narrow scene-layer contract (§6).
pub trait SceneLayer: Send + Sync {
    fn environment(&self) -> Option<Arc<dyn SceneEnvironment>>;
    fn resolve_camera(&self, node: SceneNodeId) -> Option<Arc<dyn PerspectiveCamera>>;
    /// Whether `node` both exists and is still attached under a root.
    fn node_is_live(&self, node: SceneNodeId) -> bool;
}

/// Render-graph registration contract the renderer runtime exposes (§6).
///
/// `render_coroutine` is the per-view orchestration entry point (see
/// [`crate::pipeline::Orchestrator::run_view`]); the runtime is responsible
/// for scheduling it, not for understanding its contents.
pub trait RendererRuntime: Send + Sync {
    fn register_view_render_graph(
        &self,
        view_id: crate::view::ViewId,
        resolved_camera_node: Option<SceneNodeId>,
    );
    fn update_view_render_graph(
        &self,
        view_id: crate::view::ViewId,
        resolved_camera_node: Option<SceneNodeId>,
    );
    fn unregister_view_render_graph(&self, view_id: crate::view::ViewId);
}

/// A lazily-resolved ImGui render pass (§6).
pub trait ImGuiPass: Send + Sync {
    fn render(&self, recorder: &mut dyn CommandRecorder);
}

pub trait ImGuiModule: Send + Sync {
    fn render_pass(&self) -> Option<Arc<dyn ImGuiPass>>;
}
