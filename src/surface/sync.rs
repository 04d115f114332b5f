//! The `FrameStart` surface sync sequence and the `FrameGraph` framebuffer
//! cache (§4.5). Both are engine-only: they run once per frame, driven by
//! [`crate::concurrency::Coordinator`], never concurrently with the rest of
//! the frame.

use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;

use rustc_hash::FxHashMap;

use crate::backend::{
    Framebuffer, FramebufferDescriptor, GraphicsBackend, Surface, TextureDescriptor,
    TextureFormat, TextureUsage,
};
use crate::capability::EngineTag;
use crate::frame_context::FrameContext;
use crate::surface::registry::SurfaceRegistry;
use crate::surface::SurfaceKey;

/// Per-surface cached framebuffers and their shared depth texture,
/// rebuilt by [`FramebufferCache::ensure`] at `FrameGraph` (§4.5
/// "Framebuffer cache").
#[derive(Default)]
pub struct FramebufferCache {
    depth: FxHashMap<SurfaceKey, Arc<dyn crate::backend::Texture>>,
    framebuffers: FxHashMap<SurfaceKey, Vec<Arc<dyn Framebuffer>>>,
}

impl FramebufferCache {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn drop_for(&mut self, key: SurfaceKey) {
        self.depth.remove(&key);
        self.framebuffers.remove(&key);
    }

    #[must_use]
    pub fn get(&self, key: SurfaceKey) -> Option<&[Arc<dyn Framebuffer>]> {
        self.framebuffers.get(&key).map(Vec::as_slice)
    }

    /// Builds the cached framebuffer vector for `key` if it is missing.
    /// A depth-texture allocation failure degrades to color-only
    /// framebuffers rather than leaving the surface uncached (§4.5: "A
    /// failure to create the depth texture continues with a color-only
    /// framebuffer and logs a warning").
    pub fn ensure(
        &mut self,
        key: SurfaceKey,
        surface: &dyn Surface,
        frames_in_flight: u32,
        backend: &dyn GraphicsBackend,
    ) {
        if self.framebuffers.contains_key(&key) {
            return;
        }

        let width = surface.width().max(1);
        let height = surface.height().max(1);

        let depth = backend.create_texture(TextureDescriptor {
            width,
            height,
            format: TextureFormat::Depth32Float,
            usage: TextureUsage {
                render_target: true,
                shader_resource: false,
            },
        });

        let mut framebuffers = Vec::with_capacity(frames_in_flight as usize);
        match &depth {
            Some(depth_tex) => {
                for _ in 0..frames_in_flight {
                    let Some(color) = surface.current_back_buffer() else {
                        continue;
                    };
                    if let Some(fb) = backend.create_framebuffer(FramebufferDescriptor {
                        color: &color,
                        depth: Some(depth_tex),
                    }) {
                        framebuffers.push(fb);
                    }
                }
            }
            None => {
                crate::telemetry::surface_framebuffer_depth_allocation_failed(key, width, height);
                for _ in 0..frames_in_flight {
                    let Some(color) = surface.current_back_buffer() else {
                        continue;
                    };
                    if let Some(fb) =
                        backend.create_framebuffer(FramebufferDescriptor { color: &color, depth: None })
                    {
                        framebuffers.push(fb);
                    }
                }
            }
        }

        if let Some(depth_tex) = depth {
            self.depth.insert(key, depth_tex);
        }
        self.framebuffers.insert(key, framebuffers);
    }

    /// Runs [`Self::ensure`] for every surface currently registered.
    pub fn ensure_all(
        &mut self,
        surfaces: &FxHashMap<SurfaceKey, Arc<dyn Surface>>,
        frames_in_flight: u32,
        backend: &dyn GraphicsBackend,
    ) {
        for (&key, surface) in surfaces {
            self.ensure(key, surface.as_ref(), frames_in_flight, backend);
        }
    }
}

/// Runs `f`, catching and logging any panic rather than letting it unwind
/// through the frame loop (§7: "no exceptions cross the frame-loop
/// boundary"; backend/callback exceptions are always swallowed).
fn swallow_panic(site: &str, f: impl FnOnce()) {
    if let Err(payload) = catch_unwind(AssertUnwindSafe(f)) {
        crate::telemetry::external_call_panicked(site, payload.as_ref());
    }
}

/// Runs the four-step `FrameStart` surface sync (§4.5). Must only be called
/// once per frame, before any command recording has begun.
pub fn run_frame_start_sync(
    registry: &SurfaceRegistry,
    cache: &mut FramebufferCache,
    ctx: &FrameContext,
    backend: &dyn GraphicsBackend,
    tag: &EngineTag,
) {
    // 1. Process registrations.
    for (key, surface, callback) in registry.drain_pending_registrations() {
        registry.commit_registration(key, surface);
        swallow_panic("surface registration callback", || callback(true));
    }

    // 2. Process destructions. The registry's own `Arc` is the only strong
    // reference this core holds; dropping it here is Rust's direct
    // equivalent of the source's explicit deferred-release hand-off — the
    // surface's resources live on until every other clone (in-flight
    // commands, cached framebuffers) has already been dropped.
    for (key, callback) in registry.drain_pending_destructions() {
        registry.remove_committed(key);
        cache.drop_for(key);
        swallow_panic("surface destruction callback", || callback(true));
    }

    // 3. Apply resizes, over a snapshot of the committed set.
    let committed = registry.snapshot_surfaces();
    for (&key, surface) in &committed {
        if !surface.should_resize() {
            continue;
        }
        swallow_panic("graphics backend flush", || backend.flush());
        cache.drop_for(key);
        swallow_panic("graphics backend flush", || backend.flush());
        surface.resize();
        let ok = surface.current_back_buffer().is_some();
        for callback in registry.drain_resize_callbacks(key) {
            swallow_panic("surface resize callback", || callback(ok));
        }
    }

    // 4. Reconcile the frame context's surface list against the desired set.
    let desired: Vec<SurfaceKey> = committed.keys().copied().collect();
    ctx.reconcile_surfaces(&desired, tag);
}
