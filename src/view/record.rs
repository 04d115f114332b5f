//! Per-view resource record (§3.4). Grounded on the upstream engine's
//! per-view runtime state struct: one live record per active view
//! descriptor, owning the GPU resources the view currently needs and
//! tracking enough of its last-applied descriptor to decide whether those
//! resources must be recreated.

use std::sync::Arc;

use glam::Vec4;

use crate::backend::{
    Framebuffer, GraphicsBackend, Texture, TextureDescriptor, TextureFormat, TextureUsage,
};
use crate::frame::FrameSequenceNumber;
use crate::view::{ViewDescriptor, ViewId};

/// Runtime state for one active view. Resources are only ever mutated by
/// [`crate::view::lifecycle::ViewLifecycleService`] during a sync pass;
/// every other consumer holds non-owning `Arc` clones.
#[derive(Debug, Clone)]
pub struct ViewRecord {
    descriptor: ViewDescriptor,
    submission_order: u32,
    last_seen_frame: FrameSequenceNumber,

    hdr_texture: Option<Arc<dyn Texture>>,
    hdr_depth: Option<Arc<dyn Texture>>,
    hdr_framebuffer: Option<Arc<dyn Framebuffer>>,
    sdr_texture: Option<Arc<dyn Texture>>,
    sdr_framebuffer: Option<Arc<dyn Framebuffer>>,

    render_target_width: u32,
    render_target_height: u32,
    uses_hdr_render_targets: bool,
    clear_color: Vec4,

    published_view_id: ViewId,
}

impl ViewRecord {
    pub(in crate::view) fn new(descriptor: ViewDescriptor, submission_order: u32) -> Self {
        Self {
            descriptor,
            submission_order,
            last_seen_frame: FrameSequenceNumber(0),
            hdr_texture: None,
            hdr_depth: None,
            hdr_framebuffer: None,
            sdr_texture: None,
            sdr_framebuffer: None,
            render_target_width: 0,
            render_target_height: 0,
            uses_hdr_render_targets: false,
            clear_color: Vec4::new(0.0, 0.0, 0.0, 1.0),
            published_view_id: ViewId::INVALID,
        }
    }

    #[must_use]
    pub fn descriptor(&self) -> &ViewDescriptor {
        &self.descriptor
    }

    #[must_use]
    pub fn submission_order(&self) -> u32 {
        self.submission_order
    }

    #[must_use]
    pub fn last_seen_frame(&self) -> FrameSequenceNumber {
        self.last_seen_frame
    }

    #[must_use]
    pub fn render_target_size(&self) -> (u32, u32) {
        (self.render_target_width, self.render_target_height)
    }

    #[must_use]
    pub fn uses_hdr_render_targets(&self) -> bool {
        self.uses_hdr_render_targets
    }

    #[must_use]
    pub fn clear_color(&self) -> Vec4 {
        self.clear_color
    }

    #[must_use]
    pub fn hdr_texture(&self) -> Option<&Arc<dyn Texture>> {
        self.hdr_texture.as_ref()
    }

    #[must_use]
    pub fn hdr_depth(&self) -> Option<&Arc<dyn Texture>> {
        self.hdr_depth.as_ref()
    }

    #[must_use]
    pub fn hdr_framebuffer(&self) -> Option<&Arc<dyn Framebuffer>> {
        self.hdr_framebuffer.as_ref()
    }

    #[must_use]
    pub fn sdr_texture(&self) -> Option<&Arc<dyn Texture>> {
        self.sdr_texture.as_ref()
    }

    #[must_use]
    pub fn sdr_framebuffer(&self) -> Option<&Arc<dyn Framebuffer>> {
        self.sdr_framebuffer.as_ref()
    }

    #[must_use]
    pub fn published_view_id(&self) -> ViewId {
        self.published_view_id
    }

    pub(in crate::view) fn set_published_view_id(&mut self, id: ViewId) {
        self.published_view_id = id;
    }

    /// Has both the SDR resources every view needs and, if it currently
    /// uses HDR render targets, the HDR resources too.
    #[must_use]
    pub fn has_required_resources(&self) -> bool {
        let sdr_ok = self.sdr_texture.is_some() && self.sdr_framebuffer.is_some();
        let hdr_ok = !self.uses_hdr_render_targets
            || (self.hdr_texture.is_some() && self.hdr_depth.is_some() && self.hdr_framebuffer.is_some());
        sdr_ok && hdr_ok
    }

    /// Updates the cached descriptor, submission order and last-seen frame.
    /// Called every sync, whether or not resources need to change.
    pub(in crate::view) fn touch(
        &mut self,
        descriptor: ViewDescriptor,
        submission_order: u32,
        current_frame: FrameSequenceNumber,
    ) {
        self.descriptor = descriptor;
        self.submission_order = submission_order;
        self.last_seen_frame = current_frame;
    }

    /// Recomputes target size/HDR flag/clear color from the descriptor and
    /// recreates any resource that no longer matches.
    ///
    /// Returns `false` if the SDR resources (required by every view) could
    /// not be allocated — the record is unusable this frame. If only the
    /// requested HDR resources fail to allocate, this degrades the record
    /// to composite-only for the frame (`uses_hdr_render_targets()` reports
    /// `false`) rather than failing outright, per §4.2's failure model: "the
    /// record is skipped for publication this frame (it is not promoted to
    /// 'scene' mode)".
    pub(in crate::view) fn ensure_resources(
        &mut self,
        width: u32,
        height: u32,
        uses_hdr: bool,
        clear_color: Vec4,
        backend: &dyn GraphicsBackend,
    ) -> bool {
        let width = width.max(1);
        let height = height.max(1);
        self.clear_color = clear_color;

        let size_changed = width != self.render_target_width || height != self.render_target_height;
        let hdr_flag_changed = uses_hdr != self.uses_hdr_render_targets;
        self.render_target_width = width;
        self.render_target_height = height;

        if size_changed || self.sdr_texture.is_none() {
            match create_sdr(width, height, backend) {
                Some((tex, fb)) => {
                    self.sdr_texture = Some(tex);
                    self.sdr_framebuffer = Some(fb);
                }
                None => {
                    crate::telemetry::view_resource_allocation_failed(
                        &self.descriptor.name,
                        "SDR",
                        width,
                        height,
                    );
                    return false;
                }
            }
        }

        if uses_hdr {
            if size_changed || hdr_flag_changed || self.hdr_texture.is_none() {
                match create_hdr(width, height, backend) {
                    Some((tex, depth, fb)) => {
                        self.hdr_texture = Some(tex);
                        self.hdr_depth = Some(depth);
                        self.hdr_framebuffer = Some(fb);
                        self.uses_hdr_render_targets = true;
                    }
                    None => {
                        crate::telemetry::view_resource_allocation_failed(
                            &self.descriptor.name,
                            "HDR",
                            width,
                            height,
                        );
                        self.hdr_texture = None;
                        self.hdr_depth = None;
                        self.hdr_framebuffer = None;
                        self.uses_hdr_render_targets = false;
                    }
                }
            } else {
                self.uses_hdr_render_targets = true;
            }
        } else {
            self.uses_hdr_render_targets = false;
            self.hdr_texture = None;
            self.hdr_depth = None;
            self.hdr_framebuffer = None;
        }

        true
    }
}

#[cfg(test)]
impl ViewRecord {
    #[must_use]
    pub fn new_for_test(descriptor: ViewDescriptor) -> Self {
        Self::new(descriptor, 0)
    }

    pub fn install_sdr_for_test(&mut self, framebuffer: Arc<dyn Framebuffer>) {
        self.sdr_framebuffer = Some(framebuffer);
    }

    pub fn install_hdr_for_test(&mut self, framebuffer: Arc<dyn Framebuffer>) {
        self.hdr_framebuffer = Some(framebuffer);
        self.uses_hdr_render_targets = true;
    }

    pub fn set_intent_for_test(&mut self, intent: crate::view::ViewIntent) {
        self.descriptor.intent = intent;
    }
}

fn create_sdr(
    width: u32,
    height: u32,
    backend: &dyn GraphicsBackend,
) -> Option<(Arc<dyn Texture>, Arc<dyn Framebuffer>)> {
    let tex = backend.create_texture(TextureDescriptor {
        width,
        height,
        format: TextureFormat::Rgba8Unorm,
        usage: TextureUsage {
            render_target: true,
            shader_resource: true,
        },
    })?;
    let fb = backend.create_framebuffer(crate::backend::FramebufferDescriptor {
        color: &tex,
        depth: None,
    })?;
    Some((tex, fb))
}

fn create_hdr(
    width: u32,
    height: u32,
    backend: &dyn GraphicsBackend,
) -> Option<(Arc<dyn Texture>, Arc<dyn Texture>, Arc<dyn Framebuffer>)> {
    let color = backend.create_texture(TextureDescriptor {
        width,
        height,
        format: TextureFormat::Rgba16Float,
        usage: TextureUsage {
            render_target: true,
            shader_resource: true,
        },
    })?;
    let depth = backend.create_texture(TextureDescriptor {
        width,
        height,
        format: TextureFormat::Depth32Float,
        usage: TextureUsage {
            render_target: true,
            shader_resource: true,
        },
    })?;
    let fb = backend.create_framebuffer(crate::backend::FramebufferDescriptor {
        color: &color,
        depth: Some(&depth),
    })?;
    Some((color, depth, fb))
}
