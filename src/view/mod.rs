//! View descriptors, the per-view resource record, the lifecycle service
//! that keeps records in sync with descriptors, and the frame plan builder
//! that classifies each view into a render plan (§3.4–3.6, §4.2–4.3).

pub mod lifecycle;
pub mod plan;
pub mod plan_builder;
pub mod record;

use glam::Vec4;

use crate::backend::SceneNodeId;

/// Stable identifier for a view, supplied by the embedding application and
/// stable across frames for the same logical view. Doubles as the
/// "published view id" the renderer assigns on registration — a view that
/// has never been registered carries [`ViewId::INVALID`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ViewId(pub u64);

impl ViewId {
    pub const INVALID: ViewId = ViewId(u64::MAX);

    #[must_use]
    pub fn is_valid(self) -> bool {
        self != ViewId::INVALID
    }
}

/// What a view renders: a live scene camera, or composite-only (no camera).
#[derive(Debug, Clone, Copy)]
pub struct ViewIntent {
    pub camera_node: Option<SceneNodeId>,
    pub force_wireframe: bool,
}

impl ViewIntent {
    #[must_use]
    pub fn has_camera(&self) -> bool {
        self.camera_node.is_some()
    }
}

/// Application-supplied description of a view, re-submitted every frame it
/// is still active (§3.2 "Per-view descriptors").
#[derive(Debug, Clone)]
pub struct ViewDescriptor {
    pub id: ViewId,
    pub name: String,
    pub intent: ViewIntent,
    /// `(0, 0)` means "inherit from composite target, else fallback".
    pub viewport: (u32, u32),
    pub enable_hdr: bool,
    pub clear_color: Option<Vec4>,
    pub z_order: i32,
    /// §4.4 step 3: the tools overlay ImGui pass runs for this view.
    pub is_tools_overlay: bool,
}
