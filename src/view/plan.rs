//! `ViewRenderPlan` and its cross-field invariants (§3.6).

use crate::config::RenderMode;
use crate::errors::{FrameError, Result};

/// Which render domains a view participates in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewRenderIntent {
    /// Runs the scene-linear (HDR) path and the composite path.
    SceneAndComposite,
    /// Runs only the composite path; there is no scene camera.
    CompositeOnly,
}

impl std::fmt::Display for ViewRenderIntent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            ViewRenderIntent::SceneAndComposite => "scene_and_composite",
            ViewRenderIntent::CompositeOnly => "composite_only",
        };
        f.write_str(s)
    }
}

/// How the HDR→SDR tonemap pass picks its exposure/operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToneMapPolicy {
    /// Uses the frame's configured tone-map settings.
    Configured,
    /// Forces a neutral (identity) tonemap, used under wireframe (§4.4).
    Neutral,
}

impl std::fmt::Display for ToneMapPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            ToneMapPolicy::Configured => "configured",
            ToneMapPolicy::Neutral => "neutral",
        };
        f.write_str(s)
    }
}

/// Unvalidated field set passed to [`ViewRenderPlan::new`]. Kept as a
/// separate type (rather than public struct fields on `ViewRenderPlan`
/// itself) so the plan is immutable once constructed and its invariants
/// cannot be bypassed by field mutation after the fact.
#[derive(Debug, Clone, Copy)]
pub struct ViewRenderPlanSpec {
    pub intent: ViewRenderIntent,
    pub effective_render_mode: RenderMode,
    pub tone_map_policy: ToneMapPolicy,
    pub run_overlay_wireframe: bool,
    pub run_sky_pass: bool,
    pub run_sky_lut_update: bool,
}

/// Immutable, per-view classification produced by the frame plan builder
/// (§3.6). Construction enforces the four cross-field invariants; an
/// invalid spec is a caller bug, reported as [`FrameError::InvalidViewRenderPlan`]
/// rather than panicking, since a malformed spec can originate from
/// external input feeding the plan builder.
#[derive(Debug, Clone, Copy)]
pub struct ViewRenderPlan {
    intent: ViewRenderIntent,
    effective_render_mode: RenderMode,
    tone_map_policy: ToneMapPolicy,
    run_overlay_wireframe: bool,
    run_sky_pass: bool,
    run_sky_lut_update: bool,
}

impl ViewRenderPlan {
    pub fn new(spec: ViewRenderPlanSpec) -> Result<Self> {
        let is_scene_and_composite = spec.intent == ViewRenderIntent::SceneAndComposite;

        if spec.run_overlay_wireframe && !is_scene_and_composite {
            return Err(FrameError::InvalidViewRenderPlan(
                "run_overlay_wireframe requires SceneAndComposite intent",
            ));
        }
        if spec.tone_map_policy == ToneMapPolicy::Neutral && !is_scene_and_composite {
            return Err(FrameError::InvalidViewRenderPlan(
                "Neutral tone_map_policy requires SceneAndComposite intent",
            ));
        }
        if (spec.run_sky_pass || spec.run_sky_lut_update) && !is_scene_and_composite {
            return Err(FrameError::InvalidViewRenderPlan(
                "run_sky_pass/run_sky_lut_update require SceneAndComposite intent",
            ));
        }

        Ok(Self {
            intent: spec.intent,
            effective_render_mode: spec.effective_render_mode,
            tone_map_policy: spec.tone_map_policy,
            run_overlay_wireframe: spec.run_overlay_wireframe,
            run_sky_pass: spec.run_sky_pass,
            run_sky_lut_update: spec.run_sky_lut_update,
        })
    }

    #[must_use]
    pub fn intent(&self) -> ViewRenderIntent {
        self.intent
    }

    #[must_use]
    pub fn effective_render_mode(&self) -> RenderMode {
        self.effective_render_mode
    }

    #[must_use]
    pub fn tone_map_policy(&self) -> ToneMapPolicy {
        self.tone_map_policy
    }

    #[must_use]
    pub fn run_overlay_wireframe(&self) -> bool {
        self.run_overlay_wireframe
    }

    #[must_use]
    pub fn run_sky_pass(&self) -> bool {
        self.run_sky_pass
    }

    #[must_use]
    pub fn run_sky_lut_update(&self) -> bool {
        self.run_sky_lut_update
    }

    /// `HasSceneLinearPath` (§3.6 invariant 4).
    #[must_use]
    pub fn has_scene_linear_path(&self) -> bool {
        self.intent == ViewRenderIntent::SceneAndComposite
    }

    /// `HasSkyWork` (§8 universal invariant 4).
    #[must_use]
    pub fn has_sky_work(&self) -> bool {
        self.run_sky_pass || self.run_sky_lut_update
    }
}
