//! Frame plan builder (§4.3). Deterministically classifies each active view
//! into a [`ViewRenderPlan`] from frozen frame settings, scene state and
//! view intent. Grounded on the upstream engine's `FramePlanBuilder.cpp`
//! per-view evaluation loop.

use rustc_hash::FxHashMap;

use glam::Vec4;

use crate::backend::SceneEnvironment;
use crate::config::{PipelineSettings, RenderMode};
use crate::view::plan::{ToneMapPolicy, ViewRenderIntent, ViewRenderPlan, ViewRenderPlanSpec};
use crate::view::record::ViewRecord;
use crate::view::{ViewId, ViewIntent};

/// A classified view, paired with the id the renderer knows it by.
#[derive(Debug, Clone, Copy)]
pub struct FrameViewPacket {
    pub view_id: ViewId,
    pub plan: ViewRenderPlan,
}

/// Aggregate per-frame flags the pipeline orchestrator consumes alongside
/// the per-view packets (§4.3 "Output").
#[derive(Debug, Clone, Copy)]
pub struct FramePlanFlags {
    /// Forced by debug modes that require manual exposure (§C.1).
    pub reset_auto_exposure: bool,
    /// `IblRawSky` pins exposure to exactly EV 1 (§C.1).
    pub force_exposure_one: bool,
    pub gpu_debug_pass_enabled: bool,
    pub wire_color: Vec4,
}

/// The result of classifying every active view for one frame.
pub struct FramePlan {
    pub packets: Vec<FrameViewPacket>,
    pub by_view_id: FxHashMap<ViewId, usize>,
    pub flags: FramePlanFlags,
}

pub struct FramePlanBuilder;

impl FramePlanBuilder {
    /// Classifies one view (§4.3 steps 1–11). Returns `None` if the view's
    /// resources are insufficient for its intent — a fatal precondition per
    /// §7, asserted in debug and skipped (not published) in release.
    #[must_use]
    pub fn build_view_plan(
        settings: &PipelineSettings,
        intent: &ViewIntent,
        record: &ViewRecord,
        environment: Option<&dyn SceneEnvironment>,
    ) -> Option<ViewRenderPlan> {
        let is_scene_view = intent.has_camera(); // 1
        let plan_intent = if is_scene_view {
            ViewRenderIntent::SceneAndComposite
        } else {
            ViewRenderIntent::CompositeOnly
        }; // 2

        let mut effective_render_mode = settings.render_mode;
        if intent.force_wireframe {
            effective_render_mode = RenderMode::Wireframe; // 3
        }

        // 4. Resource sufficiency: fatal if violated.
        let sdr_ok = record.sdr_framebuffer().is_some();
        let hdr_ok = !is_scene_view || record.uses_hdr_render_targets();
        debug_assert!(sdr_ok, "view '{}': missing SDR resources", record.descriptor().name);
        debug_assert!(
            hdr_ok,
            "view '{}': scene view missing HDR resources",
            record.descriptor().name
        );
        if !sdr_ok || !hdr_ok {
            crate::telemetry::view_plan_skipped_insufficient_resources(&record.descriptor().name);
            return None;
        }

        let is_scene_and_composite = plan_intent == ViewRenderIntent::SceneAndComposite;
        let tone_map_policy = if is_scene_and_composite && effective_render_mode == RenderMode::Wireframe
        {
            ToneMapPolicy::Neutral
        } else {
            ToneMapPolicy::Configured
        }; // 5

        let run_overlay_wireframe = is_scene_view
            && settings.render_mode == RenderMode::OverlayWireframe
            && effective_render_mode != RenderMode::Wireframe; // 6

        let run_scene_passes = is_scene_and_composite && effective_render_mode != RenderMode::Wireframe; // 7

        let debug_intent = settings.shader_debug_mode.classify(); // 8

        let sky_enabled = environment.is_some_and(|e| e.sky_atmosphere_enabled() || e.sky_sphere_enabled());
        let sky_atmosphere_enabled = environment.is_some_and(|e| e.sky_atmosphere_enabled());

        let run_sky_pass = run_scene_passes && sky_enabled && !debug_intent.is_non_ibl; // 9
        let run_sky_lut_update = run_scene_passes && sky_atmosphere_enabled; // 10

        ViewRenderPlan::new(ViewRenderPlanSpec {
            intent: plan_intent,
            effective_render_mode,
            tone_map_policy,
            run_overlay_wireframe,
            run_sky_pass,
            run_sky_lut_update,
        })
        .inspect_err(|e| crate::telemetry::view_plan_invalid(&record.descriptor().name, e))
        .ok() // 11
    }

    /// Classifies every view currently tracked by `records`, in the order
    /// given, producing the full per-frame plan.
    #[must_use]
    pub fn build_frame<'a>(
        settings: &PipelineSettings,
        ordered_view_ids: &[ViewId],
        records: impl Fn(ViewId) -> Option<&'a ViewRecord>,
        environment: Option<&dyn SceneEnvironment>,
    ) -> FramePlan {
        let debug_intent = settings.shader_debug_mode.classify();

        let mut packets = Vec::with_capacity(ordered_view_ids.len());
        let mut by_view_id = FxHashMap::default();

        for &id in ordered_view_ids {
            let Some(record) = records(id) else { continue };
            let Some(plan) =
                Self::build_view_plan(settings, &record.descriptor().intent, record, environment)
            else {
                continue;
            };
            by_view_id.insert(id, packets.len());
            packets.push(FrameViewPacket { view_id: id, plan });
        }

        FramePlan {
            packets,
            by_view_id,
            flags: FramePlanFlags {
                reset_auto_exposure: debug_intent.force_manual_exposure,
                force_exposure_one: debug_intent.force_exposure_one,
                gpu_debug_pass_enabled: settings.gpu_debug_pass_enabled,
                wire_color: settings.wire_color,
            },
        }
    }
}
