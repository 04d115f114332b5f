//! Per-view pass orchestrator (§4.4). Sequences barrier transitions and
//! injected passes for one view's render callback; the passes themselves
//! (depth pre-pass, shader pass, sky pass, ...) are owned by the renderer
//! and only referenced here through the narrow [`Pass`] contract, the way
//! the upstream engine's orchestrator only calls through
//! `RenderContext::RegisterPass<T>` without knowing a pass's internals.

use std::sync::Arc;

use glam::Vec4;

use crate::backend::{CommandRecorder, Framebuffer, ImGuiPass, ResourceState, Texture};
use crate::config::ToneMapPassConfig;
use crate::pipeline::tonemap_guard::ToneMapOverrideGuard;
use crate::view::plan::{ToneMapPolicy, ViewRenderPlan};

/// A renderer-owned pass this orchestrator sequences but does not
/// implement. Missing pass configs (a `None` slot in [`OrchestratorPasses`])
/// silently skip that pass (§4.4 "Failure semantics").
pub trait Pass: Send {
    fn execute(&mut self, recorder: &mut dyn CommandRecorder);
}

/// Debug-mode hint delivered to the auto-exposure pass only (§4.3 step 8,
/// §4.4 step 7's "explicit reset-to-EV request that computes target
/// luminance from EV"). `force_exposure_one` additionally pins the result to
/// exactly EV 1 for the raw-sky debug channel (§C.1).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AutoExposureHint {
    pub reset_to_ev: bool,
    pub force_exposure_one: bool,
}

/// The auto-exposure pass is the one pass that needs a per-frame hint beyond
/// the command recorder, so it gets its own narrow contract instead of
/// overloading [`Pass`] with a parameter every other pass would ignore.
pub trait AutoExposurePass: Send {
    fn execute(&mut self, recorder: &mut dyn CommandRecorder, hint: AutoExposureHint);
}

/// The full set of injectable passes for one view, plus the handful of
/// extra inputs specific passes need (sky pass's mouse position/viewport,
/// auto-exposure's reset request).
#[derive(Default)]
pub struct OrchestratorPasses {
    pub depth_pre_pass: Option<Box<dyn Pass>>,
    pub sky_pass: Option<Box<dyn Pass>>,
    pub light_culling_pass: Option<Box<dyn Pass>>,
    pub shader_pass: Option<Box<dyn Pass>>,
    pub transparent_pass: Option<Box<dyn Pass>>,
    pub ground_grid_pass: Option<Box<dyn Pass>>,
    pub auto_exposure_pass: Option<Box<dyn AutoExposurePass>>,
    pub wireframe_pass: Option<Box<dyn Pass>>,
    pub tonemap_pass: Option<Box<dyn Pass>>,
    pub gpu_debug_clear_pass: Option<Box<dyn Pass>>,
    pub gpu_debug_draw_pass: Option<Box<dyn Pass>>,
    pub user_overlay: Option<Box<dyn Pass>>,
}

/// The HDR render targets a scene-and-composite view renders into.
pub struct HdrTargets<'a> {
    pub color: &'a Arc<dyn Texture>,
    pub depth: &'a Arc<dyn Texture>,
    pub framebuffer: &'a Arc<dyn Framebuffer>,
}

/// Per-view inputs the orchestrator needs beyond the plan and the passes
/// (§4.4 steps 1–4).
pub struct ViewRenderInputs<'a> {
    pub hdr: Option<HdrTargets<'a>>,
    pub sdr_texture: &'a Arc<dyn Texture>,
    pub sdr_framebuffer: &'a Arc<dyn Framebuffer>,
    pub clear_color: Vec4,
    pub clear_on_composite_only: bool,
    pub viewport: (u32, u32),
    pub debug_mouse_down_position: Option<(f32, f32)>,
    /// `run_overlay_wireframe` requires the camera to be live and the scene
    /// to exist (§4.4 step 3); the caller resolves that once up front.
    pub overlay_wireframe_scene_live: bool,
    pub is_tools_overlay: bool,
    pub tools_imgui_pass: Option<Arc<dyn ImGuiPass>>,
    pub gpu_debug_pass_enabled: bool,
    /// Forwarded to the auto-exposure pass verbatim (§4.3's aggregate frame
    /// flags, `FramePlanFlags::reset_auto_exposure`/`force_exposure_one`).
    pub auto_exposure: AutoExposureHint,
}

pub struct Orchestrator;

impl Orchestrator {
    /// Resolves which texture the wireframe pass targets (supplemented
    /// helper, see `SPEC_FULL.md` §C.3): composite-only wireframe or a
    /// scene view with no scene-linear path renders straight to SDR;
    /// otherwise it renders into HDR alongside the rest of the scene stage.
    #[must_use]
    pub fn wireframe_target_texture<'a>(
        plan: &ViewRenderPlan,
        hdr_color: Option<&'a Arc<dyn Texture>>,
        sdr_texture: &'a Arc<dyn Texture>,
    ) -> &'a Arc<dyn Texture> {
        let overlay_only = !plan.has_scene_linear_path();
        if overlay_only || hdr_color.is_none() {
            sdr_texture
        } else {
            hdr_color.unwrap()
        }
    }

    /// Runs the full per-view sequence (§4.4). `recorder` is assumed
    /// acquired by the caller (coroutine suspension point (a), §5).
    pub fn run_view(
        plan: &ViewRenderPlan,
        passes: &mut OrchestratorPasses,
        tonemap_config: &mut ToneMapPassConfig,
        recorder: &mut dyn CommandRecorder,
        inputs: &ViewRenderInputs<'_>,
    ) {
        if plan.has_scene_linear_path() {
            Self::run_scene_and_composite(plan, passes, tonemap_config, recorder, inputs);
        } else {
            Self::run_composite_only(recorder, inputs);
        }

        Self::run_composite_overlays(plan, passes, recorder, inputs);

        // 4. Hand SDR back to the compositor as a shader resource.
        recorder.require_resource_state(inputs.sdr_texture.as_ref(), ResourceState::ShaderResource);
        recorder.flush_barriers();
    }

    fn run_scene_and_composite(
        plan: &ViewRenderPlan,
        passes: &mut OrchestratorPasses,
        tonemap_config: &mut ToneMapPassConfig,
        recorder: &mut dyn CommandRecorder,
        inputs: &ViewRenderInputs<'_>,
    ) {
        let hdr = inputs
            .hdr
            .as_ref()
            .expect("scene-and-composite plan requires HDR targets");

        recorder.require_resource_state(hdr.color.as_ref(), ResourceState::RenderTarget);
        recorder.require_resource_state(hdr.depth.as_ref(), ResourceState::DepthWrite);
        recorder.flush_barriers();
        recorder.bind_framebuffer(hdr.framebuffer.as_ref());
        recorder.clear_framebuffer(hdr.framebuffer.as_ref(), inputs.clear_color, true);

        if plan.effective_render_mode() == crate::config::RenderMode::Wireframe {
            if let Some(pass) = &mut passes.wireframe_pass {
                pass.execute(recorder);
            }
            Self::run_tonemap(plan, passes, tonemap_config, recorder, inputs, hdr.color);
            return;
        }

        if inputs.gpu_debug_pass_enabled {
            if let Some(pass) = &mut passes.gpu_debug_clear_pass {
                pass.execute(recorder);
            }
        }

        for pass in [
            &mut passes.depth_pre_pass,
            &mut passes.sky_pass,
            &mut passes.light_culling_pass,
            &mut passes.shader_pass,
            &mut passes.transparent_pass,
            &mut passes.ground_grid_pass,
        ] {
            if let Some(pass) = pass {
                pass.execute(recorder);
            }
        }

        if let Some(pass) = &mut passes.auto_exposure_pass {
            pass.execute(recorder, inputs.auto_exposure);
        }

        Self::run_tonemap(plan, passes, tonemap_config, recorder, inputs, hdr.color);
    }

    fn run_tonemap(
        plan: &ViewRenderPlan,
        passes: &mut OrchestratorPasses,
        tonemap_config: &mut ToneMapPassConfig,
        recorder: &mut dyn CommandRecorder,
        inputs: &ViewRenderInputs<'_>,
        hdr_color: &Arc<dyn Texture>,
    ) {
        let Some(tonemap) = &mut passes.tonemap_pass else {
            return;
        };

        let _guard = (plan.tone_map_policy() == ToneMapPolicy::Neutral)
            .then(|| ToneMapOverrideGuard::new(tonemap_config));

        recorder.require_resource_state(hdr_color.as_ref(), ResourceState::ShaderResource);
        recorder.require_resource_state(inputs.sdr_texture.as_ref(), ResourceState::RenderTarget);
        recorder.flush_barriers();
        tonemap.execute(recorder);
    }

    fn run_composite_only(recorder: &mut dyn CommandRecorder, inputs: &ViewRenderInputs<'_>) {
        recorder.require_resource_state(inputs.sdr_texture.as_ref(), ResourceState::RenderTarget);
        recorder.flush_barriers();
        recorder.bind_framebuffer(inputs.sdr_framebuffer.as_ref());
        if inputs.clear_on_composite_only {
            recorder.clear_framebuffer(inputs.sdr_framebuffer.as_ref(), inputs.clear_color, false);
        }
    }

    fn run_composite_overlays(
        plan: &ViewRenderPlan,
        passes: &mut OrchestratorPasses,
        recorder: &mut dyn CommandRecorder,
        inputs: &ViewRenderInputs<'_>,
    ) {
        if plan.run_overlay_wireframe() {
            assert!(
                inputs.overlay_wireframe_scene_live,
                "run_overlay_wireframe requires a live camera attached to the scene"
            );
            if let Some(pass) = &mut passes.wireframe_pass {
                pass.execute(recorder);
            }
        }

        if let Some(overlay) = &mut passes.user_overlay {
            overlay.execute(recorder);
        }

        if inputs.is_tools_overlay {
            if let Some(imgui_pass) = &inputs.tools_imgui_pass {
                imgui_pass.render(recorder);
            }
        }

        let scene_view_in_composite = plan.has_scene_linear_path()
            && plan.effective_render_mode() != crate::config::RenderMode::Wireframe;
        if inputs.gpu_debug_pass_enabled && scene_view_in_composite {
            recorder.bind_framebuffer(inputs.sdr_framebuffer.as_ref());
            if let Some(pass) = &mut passes.gpu_debug_draw_pass {
                pass.execute(recorder);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RenderMode;
    use crate::view::plan::{ToneMapPolicy, ViewRenderIntent, ViewRenderPlanSpec};
    use std::cell::Cell;

    #[derive(Debug)]
    struct FakeTexture;
    impl Texture for FakeTexture {
        fn width(&self) -> u32 {
            64
        }
        fn height(&self) -> u32 {
            64
        }
    }

    #[derive(Debug)]
    struct FakeFramebuffer;
    impl Framebuffer for FakeFramebuffer {}

    struct FakeRecorder;
    impl CommandRecorder for FakeRecorder {
        fn require_resource_state(&mut self, _resource: &dyn Texture, _state: ResourceState) {}
        fn flush_barriers(&mut self) {}
        fn bind_framebuffer(&mut self, _framebuffer: &dyn Framebuffer) {}
        fn clear_framebuffer(&mut self, _framebuffer: &dyn Framebuffer, _clear_color: Vec4, _clear_depth: bool) {}
        fn begin_tracking_resource_state(
            &mut self,
            _resource: &dyn Texture,
            _initial_state: ResourceState,
            _keep: bool,
        ) {
        }
        fn is_resource_tracked(&self, _resource: &dyn Texture) -> bool {
            false
        }
    }

    /// Records the hint it was called with instead of doing any rendering.
    struct RecordingAutoExposurePass<'a>(&'a Cell<Option<AutoExposureHint>>);
    impl AutoExposurePass for RecordingAutoExposurePass<'_> {
        fn execute(&mut self, _recorder: &mut dyn CommandRecorder, hint: AutoExposureHint) {
            self.0.set(Some(hint));
        }
    }

    #[test]
    fn run_view_forwards_the_auto_exposure_hint_to_the_auto_exposure_pass() {
        let plan = ViewRenderPlan::new(ViewRenderPlanSpec {
            intent: ViewRenderIntent::SceneAndComposite,
            effective_render_mode: RenderMode::Solid,
            tone_map_policy: ToneMapPolicy::Configured,
            run_overlay_wireframe: false,
            run_sky_pass: false,
            run_sky_lut_update: false,
        })
        .unwrap();

        let received = Cell::new(None);
        let mut passes = OrchestratorPasses {
            auto_exposure_pass: Some(Box::new(RecordingAutoExposurePass(&received))),
            ..Default::default()
        };
        let mut tonemap_config = crate::config::ToneMapPassConfig::default();
        let mut recorder = FakeRecorder;

        let hdr_color: Arc<dyn Texture> = Arc::new(FakeTexture);
        let hdr_depth: Arc<dyn Texture> = Arc::new(FakeTexture);
        let hdr_framebuffer: Arc<dyn Framebuffer> = Arc::new(FakeFramebuffer);
        let sdr_texture: Arc<dyn Texture> = Arc::new(FakeTexture);
        let sdr_framebuffer: Arc<dyn Framebuffer> = Arc::new(FakeFramebuffer);

        let inputs = ViewRenderInputs {
            hdr: Some(HdrTargets {
                color: &hdr_color,
                depth: &hdr_depth,
                framebuffer: &hdr_framebuffer,
            }),
            sdr_texture: &sdr_texture,
            sdr_framebuffer: &sdr_framebuffer,
            clear_color: Vec4::ZERO,
            clear_on_composite_only: false,
            viewport: (1280, 720),
            debug_mouse_down_position: None,
            overlay_wireframe_scene_live: false,
            is_tools_overlay: false,
            tools_imgui_pass: None,
            gpu_debug_pass_enabled: false,
            auto_exposure: AutoExposureHint {
                reset_to_ev: true,
                force_exposure_one: true,
            },
        };

        Orchestrator::run_view(&plan, &mut passes, &mut tonemap_config, &mut recorder, &inputs);

        assert_eq!(
            received.get(),
            Some(AutoExposureHint {
                reset_to_ev: true,
                force_exposure_one: true,
            })
        );
    }
}
