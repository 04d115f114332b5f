//! Engine configuration and per-frame pipeline settings.
//!
//! Plain data, `Default`-constructible, overridable by the embedding
//! application before the frame loop starts. Mirrors the teacher engine's
//! `renderer/settings.rs` convention of a settings struct with documented
//! defaults and `with_*` builder setters.

use glam::Vec4;

/// Static configuration for the frame execution core, set once at startup.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Frames a view record may go unsynced before it is reaped (§4.2).
    pub view_reap_threshold: u64,
    /// Number of N-buffered per-frame resource slots.
    pub frames_in_flight: u32,
    /// Fallback viewport used when a view descriptor gives zero extent and
    /// no composite target is available to inherit from.
    pub fallback_viewport: (u32, u32),
    /// Default clear color applied to newly created view records.
    pub default_clear_color: Vec4,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            view_reap_threshold: 60,
            frames_in_flight: 3,
            fallback_viewport: (1280, 720),
            default_clear_color: Vec4::new(0.0, 0.0, 0.0, 1.0),
        }
    }
}

impl EngineConfig {
    #[must_use]
    pub fn with_view_reap_threshold(mut self, frames: u64) -> Self {
        self.view_reap_threshold = frames;
        self
    }

    #[must_use]
    pub fn with_frames_in_flight(mut self, count: u32) -> Self {
        self.frames_in_flight = count;
        self
    }

    #[must_use]
    pub fn with_fallback_viewport(mut self, width: u32, height: u32) -> Self {
        self.fallback_viewport = (width, height);
        self
    }
}

/// How a view's final HDR→SDR pass picks exposure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExposureMode {
    Auto,
    Manual,
}

/// Tone-mapping operator selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToneMapper {
    None,
    Aces,
    Reinhard,
}

/// Coarse render-mode selection a frame runs under.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderMode {
    Solid,
    Wireframe,
    OverlayWireframe,
}

/// Shader debug visualization channel. Non-IBL modes suppress the sky pass
/// (§4.3 step 8); IBL modes force manual exposure at EV 1 (supplemented,
/// see `SPEC_FULL.md` §C.1).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShaderDebugMode {
    Disabled,
    LightCullingHeatMap,
    DepthSlice,
    ClusterIndex,
    BaseColor,
    Uv0,
    Opacity,
    WorldNormals,
    Roughness,
    Metalness,
    IblSpecular,
    IblRawSky,
    IblIrradiance,
    IblFaceIndex,
}

/// Classification of a [`ShaderDebugMode`] used by the frame plan builder
/// and the auto-exposure step of the orchestrator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DebugModeIntent {
    /// Non-IBL debug channels suppress the sky pass.
    pub is_non_ibl: bool,
    /// IBL and non-IBL debug channels alike force manual exposure so the
    /// visualization is not skewed by auto-exposure.
    pub force_manual_exposure: bool,
    /// Only `IblRawSky` pins exposure to exactly EV 1 (untouched sky output).
    pub force_exposure_one: bool,
}

impl ShaderDebugMode {
    #[must_use]
    pub fn classify(self) -> DebugModeIntent {
        let is_non_ibl = matches!(
            self,
            ShaderDebugMode::LightCullingHeatMap
                | ShaderDebugMode::DepthSlice
                | ShaderDebugMode::ClusterIndex
                | ShaderDebugMode::BaseColor
                | ShaderDebugMode::Uv0
                | ShaderDebugMode::Opacity
                | ShaderDebugMode::WorldNormals
                | ShaderDebugMode::Roughness
                | ShaderDebugMode::Metalness
        );
        let is_ibl_debug = matches!(
            self,
            ShaderDebugMode::IblSpecular
                | ShaderDebugMode::IblRawSky
                | ShaderDebugMode::IblIrradiance
                | ShaderDebugMode::IblFaceIndex
        );
        let force_exposure_one = matches!(self, ShaderDebugMode::IblRawSky);
        DebugModeIntent {
            is_non_ibl,
            force_manual_exposure: is_non_ibl || is_ibl_debug,
            force_exposure_one,
        }
    }
}

/// Tone-map pass configuration, mutated (and scoped-restored) by the
/// orchestrator for wireframe views (§4.4).
#[derive(Debug, Clone, PartialEq)]
pub struct ToneMapPassConfig {
    pub exposure_mode: ExposureMode,
    pub manual_exposure: f32,
    pub tone_mapper: ToneMapper,
}

impl Default for ToneMapPassConfig {
    fn default() -> Self {
        Self {
            exposure_mode: ExposureMode::Auto,
            manual_exposure: 1.0,
            tone_mapper: ToneMapper::Aces,
        }
    }
}

/// Frame-wide pipeline settings snapshotted once per frame by the plan
/// builder (§4.3 inputs).
#[derive(Debug, Clone)]
pub struct PipelineSettings {
    pub render_mode: RenderMode,
    pub wire_color: Vec4,
    pub shader_debug_mode: ShaderDebugMode,
    pub gpu_debug_pass_enabled: bool,
    pub gpu_debug_mouse_down_position: Option<(f32, f32)>,
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self {
            render_mode: RenderMode::Solid,
            wire_color: Vec4::new(0.0, 1.0, 0.0, 1.0),
            shader_debug_mode: ShaderDebugMode::Disabled,
            gpu_debug_pass_enabled: false,
            gpu_debug_mouse_down_position: None,
        }
    }
}
