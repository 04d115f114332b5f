//! Scoped tone-map override (§4.4 "scoped override ... restored on scope
//! exit"; supplemented from the upstream engine's `ToneMapOverrideGuard`,
//! see `SPEC_FULL.md` §C.2).

use crate::config::{ExposureMode, ToneMapPassConfig, ToneMapper};

/// Applies the neutral tonemap override to `config` for the duration of the
/// guard's lifetime, restoring the original values on drop. Used when a
/// view's [`crate::view::plan::ToneMapPolicy`] is `Neutral` (wireframe
/// views, §4.4).
pub struct ToneMapOverrideGuard<'a> {
    config: &'a mut ToneMapPassConfig,
    saved: ToneMapPassConfig,
}

impl<'a> ToneMapOverrideGuard<'a> {
    pub fn new(config: &'a mut ToneMapPassConfig) -> Self {
        let saved = config.clone();
        config.exposure_mode = ExposureMode::Manual;
        config.manual_exposure = 1.0;
        config.tone_mapper = ToneMapper::None;
        Self { config, saved }
    }
}

impl Drop for ToneMapOverrideGuard<'_> {
    fn drop(&mut self) {
        *self.config = self.saved.clone();
    }
}
