//! Thin, structured logging wrappers around the `log` facade, matching the
//! density and phrasing the rest of this core uses directly at its own call
//! sites. Kept as free functions rather than a logger struct since there is
//! no per-frame state to carry — every call site already has the phase,
//! view id or surface key it wants to log alongside the message.

pub fn view_resource_allocation_failed(view_name: &str, kind: &str, width: u32, height: u32) {
    log::warn!("view '{view_name}': failed to allocate {kind} render target at {width}x{height}");
}

pub fn view_reaped(view_id: crate::view::ViewId, last_seen_frame: crate::frame::FrameSequenceNumber) {
    log::debug!("view {view_id:?}: reaped, last synced at frame {last_seen_frame:?}");
}

pub fn phase_violation(operation: &'static str, phase: crate::phase::Phase) {
    log::warn!("ignored '{operation}': not permitted during phase {phase:?}");
}

pub fn surface_framebuffer_depth_allocation_failed(key: crate::surface::SurfaceKey, width: u32, height: u32) {
    log::warn!(
        "surface {key:?}: failed to allocate depth texture at {width}x{height}; \
         framebuffer cache falling back to color-only"
    );
}

pub fn view_plan_skipped_insufficient_resources(view_name: &str) {
    log::warn!("view '{view_name}': insufficient resources for its intent; skipping this frame");
}

pub fn view_plan_invalid(view_name: &str, error: &crate::errors::FrameError) {
    log::warn!("view '{view_name}': {error}");
}

/// A third-party callback or backend call panicked and was caught at the
/// frame-loop boundary (§7: "no exceptions cross the frame-loop boundary").
/// `site` names the call site (e.g. `"surface registration callback"`).
pub fn external_call_panicked(site: &str, payload: &(dyn std::any::Any + Send)) {
    let message = payload
        .downcast_ref::<&str>()
        .copied()
        .or_else(|| payload.downcast_ref::<String>().map(String::as_str))
        .unwrap_or("<non-string panic payload>");
    log::warn!("{site} panicked and was swallowed: {message}");
}
