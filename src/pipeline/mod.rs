//! Per-view pass orchestration (§4.4).

pub mod orchestrator;
pub mod tonemap_guard;

pub use orchestrator::{HdrTargets, Orchestrator, OrchestratorPasses, Pass, ViewRenderInputs};
pub use tonemap_guard::ToneMapOverrideGuard;
