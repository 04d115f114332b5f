//! The frame context: the singular per-frame state container (§3.2, §4.1).
//!
//! Wraps three state layers behind one handle — [`state::Immutable`],
//! [`state::EngineState`] and a locked [`state::GameState`] — plus the
//! double-buffered snapshot pair and the error bag. Phase-gated mutators
//! assert in debug builds and silently no-op in release (§7); engine-only
//! mutators additionally require an [`crate::capability::EngineTag`], which
//! only [`crate::concurrency::Coordinator`] can mint.

pub mod errors_bag;
pub mod snapshot;
pub mod state;
pub mod timing;

use std::any::Any;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Weak};

use parking_lot::RwLock;

use crate::backend::GraphicsBackend;
use crate::capability::EngineTag;
use crate::concurrency::WorkerPool;
use crate::frame::{Epoch, FrameSequenceNumber, FrameSlot};
use crate::phase::Phase;
use crate::surface::SurfaceKey;
use crate::view::{ViewDescriptor, ViewId};

use errors_bag::{ErrorBag, FrameErrorEntry};
use snapshot::{
    BudgetContext, FrameSnapshot, FrameSnapshotFields, FrozenSurface, GameStateSnapshot,
    SnapshotDoubleBuffer, TaskGroupInfo,
};
use state::{AssetRegistry, EngineState, GameState, Immutable, ModuleSlots, ShaderDatabase};
use timing::FrameTiming;

/// Construction-time dependencies for a [`FrameContext`]. Everything here
/// lands in [`state::Immutable`] and is never replaced for the life of the
/// context (§3.2 "Immutable").
#[derive(Default)]
pub struct FrameContextInit {
    pub engine_config: Arc<crate::config::EngineConfig>,
    pub asset_registry: Option<Arc<dyn AssetRegistry>>,
    pub shader_database: Option<Arc<dyn ShaderDatabase>>,
}

pub struct FrameContext {
    immutable: Immutable,
    engine: EngineState,
    game: RwLock<GameState>,
    snapshots: SnapshotDoubleBuffer,
    errors: ErrorBag,
}

impl FrameContext {
    #[must_use]
    pub fn new(init: FrameContextInit) -> Self {
        Self {
            immutable: Immutable {
                engine_config: init.engine_config,
                asset_registry: init.asset_registry,
                shader_database: init.shader_database,
            },
            engine: EngineState::default(),
            game: RwLock::new(GameState::default()),
            snapshots: SnapshotDoubleBuffer::default(),
            errors: ErrorBag::new(),
        }
    }

    // -- Frame identity (readable by anyone) --------------------------------

    #[must_use]
    pub fn frame_sequence(&self) -> FrameSequenceNumber {
        self.engine.frame_sequence()
    }

    #[must_use]
    pub fn frame_slot(&self) -> FrameSlot {
        self.engine.frame_slot()
    }

    #[must_use]
    pub fn epoch(&self) -> Epoch {
        self.engine.epoch()
    }

    #[must_use]
    pub fn current_phase(&self) -> Phase {
        self.engine.current_phase()
    }

    // -- Immutable lookups ---------------------------------------------------

    #[must_use]
    pub fn engine_config(&self) -> &crate::config::EngineConfig {
        &self.immutable.engine_config
    }

    #[must_use]
    pub fn asset_registry(&self) -> Option<&Arc<dyn AssetRegistry>> {
        self.immutable.asset_registry.as_ref()
    }

    #[must_use]
    pub fn shader_database(&self) -> Option<&Arc<dyn ShaderDatabase>> {
        self.immutable.shader_database.as_ref()
    }

    // -- EngineState mutators (engine-only) -----------------------------------

    pub fn set_graphics_backend(&self, backend: Weak<dyn GraphicsBackend>, _tag: &EngineTag) {
        *self.engine.backend.write() = Some(backend);
    }

    #[must_use]
    pub fn graphics_backend(&self) -> Option<Arc<dyn GraphicsBackend>> {
        self.engine.backend.read().as_ref().and_then(Weak::upgrade)
    }

    pub fn set_frame_fence(&self, value: u64, _tag: &EngineTag) {
        self.engine.frame_fence.store(value, Ordering::Release);
    }

    pub fn set_worker_pool(&self, pool: Arc<WorkerPool>, _tag: &EngineTag) {
        *self.engine.worker_pool.write() = Some(pool);
    }

    #[must_use]
    pub fn worker_pool(&self) -> Option<Arc<WorkerPool>> {
        self.engine.worker_pool.read().clone()
    }

    pub fn set_frame_timing(&self, timing: FrameTiming, _tag: &EngineTag) {
        *self.engine.timing.write() = timing;
    }

    pub fn set_budget_stats(&self, stats: timing::BudgetStats, _tag: &EngineTag) {
        *self.engine.budget_stats.write() = stats;
    }

    /// Sets the current phase. Called exclusively by
    /// [`crate::concurrency::Coordinator::enter_phase`] as it steps the
    /// frame sequence (§4.1 "current phase").
    pub fn set_current_phase(&self, phase: Phase, _tag: &EngineTag) {
        let idx = Phase::ORDER.iter().position(|p| *p == phase).expect("phase is in ORDER");
        self.engine.current_phase.store(idx as u8, Ordering::Release);
    }

    /// Advances frame sequence, frame slot and epoch at `FrameEnd` (§3.1
    /// "Epoch advance; cleanup").
    pub fn advance_frame_identity(&self, frames_in_flight: u32, _tag: &EngineTag) {
        self.engine
            .frame_sequence
            .store(self.frame_sequence().next().0, Ordering::Release);
        self.engine
            .frame_slot
            .store(u64::from(self.frame_slot().advance(frames_in_flight).0), Ordering::Release);
        self.engine.epoch.store(self.epoch().advance().0, Ordering::Release);
    }

    // -- GameState mutators (phase-gated) -------------------------------------

    /// Debug-asserts `allowed`, logs, and returns whether the caller should
    /// proceed. Release builds simply no-op on a disallowed call (§7
    /// "Preconditions / invariants").
    fn check_phase_gate(&self, allowed: bool, operation: &'static str) -> bool {
        debug_assert!(
            allowed,
            "operation '{operation}' is not permitted during phase {:?}",
            self.current_phase()
        );
        if !allowed {
            crate::telemetry::phase_violation(operation, self.current_phase());
        }
        allowed
    }

    /// Phase-gated (§4.1 "Views may be mutated during FrameStart,
    /// SceneMutation, or FrameGraph").
    pub fn set_views(&self, views: Vec<ViewDescriptor>) {
        if !self.check_phase_gate(self.current_phase().allows_view_mutation(), "set_views") {
            return;
        }
        self.game.write().views = views;
    }

    /// Inserts or replaces the descriptor for `id` (§4.1 "set/add ... views").
    ///
    /// # Panics
    /// Debug builds assert if `id` does not match `descriptor.id`; callers
    /// always pass the same id as the descriptor they're publishing.
    pub fn add_view(&self, id: ViewId, descriptor: ViewDescriptor) {
        if !self.check_phase_gate(self.current_phase().allows_view_mutation(), "add_view") {
            return;
        }
        debug_assert_eq!(id, descriptor.id, "add_view id must match descriptor.id");
        let mut game = self.game.write();
        if let Some(existing) = game.views.iter_mut().find(|v| v.id == id) {
            *existing = descriptor;
        } else {
            game.views.push(descriptor);
        }
    }

    pub fn remove_view(&self, id: ViewId) {
        if !self.check_phase_gate(self.current_phase().allows_view_mutation(), "remove_view") {
            return;
        }
        self.game.write().views.retain(|v| v.id != id);
    }

    pub fn clear_views(&self) {
        if !self.check_phase_gate(self.current_phase().allows_view_mutation(), "clear_views") {
            return;
        }
        self.game.write().views.clear();
    }

    pub fn set_entity_command_buffer(&self, buffer: Box<dyn Any + Send + Sync>) {
        if !self.check_phase_gate(
            self.current_phase().allows_game_state_mutation(),
            "set_entity_command_buffer",
        ) {
            return;
        }
        self.game.write().entity_command_buffer = Some(buffer);
    }

    pub fn set_user_context(&self, context: Box<dyn Any + Send + Sync>) {
        if !self.check_phase_gate(
            self.current_phase().allows_game_state_mutation(),
            "set_user_context",
        ) {
            return;
        }
        self.game.write().user_context = Some(context);
    }

    /// Runs `f` against the module slot map under a write lock, gated the
    /// same as other GameState mutators. The opaque cross-module payloads
    /// (§3.2 scene/animation/particles/...) are never interpreted by this
    /// core, so there is nothing further to validate here.
    pub fn with_modules_mut(&self, f: impl FnOnce(&mut ModuleSlots)) {
        if !self.check_phase_gate(
            self.current_phase().allows_game_state_mutation(),
            "with_modules_mut",
        ) {
            return;
        }
        f(&mut self.game.write().modules);
    }

    pub fn with_modules<R>(&self, f: impl FnOnce(&ModuleSlots) -> R) -> R {
        f(&self.game.read().modules)
    }

    /// Structural surface add/remove/clear (§4.1: "coordinator-safe surface
    /// add/remove/clear"). The surface list lives in `EngineState`, so this
    /// is engine-only as well as phase-gated to `FrameStart`/`SceneMutation`
    /// (§4.5 step 4's reconciliation runs through here).
    pub fn reconcile_surfaces(&self, desired: &[SurfaceKey], _tag: &EngineTag) {
        if !self.check_phase_gate(
            self.current_phase().allows_structural_surface_mutation(),
            "reconcile_surfaces",
        ) {
            return;
        }

        let mut surfaces = self.engine.surfaces.write();
        for i in (0..surfaces.len()).rev() {
            if !desired.contains(&surfaces[i]) {
                surfaces.remove(i);
            }
        }
        for &key in desired {
            if !surfaces.contains(&key) {
                surfaces.push(key);
            }
        }

        let mut flags = self.engine.presentable_flags.write();
        flags.clear();
        flags.resize_with(surfaces.len(), || AtomicBool::new(true));
    }

    #[must_use]
    pub fn surfaces(&self) -> Vec<SurfaceKey> {
        self.engine.surfaces.read().clone()
    }

    // -- Snapshot publication (engine-only) -----------------------------------

    /// Copies the current `GameState` into the hidden snapshot slot, fills
    /// the paired `FrameSnapshot`, and flips the visible index (§4.1
    /// "PublishSnapshots"). Returns the newly published version.
    pub fn publish_snapshots(&self, task_group: TaskGroupInfo, _tag: &EngineTag) -> u64 {
        let game = self.game.read();
        let surfaces = self.engine.surfaces.read();
        let presentable = self.engine.presentable_flags.read();
        let frozen_surfaces: Vec<FrozenSurface> = surfaces
            .iter()
            .zip(presentable.iter())
            .map(|(key, flag)| FrozenSurface {
                key: *key,
                presentable: flag.load(Ordering::Acquire),
            })
            .collect();
        let timing = *self.engine.timing.read();
        let budget_stats = *self.engine.budget_stats.read();
        let frame_index = self.frame_sequence();
        let epoch = self.epoch();

        self.snapshots.publish(|version| {
            let game_state = Arc::new(GameStateSnapshot {
                version,
                views: game.views.clone(),
                input: game.input_snapshot.clone(),
                surfaces: frozen_surfaces,
                modules: Arc::new(ModuleSlots::default()),
            });
            let fields = FrameSnapshotFields {
                frame_index,
                epoch,
                start_time: timing.frame_start,
                budget: BudgetContext::from_stats(&budget_stats),
                task_group,
                resource_generation: epoch.0,
            };
            (game_state, fields)
        })
    }

    // -- Snapshot readers (lock-free) ------------------------------------------

    #[must_use]
    pub fn frame_snapshot(&self) -> Option<FrameSnapshot> {
        self.snapshots.current()
    }

    #[must_use]
    pub fn game_state_snapshot(&self) -> Option<Arc<GameStateSnapshot>> {
        self.snapshots.current().map(|s| s.game_state)
    }

    // -- Surface presentable flags (engine-only) -------------------------------

    pub fn set_surface_presentable(&self, index: usize, value: bool, _tag: &EngineTag) {
        if let Some(flag) = self.engine.presentable_flags.read().get(index) {
            flag.store(value, Ordering::Release);
        }
    }

    #[must_use]
    pub fn is_surface_presentable(&self, index: usize) -> bool {
        self.engine
            .presentable_flags
            .read()
            .get(index)
            .is_some_and(|flag| flag.load(Ordering::Acquire))
    }

    #[must_use]
    pub fn presentable_surfaces(&self) -> Vec<SurfaceKey> {
        let surfaces = self.engine.surfaces.read();
        let flags = self.engine.presentable_flags.read();
        surfaces
            .iter()
            .zip(flags.iter())
            .filter(|(_, flag)| flag.load(Ordering::Acquire))
            .map(|(key, _)| *key)
            .collect()
    }

    pub fn clear_presentable_flags(&self, _tag: &EngineTag) {
        for flag in self.engine.presentable_flags.read().iter() {
            flag.store(false, Ordering::Release);
        }
    }

    // -- Error bag -------------------------------------------------------------

    pub fn report_error(
        &self,
        source_type_id: std::any::TypeId,
        message: impl Into<String>,
        source_key: Option<u64>,
    ) {
        self.errors.report(source_type_id, message, source_key);
    }

    #[must_use]
    pub fn has_errors(&self) -> bool {
        self.errors.has_errors()
    }

    #[must_use]
    pub fn errors(&self) -> Vec<FrameErrorEntry> {
        self.errors.errors()
    }

    pub fn clear_errors_from_source(&self, source_type_id: std::any::TypeId, source_key: Option<u64>) {
        self.errors.clear_from_source(source_type_id, source_key);
    }

    pub fn clear_all_errors(&self) {
        self.errors.clear_all();
    }

    /// Forces the current phase without going through the coordinator.
    /// Test-only: exercising phase-gated mutators in isolation would
    /// otherwise require running the full phase sequence.
    #[cfg(test)]
    pub fn force_phase_for_test(&mut self, phase: Phase) {
        let idx = Phase::ORDER.iter().position(|p| *p == phase).expect("phase is in ORDER");
        self.engine.current_phase.store(idx as u8, Ordering::Release);
    }
}
