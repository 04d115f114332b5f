//! The three state layers held by [`super::FrameContext`] (§3.2).

use std::any::{Any, TypeId};
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicU8, Ordering};
use std::sync::{Arc, Weak};

use parking_lot::RwLock;
use rustc_hash::FxHashMap;

use crate::backend::GraphicsBackend;
use crate::concurrency::WorkerPool;
use crate::frame::{Epoch, FrameSequenceNumber, FrameSlot};
use crate::frame_context::timing::{BudgetStats, FrameTiming};
use crate::phase::Phase;
use crate::surface::SurfaceKey;
use crate::view::ViewDescriptor;

/// Read-only, never-replaced application-lifetime pointers (§3.2 "Immutable").
pub trait AssetRegistry: Send + Sync {}
pub trait ShaderDatabase: Send + Sync {}

pub struct Immutable {
    pub engine_config: Arc<crate::config::EngineConfig>,
    pub asset_registry: Option<Arc<dyn AssetRegistry>>,
    pub shader_database: Option<Arc<dyn ShaderDatabase>>,
}

/// Engine-owned state, mutated only through methods gated by
/// [`crate::capability::EngineTag`] (§3.2 "EngineState").
pub struct EngineState {
    pub(crate) frame_sequence: AtomicU64,
    pub(crate) frame_slot: AtomicU64,
    pub(crate) epoch: AtomicU64,
    pub(crate) backend: RwLock<Option<Weak<dyn GraphicsBackend>>>,
    pub(crate) frame_fence: AtomicU64,
    /// `Phase` encoded as its index into [`Phase::ORDER`].
    pub(crate) current_phase: AtomicU8,
    pub(crate) worker_pool: RwLock<Option<Arc<WorkerPool>>>,
    pub(crate) surfaces: RwLock<Vec<SurfaceKey>>,
    pub(crate) presentable_flags: RwLock<Vec<AtomicBool>>,
    pub(crate) timing: RwLock<FrameTiming>,
    pub(crate) budget_stats: RwLock<BudgetStats>,
}

impl Default for EngineState {
    fn default() -> Self {
        Self {
            frame_sequence: AtomicU64::new(0),
            frame_slot: AtomicU64::new(0),
            epoch: AtomicU64::new(0),
            backend: RwLock::new(None),
            frame_fence: AtomicU64::new(0),
            current_phase: AtomicU8::new(0),
            worker_pool: RwLock::new(None),
            surfaces: RwLock::new(Vec::new()),
            presentable_flags: RwLock::new(Vec::new()),
            timing: RwLock::new(FrameTiming::starting_now()),
            budget_stats: RwLock::new(BudgetStats::default()),
        }
    }
}

impl EngineState {
    #[must_use]
    pub fn frame_sequence(&self) -> FrameSequenceNumber {
        FrameSequenceNumber(self.frame_sequence.load(Ordering::Relaxed))
    }

    #[must_use]
    pub fn frame_slot(&self) -> FrameSlot {
        FrameSlot(self.frame_slot.load(Ordering::Relaxed) as u32)
    }

    #[must_use]
    pub fn epoch(&self) -> Epoch {
        Epoch(self.epoch.load(Ordering::Relaxed))
    }

    #[must_use]
    pub fn current_phase(&self) -> Phase {
        Phase::ORDER[self.current_phase.load(Ordering::Acquire) as usize]
    }

    #[must_use]
    pub fn frame_fence(&self) -> u64 {
        self.frame_fence.load(Ordering::Acquire)
    }
}

/// Simple type-keyed slot map used for the cross-module data containers
/// (scene, animation, particles, materials, physics, AI, audio — §3.2) that
/// this core treats as opaque payloads it stores and hands back, but never
/// interprets. Modeled after the `http`-crate-style `Extensions` pattern
/// rather than a C++ template, since ownership and downcasting already give
/// Rust a natural idiom for "typed slot keyed by its own type" (§9
/// "Data-oriented cross-module access").
#[derive(Default)]
pub struct ModuleSlots {
    slots: FxHashMap<TypeId, Box<dyn Any + Send + Sync>>,
}

impl ModuleSlots {
    pub fn set<T: Send + Sync + 'static>(&mut self, value: T) {
        self.slots.insert(TypeId::of::<T>(), Box::new(value));
    }

    #[must_use]
    pub fn get<T: Send + Sync + 'static>(&self) -> Option<&T> {
        self.slots.get(&TypeId::of::<T>()).and_then(|b| b.downcast_ref())
    }

    #[must_use]
    pub fn get_mut<T: Send + Sync + 'static>(&mut self) -> Option<&mut T> {
        self.slots
            .get_mut(&TypeId::of::<T>())
            .and_then(|b| b.downcast_mut())
    }
}

/// Mutable only during phases the registry allows (§3.2 "GameState").
#[derive(Default)]
pub struct GameState {
    pub(crate) views: Vec<ViewDescriptor>,
    pub(crate) input_snapshot: Option<Arc<crate::frame_context::snapshot::InputSnapshot>>,
    pub(crate) entity_command_buffer: Option<Box<dyn Any + Send + Sync>>,
    pub(crate) user_context: Option<Box<dyn Any + Send + Sync>>,
    pub(crate) modules: ModuleSlots,
}
