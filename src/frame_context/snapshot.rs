//! Double-buffered snapshot publication (§3.2, §4.1 "Double-buffered
//! snapshot").

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

use crate::frame::{Epoch, FrameSequenceNumber};
use crate::frame_context::state::ModuleSlots;
use crate::frame_context::timing::BudgetContext;
use crate::surface::SurfaceKey;
use crate::view::ViewDescriptor;

/// A frozen copy of the most recent input state, atomically swapped in by
/// the `Input` phase.
#[derive(Debug, Clone, Default)]
pub struct InputSnapshot {
    pub mouse_position: (f32, f32),
    pub mouse_buttons_down: u8,
    pub keys_down: smallvec::SmallVec<[u32; 8]>,
}

/// A surface frozen into a snapshot along with its presentable state at the
/// moment of publication.
#[derive(Debug, Clone, Copy)]
pub struct FrozenSurface {
    pub key: SurfaceKey,
    pub presentable: bool,
}

/// Owns immutable copies of the heavy per-frame containers (§3.2
/// "GameStateSnapshot"). Readers hold an `Arc` to this so that spans inside
/// the paired [`FrameSnapshot`] remain valid for as long as they keep this
/// alive.
pub struct GameStateSnapshot {
    pub version: u64,
    pub views: Vec<ViewDescriptor>,
    pub input: Option<Arc<InputSnapshot>>,
    pub surfaces: Vec<FrozenSurface>,
    pub modules: Arc<ModuleSlots>,
}

/// Cooperative-cancellation and sizing hints for the parallel task phase
/// (§5 "Cancellation & timeouts").
#[derive(Debug, Clone)]
pub struct TaskGroupInfo {
    pub expected_task_count: u32,
    pub timeout: std::time::Duration,
    pub cancellation_requested: Arc<std::sync::atomic::AtomicBool>,
}

impl Default for TaskGroupInfo {
    fn default() -> Self {
        Self {
            expected_task_count: 0,
            timeout: std::time::Duration::from_millis(32),
            cancellation_requested: Arc::new(std::sync::atomic::AtomicBool::new(false)),
        }
    }
}

/// Correlates a [`FrameSnapshot`] back to the [`GameStateSnapshot`] it was
/// built from, and to the resource generation active when it was built.
#[derive(Debug, Clone, Copy, Default)]
pub struct ValidationContext {
    pub snapshot_version: u64,
    pub resource_generation: u64,
}

/// Lightweight, task-oriented coordination record (§3.2 "FrameSnapshot").
/// Carries an `Arc` to its owning [`GameStateSnapshot`] rather than raw
/// spans: cheap to clone, and guarantees the data it points into outlives
/// every reader holding a clone, which is the same lifetime guarantee the
/// source's non-owning spans rely on their holder to uphold manually.
#[derive(Clone)]
pub struct FrameSnapshot {
    pub frame_index: FrameSequenceNumber,
    pub epoch: Epoch,
    pub start_time: std::time::Instant,
    pub budget: BudgetContext,
    pub task_group: TaskGroupInfo,
    pub validation: ValidationContext,
    pub game_state: Arc<GameStateSnapshot>,
}

impl FrameSnapshot {
    #[must_use]
    pub fn version(&self) -> u64 {
        self.validation.snapshot_version
    }
}

struct UnifiedSnapshot {
    frame: Option<FrameSnapshot>,
}

impl Default for UnifiedSnapshot {
    fn default() -> Self {
        Self { frame: None }
    }
}

/// The atomic-index double buffer described in §4.1: two slots, one atomic
/// index selecting which is visible. `publish` writes to the hidden slot
/// then flips the index with release ordering; readers load the index with
/// acquire ordering before dereferencing.
pub struct SnapshotDoubleBuffer {
    slots: [parking_lot::RwLock<UnifiedSnapshot>; 2],
    visible_index: AtomicU32,
    next_version: std::sync::atomic::AtomicU64,
}

impl Default for SnapshotDoubleBuffer {
    fn default() -> Self {
        Self {
            slots: [
                parking_lot::RwLock::new(UnifiedSnapshot::default()),
                parking_lot::RwLock::new(UnifiedSnapshot::default()),
            ],
            visible_index: AtomicU32::new(0),
            next_version: std::sync::atomic::AtomicU64::new(1),
        }
    }
}

impl SnapshotDoubleBuffer {
    /// Writes into the hidden slot and flips the visible index. Returns the
    /// newly published version. Monotonic across calls (§8 invariant 1).
    pub fn publish(
        &self,
        build: impl FnOnce(u64) -> (Arc<GameStateSnapshot>, FrameSnapshotFields),
    ) -> u64 {
        let visible = self.visible_index.load(Ordering::Acquire);
        let hidden = 1 - visible;
        let version = self.next_version.fetch_add(1, Ordering::Relaxed);

        let (game_state, fields) = build(version);
        let frame = FrameSnapshot {
            frame_index: fields.frame_index,
            epoch: fields.epoch,
            start_time: fields.start_time,
            budget: fields.budget,
            task_group: fields.task_group,
            validation: ValidationContext {
                snapshot_version: version,
                resource_generation: fields.resource_generation,
            },
            game_state,
        };

        *self.slots[hidden as usize].write() = UnifiedSnapshot { frame: Some(frame) };
        self.visible_index.store(hidden, Ordering::Release);
        version
    }

    /// Lock-free read of the currently visible pair (§4.1 "Snapshot readers").
    #[must_use]
    pub fn current(&self) -> Option<FrameSnapshot> {
        let visible = self.visible_index.load(Ordering::Acquire);
        self.slots[visible as usize].read().frame.clone()
    }
}

/// Fields the caller of [`SnapshotDoubleBuffer::publish`] supplies; kept
/// distinct from [`FrameSnapshot`] since `validation.snapshot_version` is
/// filled in by the buffer itself, not the caller.
pub struct FrameSnapshotFields {
    pub frame_index: FrameSequenceNumber,
    pub epoch: Epoch,
    pub start_time: std::time::Instant,
    pub budget: BudgetContext,
    pub task_group: TaskGroupInfo,
    pub resource_generation: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fields() -> FrameSnapshotFields {
        FrameSnapshotFields {
            frame_index: FrameSequenceNumber(1),
            epoch: Epoch(0),
            start_time: std::time::Instant::now(),
            budget: BudgetContext::default(),
            task_group: TaskGroupInfo::default(),
            resource_generation: 0,
        }
    }

    fn empty_game_state(version: u64) -> Arc<GameStateSnapshot> {
        Arc::new(GameStateSnapshot {
            version,
            views: Vec::new(),
            input: None,
            surfaces: Vec::new(),
            modules: Arc::new(ModuleSlots::default()),
        })
    }

    #[test]
    fn published_versions_are_strictly_increasing() {
        let buf = SnapshotDoubleBuffer::default();
        let v1 = buf.publish(|v| (empty_game_state(v), fields()));
        let v2 = buf.publish(|v| (empty_game_state(v), fields()));
        assert!(v2 > v1);
    }

    #[test]
    fn frame_snapshot_version_matches_its_game_state_snapshot() {
        let buf = SnapshotDoubleBuffer::default();
        buf.publish(|v| (empty_game_state(v), fields()));
        let snap = buf.current().unwrap();
        assert_eq!(snap.version(), snap.game_state.version);
    }

    #[test]
    fn reader_survives_a_republish() {
        let buf = SnapshotDoubleBuffer::default();
        buf.publish(|v| (empty_game_state(v), fields()));
        let held = buf.current().unwrap();
        buf.publish(|v| (empty_game_state(v), fields()));
        buf.publish(|v| (empty_game_state(v), fields()));
        // The held snapshot's game_state Arc keeps its data alive regardless
        // of how many times the buffer has republished since.
        assert_eq!(held.game_state.version, held.version());
    }
}
