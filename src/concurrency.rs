//! The hybrid scheduling model (§5): a single coordinator flow steps the
//! phase sequence; parallel work is only launched from within
//! `ParallelTasks`/`CommandRecord` via a worker thread pool.

use std::sync::mpsc;
use std::sync::Arc;
use std::thread;

use crate::capability::EngineTag;
use crate::frame_context::FrameContext;
use crate::phase::Phase;

type Job = Box<dyn FnOnce() + Send + 'static>;

/// A small fixed-size worker thread pool. Jobs are only ever submitted from
/// within `ParallelTasks` or `CommandRecord` (§5); nothing here enforces
/// that by itself — it is the coordinator's responsibility to only reach
/// for the pool during those phases.
pub struct WorkerPool {
    sender: mpsc::Sender<Job>,
    handles: Vec<thread::JoinHandle<()>>,
}

impl WorkerPool {
    #[must_use]
    pub fn new(worker_count: usize) -> Self {
        let (sender, receiver) = mpsc::channel::<Job>();
        let receiver = Arc::new(parking_lot::Mutex::new(receiver));

        let handles = (0..worker_count.max(1))
            .map(|_| {
                let receiver = Arc::clone(&receiver);
                thread::spawn(move || loop {
                    let job = { receiver.lock().recv() };
                    match job {
                        Ok(job) => job(),
                        Err(_) => break,
                    }
                })
            })
            .collect();

        Self { sender, handles }
    }

    pub fn submit(&self, job: impl FnOnce() + Send + 'static) {
        let _ = self.sender.send(Box::new(job));
    }

    #[must_use]
    pub fn worker_count(&self) -> usize {
        self.handles.len()
    }
}

impl Drop for WorkerPool {
    fn drop(&mut self) {
        for handle in self.handles.drain(..) {
            let _ = handle.join();
        }
    }
}

/// Drives a [`FrameContext`] through the fixed phase sequence. The single
/// public authority for minting [`EngineTag`]s: every engine-only mutation
/// this core performs happens through one of these methods.
pub struct Coordinator;

impl Coordinator {
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Advances `ctx` to `phase`, recording it as the active phase
    /// (engine-only; §4.1 "current phase").
    pub fn enter_phase(&self, ctx: &FrameContext, phase: Phase) {
        let tag = EngineTag::issue();
        ctx.set_current_phase(phase, &tag);
    }

    /// Advances the frame sequence number, slot and epoch at `FrameEnd`
    /// (§3.1 "Epoch advance; cleanup").
    pub fn advance_frame(&self, ctx: &FrameContext, frames_in_flight: u32) {
        let tag = EngineTag::issue();
        ctx.advance_frame_identity(frames_in_flight, &tag);
    }

    /// `SnapshotBuild`'s engine-only publication step (§4.1).
    pub fn publish_snapshots(
        &self,
        ctx: &FrameContext,
        task_group: crate::frame_context::snapshot::TaskGroupInfo,
    ) -> u64 {
        let tag = EngineTag::issue();
        ctx.publish_snapshots(task_group, &tag)
    }

    /// Marks one surface ready (or not) to present. Workers submitted to the
    /// pool during `CommandRecord` call this as each one finishes recording
    /// its surface's frame (§5 "workers mark their own surfaces ready").
    pub fn set_surface_presentable(&self, ctx: &FrameContext, index: usize, value: bool) {
        let tag = EngineTag::issue();
        ctx.set_surface_presentable(index, value, &tag);
    }

    /// `FrameStart`'s engine-only surface registry sync (§4.5).
    pub fn run_frame_start_surface_sync(
        &self,
        registry: &crate::surface::SurfaceRegistry,
        cache: &mut crate::surface::FramebufferCache,
        ctx: &FrameContext,
        backend: &dyn crate::backend::GraphicsBackend,
    ) {
        let tag = EngineTag::issue();
        crate::surface::run_frame_start_sync(registry, cache, ctx, backend, &tag);
    }
}

impl Default for Coordinator {
    fn default() -> Self {
        Self::new()
    }
}
