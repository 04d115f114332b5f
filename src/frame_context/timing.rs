//! Per-frame timing and adaptive budget statistics (§3.2).

use std::time::{Duration, Instant};

/// CPU/GPU/wall timing recorded for the frame in progress.
#[derive(Debug, Clone, Copy)]
pub struct FrameTiming {
    pub frame_start: Instant,
    pub cpu_time: Duration,
    pub gpu_time: Duration,
    pub wall_time: Duration,
}

impl FrameTiming {
    #[must_use]
    pub fn starting_now() -> Self {
        Self {
            frame_start: Instant::now(),
            cpu_time: Duration::ZERO,
            gpu_time: Duration::ZERO,
            wall_time: Duration::ZERO,
        }
    }
}

/// Adaptive budget bookkeeping consulted by parallel-task scheduling and
/// surfaced to readers via [`crate::frame_context::snapshot::FrameSnapshot`].
#[derive(Debug, Clone, Copy)]
pub struct BudgetStats {
    pub cpu_budget: Duration,
    pub gpu_budget: Duration,
    pub overruns_this_epoch: u32,
}

impl Default for BudgetStats {
    fn default() -> Self {
        Self {
            cpu_budget: Duration::from_millis(16),
            gpu_budget: Duration::from_millis(16),
            overruns_this_epoch: 0,
        }
    }
}

/// Coordination hints derived from [`BudgetStats`] and copied into every
/// [`crate::frame_context::snapshot::FrameSnapshot`].
#[derive(Debug, Clone, Copy, Default)]
pub struct BudgetContext {
    pub cpu_budget: Duration,
    pub gpu_budget: Duration,
    pub is_over_budget: bool,
}

impl BudgetContext {
    #[must_use]
    pub fn from_stats(stats: &BudgetStats) -> Self {
        Self {
            cpu_budget: stats.cpu_budget,
            gpu_budget: stats.gpu_budget,
            is_over_budget: stats.overruns_this_epoch > 0,
        }
    }
}
