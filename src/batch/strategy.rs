//! Batch execution strategies and size-based selection

use serde::{Deserialize, Serialize};
use std::fmt;

/// Largest batch accepted in one call
pub const MAX_BATCH_SIZE: usize = 10_000;

/// Default contiguous chunk length for chunked execution
pub const DEFAULT_CHUNK_SIZE: usize = 100;

/// How a batch is spread across workers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProcessingStrategy {
    /// One item at a time on the calling thread
    Sequential,
    /// Small worker pool (default cap 4)
    ParallelSmall,
    /// Medium worker pool (default cap 6)
    ParallelMedium,
    /// Contiguous chunks over the large pool (default cap 8)
    ParallelChunked,
}

impl ProcessingStrategy {
    pub const ALL: [ProcessingStrategy; 4] = [
        ProcessingStrategy::Sequential,
        ProcessingStrategy::ParallelSmall,
        ProcessingStrategy::ParallelMedium,
        ProcessingStrategy::ParallelChunked,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            ProcessingStrategy::Sequential => "sequential",
            ProcessingStrategy::ParallelSmall => "parallel_small",
            ProcessingStrategy::ParallelMedium => "parallel_medium",
            ProcessingStrategy::ParallelChunked => "parallel_chunked",
        }
    }

    pub fn is_parallel(&self) -> bool {
        !matches!(self, ProcessingStrategy::Sequential)
    }
}

impl fmt::Display for ProcessingStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Thresholds, worker caps, and chunking for batch dispatch
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DispatchConfig {
    /// Largest batch run sequentially
    pub sequential_max: usize,
    /// Largest batch run on the small pool
    pub parallel_small_max: usize,
    /// Largest batch run on the medium pool; anything bigger is chunked
    pub parallel_medium_max: usize,

    /// Worker caps per pool (actual size is also capped by CPU count)
    pub small_workers: usize,
    pub medium_workers: usize,
    pub chunked_workers: usize,

    /// Items per chunk for chunked execution
    pub chunk_size: usize,

    /// Upper bound on batch length
    pub max_batch_size: usize,
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            sequential_max: 20,
            parallel_small_max: 100,
            parallel_medium_max: 500,
            small_workers: 4,
            medium_workers: 6,
            chunked_workers: 8,
            chunk_size: DEFAULT_CHUNK_SIZE,
            max_batch_size: MAX_BATCH_SIZE,
        }
    }
}

impl DispatchConfig {
    /// Strategy for a batch of `batch_size` items
    pub fn select_strategy(&self, batch_size: usize) -> ProcessingStrategy {
        if batch_size <= self.sequential_max {
            ProcessingStrategy::Sequential
        } else if batch_size <= self.parallel_small_max {
            ProcessingStrategy::ParallelSmall
        } else if batch_size <= self.parallel_medium_max {
            ProcessingStrategy::ParallelMedium
        } else {
            ProcessingStrategy::ParallelChunked
        }
    }

    /// Worker cap for a strategy (0 for sequential)
    pub fn worker_cap(&self, strategy: ProcessingStrategy) -> usize {
        match strategy {
            ProcessingStrategy::Sequential => 0,
            ProcessingStrategy::ParallelSmall => self.small_workers,
            ProcessingStrategy::ParallelMedium => self.medium_workers,
            ProcessingStrategy::ParallelChunked => self.chunked_workers,
        }
    }
}

/// Strategy for a batch under the default thresholds
pub fn select_strategy(batch_size: usize) -> ProcessingStrategy {
    DispatchConfig::default().select_strategy(batch_size)
}
