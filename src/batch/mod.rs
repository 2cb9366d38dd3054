//! Batch simulation: strategy selection, worker pools, and summaries

mod dispatcher;
mod strategy;
mod summary;

pub use dispatcher::{available_cores, pool_size, BatchDispatcher};
pub use strategy::{
    select_strategy, DispatchConfig, ProcessingStrategy, DEFAULT_CHUNK_SIZE, MAX_BATCH_SIZE,
};
pub use summary::{BatchOutcome, BatchSummary};

use std::sync::OnceLock;

use crate::error::Result;
use crate::loan::SimulationRequest;

static DEFAULT_DISPATCHER: OnceLock<BatchDispatcher> = OnceLock::new();

/// Process-wide dispatcher with the standard rate tiers and thresholds
///
/// Pools are built on first use and kept for the life of the process.
pub fn default_dispatcher() -> &'static BatchDispatcher {
    DEFAULT_DISPATCHER.get_or_init(BatchDispatcher::default)
}

/// Simulate a batch on the process-wide dispatcher, age as of today
pub fn simulate_batch(requests: &[SimulationRequest]) -> Result<BatchOutcome> {
    default_dispatcher().simulate_batch(requests)
}
