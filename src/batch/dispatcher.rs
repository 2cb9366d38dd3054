//! Size-adaptive batch dispatcher
//!
//! Worker pools are built once, when the dispatcher is created, and reused for
//! every batch. Small batches never touch a pool. If a pool is missing or
//! cannot run the batch, the same batch is re-run sequentially.
//!
//! Failure policy: a batch either returns every result in input order, or the
//! error of the lowest-indexed failing item. This holds for every strategy.

use chrono::NaiveDate;
use log::{debug, info, warn};
use rayon::prelude::*;
use rayon::{ThreadPool, ThreadPoolBuilder};
use std::num::NonZeroUsize;
use std::time::Instant;

use super::strategy::{DispatchConfig, ProcessingStrategy};
use super::summary::{BatchOutcome, BatchSummary};
use crate::engine::{today, LoanSimulator};
use crate::error::{Result, SimulationError};
use crate::loan::{SimulationRequest, SimulationResult};

/// Number of CPU cores visible to the process (at least 1)
pub fn available_cores() -> usize {
    std::thread::available_parallelism()
        .map(NonZeroUsize::get)
        .unwrap_or(1)
}

/// Worker count for a pool: the cap, bounded by core count
pub fn pool_size(cap: usize) -> usize {
    cap.min(available_cores()).max(1)
}

fn build_pool(strategy: ProcessingStrategy, cap: usize) -> Result<ThreadPool> {
    let threads = pool_size(cap);
    ThreadPoolBuilder::new()
        .num_threads(threads)
        .thread_name(move |i| format!("{}-{}", strategy.name(), i))
        .build()
        .map_err(|e| SimulationError::WorkerPool(format!("{} pool: {}", strategy, e)))
}

/// Return all results in order, or the first failure by input position
fn collect_in_order(outcomes: Vec<Result<SimulationResult>>) -> Result<Vec<SimulationResult>> {
    outcomes
        .into_iter()
        .enumerate()
        .map(|(i, outcome)| outcome.map_err(|e| e.at_index(i)))
        .collect()
}

/// Batch dispatcher with pre-built worker pools
#[derive(Debug)]
pub struct BatchDispatcher {
    simulator: LoanSimulator,
    config: DispatchConfig,
    small_pool: Option<ThreadPool>,
    medium_pool: Option<ThreadPool>,
    chunked_pool: Option<ThreadPool>,
}

impl BatchDispatcher {
    /// Create a dispatcher and build its worker pools
    ///
    /// A pool that fails to build is logged and left out; batches routed to
    /// it run sequentially instead.
    pub fn new(simulator: LoanSimulator, config: DispatchConfig) -> Self {
        let build = |strategy: ProcessingStrategy| {
            match build_pool(strategy, config.worker_cap(strategy)) {
                Ok(pool) => {
                    info!("{} pool ready with {} workers", strategy, pool.current_num_threads());
                    Some(pool)
                }
                Err(e) => {
                    warn!("{}; {} batches will run sequentially", e, strategy);
                    None
                }
            }
        };

        let small_pool = build(ProcessingStrategy::ParallelSmall);
        let medium_pool = build(ProcessingStrategy::ParallelMedium);
        let chunked_pool = build(ProcessingStrategy::ParallelChunked);

        Self {
            simulator,
            config,
            small_pool,
            medium_pool,
            chunked_pool,
        }
    }

    /// Create a dispatcher with no worker pools; every batch runs sequentially
    pub fn sequential_only(simulator: LoanSimulator, config: DispatchConfig) -> Self {
        Self {
            simulator,
            config,
            small_pool: None,
            medium_pool: None,
            chunked_pool: None,
        }
    }

    pub fn config(&self) -> &DispatchConfig {
        &self.config
    }

    pub fn simulator(&self) -> &LoanSimulator {
        &self.simulator
    }

    /// Workers available to a strategy (0 when it runs sequentially)
    pub fn workers_for(&self, strategy: ProcessingStrategy) -> usize {
        self.pool_for(strategy)
            .map(ThreadPool::current_num_threads)
            .unwrap_or(0)
    }

    fn pool_for(&self, strategy: ProcessingStrategy) -> Option<&ThreadPool> {
        match strategy {
            ProcessingStrategy::Sequential => None,
            ProcessingStrategy::ParallelSmall => self.small_pool.as_ref(),
            ProcessingStrategy::ParallelMedium => self.medium_pool.as_ref(),
            ProcessingStrategy::ParallelChunked => self.chunked_pool.as_ref(),
        }
    }

    /// Simulate one loan with age taken as of today
    pub fn simulate_one(&self, request: &SimulationRequest) -> Result<SimulationResult> {
        self.simulator.simulate(request)
    }

    /// Simulate a batch with age taken as of today
    pub fn simulate_batch(&self, requests: &[SimulationRequest]) -> Result<BatchOutcome> {
        self.simulate_batch_as_of(requests, today())
    }

    /// Simulate a batch, evaluating every item's age as of `as_of`
    pub fn simulate_batch_as_of(
        &self,
        requests: &[SimulationRequest],
        as_of: NaiveDate,
    ) -> Result<BatchOutcome> {
        let start = Instant::now();
        self.check_batch_size(requests.len())?;

        let strategy = self.config.select_strategy(requests.len());
        debug!("dispatching {} simulations via {}", requests.len(), strategy);

        let results = self.run_with_strategy(strategy, requests, as_of)?;
        let summary = BatchSummary::from_results(&results, strategy, start.elapsed());

        Ok(BatchOutcome { results, summary })
    }

    fn check_batch_size(&self, len: usize) -> Result<()> {
        if len == 0 || len > self.config.max_batch_size {
            return Err(SimulationError::BatchSize {
                len,
                max: self.config.max_batch_size,
            });
        }
        Ok(())
    }

    /// Run a batch under an explicit strategy, bypassing size-based selection
    pub fn run_with_strategy(
        &self,
        strategy: ProcessingStrategy,
        requests: &[SimulationRequest],
        as_of: NaiveDate,
    ) -> Result<Vec<SimulationResult>> {
        let attempt = match strategy {
            ProcessingStrategy::Sequential => return self.run_sequential(requests, as_of),
            ProcessingStrategy::ParallelSmall | ProcessingStrategy::ParallelMedium => {
                self.try_parallel(self.pool_for(strategy), strategy, requests, as_of)
            }
            ProcessingStrategy::ParallelChunked => self.try_chunked(
                self.pool_for(strategy),
                requests,
                self.config.chunk_size,
                as_of,
            ),
        };

        self.finish_or_fallback(attempt, requests, as_of)
    }

    /// Chunked execution with a caller-chosen chunk size and worker cap
    ///
    /// Builds a one-off pool for this call; if that fails the batch runs
    /// sequentially.
    pub fn run_chunked(
        &self,
        requests: &[SimulationRequest],
        chunk_size: usize,
        max_workers: usize,
        as_of: NaiveDate,
    ) -> Result<Vec<SimulationResult>> {
        let attempt = build_pool(ProcessingStrategy::ParallelChunked, max_workers)
            .and_then(|pool| self.try_chunked(Some(&pool), requests, chunk_size, as_of));

        self.finish_or_fallback(attempt, requests, as_of)
    }

    /// Run items one at a time, stopping at the first failure
    pub fn run_sequential(
        &self,
        requests: &[SimulationRequest],
        as_of: NaiveDate,
    ) -> Result<Vec<SimulationResult>> {
        requests
            .iter()
            .enumerate()
            .map(|(i, request)| {
                self.simulator
                    .simulate_as_of(request, as_of)
                    .map_err(|e| e.at_index(i))
            })
            .collect()
    }

    fn finish_or_fallback(
        &self,
        attempt: Result<Vec<Result<SimulationResult>>>,
        requests: &[SimulationRequest],
        as_of: NaiveDate,
    ) -> Result<Vec<SimulationResult>> {
        match attempt {
            Ok(outcomes) => collect_in_order(outcomes),
            Err(e) => {
                warn!("{}; running {} simulations sequentially", e, requests.len());
                self.run_sequential(requests, as_of)
            }
        }
    }

    fn try_parallel(
        &self,
        pool: Option<&ThreadPool>,
        strategy: ProcessingStrategy,
        requests: &[SimulationRequest],
        as_of: NaiveDate,
    ) -> Result<Vec<Result<SimulationResult>>> {
        let pool = pool.ok_or_else(|| SimulationError::WorkerPool(format!("no {} pool", strategy)))?;

        Ok(pool.install(|| {
            requests
                .par_iter()
                .map(|request| self.simulator.simulate_as_of(request, as_of))
                .collect::<Vec<_>>()
        }))
    }

    fn try_chunked(
        &self,
        pool: Option<&ThreadPool>,
        requests: &[SimulationRequest],
        chunk_size: usize,
        as_of: NaiveDate,
    ) -> Result<Vec<Result<SimulationResult>>> {
        let pool = pool.ok_or_else(|| {
            SimulationError::WorkerPool(format!("no {} pool", ProcessingStrategy::ParallelChunked))
        })?;
        let chunk_size = chunk_size.max(1);

        // Chunk i covers [i * chunk_size, min((i + 1) * chunk_size, N))
        let chunks: Vec<Vec<Result<SimulationResult>>> = pool.install(|| {
            requests
                .par_chunks(chunk_size)
                .map(|chunk| {
                    chunk
                        .par_iter()
                        .map(|request| self.simulator.simulate_as_of(request, as_of))
                        .collect::<Vec<_>>()
                })
                .collect()
        });

        Ok(chunks.into_iter().flatten().collect())
    }
}

impl Default for BatchDispatcher {
    fn default() -> Self {
        Self::new(LoanSimulator::default(), DispatchConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn as_of() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 1).unwrap()
    }

    /// Distinct principals so any reordering is visible
    fn requests(n: usize) -> Vec<SimulationRequest> {
        let dob = NaiveDate::from_ymd_opt(1990, 6, 15).unwrap();
        (0..n)
            .map(|i| SimulationRequest::new(50_000.0 + i as f64 * 100.0, dob, 24))
            .collect()
    }

    fn assert_in_order(requests: &[SimulationRequest], results: &[SimulationResult]) {
        assert_eq!(requests.len(), results.len());
        for (i, (req, res)) in requests.iter().zip(results).enumerate() {
            assert_eq!(req.value, res.loan_value, "position {}", i);
        }
    }

    #[test]
    fn test_every_strategy_preserves_order() {
        let dispatcher = BatchDispatcher::default();
        let batch = requests(1_234);

        for strategy in ProcessingStrategy::ALL {
            let results = dispatcher.run_with_strategy(strategy, &batch, as_of()).unwrap();
            assert_in_order(&batch, &results);
        }
    }

    #[test]
    fn test_strategies_agree() {
        let dispatcher = BatchDispatcher::default();
        let batch = requests(300);

        let expected = dispatcher.run_sequential(&batch, as_of()).unwrap();
        for strategy in ProcessingStrategy::ALL {
            let results = dispatcher.run_with_strategy(strategy, &batch, as_of()).unwrap();
            assert_eq!(results, expected, "{}", strategy);
        }
    }

    #[test]
    fn test_batch_reports_selected_strategy() {
        let dispatcher = BatchDispatcher::default();

        for (n, strategy) in [
            (5, ProcessingStrategy::Sequential),
            (30, ProcessingStrategy::ParallelSmall),
            (150, ProcessingStrategy::ParallelMedium),
            (1_000, ProcessingStrategy::ParallelChunked),
        ] {
            let batch = requests(n);
            let outcome = dispatcher.simulate_batch_as_of(&batch, as_of()).unwrap();
            assert_eq!(outcome.summary.strategy, strategy);
            assert_eq!(outcome.summary.total_simulations, n);
            assert_in_order(&batch, &outcome.results);
        }
    }

    #[test]
    fn test_missing_pools_fall_back_to_sequential() {
        let dispatcher =
            BatchDispatcher::sequential_only(LoanSimulator::default(), DispatchConfig::default());
        let batch = requests(700);

        for strategy in ProcessingStrategy::ALL {
            assert_eq!(dispatcher.workers_for(strategy), 0);
            let results = dispatcher.run_with_strategy(strategy, &batch, as_of()).unwrap();
            assert_in_order(&batch, &results);
        }

        let outcome = dispatcher.simulate_batch_as_of(&batch, as_of()).unwrap();
        assert_eq!(outcome.results.len(), 700);
    }

    #[test]
    fn test_pool_sizes_respect_caps() {
        let dispatcher = BatchDispatcher::default();
        let cores = available_cores();

        assert_eq!(dispatcher.workers_for(ProcessingStrategy::Sequential), 0);
        assert_eq!(dispatcher.workers_for(ProcessingStrategy::ParallelSmall), 4.min(cores));
        assert_eq!(dispatcher.workers_for(ProcessingStrategy::ParallelMedium), 6.min(cores));
        assert_eq!(dispatcher.workers_for(ProcessingStrategy::ParallelChunked), 8.min(cores));
    }

    #[test]
    fn test_custom_chunking() {
        let dispatcher = BatchDispatcher::default();
        let batch = requests(150);

        for (chunk_size, workers) in [(50, 4), (7, 2), (1, 1), (1_000, 8), (0, 3)] {
            let results = dispatcher.run_chunked(&batch, chunk_size, workers, as_of()).unwrap();
            assert_in_order(&batch, &results);
        }
    }

    #[test]
    fn test_first_failure_wins_under_every_strategy() {
        let dispatcher = BatchDispatcher::default();
        let mut batch = requests(600);
        batch[437].term_months = 0;
        batch[512].value = -1.0;

        for strategy in ProcessingStrategy::ALL {
            let err = dispatcher
                .run_with_strategy(strategy, &batch, as_of())
                .unwrap_err();
            assert_eq!(err.item_index(), Some(437), "{}", strategy);
        }
    }

    #[test]
    fn test_batch_size_limits() {
        let dispatcher = BatchDispatcher::default();

        assert!(matches!(
            dispatcher.simulate_batch_as_of(&[], as_of()),
            Err(SimulationError::BatchSize { len: 0, .. })
        ));

        let too_many = requests(10_001);
        assert!(matches!(
            dispatcher.simulate_batch_as_of(&too_many, as_of()),
            Err(SimulationError::BatchSize { len: 10_001, max: 10_000 })
        ));

        let max = requests(10_000);
        let outcome = dispatcher.simulate_batch_as_of(&max, as_of()).unwrap();
        assert_eq!(outcome.results.len(), 10_000);
    }

    #[test]
    fn test_single_matches_one_item_batch() {
        let dispatcher = BatchDispatcher::default();
        let batch = requests(1);

        let single = dispatcher.simulator().simulate_as_of(&batch[0], as_of()).unwrap();
        let outcome = dispatcher.simulate_batch_as_of(&batch, as_of()).unwrap();
        let batched = &outcome.results[0];

        assert_abs_diff_eq!(single.monthly_payment, batched.monthly_payment, epsilon = 0.01);
        assert_abs_diff_eq!(single.total_payable, batched.total_payable, epsilon = 0.01);
        assert_abs_diff_eq!(single.total_interest, batched.total_interest, epsilon = 0.01);
    }
}
