//! Batch outcome and summary statistics

use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::strategy::ProcessingStrategy;
use crate::engine::round2;
use crate::loan::SimulationResult;

/// Aggregate statistics for one batch call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchSummary {
    pub total_simulations: usize,
    pub average_loan_value: f64,
    pub average_monthly_payment: f64,
    /// Wall-clock time of the batch call
    pub processing_time_ms: f64,
    pub strategy: ProcessingStrategy,
}

impl BatchSummary {
    /// Build summary statistics from ordered results
    pub fn from_results(
        results: &[SimulationResult],
        strategy: ProcessingStrategy,
        elapsed: Duration,
    ) -> Self {
        let count = results.len();
        let mean = |total: f64| if count == 0 { 0.0 } else { round2(total / count as f64) };

        let total_value: f64 = results.iter().map(|r| r.loan_value).sum();
        let total_payment: f64 = results.iter().map(|r| r.monthly_payment).sum();

        Self {
            total_simulations: count,
            average_loan_value: mean(total_value),
            average_monthly_payment: mean(total_payment),
            processing_time_ms: round2(elapsed.as_secs_f64() * 1000.0),
            strategy,
        }
    }
}

/// Results of a batch call, in input order, with their summary
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchOutcome {
    pub results: Vec<SimulationResult>,
    pub summary: BatchSummary,
}
