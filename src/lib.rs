//! Loan Simulator - age-banded amortized loan calculations
//!
//! This library provides:
//! - Age derivation and age-banded annual rate lookup
//! - Level monthly payment, total payable, and total interest
//! - Batch simulation that picks sequential, parallel, or chunked execution by size
//! - CSV/JSON batch loading and result writing

pub mod error;
pub mod rates;
pub mod loan;
pub mod engine;
pub mod batch;

// Re-export commonly used types
pub use error::{Result, SimulationError};
pub use rates::{RateBand, RateTable};
pub use loan::{RawSimulationRequest, SimulationRequest, SimulationResult};
pub use engine::{simulate, LoanSimulator};
pub use batch::{simulate_batch, BatchDispatcher, BatchOutcome, BatchSummary, DispatchConfig, ProcessingStrategy};
