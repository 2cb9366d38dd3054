//! Amortization engine: pure loan calculations with no I/O or state

mod amortization;
mod simulator;

pub use amortization::{age_at, monthly_payment, round2, total_payable, MONTHS_PER_YEAR};
pub use simulator::{today, LoanSimulator};

use chrono::NaiveDate;

use crate::error::Result;
use crate::loan::{SimulationRequest, SimulationResult};
use crate::rates::RateTable;

/// Annual rate for an age under the standard tiers
pub fn rate_for_age(age: u32) -> f64 {
    RateTable::default_tiers().rate_for_age(age)
}

/// Simulate one loan under the standard tiers, with age taken as of today
pub fn simulate(value: f64, date_of_birth: NaiveDate, term_months: u32) -> Result<SimulationResult> {
    LoanSimulator::default().simulate(&SimulationRequest::new(value, date_of_birth, term_months))
}
