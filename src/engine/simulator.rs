//! Single-loan simulation: age, rate tier, payment, totals

use chrono::{Local, NaiveDate};

use super::amortization::{age_at, monthly_payment, round2, total_payable};
use crate::error::{Result, SimulationError};
use crate::loan::{SimulationRequest, SimulationResult};
use crate::rates::RateTable;

/// Today's date in local time, used as the default age reference
pub fn today() -> NaiveDate {
    Local::now().date_naive()
}

fn finite(field: &'static str, value: f64) -> Result<f64> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(SimulationError::NonFinite { field })
    }
}

/// Loan simulator bound to a rate table
///
/// Holds no mutable state; one instance can be shared across worker threads.
#[derive(Debug, Clone, Default)]
pub struct LoanSimulator {
    rates: RateTable,
}

impl LoanSimulator {
    /// Create a simulator with the given rate table
    pub fn new(rates: RateTable) -> Self {
        Self { rates }
    }

    /// Simulate with age evaluated as of today
    pub fn simulate(&self, request: &SimulationRequest) -> Result<SimulationResult> {
        self.simulate_as_of(request, today())
    }

    /// Simulate with age evaluated as of `as_of`
    pub fn simulate_as_of(
        &self,
        request: &SimulationRequest,
        as_of: NaiveDate,
    ) -> Result<SimulationResult> {
        request.check()?;

        let age_years = age_at(request.date_of_birth, as_of);
        let annual_rate = self.rates.rate_for_age(age_years);

        let payment = monthly_payment(request.value, annual_rate, request.term_months);

        // Totals are rounded before the interest subtraction
        let monthly_payment = finite("monthly_payment", round2(payment))?;
        let total_payable = finite(
            "total_payable",
            round2(total_payable(payment, request.term_months)),
        )?;
        let total_interest = finite("total_interest", round2(total_payable - request.value))?;

        Ok(SimulationResult {
            loan_value: request.value,
            age_years,
            annual_rate,
            monthly_payment,
            total_payable,
            total_interest,
            term_months: request.term_months,
        })
    }

    pub fn rates(&self) -> &RateTable {
        &self.rates
    }
}
