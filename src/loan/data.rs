//! Loan simulation request and result records

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::{Result, SimulationError};

/// Date of birth format accepted on raw records (e.g. 15-06-1990)
pub const DATE_OF_BIRTH_FORMAT: &str = "%d-%m-%Y";

/// A validated simulation input
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SimulationRequest {
    /// Loan principal
    pub value: f64,
    pub date_of_birth: NaiveDate,
    /// Repayment horizon in months
    pub term_months: u32,
}

impl SimulationRequest {
    pub fn new(value: f64, date_of_birth: NaiveDate, term_months: u32) -> Self {
        Self {
            value,
            date_of_birth,
            term_months,
        }
    }

    /// Check the principal and term invariants the engine relies on
    pub fn check(&self) -> Result<()> {
        if !self.value.is_finite() || self.value <= 0.0 {
            return Err(SimulationError::InvalidValue(self.value));
        }
        if self.term_months == 0 {
            return Err(SimulationError::InvalidTerm(i64::from(self.term_months)));
        }
        Ok(())
    }
}

/// Outcome of one simulation
///
/// Serialized field names follow the public loan API
/// (`total_value_to_pay`, `customer_age`, ...).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SimulationResult {
    pub loan_value: f64,
    #[serde(rename = "customer_age")]
    pub age_years: u32,
    #[serde(rename = "annual_interest_rate")]
    pub annual_rate: f64,
    pub monthly_payment: f64,
    #[serde(rename = "total_value_to_pay")]
    pub total_payable: f64,
    pub total_interest: f64,
    #[serde(rename = "payment_deadline_months")]
    pub term_months: u32,
}

/// Unvalidated record as it arrives in a batch file
///
/// Every field is optional so missing columns can be reported together.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawSimulationRequest {
    #[serde(default)]
    pub value: Option<f64>,
    #[serde(default)]
    pub date_of_birth: Option<String>,
    /// Months; signed so negative input is reported rather than rejected by the parser
    #[serde(default)]
    pub payment_deadline: Option<i64>,
}

impl RawSimulationRequest {
    pub fn new(value: f64, date_of_birth: &str, payment_deadline: i64) -> Self {
        Self {
            value: Some(value),
            date_of_birth: Some(date_of_birth.to_string()),
            payment_deadline: Some(payment_deadline),
        }
    }

    /// Validate and convert into a typed request
    pub fn validate(&self) -> Result<SimulationRequest> {
        let mut missing = Vec::new();
        if self.value.is_none() {
            missing.push("value");
        }
        if self.date_of_birth.is_none() {
            missing.push("date_of_birth");
        }
        if self.payment_deadline.is_none() {
            missing.push("payment_deadline");
        }

        let (Some(value), Some(dob), Some(deadline)) =
            (self.value, self.date_of_birth.as_deref(), self.payment_deadline)
        else {
            return Err(SimulationError::MissingFields(missing.join(", ")));
        };

        if !value.is_finite() || value <= 0.0 {
            return Err(SimulationError::InvalidValue(value));
        }

        let term_months = u32::try_from(deadline)
            .ok()
            .filter(|&months| months > 0)
            .ok_or(SimulationError::InvalidTerm(deadline))?;

        let date_of_birth = parse_date_of_birth(dob)?;

        Ok(SimulationRequest {
            value,
            date_of_birth,
            term_months,
        })
    }
}

/// Parse a DD-MM-YYYY date of birth
pub fn parse_date_of_birth(text: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(text.trim(), DATE_OF_BIRTH_FORMAT)
        .map_err(|_| SimulationError::InvalidDate(text.to_string()))
}
