//! Amortization formulas and age derivation

use chrono::{Datelike, NaiveDate};

/// Months per year for converting annual to monthly rates
pub const MONTHS_PER_YEAR: f64 = 12.0;

/// Whole years between a birth date and a reference date
///
/// Anchored to calendar month/day: the year only counts once the birthday has
/// been reached. Birth dates after the reference give 0.
pub fn age_at(birth_date: NaiveDate, reference_date: NaiveDate) -> u32 {
    let mut age = reference_date.year() - birth_date.year();

    if (reference_date.month(), reference_date.day()) < (birth_date.month(), birth_date.day()) {
        age -= 1;
    }

    age.max(0) as u32
}

/// Level monthly payment that repays `principal` over `term_months`
///
/// payment = P * r / (1 - (1 + r)^-n), with r = annual_rate / 12.
/// A zero rate reduces to straight-line repayment. `term_months` must be at
/// least 1.
pub fn monthly_payment(principal: f64, annual_rate: f64, term_months: u32) -> f64 {
    let monthly_rate = annual_rate / MONTHS_PER_YEAR;
    let n = term_months as f64;

    if monthly_rate == 0.0 {
        return principal / n;
    }

    let denominator = 1.0 - (1.0 + monthly_rate).powf(-n);
    principal * monthly_rate / denominator
}

/// Total paid over the life of the loan
pub fn total_payable(monthly_payment: f64, term_months: u32) -> f64 {
    monthly_payment * term_months as f64
}

/// Round to cents
pub fn round2(amount: f64) -> f64 {
    (amount * 100.0).round() / 100.0
}
