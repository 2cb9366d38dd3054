//! Loan Simulator CLI
//!
//! Command-line interface for simulating a single loan

use anyhow::{Context, Result};
use clap::Parser;
use loan_simulator::loan::{parse_date_of_birth, RawSimulationRequest};
use loan_simulator::LoanSimulator;

#[derive(Parser)]
#[command(author, version, about = "Simulate a single age-banded amortized loan", long_about = None)]
struct Cli {
    /// Loan principal
    #[arg(long)]
    value: f64,

    /// Date of birth, DD-MM-YYYY
    #[arg(long)]
    date_of_birth: String,

    /// Repayment term in months
    #[arg(long)]
    payment_deadline: i64,

    /// Evaluate age as of this date (DD-MM-YYYY) instead of today
    #[arg(long)]
    as_of: Option<String>,

    /// Print the result as JSON
    #[arg(long)]
    json: bool,
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let request = RawSimulationRequest::new(cli.value, &cli.date_of_birth, cli.payment_deadline)
        .validate()
        .context("Invalid simulation request")?;

    let simulator = LoanSimulator::default();
    let result = match cli.as_of.as_deref() {
        Some(date) => {
            let as_of = parse_date_of_birth(date).context("Invalid --as-of date")?;
            simulator.simulate_as_of(&request, as_of)
        }
        None => simulator.simulate(&request),
    }
    .context("Simulation failed")?;

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&result)?);
        return Ok(());
    }

    println!("Loan Simulator v0.1.0");
    println!("=====================\n");
    println!("  Loan Value:       ${:.2}", result.loan_value);
    println!("  Customer Age:     {}", result.age_years);
    println!("  Annual Rate:      {:.2}%", result.annual_rate * 100.0);
    println!("  Term:             {} months", result.term_months);
    println!();
    println!("  Monthly Payment:  ${:.2}", result.monthly_payment);
    println!("  Total To Pay:     ${:.2}", result.total_payable);
    println!("  Total Interest:   ${:.2}", result.total_interest);

    Ok(())
}
