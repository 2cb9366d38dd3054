//! Run a batch of loan simulations from a CSV or JSON file
//!
//! Writes per-loan results (CSV) or the full outcome with summary (JSON)

use anyhow::{Context, Result};
use clap::Parser;
use loan_simulator::batch::{BatchDispatcher, DispatchConfig, ProcessingStrategy, DEFAULT_CHUNK_SIZE};
use loan_simulator::engine::today;
use loan_simulator::loan::{load_requests, loader, parse_date_of_birth, BatchFormat};
use loan_simulator::LoanSimulator;
use std::fs::File;
use std::io::BufWriter;
use std::path::PathBuf;
use std::time::Instant;

#[derive(Parser)]
#[command(author, version, about = "Simulate a batch of loans", long_about = None)]
struct Cli {
    /// Input batch file (.csv or .json)
    input: PathBuf,

    /// Output file; .json writes results plus summary, anything else writes CSV
    #[arg(short, long, default_value = "simulation_results.csv")]
    output: PathBuf,

    /// Items per chunk for large batches
    #[arg(long, default_value_t = DEFAULT_CHUNK_SIZE)]
    chunk_size: usize,

    /// Evaluate ages as of this date (DD-MM-YYYY) instead of today
    #[arg(long)]
    as_of: Option<String>,

    /// Run every batch sequentially
    #[arg(long)]
    sequential: bool,
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let start = Instant::now();
    println!("Loading simulations from {}...", cli.input.display());

    let requests = load_requests(&cli.input)
        .with_context(|| format!("Failed to load {}", cli.input.display()))?;
    println!("Loaded {} simulations in {:?}", requests.len(), start.elapsed());

    let as_of = match cli.as_of.as_deref() {
        Some(date) => parse_date_of_birth(date).context("Invalid --as-of date")?,
        None => today(),
    };

    let config = DispatchConfig {
        chunk_size: cli.chunk_size,
        ..Default::default()
    };
    let dispatcher = if cli.sequential {
        BatchDispatcher::sequential_only(LoanSimulator::default(), config)
    } else {
        BatchDispatcher::new(LoanSimulator::default(), config)
    };

    let strategy = dispatcher.config().select_strategy(requests.len());
    let workers = dispatcher.workers_for(strategy);
    if strategy == ProcessingStrategy::Sequential || workers == 0 {
        println!("Running simulations sequentially...");
    } else {
        println!("Running simulations via {} ({} workers)...", strategy, workers);
    }

    let outcome = dispatcher
        .simulate_batch_as_of(&requests, as_of)
        .context("Batch simulation failed")?;

    let file = File::create(&cli.output)
        .with_context(|| format!("Failed to create {}", cli.output.display()))?;
    let writer = BufWriter::new(file);
    match BatchFormat::from_path(&cli.output) {
        BatchFormat::Json => loader::write_outcome_json(writer, &outcome)?,
        BatchFormat::Csv => loader::write_results_csv(writer, &outcome.results)?,
    }
    println!("Output written to {}", cli.output.display());

    let summary = &outcome.summary;
    println!("\nBatch Summary:");
    println!("  Total Simulations:       {}", summary.total_simulations);
    println!("  Strategy:                {}", summary.strategy);
    println!("  Processing Time:         {:.2} ms", summary.processing_time_ms);
    println!("  Average Loan Value:      ${:.2}", summary.average_loan_value);
    println!("  Average Monthly Payment: ${:.2}", summary.average_monthly_payment);

    println!("\nTotal time: {:?}", start.elapsed());

    Ok(())
}
