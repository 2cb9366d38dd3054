//! Load simulation batches from CSV/JSON and write results back out
//!
//! CSV batches use the header `value,date_of_birth,payment_deadline`.
//! JSON batches use the loan API body shape: `{"simulations": [ ... ]}`.

use super::{RawSimulationRequest, SimulationRequest, SimulationResult};
use crate::batch::BatchOutcome;
use crate::error::{Result, SimulationError};
use csv::{Reader, Writer};
use serde::Deserialize;
use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;

/// JSON batch body
#[derive(Debug, Deserialize)]
struct BatchBody {
    simulations: Vec<RawSimulationRequest>,
}

/// Supported batch file formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BatchFormat {
    Csv,
    Json,
}

impl BatchFormat {
    /// Guess the format from a file extension (CSV unless `.json`)
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("json") => BatchFormat::Json,
            _ => BatchFormat::Csv,
        }
    }
}

fn validate_all(raw: Vec<RawSimulationRequest>) -> Result<Vec<SimulationRequest>> {
    raw.iter()
        .enumerate()
        .map(|(i, record)| record.validate().map_err(|e| e.at_index(i)))
        .collect()
}

/// Load and validate a batch file, choosing the format by extension
pub fn load_requests<P: AsRef<Path>>(path: P) -> Result<Vec<SimulationRequest>> {
    let path = path.as_ref();
    let file = File::open(path)?;
    match BatchFormat::from_path(path) {
        BatchFormat::Csv => load_requests_from_csv(file),
        BatchFormat::Json => load_requests_from_json(file),
    }
}

/// Load requests from any CSV reader
pub fn load_requests_from_csv<R: Read>(reader: R) -> Result<Vec<SimulationRequest>> {
    let mut csv_reader = Reader::from_reader(reader);
    let mut raw = Vec::new();

    for row in csv_reader.deserialize() {
        let record: RawSimulationRequest = row?;
        raw.push(record);
    }

    validate_all(raw)
}

/// Load requests from any reader holding a JSON batch body
pub fn load_requests_from_json<R: Read>(reader: R) -> Result<Vec<SimulationRequest>> {
    let body: BatchBody = serde_json::from_reader(reader)?;
    validate_all(body.simulations)
}

/// Write one CSV row per result, in order
pub fn write_results_csv<W: Write>(writer: W, results: &[SimulationResult]) -> Result<()> {
    let mut csv_writer = Writer::from_writer(writer);
    for result in results {
        csv_writer.serialize(result)?;
    }
    csv_writer.flush()?;
    Ok(())
}

/// Write a full batch outcome (results plus summary) as pretty JSON
pub fn write_outcome_json<W: Write>(writer: W, outcome: &BatchOutcome) -> Result<()> {
    serde_json::to_writer_pretty(writer, outcome)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn test_load_csv_batch() {
        let data = "value,date_of_birth,payment_deadline\n\
                    50000.0,15-06-1990,24\n\
                    30000.0,20-03-1985,36\n";

        let requests = load_requests_from_csv(data.as_bytes()).expect("csv batch");
        assert_eq!(requests.len(), 2);
        assert_eq!(requests[1].value, 30_000.0);
        assert_eq!(requests[1].date_of_birth, NaiveDate::from_ymd_opt(1985, 3, 20).unwrap());
        assert_eq!(requests[1].term_months, 36);
    }

    #[test]
    fn test_csv_validation_error_reports_row() {
        let data = "value,date_of_birth,payment_deadline\n\
                    50000.0,15-06-1990,24\n\
                    -1000.0,15-06-1990,24\n";

        let err = load_requests_from_csv(data.as_bytes()).unwrap_err();
        assert_eq!(err.item_index(), Some(1));
    }

    #[test]
    fn test_csv_empty_field_is_missing() {
        let data = "value,date_of_birth,payment_deadline\n50000.0,,24\n";

        let err = load_requests_from_csv(data.as_bytes()).unwrap_err();
        assert!(err.to_string().contains("date_of_birth"), "{}", err);
    }

    #[test]
    fn test_load_json_batch() {
        let data = r#"{"simulations": [
            {"value": 50000.0, "date_of_birth": "15-06-1990", "payment_deadline": 24},
            {"value": 75000.0, "date_of_birth": "10-12-1975", "payment_deadline": 18}
        ]}"#;

        let requests = load_requests_from_json(data.as_bytes()).expect("json batch");
        assert_eq!(requests.len(), 2);
        assert_eq!(requests[1].term_months, 18);
    }

    #[test]
    fn test_json_missing_simulations_field() {
        assert!(matches!(
            load_requests_from_json("{}".as_bytes()),
            Err(SimulationError::Json(_))
        ));
    }

    #[test]
    fn test_format_from_extension() {
        assert_eq!(BatchFormat::from_path(Path::new("batch.json")), BatchFormat::Json);
        assert_eq!(BatchFormat::from_path(Path::new("batch.JSON")), BatchFormat::Json);
        assert_eq!(BatchFormat::from_path(Path::new("batch.csv")), BatchFormat::Csv);
        assert_eq!(BatchFormat::from_path(Path::new("batch")), BatchFormat::Csv);
    }

    #[test]
    fn test_write_results_csv_header() {
        let results = vec![SimulationResult {
            loan_value: 12000.0,
            age_years: 45,
            annual_rate: 0.02,
            monthly_payment: 1010.89,
            total_payable: 12130.68,
            total_interest: 130.68,
            term_months: 12,
        }];

        let mut buf = Vec::new();
        write_results_csv(&mut buf, &results).unwrap();
        let text = String::from_utf8(buf).unwrap();

        let mut lines = text.lines();
        assert_eq!(
            lines.next(),
            Some("loan_value,customer_age,annual_interest_rate,monthly_payment,total_value_to_pay,total_interest,payment_deadline_months")
        );
        assert_eq!(lines.next(), Some("12000.0,45,0.02,1010.89,12130.68,130.68,12"));
    }
}
