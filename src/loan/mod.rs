//! Loan request/result records and batch file loading

mod data;
pub mod loader;

pub use data::{
    parse_date_of_birth, RawSimulationRequest, SimulationRequest, SimulationResult,
    DATE_OF_BIRTH_FORMAT,
};
pub use loader::{load_requests, load_requests_from_csv, load_requests_from_json, BatchFormat};
