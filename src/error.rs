//! Error types for simulation, batch dispatch, and batch file I/O

use thiserror::Error;

/// Errors raised by the engine, the dispatcher, and the batch loaders
#[derive(Debug, Error)]
pub enum SimulationError {
    /// Principal must be a positive, finite amount
    #[error("Value must be a positive number (got {0})")]
    InvalidValue(f64),

    /// A zero-month term would divide by zero in the payment formula
    #[error("Payment deadline must be a positive integer (got {0})")]
    InvalidTerm(i64),

    /// Date of birth could not be parsed as DD-MM-YYYY
    #[error("Date of birth must be in DD-MM-YYYY format (got {0:?})")]
    InvalidDate(String),

    /// A required field was absent from a raw record
    #[error("Missing required fields: {0}")]
    MissingFields(String),

    /// A computed figure came out NaN or infinite
    #[error("{field} is not a finite number")]
    NonFinite { field: &'static str },

    /// Batch length outside 1..=max
    #[error("batch must contain between 1 and {max} simulations (got {len})")]
    BatchSize { len: usize, max: usize },

    /// First failing item of a batch, by input position
    #[error("simulation {index} failed: {source}")]
    Item {
        index: usize,
        #[source]
        source: Box<SimulationError>,
    },

    /// Worker pool could not be built or could not run the batch
    #[error("worker pool unavailable: {0}")]
    WorkerPool(String),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl SimulationError {
    /// Tag an error with the batch position it came from
    pub fn at_index(self, index: usize) -> Self {
        SimulationError::Item {
            index,
            source: Box::new(self),
        }
    }

    /// Batch position for item-level errors
    pub fn item_index(&self) -> Option<usize> {
        match self {
            SimulationError::Item { index, .. } => Some(*index),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, SimulationError>;
