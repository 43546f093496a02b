use serde::Serialize;
use thiserror::Error;

/// Fatal errors. Any of these aborts the whole planning run.
#[derive(Debug, Error)]
pub enum Error {
    #[error("File not found or could not be read: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Failed to parse planning input JSON: {0}")]
    DeserializationError(#[from] serde_json::Error),

    #[error("Failed to write CSV report: {0}")]
    CsvError(#[from] csv::Error),

    #[error("Invalid planning configuration: {0}")]
    InvalidConfiguration(String),

    #[error("Malformed topology: {0}")]
    TopologyError(String),

    #[error("Index out of range: {value} is outside [{min}, {max}] ({context})")]
    IndexOutOfRange { context: &'static str, value: i64, min: i64, max: i64 },
}

pub type Result<T> = std::result::Result<T, Error>;

/// Per-request failure kinds. These are recorded in the request's result and never
/// stop the batch.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[serde(tag = "kind", content = "detail")]
pub enum BlockingReason {
    #[error("NoPathFound: {0}")]
    NoPathFound(String),

    #[error("NoReverseMapping: {0}")]
    NoReverseMapping(String),

    #[error("Unsatisfiable: no candidate of the request is disjoint within group {0}")]
    Unsatisfiable(String),

    #[error("SpectrumAssignmentError: {0}")]
    SpectrumAssignmentError(String),

    #[error("Cancelled: planning run was aborted before this request was processed")]
    Cancelled,
}

impl BlockingReason {
    /// Short upper-case label used in reports.
    pub fn kind(&self) -> &'static str {
        match self {
            BlockingReason::NoPathFound(_) => "NO_PATH",
            BlockingReason::NoReverseMapping(_) => "NO_REVERSE_PATH",
            BlockingReason::Unsatisfiable(_) => "NO_DISJOINT_PATH",
            BlockingReason::SpectrumAssignmentError(_) => "NO_SPECTRUM",
            BlockingReason::Cancelled => "CANCELLED",
        }
    }
}
