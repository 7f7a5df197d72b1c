use std::path::PathBuf;

use thiserror::Error;

/// Top-level error type for trace replay
#[derive(Error, Debug)]
pub enum SimulatorError {
    #[error("Failed to load trace: {0}")]
    TraceError(#[from] TraceError),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("Invalid configuration: {0}")]
    ConfigError(String),
}

/// Errors related to trace files
#[derive(Error, Debug)]
pub enum TraceError {
    #[error("Failed to read trace file '{0}': {1}")]
    FileReadError(PathBuf, #[source] std::io::Error),

    #[error("Failed to parse trace file '{0}': {1}")]
    ParseError(PathBuf, String),
}

/// Type alias for Result with SimulatorError
pub type SimulatorResult<T> = Result<T, SimulatorError>;
