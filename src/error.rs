use std::io;

/// All error types for the nedkit engine and harness.
#[derive(thiserror::Error, Debug)]
pub enum NedkitError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    #[error("Oracle unavailable: {0}")]
    OracleUnavailable(String),
    #[error("Configuration error: {0}")]
    Config(String),
    #[error("Record error: {0}")]
    Record(String),
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, NedkitError>;
