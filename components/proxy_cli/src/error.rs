//! Error types for the CLI

use core_types::JsError;
use thiserror::Error;

use crate::logging::LogError;

/// CLI-specific errors
#[derive(Debug, Error)]
pub enum CliError {
    /// Error raised by the object model or a trap
    #[error("{0}")]
    Js(#[from] JsError),

    /// File I/O error
    #[error("File error: {0}")]
    Io(#[from] std::io::Error),

    /// Malformed shell input or editor failure
    #[error("Shell error: {0}")]
    Shell(String),

    /// `--scenario` named nothing in the catalogue
    #[error("Unknown scenario: {0}")]
    UnknownScenario(String),

    /// JSON report could not be written
    #[error("Report error: {0}")]
    Report(#[from] serde_json::Error),

    /// Logging could not be initialised
    #[error(transparent)]
    Log(#[from] LogError),
}

/// Result type for CLI operations
pub type CliResult<T> = Result<T, CliError>;
