//! Error types for the worklog CLI.

use thiserror::Error;

/// Errors raised by the CLI layer itself; engine errors pass through as `Core`.
#[derive(Error, Debug)]
pub enum CliError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid input on line {line}: {message}")]
    InvalidInput { line: usize, message: String },

    #[error("Invalid date: {0} (expected YYYY-MM-DD)")]
    InvalidDate(String),

    #[error("Sync is not configured. Set sync.remote in {0}")]
    SyncNotConfigured(String),

    #[error(transparent)]
    Core(#[from] worklog_core::Error),
}

impl From<toml::de::Error> for CliError {
    fn from(e: toml::de::Error) -> Self {
        CliError::Config(e.to_string())
    }
}

impl From<toml::ser::Error> for CliError {
    fn from(e: toml::ser::Error) -> Self {
        CliError::Config(e.to_string())
    }
}

/// Result type alias for CLI operations.
pub type CliResult<T> = Result<T, CliError>;
