//! Error types for worklog-core.

use thiserror::Error;

/// Result type alias using worklog-core Error
pub type Result<T> = std::result::Result<T, Error>;

/// Core error types for worklog operations
#[derive(Error, Debug)]
pub enum Error {
    // Session errors
    #[error("Session not found: {0}")]
    SessionNotFound(String),

    // Git errors
    #[error("Not a git repository: {0}")]
    NotGitRepo(String),

    #[error("git not found. Install git to sync the work log.")]
    GitNotFound,

    // Text generation errors
    #[error("Text generation failed: {0}")]
    Generation(String),

    #[error("No JSON object found in generated text")]
    MissingSummaryJson,

    // Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    // IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // Command execution errors
    #[error("Command failed: {cmd}\n{stderr}")]
    CommandFailed { cmd: String, stderr: String },

    // Serialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    // Generic errors
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create an error from a command failure
    pub fn command_failed(cmd: impl Into<String>, stderr: impl Into<String>) -> Self {
        Self::CommandFailed {
            cmd: cmd.into(),
            stderr: stderr.into(),
        }
    }
}

#[cfg(feature = "http")]
impl From<reqwest::Error> for Error {
    fn from(e: reqwest::Error) -> Self {
        Error::Generation(e.to_string())
    }
}
