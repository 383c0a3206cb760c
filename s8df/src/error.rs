//! Error types for s8df

use thiserror::Error;

/// s8df error type
#[derive(Error, Debug)]
pub enum DfError {
    /// Rejected run configuration, reported before any event is processed
    #[error("configuration error: {0}")]
    Config(String),

    /// Event input could not be read
    #[error("input error: {0}")]
    Input(String),

    /// Output file or directory could not be created
    #[error("output error: {0}")]
    Output(String),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// SQLite error
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    /// JSON parsing error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Error raised by the analysis core
    #[error(transparent)]
    Core(#[from] s8core::Error),
}

/// Result type alias
pub type Result<T> = std::result::Result<T, DfError>;
