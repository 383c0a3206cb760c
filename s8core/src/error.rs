//! Error types for s8core

use thiserror::Error;

/// s8core error type
#[derive(Error, Debug)]
pub enum Error {
    /// Histogram binning rejected by the accumulator
    #[error("invalid binning: {0}")]
    InvalidBinning(String),

    /// Operating point label not present in the lookup table
    #[error("unknown operating point: {0}")]
    UnknownOperatingPoint(String),

    /// Fill or save on a plot group whose accumulators failed to build
    #[error("plot group {name} is not initialized: {reason}")]
    Uninitialized { name: String, reason: String },

    /// Failure reported by the output context
    #[error("output error: {0}")]
    Output(#[source] Box<dyn std::error::Error + Send + Sync>),
}

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;
