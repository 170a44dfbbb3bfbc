//! Error types for tensor and model operations
//!
//! Every fallible operation in the crate returns [`Result`]. Shape and
//! configuration problems are reported at the boundary of the operation that
//! would violate them, so callers never see wrong-shaped output or a sentinel
//! value standing in for a failure.

use thiserror::Error;

/// Result type used throughout the crate
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while building or running the model
#[derive(Error, Debug)]
pub enum Error {
    /// Operand shapes or ranks are incompatible with the requested operation
    #[error("Shape mismatch: {0}")]
    ShapeMismatch(String),

    /// Invalid hyperparameters (zero dimensions, heads not dividing width, ...)
    #[error("Invalid configuration: {0}")]
    Configuration(String),

    /// Tensor index or token id outside its valid range
    #[error("Index out of range: {0}")]
    Index(String),

    /// Non-finite values reached a reduction that cannot tolerate them
    #[error("Numeric anomaly: {0}")]
    NumericAnomaly(String),

    /// Character that was not seen when the vocabulary was built
    #[error("Unknown symbol {0:?} is not in the vocabulary")]
    UnknownSymbol(char),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    pub(crate) fn shape(msg: impl Into<String>) -> Self {
        Error::ShapeMismatch(msg.into())
    }

    pub(crate) fn config(msg: impl Into<String>) -> Self {
        Error::Configuration(msg.into())
    }

    pub(crate) fn index(msg: impl Into<String>) -> Self {
        Error::Index(msg.into())
    }
}
