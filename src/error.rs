//! Unified error hierarchy for powerrs
//!
//! Every fallible operation in the crate returns [`PowerRsError`]. The variants
//! mirror the three failure families of the domain: invalid input series,
//! unreadable activity/workout files, and calculations whose preconditions
//! cannot be met.

use std::path::PathBuf;
use thiserror::Error;

/// Top-level error type for all powerrs operations
#[derive(Debug, Error)]
pub enum PowerRsError {
    /// Input series rejected at construction time
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// Activity or workout file could not be turned into series/blocks
    #[error("Parse error: {0}")]
    Parse(#[from] ParseError),

    /// Calculation errors
    #[error("Calculation error: {0}")]
    Calculation(#[from] CalculationError),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Configuration(String),
}

/// Series validation errors
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    /// Timestamps must be strictly positive
    #[error("Timestamps must be positive: index {index} has {value}")]
    NonPositiveTimestamp { index: usize, value: i64 },

    /// Timestamp does not fit the 32-bit epoch-seconds representation
    #[error("Timestamp out of range at index {index}: {value}")]
    TimestampOutOfRange { index: usize, value: i64 },

    /// Timestamps must be strictly increasing
    #[error("Timestamps must be strictly increasing: index {index} has {value} after {previous}")]
    NonIncreasingTimestamp {
        index: usize,
        previous: i64,
        value: i64,
    },

    /// Power must be greater than or equal to zero
    #[error("Power data must be greater than or equal to zero: index {index} has {value}")]
    NegativePower { index: usize, value: i64 },

    /// Power sample larger than any physical power meter reports
    #[error("Power out of range at index {index}: {value}")]
    PowerOutOfRange { index: usize, value: i64 },

    /// Both series must have one entry per sample
    #[error("Series length mismatch: {timestamps} timestamps, {power} power samples")]
    LengthMismatch { timestamps: usize, power: usize },
}

/// Errors raised by the activity and workout parsers
#[derive(Debug, Error)]
pub enum ParseError {
    /// File not found at specified path
    #[error("File not found: {}", path.display())]
    FileNotFound { path: PathBuf },

    /// File extension is not handled by any parser
    #[error("Unsupported file type: {format}")]
    UnsupportedFormat { format: String },

    /// File exists but has no usable content
    #[error("Malformed input in {}: {reason}", path.display())]
    MalformedInput { path: PathBuf, reason: String },
}

impl ParseError {
    pub(crate) fn malformed(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        ParseError::MalformedInput {
            path: path.into(),
            reason: reason.into(),
        }
    }
}

/// Calculation errors
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CalculationError {
    /// The calculation is undefined on an empty series
    #[error("Cannot calculate {calculation} on an empty power series")]
    EmptySeries { calculation: String },

    /// Invalid parameter
    #[error("Invalid parameter for {calculation}: {parameter}={value}")]
    InvalidParameter {
        calculation: String,
        parameter: String,
        value: String,
    },
}

/// Result type alias for powerrs operations
pub type Result<T> = std::result::Result<T, PowerRsError>;
