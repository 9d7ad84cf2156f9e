//! Error types for aqfleet operations.
//!
//! Every failure in the regression path is local to a single request:
//! nothing here needs rollback, and none of the variants are retryable.

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for aqfleet operations.
///
/// # Examples
///
/// ```
/// use aqfleet::error::AqError;
///
/// let err = AqError::insufficient_data("no rows for pollutant PM10");
/// assert!(err.to_string().contains("not enough data"));
/// ```
#[derive(Debug, Error)]
pub enum AqError {
    /// A required data file is absent.
    #[error("missing data source: {}", path.display())]
    MissingSource {
        /// Path that was looked up
        path: PathBuf,
    },

    /// Too few usable rows remain, or the numeric solve failed.
    #[error("not enough data for this combination: {context}")]
    InsufficientData {
        /// What was being fitted or filtered
        context: String,
    },

    /// A selected category has no indicator column and is not the reference.
    #[error("unknown category '{value}' (known: {})", known.join(", "))]
    UnknownCategory {
        /// Requested value
        value: String,
        /// Values the fitted encoding knows about, reference included
        known: Vec<String>,
    },

    /// A named column does not exist in the table.
    #[error("column not found: {name}")]
    MissingColumn {
        /// Column name
        name: String,
    },

    /// Matrix/vector dimensions don't match for the operation.
    #[error("dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch {
        /// Expected dimensions description
        expected: String,
        /// Actual dimensions found
        actual: String,
    },

    /// Invalid hyperparameter value provided.
    #[error("invalid hyperparameter: {param} = {value}, expected {constraint}")]
    InvalidHyperparameter {
        /// Parameter name
        param: String,
        /// Provided value
        value: String,
        /// Constraint description
        constraint: String,
    },

    /// Model name not in the registry.
    #[error("unknown model kind: {name}")]
    UnknownModel {
        /// Name that failed to parse
        name: String,
    },

    /// Predict or score called before fit.
    #[error("model not fitted")]
    NotFitted,

    /// CSV parse failure.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Configuration file could not be decoded.
    #[error("configuration error: {0}")]
    Config(#[from] serde_json::Error),

    /// I/O error other than a missing source.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl AqError {
    /// Create an insufficient-data error with context.
    #[must_use]
    pub fn insufficient_data(context: impl Into<String>) -> Self {
        Self::InsufficientData {
            context: context.into(),
        }
    }

    /// Create a dimension mismatch error with descriptive context.
    #[must_use]
    pub fn dimension_mismatch(context: &str, expected: usize, actual: usize) -> Self {
        Self::DimensionMismatch {
            expected: format!("{context}={expected}"),
            actual: format!("{actual}"),
        }
    }

    /// Create a missing-column error.
    #[must_use]
    pub fn missing_column(name: impl Into<String>) -> Self {
        Self::MissingColumn { name: name.into() }
    }

    /// Create a missing-source error.
    #[must_use]
    pub fn missing_source(path: impl Into<PathBuf>) -> Self {
        Self::MissingSource { path: path.into() }
    }

    /// Returns true for the "not enough data" state a presenter shows to users
    /// instead of treating it as a crash.
    #[must_use]
    pub fn is_insufficient_data(&self) -> bool {
        matches!(self, Self::InsufficientData { .. })
    }
}

/// Convenience type alias for Results.
pub type Result<T> = std::result::Result<T, AqError>;
