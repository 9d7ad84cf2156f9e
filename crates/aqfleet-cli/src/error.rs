//! Error types for aqfleet-cli

use aqfleet::AqError;
use std::process::ExitCode;
use thiserror::Error;

/// Result type alias for CLI operations
pub(crate) type Result<T> = std::result::Result<T, CliError>;

/// CLI error types
#[derive(Error, Debug)]
pub(crate) enum CliError {
    /// Library failure
    #[error("{0}")]
    Analysis(#[from] AqError),

    /// Bad flag combination or value
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// JSON encoding failed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl CliError {
    /// Numeric exit status for this error
    pub(crate) fn code(&self) -> u8 {
        match self {
            Self::Analysis(err) => match err {
                AqError::InsufficientData { .. } => 2,
                AqError::MissingSource { .. } => 3,
                AqError::MissingColumn { .. }
                | AqError::UnknownCategory { .. }
                | AqError::UnknownModel { .. }
                | AqError::InvalidHyperparameter { .. } => 4,
                AqError::Csv(_) | AqError::Config(_) => 5,
                AqError::Io(_) => 7,
                AqError::DimensionMismatch { .. } | AqError::NotFitted => 1,
            },
            Self::InvalidArgument(_) => 4,
            Self::Json(_) => 1,
        }
    }

    /// Get exit code for this error
    pub(crate) fn exit_code(&self) -> ExitCode {
        ExitCode::from(self.code())
    }
}
