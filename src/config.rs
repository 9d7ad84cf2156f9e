//! Analysis configuration.

use crate::cache::DEFAULT_CAPACITY;
use crate::error::{AqError, Result};
use crate::model::Hyperparameters;
use crate::predict::DEFAULT_CURVE_SAMPLES;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Settings for an analysis [`Session`](crate::session::Session).
///
/// Every field has a default, so a JSON file only needs the keys it
/// overrides:
///
/// ```
/// use aqfleet::config::AnalysisConfig;
///
/// let config: AnalysisConfig =
///     serde_json::from_str(r#"{"curve_samples": 50, "hyperparameters": {"lasso_alpha": 0.5}}"#)
///         .unwrap();
/// assert_eq!(config.curve_samples, 50);
/// assert_eq!(config.hyperparameters.lasso_alpha, 0.5);
/// assert_eq!(config.hyperparameters.ridge_alpha, 1.0);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Model training knobs.
    pub hyperparameters: Hyperparameters,
    /// Maximum number of cached fitted models.
    pub cache_capacity: usize,
    /// Default number of prediction curve samples.
    pub curve_samples: usize,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            hyperparameters: Hyperparameters::default(),
            cache_capacity: DEFAULT_CAPACITY,
            curve_samples: DEFAULT_CURVE_SAMPLES,
        }
    }
}

impl AnalysisConfig {
    /// Creates the default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the training hyperparameters.
    #[must_use]
    pub fn with_hyperparameters(mut self, hyperparameters: Hyperparameters) -> Self {
        self.hyperparameters = hyperparameters;
        self
    }

    /// Sets the model cache capacity.
    #[must_use]
    pub fn with_cache_capacity(mut self, capacity: usize) -> Self {
        self.cache_capacity = capacity;
        self
    }

    /// Sets the default curve sample count.
    #[must_use]
    pub fn with_curve_samples(mut self, samples: usize) -> Self {
        self.curve_samples = samples;
        self
    }

    /// Reads a configuration from a JSON file.
    ///
    /// # Errors
    ///
    /// `MissingSource` if the file is absent, `Config` if it is not valid
    /// JSON for this type.
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.is_file() {
            return Err(AqError::missing_source(path));
        }
        let text = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&text)?)
    }
}
