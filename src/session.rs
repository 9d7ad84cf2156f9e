//! Analysis session: dataset, model cache and the request pipeline.
//!
//! A [`Session`] is the only holder of state. It owns the joined dataset,
//! the snapshot version that dataset came from, and the fitted-model
//! cache. One [`PredictionRequest`] runs feature building, training (or a
//! cache hit) and prediction, and yields a [`PredictionReport`].

use crate::cache::{CacheStats, FitKey, ModelCache};
use crate::config::AnalysisConfig;
use crate::error::{AqError, Result};
use crate::features::{build_design, CountrySelection, DesignMatrix, FeatureRange, FeatureRequest};
use crate::loader::{Dataset, SourceVersion};
use crate::model::{train, FittedModel, ModelKind};
use crate::predict::{observed_points, predict_curve, predict_point, CurvePoint, ObservedPoint};
use crate::traits::Estimator;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info};

/// Everything one prediction needs.
///
/// # Examples
///
/// ```
/// use aqfleet::features::CountrySelection;
/// use aqfleet::model::ModelKind;
/// use aqfleet::session::PredictionRequest;
///
/// let request = PredictionRequest::new("PM10", "AnnualAvg_mean")
///     .with_country("NO")
///     .with_model(ModelKind::Ridge)
///     .with_af_fleet(12.5);
/// assert_eq!(request.country, CountrySelection::Country("NO".into()));
/// assert_eq!(request.af_fleet, Some(12.5));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionRequest {
    /// Pollutant, target and feature columns.
    pub features: FeatureRequest,
    /// Country to predict for.
    pub country: CountrySelection,
    /// Model family.
    pub model: ModelKind,
    /// Primary feature input; defaults to the observed mean.
    pub af_fleet: Option<f64>,
    /// Curve sample count; defaults to the session configuration.
    pub samples: Option<usize>,
    /// Values for the additional features; default to their training means.
    pub additional_values: Option<Vec<f64>>,
}

impl PredictionRequest {
    /// OLS prediction for the reference country at the mean input.
    #[must_use]
    pub fn new(pollutant: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            features: FeatureRequest::new(pollutant, target),
            country: CountrySelection::Reference,
            model: ModelKind::Ols,
            af_fleet: None,
            samples: None,
            additional_values: None,
        }
    }

    /// Replaces the feature request.
    #[must_use]
    pub fn with_features(mut self, features: FeatureRequest) -> Self {
        self.features = features;
        self
    }

    /// Predicts for `code`.
    #[must_use]
    pub fn with_country(mut self, code: impl Into<String>) -> Self {
        self.country = CountrySelection::Country(code.into());
        self
    }

    /// Sets the model family.
    #[must_use]
    pub fn with_model(mut self, model: ModelKind) -> Self {
        self.model = model;
        self
    }

    /// Sets the primary feature input.
    #[must_use]
    pub fn with_af_fleet(mut self, value: f64) -> Self {
        self.af_fleet = Some(value);
        self
    }

    /// Sets the curve sample count.
    #[must_use]
    pub fn with_samples(mut self, samples: usize) -> Self {
        self.samples = Some(samples);
        self
    }

    /// Sets the additional feature values.
    #[must_use]
    pub fn with_additional_values(mut self, values: Vec<f64>) -> Self {
        self.additional_values = Some(values);
        self
    }
}

/// A named model weight (coefficient or importance).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureWeight {
    /// Design column name.
    pub feature: String,
    /// Weight.
    pub value: f64,
}

fn named(names: &[String], values: &[f64]) -> Vec<FeatureWeight> {
    names
        .iter()
        .zip(values)
        .map(|(feature, &value)| FeatureWeight {
            feature: feature.clone(),
            value,
        })
        .collect()
}

/// The outputs of one prediction request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionReport {
    /// Pollutant modelled.
    pub pollutant: String,
    /// Target column modelled.
    pub target: String,
    /// Model family.
    pub model: ModelKind,
    /// Country predicted for.
    pub country: String,
    /// Reference country of the encoding.
    pub reference: String,
    /// Primary feature input used for the point prediction.
    pub af_fleet: f64,
    /// Additional feature inputs used, in column order.
    pub additional_values: Vec<f64>,
    /// Clipped point prediction.
    pub prediction: f64,
    /// Clipped prediction curve over the observed range.
    pub curve: Vec<CurvePoint>,
    /// R² on the training rows.
    pub r2_train: f64,
    /// Training rows used.
    pub n_samples: usize,
    /// Coefficients by design column; empty for the forest.
    pub coefficients: Vec<FeatureWeight>,
    /// Intercept; `None` for the forest.
    pub intercept: Option<f64>,
    /// Importances by design column; empty for linear models.
    pub feature_importances: Vec<FeatureWeight>,
    /// Training rows of the selected country.
    pub observed: Vec<ObservedPoint>,
    /// Observed primary feature range.
    pub range: FeatureRange,
    /// Data snapshot the model was trained on.
    pub source_version: SourceVersion,
}

/// Owns the dataset and model cache for a run of requests.
#[derive(Debug)]
pub struct Session {
    config: AnalysisConfig,
    dataset: Dataset,
    cache: ModelCache,
}

impl Session {
    /// Starts a session over an already loaded dataset.
    #[must_use]
    pub fn new(dataset: Dataset, config: AnalysisConfig) -> Self {
        let cache = ModelCache::new(config.cache_capacity);
        Self {
            config,
            dataset,
            cache,
        }
    }

    /// Loads both sources and starts a session.
    ///
    /// # Errors
    ///
    /// See [`Dataset::load`].
    pub fn open<P: AsRef<Path>, Q: AsRef<Path>>(
        air_quality: P,
        vehicles: Q,
        config: AnalysisConfig,
    ) -> Result<Self> {
        Ok(Self::new(Dataset::load(air_quality, vehicles)?, config))
    }

    /// Swaps in a new dataset. Cached models are dropped when the snapshot
    /// version changes.
    pub fn replace_dataset(&mut self, dataset: Dataset) {
        if dataset.version != self.dataset.version {
            info!(
                old = %self.dataset.version,
                new = %dataset.version,
                "source version changed"
            );
            self.cache.invalidate_all();
        }
        self.dataset = dataset;
    }

    /// Re-reads both sources.
    ///
    /// # Errors
    ///
    /// See [`Dataset::load`]; the current dataset is kept on failure.
    pub fn reload<P: AsRef<Path>, Q: AsRef<Path>>(
        &mut self,
        air_quality: P,
        vehicles: Q,
    ) -> Result<()> {
        let dataset = Dataset::load(air_quality, vehicles)?;
        self.replace_dataset(dataset);
        Ok(())
    }

    /// The joined dataset.
    #[must_use]
    pub fn dataset(&self) -> &Dataset {
        &self.dataset
    }

    /// Session settings.
    #[must_use]
    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    /// Model cache counters.
    #[must_use]
    pub fn cache_stats(&self) -> CacheStats {
        self.cache.stats()
    }

    /// Number of cached models.
    #[must_use]
    pub fn cached_models(&self) -> usize {
        self.cache.len()
    }

    /// Builds the design matrix for `request` from the session dataset.
    ///
    /// # Errors
    ///
    /// See [`build_design`].
    pub fn design(&self, request: &FeatureRequest) -> Result<DesignMatrix> {
        build_design(&self.dataset.table, request)
    }

    /// Returns the fitted model for `design`, training it on a cache miss.
    ///
    /// # Errors
    ///
    /// See [`train`].
    pub fn fit(
        &mut self,
        request: &FeatureRequest,
        design: &DesignMatrix,
        kind: ModelKind,
    ) -> Result<Arc<FittedModel>> {
        let hp = &self.config.hyperparameters;
        let key = FitKey::new(
            self.dataset.version,
            request.pollutant.clone(),
            request.target.clone(),
            request.feature_set(),
            kind,
            design.column_order.encoding().known_codes(),
            hp,
        );
        self.cache
            .get_or_train(key, || train(&design.x, &design.y, kind, hp))
    }

    /// Runs one request end to end.
    ///
    /// # Errors
    ///
    /// - `MissingColumn` / `InsufficientData` from feature building
    /// - `InsufficientData` / `InvalidHyperparameter` from training
    /// - `UnknownCategory` if the selected country is not encoded
    /// - `DimensionMismatch` if `additional_values` has the wrong length
    pub fn run(&mut self, request: &PredictionRequest) -> Result<PredictionReport> {
        let design = self.design(&request.features)?;
        let order = &design.column_order;

        // Fail on an unknown country before paying for a fit
        let country = order.encoding().code_for(&request.country)?.to_string();

        let additional = match &request.additional_values {
            Some(values) if values.len() != order.additional().len() => {
                return Err(AqError::dimension_mismatch(
                    "additional_values",
                    order.additional().len(),
                    values.len(),
                ));
            }
            Some(values) => values.clone(),
            None => design.additional_means.clone(),
        };

        let model = self.fit(&request.features, &design, request.model)?;

        let af_fleet = request.af_fleet.unwrap_or(design.range.mean);
        if !design.range.contains(af_fleet) {
            debug!(
                af_fleet,
                min = design.range.min,
                max = design.range.max,
                "input outside observed range"
            );
        }
        let samples = request.samples.unwrap_or(self.config.curve_samples);

        let prediction = predict_point(&model, order, af_fleet, &additional, &request.country)?;
        let curve = predict_curve(
            &model,
            order,
            design.range.min,
            design.range.max,
            samples,
            &additional,
            &request.country,
        )?;
        let r2_train = model.score(&design.x, &design.y)?;

        let names = order.names();
        let coefficients = model
            .coefficients()
            .map(|c| named(&names, c.as_slice()))
            .unwrap_or_default();
        let feature_importances = model
            .feature_importances()
            .map(|imp| named(&names, &imp))
            .unwrap_or_default();

        info!(
            pollutant = %request.features.pollutant,
            target = %request.features.target,
            model = %request.model,
            country = %country,
            prediction,
            r2_train,
            "prediction complete"
        );

        Ok(PredictionReport {
            pollutant: request.features.pollutant.clone(),
            target: request.features.target.clone(),
            model: request.model,
            country,
            reference: order.encoding().reference().to_string(),
            af_fleet,
            additional_values: additional,
            prediction,
            curve,
            r2_train,
            n_samples: design.n_samples(),
            coefficients,
            intercept: model.intercept(),
            feature_importances,
            observed: observed_points(&design, &request.country)?,
            range: design.range,
            source_version: self.dataset.version,
        })
    }
}

#[cfg(test)]
#[path = "session_tests.rs"]
mod tests;
