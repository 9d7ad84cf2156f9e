//! Model registry and trainer.
//!
//! A closed menu of regressors selected by [`ModelKind`]. Every fitted
//! model is a [`FittedModel`] exposing the common [`Estimator`] surface.

use crate::error::{AqError, Result};
use crate::linear_model::{Lasso, LinearRegression, Ridge};
use crate::primitives::{Matrix, Vector};
use crate::traits::Estimator;
use crate::tree::RandomForestRegressor;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tracing::{debug, info};

/// The model families on offer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ModelKind {
    /// Ordinary least squares.
    Ols,
    /// L2-regularized least squares.
    Ridge,
    /// L1-regularized least squares.
    Lasso,
    /// Bagged CART regressors.
    RandomForest,
}

impl ModelKind {
    /// Every kind, in menu order.
    pub const ALL: [ModelKind; 4] = [
        ModelKind::Ols,
        ModelKind::Ridge,
        ModelKind::Lasso,
        ModelKind::RandomForest,
    ];

    /// Name used in the results tables.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            ModelKind::Ols => "LinearRegression",
            ModelKind::Ridge => "Ridge",
            ModelKind::Lasso => "Lasso",
            ModelKind::RandomForest => "RandomForest",
        }
    }

    /// True for the families with coefficients and an intercept.
    #[must_use]
    pub fn is_linear(self) -> bool {
        !matches!(self, ModelKind::RandomForest)
    }
}

impl fmt::Display for ModelKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ModelKind {
    type Err = AqError;

    /// Case-insensitive; accepts `LinearRegression`/`OLS`, `Ridge`, `Lasso`,
    /// `RandomForest`.
    fn from_str(s: &str) -> Result<Self> {
        let normalized: String = s
            .trim()
            .chars()
            .filter(|c| !matches!(c, ' ' | '_' | '-'))
            .collect::<String>()
            .to_ascii_lowercase();
        match normalized.as_str() {
            "linearregression" | "ols" | "linear" => Ok(ModelKind::Ols),
            "ridge" => Ok(ModelKind::Ridge),
            "lasso" => Ok(ModelKind::Lasso),
            "randomforest" | "randomforestregressor" | "rf" => Ok(ModelKind::RandomForest),
            _ => Err(AqError::UnknownModel {
                name: s.to_string(),
            }),
        }
    }
}

/// Training knobs for every model family.
///
/// # Examples
///
/// ```
/// use aqfleet::model::Hyperparameters;
///
/// let hp = Hyperparameters::default().with_ridge_alpha(0.5);
/// assert_eq!(hp.ridge_alpha, 0.5);
/// assert_eq!(hp.n_estimators, 100);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Hyperparameters {
    /// Ridge regularization strength.
    pub ridge_alpha: f64,
    /// Lasso regularization strength.
    pub lasso_alpha: f64,
    /// Lasso coordinate descent sweep limit.
    pub lasso_max_iter: usize,
    /// Lasso convergence tolerance.
    pub lasso_tol: f64,
    /// Trees in the random forest.
    pub n_estimators: usize,
    /// Per-tree depth limit; `None` grows until leaves are pure.
    pub max_depth: Option<usize>,
    /// Seed for bootstrap sampling.
    pub random_seed: u64,
}

impl Default for Hyperparameters {
    fn default() -> Self {
        Self {
            ridge_alpha: 1.0,
            lasso_alpha: 0.1,
            lasso_max_iter: 1000,
            lasso_tol: 1e-4,
            n_estimators: 100,
            max_depth: None,
            random_seed: 42,
        }
    }
}

impl Hyperparameters {
    /// Sets the Ridge alpha.
    #[must_use]
    pub fn with_ridge_alpha(mut self, alpha: f64) -> Self {
        self.ridge_alpha = alpha;
        self
    }

    /// Sets the Lasso alpha.
    #[must_use]
    pub fn with_lasso_alpha(mut self, alpha: f64) -> Self {
        self.lasso_alpha = alpha;
        self
    }

    /// Sets the number of trees.
    #[must_use]
    pub fn with_n_estimators(mut self, n: usize) -> Self {
        self.n_estimators = n;
        self
    }

    /// Sets the per-tree depth limit.
    #[must_use]
    pub fn with_max_depth(mut self, depth: usize) -> Self {
        self.max_depth = Some(depth);
        self
    }

    /// Sets the random seed.
    #[must_use]
    pub fn with_random_seed(mut self, seed: u64) -> Self {
        self.random_seed = seed;
        self
    }

    /// The parameters that affect `kind`, as hashable bit patterns.
    ///
    /// Two requests that differ only in parameters the kind ignores map to
    /// the same fingerprint.
    #[must_use]
    pub fn fingerprint(&self, kind: ModelKind) -> Vec<(&'static str, u64)> {
        match kind {
            ModelKind::Ols => Vec::new(),
            ModelKind::Ridge => vec![("alpha", self.ridge_alpha.to_bits())],
            ModelKind::Lasso => vec![
                ("alpha", self.lasso_alpha.to_bits()),
                ("max_iter", self.lasso_max_iter as u64),
                ("tol", self.lasso_tol.to_bits()),
            ],
            ModelKind::RandomForest => vec![
                ("n_estimators", self.n_estimators as u64),
                ("max_depth", self.max_depth.map_or(u64::MAX, |d| d as u64)),
                ("seed", self.random_seed),
            ],
        }
    }
}

/// A fitted model of one of the registered kinds.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum FittedModel {
    /// Ordinary least squares.
    Ols(LinearRegression),
    /// Ridge regression.
    Ridge(Ridge),
    /// Lasso regression.
    Lasso(Lasso),
    /// Random forest.
    RandomForest(RandomForestRegressor),
}

impl FittedModel {
    /// The kind of this model.
    #[must_use]
    pub fn kind(&self) -> ModelKind {
        match self {
            FittedModel::Ols(_) => ModelKind::Ols,
            FittedModel::Ridge(_) => ModelKind::Ridge,
            FittedModel::Lasso(_) => ModelKind::Lasso,
            FittedModel::RandomForest(_) => ModelKind::RandomForest,
        }
    }

    /// Coefficients in design column order; `None` for the forest.
    #[must_use]
    pub fn coefficients(&self) -> Option<&Vector<f64>> {
        match self {
            FittedModel::Ols(m) => m.coefficients(),
            FittedModel::Ridge(m) => m.coefficients(),
            FittedModel::Lasso(m) => m.coefficients(),
            FittedModel::RandomForest(_) => None,
        }
    }

    /// Intercept; `None` for the forest.
    #[must_use]
    pub fn intercept(&self) -> Option<f64> {
        match self {
            FittedModel::Ols(m) => Some(m.intercept()),
            FittedModel::Ridge(m) => Some(m.intercept()),
            FittedModel::Lasso(m) => Some(m.intercept()),
            FittedModel::RandomForest(_) => None,
        }
    }

    /// Forest feature importances; `None` for linear models.
    #[must_use]
    pub fn feature_importances(&self) -> Option<Vec<f64>> {
        match self {
            FittedModel::RandomForest(m) => m.feature_importances(),
            _ => None,
        }
    }

    fn estimator(&self) -> &dyn Estimator {
        match self {
            FittedModel::Ols(m) => m,
            FittedModel::Ridge(m) => m,
            FittedModel::Lasso(m) => m,
            FittedModel::RandomForest(m) => m,
        }
    }

    fn estimator_mut(&mut self) -> &mut dyn Estimator {
        match self {
            FittedModel::Ols(m) => m,
            FittedModel::Ridge(m) => m,
            FittedModel::Lasso(m) => m,
            FittedModel::RandomForest(m) => m,
        }
    }

    /// An unfitted model of `kind` configured from `hp`.
    #[must_use]
    pub fn unfitted(kind: ModelKind, hp: &Hyperparameters) -> Self {
        match kind {
            ModelKind::Ols => FittedModel::Ols(LinearRegression::new()),
            ModelKind::Ridge => FittedModel::Ridge(Ridge::new(hp.ridge_alpha)),
            ModelKind::Lasso => FittedModel::Lasso(
                Lasso::new(hp.lasso_alpha)
                    .with_max_iter(hp.lasso_max_iter)
                    .with_tol(hp.lasso_tol),
            ),
            ModelKind::RandomForest => {
                let mut rf = RandomForestRegressor::new(hp.n_estimators)
                    .with_random_state(hp.random_seed);
                if let Some(depth) = hp.max_depth {
                    rf = rf.with_max_depth(depth);
                }
                FittedModel::RandomForest(rf)
            }
        }
    }
}

impl Estimator for FittedModel {
    fn fit(&mut self, x: &Matrix<f64>, y: &Vector<f64>) -> Result<()> {
        self.estimator_mut().fit(x, y)
    }

    fn predict(&self, x: &Matrix<f64>) -> Result<Vector<f64>> {
        self.estimator().predict(x)
    }
}

/// Fits a model of `kind` on `x`/`y`.
///
/// # Errors
///
/// - `InvalidHyperparameter` for out-of-range settings
/// - `InsufficientData` for empty input or any numeric failure in the
///   fit, with the model kind in the context
pub fn train(
    x: &Matrix<f64>,
    y: &Vector<f64>,
    kind: ModelKind,
    hp: &Hyperparameters,
) -> Result<FittedModel> {
    debug!(%kind, samples = x.n_rows(), features = x.n_cols(), "training model");

    let mut model = FittedModel::unfitted(kind, hp);
    model.fit(x, y).map_err(|err| match err {
        AqError::InvalidHyperparameter { .. } => err,
        AqError::InsufficientData { context } => {
            AqError::insufficient_data(format!("{kind} fit failed: {context}"))
        }
        other => AqError::insufficient_data(format!("{kind} fit failed: {other}")),
    })?;

    info!(%kind, samples = x.n_rows(), "model trained");
    Ok(model)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn data() -> (Matrix<f64>, Vector<f64>) {
        // y = 3x + 2
        let x = Matrix::from_vec(6, 1, vec![0.0, 1.0, 2.0, 3.0, 4.0, 5.0]).expect("valid");
        let y = Vector::from_slice(&[2.0, 5.0, 8.0, 11.0, 14.0, 17.0]);
        (x, y)
    }

    #[test]
    fn test_model_kind_parsing() {
        assert_eq!("LinearRegression".parse::<ModelKind>().expect("ok"), ModelKind::Ols);
        assert_eq!("ols".parse::<ModelKind>().expect("ok"), ModelKind::Ols);
        assert_eq!("RIDGE".parse::<ModelKind>().expect("ok"), ModelKind::Ridge);
        assert_eq!(" lasso ".parse::<ModelKind>().expect("ok"), ModelKind::Lasso);
        assert_eq!(
            "Random Forest".parse::<ModelKind>().expect("ok"),
            ModelKind::RandomForest
        );
        assert!(matches!(
            "svm".parse::<ModelKind>(),
            Err(AqError::UnknownModel { .. })
        ));
    }

    #[test]
    fn test_model_kind_name_round_trip() {
        for kind in ModelKind::ALL {
            assert_eq!(kind.name().parse::<ModelKind>().expect("ok"), kind);
        }
    }

    #[test]
    fn test_hyperparameter_defaults() {
        let hp = Hyperparameters::default();
        assert_eq!(hp.ridge_alpha, 1.0);
        assert_eq!(hp.lasso_alpha, 0.1);
        assert_eq!(hp.lasso_max_iter, 1000);
        assert_eq!(hp.lasso_tol, 1e-4);
        assert_eq!(hp.n_estimators, 100);
        assert_eq!(hp.random_seed, 42);
    }

    #[test]
    fn test_hyperparameters_partial_json() {
        let hp: Hyperparameters =
            serde_json::from_str(r#"{"ridge_alpha": 2.5}"#).expect("valid json");
        assert_eq!(hp.ridge_alpha, 2.5);
        assert_eq!(hp.n_estimators, 100);
    }

    #[test]
    fn test_fingerprint_ignores_irrelevant_params() {
        let a = Hyperparameters::default();
        let b = Hyperparameters::default().with_ridge_alpha(9.0);
        assert_eq!(a.fingerprint(ModelKind::Lasso), b.fingerprint(ModelKind::Lasso));
        assert_ne!(a.fingerprint(ModelKind::Ridge), b.fingerprint(ModelKind::Ridge));
        assert!(a.fingerprint(ModelKind::Ols).is_empty());
    }

    #[test]
    fn test_train_every_kind() {
        let (x, y) = data();
        let hp = Hyperparameters::default().with_n_estimators(10);
        for kind in ModelKind::ALL {
            let model = train(&x, &y, kind, &hp).expect("fit");
            assert_eq!(model.kind(), kind);
            assert_eq!(model.coefficients().is_some(), kind.is_linear());
            assert_eq!(model.intercept().is_some(), kind.is_linear());
            let r2 = model.score(&x, &y).expect("score");
            assert!(r2 > 0.8, "{kind} R² {r2}");
        }
    }

    #[test]
    fn test_train_ols_exact() {
        let (x, y) = data();
        let model = train(&x, &y, ModelKind::Ols, &Hyperparameters::default()).expect("fit");
        assert!((model.coefficients().expect("linear")[0] - 3.0).abs() < 1e-9);
        assert!((model.intercept().expect("linear") - 2.0).abs() < 1e-9);
    }

    #[test]
    fn test_train_empty_is_insufficient() {
        let x = Matrix::from_vec(0, 1, vec![]).expect("valid");
        let y = Vector::from_vec(vec![]);
        for kind in ModelKind::ALL {
            let err = train(&x, &y, kind, &Hyperparameters::default()).expect_err("empty");
            assert!(err.is_insufficient_data(), "{kind}: {err}");
        }
    }

    #[test]
    fn test_train_singular_is_insufficient_with_kind() {
        let x = Matrix::from_vec(3, 2, vec![1.0, 2.0, 2.0, 4.0, 3.0, 6.0]).expect("valid");
        let y = Vector::from_slice(&[1.0, 2.0, 3.0]);
        let err = train(&x, &y, ModelKind::Ols, &Hyperparameters::default()).expect_err("singular");
        assert!(err.is_insufficient_data());
        assert!(err.to_string().contains("LinearRegression"));
    }

    #[test]
    fn test_invalid_hyperparameter_passes_through() {
        let (x, y) = data();
        let hp = Hyperparameters::default().with_ridge_alpha(-1.0);
        assert!(matches!(
            train(&x, &y, ModelKind::Ridge, &hp),
            Err(AqError::InvalidHyperparameter { .. })
        ));
    }

    #[test]
    fn test_forest_feature_importances_exposed() {
        let (x, y) = data();
        let hp = Hyperparameters::default().with_n_estimators(5);
        let model = train(&x, &y, ModelKind::RandomForest, &hp).expect("fit");
        assert_eq!(model.feature_importances().expect("forest").len(), 1);
        assert!(train(&x, &y, ModelKind::Ols, &hp)
            .expect("fit")
            .feature_importances()
            .is_none());
    }
}
