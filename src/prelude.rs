//! Convenience re-exports for common usage.
//!
//! # Usage
//!
//! ```
//! use aqfleet::prelude::*;
//! ```

pub use crate::config::AnalysisConfig;
pub use crate::error::{AqError, Result};
pub use crate::features::{build_design, CountrySelection, FeatureRequest};
pub use crate::linear_model::{Lasso, LinearRegression, Ridge};
pub use crate::loader::Dataset;
pub use crate::metrics::{mae, mse, r_squared, rmse};
pub use crate::model::{train, FittedModel, Hyperparameters, ModelKind};
pub use crate::predict::{predict_curve, predict_point};
pub use crate::primitives::{Matrix, Vector};
pub use crate::session::{PredictionReport, PredictionRequest, Session};
pub use crate::traits::Estimator;
pub use crate::tree::{DecisionTreeRegressor, RandomForestRegressor};
