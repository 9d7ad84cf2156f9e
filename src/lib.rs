//! Aqfleet: fleet electrification vs. air quality regression in pure Rust.
//!
//! Aqfleet joins national air-quality annual averages with vehicle-fleet
//! composition, fits a regression of a pollutant metric on the
//! alternative-fuel fleet share (`AF_fleet`) with country fixed effects,
//! and predicts points and curves from the fitted model.
//!
//! # Quick Start
//!
//! ```
//! use aqfleet::prelude::*;
//!
//! let air_quality = "Country,Year,Pollutant,AnnualAvg_mean\n\
//!                    AT,2019,PM10,20\nAT,2020,PM10,18\n\
//!                    NO,2019,PM10,25\nNO,2020,PM10,23\n";
//! let vehicles = "Country,Year,AF_fleet\nAT,2019,1\nAT,2020,2\nNO,2019,10\nNO,2020,11\n";
//!
//! let dataset = Dataset::from_bytes(air_quality.as_bytes(), vehicles.as_bytes()).unwrap();
//! let mut session = Session::new(dataset, AnalysisConfig::default());
//!
//! let request = PredictionRequest::new("PM10", "AnnualAvg_mean")
//!     .with_country("NO")
//!     .with_af_fleet(12.0);
//! let report = session.run(&request).unwrap();
//! assert!(report.prediction >= 0.0);
//! assert_eq!(report.curve.len(), 100);
//! ```
//!
//! # Modules
//!
//! - [`primitives`]: Core Vector and Matrix types
//! - [`data`]: Typed nullable column table, CSV reading, left join
//! - [`loader`]: Source loading and the joined dataset
//! - [`features`]: Pollutant filtering, country encoding, design matrices
//! - [`linear_model`]: OLS, Ridge and Lasso
//! - [`tree`]: CART regression trees and random forests
//! - [`model`]: Model menu, hyperparameters and training
//! - [`predict`]: Point and curve prediction
//! - [`cache`]: Fitted-model LRU cache
//! - [`session`]: Request pipeline over a dataset and cache
//! - [`results`]: Precomputed best/worst model tables
//! - [`combine`]: Per-country fleet CSV combination
//! - [`metrics`]: Regression metrics

pub mod cache;
pub mod combine;
pub mod config;
pub mod data;
pub mod error;
pub mod features;
pub mod linear_model;
pub mod loader;
pub mod metrics;
pub mod model;
pub mod predict;
pub mod prelude;
pub mod primitives;
pub mod results;
pub mod session;
pub mod traits;
pub mod tree;

pub use error::{AqError, Result};
pub use primitives::{Matrix, Vector};
pub use traits::Estimator;
