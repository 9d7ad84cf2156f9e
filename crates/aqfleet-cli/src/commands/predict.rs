//! `aqfleet predict`: fit and predict for one request.

use crate::error::{CliError, Result};
use crate::output;
use aqfleet::config::AnalysisConfig;
use aqfleet::model::ModelKind;
use aqfleet::results::ResultsTable;
use aqfleet::session::{PredictionReport, PredictionRequest, Session};
use std::path::PathBuf;
use tracing::info;

/// Curve points shown in text mode.
const CURVE_PREVIEW: usize = 5;

/// Arguments of one prediction run.
#[derive(Debug, Clone)]
pub(crate) struct PredictArgs {
    pub(crate) air_quality: PathBuf,
    pub(crate) vehicles: PathBuf,
    pub(crate) pollutant: String,
    pub(crate) target: String,
    pub(crate) country: Option<String>,
    pub(crate) model: Option<String>,
    pub(crate) best: Option<PathBuf>,
    pub(crate) af_fleet: Option<f64>,
    pub(crate) samples: Option<usize>,
    pub(crate) features: Vec<String>,
    pub(crate) config: Option<PathBuf>,
    pub(crate) json: bool,
}

/// Explicit `--model` wins, then the best-model table, then OLS.
pub(crate) fn resolve_model(
    model: Option<&str>,
    best: Option<&ResultsTable>,
    pollutant: &str,
    target: &str,
) -> Result<ModelKind> {
    if let Some(name) = model {
        return Ok(name.parse()?);
    }
    let suggested = best.and_then(|table| table.suggest_model(pollutant, target));
    if let Some(kind) = suggested {
        info!(%kind, "using best model from results table");
    }
    Ok(suggested.unwrap_or(ModelKind::Ols))
}

pub(crate) fn run(args: &PredictArgs) -> Result<()> {
    if args.samples == Some(0) {
        return Err(CliError::InvalidArgument(
            "--samples must be at least 1".to_string(),
        ));
    }

    let config = match &args.config {
        Some(path) => AnalysisConfig::from_json_file(path)?,
        None => AnalysisConfig::default(),
    };
    let best = args.best.as_ref().map(ResultsTable::load).transpose()?;
    let kind = resolve_model(
        args.model.as_deref(),
        best.as_ref(),
        &args.pollutant,
        &args.target,
    )?;

    let mut session = Session::open(&args.air_quality, &args.vehicles, config)?;

    let mut request = PredictionRequest::new(args.pollutant.clone(), args.target.clone())
        .with_model(kind);
    if !args.features.is_empty() {
        request.features = request.features.with_additional(args.features.clone());
    }
    if let Some(code) = &args.country {
        request = request.with_country(code.clone());
    }
    if let Some(value) = args.af_fleet {
        request = request.with_af_fleet(value);
    }
    if let Some(samples) = args.samples {
        request = request.with_samples(samples);
    }

    let report = session.run(&request)?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        let best_r2 = best
            .as_ref()
            .and_then(|t| t.find(&args.pollutant, &args.target))
            .and_then(|row| row.r2);
        print_report(&report, best_r2);
    }
    Ok(())
}

fn print_report(report: &PredictionReport, best_r2: Option<f64>) {
    output::section("Prediction");
    output::kv("Pollutant", &report.pollutant);
    output::kv("Target", &report.target);
    output::kv("Model", report.model);
    if best_r2.is_some() {
        output::kv("Table R²", output::format_r2(best_r2));
    }
    output::kv("Country", &report.country);
    output::kv("Reference", &report.reference);
    output::kv("AF_fleet", format!("{:.2}", report.af_fleet));
    output::kv("Prediction", format!("{:.3}", report.prediction));

    if !report.range.contains(report.af_fleet) {
        output::warning(&format!(
            "AF_fleet {:.2} is outside the observed range [{:.2}, {:.2}]",
            report.af_fleet, report.range.min, report.range.max
        ));
    }

    output::section("Fit");
    output::kv("Training rows", report.n_samples);
    output::kv("R² (train)", output::format_r2(Some(report.r2_train)));
    if let Some(intercept) = report.intercept {
        output::kv("Intercept", output::format_weight(intercept));
    }
    for weight in &report.coefficients {
        output::kv(&weight.feature, output::format_weight(weight.value));
    }
    for weight in &report.feature_importances {
        output::kv(&weight.feature, format!("{:.3}", weight.value));
    }

    output::section("Curve");
    let step = (report.curve.len() / CURVE_PREVIEW).max(1);
    for point in report.curve.iter().step_by(step) {
        output::kv(&format!("{:8.2}", point.x), format!("{:.3}", point.y));
    }
    if (report.curve.len().saturating_sub(1)) % step != 0 {
        if let Some(last) = report.curve.last() {
            output::kv(&format!("{:8.2}", last.x), format!("{:.3}", last.y));
        }
    }
    output::info(&format!(
        "{} observed points for {}",
        report.observed.len(),
        report.country
    ));
    output::info("R² is measured on the training rows");
}
