//! aqfleet - fleet electrification vs. air quality
//!
//! Usage:
//!   aqfleet predict --air-quality aq.csv --vehicles fleet.csv \
//!       --pollutant PM10 --target AnnualAvg_mean --country NO
//!   aqfleet best --results best_model_per_pollutant_target.csv --top 10
//!   aqfleet combine --input data/raw/fleet_data --output data/processed

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

mod commands;
mod error;
mod output;

use commands::predict::PredictArgs;
use commands::{best, combine, predict};

/// aqfleet - regression of pollutant levels on EV fleet share
#[derive(Parser, Debug)]
#[command(name = "aqfleet")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output as JSON
    #[arg(long, global = true)]
    json: bool,

    /// Verbose output (debug logging)
    #[arg(short, long, global = true, conflicts_with = "quiet")]
    verbose: bool,

    /// Quiet mode (errors only)
    #[arg(short, long, global = true)]
    quiet: bool,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Fit a model and predict a point and curve
    Predict {
        /// Air-quality annual averages CSV
        #[arg(long, value_name = "CSV")]
        air_quality: PathBuf,

        /// Vehicle fleet composition CSV
        #[arg(long, value_name = "CSV")]
        vehicles: PathBuf,

        /// Pollutant to model, e.g. PM10
        #[arg(long)]
        pollutant: String,

        /// Target column, e.g. AnnualAvg_mean
        #[arg(long)]
        target: String,

        /// Country code to predict for (default: reference country)
        #[arg(long)]
        country: Option<String>,

        /// Model: LinearRegression, Ridge, Lasso or RandomForest
        #[arg(long)]
        model: Option<String>,

        /// Best-model table used when --model is absent
        #[arg(long, value_name = "CSV")]
        best: Option<PathBuf>,

        /// AF_fleet input (default: observed mean)
        #[arg(long)]
        af_fleet: Option<f64>,

        /// Curve samples (default: from config, 100)
        #[arg(long)]
        samples: Option<usize>,

        /// Extra numeric feature columns, held at their training means
        #[arg(long = "feature", value_name = "COLUMN")]
        features: Vec<String>,

        /// JSON configuration file
        #[arg(long, value_name = "JSON")]
        config: Option<PathBuf>,
    },

    /// Summarize a best-model results table
    Best {
        /// Results CSV
        #[arg(long, value_name = "CSV")]
        results: PathBuf,

        /// Rows to show
        #[arg(long, default_value = "10")]
        top: usize,
    },

    /// Combine per-country fleet CSV files
    Combine {
        /// Directory of raw per-country files
        #[arg(long, value_name = "DIR")]
        input: PathBuf,

        /// Directory for combined files
        #[arg(long, value_name = "DIR")]
        output: PathBuf,
    },
}

/// Log filter: `--quiet` and `--verbose` override `RUST_LOG`.
fn log_filter(verbose: bool, quiet: bool) -> EnvFilter {
    if quiet {
        EnvFilter::new("error")
    } else if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(log_filter(cli.verbose, cli.quiet))
        .with_writer(std::io::stderr)
        .init();

    let result = match cli.command {
        Commands::Predict {
            air_quality,
            vehicles,
            pollutant,
            target,
            country,
            model,
            best,
            af_fleet,
            samples,
            features,
            config,
        } => predict::run(&PredictArgs {
            air_quality,
            vehicles,
            pollutant,
            target,
            country,
            model,
            best,
            af_fleet,
            samples,
            features,
            config,
            json: cli.json,
        }),

        Commands::Best { results, top } => best::run(&results, top, cli.json),

        Commands::Combine { input, output } => combine::run(&input, &output, cli.json),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            e.exit_code()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_predict() {
        let cli = Cli::try_parse_from([
            "aqfleet",
            "predict",
            "--air-quality",
            "aq.csv",
            "--vehicles",
            "veh.csv",
            "--pollutant",
            "PM10",
            "--target",
            "AnnualAvg_mean",
            "--country",
            "NO",
            "--af-fleet",
            "12.5",
            "--feature",
            "GDP",
            "--json",
        ])
        .expect("valid args");
        assert!(cli.json);
        match cli.command {
            Commands::Predict {
                country,
                af_fleet,
                features,
                model,
                ..
            } => {
                assert_eq!(country.as_deref(), Some("NO"));
                assert_eq!(af_fleet, Some(12.5));
                assert_eq!(features, vec!["GDP"]);
                assert!(model.is_none());
            }
            other => panic!("expected predict, got {other:?}"),
        }
    }

    #[test]
    fn test_parse_best_default_top() {
        let cli = Cli::try_parse_from(["aqfleet", "best", "--results", "best.csv"])
            .expect("valid args");
        assert!(matches!(cli.command, Commands::Best { top: 10, .. }));
    }

    #[test]
    fn test_verbose_conflicts_with_quiet() {
        let parsed = Cli::try_parse_from([
            "aqfleet", "-v", "-q", "combine", "--input", "a", "--output", "b",
        ]);
        assert!(parsed.is_err());
    }

    #[test]
    fn test_predict_requires_sources() {
        let parsed = Cli::try_parse_from(["aqfleet", "predict", "--pollutant", "PM10"]);
        assert!(parsed.is_err());
    }
}
