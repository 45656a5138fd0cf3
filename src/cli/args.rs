//! Command-line argument definitions for the AQI predictor
//!
//! Defines the `prepare`, `train` and `predict` subcommands with the clap
//! derive API, plus the global verbosity flags.

use crate::cli::input::parse_concentration;
use crate::config::TrainingConfig;
use crate::constants::DEFAULT_ARTIFACT_DIR;
use crate::error::Result;
use crate::models::{Pollutant, PollutantLevels};
use crate::predictor::PredictionRequest;
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// CLI arguments for the AQI predictor
///
/// Builds an AQI training dataset from raw pollutant readings, trains a
/// random forest on it, and predicts the AQI for user-entered readings.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "aqi-predictor",
    version,
    about = "Train and query an Air Quality Index model from pollutant readings",
    long_about = "Turns long-format station pollutant readings into a supervised dataset \
                  labelled with the PM2.5/PM10 AQI, trains a random forest regressor on it, \
                  and predicts the AQI with a category and health advisory for new readings."
)]
pub struct Args {
    #[command(subcommand)]
    pub command: Commands,

    /// Increase logging verbosity
    #[arg(
        short = 'v',
        long = "verbose",
        action = clap::ArgAction::Count,
        global = true,
        help = "Increase logging verbosity (-v: info, -vv: debug, -vvv: trace)"
    )]
    pub verbose: u8,

    /// Only show errors
    #[arg(
        short = 'q',
        long = "quiet",
        global = true,
        conflicts_with = "verbose",
        help = "Suppress output except errors"
    )]
    pub quiet: bool,
}

/// Available subcommands
#[derive(Debug, Clone, Subcommand)]
pub enum Commands {
    /// Write the engineered, AQI-labelled dataset to Parquet or CSV
    Prepare(PrepareArgs),
    /// Train the model and save it to an artifact directory
    Train(TrainArgs),
    /// Predict the AQI for one set of readings, or interactively
    Predict(PredictArgs),
}

#[derive(Debug, Clone, Parser)]
pub struct PrepareArgs {
    /// Raw readings CSV file or glob pattern (quote globs in the shell)
    #[arg(short = 'i', long = "input", value_name = "PATH|GLOB")]
    pub input: String,

    /// Output file; the extension selects the format (.parquet or .csv)
    #[arg(short = 'o', long = "output", value_name = "FILE")]
    pub output: PathBuf,
}

#[derive(Debug, Clone, Parser)]
pub struct TrainArgs {
    /// Raw readings CSV file or glob pattern (quote globs in the shell)
    #[arg(short = 'i', long = "input", value_name = "PATH|GLOB")]
    pub input: String,

    /// Directory receiving the model and metadata files
    #[arg(short = 'a', long = "artifacts", value_name = "DIR", default_value = DEFAULT_ARTIFACT_DIR)]
    pub artifacts: PathBuf,

    /// JSON training configuration; flags below override its values
    #[arg(short = 'c', long = "config", value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Number of trees in the forest
    #[arg(long = "estimators", value_name = "N")]
    pub estimators: Option<usize>,

    /// Random seed for the split and the bootstraps
    #[arg(long = "seed", value_name = "N")]
    pub seed: Option<u64>,

    /// Fraction of rows held out for the R² report
    #[arg(long = "test-size", value_name = "F")]
    pub test_size: Option<f64>,
}

impl TrainArgs {
    /// Resolve the training configuration: file (or defaults), then flags
    pub fn training_config(&self) -> Result<TrainingConfig> {
        let mut config = match &self.config {
            Some(path) => TrainingConfig::from_file(path)?,
            None => TrainingConfig::default(),
        };

        if let Some(estimators) = self.estimators {
            config = config.with_estimators(estimators);
        }
        if let Some(seed) = self.seed {
            config = config.with_random_state(seed);
        }
        if let Some(test_size) = self.test_size {
            config = config.with_test_size(test_size);
        }

        config.validate()?;
        Ok(config)
    }
}

#[derive(Debug, Clone, Parser)]
pub struct PredictArgs {
    /// Directory holding a trained model
    #[arg(short = 'a', long = "artifacts", value_name = "DIR", default_value = DEFAULT_ARTIFACT_DIR)]
    pub artifacts: PathBuf,

    /// City name; without it the interactive form is started
    #[arg(long = "city")]
    pub city: Option<String>,

    /// Date of the readings (YYYY-MM-DD, default today)
    #[arg(long = "date", value_name = "YYYY-MM-DD")]
    pub date: Option<NaiveDate>,

    #[arg(long = "pm25", value_name = "µg/m³", default_value_t = 0.0, value_parser = parse_concentration)]
    pub pm25: f64,

    #[arg(long = "pm10", value_name = "µg/m³", default_value_t = 0.0, value_parser = parse_concentration)]
    pub pm10: f64,

    #[arg(long = "no2", value_name = "µg/m³", default_value_t = 0.0, value_parser = parse_concentration)]
    pub no2: f64,

    #[arg(long = "so2", value_name = "µg/m³", default_value_t = 0.0, value_parser = parse_concentration)]
    pub so2: f64,

    #[arg(long = "co", value_name = "mg/m³", default_value_t = 0.0, value_parser = parse_concentration)]
    pub co: f64,

    #[arg(long = "ozone", value_name = "µg/m³", default_value_t = 0.0, value_parser = parse_concentration)]
    pub ozone: f64,

    #[arg(long = "nh3", value_name = "µg/m³", default_value_t = 0.0, value_parser = parse_concentration)]
    pub nh3: f64,
}

impl PredictArgs {
    /// Request built from flags, or `None` when the form should run
    pub fn request(&self, today: NaiveDate) -> Option<PredictionRequest> {
        let city = self.city.as_ref()?;

        let mut levels = PollutantLevels([0.0; 7]);
        levels[Pollutant::Pm25] = self.pm25;
        levels[Pollutant::Pm10] = self.pm10;
        levels[Pollutant::No2] = self.no2;
        levels[Pollutant::So2] = self.so2;
        levels[Pollutant::Co] = self.co;
        levels[Pollutant::Ozone] = self.ozone;
        levels[Pollutant::Nh3] = self.nh3;

        Some(PredictionRequest::new(city.clone(), self.date.unwrap_or(today)).with_pollutants(levels))
    }
}

impl Args {
    /// Log level implied by `-v` / `-q`
    pub fn get_log_level(&self) -> &'static str {
        if self.quiet {
            "error"
        } else {
            match self.verbose {
                0 => "warn",
                1 => "info",
                2 => "debug",
                _ => "trace",
            }
        }
    }

    pub fn show_progress(&self) -> bool {
        !self.quiet
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 21).unwrap()
    }

    #[test]
    fn test_log_levels() {
        let args = Args::parse_from(["aqi-predictor", "-vv", "predict"]);
        assert_eq!(args.get_log_level(), "debug");

        let args = Args::parse_from(["aqi-predictor", "predict", "-q"]);
        assert_eq!(args.get_log_level(), "error");
        assert!(!args.show_progress());

        let args = Args::parse_from(["aqi-predictor", "predict"]);
        assert_eq!(args.get_log_level(), "warn");
    }

    #[test]
    fn test_verbose_and_quiet_conflict() {
        assert!(Args::try_parse_from(["aqi-predictor", "-v", "-q", "predict"]).is_err());
    }

    #[test]
    fn test_train_flags_override_defaults() {
        let args = Args::parse_from([
            "aqi-predictor",
            "train",
            "--input",
            "data/*.csv",
            "--estimators",
            "25",
            "--seed",
            "7",
            "--test-size",
            "0.3",
        ]);
        let Commands::Train(train) = args.command else {
            panic!("expected train command");
        };

        assert_eq!(train.artifacts, PathBuf::from("artifacts"));
        let config = train.training_config().unwrap();
        assert_eq!(config.forest.n_estimators, 25);
        assert_eq!(config.random_state, 7);
        assert_eq!(config.test_size, 0.3);
    }

    #[test]
    fn test_train_rejects_invalid_test_size() {
        let args = Args::parse_from(["aqi-predictor", "train", "-i", "x.csv", "--test-size", "1.5"]);
        let Commands::Train(train) = args.command else {
            panic!("expected train command");
        };
        assert!(train.training_config().is_err());
    }

    #[test]
    fn test_predict_flags_build_request() {
        let args = Args::parse_from([
            "aqi-predictor",
            "predict",
            "--city",
            "Delhi",
            "--date",
            "2024-01-15",
            "--pm25",
            "35.5",
            "--nh3",
            "4",
        ]);
        let Commands::Predict(predict) = args.command else {
            panic!("expected predict command");
        };

        let request = predict.request(today()).unwrap();
        assert_eq!(request.city, "Delhi");
        assert_eq!(request.date, NaiveDate::from_ymd_opt(2024, 1, 15).unwrap());
        assert_eq!(request.pollutants[Pollutant::Pm25], 35.5);
        assert_eq!(request.pollutants[Pollutant::Nh3], 4.0);
        assert_eq!(request.pollutants[Pollutant::Co], 0.0);
    }

    #[test]
    fn test_predict_without_city_runs_form() {
        let args = Args::parse_from(["aqi-predictor", "predict"]);
        let Commands::Predict(predict) = args.command else {
            panic!("expected predict command");
        };
        assert!(predict.request(today()).is_none());
    }

    #[test]
    fn test_negative_concentration_flag_rejected() {
        assert!(Args::try_parse_from(["aqi-predictor", "predict", "--city", "Delhi", "--pm10", "-3"]).is_err());
        assert!(Args::try_parse_from(["aqi-predictor", "predict", "--city", "Delhi", "--pm10", "abc"]).is_err());
    }
}
