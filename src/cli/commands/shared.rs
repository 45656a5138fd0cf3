//! Shared components for CLI commands
//!
//! Logging setup, progress spinners and the dataset-building steps used by
//! both `prepare` and `train`.

use crate::cli::args::Args;
use crate::features::{build_feature_rows, load_readings};
use crate::models::TrainingRecord;
use crate::target::{TargetStats, build_training_set};
use anyhow::{Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;
use tracing::debug;

/// Set up structured logging on stderr
pub fn setup_logging(args: &Args) -> Result<()> {
    use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

    let log_level = args.get_log_level();

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("aqi_predictor={}", log_level)));

    if args.quiet {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                fmt::layer()
                    .with_target(false)
                    .with_level(true)
                    .with_writer(std::io::stderr)
                    .compact(),
            )
            .try_init()
            .context("Failed to initialise logging")?;
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                fmt::layer()
                    .with_target(false)
                    .with_level(true)
                    .with_timer(fmt::time::uptime())
                    .with_writer(std::io::stderr),
            )
            .try_init()
            .context("Failed to initialise logging")?;
    }

    debug!("Logging initialized at level: {}", log_level);
    Ok(())
}

/// Steady-ticking spinner, hidden when progress output is off
pub fn create_spinner(message: &str, visible: bool) -> ProgressBar {
    if !visible {
        return ProgressBar::hidden();
    }

    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} [{elapsed_precise}] {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    pb.set_message(message.to_string());
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}

/// Load raw readings, pivot them into feature rows and label them
pub fn load_training_set(input: &str, show_progress: bool) -> Result<(Vec<TrainingRecord>, TargetStats)> {
    let spinner = create_spinner("Building feature rows...", show_progress);

    let readings = load_readings(input).with_context(|| format!("Failed to load readings from '{}'", input))?;
    let rows = build_feature_rows(readings).context("Failed to build feature rows")?;
    let feature_rows = rows.len();
    let (records, stats) = build_training_set(rows);

    spinner.finish_and_clear();
    debug!("{} feature rows, {} labelled records", feature_rows, records.len());
    Ok((records, stats))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_hidden_spinner_when_quiet() {
        assert!(create_spinner("working", false).is_hidden());
    }

    #[test]
    fn test_load_training_set_labels_rows() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("readings.csv");
        fs::write(
            &path,
            "state,city,latitude,longitude,pollutant_id,pollutant_avg,last_update\n\
             Delhi,Delhi,28.6,77.2,PM2.5,45,21-03-2024 14:00:00\n\
             Delhi,Delhi,28.6,77.2,NO2,20,21-03-2024 14:00:00\n\
             Delhi,Delhi,28.6,77.2,NO2,25,21-03-2024 15:00:00\n",
        )
        .unwrap();

        let (records, stats) = load_training_set(path.to_str().unwrap(), false).unwrap();
        assert_eq!(stats.input_rows, 2);
        assert_eq!(stats.dropped_rows, 1);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].aqi, 75.0);
    }

    #[test]
    fn test_load_training_set_reports_missing_input() {
        let dir = TempDir::new().unwrap();
        let pattern = dir.path().join("*.csv");
        let error = load_training_set(pattern.to_str().unwrap(), false).unwrap_err();
        assert!(format!("{:#}", error).contains("Input not found"));
    }
}
