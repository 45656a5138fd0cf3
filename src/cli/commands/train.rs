//! The `train` command: fit the model and save the artifact.

use super::shared::{create_spinner, load_training_set};
use crate::cli::args::TrainArgs;
use crate::trainer::train;
use anyhow::{Context, Result};
use colored::*;
use indicatif::HumanDuration;
use std::time::Instant;
use tracing::{debug, info};

pub fn run_train(args: &TrainArgs, show_progress: bool) -> Result<()> {
    let start_time = Instant::now();
    let config = args
        .training_config()
        .context("Invalid training configuration")?;
    debug!("Training configuration: {:?}", config);

    let (records, stats) = load_training_set(&args.input, show_progress)?;
    info!(
        "{} labelled rows ({} dropped without PM2.5/PM10)",
        stats.labelled_rows, stats.dropped_rows
    );

    let spinner = create_spinner(
        &format!(
            "Fitting random forest ({} trees, {} rows)...",
            config.forest.n_estimators,
            records.len()
        ),
        show_progress,
    );
    let result = train(&records, &config);
    spinner.finish_and_clear();
    let artifact = result.context("Training failed")?;

    artifact
        .save(&args.artifacts)
        .with_context(|| format!("Failed to save artifact to {}", args.artifacts.display()))?;

    if show_progress {
        println!("{}", "Training complete".bright_green().bold());
        if let Some(summary) = &artifact.meta.summary {
            println!(
                "   • Rows: {} train / {} test",
                summary.train_rows, summary.test_rows
            );
            match summary.r2 {
                Some(r2) => println!("   • R²: {}", format!("{:.4}", r2).bright_white().bold()),
                None => println!("   • R²: {}", "undefined".bright_yellow()),
            }
        }
        println!("   • Artifacts: {}", args.artifacts.display());
        println!("   • Time: {}", HumanDuration(start_time.elapsed()));
    }
    Ok(())
}
