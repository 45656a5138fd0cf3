//! The `prepare` command: write the labelled training dataset to disk.

use super::shared::load_training_set;
use crate::cli::args::PrepareArgs;
use crate::dataset::{training_frame, write_dataset};
use anyhow::{Context, Result, bail};
use colored::*;
use tracing::info;

pub fn run_prepare(args: &PrepareArgs, show_progress: bool) -> Result<()> {
    info!("Preparing dataset from '{}'", args.input);

    let (records, stats) = load_training_set(&args.input, show_progress)?;
    if records.is_empty() {
        bail!(
            "No labelled rows in '{}' ({} feature rows had neither PM2.5 nor PM10)",
            args.input,
            stats.input_rows
        );
    }

    let mut df = training_frame(&records).context("Failed to assemble dataset frame")?;
    write_dataset(&mut df, &args.output)
        .with_context(|| format!("Failed to write dataset to {}", args.output.display()))?;

    if show_progress {
        println!("{}", "Dataset written".bright_green().bold());
        println!("   • Feature rows: {}", stats.input_rows);
        println!(
            "   • Labelled rows: {}",
            stats.labelled_rows.to_string().bright_white().bold()
        );
        if stats.dropped_rows > 0 {
            println!(
                "   • Dropped (no PM2.5/PM10): {}",
                stats.dropped_rows.to_string().bright_yellow()
            );
        }
        println!("   • Output: {}", args.output.display());
    }
    Ok(())
}
