//! Command implementations for the AQI predictor CLI
//!
//! Each subcommand lives in its own module; `run` sets up logging and
//! dispatches.

pub mod predict;
pub mod prepare;
pub mod shared;
pub mod train;

use crate::cli::args::{Args, Commands};
use anyhow::Result;
use tracing::debug;

/// Main command runner
pub fn run(args: Args) -> Result<()> {
    shared::setup_logging(&args)?;
    debug!("Command line arguments: {:?}", args);

    let show_progress = args.show_progress();
    match &args.command {
        Commands::Prepare(prepare_args) => prepare::run_prepare(prepare_args, show_progress),
        Commands::Train(train_args) => train::run_train(train_args, show_progress),
        Commands::Predict(predict_args) => predict::run_predict(predict_args),
    }
}
