//! The `predict` command: one-shot prediction from flags, or the
//! interactive form.

use crate::cli::args::PredictArgs;
use crate::cli::input::{PredictionForm, format_prediction};
use crate::predictor::PredictionService;
use anyhow::{Context, Result};
use chrono::{Local, NaiveDate};
use colored::*;
use std::io::{self, BufRead, Write};
use tracing::info;

pub fn run_predict(args: &PredictArgs) -> Result<()> {
    let service = PredictionService::load(&args.artifacts).with_context(|| {
        format!(
            "Failed to load model from {} (run `aqi-predictor train` first)",
            args.artifacts.display()
        )
    })?;
    let today = Local::now().date_naive();

    if let Some(request) = args.request(today) {
        let prediction = service.predict(&request)?;
        println!("{}", format_prediction(&prediction));
        return Ok(());
    }

    println!("{}", "AQI Predictor".bright_green().bold());
    println!("Enter the readings below; press Enter to accept a default.\n");

    let stdin = io::stdin();
    let mut form = PredictionForm::new(stdin.lock(), io::stdout());
    let count = run_session(&service, &mut form, today)?;
    info!("Interactive session ended after {} prediction(s)", count);
    Ok(())
}

/// Repeat form → prediction until the user stops or input ends. The same
/// loaded service answers every submission. Returns the prediction count.
pub fn run_session<R: BufRead, W: Write>(
    service: &PredictionService,
    form: &mut PredictionForm<R, W>,
    today: NaiveDate,
) -> Result<usize> {
    let mut count = 0;
    loop {
        let Some(request) = form.read_request(today).context("Failed to read form input")? else {
            break;
        };

        match service.predict(&request) {
            Ok(prediction) => {
                form.show_prediction(&prediction)?;
                count += 1;
            }
            Err(error) => form.show_message(&format!("Prediction failed: {}", error))?,
        }

        if !form.confirm("Make another prediction?", true)? {
            break;
        }
    }
    Ok(count)
}
