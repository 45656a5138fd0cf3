//! User input utilities for the interactive prediction form
//!
//! The form reads from any `BufRead` and writes prompts to any `Write`, so
//! it runs against stdin/stdout in the binary and against buffers in tests.
//! Invalid entries are re-prompted; empty entries take the default.

use crate::models::{Pollutant, PollutantLevels, Prediction};
use crate::predictor::PredictionRequest;
use chrono::NaiveDate;
use std::io::{self, BufRead, Write};

/// Parse a concentration; rejects negative, non-finite and non-numeric text
pub fn parse_concentration(raw: &str) -> Result<f64, String> {
    let value: f64 = raw
        .trim()
        .parse()
        .map_err(|_| format!("'{}' is not a number", raw.trim()))?;

    if !value.is_finite() {
        return Err(format!("'{}' is not a finite number", raw.trim()));
    }
    if value < 0.0 {
        return Err(format!("concentration cannot be negative (got {value})"));
    }
    Ok(value)
}

/// Like `parse_concentration`, with empty input meaning `default`
pub fn parse_concentration_or(raw: &str, default: f64) -> Result<f64, String> {
    if raw.trim().is_empty() {
        Ok(default)
    } else {
        parse_concentration(raw)
    }
}

/// Parse a `YYYY-MM-DD` date, with empty input meaning `default`
pub fn parse_date_or(raw: &str, default: NaiveDate) -> Result<NaiveDate, String> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(default);
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .map_err(|_| format!("'{}' is not a date in YYYY-MM-DD format", raw))
}

/// Two result lines shown after every prediction
pub fn format_prediction(prediction: &Prediction) -> String {
    format!(
        "Predicted AQI: {:.1} → {}\n{}",
        prediction.aqi, prediction.category, prediction.advisory
    )
}

/// Terminal rendition of the prediction form
pub struct PredictionForm<R, W> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> PredictionForm<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    /// Print a prompt and read one trimmed line; `None` at end of input
    fn prompt_line(&mut self, prompt: &str) -> io::Result<Option<String>> {
        write!(self.output, "{}: ", prompt)?;
        self.output.flush()?;

        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        Ok(Some(line.trim().to_string()))
    }

    /// Prompt until `parse` accepts the entry
    fn prompt_parsed<T>(
        &mut self,
        prompt: &str,
        parse: impl Fn(&str) -> Result<T, String>,
    ) -> io::Result<Option<T>> {
        loop {
            let Some(line) = self.prompt_line(prompt)? else {
                return Ok(None);
            };
            match parse(&line) {
                Ok(value) => return Ok(Some(value)),
                Err(message) => writeln!(self.output, "  {}. Please try again.", message)?,
            }
        }
    }

    /// Collect one full submission; `None` if input ends part-way
    pub fn read_request(&mut self, today: NaiveDate) -> io::Result<Option<PredictionRequest>> {
        let Some(city) = self.prompt_parsed("City", |raw| {
            let city = raw.trim();
            if city.is_empty() {
                Err("City is required".to_string())
            } else {
                Ok(city.to_string())
            }
        })?
        else {
            return Ok(None);
        };

        let date_prompt = format!("Date (YYYY-MM-DD) [{}]", today);
        let Some(date) = self.prompt_parsed(&date_prompt, |raw| parse_date_or(raw, today))? else {
            return Ok(None);
        };

        let mut levels = PollutantLevels([0.0; 7]);
        for pollutant in Pollutant::ALL {
            let prompt = format!("{} [0.0]", pollutant);
            let Some(value) = self.prompt_parsed(&prompt, |raw| parse_concentration_or(raw, 0.0))?
            else {
                return Ok(None);
            };
            levels[pollutant] = value;
        }

        Ok(Some(PredictionRequest::new(city, date).with_pollutants(levels)))
    }

    /// Yes/no question; empty input takes the default, end of input means no
    pub fn confirm(&mut self, message: &str, default_yes: bool) -> io::Result<bool> {
        let default_text = if default_yes { "Y/n" } else { "y/N" };
        let prompt = format!("{} [{}]", message, default_text);

        loop {
            let Some(answer) = self.prompt_line(&prompt)? else {
                return Ok(false);
            };
            match answer.to_lowercase().as_str() {
                "" => return Ok(default_yes),
                "y" | "yes" => return Ok(true),
                "n" | "no" => return Ok(false),
                _ => writeln!(self.output, "Please enter 'y' for yes or 'n' for no.")?,
            }
        }
    }

    pub fn show_prediction(&mut self, prediction: &Prediction) -> io::Result<()> {
        writeln!(self.output)?;
        writeln!(self.output, "{}", format_prediction(prediction))?;
        writeln!(self.output)
    }

    pub fn show_message(&mut self, message: &str) -> io::Result<()> {
        writeln!(self.output, "{}", message)
    }

    pub fn into_output(self) -> W {
        self.output
    }
}
