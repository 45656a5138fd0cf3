//! Prediction service over a loaded artifact.
//!
//! The service is built once per process and handed to every request
//! handler. Each request carries a city, a date and seven pollutant
//! values; the remaining model inputs are filled with fixed placeholders.

use crate::artifact::Artifact;
use crate::constants::{PLACEHOLDER_COORDINATE, PLACEHOLDER_HOUR, UNKNOWN_STATE};
use crate::error::{AqiError, Result};
use crate::models::{Calendar, ModelFeatures, PollutantLevels, Prediction};
use chrono::{Datelike, NaiveDate};
use std::path::Path;
use tracing::{debug, info};

/// A single form submission
#[derive(Debug, Clone, PartialEq)]
pub struct PredictionRequest {
    pub city: String,
    pub date: NaiveDate,
    pub pollutants: PollutantLevels<f64>,
}

impl PredictionRequest {
    /// Request with every pollutant at zero
    pub fn new(city: impl Into<String>, date: NaiveDate) -> Self {
        Self {
            city: city.into(),
            date,
            pollutants: PollutantLevels([0.0; 7]),
        }
    }

    pub fn with_pollutants(mut self, pollutants: PollutantLevels<f64>) -> Self {
        self.pollutants = pollutants;
        self
    }

    /// Build the single-row model input. Negative or non-finite
    /// concentrations are rejected.
    pub fn to_features(&self) -> Result<ModelFeatures> {
        for (pollutant, &value) in self.pollutants.iter() {
            if !value.is_finite() || value < 0.0 {
                return Err(AqiError::invalid_value(
                    pollutant.label(),
                    format!("concentration must be a non-negative number, got {value}"),
                ));
            }
        }

        Ok(ModelFeatures {
            pollutants: self.pollutants,
            latitude: PLACEHOLDER_COORDINATE,
            longitude: PLACEHOLDER_COORDINATE,
            calendar: Calendar {
                month: self.date.month(),
                hour: PLACEHOLDER_HOUR,
                day_of_week: self.date.weekday().num_days_from_monday(),
            },
            state: UNKNOWN_STATE.to_string(),
            city: self.city.trim().to_string(),
        })
    }
}

/// Loaded model ready to answer requests
#[derive(Debug)]
pub struct PredictionService {
    artifact: Artifact,
}

impl PredictionService {
    /// Wrap an artifact after checking its feature schema
    pub fn new(artifact: Artifact) -> Result<Self> {
        artifact.meta.validate()?;
        Ok(Self { artifact })
    }

    /// Load and validate the artifact stored in `dir`
    pub fn load(dir: &Path) -> Result<Self> {
        let service = Self::new(Artifact::load(dir)?)?;
        info!("Prediction service ready (artifact: {})", dir.display());
        Ok(service)
    }

    pub fn predict(&self, request: &PredictionRequest) -> Result<Prediction> {
        let features = request.to_features()?;
        let aqi = self.artifact.pipeline.predict_one(&features)?;
        let prediction = Prediction::from_aqi(aqi);
        debug!(
            "Predicted AQI {:.1} ({}) for {}",
            prediction.aqi, prediction.category, request.city
        );
        Ok(prediction)
    }

    pub fn artifact(&self) -> &Artifact {
        &self.artifact
    }
}
