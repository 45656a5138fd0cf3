//! AQI Predictor Library
//!
//! Trains and serves an Air Quality Index model built from long-format,
//! time-stamped pollutant readings.
//!
//! This library provides tools for:
//! - Computing PM2.5 and PM10 sub-indices from breakpoint tables
//! - Pivoting raw station readings into one feature row per location and time
//! - Labelling feature rows with the overall AQI
//! - Fitting an imputer, one-hot encoder and random forest pipeline
//! - Persisting the fitted pipeline with its feature-column metadata
//! - Predicting the AQI, category and advisory for user-entered readings

pub mod artifact;
pub mod config;
pub mod constants;
pub mod dataset;
pub mod error;
pub mod features;
pub mod models;
pub mod pipeline;
pub mod predictor;
pub mod subindex;
pub mod target;
pub mod trainer;

// CLI modules
pub mod cli {
    pub mod args;
    pub mod commands;
    pub mod input;
}

// Re-export commonly used types
pub use artifact::{Artifact, ArtifactMeta, TrainingSummary};
pub use config::{ForestConfig, TrainingConfig};
pub use error::{AqiError, Result};
pub use models::{AqiCategory, ModelFeatures, Pollutant, PollutantLevels, Prediction, TrainingRecord};
pub use pipeline::AqiPipeline;
pub use predictor::{PredictionRequest, PredictionService};
