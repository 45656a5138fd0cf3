//! Error handling for AQI training and prediction.
//!
//! Provides error types with context for input loading, feature
//! engineering, model fitting, artifact persistence and prediction.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AqiError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Polars error: {0}")]
    Polars(#[from] polars::error::PolarsError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Input not found: {pattern}")]
    InputNotFound { pattern: String },

    #[error("Invalid input file: {path} - {reason}")]
    InvalidInput { path: PathBuf, reason: String },

    #[error("Artifact not found at path: {path}")]
    ArtifactNotFound { path: PathBuf },

    #[error("No training rows left after target filtering (input rows: {input_rows})")]
    EmptyTrainingSet { input_rows: usize },

    #[error("Schema mismatch in {section} columns: expected {expected:?}, found {found:?}")]
    SchemaMismatch {
        section: &'static str,
        expected: Vec<String>,
        found: Vec<String>,
    },

    #[error("Model has not been fitted")]
    ModelNotFitted,

    #[error("Feature mismatch: expected {expected} features, got {got}")]
    FeatureMismatch { expected: usize, got: usize },

    #[error("Configuration error: {message}")]
    Configuration { message: String },

    #[error("Invalid value for {field}: {reason}")]
    InvalidValue { field: String, reason: String },
}

impl AqiError {
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    pub fn invalid_value(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidValue {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, AqiError>;
