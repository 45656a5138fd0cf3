//! Application constants for the AQI predictor
//!
//! Column names, prediction placeholders, artifact file names and
//! training defaults used throughout the crate.

// =============================================================================
// Raw Input Columns
// =============================================================================

/// Columns every training input file must provide
pub const REQUIRED_INPUT_COLUMNS: &[&str] = &[
    "state",
    "city",
    "latitude",
    "longitude",
    "pollutant_id",
    "pollutant_avg",
    "last_update",
];

/// Format of the `last_update` column, e.g. `21-03-2024 14:00:00`
pub const LAST_UPDATE_FORMAT: &str = "%d-%m-%Y %H:%M:%S";

/// Name of the parsed timestamp column (milliseconds since the epoch)
pub const TIMESTAMP_COLUMN: &str = "timestamp";

/// Columns identifying one feature row
pub const KEY_COLUMNS: &[&str] = &["state", "city", "latitude", "longitude", TIMESTAMP_COLUMN];

/// Target column written by the `prepare` command
pub const TARGET_COLUMN: &str = "AQI";

// =============================================================================
// Model Feature Schema
// =============================================================================

/// Numeric feature columns, in the order the pipeline consumes them
pub const NUMERIC_FEATURES: [&str; 12] = [
    "PM2.5",
    "PM10",
    "NO2",
    "SO2",
    "CO",
    "OZONE",
    "NH3",
    "latitude",
    "longitude",
    "month",
    "hour",
    "dayofweek",
];

/// Categorical feature columns, one-hot encoded by the pipeline
pub const CATEGORICAL_FEATURES: [&str; 2] = ["state", "city"];

// =============================================================================
// Prediction Placeholders
// =============================================================================

/// State recorded for form submissions (no state input is collected)
pub const UNKNOWN_STATE: &str = "Unknown";

/// Hour of day used for form submissions (midday)
pub const PLACEHOLDER_HOUR: u32 = 12;

/// Latitude and longitude used for form submissions (no geocoding)
pub const PLACEHOLDER_COORDINATE: f64 = 0.0;

// =============================================================================
// Artifacts
// =============================================================================

/// Default artifact directory
pub const DEFAULT_ARTIFACT_DIR: &str = "artifacts";

/// Serialized fitted pipeline
pub const MODEL_FILE_NAME: &str = "aqi_model.json";

/// Serialized feature-column metadata
pub const META_FILE_NAME: &str = "meta.json";

// =============================================================================
// Training Defaults
// =============================================================================

pub const DEFAULT_N_ESTIMATORS: usize = 100;
pub const DEFAULT_RANDOM_STATE: u64 = 42;
pub const DEFAULT_TEST_SIZE: f64 = 0.2;
pub const DEFAULT_MIN_SAMPLES_SPLIT: usize = 2;
pub const DEFAULT_MIN_SAMPLES_LEAF: usize = 1;
