//! Feature engineering from long-format pollutant readings.
//!
//! Loads raw station CSV exports, normalizes them into a typed lazy frame,
//! pivots one row per (state, city, latitude, longitude, timestamp) with a
//! column per pollutant kind, and materializes typed feature rows with
//! calendar attributes.

use crate::constants::{KEY_COLUMNS, LAST_UPDATE_FORMAT, REQUIRED_INPUT_COLUMNS, TIMESTAMP_COLUMN};
use crate::error::{AqiError, Result};
use crate::models::{Calendar, FeatureRow, Pollutant, PollutantLevels, PollutantReading};
use chrono::DateTime;
use polars::prelude::*;
use std::fs::File;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Resolve a file path or glob pattern into a sorted list of input files
pub fn resolve_inputs(pattern: &str) -> Result<Vec<PathBuf>> {
    let path = Path::new(pattern);
    if path.is_file() {
        return Ok(vec![path.to_path_buf()]);
    }

    let entries = glob::glob(pattern).map_err(|e| {
        AqiError::configuration(format!("invalid input pattern '{}': {}", pattern, e))
    })?;

    let mut files: Vec<PathBuf> = entries
        .filter_map(|entry| match entry {
            Ok(path) => Some(path),
            Err(e) => {
                warn!("Skipping unreadable input entry: {}", e);
                None
            }
        })
        .filter(|path| path.is_file())
        .collect();
    files.sort();

    if files.is_empty() {
        return Err(AqiError::InputNotFound {
            pattern: pattern.to_string(),
        });
    }

    debug!("Resolved {} input files from '{}'", files.len(), pattern);
    Ok(files)
}

/// Load every file matching `pattern` into one normalized readings frame
pub fn load_readings(pattern: &str) -> Result<LazyFrame> {
    let files = resolve_inputs(pattern)?;

    let mut frames = Vec::with_capacity(files.len());
    for file in &files {
        frames.push(read_readings_csv(file)?);
    }

    let frame = if frames.len() == 1 {
        frames.remove(0)
    } else {
        concat(frames, UnionArgs::default())?
    };

    info!("Loaded readings from {} file(s)", files.len());
    Ok(frame)
}

/// Read one CSV export and normalize its columns
pub fn read_readings_csv(path: &Path) -> Result<LazyFrame> {
    let file = File::open(path)?;

    // Every column as text; numeric and timestamp parsing happens below so
    // that bad values become missing instead of failing the whole file
    let df = CsvReadOptions::default()
        .with_has_header(true)
        .with_infer_schema_length(Some(0))
        .into_reader_with_file_handle(file)
        .finish()?;

    let columns: Vec<&str> = df.get_column_names().iter().map(|c| c.as_str()).collect();
    let missing: Vec<&str> = REQUIRED_INPUT_COLUMNS
        .iter()
        .copied()
        .filter(|required| !columns.contains(required))
        .collect();

    if !missing.is_empty() {
        return Err(AqiError::InvalidInput {
            path: path.to_path_buf(),
            reason: format!("missing required columns: {}", missing.join(", ")),
        });
    }

    debug!("Read {} raw rows from {}", df.height(), path.display());
    Ok(normalize_raw(df.lazy()))
}

/// Cast raw text columns into the normalized readings layout
fn normalize_raw(frame: LazyFrame) -> LazyFrame {
    let timestamp_options = StrptimeOptions {
        format: Some(LAST_UPDATE_FORMAT.into()),
        strict: false,
        ..Default::default()
    };

    frame.select([
        col("state").cast(DataType::String),
        col("city").cast(DataType::String),
        col("latitude").cast(DataType::Float64),
        col("longitude").cast(DataType::Float64),
        col("pollutant_id").cast(DataType::String),
        col("pollutant_avg").cast(DataType::Float64),
        col("last_update")
            .str()
            .to_datetime(
                Some(TimeUnit::Milliseconds),
                None,
                timestamp_options,
                lit("raise"),
            )
            .cast(DataType::Int64)
            .alias(TIMESTAMP_COLUMN),
    ])
}

/// Build the normalized readings frame from in-memory readings
pub fn readings_frame(readings: &[PollutantReading]) -> Result<LazyFrame> {
    let state: Vec<&str> = readings.iter().map(|r| r.state.as_str()).collect();
    let city: Vec<&str> = readings.iter().map(|r| r.city.as_str()).collect();
    let latitude: Vec<Option<f64>> = readings.iter().map(|r| r.latitude).collect();
    let longitude: Vec<Option<f64>> = readings.iter().map(|r| r.longitude).collect();
    let pollutant_id: Vec<&str> = readings.iter().map(|r| r.pollutant.label()).collect();
    let pollutant_avg: Vec<Option<f64>> = readings.iter().map(|r| r.concentration).collect();
    let timestamp: Vec<Option<i64>> = readings
        .iter()
        .map(|r| r.timestamp.map(|t| t.and_utc().timestamp_millis()))
        .collect();

    let df = DataFrame::new(vec![
        Column::new("state".into(), state),
        Column::new("city".into(), city),
        Column::new("latitude".into(), latitude),
        Column::new("longitude".into(), longitude),
        Column::new("pollutant_id".into(), pollutant_id),
        Column::new("pollutant_avg".into(), pollutant_avg),
        Column::new(TIMESTAMP_COLUMN.into(), timestamp),
    ])?;

    Ok(df.lazy())
}

/// Pivot long-format readings into one row per key with a column per
/// pollutant kind (mean of duplicate readings, missing when unobserved)
pub fn pivot_readings(readings: LazyFrame) -> LazyFrame {
    let keys: Vec<Expr> = KEY_COLUMNS.iter().map(|c| col(*c)).collect();

    // Rows with an incomplete key cannot be placed in the pivot
    let complete_key = KEY_COLUMNS
        .iter()
        .fold(lit(true), |acc, c| acc.and(col(*c).is_not_null()));

    let levels: Vec<Expr> = Pollutant::ALL
        .iter()
        .map(|p| {
            col("pollutant_avg")
                .filter(col("pollutant_id").eq(lit(p.label())))
                .mean()
                .alias(p.label())
        })
        .collect();

    readings
        .with_columns(["latitude", "longitude", "pollutant_avg"].map(nan_as_missing))
        .filter(complete_key)
        .group_by(keys.clone())
        .agg(levels)
        .sort_by_exprs(keys, SortMultipleOptions::default())
}

/// Literal `NaN` cells parse as floats; treat them as missing so `mean`
/// skips them the way it skips nulls
fn nan_as_missing(name: &str) -> Expr {
    when(col(name).is_nan())
        .then(lit(NULL).cast(DataType::Float64))
        .otherwise(col(name))
        .alias(name)
}

/// Materialize a pivoted frame into typed feature rows
pub fn collect_feature_rows(pivoted: LazyFrame) -> Result<Vec<FeatureRow>> {
    let df = pivoted.collect()?;

    let states = df.column("state")?.str()?;
    let cities = df.column("city")?.str()?;
    let latitudes = df.column("latitude")?.f64()?;
    let longitudes = df.column("longitude")?.f64()?;
    let timestamps = df.column(TIMESTAMP_COLUMN)?.i64()?;
    let levels = Pollutant::ALL
        .iter()
        .map(|p| df.column(p.label()).and_then(|c| c.f64()))
        .collect::<PolarsResult<Vec<_>>>()?;

    let mut rows = Vec::with_capacity(df.height());
    for i in 0..df.height() {
        let (Some(state), Some(city), Some(latitude), Some(longitude), Some(millis)) = (
            states.get(i),
            cities.get(i),
            latitudes.get(i),
            longitudes.get(i),
            timestamps.get(i),
        ) else {
            continue;
        };

        let Some(timestamp) = DateTime::from_timestamp_millis(millis).map(|t| t.naive_utc())
        else {
            warn!("Skipping row with out-of-range timestamp {}", millis);
            continue;
        };

        let mut pollutants = PollutantLevels([None; 7]);
        for (pollutant, column) in Pollutant::ALL.iter().zip(&levels) {
            pollutants[*pollutant] = column.get(i);
        }

        rows.push(FeatureRow {
            state: state.to_string(),
            city: city.to_string(),
            latitude,
            longitude,
            calendar: Calendar::from_timestamp(&timestamp),
            timestamp,
            pollutants,
        });
    }

    debug!("Built {} feature rows", rows.len());
    Ok(rows)
}

/// Pivot and materialize in one step
pub fn build_feature_rows(readings: LazyFrame) -> Result<Vec<FeatureRow>> {
    collect_feature_rows(pivot_readings(readings))
}
