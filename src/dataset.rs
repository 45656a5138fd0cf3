//! Export of the engineered training dataset.
//!
//! The `prepare` command writes one row per labelled feature record: the
//! categorical and numeric feature columns followed by the AQI target.
//! The output format follows the file extension (`.parquet` or `.csv`).

use crate::constants::{CATEGORICAL_FEATURES, NUMERIC_FEATURES, TARGET_COLUMN};
use crate::error::{AqiError, Result};
use crate::models::TrainingRecord;
use polars::prelude::*;
use std::fs::File;
use std::path::Path;
use tracing::{debug, info};

/// Supported output formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Parquet,
    Csv,
}

impl OutputFormat {
    /// Pick the format from a path's extension (case-insensitive)
    pub fn from_path(path: &Path) -> Result<Self> {
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase());

        match extension.as_deref() {
            Some("parquet") => Ok(OutputFormat::Parquet),
            Some("csv") => Ok(OutputFormat::Csv),
            _ => Err(AqiError::configuration(format!(
                "unsupported output extension for {} (expected .parquet or .csv)",
                path.display()
            ))),
        }
    }
}

/// Build a frame with feature columns and the target, in schema order
pub fn training_frame(records: &[TrainingRecord]) -> Result<DataFrame> {
    let mut columns = Vec::with_capacity(CATEGORICAL_FEATURES.len() + NUMERIC_FEATURES.len() + 1);

    for (position, name) in CATEGORICAL_FEATURES.iter().enumerate() {
        let values: Vec<&str> = records
            .iter()
            .map(|r| r.features.categorical()[position])
            .collect();
        columns.push(Column::new((*name).into(), values));
    }

    let numeric: Vec<[f64; NUMERIC_FEATURES.len()]> =
        records.iter().map(|r| r.features.numeric()).collect();
    for (position, name) in NUMERIC_FEATURES.iter().enumerate() {
        let values: Vec<f64> = numeric.iter().map(|row| row[position]).collect();
        columns.push(Column::new((*name).into(), values));
    }

    let targets: Vec<f64> = records.iter().map(|r| r.aqi).collect();
    columns.push(Column::new(TARGET_COLUMN.into(), targets));

    Ok(DataFrame::new(columns)?)
}

/// Write the frame to `path` in the format implied by its extension
pub fn write_dataset(df: &mut DataFrame, path: &Path) -> Result<()> {
    let format = OutputFormat::from_path(path)?;

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    let file = File::create(path)?;

    match format {
        OutputFormat::Parquet => {
            ParquetWriter::new(file)
                .with_compression(ParquetCompression::Snappy)
                .with_statistics(StatisticsOptions::full())
                .finish(df)?;
        }
        OutputFormat::Csv => {
            CsvWriter::new(file).include_header(true).finish(df)?;
        }
    }

    debug!("Wrote {:?} dataset with columns {:?}", format, df.get_column_names());
    info!("Wrote {} rows to {}", df.height(), path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Calendar, ModelFeatures, PollutantLevels};
    use tempfile::TempDir;

    fn records() -> Vec<TrainingRecord> {
        (0..3)
            .map(|i| TrainingRecord {
                features: ModelFeatures {
                    pollutants: PollutantLevels([i as f64; 7]),
                    latitude: 28.6,
                    longitude: 77.2,
                    calendar: Calendar {
                        month: 3,
                        hour: i,
                        day_of_week: 3,
                    },
                    state: "Delhi".to_string(),
                    city: format!("City{i}"),
                },
                aqi: 10.0 * i as f64,
            })
            .collect()
    }

    #[test]
    fn test_format_from_extension() {
        assert_eq!(OutputFormat::from_path(Path::new("a/out.parquet")).unwrap(), OutputFormat::Parquet);
        assert_eq!(OutputFormat::from_path(Path::new("out.CSV")).unwrap(), OutputFormat::Csv);
        assert!(OutputFormat::from_path(Path::new("out.json")).is_err());
        assert!(OutputFormat::from_path(Path::new("out")).is_err());
    }

    #[test]
    fn test_frame_layout() {
        let df = training_frame(&records()).unwrap();
        assert_eq!(df.height(), 3);
        assert_eq!(df.width(), 15);

        let names: Vec<&str> = df.get_column_names().iter().map(|c| c.as_str()).collect();
        assert_eq!(names[0], "state");
        assert_eq!(names[2], "PM2.5");
        assert_eq!(names[13], "dayofweek");
        assert_eq!(names[14], "AQI");

        let aqi = df.column("AQI").unwrap().f64().unwrap();
        assert_eq!(aqi.get(2), Some(20.0));
    }

    #[test]
    fn test_parquet_written_and_readable() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("dataset.parquet");
        let mut df = training_frame(&records()).unwrap();
        write_dataset(&mut df, &path).unwrap();

        let file = File::open(&path).unwrap();
        let back = ParquetReader::new(file).finish().unwrap();
        assert_eq!(back.shape(), (3, 15));
    }

    #[test]
    fn test_csv_written_with_header() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("dataset.csv");
        let mut df = training_frame(&records()).unwrap();
        write_dataset(&mut df, &path).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        let header = content.lines().next().unwrap();
        assert!(header.starts_with("state,city,PM2.5,PM10"));
        assert!(header.ends_with(",AQI"));
        assert_eq!(content.lines().count(), 4);
    }
}
