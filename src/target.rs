//! AQI target construction.
//!
//! Labels each feature row with the overall AQI, drops rows that cannot be
//! labelled, and fills the remaining missing pollutant readings with zero.
//! Treating an unmeasured pollutant as clean understates risk for
//! high-but-unmeasured pollutants; it is kept as the modelling baseline.

use crate::models::{FeatureRow, ModelFeatures, TrainingRecord};
use crate::subindex::aqi_from_levels;
use tracing::{info, warn};

/// Outcome of labelling a batch of feature rows
#[derive(Debug, Default)]
pub struct TargetStats {
    pub input_rows: usize,
    pub labelled_rows: usize,
    pub dropped_rows: usize,
}

/// Convert a labelled row into model features, zero-filling missing pollutants
pub fn fill_features(row: FeatureRow) -> ModelFeatures {
    ModelFeatures {
        pollutants: row.pollutants.map(|value| value.unwrap_or(0.0)),
        latitude: row.latitude,
        longitude: row.longitude,
        calendar: row.calendar,
        state: row.state,
        city: row.city,
    }
}

/// Label rows with their AQI; rows with neither PM2.5 nor PM10, or with a
/// non-finite AQI, are dropped
pub fn build_training_set(rows: Vec<FeatureRow>) -> (Vec<TrainingRecord>, TargetStats) {
    let input_rows = rows.len();

    let records: Vec<TrainingRecord> = rows
        .into_iter()
        .filter_map(|row| {
            let aqi = aqi_from_levels(&row.pollutants).filter(|aqi| aqi.is_finite())?;
            Some(TrainingRecord {
                features: fill_features(row),
                aqi,
            })
        })
        .collect();

    let stats = TargetStats {
        input_rows,
        labelled_rows: records.len(),
        dropped_rows: input_rows - records.len(),
    };

    if stats.dropped_rows > 0 {
        warn!(
            "Dropped {} of {} rows without a computable AQI",
            stats.dropped_rows, stats.input_rows
        );
    }
    info!("Labelled {} rows with an AQI target", stats.labelled_rows);

    (records, stats)
}
