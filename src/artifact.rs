//! Persistence of the fitted pipeline and its feature-column metadata.
//!
//! An artifact directory holds two JSON files: the serialized pipeline and
//! a small metadata document listing the feature columns the pipeline was
//! fitted on. Floats are written with full round-trip precision, so a
//! reloaded pipeline predicts exactly what the in-memory one did.

use crate::constants::{CATEGORICAL_FEATURES, META_FILE_NAME, MODEL_FILE_NAME, NUMERIC_FEATURES};
use crate::error::{AqiError, Result};
use crate::pipeline::AqiPipeline;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;
use tracing::{debug, info};

/// Facts about the training run, stored alongside the column lists
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingSummary {
    pub total_rows: usize,
    pub train_rows: usize,
    pub test_rows: usize,
    /// R² on the held-out rows; absent when it is undefined
    pub r2: Option<f64>,
    pub n_estimators: usize,
    pub random_state: u64,
    pub trained_at: DateTime<Utc>,
}

/// Contents of `meta.json`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArtifactMeta {
    pub feature_cols_numeric: Vec<String>,
    pub feature_cols_categorical: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<TrainingSummary>,
}

impl ArtifactMeta {
    /// Metadata describing the feature schema compiled into this crate
    pub fn current(summary: Option<TrainingSummary>) -> Self {
        Self {
            feature_cols_numeric: NUMERIC_FEATURES.iter().map(|c| c.to_string()).collect(),
            feature_cols_categorical: CATEGORICAL_FEATURES.iter().map(|c| c.to_string()).collect(),
            summary,
        }
    }

    /// Check the recorded column lists against the compiled schema
    pub fn validate(&self) -> Result<()> {
        check_columns("numeric", &NUMERIC_FEATURES, &self.feature_cols_numeric)?;
        check_columns("categorical", &CATEGORICAL_FEATURES, &self.feature_cols_categorical)
    }
}

fn check_columns(section: &'static str, expected: &[&str], found: &[String]) -> Result<()> {
    if expected.iter().copied().eq(found.iter().map(String::as_str)) {
        return Ok(());
    }
    Err(AqiError::SchemaMismatch {
        section,
        expected: expected.iter().map(|c| c.to_string()).collect(),
        found: found.to_vec(),
    })
}

/// A fitted pipeline together with its metadata
#[derive(Debug, Clone)]
pub struct Artifact {
    pub pipeline: AqiPipeline,
    pub meta: ArtifactMeta,
}

impl Artifact {
    /// Write both files into `dir`, creating it if needed
    pub fn save(&self, dir: &Path) -> Result<()> {
        fs::create_dir_all(dir)?;

        let model_path = dir.join(MODEL_FILE_NAME);
        let mut writer = BufWriter::new(File::create(&model_path)?);
        serde_json::to_writer(&mut writer, &self.pipeline)?;
        writer.flush()?;

        let meta_path = dir.join(META_FILE_NAME);
        let mut writer = BufWriter::new(File::create(&meta_path)?);
        serde_json::to_writer_pretty(&mut writer, &self.meta)?;
        writer.flush()?;

        info!("Saved model to {}", model_path.display());
        debug!("Saved metadata to {}", meta_path.display());
        Ok(())
    }

    /// Read both files from `dir`
    pub fn load(dir: &Path) -> Result<Self> {
        let model_path = dir.join(MODEL_FILE_NAME);
        let meta_path = dir.join(META_FILE_NAME);
        for path in [&model_path, &meta_path] {
            if !path.is_file() {
                return Err(AqiError::ArtifactNotFound { path: path.clone() });
            }
        }

        let pipeline: AqiPipeline =
            serde_json::from_reader(BufReader::new(File::open(&model_path)?))?;
        let meta: ArtifactMeta = serde_json::from_reader(BufReader::new(File::open(&meta_path)?))?;

        debug!(
            "Loaded artifact from {} ({} trees)",
            dir.display(),
            pipeline.forest().n_trees()
        );
        Ok(Self { pipeline, meta })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_current_meta_validates() {
        let meta = ArtifactMeta::current(None);
        assert_eq!(meta.feature_cols_numeric.len(), 12);
        assert_eq!(meta.feature_cols_categorical, vec!["state", "city"]);
        assert!(meta.validate().is_ok());
    }

    #[test]
    fn test_reordered_columns_rejected() {
        let mut meta = ArtifactMeta::current(None);
        meta.feature_cols_numeric.swap(0, 1);
        assert!(matches!(
            meta.validate(),
            Err(AqiError::SchemaMismatch { section: "numeric", .. })
        ));

        let mut meta = ArtifactMeta::current(None);
        meta.feature_cols_categorical.pop();
        assert!(matches!(
            meta.validate(),
            Err(AqiError::SchemaMismatch { section: "categorical", .. })
        ));
    }

    #[test]
    fn test_meta_json_layout() {
        let json = serde_json::to_value(ArtifactMeta::current(None)).unwrap();
        assert_eq!(json["feature_cols_numeric"][0], "PM2.5");
        assert_eq!(json["feature_cols_numeric"][11], "dayofweek");
        assert_eq!(json["feature_cols_categorical"][1], "city");
        assert!(json.get("summary").is_none());
    }

    #[test]
    fn test_missing_directory_is_reported() {
        let dir = TempDir::new().unwrap();
        let result = Artifact::load(&dir.path().join("nowhere"));
        assert!(matches!(result, Err(AqiError::ArtifactNotFound { .. })));
    }
}
