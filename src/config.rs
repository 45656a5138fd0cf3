//! Configuration management and validation.
//!
//! Provides the training configuration (random forest hyper-parameters and
//! train/test split settings) with defaults, builder-style overrides and
//! optional loading from a JSON file.

use crate::constants::{
    DEFAULT_MIN_SAMPLES_LEAF, DEFAULT_MIN_SAMPLES_SPLIT, DEFAULT_N_ESTIMATORS,
    DEFAULT_RANDOM_STATE, DEFAULT_TEST_SIZE,
};
use crate::error::{AqiError, Result};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use tracing::debug;

/// Random forest hyper-parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ForestConfig {
    /// Number of trees in the ensemble
    pub n_estimators: usize,

    /// Maximum tree depth (unlimited when `None`)
    pub max_depth: Option<usize>,

    /// Minimum samples required to split an internal node
    pub min_samples_split: usize,

    /// Minimum samples required in each leaf
    pub min_samples_leaf: usize,

    /// Draw a bootstrap sample for every tree
    pub bootstrap: bool,
}

impl Default for ForestConfig {
    fn default() -> Self {
        Self {
            n_estimators: DEFAULT_N_ESTIMATORS,
            max_depth: None,
            min_samples_split: DEFAULT_MIN_SAMPLES_SPLIT,
            min_samples_leaf: DEFAULT_MIN_SAMPLES_LEAF,
            bootstrap: true,
        }
    }
}

/// Configuration for a training run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrainingConfig {
    /// Fraction of rows held out for the R² report
    pub test_size: f64,

    /// Seed for the train/test shuffle and the forest bootstraps
    pub random_state: u64,

    /// Random forest settings
    pub forest: ForestConfig,
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            test_size: DEFAULT_TEST_SIZE,
            random_state: DEFAULT_RANDOM_STATE,
            forest: ForestConfig::default(),
        }
    }
}

impl TrainingConfig {
    /// Load a configuration from a JSON file; missing keys keep their defaults
    pub fn from_file(path: &Path) -> Result<Self> {
        let file = File::open(path)?;
        let config: Self = serde_json::from_reader(BufReader::new(file))?;
        debug!("Loaded training config from {}: {:?}", path.display(), config);
        config.validate()?;
        Ok(config)
    }

    /// Set the number of trees
    pub fn with_estimators(mut self, n_estimators: usize) -> Self {
        self.forest.n_estimators = n_estimators;
        self
    }

    /// Set the random seed
    pub fn with_random_state(mut self, seed: u64) -> Self {
        self.random_state = seed;
        self
    }

    /// Set the held-out fraction
    pub fn with_test_size(mut self, test_size: f64) -> Self {
        self.test_size = test_size;
        self
    }

    /// Limit tree depth
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.forest.max_depth = Some(max_depth);
        self
    }

    /// Check that settings are usable before training starts
    pub fn validate(&self) -> Result<()> {
        if !(0.0..1.0).contains(&self.test_size) {
            return Err(AqiError::configuration(format!(
                "test_size must be in [0, 1), got {}",
                self.test_size
            )));
        }
        if self.forest.n_estimators == 0 {
            return Err(AqiError::configuration("n_estimators must be at least 1"));
        }
        if self.forest.min_samples_split < 2 {
            return Err(AqiError::configuration(format!(
                "min_samples_split must be at least 2, got {}",
                self.forest.min_samples_split
            )));
        }
        if self.forest.min_samples_leaf == 0 {
            return Err(AqiError::configuration("min_samples_leaf must be at least 1"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_defaults() {
        let config = TrainingConfig::default();
        assert_eq!(config.forest.n_estimators, 100);
        assert_eq!(config.random_state, 42);
        assert_eq!(config.test_size, 0.2);
        assert_eq!(config.forest.max_depth, None);
        assert!(config.forest.bootstrap);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_builder_overrides() {
        let config = TrainingConfig::default()
            .with_estimators(10)
            .with_random_state(7)
            .with_test_size(0.25)
            .with_max_depth(8);
        assert_eq!(config.forest.n_estimators, 10);
        assert_eq!(config.random_state, 7);
        assert_eq!(config.test_size, 0.25);
        assert_eq!(config.forest.max_depth, Some(8));
    }

    #[test]
    fn test_validation_rejects_bad_values() {
        assert!(TrainingConfig::default().with_test_size(1.0).validate().is_err());
        assert!(TrainingConfig::default().with_test_size(-0.1).validate().is_err());
        assert!(TrainingConfig::default().with_estimators(0).validate().is_err());

        let mut config = TrainingConfig::default();
        config.forest.min_samples_split = 1;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_partial_json_file_keeps_defaults() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, r#"{{"random_state": 5, "forest": {{"n_estimators": 12}}}}"#).unwrap();

        let config = TrainingConfig::from_file(file.path()).unwrap();
        assert_eq!(config.random_state, 5);
        assert_eq!(config.forest.n_estimators, 12);
        assert_eq!(config.forest.min_samples_split, 2);
        assert_eq!(config.test_size, 0.2);
    }
}
