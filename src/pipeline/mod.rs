//! Fitted preprocessing and regression pipeline.
//!
//! Numeric features pass through a mean imputer, categorical features
//! through a one-hot encoder, and the concatenated design matrix feeds a
//! random forest regressor.

pub mod encoder;
pub mod forest;
pub mod imputer;
pub mod tree;

pub use encoder::OneHotEncoder;
pub use forest::RandomForestRegressor;
pub use imputer::SimpleImputer;
pub use tree::{RegressionTree, TreeParams};

use crate::config::TrainingConfig;
use crate::constants::NUMERIC_FEATURES;
use crate::error::{AqiError, Result};
use crate::models::ModelFeatures;
use ndarray::{Array2, ArrayView1};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Imputer + encoder + forest, fitted together over `ModelFeatures`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AqiPipeline {
    imputer: SimpleImputer,
    encoder: OneHotEncoder,
    forest: RandomForestRegressor,
}

impl AqiPipeline {
    /// Fit all stages on the given rows and targets
    pub fn fit(features: &[&ModelFeatures], targets: &[f64], config: &TrainingConfig) -> Result<Self> {
        if features.is_empty() {
            return Err(AqiError::EmptyTrainingSet { input_rows: 0 });
        }

        let mut numeric = numeric_matrix(features);
        let imputer = SimpleImputer::fit(&numeric)?;
        imputer.transform(&mut numeric)?;

        let categorical: Vec<_> = features.iter().map(|f| f.categorical()).collect();
        let encoder = OneHotEncoder::fit(&categorical)?;

        let design = design_matrix(&numeric, &encoder, features)?;
        debug!(
            "Design matrix: {} rows x {} columns ({} one-hot)",
            design.nrows(),
            design.ncols(),
            encoder.n_features_out()
        );

        let mut forest = RandomForestRegressor::new(config.forest.clone(), config.random_state);
        forest.fit(&design, targets)?;

        Ok(Self {
            imputer,
            encoder,
            forest,
        })
    }

    /// Predict one AQI per row
    pub fn predict(&self, features: &[&ModelFeatures]) -> Result<Vec<f64>> {
        if !self.forest.is_fitted() {
            return Err(AqiError::ModelNotFitted);
        }
        if features.is_empty() {
            return Ok(Vec::new());
        }

        let mut numeric = numeric_matrix(features);
        self.imputer.transform(&mut numeric)?;
        let design = design_matrix(&numeric, &self.encoder, features)?;
        self.forest.predict(&design)
    }

    pub fn predict_one(&self, features: &ModelFeatures) -> Result<f64> {
        let predictions = self.predict(&[features])?;
        predictions.first().copied().ok_or(AqiError::ModelNotFitted)
    }

    pub fn encoder(&self) -> &OneHotEncoder {
        &self.encoder
    }

    pub fn forest(&self) -> &RandomForestRegressor {
        &self.forest
    }
}

fn numeric_matrix(features: &[&ModelFeatures]) -> Array2<f64> {
    let mut matrix = Array2::zeros((features.len(), NUMERIC_FEATURES.len()));
    for (mut row, feature) in matrix.rows_mut().into_iter().zip(features) {
        row.assign(&ArrayView1::from(&feature.numeric()));
    }
    matrix
}

fn design_matrix(
    numeric: &Array2<f64>,
    encoder: &OneHotEncoder,
    features: &[&ModelFeatures],
) -> Result<Array2<f64>> {
    let n_numeric = numeric.ncols();
    let mut design = Array2::zeros((numeric.nrows(), n_numeric + encoder.n_features_out()));
    design
        .slice_mut(ndarray::s![.., ..n_numeric])
        .assign(numeric);

    for (i, feature) in features.iter().enumerate() {
        for hot in encoder.hot_indices(&feature.categorical())? {
            design[[i, n_numeric + hot]] = 1.0;
        }
    }
    Ok(design)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Calendar, PollutantLevels};

    fn features(city: &str, pm25: f64) -> ModelFeatures {
        let mut levels = [0.0; 7];
        levels[0] = pm25;
        ModelFeatures {
            pollutants: PollutantLevels(levels),
            latitude: 28.6,
            longitude: 77.2,
            calendar: Calendar {
                month: 3,
                hour: 14,
                day_of_week: 3,
            },
            state: "Delhi".to_string(),
            city: city.to_string(),
        }
    }

    fn small_config() -> TrainingConfig {
        TrainingConfig::default().with_estimators(5)
    }

    #[test]
    fn test_fit_and_predict() {
        let rows: Vec<ModelFeatures> = (0..30)
            .map(|i| features(if i % 2 == 0 { "Delhi" } else { "Noida" }, i as f64 * 10.0))
            .collect();
        let targets: Vec<f64> = rows.iter().map(|r| r.pollutants.0[0] * 2.0).collect();
        let refs: Vec<&ModelFeatures> = rows.iter().collect();

        let pipeline = AqiPipeline::fit(&refs, &targets, &small_config()).unwrap();
        assert_eq!(pipeline.encoder().n_features_out(), 3);

        let predictions = pipeline.predict(&refs).unwrap();
        assert_eq!(predictions.len(), 30);
        assert!(predictions[0] < predictions[29]);
    }

    #[test]
    fn test_unknown_city_is_tolerated() {
        let rows = [features("Delhi", 10.0), features("Delhi", 200.0)];
        let refs: Vec<&ModelFeatures> = rows.iter().collect();
        let pipeline = AqiPipeline::fit(&refs, &[20.0, 400.0], &small_config()).unwrap();

        let mut unseen = features("Atlantis", 10.0);
        unseen.state = "Unknown".to_string();
        let prediction = pipeline.predict_one(&unseen).unwrap();
        assert!(prediction.is_finite());
    }

    #[test]
    fn test_empty_fit_rejected() {
        let result = AqiPipeline::fit(&[], &[], &small_config());
        assert!(matches!(result, Err(AqiError::EmptyTrainingSet { .. })));
    }

    #[test]
    fn test_empty_predict_returns_nothing() {
        let rows = [features("Delhi", 10.0)];
        let refs: Vec<&ModelFeatures> = rows.iter().collect();
        let pipeline = AqiPipeline::fit(&refs, &[20.0], &small_config()).unwrap();
        assert!(pipeline.predict(&[]).unwrap().is_empty());
    }
}
