//! Random forest regression over bootstrapped CART trees.

use super::tree::{RegressionTree, TreeParams};
use crate::config::ForestConfig;
use crate::error::{AqiError, Result};
use ndarray::Array2;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Ensemble of regression trees averaged at prediction time
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RandomForestRegressor {
    config: ForestConfig,
    seed: u64,
    n_features: usize,
    trees: Vec<RegressionTree>,
}

impl RandomForestRegressor {
    pub fn new(config: ForestConfig, seed: u64) -> Self {
        Self {
            config,
            seed,
            n_features: 0,
            trees: Vec::new(),
        }
    }

    /// Fit every tree on its own bootstrap sample. Tree `i` draws from a
    /// generator seeded with `seed + i`, so a fit is reproducible.
    pub fn fit(&mut self, x: &Array2<f64>, y: &[f64]) -> Result<()> {
        let n_samples = x.nrows();
        if n_samples == 0 {
            return Err(AqiError::EmptyTrainingSet { input_rows: 0 });
        }
        if y.len() != n_samples {
            return Err(AqiError::invalid_value(
                "target",
                format!("{} targets for {} rows", y.len(), n_samples),
            ));
        }

        let params = TreeParams {
            max_depth: self.config.max_depth,
            min_samples_split: self.config.min_samples_split,
            min_samples_leaf: self.config.min_samples_leaf,
        };

        self.trees = (0..self.config.n_estimators)
            .map(|tree_idx| {
                let samples: Vec<usize> = if self.config.bootstrap {
                    let mut rng = ChaCha8Rng::seed_from_u64(self.seed.wrapping_add(tree_idx as u64));
                    (0..n_samples).map(|_| rng.gen_range(0..n_samples)).collect()
                } else {
                    (0..n_samples).collect()
                };
                RegressionTree::fit(x, y, &samples, &params)
            })
            .collect();
        self.n_features = x.ncols();

        debug!(
            "Fitted {} trees on {} samples x {} features",
            self.trees.len(),
            n_samples,
            self.n_features
        );
        Ok(())
    }

    /// Mean of the tree predictions for every row
    pub fn predict(&self, x: &Array2<f64>) -> Result<Vec<f64>> {
        if self.trees.is_empty() {
            return Err(AqiError::ModelNotFitted);
        }
        if x.ncols() != self.n_features {
            return Err(AqiError::FeatureMismatch {
                expected: self.n_features,
                got: x.ncols(),
            });
        }

        let n_trees = self.trees.len() as f64;
        Ok(x.rows()
            .into_iter()
            .map(|row| {
                let total: f64 = self.trees.iter().map(|tree| tree.predict_row(row)).sum();
                total / n_trees
            })
            .collect())
    }

    pub fn is_fitted(&self) -> bool {
        !self.trees.is_empty()
    }

    pub fn n_trees(&self) -> usize {
        self.trees.len()
    }

    pub fn n_features(&self) -> usize {
        self.n_features
    }
}
