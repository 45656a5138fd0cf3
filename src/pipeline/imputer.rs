//! Mean imputation for numeric feature columns.
//!
//! NaN marks a missing value. Column means are learned at fit time and
//! substituted at transform time.

use crate::error::{AqiError, Result};
use ndarray::{Array2, Axis};
use serde::{Deserialize, Serialize};

/// Fitted mean imputer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimpleImputer {
    /// Fill value per column
    statistics: Vec<f64>,
}

impl SimpleImputer {
    /// Learn per-column means, ignoring NaN. A column with no observed
    /// value falls back to zero.
    pub fn fit(data: &Array2<f64>) -> Result<Self> {
        if data.nrows() == 0 {
            return Err(AqiError::EmptyTrainingSet { input_rows: 0 });
        }

        let statistics = data
            .axis_iter(Axis(1))
            .map(|column| {
                let (sum, count) = column
                    .iter()
                    .filter(|v| !v.is_nan())
                    .fold((0.0, 0usize), |(sum, count), v| (sum + v, count + 1));
                if count == 0 { 0.0 } else { sum / count as f64 }
            })
            .collect();

        Ok(Self { statistics })
    }

    /// Replace NaN entries in place
    pub fn transform(&self, data: &mut Array2<f64>) -> Result<()> {
        if data.ncols() != self.statistics.len() {
            return Err(AqiError::FeatureMismatch {
                expected: self.statistics.len(),
                got: data.ncols(),
            });
        }

        for (mut column, &fill) in data.axis_iter_mut(Axis(1)).zip(&self.statistics) {
            column.mapv_inplace(|v| if v.is_nan() { fill } else { v });
        }
        Ok(())
    }

    pub fn statistics(&self) -> &[f64] {
        &self.statistics
    }
}
