//! One-hot encoding for categorical feature columns.
//!
//! Categories are learned per column and kept sorted. A value never seen
//! during fitting encodes as all zeros for its column instead of failing.

use crate::error::{AqiError, Result};
use serde::{Deserialize, Serialize};

/// Fitted one-hot encoder
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OneHotEncoder {
    /// Sorted unique categories per input column
    categories: Vec<Vec<String>>,
}

impl OneHotEncoder {
    /// Learn the categories of each column from the given rows
    pub fn fit<const N: usize>(rows: &[[&str; N]]) -> Result<Self> {
        if rows.is_empty() {
            return Err(AqiError::EmptyTrainingSet { input_rows: 0 });
        }

        let mut categories: Vec<Vec<String>> = vec![Vec::new(); N];
        for row in rows {
            for (column, value) in categories.iter_mut().zip(row) {
                column.push(value.to_string());
            }
        }

        for column in &mut categories {
            column.sort();
            column.dedup();
        }

        Ok(Self { categories })
    }

    pub fn n_features_in(&self) -> usize {
        self.categories.len()
    }

    /// Width of the encoded output
    pub fn n_features_out(&self) -> usize {
        self.categories.iter().map(Vec::len).sum()
    }

    pub fn categories(&self) -> &[Vec<String>] {
        &self.categories
    }

    /// Output positions set to one for a row; unknown values contribute none
    pub fn hot_indices<S: AsRef<str>>(&self, row: &[S]) -> Result<Vec<usize>> {
        if row.len() != self.categories.len() {
            return Err(AqiError::FeatureMismatch {
                expected: self.categories.len(),
                got: row.len(),
            });
        }

        let mut offset = 0;
        let mut hot = Vec::with_capacity(row.len());
        for (column, value) in self.categories.iter().zip(row) {
            if let Ok(position) = column.binary_search_by(|c| c.as_str().cmp(value.as_ref())) {
                hot.push(offset + position);
            }
            offset += column.len();
        }
        Ok(hot)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fitted() -> OneHotEncoder {
        OneHotEncoder::fit(&[
            ["Delhi", "Delhi"],
            ["Bihar", "Patna"],
            ["Bihar", "Gaya"],
            ["Delhi", "Delhi"],
        ])
        .unwrap()
    }

    #[test]
    fn test_categories_sorted_and_unique() {
        let encoder = fitted();
        assert_eq!(encoder.n_features_in(), 2);
        assert_eq!(encoder.categories()[0], vec!["Bihar", "Delhi"]);
        assert_eq!(encoder.categories()[1], vec!["Delhi", "Gaya", "Patna"]);
        assert_eq!(encoder.n_features_out(), 5);
    }

    #[test]
    fn test_known_values_encode_one_per_column() {
        let encoder = fitted();
        assert_eq!(encoder.hot_indices(&["Bihar", "Patna"]).unwrap(), vec![0, 4]);
        assert_eq!(encoder.hot_indices(&["Delhi", "Delhi"]).unwrap(), vec![1, 2]);
    }

    #[test]
    fn test_unknown_values_encode_as_zeros() {
        let encoder = fitted();
        assert_eq!(encoder.hot_indices(&["Unknown", "Patna"]).unwrap(), vec![4]);
        assert!(encoder.hot_indices(&["Unknown", "Atlantis"]).unwrap().is_empty());
    }

    #[test]
    fn test_shape_errors() {
        let empty: [[&str; 2]; 0] = [];
        assert!(OneHotEncoder::fit(&empty).is_err());

        let encoder = fitted();
        assert!(encoder.hot_indices(&["Delhi"]).is_err());
    }
}
