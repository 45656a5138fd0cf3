//! Model training: seeded train/test split, pipeline fitting and R².

use crate::artifact::{Artifact, ArtifactMeta, TrainingSummary};
use crate::config::TrainingConfig;
use crate::error::{AqiError, Result};
use crate::models::{ModelFeatures, TrainingRecord};
use crate::pipeline::AqiPipeline;
use chrono::Utc;
use rand::SeedableRng;
use rand::seq::SliceRandom;
use rand_chacha::ChaCha8Rng;
use tracing::{debug, info, warn};

/// R² below this is reported as a weak fit
const LOW_R2_THRESHOLD: f64 = 0.5;

/// Shuffle row indices with a seeded generator and hold out
/// `ceil(test_size * n)` of them. Returns `(train, test)`.
pub fn train_test_split(n: usize, test_size: f64, seed: u64) -> (Vec<usize>, Vec<usize>) {
    let mut indices: Vec<usize> = (0..n).collect();
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    indices.shuffle(&mut rng);

    let n_test = ((test_size * n as f64).ceil() as usize).min(n);
    let train = indices.split_off(n_test);
    (train, indices)
}

/// Coefficient of determination. Undefined (None) for fewer than two rows
/// or a constant target.
pub fn r2_score(y_true: &[f64], y_pred: &[f64]) -> Option<f64> {
    if y_true.len() < 2 || y_true.len() != y_pred.len() {
        return None;
    }

    let mean = y_true.iter().sum::<f64>() / y_true.len() as f64;
    let ss_tot: f64 = y_true.iter().map(|y| (y - mean).powi(2)).sum();
    let ss_res: f64 = y_true
        .iter()
        .zip(y_pred)
        .map(|(y, p)| (y - p).powi(2))
        .sum();

    if ss_tot == 0.0 {
        return None;
    }
    Some(1.0 - ss_res / ss_tot)
}

/// Fit the pipeline on the training split and score it on the test split
pub fn train(records: &[TrainingRecord], config: &TrainingConfig) -> Result<Artifact> {
    config.validate()?;
    if records.is_empty() {
        return Err(AqiError::EmptyTrainingSet { input_rows: 0 });
    }

    let (train_idx, test_idx) = train_test_split(records.len(), config.test_size, config.random_state);
    if train_idx.is_empty() {
        return Err(AqiError::EmptyTrainingSet {
            input_rows: records.len(),
        });
    }
    debug!(
        "Split {} rows into {} train / {} test",
        records.len(),
        train_idx.len(),
        test_idx.len()
    );

    let train_features: Vec<&ModelFeatures> = train_idx.iter().map(|&i| &records[i].features).collect();
    let train_targets: Vec<f64> = train_idx.iter().map(|&i| records[i].aqi).collect();

    info!(
        "Fitting random forest with {} trees on {} rows",
        config.forest.n_estimators,
        train_features.len()
    );
    let pipeline = AqiPipeline::fit(&train_features, &train_targets, config)?;

    let test_features: Vec<&ModelFeatures> = test_idx.iter().map(|&i| &records[i].features).collect();
    let test_targets: Vec<f64> = test_idx.iter().map(|&i| records[i].aqi).collect();
    let predictions = pipeline.predict(&test_features)?;

    let r2 = r2_score(&test_targets, &predictions);
    match r2 {
        Some(score) if score < LOW_R2_THRESHOLD => {
            warn!("Low R² on held-out rows: {:.4}", score)
        }
        Some(score) => info!("R² on held-out rows: {:.4}", score),
        None => warn!(
            "R² undefined for {} held-out rows",
            test_targets.len()
        ),
    }

    let summary = TrainingSummary {
        total_rows: records.len(),
        train_rows: train_idx.len(),
        test_rows: test_idx.len(),
        r2,
        n_estimators: config.forest.n_estimators,
        random_state: config.random_state,
        trained_at: Utc::now(),
    };

    Ok(Artifact {
        pipeline,
        meta: ArtifactMeta::current(Some(summary)),
    })
}
