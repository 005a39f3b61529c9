use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use voiceguard_features::{FeatureSchema, FeatureVector};

use crate::{
    BinaryClassifier, ClassificationReport, ClassifierError, ForestConfig, Label, ModelArtifact,
    RandomForest,
};

/// A feature vector with its ground-truth label.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabeledSample {
    pub features: FeatureVector,
    pub label: Label,
}

/// TrainConfig configures a training run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrainConfig {
    pub forest: ForestConfig,
    /// Fraction of each class held out for evaluation. Default: 0.2.
    pub test_size: f64,
    /// Seed for the train/test shuffle. Default: 42.
    pub split_seed: u64,
}

impl Default for TrainConfig {
    fn default() -> Self {
        Self {
            forest: ForestConfig::default(),
            test_size: 0.2,
            split_seed: 42,
        }
    }
}

/// Stratified shuffle split.
///
/// Each class is shuffled with `seed` and `round(test_size * count)` of its
/// samples are held out, keeping at least one sample of the class for
/// training. A class with a single sample goes entirely to training.
pub fn train_test_split(
    samples: &[LabeledSample],
    test_size: f64,
    seed: u64,
) -> (Vec<LabeledSample>, Vec<LabeledSample>) {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut train = Vec::new();
    let mut test = Vec::new();

    for label in Label::ALL {
        let mut idx: Vec<usize> = samples
            .iter()
            .enumerate()
            .filter(|(_, s)| s.label == label)
            .map(|(i, _)| i)
            .collect();
        idx.shuffle(&mut rng);

        let n = idx.len();
        let n_test = ((test_size.clamp(0.0, 1.0) * n as f64).round() as usize).min(n.saturating_sub(1));
        for (pos, &i) in idx.iter().enumerate() {
            if pos < n_test {
                test.push(samples[i].clone());
            } else {
                train.push(samples[i].clone());
            }
        }
    }
    (train, test)
}

/// Result of [`train`].
pub struct TrainOutcome {
    pub artifact: ModelArtifact,
    /// `None` when the hold-out set is empty.
    pub report: Option<ClassificationReport>,
}

/// Splits, fits and evaluates a forest; the artifact records `schema`.
pub fn train(
    samples: &[LabeledSample],
    schema: &FeatureSchema,
    cfg: &TrainConfig,
) -> Result<TrainOutcome, ClassifierError> {
    if samples.is_empty() {
        return Err(ClassifierError::Training("dataset is empty".into()));
    }
    for label in Label::ALL {
        if !samples.iter().any(|s| s.label == label) {
            warn!(%label, "dataset has no samples of this class");
        }
    }

    let (train_set, test_set) = train_test_split(samples, cfg.test_size, cfg.split_seed);
    let (x, y) = unzip(&train_set);
    let model = RandomForest::fit(&x, &y, &cfg.forest)?;

    let report = if test_set.is_empty() {
        None
    } else {
        let truth: Vec<Label> = test_set.iter().map(|s| s.label).collect();
        let predicted: Vec<Label> = test_set
            .iter()
            .map(|s| model.predict(s.features.as_slice()))
            .collect();
        Some(ClassificationReport::new(&truth, &predicted))
    };

    info!(
        train = train_set.len(),
        test = test_set.len(),
        accuracy = report.as_ref().map(|r| r.accuracy),
        "training finished"
    );

    let mut artifact = ModelArtifact::new(schema.clone(), model);
    artifact.trained_samples = train_set.len();
    artifact.test_accuracy = report.as_ref().map(|r| r.accuracy);
    Ok(TrainOutcome { artifact, report })
}

fn unzip(samples: &[LabeledSample]) -> (Vec<Vec<f64>>, Vec<Label>) {
    samples
        .iter()
        .map(|s| (s.features.as_slice().to_vec(), s.label))
        .unzip()
}
