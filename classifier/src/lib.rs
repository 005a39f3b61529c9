//! REAL/FAKE classification of voice feature vectors.
//!
//! # Architecture
//!
//! 1. [`RandomForest::fit`] / [`train`]: labeled feature vectors -> model
//! 2. [`ModelArtifact`]: model + [`FeatureSchema`](voiceguard_features::FeatureSchema), stored as msgpack
//! 3. [`Classifier::load`]: artifact -> read-only adapter, refusing schema skew
//! 4. [`Classifier::score`]: 42 features -> [`Prediction`] `{label, confidence}`
//!
//! The confidence reported is always the probability of the winning class,
//! so it never drops below 0.5.

mod adapter;
mod artifact;
mod error;
pub mod forest;
mod label;
pub mod metrics;
mod model;
mod training;

pub use adapter::{Classifier, Prediction};
pub use artifact::{ModelArtifact, ARTIFACT_FORMAT_VERSION};
pub use error::ClassifierError;
pub use forest::{DecisionTree, ForestConfig, MaxFeatures, RandomForest};
pub use label::Label;
pub use metrics::{accuracy, ClassificationReport, ClassMetrics};
pub use model::BinaryClassifier;
pub use training::{train, train_test_split, LabeledSample, TrainConfig, TrainOutcome};
