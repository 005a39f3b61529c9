use std::path::Path;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::info;
use voiceguard_features::{FeatureSchema, FeatureVector, FEATURE_LEN};

use crate::{BinaryClassifier, ClassifierError, Label, ModelArtifact};

/// Verdict for one clip.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    #[serde(rename = "prediction")]
    pub label: Label,
    /// Probability of the winning class, rounded to 2 decimals.
    pub confidence: f64,
}

/// Read-only wrapper around a trained model.
///
/// Cheap to clone; clones share the same model.
#[derive(Clone)]
pub struct Classifier {
    model: Arc<dyn BinaryClassifier>,
    schema: FeatureSchema,
}

impl Classifier {
    /// Wraps an in-memory model trained on features of `schema`.
    pub fn new(model: impl BinaryClassifier + 'static, schema: FeatureSchema) -> Self {
        Self {
            model: Arc::new(model),
            schema,
        }
    }

    /// Loads an artifact and checks it against the running extractor's schema.
    pub fn load(path: impl AsRef<Path>, schema: &FeatureSchema) -> Result<Self, ClassifierError> {
        let path = path.as_ref();
        let artifact = ModelArtifact::load(path)?;
        artifact.check_schema(schema)?;
        if artifact.model.n_features() != FEATURE_LEN {
            return Err(ClassifierError::ModelLoad {
                path: path.to_path_buf(),
                reason: format!(
                    "model expects {} features, extractor produces {}",
                    artifact.model.n_features(),
                    FEATURE_LEN
                ),
            });
        }
        info!(
            path = %path.display(),
            schema = %artifact.schema,
            trees = artifact.model.trees().len(),
            "loaded classifier"
        );
        Ok(Self::from_artifact(artifact))
    }

    pub fn from_artifact(artifact: ModelArtifact) -> Self {
        Self::new(artifact.model, artifact.schema)
    }

    pub fn schema(&self) -> &FeatureSchema {
        &self.schema
    }

    /// Scores a raw feature slice.
    ///
    /// The slice must have exactly [`FEATURE_LEN`] values in the standard
    /// layout; anything else is rejected, never truncated or padded.
    pub fn score(&self, features: &[f64]) -> Result<Prediction, ClassifierError> {
        if features.len() != FEATURE_LEN || features.len() != self.model.n_features() {
            return Err(ClassifierError::InvalidFeatureShape {
                expected: FEATURE_LEN,
                got: features.len(),
            });
        }
        let proba = self.model.predict_proba(features);
        let label = self.model.predict(features);
        let confidence = round2(proba[0].max(proba[1]));
        Ok(Prediction { label, confidence })
    }

    pub fn score_vector(&self, features: &FeatureVector) -> Result<Prediction, ClassifierError> {
        self.score(features.as_slice())
    }
}

fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}
