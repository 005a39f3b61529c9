use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::info;
use voiceguard_features::FeatureSchema;

use crate::{ClassifierError, RandomForest};

/// Version of the on-disk artifact envelope.
pub const ARTIFACT_FORMAT_VERSION: u32 = 1;

/// A trained model together with the feature schema it was trained on.
///
/// Serialized as msgpack with named fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelArtifact {
    pub format_version: u32,
    pub schema: FeatureSchema,
    pub model: RandomForest,
    /// Number of samples the model was fitted on.
    #[serde(default)]
    pub trained_samples: usize,
    /// Held-out accuracy measured at training time, if any.
    #[serde(default)]
    pub test_accuracy: Option<f64>,
}

impl ModelArtifact {
    pub fn new(schema: FeatureSchema, model: RandomForest) -> Self {
        Self {
            format_version: ARTIFACT_FORMAT_VERSION,
            schema,
            model,
            trained_samples: 0,
            test_accuracy: None,
        }
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>, ClassifierError> {
        rmp_serde::to_vec_named(self).map_err(|e| ClassifierError::Serialization(e.to_string()))
    }

    pub fn from_bytes(data: &[u8]) -> Result<Self, ClassifierError> {
        rmp_serde::from_slice(data).map_err(|e| ClassifierError::Serialization(e.to_string()))
    }

    /// Writes the artifact, creating parent directories as needed.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ClassifierError> {
        let path = path.as_ref();
        if let Some(dir) = path.parent() {
            if !dir.as_os_str().is_empty() {
                std::fs::create_dir_all(dir)?;
            }
        }
        let data = self.to_bytes()?;
        std::fs::write(path, &data)?;
        info!(path = %path.display(), bytes = data.len(), "saved model artifact");
        Ok(())
    }

    /// Reads an artifact. Every failure is reported as
    /// [`ClassifierError::ModelLoad`] naming the path.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ClassifierError> {
        let path = path.as_ref();
        let load_err = |reason: String| ClassifierError::ModelLoad {
            path: path.to_path_buf(),
            reason,
        };
        let data = std::fs::read(path).map_err(|e| load_err(e.to_string()))?;
        let artifact = Self::from_bytes(&data).map_err(|e| load_err(e.to_string()))?;
        if artifact.format_version != ARTIFACT_FORMAT_VERSION {
            return Err(load_err(format!(
                "unsupported artifact format version {} (expected {})",
                artifact.format_version, ARTIFACT_FORMAT_VERSION
            )));
        }
        artifact
            .model
            .validate()
            .map_err(|e| load_err(e.to_string()))?;
        Ok(artifact)
    }

    /// Fails unless the artifact was trained on `schema`.
    pub fn check_schema(&self, schema: &FeatureSchema) -> Result<(), ClassifierError> {
        if &self.schema != schema {
            return Err(ClassifierError::SchemaMismatch {
                model: self.schema.to_string(),
                extractor: schema.to_string(),
            });
        }
        Ok(())
    }
}
