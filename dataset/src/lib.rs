//! Training data assembly.
//!
//! A dataset root holds one directory per class:
//!
//! ```text
//! data/
//!   real/   *.wav  -> Label::Real
//!   fake/   *.wav  -> Label::Fake
//! ```
//!
//! Every clip goes through the same [`Loader`] and [`Extractor`] the
//! inference service uses, so training vectors and serving vectors share
//! one layout.

mod error;

use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use voiceguard_audio::Loader;
use voiceguard_classifier::{Label, LabeledSample};
use voiceguard_features::{Extractor, FeatureSchema, FEATURE_LEN};

pub use error::DatasetError;

/// Directory name holding clips of `label` under a dataset root.
pub fn class_dir_name(label: Label) -> &'static str {
    match label {
        Label::Real => "real",
        Label::Fake => "fake",
    }
}

/// Lists `*.wav` files (case-insensitive) directly inside `dir`, sorted by
/// file name.
pub fn scan_wav_files(dir: &Path) -> Result<Vec<PathBuf>, DatasetError> {
    let entries = std::fs::read_dir(dir).map_err(|e| DatasetError::ReadDir {
        path: dir.to_path_buf(),
        source: e,
    })?;
    let mut files = Vec::new();
    for entry in entries {
        let path = entry?.path();
        let is_wav = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case("wav"));
        if is_wav && path.is_file() {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

/// A clip that could not be turned into a feature vector.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SkippedFile {
    pub path: PathBuf,
    pub reason: String,
}

/// Labeled feature vectors plus the schema they were extracted with.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Dataset {
    pub schema: FeatureSchema,
    pub samples: Vec<LabeledSample>,
    #[serde(default)]
    pub skipped: Vec<SkippedFile>,
}

impl Dataset {
    /// Extracts features for every clip under `root/real` and `root/fake`.
    ///
    /// Both class directories must exist. Clips that fail to decode or
    /// extract are logged and recorded in [`Dataset::skipped`].
    pub fn load(root: &Path, loader: &Loader, extractor: &Extractor) -> Result<Self, DatasetError> {
        let mut samples = Vec::new();
        let mut skipped = Vec::new();

        for label in Label::ALL {
            let dir = root.join(class_dir_name(label));
            for path in scan_wav_files(&dir)? {
                let result = loader
                    .load_file(&path)
                    .map_err(|e| e.to_string())
                    .and_then(|wave| extractor.extract(&wave).map_err(|e| e.to_string()));
                match result {
                    Ok(features) => samples.push(LabeledSample { features, label }),
                    Err(reason) => {
                        warn!(path = %path.display(), %reason, "skipping clip");
                        skipped.push(SkippedFile { path, reason });
                    }
                }
            }
        }

        let dataset = Self {
            schema: extractor
                .schema()
                .clone()
                .with_sample_rate(loader.options().target_sample_rate),
            samples,
            skipped,
        };
        info!(
            samples = dataset.len(),
            real = dataset.count(Label::Real),
            fake = dataset.count(Label::Fake),
            skipped = dataset.skipped.len(),
            "dataset loaded"
        );
        Ok(dataset)
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn count(&self, label: Label) -> usize {
        self.samples.iter().filter(|s| s.label == label).count()
    }

    /// `(rows, columns)` of the feature matrix.
    pub fn shape(&self) -> (usize, usize) {
        (self.samples.len(), FEATURE_LEN)
    }

    /// Writes the dataset as JSON.
    pub fn save_json(&self, path: &Path) -> Result<(), DatasetError> {
        let data = serde_json::to_vec_pretty(self)?;
        std::fs::write(path, data)?;
        Ok(())
    }

    /// Reads a dataset written by [`Dataset::save_json`].
    pub fn load_json(path: &Path) -> Result<Self, DatasetError> {
        let data = std::fs::read(path)?;
        Ok(serde_json::from_slice(&data)?)
    }
}

impl fmt::Display for Dataset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (rows, cols) = self.shape();
        writeln!(f, "Samples: {}", rows)?;
        writeln!(f, "Feature shape: ({}, {})", rows, cols)?;
        writeln!(
            f,
            "Classes: {}={} {}={}",
            Label::Real,
            self.count(Label::Real),
            Label::Fake,
            self.count(Label::Fake)
        )?;
        if !self.skipped.is_empty() {
            writeln!(f, "Skipped: {}", self.skipped.len())?;
        }
        Ok(())
    }
}
