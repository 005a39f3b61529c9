use serde::{Deserialize, Serialize};

use crate::FeatureError;

/// Number of cepstral coefficients kept per frame.
pub const N_MFCC: usize = 20;

/// Length of every [`FeatureVector`](crate::FeatureVector).
pub const FEATURE_LEN: usize = 2 * N_MFCC + 2;

/// Positions of each feature group inside the vector.
pub const MFCC_RANGE: std::ops::Range<usize> = 0..N_MFCC;
pub const DELTA_RANGE: std::ops::Range<usize> = N_MFCC..2 * N_MFCC;
pub const ZCR_INDEX: usize = 2 * N_MFCC;
pub const CENTROID_INDEX: usize = 2 * N_MFCC + 1;

/// Name of the feature layout. Bump [`SCHEMA_VERSION`] whenever the
/// algorithm changes in a way that alters output for the same input.
pub const SCHEMA_NAME: &str = "mfcc20-delta-zcr-centroid";
pub const SCHEMA_VERSION: u32 = 1;

/// Numeric parameters of the extractor.
///
/// Changing any of these changes the features and requires retraining.
/// Defaults: 2048-point STFT, hop 512, 128 Slaney mel bands, 80 dB
/// dynamic range.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureConfig {
    /// FFT size and analysis window length (default: 2048).
    pub n_fft: usize,
    /// Frame shift for the STFT (default: 512).
    pub hop_length: usize,
    /// Mel bands fed to the DCT (default: 128).
    pub n_mels: usize,
    /// Floor applied before taking the log power (default: 1e-10).
    pub amin: f64,
    /// Dynamic range kept below the loudest mel cell, in dB (default: 80).
    pub top_db: f64,
    /// Frame length for zero-crossing counting (default: 2048).
    pub zcr_frame_length: usize,
    /// Frame shift for zero-crossing counting (default: 512).
    pub zcr_hop_length: usize,
    /// Samples with magnitude at or below this count as zero (default: 1e-10).
    pub zcr_threshold: f64,
}

impl Default for FeatureConfig {
    fn default() -> Self {
        Self {
            n_fft: 2048,
            hop_length: 512,
            n_mels: 128,
            amin: 1e-10,
            top_db: 80.0,
            zcr_frame_length: 2048,
            zcr_hop_length: 512,
            zcr_threshold: 1e-10,
        }
    }
}

impl FeatureConfig {
    pub fn validate(&self) -> Result<(), FeatureError> {
        let bad = |msg: &str| Err(FeatureError::InvalidConfig(msg.to_string()));
        if self.n_fft < 2 {
            return bad("n_fft must be at least 2");
        }
        if self.hop_length == 0 || self.zcr_hop_length == 0 {
            return bad("hop lengths must be positive");
        }
        if self.zcr_frame_length < 2 {
            return bad("zcr_frame_length must be at least 2");
        }
        if self.n_mels < N_MFCC {
            return bad("n_mels must be at least the number of MFCCs");
        }
        if !(self.amin > 0.0) || !(self.top_db >= 0.0) || !(self.zcr_threshold >= 0.0) {
            return bad("amin must be positive, top_db and zcr_threshold non-negative");
        }
        Ok(())
    }
}

/// Identifies the feature layout and parameters a model was trained on.
///
/// Stored next to every trained model; a model is only usable with an
/// extractor whose schema compares equal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureSchema {
    pub name: String,
    pub version: u32,
    pub len: usize,
    pub config: FeatureConfig,
    /// Rate clips are resampled to before extraction; `None` keeps each
    /// clip's own rate. Spectral features shift with the rate, so this is
    /// part of the contract.
    #[serde(default)]
    pub sample_rate: Option<u32>,
}

impl FeatureSchema {
    pub fn new(config: FeatureConfig) -> Self {
        Self {
            name: SCHEMA_NAME.to_string(),
            version: SCHEMA_VERSION,
            len: FEATURE_LEN,
            config,
            sample_rate: None,
        }
    }

    /// Records the loader's target rate.
    pub fn with_sample_rate(mut self, sample_rate: Option<u32>) -> Self {
        self.sample_rate = sample_rate;
        self
    }
}

impl Default for FeatureSchema {
    fn default() -> Self {
        Self::new(FeatureConfig::default())
    }
}

impl std::fmt::Display for FeatureSchema {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/v{} ({} values, ", self.name, self.version, self.len)?;
        match self.sample_rate {
            Some(rate) => write!(f, "{rate} Hz)"),
            None => write!(f, "native rate)"),
        }
    }
}
