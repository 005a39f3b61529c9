//! Fixed-layout acoustic features for synthetic speech detection.
//!
//! # Layout
//!
//! Every clip maps to exactly [`FEATURE_LEN`] (42) values, in this order:
//!
//! 1. 20 MFCCs averaged over frames
//! 2. 20 frame-to-frame MFCC deltas averaged over frames
//! 3. zero-crossing rate averaged over frames
//! 4. spectral centroid (Hz) averaged over frames
//!
//! The same [`Extractor`] must be used to build training data and to serve
//! predictions. The [`FeatureSchema`] records the layout and every numeric
//! parameter so that a model can refuse features produced differently.
//!
//! # Pipeline
//!
//! - Centered STFT, periodic Hann window, 2048-point FFT, hop 512
//! - 128 Slaney mel bands, power in dB with an 80 dB floor
//! - Orthonormal DCT-II, first 20 coefficients
//! - Zero-crossing rate on edge-padded 2048-sample frames
//! - Spectral centroid on the STFT magnitudes

mod config;
mod error;
mod extractor;
pub mod mel;
pub mod mfcc;
pub mod spectral;
pub mod stft;
pub mod temporal;
mod vector;

pub use config::{
    FeatureConfig, FeatureSchema, CENTROID_INDEX, DELTA_RANGE, FEATURE_LEN, MFCC_RANGE, N_MFCC,
    SCHEMA_NAME, SCHEMA_VERSION, ZCR_INDEX,
};
pub use error::FeatureError;
pub use extractor::Extractor;
pub use vector::FeatureVector;

use voiceguard_audio::Waveform;

/// Extracts features with the default configuration.
pub fn extract(wave: &Waveform) -> Result<FeatureVector, FeatureError> {
    Extractor::new(FeatureConfig::default())?.extract(wave)
}
