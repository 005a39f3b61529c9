use tracing::debug;
use voiceguard_audio::Waveform;

use crate::config::{FeatureConfig, FeatureSchema, N_MFCC};
use crate::mfcc::{column_means, delta, Cepstrum};
use crate::spectral::spectral_centroid;
use crate::stft::Stft;
use crate::temporal::zero_crossing_rate;
use crate::{FeatureError, FeatureVector};

/// Waveform to [`FeatureVector`] transform.
///
/// The FFT plan and window are built once in [`Extractor::new`]. The mel
/// filterbank and DCT depend on each clip's sample rate and are rebuilt per
/// call, so an instance holds no mutable state and can be shared across
/// threads. Output depends only on the samples, the sample rate and the
/// config; repeated calls are bit-identical.
pub struct Extractor {
    cfg: FeatureConfig,
    schema: FeatureSchema,
    stft: Stft,
}

impl Extractor {
    pub fn new(cfg: FeatureConfig) -> Result<Self, FeatureError> {
        cfg.validate()?;
        let stft = Stft::new(cfg.n_fft, cfg.hop_length);
        let schema = FeatureSchema::new(cfg.clone());
        Ok(Self { cfg, schema, stft })
    }

    pub fn config(&self) -> &FeatureConfig {
        &self.cfg
    }

    /// Schema describing this extractor's output.
    pub fn schema(&self) -> &FeatureSchema {
        &self.schema
    }

    /// Extracts the feature vector for one clip.
    ///
    /// Clips shorter than one analysis window are zero-padded and still
    /// produce a full vector. A clip with a single STFT frame has an
    /// all-zero delta block.
    ///
    /// Fails with [`FeatureError::Extraction`] when the input contains
    /// non-finite samples, is entirely silent, or the result is not finite.
    pub fn extract(&self, wave: &Waveform) -> Result<FeatureVector, FeatureError> {
        let samples: Vec<f64> = wave.samples().iter().map(|&s| s as f64).collect();
        if samples.iter().any(|s| !s.is_finite()) {
            return Err(FeatureError::Extraction("input contains non-finite samples".into()));
        }
        if samples.iter().all(|&s| s == 0.0) {
            return Err(FeatureError::Extraction("input is silent".into()));
        }
        let cfg = &self.cfg;

        let power = self.stft.power(&samples);

        let cepstrum = Cepstrum::new(
            wave.sample_rate(),
            cfg.n_fft,
            cfg.n_mels,
            N_MFCC,
            cfg.amin,
            cfg.top_db,
        );
        let mfcc = cepstrum.mfcc(&power);
        let mfcc_mean = column_means(&mfcc, N_MFCC);
        let delta_mean = column_means(&delta(&mfcc), N_MFCC);

        let zcr = zero_crossing_rate(
            &samples,
            cfg.zcr_frame_length,
            cfg.zcr_hop_length,
            cfg.zcr_threshold,
        );
        let zcr_mean = mean(&zcr);

        let centroid = spectral_centroid(&power, wave.sample_rate(), cfg.n_fft);
        let centroid_mean = mean(&centroid);

        let vector = FeatureVector::from_parts(&mfcc_mean, &delta_mean, zcr_mean, centroid_mean);
        if let Some(pos) = vector.as_slice().iter().position(|v| !v.is_finite()) {
            return Err(FeatureError::Extraction(format!(
                "non-finite value at feature position {pos}"
            )));
        }

        debug!(
            samples = samples.len(),
            sample_rate = wave.sample_rate(),
            frames = power.len(),
            zcr = zcr_mean,
            centroid = centroid_mean,
            "extracted features"
        );
        Ok(vector)
    }
}

fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}
