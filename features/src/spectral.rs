//! Spectral-shape features computed from an STFT.

use crate::mel::fft_frequencies;

/// Per-frame spectral centroid in Hz from a power spectrogram.
///
/// Uses magnitudes (`sqrt` of power). A frame with no energy gets 0 Hz.
pub fn spectral_centroid(power: &[Vec<f64>], sample_rate: u32, n_fft: usize) -> Vec<f64> {
    let freqs = fft_frequencies(sample_rate, n_fft);
    power
        .iter()
        .map(|frame| {
            let mut weighted = 0.0;
            let mut total = 0.0;
            for (p, f) in frame.iter().zip(&freqs) {
                let mag = p.sqrt();
                weighted += f * mag;
                total += mag;
            }
            if total > 0.0 { weighted / total } else { 0.0 }
        })
        .collect()
}
