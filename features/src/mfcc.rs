//! Mel-frequency cepstral coefficients and their frame deltas.

use crate::mel;

/// Mel spectrogram to cepstrum transform for one sample rate.
pub struct Cepstrum {
    mel_bank: Vec<Vec<f64>>,
    dct: Vec<Vec<f64>>,
    amin: f64,
    top_db: f64,
}

impl Cepstrum {
    /// Builds the mel bank (0 Hz to Nyquist) and DCT basis.
    pub fn new(
        sample_rate: u32,
        n_fft: usize,
        n_mels: usize,
        n_mfcc: usize,
        amin: f64,
        top_db: f64,
    ) -> Self {
        let nyquist = sample_rate as f64 / 2.0;
        Self {
            mel_bank: mel::mel_filter_bank(n_mels, n_fft, sample_rate, 0.0, nyquist),
            dct: mel::dct_matrix(n_mfcc, n_mels),
            amin,
            top_db,
        }
    }

    /// Converts a power spectrogram `[T][bins]` into MFCCs `[T][n_mfcc]`.
    ///
    /// Mel energies are converted to dB (reference 1.0) and clamped to
    /// `top_db` below the loudest cell of the whole clip before the DCT.
    pub fn mfcc(&self, power: &[Vec<f64>]) -> Vec<Vec<f64>> {
        let mut log_mel: Vec<Vec<f64>> = power
            .iter()
            .map(|frame| {
                self.mel_bank
                    .iter()
                    .map(|filter| {
                        let e: f64 = filter.iter().zip(frame).map(|(w, p)| w * p).sum();
                        10.0 * e.max(self.amin).log10()
                    })
                    .collect()
            })
            .collect();

        let peak = log_mel
            .iter()
            .flatten()
            .copied()
            .fold(f64::NEG_INFINITY, f64::max);
        let floor = peak - self.top_db;
        for v in log_mel.iter_mut().flatten() {
            if *v < floor {
                *v = floor;
            }
        }

        log_mel
            .iter()
            .map(|frame| {
                self.dct
                    .iter()
                    .map(|basis| basis.iter().zip(frame).map(|(b, x)| b * x).sum())
                    .collect()
            })
            .collect()
    }
}

/// Mean of each column of a `[T][D]` matrix. Empty input yields zeros.
pub fn column_means(rows: &[Vec<f64>], dim: usize) -> Vec<f64> {
    let mut sums = vec![0.0; dim];
    for row in rows {
        for (s, v) in sums.iter_mut().zip(row) {
            *s += v;
        }
    }
    if rows.is_empty() {
        return sums;
    }
    let n = rows.len() as f64;
    sums.iter().map(|s| s / n).collect()
}

/// Frame-to-frame first difference `c[t] - c[t-1]`, `T - 1` rows.
pub fn delta(coeffs: &[Vec<f64>]) -> Vec<Vec<f64>> {
    coeffs
        .windows(2)
        .map(|w| w[1].iter().zip(&w[0]).map(|(b, a)| b - a).collect())
        .collect()
}
