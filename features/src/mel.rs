//! Slaney mel scale, analysis windows and the mel filterbank.

use std::f64::consts::PI;

/// Generates a periodic Hann window of the given length.
pub fn hann_window(n: usize) -> Vec<f64> {
    if n <= 1 {
        return vec![1.0; n];
    }
    (0..n)
        .map(|i| 0.5 - 0.5 * (2.0 * PI * i as f64 / n as f64).cos())
        .collect()
}

const F_SP: f64 = 200.0 / 3.0;
const MIN_LOG_HZ: f64 = 1000.0;
const MIN_LOG_MEL: f64 = MIN_LOG_HZ / F_SP;

fn log_step() -> f64 {
    6.4f64.ln() / 27.0
}

/// Converts frequency in Hz to the Slaney mel scale
/// (linear below 1 kHz, logarithmic above).
pub fn hz_to_mel(hz: f64) -> f64 {
    if hz >= MIN_LOG_HZ {
        MIN_LOG_MEL + (hz / MIN_LOG_HZ).ln() / log_step()
    } else {
        hz / F_SP
    }
}

/// Converts a Slaney mel value back to Hz.
pub fn mel_to_hz(mel: f64) -> f64 {
    if mel >= MIN_LOG_MEL {
        MIN_LOG_HZ * (log_step() * (mel - MIN_LOG_MEL)).exp()
    } else {
        F_SP * mel
    }
}

/// Center frequency in Hz of every FFT bin, `0..=sr/2`.
pub fn fft_frequencies(sample_rate: u32, n_fft: usize) -> Vec<f64> {
    let half = n_fft / 2 + 1;
    (0..half)
        .map(|k| k as f64 * sample_rate as f64 / n_fft as f64)
        .collect()
}

/// Creates the mel filterbank matrix.
///
/// Returns `[num_mels][n_fft / 2 + 1]`. Filters are triangles on the
/// continuous frequency axis between `low_freq` and `high_freq`, each
/// scaled to unit area (Slaney normalisation).
pub fn mel_filter_bank(
    num_mels: usize,
    n_fft: usize,
    sample_rate: u32,
    low_freq: f64,
    high_freq: f64,
) -> Vec<Vec<f64>> {
    let fft_freqs = fft_frequencies(sample_rate, n_fft);
    let low_mel = hz_to_mel(low_freq);
    let high_mel = hz_to_mel(high_freq);

    // num_mels + 2 equally spaced mel points, in Hz
    let step = (high_mel - low_mel) / (num_mels + 1) as f64;
    let mel_hz: Vec<f64> = (0..num_mels + 2)
        .map(|i| mel_to_hz(low_mel + i as f64 * step))
        .collect();

    let mut bank = Vec::with_capacity(num_mels);
    for m in 0..num_mels {
        let (left, center, right) = (mel_hz[m], mel_hz[m + 1], mel_hz[m + 2]);
        let norm = 2.0 / (right - left);
        let filter = fft_freqs
            .iter()
            .map(|&f| {
                let lower = (f - left) / (center - left);
                let upper = (right - f) / (right - center);
                lower.min(upper).max(0.0) * norm
            })
            .collect();
        bank.push(filter);
    }
    bank
}

/// Orthonormal DCT-II basis, `[n_out][n_in]`.
pub fn dct_matrix(n_out: usize, n_in: usize) -> Vec<Vec<f64>> {
    let scale0 = (1.0 / n_in as f64).sqrt();
    let scale = (2.0 / n_in as f64).sqrt();
    (0..n_out)
        .map(|k| {
            let s = if k == 0 { scale0 } else { scale };
            (0..n_in)
                .map(|n| s * (PI * k as f64 * (2 * n + 1) as f64 / (2 * n_in) as f64).cos())
                .collect()
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hann_window() {
        let w = hann_window(8);
        assert_eq!(w.len(), 8);
        assert!(w[0].abs() < 1e-12);
        assert!((w[4] - 1.0).abs() < 1e-12);
        // periodic: symmetric around n/2, not around (n-1)/2
        for i in 1..4 {
            assert!((w[i] - w[8 - i]).abs() < 1e-12);
        }
    }

    #[test]
    fn test_hz_mel_roundtrip() {
        for &hz in &[0.0, 100.0, 440.0, 1000.0, 4000.0, 8000.0, 22050.0] {
            let back = mel_to_hz(hz_to_mel(hz));
            assert!((hz - back).abs() < 1e-6, "roundtrip failed for {} Hz", hz);
        }
    }

    #[test]
    fn test_slaney_breakpoint() {
        assert!((hz_to_mel(1000.0) - 15.0).abs() < 1e-12);
        assert!((hz_to_mel(500.0) - 7.5).abs() < 1e-12);
    }

    #[test]
    fn test_mel_filter_bank_shape() {
        let bank = mel_filter_bank(128, 2048, 16000, 0.0, 8000.0);
        assert_eq!(bank.len(), 128);
        assert_eq!(bank[0].len(), 1025);

        for filter in &bank {
            for &v in filter {
                assert!(v >= 0.0);
            }
        }
        // low bands are narrow at 16 kHz but every band above the first
        // few must catch at least one bin
        let empty = bank.iter().filter(|f| f.iter().all(|&v| v == 0.0)).count();
        assert!(empty < 10, "{empty} empty filters");
    }

    #[test]
    fn test_dct_orthonormal() {
        let d = dct_matrix(8, 8);
        for i in 0..8 {
            for j in 0..8 {
                let dot: f64 = (0..8).map(|n| d[i][n] * d[j][n]).sum();
                let want = if i == j { 1.0 } else { 0.0 };
                assert!((dot - want).abs() < 1e-10, "({i},{j}) = {dot}");
            }
        }
    }
}
