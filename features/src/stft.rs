//! Centered short-time Fourier transform.

use std::sync::Arc;

use rustfft::num_complex::Complex;
use rustfft::{Fft, FftPlanner};

use crate::mel;

/// Number of frames a centered analysis of `len` samples produces.
pub fn frame_count(len: usize, hop: usize) -> usize {
    1 + len / hop
}

/// Power spectrogram producer with a pre-planned FFT.
///
/// The signal is zero-padded by `n_fft / 2` on both sides so frame `t`
/// is centered on sample `t * hop`. Any non-empty signal yields at least
/// one frame.
pub struct Stft {
    n_fft: usize,
    hop: usize,
    window: Vec<f64>,
    fft: Arc<dyn Fft<f64>>,
}

impl Stft {
    pub fn new(n_fft: usize, hop: usize) -> Self {
        let fft = FftPlanner::<f64>::new().plan_fft_forward(n_fft);
        Self {
            n_fft,
            hop,
            window: mel::hann_window(n_fft),
            fft,
        }
    }

    pub fn n_fft(&self) -> usize {
        self.n_fft
    }

    /// Returns `[frames][n_fft / 2 + 1]` of `|X|^2`.
    pub fn power(&self, samples: &[f64]) -> Vec<Vec<f64>> {
        let n_fft = self.n_fft;
        let half = n_fft / 2 + 1;
        let pad = (n_fft / 2) as isize;
        let num_frames = frame_count(samples.len(), self.hop);

        let mut buf = vec![Complex::new(0.0, 0.0); n_fft];
        let mut scratch = vec![Complex::new(0.0, 0.0); self.fft.get_inplace_scratch_len()];
        let mut frames = Vec::with_capacity(num_frames);

        for t in 0..num_frames {
            let start = (t * self.hop) as isize - pad;
            for (i, slot) in buf.iter_mut().enumerate() {
                let idx = start + i as isize;
                let s = if idx >= 0 && (idx as usize) < samples.len() {
                    samples[idx as usize]
                } else {
                    0.0
                };
                *slot = Complex::new(s * self.window[i], 0.0);
            }

            self.fft.process_with_scratch(&mut buf, &mut scratch);

            frames.push(buf[..half].iter().map(|c| c.norm_sqr()).collect());
        }
        frames
    }
}
