use std::time::Duration;

use crate::AudioError;

/// Mono audio samples in `[-1, 1]` plus their sample rate.
///
/// A `Waveform` is never empty and always has a positive sample rate.
#[derive(Debug, Clone, PartialEq)]
pub struct Waveform {
    samples: Vec<f32>,
    sample_rate: u32,
}

impl Waveform {
    /// Creates a waveform, rejecting empty sample buffers and a zero rate.
    pub fn new(samples: Vec<f32>, sample_rate: u32) -> Result<Self, AudioError> {
        if sample_rate == 0 {
            return Err(AudioError::InvalidSampleRate(sample_rate));
        }
        if samples.is_empty() {
            return Err(AudioError::Empty);
        }
        Ok(Self { samples, sample_rate })
    }

    /// Creates a mono waveform by averaging interleaved channels.
    ///
    /// A trailing partial frame is dropped.
    pub fn from_interleaved(
        interleaved: &[f32],
        channels: u16,
        sample_rate: u32,
    ) -> Result<Self, AudioError> {
        let channels = channels.max(1) as usize;
        let samples = if channels == 1 {
            interleaved.to_vec()
        } else {
            interleaved
                .chunks_exact(channels)
                .map(|frame| frame.iter().sum::<f32>() / channels as f32)
                .collect()
        };
        Self::new(samples, sample_rate)
    }

    pub fn samples(&self) -> &[f32] {
        &self.samples
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// Always false; kept for API symmetry with `len`.
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn duration(&self) -> Duration {
        Duration::from_secs_f64(self.samples.len() as f64 / self.sample_rate as f64)
    }

    pub fn into_samples(self) -> Vec<f32> {
        self.samples
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_empty() {
        assert!(matches!(Waveform::new(vec![], 16000), Err(AudioError::Empty)));
    }

    #[test]
    fn rejects_zero_rate() {
        assert!(matches!(
            Waveform::new(vec![0.1], 0),
            Err(AudioError::InvalidSampleRate(0))
        ));
    }

    #[test]
    fn downmix_stereo() {
        let interleaved = [1.0f32, 0.0, 0.5, 0.5, -1.0, 1.0];
        let w = Waveform::from_interleaved(&interleaved, 2, 8000).unwrap();
        assert_eq!(w.samples(), &[0.5, 0.5, 0.0]);
        assert_eq!(w.sample_rate(), 8000);
    }

    #[test]
    fn downmix_drops_partial_frame() {
        let interleaved = [1.0f32, 1.0, 0.25];
        let w = Waveform::from_interleaved(&interleaved, 2, 8000).unwrap();
        assert_eq!(w.len(), 1);
    }

    #[test]
    fn duration() {
        let w = Waveform::new(vec![0.0; 8000], 16000).unwrap();
        assert_eq!(w.duration(), Duration::from_millis(500));
    }
}
