//! Sample rate conversion using the rubato FFT resampler.
//!
//! Only used when a caller explicitly asks for a target rate; the loader
//! keeps the source rate by default.

use rubato::{FftFixedInOut, Resampler};
use tracing::debug;

use crate::{AudioError, Waveform};

/// Frames per processing block.
const CHUNK_SIZE: usize = 1024;

/// Upper bound on flush calls after the input is consumed.
const MAX_FLUSH_ROUNDS: usize = 16;

/// Converts `wave` to `target_rate` Hz.
///
/// The output length is `round(len * target / source)` with the
/// resampler's group delay trimmed from the front.
pub fn resample(wave: &Waveform, target_rate: u32) -> Result<Waveform, AudioError> {
    if target_rate == 0 {
        return Err(AudioError::InvalidSampleRate(target_rate));
    }
    let source_rate = wave.sample_rate();
    if source_rate == target_rate {
        return Ok(wave.clone());
    }

    let mut resampler =
        FftFixedInOut::<f32>::new(source_rate as usize, target_rate as usize, CHUNK_SIZE, 1)?;
    let delay = resampler.output_delay();
    let expected =
        ((wave.len() as u64 * target_rate as u64 + source_rate as u64 / 2) / source_rate as u64)
            as usize;

    let input = wave.samples();
    let mut output = Vec::with_capacity(expected + delay + CHUNK_SIZE);
    let mut pos = 0;

    loop {
        let need = resampler.input_frames_next();
        if pos + need > input.len() {
            break;
        }
        let block_in: [&[f32]; 1] = [&input[pos..pos + need]];
        let block = resampler.process(&block_in[..], None)?;
        output.extend_from_slice(&block[0]);
        pos += need;
    }

    if pos < input.len() {
        let tail: [&[f32]; 1] = [&input[pos..]];
        let block = resampler.process_partial(Some(&tail[..]), None)?;
        output.extend_from_slice(&block[0]);
    }

    let mut rounds = 0;
    while output.len() < expected + delay && rounds < MAX_FLUSH_ROUNDS {
        let block = resampler.process_partial(None::<&[&[f32]]>, None)?;
        if block[0].is_empty() {
            break;
        }
        output.extend_from_slice(&block[0]);
        rounds += 1;
    }

    let end = (delay + expected).min(output.len());
    let samples = output[delay.min(end)..end].to_vec();

    debug!(
        from = source_rate,
        to = target_rate,
        in_samples = input.len(),
        out_samples = samples.len(),
        "resampled"
    );

    Waveform::new(samples, target_rate)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::PI;

    #[test]
    fn same_rate_is_identity() {
        let w = Waveform::new(vec![0.1, 0.2, 0.3], 16000).unwrap();
        assert_eq!(resample(&w, 16000).unwrap(), w);
    }

    #[test]
    fn downsample_length() {
        let samples: Vec<f32> = (0..44100)
            .map(|i| (2.0 * PI * 440.0 * i as f32 / 44100.0).sin())
            .collect();
        let w = Waveform::new(samples, 44100).unwrap();
        let out = resample(&w, 16000).unwrap();
        assert_eq!(out.sample_rate(), 16000);
        assert_eq!(out.len(), 16000);
    }

    #[test]
    fn zero_target_rejected() {
        let w = Waveform::new(vec![0.1; 10], 16000).unwrap();
        assert!(matches!(resample(&w, 0), Err(AudioError::InvalidSampleRate(0))));
    }
}
