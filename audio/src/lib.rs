//! Audio loading for voice analysis.
//!
//! This crate turns an uploaded or on-disk audio stream into a [`Waveform`]:
//!
//! - `decode`: WAV via hound, FLAC/MP3/Ogg Vorbis via symphonia, down-mixed to mono
//! - `spool`: per-request temporary files that are removed on drop
//! - `resample`: optional sample rate conversion
//!
//! The source sample rate is kept unless [`LoadOptions::target_sample_rate`]
//! asks for a specific rate.
//!
//! # Example
//!
//! ```rust,no_run
//! use voiceguard_audio::{Loader, LoadOptions};
//!
//! let loader = Loader::new(LoadOptions::default());
//! let wave = loader.load_file("clip.wav")?;
//! println!("{} samples @ {} Hz", wave.len(), wave.sample_rate());
//! # Ok::<(), voiceguard_audio::AudioError>(())
//! ```

mod decode;
mod error;
pub mod resample;
mod spool;
mod waveform;

use std::path::Path;

pub use decode::{decode_bytes, decode_bytes_with_hint, decode_file, decode_reader};
pub use error::AudioError;
pub use spool::SpooledAudio;
pub use waveform::Waveform;

/// Options applied after decoding.
#[derive(Debug, Clone, Default)]
pub struct LoadOptions {
    /// Resample to this rate. `None` keeps the source rate.
    pub target_sample_rate: Option<u32>,
}

/// Decodes audio and applies [`LoadOptions`].
#[derive(Debug, Clone, Default)]
pub struct Loader {
    opts: LoadOptions,
}

impl Loader {
    pub fn new(opts: LoadOptions) -> Self {
        Self { opts }
    }

    pub fn options(&self) -> &LoadOptions {
        &self.opts
    }

    /// Decodes an in-memory audio byte stream.
    pub fn load_bytes(&self, data: &[u8]) -> Result<Waveform, AudioError> {
        let wave = decode_bytes(data)?;
        self.finish(wave)
    }

    /// Decodes an audio file from disk.
    pub fn load_file(&self, path: impl AsRef<Path>) -> Result<Waveform, AudioError> {
        let wave = decode_file(path)?;
        self.finish(wave)
    }

    fn finish(&self, wave: Waveform) -> Result<Waveform, AudioError> {
        match self.opts.target_sample_rate {
            Some(rate) if rate != wave.sample_rate() => resample::resample(&wave, rate),
            _ => Ok(wave),
        }
    }
}
