//! Audio decoding.
//!
//! RIFF/WAVE goes through hound. Integer PCM is scaled by `2^(bits-1)` so
//! every sample lands in `[-1, 1)`; float PCM is taken as is. Everything
//! else (FLAC, MP3, Ogg Vorbis) is probed and decoded by symphonia. In both
//! paths multi-channel audio is averaged to mono.

use std::io::{BufReader, Cursor, Read};
use std::path::Path;

use hound::{SampleFormat, WavReader};
use symphonia::core::audio::SampleBuffer;
use symphonia::core::codecs::{DecoderOptions, CODEC_TYPE_NULL};
use symphonia::core::errors::Error as SymphoniaError;
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;
use tracing::{debug, warn};

use crate::{AudioError, Waveform};

/// Decodes an in-memory audio byte stream, detecting the container from
/// its content.
pub fn decode_bytes(data: &[u8]) -> Result<Waveform, AudioError> {
    decode_bytes_with_hint(data, None)
}

/// Like [`decode_bytes`], with a file extension to help format detection.
pub fn decode_bytes_with_hint(data: &[u8], extension: Option<&str>) -> Result<Waveform, AudioError> {
    if data.is_empty() {
        return Err(AudioError::Decode("empty byte stream".into()));
    }
    if is_riff(data) {
        return decode_reader(Cursor::new(data));
    }
    decode_with_symphonia(data.to_vec(), extension)
}

/// Decodes an audio file from disk.
pub fn decode_file(path: impl AsRef<Path>) -> Result<Waveform, AudioError> {
    let path = path.as_ref();
    let data = std::fs::read(path)?;
    let extension = path.extension().and_then(|e| e.to_str());
    decode_bytes_with_hint(&data, extension)
}

fn is_riff(data: &[u8]) -> bool {
    data.starts_with(b"RIFF")
}

/// Decodes audio from any reader positioned at the start of a WAV container.
pub fn decode_reader<R: Read>(reader: R) -> Result<Waveform, AudioError> {
    let reader = WavReader::new(BufReader::new(reader))?;
    let spec = reader.spec();
    if spec.channels == 0 {
        return Err(AudioError::Decode("wav header declares zero channels".into()));
    }

    let interleaved: Vec<f32> = match spec.sample_format {
        SampleFormat::Float => reader
            .into_samples::<f32>()
            .collect::<Result<_, _>>()?,
        SampleFormat::Int => {
            if spec.bits_per_sample == 0 || spec.bits_per_sample > 32 {
                return Err(AudioError::Decode(format!(
                    "unsupported bit depth: {}",
                    spec.bits_per_sample
                )));
            }
            let scale = (1u64 << (spec.bits_per_sample - 1)) as f32;
            reader
                .into_samples::<i32>()
                .map(|s| s.map(|v| v as f32 / scale))
                .collect::<Result<_, _>>()?
        }
    };

    debug!(
        channels = spec.channels,
        sample_rate = spec.sample_rate,
        bits = spec.bits_per_sample,
        samples = interleaved.len(),
        "decoded wav"
    );

    Waveform::from_interleaved(&interleaved, spec.channels, spec.sample_rate)
}

fn decode_with_symphonia(data: Vec<u8>, extension: Option<&str>) -> Result<Waveform, AudioError> {
    let mss = MediaSourceStream::new(Box::new(Cursor::new(data)), Default::default());
    let mut hint = Hint::new();
    if let Some(ext) = extension {
        hint.with_extension(ext);
    }

    let probed = symphonia::default::get_probe().format(
        &hint,
        mss,
        &FormatOptions::default(),
        &MetadataOptions::default(),
    )?;
    let mut format = probed.format;

    let track = format
        .tracks()
        .iter()
        .find(|t| t.codec_params.codec != CODEC_TYPE_NULL)
        .ok_or_else(|| AudioError::Decode("no audio track".into()))?;
    let track_id = track.id;
    let params = track.codec_params.clone();
    let mut decoder = symphonia::default::get_codecs().make(&params, &DecoderOptions::default())?;

    let mut sample_rate = params.sample_rate;
    let mut channels = params.channels.map(|c| c.count());
    let mut interleaved = Vec::new();
    let mut bad_packets = 0usize;

    loop {
        let packet = match format.next_packet() {
            Ok(packet) => packet,
            Err(SymphoniaError::IoError(e)) if e.kind() == std::io::ErrorKind::UnexpectedEof => break,
            Err(SymphoniaError::ResetRequired) => break,
            Err(e) => return Err(e.into()),
        };
        if packet.track_id() != track_id {
            continue;
        }

        match decoder.decode(&packet) {
            Ok(decoded) => {
                let spec = *decoded.spec();
                sample_rate = Some(spec.rate);
                channels = Some(spec.channels.count());
                let mut buf = SampleBuffer::<f32>::new(decoded.capacity() as u64, spec);
                buf.copy_interleaved_ref(decoded);
                interleaved.extend_from_slice(buf.samples());
            }
            Err(SymphoniaError::DecodeError(reason)) => {
                bad_packets += 1;
                warn!(reason, "skipping undecodable packet");
            }
            Err(e) => return Err(e.into()),
        }
    }

    let sample_rate = sample_rate.ok_or_else(|| AudioError::Decode("unknown sample rate".into()))?;
    let channels = channels
        .and_then(|c| u16::try_from(c).ok())
        .filter(|&c| c > 0)
        .ok_or_else(|| AudioError::Decode("unknown channel layout".into()))?;

    debug!(
        codec = ?params.codec,
        channels,
        sample_rate,
        samples = interleaved.len(),
        bad_packets,
        "decoded compressed audio"
    );

    Waveform::from_interleaved(&interleaved, channels, sample_rate)
}
