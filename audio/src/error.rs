use thiserror::Error;

/// Errors returned while loading audio.
#[derive(Debug, Error)]
pub enum AudioError {
    #[error("invalid audio: {0}")]
    Decode(String),

    #[error("audio contains no samples")]
    Empty,

    #[error("invalid sample rate: {0}")]
    InvalidSampleRate(u32),

    #[error("resample error: {0}")]
    Resample(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<hound::Error> for AudioError {
    fn from(e: hound::Error) -> Self {
        match e {
            hound::Error::IoError(io) if io.kind() != std::io::ErrorKind::UnexpectedEof => {
                AudioError::Io(io)
            }
            other => AudioError::Decode(other.to_string()),
        }
    }
}

impl From<symphonia::core::errors::Error> for AudioError {
    fn from(e: symphonia::core::errors::Error) -> Self {
        use symphonia::core::errors::Error;
        match e {
            Error::IoError(io) if io.kind() != std::io::ErrorKind::UnexpectedEof => {
                AudioError::Io(io)
            }
            other => AudioError::Decode(other.to_string()),
        }
    }
}

impl From<rubato::ResamplerConstructionError> for AudioError {
    fn from(e: rubato::ResamplerConstructionError) -> Self {
        AudioError::Resample(e.to_string())
    }
}

impl From<rubato::ResampleError> for AudioError {
    fn from(e: rubato::ResampleError) -> Self {
        AudioError::Resample(e.to_string())
    }
}

impl AudioError {
    /// Returns true when the input itself is not usable audio,
    /// as opposed to an I/O or resampling failure on our side.
    pub fn is_invalid_input(&self) -> bool {
        matches!(
            self,
            AudioError::Decode(_) | AudioError::Empty | AudioError::InvalidSampleRate(_)
        )
    }
}
