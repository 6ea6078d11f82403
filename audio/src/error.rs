use thiserror::Error;

/// Errors returned by waveform operations.
#[derive(Debug, Error)]
pub enum AudioError {
    #[error("wav decode error: {0}")]
    Decode(String),

    #[error("wav encode error: {0}")]
    Encode(String),

    #[error("empty waveform")]
    Empty,

    #[error("invalid sample rate: {0}")]
    InvalidRate(u32),

    #[error("resample error: {0}")]
    Resample(String),
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
