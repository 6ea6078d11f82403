use thiserror::Error;

/// Errors returned by perturbation operations.
#[derive(Debug, Error)]
pub enum PerturbError {
    #[error("invalid perturbation range: [{lo}, {hi}]")]
    InvalidRange { lo: f64, hi: f64 },

    #[error("audio error: {0}")]
    Audio(String),
}

impl From<voxlab_audio::AudioError> for PerturbError {
    fn from(e: voxlab_audio::AudioError) -> Self {
        PerturbError::Audio(e.to_string())
    }
}
