use thiserror::Error;

/// Errors returned by feature extraction.
#[derive(Debug, Error)]
pub enum FeatureError {
    #[error("waveform too short: need at least {needed} samples, got {got}")]
    TooShort { needed: usize, got: usize },

    #[error("invalid extraction config: {0}")]
    InvalidConfig(String),
}
