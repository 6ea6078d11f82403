use thiserror::Error;

/// Errors returned by modeling and evaluation operations.
#[derive(Debug, Error)]
pub enum ModelError {
    #[error("empty input: no samples to process")]
    EmptyInput,

    #[error("dimension mismatch: expected {expected}, got {got}")]
    DimensionMismatch { expected: usize, got: usize },

    #[error("invalid model config: {0}")]
    Config(String),
}
