//! Waveform handling for the voxlab pipeline.
//!
//! This crate provides:
//!
//! - [`Waveform`]: an immutable mono signal (f32 samples + sample rate)
//! - [`wav`]: WAV file decode/encode built on hound
//! - [`resample`]: one-shot sample rate conversion built on rubato
//!
//! Everything downstream (feature extraction, perturbation) consumes
//! [`Waveform`] values and never touches files or containers itself.

mod error;
pub mod resample;
pub mod wav;
mod waveform;

pub use error::AudioError;
pub use resample::resample;
pub use wav::{read_wav, write_wav};
pub use waveform::Waveform;
