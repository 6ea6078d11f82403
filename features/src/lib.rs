//! MFCC feature extraction.
//!
//! Converts a [`Waveform`](voxlab_audio::Waveform) into a single
//! fixed-length cepstral summary vector:
//!
//! 1. Frame the signal (25ms window, 10ms shift by default)
//! 2. Per frame: remove DC, pre-emphasize, window, FFT, power spectrum
//! 3. Triangular mel filterbank, log energies
//! 4. DCT-II, keep the first N cepstral coefficients (default 13)
//! 5. Average each coefficient across all frames
//!
//! The time-averaging in step 5 deliberately discards temporal
//! dynamics: the downstream density models are non-sequential and
//! need one vector per utterance.

mod error;
mod mfcc;

pub use error::FeatureError;
pub use mfcc::{extract, MfccConfig};
