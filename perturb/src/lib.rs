//! Bypass-sample generation for robustness probing.
//!
//! From one source waveform the [`Generator`] produces two
//! adversarially perturbed variants:
//!
//! - pitch-shifted: spectral content moved by a random amount in
//!   [-2, +2] semitones, duration preserved
//! - time-stretched: temporal axis scaled by a random rate in
//!   [0.8, 1.2]x, pitch preserved
//!
//! Production use draws parameters from a fresh entropy source on
//! every call (adversarial diversity is the point); tests inject a
//! seeded RNG to pin parameters. The generator never touches files;
//! callers own artifact placement.

mod error;
mod generator;
mod stretch;

pub use error::PerturbError;
pub use generator::{BypassSamples, Generator, PerturbConfig};
pub use stretch::time_stretch;
