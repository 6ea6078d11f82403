use std::time::Duration;

use crate::AudioError;

/// An immutable mono audio signal.
///
/// Samples are f32 amplitudes nominally in [-1, 1] at a fixed sample
/// rate. A waveform is constructed once (from a file or a generator)
/// and never mutated; transforms produce new waveforms.
#[derive(Debug, Clone, PartialEq)]
pub struct Waveform {
    samples: Vec<f32>,
    sample_rate: u32,
}

impl Waveform {
    /// Creates a waveform from samples and a sample rate.
    ///
    /// Fails with [`AudioError::Empty`] on zero samples and
    /// [`AudioError::InvalidRate`] on a zero rate.
    pub fn new(samples: Vec<f32>, sample_rate: u32) -> Result<Self, AudioError> {
        if sample_rate == 0 {
            return Err(AudioError::InvalidRate(sample_rate));
        }
        if samples.is_empty() {
            return Err(AudioError::Empty);
        }
        Ok(Self {
            samples,
            sample_rate,
        })
    }

    /// The raw samples.
    pub fn samples(&self) -> &[f32] {
        &self.samples
    }

    /// Sample rate in Hz.
    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Number of samples.
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// True when the waveform holds no samples. Construction rejects
    /// empty sample vectors, so this holds for no constructed value.
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Signal duration derived from sample count and rate.
    pub fn duration(&self) -> Duration {
        Duration::from_secs_f64(self.samples.len() as f64 / self.sample_rate as f64)
    }
}
