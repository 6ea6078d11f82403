//! One-shot sample rate conversion.
//!
//! Wraps rubato's FFT resampler in a buffer-at-once call: the whole
//! signal goes in, the converted signal comes out. Streaming is not
//! needed anywhere in the pipeline.

use rubato::{FftFixedInOut, Resampler};

use crate::AudioError;

/// Frames per processing block.
const CHUNK_SIZE: usize = 1024;

/// Resamples a mono signal from `from_rate` to `to_rate`.
///
/// The output length is `len * to_rate / from_rate` rounded to the
/// nearest frame. Same-rate input is returned unchanged.
pub fn resample(samples: &[f32], from_rate: u32, to_rate: u32) -> Result<Vec<f32>, AudioError> {
    if from_rate == 0 {
        return Err(AudioError::InvalidRate(from_rate));
    }
    if to_rate == 0 {
        return Err(AudioError::InvalidRate(to_rate));
    }
    if samples.is_empty() {
        return Err(AudioError::Empty);
    }
    if from_rate == to_rate {
        return Ok(samples.to_vec());
    }

    let mut resampler =
        FftFixedInOut::<f32>::new(from_rate as usize, to_rate as usize, CHUNK_SIZE, 1)?;

    // The FFT resampler introduces a fixed output delay; produce enough
    // frames to cover delay + expected length, then trim both ends.
    let delay = resampler.output_delay();
    let expected =
        ((samples.len() as f64) * (to_rate as f64) / (from_rate as f64)).round() as usize;

    let mut input_buf: Vec<Vec<f32>> = vec![Vec::with_capacity(CHUNK_SIZE)];
    let mut output_buf: Vec<Vec<f32>> = vec![vec![0.0; resampler.output_frames_max()]];
    let mut out: Vec<f32> = Vec::with_capacity(expected + delay);
    let mut pos = 0usize;

    while out.len() < expected + delay {
        let need = resampler.input_frames_next();
        let take = need.min(samples.len().saturating_sub(pos));
        input_buf[0].clear();
        input_buf[0].extend_from_slice(&samples[pos..pos + take]);
        // Zero-pad past the end of the signal.
        input_buf[0].resize(need, 0.0);
        pos += take;

        let next_out = resampler.output_frames_next();
        if output_buf[0].len() < next_out {
            output_buf[0].resize(next_out, 0.0);
        }
        let (_, written) = resampler.process_into_buffer(&input_buf, &mut output_buf, None)?;
        out.extend_from_slice(&output_buf[0][..written]);
    }

    out.drain(..delay.min(out.len()));
    out.truncate(expected);
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sine(freq_hz: f32, n: usize, rate: u32) -> Vec<f32> {
        (0..n)
            .map(|i| {
                let t = i as f32 / rate as f32;
                (freq_hz * 2.0 * std::f32::consts::PI * t).sin() * 0.5
            })
            .collect()
    }

    #[test]
    fn same_rate_passthrough() {
        let signal = sine(440.0, 1600, 16000);
        let out = resample(&signal, 16000, 16000).unwrap();
        assert_eq!(out, signal);
    }

    #[test]
    fn upsample_doubles_length() {
        let signal = sine(440.0, 16000, 16000);
        let out = resample(&signal, 16000, 32000).unwrap();
        assert_eq!(out.len(), 32000);
    }

    #[test]
    fn downsample_halves_length() {
        let signal = sine(440.0, 16000, 16000);
        let out = resample(&signal, 16000, 8000).unwrap();
        assert_eq!(out.len(), 8000);
    }

    #[test]
    fn non_integer_ratio() {
        let signal = sine(200.0, 22050, 22050);
        let out = resample(&signal, 22050, 16000).unwrap();
        assert_eq!(out.len(), 16000);
    }

    #[test]
    fn rejects_zero_rate() {
        let signal = vec![0.0f32; 100];
        assert!(matches!(
            resample(&signal, 0, 16000),
            Err(AudioError::InvalidRate(0))
        ));
        assert!(matches!(
            resample(&signal, 16000, 0),
            Err(AudioError::InvalidRate(0))
        ));
    }

    #[test]
    fn rejects_empty_signal() {
        assert!(matches!(
            resample(&[], 16000, 8000),
            Err(AudioError::Empty)
        ));
    }

    #[test]
    fn preserves_tone_energy() {
        // A 440 Hz tone resampled 16k -> 24k should keep its amplitude.
        let signal = sine(440.0, 16000, 16000);
        let out = resample(&signal, 16000, 24000).unwrap();

        // Skip edges where the resampler rings.
        let mid = &out[4000..20000];
        let peak = mid.iter().fold(0.0f32, |m, &v| m.max(v.abs()));
        assert!((peak - 0.5).abs() < 0.05, "peak amplitude drifted: {peak}");
    }
}
