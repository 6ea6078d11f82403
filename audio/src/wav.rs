//! WAV file decode/encode.
//!
//! Files are decoded to mono f32 at their native sample rate; multi
//! channel content is downmixed by averaging. Encoding always writes
//! 16-bit PCM mono.

use std::path::Path;

use hound::{SampleFormat, WavReader, WavSpec, WavWriter};

use crate::{AudioError, Waveform};

/// Reads a WAV file into a mono [`Waveform`] at its native rate.
///
/// Integer PCM of any bit depth is scaled to [-1, 1]; float PCM is
/// taken as-is. Multi-channel audio is averaged down to mono.
pub fn read_wav(path: impl AsRef<Path>) -> Result<Waveform, AudioError> {
    let mut reader =
        WavReader::open(path.as_ref()).map_err(|e| AudioError::Decode(e.to_string()))?;
    let spec = reader.spec();

    let interleaved: Vec<f32> = match spec.sample_format {
        SampleFormat::Float => reader
            .samples::<f32>()
            .collect::<Result<_, _>>()
            .map_err(|e| AudioError::Decode(e.to_string()))?,
        SampleFormat::Int => {
            let scale = 1.0 / (1i64 << (spec.bits_per_sample - 1)) as f32;
            reader
                .samples::<i32>()
                .map(|s| s.map(|v| v as f32 * scale))
                .collect::<Result<_, _>>()
                .map_err(|e| AudioError::Decode(e.to_string()))?
        }
    };

    let samples = downmix(&interleaved, spec.channels as usize);
    Waveform::new(samples, spec.sample_rate)
}

/// Writes a waveform as 16-bit PCM mono WAV.
pub fn write_wav(path: impl AsRef<Path>, waveform: &Waveform) -> Result<(), AudioError> {
    let spec = WavSpec {
        channels: 1,
        sample_rate: waveform.sample_rate(),
        bits_per_sample: 16,
        sample_format: SampleFormat::Int,
    };
    let mut writer =
        WavWriter::create(path.as_ref(), spec).map_err(|e| AudioError::Encode(e.to_string()))?;
    for &s in waveform.samples() {
        let v = (s * 32767.0).clamp(-32768.0, 32767.0) as i16;
        writer
            .write_sample(v)
            .map_err(|e| AudioError::Encode(e.to_string()))?;
    }
    writer
        .finalize()
        .map_err(|e| AudioError::Encode(e.to_string()))?;
    Ok(())
}

/// Averages interleaved channels into mono.
fn downmix(interleaved: &[f32], channels: usize) -> Vec<f32> {
    if channels <= 1 {
        return interleaved.to_vec();
    }
    let frames = interleaved.len() / channels;
    let mut mono = Vec::with_capacity(frames);
    for f in 0..frames {
        let mut acc = 0.0f32;
        for c in 0..channels {
            acc += interleaved[f * channels + c];
        }
        mono.push(acc / channels as f32);
    }
    mono
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
    fn downmix_stereo_averages() {
        let interleaved = vec![0.2, 0.4, -0.2, -0.4];
        let mono = downmix(&interleaved, 2);
        assert_eq!(mono.len(), 2);
        assert!((mono[0] - 0.3).abs() < 1e-6);
        assert!((mono[1] + 0.3).abs() < 1e-6);
    }

    #[test]
    fn downmix_mono_passthrough() {
        let samples = vec![0.1, 0.2, 0.3];
        assert_eq!(downmix(&samples, 1), samples);
    }

    #[test]
    fn wav_roundtrip_preserves_shape() {
        let dir = std::env::temp_dir();
        let path = dir.join("voxlab_wav_roundtrip.wav");

        let original = Waveform::new(sine(440.0, 1600, 16000), 16000).unwrap();
        write_wav(&path, &original).unwrap();
        let decoded = read_wav(&path).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(decoded.len(), original.len());
        assert_eq!(decoded.sample_rate(), original.sample_rate());

        // 16-bit quantization keeps samples within 1 LSB.
        for (a, b) in original.samples().iter().zip(decoded.samples()) {
            assert!((a - b).abs() < 1.0 / 16384.0, "sample drift: {a} vs {b}");
        }
    }

    #[test]
    fn read_wav_missing_file() {
        let err = read_wav("/nonexistent/voxlab.wav").unwrap_err();
        assert!(matches!(err, AudioError::Decode(_)));
    }
}
