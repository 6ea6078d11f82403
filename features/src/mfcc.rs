use std::f64::consts::PI;

use voxlab_audio::Waveform;

use crate::FeatureError;

/// Configures MFCC extraction.
///
/// Frame geometry is given in milliseconds and resolved against each
/// waveform's own sample rate, so dataset files keep their native
/// rate. Defaults follow the usual speech setup: 25ms frames, 10ms
/// shift, 26 mel channels, 13 cepstral coefficients.
#[derive(Debug, Clone)]
pub struct MfccConfig {
    /// Number of cepstral coefficients to keep (default: 13).
    pub num_coeffs: usize,
    /// Number of mel filterbank channels (default: 26).
    pub num_mels: usize,
    /// Frame length in milliseconds (default: 25.0).
    pub frame_length_ms: f64,
    /// Frame shift in milliseconds (default: 10.0).
    pub frame_shift_ms: f64,
    /// Pre-emphasis coefficient (default: 0.97).
    pub pre_emphasis: f64,
    /// Floor for mel energies before the log (default: 1e-10).
    pub energy_floor: f64,
    /// Low cutoff frequency for mel bins (default: 20 Hz).
    pub low_freq: f64,
    /// High cutoff frequency, non-positive = offset from Nyquist (default: -400).
    pub high_freq: f64,
    /// Remove DC offset per frame (default: true).
    pub remove_dc: bool,
    /// Use Povey window (hamming^0.85) instead of Hamming (default: true).
    pub povey_window: bool,
}

impl Default for MfccConfig {
    fn default() -> Self {
        Self {
            num_coeffs: 13,
            num_mels: 26,
            frame_length_ms: 25.0,
            frame_shift_ms: 10.0,
            pre_emphasis: 0.97,
            energy_floor: 1e-10,
            low_freq: 20.0,
            high_freq: -400.0,
            remove_dc: true,
            povey_window: true,
        }
    }
}

/// Extracts a time-averaged MFCC vector from a waveform.
///
/// The result always has exactly `cfg.num_coeffs` entries. A waveform
/// shorter than one analysis frame fails with
/// [`FeatureError::TooShort`]; callers are expected to skip that
/// sample and continue their batch.
pub fn extract(waveform: &Waveform, cfg: &MfccConfig) -> Result<Vec<f64>, FeatureError> {
    if cfg.num_coeffs == 0 || cfg.num_mels == 0 {
        return Err(FeatureError::InvalidConfig(
            "coefficient and mel counts must be positive".into(),
        ));
    }
    if cfg.num_coeffs > cfg.num_mels {
        return Err(FeatureError::InvalidConfig(format!(
            "num_coeffs {} exceeds num_mels {}",
            cfg.num_coeffs, cfg.num_mels
        )));
    }
    if cfg.frame_length_ms <= 0.0 || cfg.frame_shift_ms <= 0.0 {
        return Err(FeatureError::InvalidConfig(
            "frame geometry must be positive".into(),
        ));
    }

    let rate = waveform.sample_rate() as f64;
    let frame_length = (rate * cfg.frame_length_ms / 1000.0).round() as usize;
    let frame_shift = ((rate * cfg.frame_shift_ms / 1000.0).round() as usize).max(1);

    let n_samples = waveform.len();
    if n_samples < frame_length || frame_length < 2 {
        return Err(FeatureError::TooShort {
            needed: frame_length.max(2),
            got: n_samples,
        });
    }

    let samples: Vec<f64> = waveform.samples().iter().map(|&s| s as f64).collect();
    let num_frames = (n_samples - frame_length) / frame_shift + 1;

    // FFT size: next power of 2 >= frame length.
    let fft_size = frame_length.next_power_of_two();

    let window = if cfg.povey_window {
        povey_window(frame_length)
    } else {
        hamming_window(frame_length)
    };

    let high_freq = if cfg.high_freq <= 0.0 {
        rate / 2.0 + cfg.high_freq
    } else {
        cfg.high_freq
    };
    if high_freq <= cfg.low_freq {
        return Err(FeatureError::InvalidConfig(format!(
            "mel band is empty: {} Hz .. {} Hz",
            cfg.low_freq, high_freq
        )));
    }

    let filterbank = mel_filterbank(cfg.num_mels, fft_size, rate, cfg.low_freq, high_freq);
    let dct = dct_matrix(cfg.num_coeffs, cfg.num_mels);

    let mut mean = vec![0.0f64; cfg.num_coeffs];
    let mut fft_buf = vec![(0.0f64, 0.0f64); fft_size];
    let mut frame_buf = vec![0.0f64; frame_length];
    let mut log_mel = vec![0.0f64; cfg.num_mels];

    for f in 0..num_frames {
        let offset = f * frame_shift;
        frame_buf.copy_from_slice(&samples[offset..offset + frame_length]);

        if cfg.remove_dc {
            let dc: f64 = frame_buf.iter().sum::<f64>() / frame_length as f64;
            for v in &mut frame_buf {
                *v -= dc;
            }
        }

        // Pre-emphasis, in reverse so each sample sees its untouched predecessor.
        if cfg.pre_emphasis > 0.0 {
            for i in (1..frame_length).rev() {
                frame_buf[i] -= cfg.pre_emphasis * frame_buf[i - 1];
            }
            frame_buf[0] *= 1.0 - cfg.pre_emphasis;
        }

        for v in &mut fft_buf {
            *v = (0.0, 0.0);
        }
        for i in 0..frame_length {
            fft_buf[i] = (frame_buf[i] * window[i], 0.0);
        }
        fft(&mut fft_buf);

        for (m, filter) in filterbank.iter().enumerate() {
            let mut energy = 0.0f64;
            for &(k, w) in filter {
                let (re, im) = fft_buf[k];
                energy += w * (re * re + im * im);
            }
            log_mel[m] = energy.max(cfg.energy_floor).ln();
        }

        // DCT-II projects log mel energies onto cepstral coefficients;
        // accumulate straight into the running mean.
        for (c, row) in dct.iter().enumerate() {
            let mut acc = 0.0f64;
            for (m, &w) in row.iter().enumerate() {
                acc += w * log_mel[m];
            }
            mean[c] += acc;
        }
    }

    for v in &mut mean {
        *v /= num_frames as f64;
    }
    Ok(mean)
}

fn hamming_window(n: usize) -> Vec<f64> {
    (0..n)
        .map(|i| 0.54 - 0.46 * (2.0 * PI * i as f64 / (n - 1) as f64).cos())
        .collect()
}

/// Povey window (hamming^0.85) used by Kaldi.
fn povey_window(n: usize) -> Vec<f64> {
    hamming_window(n).into_iter().map(|w| w.powf(0.85)).collect()
}

fn hz_to_mel(hz: f64) -> f64 {
    2595.0 * (1.0 + hz / 700.0).log10()
}

fn mel_to_hz(mel: f64) -> f64 {
    700.0 * (10.0_f64.powf(mel / 2595.0) - 1.0)
}

/// Computes triangular mel filters as sparse (bin, weight) lists.
fn mel_filterbank(
    num_mels: usize,
    fft_size: usize,
    sample_rate: f64,
    low_freq: f64,
    high_freq: f64,
) -> Vec<Vec<(usize, f64)>> {
    let half_fft = fft_size / 2 + 1;
    let mel_low = hz_to_mel(low_freq);
    let mel_high = hz_to_mel(high_freq);

    // num_mels + 2 equally spaced mel points -> FFT bin indices.
    let bins: Vec<usize> = (0..num_mels + 2)
        .map(|i| {
            let mel = mel_low + i as f64 * (mel_high - mel_low) / (num_mels + 1) as f64;
            let bin = (mel_to_hz(mel) * fft_size as f64 / sample_rate).floor() as isize;
            bin.clamp(0, half_fft as isize - 1) as usize
        })
        .collect();

    let mut fb = Vec::with_capacity(num_mels);
    for m in 0..num_mels {
        let (left, center, right) = (bins[m], bins[m + 1], bins[m + 2]);
        let mut filter = Vec::new();
        if center > left {
            for k in left..=center {
                filter.push((k, (k - left) as f64 / (center - left) as f64));
            }
        }
        if right > center {
            // Skip the apex, already pushed by the rising slope.
            for k in center + 1..=right {
                filter.push((k, (right - k) as f64 / (right - center) as f64));
            }
        }
        fb.push(filter);
    }
    fb
}

/// Orthonormal DCT-II matrix, `num_coeffs` rows over `num_mels` inputs.
fn dct_matrix(num_coeffs: usize, num_mels: usize) -> Vec<Vec<f64>> {
    let m = num_mels as f64;
    (0..num_coeffs)
        .map(|k| {
            let scale = if k == 0 {
                (1.0 / m).sqrt()
            } else {
                (2.0 / m).sqrt()
            };
            (0..num_mels)
                .map(|j| scale * (PI * k as f64 * (2 * j + 1) as f64 / (2.0 * m)).cos())
                .collect()
        })
        .collect()
}

/// In-place radix-2 Cooley-Tukey FFT over (real, imag) tuples.
/// Length must be a power of 2.
fn fft(x: &mut [(f64, f64)]) {
    let n = x.len();
    if n <= 1 {
        return;
    }

    // Bit-reversal permutation.
    let mut j = 0usize;
    for i in 1..n {
        let mut bit = n >> 1;
        while j & bit != 0 {
            j ^= bit;
            bit >>= 1;
        }
        j ^= bit;
        if i < j {
            x.swap(i, j);
        }
    }

    let mut size = 2;
    while size <= n {
        let half = size / 2;
        let angle = -2.0 * PI / size as f64;
        let wn = (angle.cos(), angle.sin());
        let mut start = 0;
        while start < n {
            let mut w = (1.0f64, 0.0f64);
            for k in 0..half {
                let (ur, ui) = x[start + k];
                let (vr, vi) = x[start + k + half];
                let tr = w.0 * vr - w.1 * vi;
                let ti = w.0 * vi + w.1 * vr;
                x[start + k] = (ur + tr, ui + ti);
                x[start + k + half] = (ur - tr, ui - ti);
                w = (w.0 * wn.0 - w.1 * wn.1, w.0 * wn.1 + w.1 * wn.0);
            }
            start += size;
        }
        size <<= 1;
    }
}
