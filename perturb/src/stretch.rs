//! Pitch-preserving time stretching (WSOLA).
//!
//! Waveform-similarity overlap-add: output is assembled from windowed
//! input segments taken near their ideal time-scaled positions, each
//! nudged within a tolerance to best continue the previous segment.
//! Time-domain throughout, no phase bookkeeping.

use std::f64::consts::PI;

/// Analysis window length.
const WINDOW_MS: f64 = 40.0;
/// Segment search tolerance around the ideal position.
const TOLERANCE_MS: f64 = 8.0;

/// Stretches the temporal axis by `rate`, preserving pitch.
///
/// `rate` > 1 speeds the signal up (shorter output), `rate` < 1 slows
/// it down; the output holds `round(len / rate)` samples. Signals too
/// short for even two analysis windows fall back to linear
/// interpolation of the time axis.
pub fn time_stretch(samples: &[f32], rate: f64, sample_rate: u32) -> Vec<f32> {
    let n_out = ((samples.len() as f64) / rate).round() as usize;
    if n_out == 0 || samples.is_empty() {
        return Vec::new();
    }

    // Even window so the 50% synthesis hop tiles exactly.
    let mut window_len = (sample_rate as f64 * WINDOW_MS / 1000.0).round() as usize;
    window_len = window_len.max(64) & !1;
    if samples.len() < 2 * window_len {
        return interpolate_linear(samples, n_out);
    }

    let hop_syn = window_len / 2;
    let hop_ana = hop_syn as f64 * rate;
    let tolerance = (sample_rate as f64 * TOLERANCE_MS / 1000.0).round() as usize;
    let window = hann(window_len);
    let max_start = samples.len() - window_len;

    let mut out = vec![0.0f32; n_out + window_len];
    let mut norm = vec![0.0f32; n_out + window_len];

    let mut prev_start = 0usize;
    let mut out_pos = 0usize;
    let mut k = 0usize;

    while out_pos + window_len <= out.len() {
        let ideal = ((k as f64 * hop_ana).round() as usize).min(max_start);

        let start = if k == 0 {
            ideal
        } else {
            // The segment that would seamlessly continue the previous
            // copy starts one synthesis hop after it.
            let natural = (prev_start + hop_syn).min(max_start);
            let lo = ideal.saturating_sub(tolerance);
            let hi = (ideal + tolerance).min(max_start);
            best_continuation(samples, natural, lo, hi, hop_syn)
        };

        for i in 0..window_len {
            out[out_pos + i] += samples[start + i] * window[i];
            norm[out_pos + i] += window[i];
        }

        prev_start = start;
        out_pos += hop_syn;
        k += 1;
    }

    for (o, &w) in out.iter_mut().zip(&norm) {
        if w > 1e-6 {
            *o /= w;
        }
    }
    out.truncate(n_out);
    out
}

/// Picks the candidate start in [lo, hi] whose opening best matches
/// the natural continuation segment, by plain cross-correlation over
/// one hop.
fn best_continuation(
    samples: &[f32],
    natural: usize,
    lo: usize,
    hi: usize,
    overlap: usize,
) -> usize {
    let target = &samples[natural..natural + overlap];
    let mut best_start = lo;
    let mut best_score = f32::NEG_INFINITY;
    for cand in lo..=hi {
        let seg = &samples[cand..cand + overlap];
        let score: f32 = seg.iter().zip(target).map(|(a, b)| a * b).sum();
        if score > best_score {
            best_score = score;
            best_start = cand;
        }
    }
    best_start
}

fn hann(n: usize) -> Vec<f32> {
    (0..n)
        .map(|i| (0.5 - 0.5 * (2.0 * PI * i as f64 / n as f64).cos()) as f32)
        .collect()
}

/// Time-axis resampling by linear interpolation, for signals shorter
/// than the WSOLA window budget. Shifts pitch along with duration,
/// acceptable only at sub-window lengths.
fn interpolate_linear(samples: &[f32], n_out: usize) -> Vec<f32> {
    if samples.len() == 1 {
        return vec![samples[0]; n_out];
    }
    let step = (samples.len() - 1) as f64 / (n_out.max(2) - 1) as f64;
    (0..n_out)
        .map(|i| {
            let pos = i as f64 * step;
            let base = (pos.floor() as usize).min(samples.len() - 2);
            let frac = (pos - base as f64) as f32;
            samples[base] * (1.0 - frac) + samples[base + 1] * frac
        })
        .collect()
}
