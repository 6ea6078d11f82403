use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use voxlab_audio::{resample, Waveform};

use crate::stretch::time_stretch;
use crate::PerturbError;

/// Parameter ranges for bypass-sample generation.
#[derive(Debug, Clone)]
pub struct PerturbConfig {
    /// Pitch shift bounds in semitones (default: -2.0 .. 2.0).
    pub semitone_lo: f64,
    pub semitone_hi: f64,
    /// Time stretch rate bounds (default: 0.8 .. 1.2).
    pub rate_lo: f64,
    pub rate_hi: f64,
}

impl Default for PerturbConfig {
    fn default() -> Self {
        Self {
            semitone_lo: -2.0,
            semitone_hi: 2.0,
            rate_lo: 0.8,
            rate_hi: 1.2,
        }
    }
}

/// Both perturbed variants of one source waveform.
///
/// The variants succeed or fail independently; one failing does not
/// discard the other.
#[derive(Debug)]
pub struct BypassSamples {
    pub pitch_shifted: Result<Waveform, PerturbError>,
    pub time_stretched: Result<Waveform, PerturbError>,
}

/// Produces pitch-shifted and time-stretched variants of a waveform.
///
/// The random source is part of the generator so tests can inject a
/// seeded one; [`Generator::new`] seeds from entropy, which is the
/// production path (bypass diversity is desired, not reproducibility).
pub struct Generator<R: Rng> {
    cfg: PerturbConfig,
    rng: R,
}

impl Generator<StdRng> {
    /// Generator with default ranges and a fresh entropy source.
    pub fn new() -> Self {
        Self::with_rng(StdRng::from_entropy())
    }
}

impl Default for Generator<StdRng> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: Rng> Generator<R> {
    /// Generator with default ranges and the given random source.
    pub fn with_rng(rng: R) -> Self {
        Self {
            cfg: PerturbConfig::default(),
            rng,
        }
    }

    /// Replaces the parameter ranges.
    pub fn with_config(mut self, cfg: PerturbConfig) -> Self {
        self.cfg = cfg;
        self
    }

    /// Produces both bypass variants of the source waveform.
    pub fn generate(&mut self, waveform: &Waveform) -> BypassSamples {
        BypassSamples {
            pitch_shifted: self.pitch_shift(waveform),
            time_stretched: self.stretch(waveform),
        }
    }

    /// Shifts pitch by a random semitone offset, preserving duration.
    ///
    /// Implemented as a pitch-preserving stretch by `2^(-n/12)`
    /// followed by resampling back to the source rate, which scales
    /// the spectrum by `2^(n/12)` and restores the original length.
    pub fn pitch_shift(&mut self, waveform: &Waveform) -> Result<Waveform, PerturbError> {
        let semitones = draw_uniform(&mut self.rng, self.cfg.semitone_lo, self.cfg.semitone_hi)?;
        let factor = 2.0f64.powf(-semitones / 12.0);

        let sr = waveform.sample_rate();
        let stretched = time_stretch(waveform.samples(), factor, sr);
        let virtual_rate = ((sr as f64) / factor).round() as u32;
        let shifted = resample(&stretched, virtual_rate, sr)?;
        Ok(Waveform::new(shifted, sr)?)
    }

    /// Stretches the temporal axis by a random rate, preserving pitch.
    pub fn stretch(&mut self, waveform: &Waveform) -> Result<Waveform, PerturbError> {
        let rate = draw_uniform(&mut self.rng, self.cfg.rate_lo, self.cfg.rate_hi)?;
        let stretched = time_stretch(waveform.samples(), rate, waveform.sample_rate());
        Ok(Waveform::new(stretched, waveform.sample_rate())?)
    }
}

/// Uniform draw with range validation.
fn draw_uniform<R: Rng>(rng: &mut R, lo: f64, hi: f64) -> Result<f64, PerturbError> {
    if !(lo < hi) || !lo.is_finite() || !hi.is_finite() {
        return Err(PerturbError::InvalidRange { lo, hi });
    }
    Ok(rng.gen_range(lo..hi))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sine_waveform(freq_hz: f64, n: usize, rate: u32) -> Waveform {
        let samples: Vec<f32> = (0..n)
            .map(|i| {
                let t = i as f64 / rate as f64;
                ((freq_hz * 2.0 * std::f64::consts::PI * t).sin() * 0.5) as f32
            })
            .collect();
        Waveform::new(samples, rate).unwrap()
    }

    fn seeded() -> Generator<StdRng> {
        Generator::with_rng(StdRng::seed_from_u64(42))
    }

    #[test]
    fn generate_keeps_sample_rate() {
        let w = sine_waveform(440.0, 32000, 16000);
        let out = seeded().generate(&w);
        assert_eq!(out.pitch_shifted.unwrap().sample_rate(), 16000);
        assert_eq!(out.time_stretched.unwrap().sample_rate(), 16000);
    }

    #[test]
    fn stretched_duration_within_rate_bounds() {
        let w = sine_waveform(440.0, 32000, 16000);
        let mut g = seeded();
        for _ in 0..10 {
            let out = g.stretch(&w).unwrap();
            let lo = (32000.0_f64 / 1.2).floor() as usize;
            let hi = (32000.0_f64 / 0.8).ceil() as usize;
            assert!(
                (lo..=hi).contains(&out.len()),
                "stretched length {} outside [{lo}, {hi}]",
                out.len()
            );
        }
    }

    #[test]
    fn pitch_shift_preserves_duration() {
        let w = sine_waveform(440.0, 32000, 16000);
        let mut g = seeded();
        for _ in 0..10 {
            let out = g.pitch_shift(&w).unwrap();
            let drift = (out.len() as f64 - 32000.0).abs() / 32000.0;
            assert!(drift < 0.01, "duration drifted {:.3}%", drift * 100.0);
        }
    }

    #[test]
    fn pitch_shift_moves_the_spectrum() {
        // Pin parameters on a seed whose first draw is far from zero.
        let w = sine_waveform(440.0, 48000, 16000);
        let mut moved = false;
        for seed in 0..10 {
            let mut g = Generator::with_rng(StdRng::seed_from_u64(seed));
            let out = g.pitch_shift(&w).unwrap();
            let crossings = out
                .samples()
                .windows(2)
                .filter(|p| (p[0] >= 0.0) != (p[1] >= 0.0))
                .count();
            let freq = crossings as f64 * 16000.0 / (2.0 * out.len() as f64);
            if (freq - 440.0).abs() > 15.0 {
                moved = true;
                break;
            }
        }
        assert!(moved, "ten random draws never moved the pitch");
    }

    #[test]
    fn invalid_range_is_reported() {
        let w = sine_waveform(440.0, 16000, 16000);
        let cfg = PerturbConfig {
            semitone_lo: 2.0,
            semitone_hi: -2.0,
            ..PerturbConfig::default()
        };
        let mut g = seeded().with_config(cfg);
        assert!(matches!(
            g.pitch_shift(&w),
            Err(PerturbError::InvalidRange { .. })
        ));
        // The other variant still works: failures are independent.
        let out = g.generate(&w);
        assert!(out.pitch_shifted.is_err());
        assert!(out.time_stretched.is_ok());
    }

    #[test]
    fn injected_rng_pins_parameters() {
        let w = sine_waveform(440.0, 32000, 16000);
        let a = Generator::with_rng(StdRng::seed_from_u64(7)).stretch(&w).unwrap();
        let b = Generator::with_rng(StdRng::seed_from_u64(7)).stretch(&w).unwrap();
        assert_eq!(a.samples(), b.samples());
        assert_eq!(a.len(), b.len());
    }

    #[test]
    fn draw_uniform_stays_in_bounds() {
        let mut rng = StdRng::seed_from_u64(0);
        for _ in 0..1000 {
            let v = draw_uniform(&mut rng, -2.0, 2.0).unwrap();
            assert!((-2.0..2.0).contains(&v));
        }
    }
}
