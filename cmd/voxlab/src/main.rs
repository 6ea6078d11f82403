//! voxlab - Speaker verification research pipeline.
//!
//! Trains one Gaussian mixture per speaker from a directory of voice
//! samples, evaluates closed-set identification on a held-out split,
//! and generates adversarial bypass samples (pitch-shifted and
//! time-stretched) for each speaker.

mod dataset;
mod report;

use std::collections::BTreeMap;
use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use voxlab_features::MfccConfig;
use voxlab_model::{evaluate, split_train_test, GmmConfig, ModelBank, PredictionRecord};
use voxlab_perturb::Generator;

/// Speaker verification research pipeline.
#[derive(Parser, Debug)]
#[command(name = "voxlab")]
#[command(about = "Train per-speaker models, evaluate identification, generate bypass samples")]
struct Args {
    /// Dataset directory: one subdirectory per speaker, WAV files inside
    dataset: PathBuf,

    /// Fraction of samples held out for testing
    #[arg(long, default_value_t = 0.2)]
    test_fraction: f64,

    /// Number of cepstral coefficients per feature vector
    #[arg(long, default_value_t = 13)]
    coeffs: usize,

    /// Mixture components per speaker model
    #[arg(long, default_value_t = 8)]
    components: usize,

    /// EM iteration cap
    #[arg(long, default_value_t = 200)]
    max_iter: usize,

    /// Seed for the split and model initialization
    #[arg(long, default_value_t = 42)]
    seed: u64,

    /// Write a JSON report to this path
    #[arg(short = 'o', long)]
    output: Option<PathBuf>,

    /// Skip bypass sample generation
    #[arg(long)]
    no_bypass: bool,

    /// Quiet mode (no summary on stdout)
    #[arg(short = 'q', long)]
    quiet: bool,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let args = Args::parse();

    if !args.dataset.is_dir() {
        anyhow::bail!(
            "voice samples directory does not exist: {}",
            args.dataset.display()
        );
    }

    let mfcc_cfg = MfccConfig {
        num_coeffs: args.coeffs,
        ..MfccConfig::default()
    };
    let gmm_cfg = GmmConfig {
        n_components: args.components,
        max_iter: args.max_iter,
        seed: args.seed,
        ..GmmConfig::default()
    };

    // Assemble the dataset.
    let speakers = dataset::scan_speakers(&args.dataset)?;
    let (samples, stats) = dataset::assemble(&speakers, &mfcc_cfg);
    if samples.is_empty() {
        anyhow::bail!("no valid voice samples found under {}", args.dataset.display());
    }
    info!(
        samples = stats.extracted,
        skipped = stats.skipped,
        speakers = speakers.len(),
        "dataset assembled"
    );

    // Split, train, evaluate.
    let (train, test) = split_train_test(samples, args.test_fraction, args.seed)?;
    let mut per_speaker: BTreeMap<String, usize> = BTreeMap::new();
    for s in &train {
        *per_speaker.entry(s.label.clone()).or_default() += 1;
    }

    let bank = ModelBank::fit(&train, &gmm_cfg)?;
    info!(speakers = bank.len(), "model training complete");

    let mut records = Vec::with_capacity(test.len());
    for sample in &test {
        let predicted = bank.identify(&sample.features)?;
        records.push(PredictionRecord::new(sample.label.as_str(), predicted));
    }
    let eval = evaluate(&records)?;
    info!("test accuracy: {:.2}", eval.accuracy);
    for (truth, row) in &eval.confusion {
        for (predicted, count) in row {
            info!(truth = %truth, predicted = %predicted, count, "confusion cell");
        }
    }

    // Generate bypass samples from each speaker's first file.
    if !args.no_bypass {
        generate_bypass_samples(&speakers);
    }

    let report = report::RunReport::new(&eval, per_speaker, train.len(), records.len(), stats.skipped);
    if !args.quiet {
        report::print_summary(&report);
    }
    if let Some(path) = &args.output {
        report::save_report(&report, path)?;
        info!(path = %path.display(), "report saved");
    }

    Ok(())
}

/// Writes pitch-shifted and time-stretched variants of each speaker's
/// first sample into that speaker's directory. Per-variant failures
/// are logged and do not stop the batch.
fn generate_bypass_samples(speakers: &[dataset::SpeakerDir]) {
    let mut generator = Generator::new();

    for speaker in speakers {
        let Some(source) = speaker.files.first() else {
            continue;
        };
        let dir = match source.parent() {
            Some(d) => d.to_path_buf(),
            None => continue,
        };

        let waveform = match voxlab_audio::read_wav(source) {
            Ok(w) => w,
            Err(e) => {
                warn!(file = %source.display(), error = %e, "bypass source unreadable");
                continue;
            }
        };

        let out = generator.generate(&waveform);
        let variants = [
            ("pitch_shifted.wav", out.pitch_shifted),
            ("time_stretched.wav", out.time_stretched),
        ];
        for (name, variant) in variants {
            match variant {
                Ok(w) => {
                    let path = dir.join(name);
                    if let Err(e) = voxlab_audio::write_wav(&path, &w) {
                        warn!(file = %path.display(), error = %e, "cannot write bypass sample");
                    }
                }
                Err(e) => {
                    warn!(speaker = %speaker.label, variant = name, error = %e, "bypass generation failed");
                }
            }
        }
        info!(speaker = %speaker.label, source = %source.display(), "bypass samples generated");
    }
}
