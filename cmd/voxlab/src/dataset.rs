//! Dataset directory traversal and feature assembly.
//!
//! Expected layout: one subdirectory per speaker, WAV files inside.
//! Decode or extraction failures are logged and the file is skipped;
//! the batch continues.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::{debug, warn};

use voxlab_features::MfccConfig;
use voxlab_model::LabeledSample;

/// One speaker directory with its WAV files, both in sorted order.
pub struct SpeakerDir {
    pub label: String,
    pub files: Vec<PathBuf>,
}

/// Lists speaker subdirectories and their WAV files, sorted for
/// reproducible traversal order.
pub fn scan_speakers(root: &Path) -> Result<Vec<SpeakerDir>> {
    let mut speakers = Vec::new();

    let mut dirs: Vec<PathBuf> = std::fs::read_dir(root)
        .with_context(|| format!("cannot read dataset directory {}", root.display()))?
        .filter_map(|e| e.ok().map(|e| e.path()))
        .filter(|p| p.is_dir())
        .collect();
    dirs.sort();

    for dir in dirs {
        let label = match dir.file_name().and_then(|n| n.to_str()) {
            Some(name) => name.to_string(),
            None => continue,
        };
        let mut files: Vec<PathBuf> = std::fs::read_dir(&dir)
            .with_context(|| format!("cannot read speaker directory {}", dir.display()))?
            .filter_map(|e| e.ok().map(|e| e.path()))
            .filter(|p| {
                p.is_file()
                    && p.extension()
                        .and_then(|e| e.to_str())
                        .is_some_and(|e| e.eq_ignore_ascii_case("wav"))
            })
            .collect();
        files.sort();
        speakers.push(SpeakerDir { label, files });
    }

    Ok(speakers)
}

/// Statistics from one assembly pass.
#[derive(Debug, Default)]
pub struct AssemblyStats {
    pub extracted: usize,
    pub skipped: usize,
}

/// Decodes and extracts features for every WAV under every speaker.
///
/// Per-file failures are warnings; the sample is skipped and counted.
pub fn assemble(speakers: &[SpeakerDir], cfg: &MfccConfig) -> (Vec<LabeledSample>, AssemblyStats) {
    let mut samples = Vec::new();
    let mut stats = AssemblyStats::default();

    for speaker in speakers {
        for path in &speaker.files {
            debug!(file = %path.display(), "extracting features");
            let features = match extract_file(path, cfg) {
                Ok(f) => f,
                Err(e) => {
                    warn!(file = %path.display(), error = %e, "skipping sample");
                    stats.skipped += 1;
                    continue;
                }
            };
            samples.push(LabeledSample::new(features, speaker.label.clone()));
            stats.extracted += 1;
        }
    }

    (samples, stats)
}

fn extract_file(path: &Path, cfg: &MfccConfig) -> Result<Vec<f64>> {
    let waveform = voxlab_audio::read_wav(path)?;
    Ok(voxlab_features::extract(&waveform, cfg)?)
}
