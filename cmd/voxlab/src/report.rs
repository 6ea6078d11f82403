//! Run report: serialized summary of one research run.

use std::collections::BTreeMap;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Serialize;

use voxlab_model::Evaluation;

/// JSON-serializable summary of a train/evaluate run.
#[derive(Debug, Serialize)]
pub struct RunReport {
    pub accuracy: f64,
    /// Sparse confusion counts, truth -> predicted -> count.
    pub confusion: BTreeMap<String, BTreeMap<String, usize>>,
    /// Training vector count per speaker.
    pub speakers: BTreeMap<String, usize>,
    pub train_samples: usize,
    pub test_samples: usize,
    pub skipped_files: usize,
}

impl RunReport {
    pub fn new(
        eval: &Evaluation,
        speakers: BTreeMap<String, usize>,
        train_samples: usize,
        test_samples: usize,
        skipped_files: usize,
    ) -> Self {
        Self {
            accuracy: eval.accuracy,
            confusion: eval.confusion.clone(),
            speakers,
            train_samples,
            test_samples,
            skipped_files,
        }
    }
}

/// Writes the report as pretty-printed JSON.
pub fn save_report(report: &RunReport, path: &Path) -> Result<()> {
    let json = serde_json::to_string_pretty(report)?;
    std::fs::write(path, json)
        .with_context(|| format!("cannot write report to {}", path.display()))?;
    Ok(())
}

/// Prints a human-readable summary to stdout.
pub fn print_summary(report: &RunReport) {
    println!("=== Evaluation ===");
    println!(
        "accuracy: {:.2} ({} train / {} test, {} skipped)",
        report.accuracy, report.train_samples, report.test_samples, report.skipped_files
    );

    println!("confusion matrix (truth -> predicted: count):");
    for (truth, row) in &report.confusion {
        for (predicted, count) in row {
            println!("  {truth} -> {predicted}: {count}");
        }
    }
}
