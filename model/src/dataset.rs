//! Dataset assembly: labeled feature vectors and the train/test split.
//!
//! The collaborator feeding this module owns file layout and decoding;
//! here a dataset is just a flat list of (feature vector, label) pairs.

use std::collections::BTreeMap;

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

use crate::ModelError;

/// A feature vector tagged with its speaker label.
///
/// The label is an opaque dataset-provided key with no implied
/// ordering.
#[derive(Debug, Clone, PartialEq)]
pub struct LabeledSample {
    pub features: Vec<f64>,
    pub label: String,
}

impl LabeledSample {
    pub fn new(features: Vec<f64>, label: impl Into<String>) -> Self {
        Self {
            features,
            label: label.into(),
        }
    }
}

/// Splits samples into (train, test) with a deterministic seeded shuffle.
///
/// `test_fraction` must lie in (0, 1). The test partition holds
/// `ceil(n * test_fraction)` samples, capped so training is never
/// empty. Every input sample lands in exactly one partition.
pub fn split_train_test(
    mut samples: Vec<LabeledSample>,
    test_fraction: f64,
    seed: u64,
) -> Result<(Vec<LabeledSample>, Vec<LabeledSample>), ModelError> {
    if !(0.0..1.0).contains(&test_fraction) || test_fraction == 0.0 {
        return Err(ModelError::Config(format!(
            "test_fraction must be in (0, 1), got {test_fraction}"
        )));
    }
    if samples.is_empty() {
        return Err(ModelError::EmptyInput);
    }

    let mut rng = StdRng::seed_from_u64(seed);
    samples.shuffle(&mut rng);

    let n = samples.len();
    let n_test = ((n as f64 * test_fraction).ceil() as usize).min(n - 1);
    let test = samples.split_off(n - n_test);
    Ok((samples, test))
}

/// Groups feature vectors by label, preserving every vector.
///
/// The returned map iterates labels in lexical order.
pub fn group_by_label(samples: &[LabeledSample]) -> BTreeMap<String, Vec<Vec<f64>>> {
    let mut groups: BTreeMap<String, Vec<Vec<f64>>> = BTreeMap::new();
    for s in samples {
        groups
            .entry(s.label.clone())
            .or_default()
            .push(s.features.clone());
    }
    groups
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_samples(count: usize) -> Vec<LabeledSample> {
        (0..count)
            .map(|i| LabeledSample::new(vec![i as f64], format!("spk{}", i % 3)))
            .collect()
    }

    #[test]
    fn split_rejects_empty() {
        assert!(matches!(
            split_train_test(vec![], 0.2, 42),
            Err(ModelError::EmptyInput)
        ));
    }

    #[test]
    fn split_rejects_bad_fraction() {
        let samples = make_samples(10);
        for f in [0.0, 1.0, 1.5, -0.1] {
            assert!(
                matches!(
                    split_train_test(samples.clone(), f, 42),
                    Err(ModelError::Config(_))
                ),
                "fraction {f} should be rejected"
            );
        }
    }

    #[test]
    fn split_partitions_without_loss() {
        let samples = make_samples(25);
        let (train, test) = split_train_test(samples.clone(), 0.2, 42).unwrap();
        assert_eq!(train.len() + test.len(), 25);
        assert_eq!(test.len(), 5);

        // Every original sample appears exactly once across partitions.
        let mut seen: Vec<f64> = train
            .iter()
            .chain(&test)
            .map(|s| s.features[0])
            .collect();
        seen.sort_by(|a, b| a.partial_cmp(b).unwrap());
        let expected: Vec<f64> = (0..25).map(|i| i as f64).collect();
        assert_eq!(seen, expected);
    }

    #[test]
    fn split_is_deterministic() {
        let samples = make_samples(30);
        let (train_a, test_a) = split_train_test(samples.clone(), 0.2, 42).unwrap();
        let (train_b, test_b) = split_train_test(samples, 0.2, 42).unwrap();
        assert_eq!(train_a, train_b);
        assert_eq!(test_a, test_b);
    }

    #[test]
    fn split_changes_with_seed() {
        let samples = make_samples(30);
        let (_, test_a) = split_train_test(samples.clone(), 0.2, 1).unwrap();
        let (_, test_b) = split_train_test(samples, 0.2, 2).unwrap();
        assert_ne!(test_a, test_b, "different seeds should shuffle differently");
    }

    #[test]
    fn split_keeps_training_nonempty() {
        let samples = make_samples(2);
        let (train, test) = split_train_test(samples, 0.9, 42).unwrap();
        assert_eq!(train.len(), 1);
        assert_eq!(test.len(), 1);
    }

    #[test]
    fn group_by_label_preserves_all_vectors() {
        let samples = make_samples(9);
        let groups = group_by_label(&samples);
        assert_eq!(groups.len(), 3);
        let total: usize = groups.values().map(|v| v.len()).sum();
        assert_eq!(total, 9);

        let labels: Vec<&String> = groups.keys().collect();
        assert_eq!(labels, ["spk0", "spk1", "spk2"]);
    }
}
