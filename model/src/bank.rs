use std::collections::BTreeMap;

use tracing::{info, warn};

use crate::dataset::{group_by_label, LabeledSample};
use crate::{DiagGmm, GmmConfig, ModelError};

/// One fitted density model per speaker.
///
/// Keys are exactly the labels present in the training samples; a
/// label the bank never saw can never be predicted. The bank is built
/// once per training run and only read afterwards; refitting means
/// rebuilding the whole bank.
#[derive(Debug, Clone)]
pub struct ModelBank {
    models: BTreeMap<String, DiagGmm>,
    dim: usize,
}

impl ModelBank {
    /// Fits one mixture per distinct label.
    ///
    /// All vectors for a speaker are used (no subsampling). A speaker
    /// with fewer vectors than mixture components still gets a model,
    /// but is flagged as low-confidence in the log; the resulting
    /// covariances are unreliable and the caller is responsible for
    /// supplying adequate data.
    pub fn fit(samples: &[LabeledSample], cfg: &GmmConfig) -> Result<Self, ModelError> {
        if samples.is_empty() {
            return Err(ModelError::EmptyInput);
        }
        let dim = samples[0].features.len();
        for s in samples {
            if s.features.len() != dim {
                return Err(ModelError::DimensionMismatch {
                    expected: dim,
                    got: s.features.len(),
                });
            }
        }

        let mut models = BTreeMap::new();
        for (label, vectors) in group_by_label(samples) {
            info!(speaker = %label, vectors = vectors.len(), "fitting speaker model");
            if vectors.len() < cfg.n_components {
                warn!(
                    speaker = %label,
                    vectors = vectors.len(),
                    components = cfg.n_components,
                    "insufficient training data, model will be low-confidence"
                );
            }
            let model = DiagGmm::fit(&vectors, cfg)?;
            models.insert(label, model);
        }

        Ok(Self { models, dim })
    }

    /// Returns the label whose model assigns the highest log-likelihood.
    ///
    /// Ties break toward the lexically smaller label: the bank scans
    /// its sorted map and only a strictly greater score displaces the
    /// current best. This ordering is part of the contract so results
    /// stay reproducible across runs.
    ///
    /// Closed-set by design: some label is always returned, even when
    /// every score is implausibly low. There is no reject outcome.
    pub fn identify(&self, vector: &[f64]) -> Result<&str, ModelError> {
        if vector.len() != self.dim {
            return Err(ModelError::DimensionMismatch {
                expected: self.dim,
                got: vector.len(),
            });
        }

        let mut best: Option<(&str, f64)> = None;
        for (label, model) in &self.models {
            let score = model.log_likelihood(vector)?;
            match best {
                Some((_, top)) if score <= top => {}
                _ => best = Some((label, score)),
            }
        }
        // Fit rejects empty input, so the bank always holds a model.
        best.map(|(label, _)| label).ok_or(ModelError::EmptyInput)
    }

    /// Labels in lexical order.
    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.models.keys().map(String::as_str)
    }

    /// Number of speaker models in the bank.
    pub fn len(&self) -> usize {
        self.models.len()
    }

    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }

    /// Feature dimensionality the bank was fit on.
    pub fn dimension(&self) -> usize {
        self.dim
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    fn speaker_samples(
        label: &str,
        center: &[f64],
        count: usize,
        seed: u64,
    ) -> Vec<LabeledSample> {
        let mut rng = StdRng::seed_from_u64(seed);
        (0..count)
            .map(|_| {
                let features = center
                    .iter()
                    .map(|&c| c + rng.gen_range(-0.5..0.5))
                    .collect();
                LabeledSample::new(features, label)
            })
            .collect()
    }

    fn two_speaker_bank() -> (ModelBank, Vec<LabeledSample>) {
        let mut samples = speaker_samples("alice", &[0.0, 0.0, 0.0], 20, 1);
        samples.extend(speaker_samples("bob", &[10.0, 10.0, 10.0], 20, 2));
        let bank = ModelBank::fit(&samples, &GmmConfig::default()).unwrap();
        (bank, samples)
    }

    #[test]
    fn fit_empty_fails() {
        assert!(matches!(
            ModelBank::fit(&[], &GmmConfig::default()),
            Err(ModelError::EmptyInput)
        ));
    }

    #[test]
    fn fit_rejects_mixed_dimensions() {
        let samples = vec![
            LabeledSample::new(vec![1.0, 2.0], "a"),
            LabeledSample::new(vec![1.0], "b"),
        ];
        assert!(matches!(
            ModelBank::fit(&samples, &GmmConfig::default()),
            Err(ModelError::DimensionMismatch {
                expected: 2,
                got: 1
            })
        ));
    }

    #[test]
    fn bank_keys_are_training_labels() {
        let (bank, _) = two_speaker_bank();
        let labels: Vec<&str> = bank.labels().collect();
        assert_eq!(labels, ["alice", "bob"]);
        assert_eq!(bank.len(), 2);
        assert_eq!(bank.dimension(), 3);
    }

    #[test]
    fn identify_memorizes_training_vectors() {
        // A vector equal to one of alice's training vectors must come
        // back as alice.
        let (bank, samples) = two_speaker_bank();
        for s in samples.iter().filter(|s| s.label == "alice") {
            assert_eq!(bank.identify(&s.features).unwrap(), "alice");
        }
        for s in samples.iter().filter(|s| s.label == "bob") {
            assert_eq!(bank.identify(&s.features).unwrap(), "bob");
        }
    }

    #[test]
    fn identify_always_answers() {
        let (bank, _) = two_speaker_bank();
        // Far from both speakers: still one of the known labels.
        let label = bank.identify(&[-1000.0, 500.0, 123.0]).unwrap();
        assert!(label == "alice" || label == "bob");
    }

    #[test]
    fn identify_tie_breaks_lexically() {
        // Identical training data for both labels produces identical
        // models, so every probe scores a tie.
        let vectors = speaker_samples("zed", &[1.0, 1.0], 20, 3);
        let mut samples: Vec<LabeledSample> = vectors
            .iter()
            .map(|s| LabeledSample::new(s.features.clone(), "apple"))
            .collect();
        samples.extend(
            vectors
                .iter()
                .map(|s| LabeledSample::new(s.features.clone(), "zed")),
        );

        let bank = ModelBank::fit(&samples, &GmmConfig::default()).unwrap();
        assert_eq!(bank.identify(&[1.0, 1.0]).unwrap(), "apple");
    }

    #[test]
    fn identify_dimension_mismatch() {
        let (bank, _) = two_speaker_bank();
        assert!(matches!(
            bank.identify(&[1.0, 2.0]),
            Err(ModelError::DimensionMismatch {
                expected: 3,
                got: 2
            })
        ));
    }

    #[test]
    fn sparse_speaker_still_modeled() {
        // 3 vectors for 8 components: degraded but present.
        let mut samples = speaker_samples("alice", &[0.0, 0.0], 20, 4);
        let tiny = speaker_samples("tiny", &[50.0, 50.0], 3, 5);
        samples.extend(tiny.clone());
        let bank = ModelBank::fit(&samples, &GmmConfig::default()).unwrap();
        assert_eq!(bank.len(), 2);
        // Own training vectors still come back despite the degenerate fit.
        assert_eq!(bank.identify(&tiny[0].features).unwrap(), "tiny");
    }
}
