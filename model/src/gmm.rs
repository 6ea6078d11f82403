use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

use crate::ModelError;

/// Variance floor applied during the M-step and at initialization.
const VAR_FLOOR: f64 = 1e-6;

/// Configures Gaussian mixture fitting.
#[derive(Debug, Clone)]
pub struct GmmConfig {
    /// Number of mixture components (default: 8).
    pub n_components: usize,
    /// Maximum EM iterations (default: 200).
    pub max_iter: usize,
    /// Convergence tolerance on mean per-sample log-likelihood (default: 1e-4).
    pub tol: f64,
    /// Seed for the deterministic initialization (default: 42).
    pub seed: u64,
}

impl Default for GmmConfig {
    fn default() -> Self {
        Self {
            n_components: 8,
            max_iter: 200,
            tol: 1e-4,
            seed: 42,
        }
    }
}

/// A diagonal-covariance Gaussian mixture density.
///
/// Fit once by EM, immutable afterwards. All likelihood work runs in
/// the log domain; per-component terms combine via log-sum-exp so
/// small densities never underflow.
#[derive(Debug, Clone)]
pub struct DiagGmm {
    weights: Vec<f64>,
    means: Vec<Vec<f64>>,
    vars: Vec<Vec<f64>>,
    dim: usize,
}

impl DiagGmm {
    /// Fits a mixture to the given vectors by expectation-maximization.
    ///
    /// Initialization is deterministic for a fixed `cfg.seed`: means
    /// are drawn from the data, weights start uniform, variances start
    /// at the per-dimension data variance. Fewer vectors than
    /// components is allowed and produces a degenerate fit; callers
    /// decide whether to warn (see `ModelBank::fit`).
    pub fn fit(data: &[Vec<f64>], cfg: &GmmConfig) -> Result<Self, ModelError> {
        if cfg.n_components == 0 {
            return Err(ModelError::Config("n_components must be positive".into()));
        }
        if cfg.max_iter == 0 {
            return Err(ModelError::Config("max_iter must be positive".into()));
        }
        if data.is_empty() {
            return Err(ModelError::EmptyInput);
        }
        let dim = data[0].len();
        if dim == 0 {
            return Err(ModelError::Config("feature vectors are empty".into()));
        }
        for row in data {
            if row.len() != dim {
                return Err(ModelError::DimensionMismatch {
                    expected: dim,
                    got: row.len(),
                });
            }
        }

        let n = data.len();
        let k = cfg.n_components;
        let mut rng = StdRng::seed_from_u64(cfg.seed);

        let mut model = Self::initialize(data, k, dim, &mut rng);

        let mut prev_mean_ll = f64::NEG_INFINITY;
        let mut resp = vec![0.0f64; n * k];
        let mut log_terms = vec![0.0f64; k];

        for _iter in 0..cfg.max_iter {
            // E-step: responsibilities and total log-likelihood.
            let mut total_ll = 0.0f64;
            for (i, x) in data.iter().enumerate() {
                for c in 0..k {
                    log_terms[c] = model.weights[c].ln() + model.log_gaussian(c, x);
                }
                let ll = log_sum_exp(&log_terms);
                total_ll += ll;
                for c in 0..k {
                    resp[i * k + c] = (log_terms[c] - ll).exp();
                }
            }

            // M-step: weights, means, variances from responsibilities.
            for c in 0..k {
                let mut nk = 0.0f64;
                for i in 0..n {
                    nk += resp[i * k + c];
                }
                nk = nk.max(1e-10);
                model.weights[c] = nk / n as f64;

                for j in 0..dim {
                    let mut acc = 0.0f64;
                    for (i, x) in data.iter().enumerate() {
                        acc += resp[i * k + c] * x[j];
                    }
                    model.means[c][j] = acc / nk;
                }

                for j in 0..dim {
                    let mut acc = 0.0f64;
                    for (i, x) in data.iter().enumerate() {
                        let d = x[j] - model.means[c][j];
                        acc += resp[i * k + c] * d * d;
                    }
                    model.vars[c][j] = (acc / nk).max(VAR_FLOOR);
                }
            }

            let mean_ll = total_ll / n as f64;
            if (mean_ll - prev_mean_ll).abs() < cfg.tol {
                break;
            }
            prev_mean_ll = mean_ll;
        }

        Ok(model)
    }

    /// Log-likelihood of a single vector under the mixture.
    pub fn log_likelihood(&self, x: &[f64]) -> Result<f64, ModelError> {
        if x.len() != self.dim {
            return Err(ModelError::DimensionMismatch {
                expected: self.dim,
                got: x.len(),
            });
        }
        let terms: Vec<f64> = (0..self.weights.len())
            .map(|c| self.weights[c].ln() + self.log_gaussian(c, x))
            .collect();
        Ok(log_sum_exp(&terms))
    }

    /// Feature dimensionality the mixture was fit on.
    pub fn dimension(&self) -> usize {
        self.dim
    }

    /// Number of mixture components.
    pub fn n_components(&self) -> usize {
        self.weights.len()
    }

    fn initialize(data: &[Vec<f64>], k: usize, dim: usize, rng: &mut StdRng) -> Self {
        let n = data.len();

        // Means: distinct data points when possible, resampled otherwise.
        let mut means = Vec::with_capacity(k);
        if n >= k {
            let mut idx: Vec<usize> = (0..n).collect();
            idx.shuffle(rng);
            for &i in idx.iter().take(k) {
                means.push(data[i].clone());
            }
        } else {
            for _ in 0..k {
                means.push(data[rng.gen_range(0..n)].clone());
            }
        }

        // Variances: per-dimension data variance, shared across components.
        let mut global_mean = vec![0.0f64; dim];
        for x in data {
            for j in 0..dim {
                global_mean[j] += x[j];
            }
        }
        for v in &mut global_mean {
            *v /= n as f64;
        }
        let mut global_var = vec![0.0f64; dim];
        for x in data {
            for j in 0..dim {
                let d = x[j] - global_mean[j];
                global_var[j] += d * d;
            }
        }
        for v in &mut global_var {
            *v = (*v / n as f64).max(VAR_FLOOR);
        }

        Self {
            weights: vec![1.0 / k as f64; k],
            means,
            vars: vec![global_var; k],
            dim,
        }
    }

    /// Log density of component `c` at `x`.
    fn log_gaussian(&self, c: usize, x: &[f64]) -> f64 {
        let mean = &self.means[c];
        let var = &self.vars[c];
        let mut acc = 0.0f64;
        for j in 0..self.dim {
            let d = x[j] - mean[j];
            acc += (2.0 * std::f64::consts::PI * var[j]).ln() + d * d / var[j];
        }
        -0.5 * acc
    }
}

/// Numerically stable log(sum(exp(terms))).
fn log_sum_exp(terms: &[f64]) -> f64 {
    let max = terms.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
    if !max.is_finite() {
        return max;
    }
    let sum: f64 = terms.iter().map(|&t| (t - max).exp()).sum();
    max + sum.ln()
}
