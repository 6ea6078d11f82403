//! Per-speaker density modeling and closed-set identification.
//!
//! # Pipeline
//!
//! 1. [`dataset::split_train_test`]: labeled feature vectors -> train/test partitions
//! 2. [`ModelBank::fit`]: one diagonal Gaussian mixture per speaker
//! 3. [`ModelBank::identify`]: arg-max log-likelihood over all speakers
//! 4. [`evaluate`]: accuracy + sparse confusion matrix over prediction records
//!
//! Identification is closed-set: every probe is assigned to one of the
//! trained speakers, however implausible all likelihoods are. There is
//! no reject outcome.

mod bank;
pub mod dataset;
mod error;
mod eval;
mod gmm;

pub use bank::ModelBank;
pub use dataset::{split_train_test, LabeledSample};
pub use error::ModelError;
pub use eval::{evaluate, Evaluation, PredictionRecord};
pub use gmm::{DiagGmm, GmmConfig};
