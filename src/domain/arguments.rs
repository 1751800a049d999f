// ============================================================
// Layer 3 — Training Arguments
// ============================================================
// The hyperparameters and output locations of one fine-tuning
// run. Set once before training starts and never mutated after.
//
// validate() rejects inconsistent values up front:
//   learning rate   positive and finite
//   weight decay    >= 0
//   batch sizes, epochs, save limit, logging interval  >= 1

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use thiserror::Error;

// ─── Evaluation strategy ─────────────────────────────────────────────────────
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EvaluationStrategy {
    /// Evaluate on the test set at the end of every epoch
    Epoch,
    /// Only the final evaluation after training
    No,
}

// ─── Argument errors ─────────────────────────────────────────────────────────
#[derive(Debug, Error, PartialEq)]
pub enum ArgumentsError {
    #[error("learning rate must be positive and finite, got {0}")]
    LearningRate(f64),

    #[error("{name} must be at least 1")]
    Zero { name: &'static str },

    #[error("weight decay must be non-negative, got {0}")]
    WeightDecay(f64),
}

// ─── TrainingArguments ───────────────────────────────────────────────────────
/// Hyperparameters and output locations for one fine-tuning run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrainingArguments {
    pub output_dir:                  PathBuf,
    pub logging_dir:                 PathBuf,
    pub learning_rate:               f64,
    pub per_device_train_batch_size: usize,
    pub per_device_eval_batch_size:  usize,
    pub num_train_epochs:            usize,
    pub weight_decay:                f64,
    /// Store checkpoints at half precision
    pub fp16:                        bool,
    /// Keep at most this many epoch checkpoints (oldest removed first)
    pub save_total_limit:            usize,
    /// Log the running training loss every N optimisation steps
    pub logging_steps:               usize,
    pub evaluation_strategy:         EvaluationStrategy,
    pub seed:                        u64,
}

impl Default for TrainingArguments {
    fn default() -> Self {
        Self {
            output_dir:                  PathBuf::from("results"),
            logging_dir:                 PathBuf::from("logs"),
            learning_rate:               2e-5,
            per_device_train_batch_size: 32,
            per_device_eval_batch_size:  32,
            num_train_epochs:            2,
            weight_decay:                0.01,
            fp16:                        true,
            save_total_limit:            1,
            logging_steps:               9,
            evaluation_strategy:         EvaluationStrategy::Epoch,
            seed:                        42,
        }
    }
}

impl TrainingArguments {
    pub fn validate(&self) -> Result<(), ArgumentsError> {
        if !(self.learning_rate.is_finite() && self.learning_rate > 0.0) {
            return Err(ArgumentsError::LearningRate(self.learning_rate));
        }
        if !(self.weight_decay.is_finite() && self.weight_decay >= 0.0) {
            return Err(ArgumentsError::WeightDecay(self.weight_decay));
        }

        let counts = [
            ("per_device_train_batch_size", self.per_device_train_batch_size),
            ("per_device_eval_batch_size",  self.per_device_eval_batch_size),
            ("num_train_epochs",            self.num_train_epochs),
            ("save_total_limit",            self.save_total_limit),
            ("logging_steps",               self.logging_steps),
        ];
        match counts.iter().find(|(_, v)| *v == 0) {
            Some((name, _)) => Err(ArgumentsError::Zero { name: *name }),
            None => Ok(()),
        }
    }
}
