// ============================================================
// Layer 6 — Epoch Metrics Logger
// ============================================================
// Records one CSV row per training epoch in the logging directory.
//
// Metrics recorded per epoch:
//   - epoch:         the epoch number (1, 2, ...)
//   - step:          global optimisation step at the end of the epoch
//   - train_loss:    mean cross-entropy over the epoch's batches
//   - eval_loss:     mean cross-entropy on the test set
//   - eval_f1:       weighted F1 on the test set
//   - eval_accuracy: fraction of test records classified correctly
//
// Output file: logs/metrics.csv
//
// Example CSV output:
//   epoch,step,train_loss,eval_loss,eval_f1,eval_accuracy
//   1,9,0.612300,0.548100,0.731200,0.742000
//   2,18,0.455900,0.471000,0.781500,0.789000
//
// Evaluation columns are left empty when no evaluation ran that epoch.
//
// Reference: Rust Book §12 (I/O and File Handling)

use anyhow::{Context, Result};
use std::{
    fs::{self, OpenOptions},
    io::Write,
    path::{Path, PathBuf},
};
use serde::{Deserialize, Serialize};

const HEADER: &str = "epoch,step,train_loss,eval_loss,eval_f1,eval_accuracy";

/// One row of metrics data for a single training epoch
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EpochMetrics {
    pub epoch:         usize,
    pub step:          usize,
    pub train_loss:    f64,
    pub eval_loss:     Option<f64>,
    pub eval_f1:       Option<f64>,
    pub eval_accuracy: Option<f64>,
}

impl EpochMetrics {
    pub fn new(epoch: usize, step: usize, train_loss: f64) -> Self {
        Self { epoch, step, train_loss, eval_loss: None, eval_f1: None, eval_accuracy: None }
    }

    pub fn with_eval(mut self, loss: f64, f1: f64, accuracy: f64) -> Self {
        self.eval_loss     = Some(loss);
        self.eval_f1       = Some(f1);
        self.eval_accuracy = Some(accuracy);
        self
    }

    /// The per-epoch line printed during training.
    pub fn summary(&self, total_epochs: usize) -> String {
        let mut line = format!(
            "Epoch {:>3}/{} | step {:>5} | train_loss={:.4}",
            self.epoch, total_epochs, self.step, self.train_loss
        );
        if let (Some(loss), Some(f1), Some(acc)) = (self.eval_loss, self.eval_f1, self.eval_accuracy) {
            line.push_str(&format!(
                " | eval_loss={:.4} | eval_f1={:.4} | eval_acc={:.1}%",
                loss, f1, acc * 100.0
            ));
        }
        line
    }

    fn csv_row(&self) -> String {
        let opt = |v: Option<f64>| v.map(|x| format!("{x:.6}")).unwrap_or_default();
        format!(
            "{},{},{:.6},{},{},{}",
            self.epoch,
            self.step,
            self.train_loss,
            opt(self.eval_loss),
            opt(self.eval_f1),
            opt(self.eval_accuracy),
        )
    }
}

/// Appends epoch metrics to `metrics.csv` in a directory.
pub struct MetricsLogger {
    csv_path: PathBuf,
}

impl MetricsLogger {
    /// Create the directory and start a fresh CSV with its header.
    pub fn new(dir: impl AsRef<Path>) -> Result<Self> {
        let dir = dir.as_ref();
        fs::create_dir_all(dir)
            .with_context(|| format!("Cannot create logging directory '{}'", dir.display()))?;

        let csv_path = dir.join("metrics.csv");
        let mut f = fs::File::create(&csv_path)
            .with_context(|| format!("Cannot create '{}'", csv_path.display()))?;
        writeln!(f, "{HEADER}")?;
        tracing::debug!("Created metrics CSV: '{}'", csv_path.display());

        Ok(Self { csv_path })
    }

    /// Append one epoch's metrics as a new row in the CSV.
    pub fn log(&self, m: &EpochMetrics) -> Result<()> {
        let mut f = OpenOptions::new()
            .append(true)
            .open(&self.csv_path)
            .with_context(|| format!("Cannot open '{}'", self.csv_path.display()))?;
        writeln!(f, "{}", m.csv_row())?;

        tracing::debug!("Logged epoch {} metrics: train_loss={:.4}", m.epoch, m.train_loss);
        Ok(())
    }

    pub fn csv_path(&self) -> &Path {
        &self.csv_path
    }
}
