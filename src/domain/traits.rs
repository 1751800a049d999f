// ============================================================
// Layer 3 — Core Traits (Abstractions)
// ============================================================
// The seams between the pipeline and its heavy collaborators:
//
//   RecordSource      — where raw rows come from (CSV today)
//   TextEncoder       — text → token ids (the pretrained tokenizer)
//   ClassifierTrainer — fit / predict / evaluate (Burn today)
//   Persistable       — a fitted model that can write itself out
//
// The application layer only ever talks to these traits, so
// tests swap in stub encoders and fixed-logit trainers without
// touching a tensor.
//
// Reference: Rust Book §10 (Traits: Defining Shared Behaviour)

use std::path::Path;

use anyhow::Result;

use crate::domain::arguments::TrainingArguments;
use crate::domain::metrics::{EvalMetrics, Predictions};
use crate::domain::record::{EncodedRecord, RawRecord};

// ─── RecordSource ─────────────────────────────────────────────────────────────
/// Any component that can produce the raw rows of a dataset.
pub trait RecordSource {
    fn load_all(&self) -> Result<Vec<RawRecord>>;
}

// ─── TextEncoder ──────────────────────────────────────────────────────────────
/// Maps text to token ids. Vocabulary and merge rules belong to the
/// implementation; fixed-length shaping is done by the EncoderAdapter.
pub trait TextEncoder {
    /// Token ids for `text`, including any special tokens the
    /// tokenizer adds (e.g. [CLS] ... [SEP]).
    fn encode_ids(&self, text: &str) -> Result<Vec<u32>>;

    /// Id used to pad sequences up to the fixed length.
    fn pad_id(&self) -> u32;

    /// Id that closes a sequence, kept as the last real token on truncation.
    fn sep_id(&self) -> Option<u32>;

    /// One more than the largest id the encoder can emit.
    fn vocab_size(&self) -> usize;

    /// Write vocabulary and configuration into `dir`.
    fn save_pretrained(&self, dir: &Path) -> Result<()>;
}

// ─── Persistable ──────────────────────────────────────────────────────────────
/// A fitted model whose parameters can be written to disk.
pub trait Persistable {
    /// Write weights and configuration into `dir`.
    fn save_pretrained(&self, dir: &Path) -> Result<()>;

    /// Write a raw snapshot of the parameters to a single file.
    fn save_snapshot(&self, path: &Path) -> Result<()>;
}

// ─── ClassifierTrainer ────────────────────────────────────────────────────────
/// Metrics callback the trainer runs on every evaluation pass.
pub type MetricsFn = fn(&Predictions) -> EvalMetrics;

/// The fine-tuning loop as a capability: the numerical work lives
/// behind this trait, the orchestrator only wires arguments in.
pub trait ClassifierTrainer {
    type Model: Persistable;

    /// Train on `train` for `args.num_train_epochs` epochs, evaluating on
    /// `eval` per `args.evaluation_strategy` with `compute_metrics`.
    fn fit(
        &mut self,
        train:           &[EncodedRecord],
        eval:            &[EncodedRecord],
        args:            &TrainingArguments,
        compute_metrics: MetricsFn,
    ) -> Result<Self::Model>;

    /// Raw logits for every record of `data`, in order.
    fn predict(
        &self,
        model: &Self::Model,
        data:  &[EncodedRecord],
        args:  &TrainingArguments,
    ) -> Result<Predictions>;

    /// Predict on `data` and reduce to the `eval_`-prefixed metrics dictionary.
    fn evaluate(
        &self,
        model:           &Self::Model,
        data:            &[EncodedRecord],
        args:            &TrainingArguments,
        compute_metrics: MetricsFn,
    ) -> Result<EvalMetrics> {
        let predictions = self.predict(model, data, args)?;
        let mut metrics = compute_metrics(&predictions);
        if let Some(loss) = predictions.loss {
            metrics.insert_scalar("loss", loss);
        }
        Ok(metrics.with_prefix("eval"))
    }
}
