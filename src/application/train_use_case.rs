// ============================================================
// Layer 2 — TrainUseCase
// ============================================================
// Orchestrates the full fine-tuning pipeline in order:
//
//   Step 1: Load the tweets CSV            (Layer 4 - data)
//   Step 2: Filter, clean and split        (Layer 4 - data)
//   Step 3: Acquire the tokenizer and the
//           pretrained encoder weights     (Layer 6 - infra)
//   Step 4: Encode both partitions         (Layer 4 - data)
//   Step 5: Fine-tune + evaluate           (Layer 5 - ml, via traits)
//   Step 6: Full evaluation report         (Layer 3 - domain)
//   Step 7: Persist model, tokenizer,
//           snapshot and run config        (Layer 6 - infra)
//
// Steps 4–7 are generic over TextEncoder / ClassifierTrainer /
// Persistable so the whole workflow runs in tests without a GPU.
//
// Reference: Rust Book §13 (Iterators and Closures)
//            Burn Book §5 (Training)

use std::path::PathBuf;

use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};
use tokenizers::Tokenizer;

use crate::application::training::TrainingOrchestrator;
use crate::domain::arguments::TrainingArguments;
use crate::data::{
    encoder::{EncoderAdapter, DEFAULT_MAX_SEQ_LEN},
    loader::CsvLoader,
    preparer::DatasetPreparer,
};
use crate::domain::metrics::{EvalMetrics, EvaluationReport};
use crate::domain::record::SplitDataset;
use crate::domain::traits::{ClassifierTrainer, Persistable, RecordSource, TextEncoder};
use crate::infra::{
    checkpoint::CheckpointManager,
    pretrained_store::PretrainedModel,
    tokenizer_store::TokenizerStore,
};
use crate::ml::{model::ClassifierConfig, trainer::{BurnTrainer, TrainBackend}};

// ─── Pipeline Configuration ──────────────────────────────────────────────────
// Everything a run needs, saved as train_config.json next to the
// model so `classify` can rebuild the same preprocessing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub data_path:      PathBuf,
    /// Hub identifier (or local directory) of the pretrained
    /// tokenizer and encoder weights
    pub model_name:     String,
    /// Build a word-level vocabulary from the training texts instead;
    /// the encoder is then randomly initialised
    pub build_vocab:    bool,
    /// Keep the pretrained tokenizer but initialise the encoder randomly
    pub from_scratch:   bool,
    /// Vocabulary cap for the word-level tokenizer
    pub vocab_size:     usize,
    pub max_seq_len:    usize,
    pub train_fraction: f64,
    pub model_dir:      PathBuf,
    pub tokenizer_dir:  PathBuf,
    pub snapshot_path:  PathBuf,
    pub d_model:        usize,
    pub num_heads:      usize,
    pub num_layers:     usize,
    pub d_ff:           usize,
    pub dropout:        f64,
    pub training:       TrainingArguments,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            data_path:      PathBuf::from("train.csv"),
            model_name:     "distilbert-base-uncased".to_string(),
            build_vocab:    false,
            from_scratch:   false,
            vocab_size:     30522,
            max_seq_len:    DEFAULT_MAX_SEQ_LEN,
            train_fraction: 0.8,
            model_dir:      PathBuf::from("results"),
            tokenizer_dir:  PathBuf::from("results"),
            snapshot_path:  PathBuf::from("results/model_state"),
            d_model:        256,
            num_heads:      8,
            num_layers:     4,
            d_ff:           1024,
            dropout:        0.1,
            training:       TrainingArguments::default(),
        }
    }
}

impl PipelineConfig {
    /// Classifier architecture for an encoder with `vocab_size` ids.
    pub fn model_config(&self, vocab_size: usize) -> ClassifierConfig {
        ClassifierConfig::binary(vocab_size, self.max_seq_len)
            .with_d_model(self.d_model)
            .with_num_heads(self.num_heads)
            .with_num_layers(self.num_layers)
            .with_d_ff(self.d_ff)
            .with_dropout(self.dropout)
    }

    /// Whether the encoder starts from the pretrained checkpoint.
    pub fn uses_pretrained_weights(&self) -> bool {
        !self.build_vocab && !self.from_scratch
    }
}

// ─── Pipeline Results ────────────────────────────────────────────────────────
/// What a run reports back to the CLI.
#[derive(Debug, Clone)]
pub struct PipelineReport {
    pub cleaned:      usize,
    pub train:        usize,
    pub test:         usize,
    pub eval_metrics: EvalMetrics,
    pub evaluation:   EvaluationReport,
}

pub struct PipelineOutcome<M> {
    pub report: PipelineReport,
    pub model:  M,
}

// ─── Pipeline Stages ─────────────────────────────────────────────────────────

/// Steps 1–2: read the CSV and produce the cleaned train/test split.
pub fn prepare_dataset(cfg: &PipelineConfig) -> Result<SplitDataset> {
    tracing::info!("Loading tweets from '{}'", cfg.data_path.display());
    let raw = CsvLoader::new(&cfg.data_path).load_all()?;

    let split = DatasetPreparer::new(cfg.train_fraction, cfg.training.seed).prepare(raw)?;
    tracing::info!(
        "Split: {} train, {} test ({} cleaned records)",
        split.train.len(),
        split.test.len(),
        split.total()
    );
    Ok(split)
}

/// Step 3: the pretrained tokenizer, or a word-level one built from
/// the training partition.
pub fn acquire_tokenizer(cfg: &PipelineConfig, split: &SplitDataset) -> Result<Tokenizer> {
    if cfg.build_vocab {
        let texts: Vec<String> = split.train.iter().map(|r| r.cleaned_text.clone()).collect();
        TokenizerStore::new(&cfg.tokenizer_dir).build_word_level(&texts, cfg.vocab_size)
    } else {
        TokenizerStore::from_pretrained(&cfg.model_name)
    }
}

/// Step 3: the classifier architecture, plus the encoder weights to
/// start from. Pretrained runs take the checkpoint's architecture;
/// the others use the pipeline's own dimensions with random init.
pub fn acquire_model(cfg: &PipelineConfig, vocab_size: usize) -> Result<(ClassifierConfig, Option<PathBuf>)> {
    if !cfg.uses_pretrained_weights() {
        tracing::info!("Encoder is randomly initialised");
        return Ok((cfg.model_config(vocab_size), None));
    }

    let pretrained = PretrainedModel::fetch(&cfg.model_name)?;
    let hub        = &pretrained.config;
    if vocab_size > hub.vocab_size {
        bail!(
            "tokenizer has {vocab_size} ids but '{}' embeds only {}",
            cfg.model_name,
            hub.vocab_size
        );
    }
    if cfg.max_seq_len > hub.max_position_embeddings {
        bail!(
            "max_seq_len {} exceeds the {} positions of '{}'",
            cfg.max_seq_len,
            hub.max_position_embeddings,
            cfg.model_name
        );
    }
    Ok((hub.classifier_config(), Some(pretrained.weights)))
}

/// Steps 4–6: encode, fine-tune, evaluate and build the full report.
pub fn train_and_evaluate<E, T>(
    cfg:     &PipelineConfig,
    split:   &SplitDataset,
    encoder: &E,
    trainer: &mut T,
) -> Result<PipelineOutcome<T::Model>>
where
    E: TextEncoder,
    T: ClassifierTrainer,
{
    let adapter = EncoderAdapter::new(encoder, cfg.max_seq_len)?;
    let train   = adapter.encode_all(&split.train)?;
    let test    = adapter.encode_all(&split.test)?;
    tracing::info!("Encoded {} train / {} test records", train.len(), test.len());

    let orchestrator = TrainingOrchestrator::new(cfg.training.clone())?;
    let outcome      = orchestrator.run(trainer, &train, &test)?;

    let evaluation = EvaluationReport::from_predictions(&outcome.predictions);
    tracing::info!(
        "Test set: weighted F1={:.4}, precision={:.4}, recall={:.4}, AUC={:.4}",
        evaluation.weighted_f1,
        evaluation.precision,
        evaluation.recall,
        evaluation.auc
    );

    Ok(PipelineOutcome {
        report: PipelineReport {
            cleaned:      split.total(),
            train:        split.train.len(),
            test:         split.test.len(),
            eval_metrics: outcome.eval_metrics,
            evaluation,
        },
        model: outcome.model,
    })
}

/// Step 7: write weights, tokenizer, raw snapshot and run config.
pub fn persist_artifacts<M, E>(cfg: &PipelineConfig, model: &M, encoder: &E) -> Result<()>
where
    M: Persistable,
    E: TextEncoder,
{
    model.save_pretrained(&cfg.model_dir)?;
    encoder.save_pretrained(&cfg.tokenizer_dir)?;
    model.save_snapshot(&cfg.snapshot_path)?;
    CheckpointManager::new(&cfg.model_dir).save_config(cfg)?;

    tracing::info!(
        "Saved model to '{}', tokenizer to '{}'",
        cfg.model_dir.display(),
        cfg.tokenizer_dir.display()
    );
    Ok(())
}

// ─── TrainUseCase ─────────────────────────────────────────────────────────────
// Owns the config and runs the full pipeline on the WGPU backend.
pub struct TrainUseCase {
    config: PipelineConfig,
}

impl TrainUseCase {
    pub fn new(config: PipelineConfig) -> Self {
        Self { config }
    }

    /// Execute the full training pipeline end to end
    pub fn execute(&self) -> Result<PipelineReport> {
        let cfg = &self.config;

        let split     = prepare_dataset(cfg)?;
        let tokenizer = acquire_tokenizer(cfg, &split)?;

        let device = burn::backend::wgpu::WgpuDevice::default();
        tracing::info!("Using WGPU device: {:?}", device);

        let (model_config, weights) = acquire_model(cfg, TextEncoder::vocab_size(&tokenizer))?;
        let mut trainer = BurnTrainer::<TrainBackend>::new(model_config, device);
        if let Some(weights) = weights {
            trainer = trainer.with_pretrained(weights);
        }

        let outcome = train_and_evaluate(cfg, &split, &tokenizer, &mut trainer)?;
        persist_artifacts(cfg, &outcome.model, &tokenizer)?;

        Ok(outcome.report)
    }
}
