// ============================================================
// Layer 1 — CLI Commands and Arguments
// ============================================================
// Defines the two subcommands: `train` and `classify`
// and all their configurable flags. Defaults reproduce the
// reference fine-tuning run (distilbert-base-uncased tokenizer,
// max length 64, lr 2e-5, batch 32, 2 epochs, 80/20 split).
//
// Reference: Rust Book §12 (Building a CLI Program)

use std::path::PathBuf;

use clap::{ArgAction, Args, Subcommand, ValueEnum};

use crate::application::train_use_case::PipelineConfig;
use crate::domain::arguments::{EvaluationStrategy, TrainingArguments};

/// The two top-level subcommands available to the user
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Fine-tune the classifier on a tweets CSV and report test metrics
    Train(TrainArgs),

    /// Classify a text with a trained model
    Classify(ClassifyArgs),
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum EvalStrategyArg {
    Epoch,
    No,
}

impl From<EvalStrategyArg> for EvaluationStrategy {
    fn from(s: EvalStrategyArg) -> Self {
        match s {
            EvalStrategyArg::Epoch => EvaluationStrategy::Epoch,
            EvalStrategyArg::No    => EvaluationStrategy::No,
        }
    }
}

/// All arguments for the `train` command.
#[derive(Args, Debug)]
pub struct TrainArgs {
    /// CSV with `text` and `target` columns
    #[arg(long, default_value = "train.csv")]
    pub data_path: PathBuf,

    /// Hub identifier (or local directory) of the pretrained
    /// tokenizer and encoder weights
    #[arg(long, default_value = "distilbert-base-uncased")]
    pub model_name: String,

    /// Build a word-level vocabulary from the training texts
    /// instead of downloading the pretrained tokenizer; the
    /// encoder then starts from random weights
    #[arg(long)]
    pub build_vocab: bool,

    /// Use the pretrained tokenizer but not the pretrained weights
    #[arg(long)]
    pub from_scratch: bool,

    /// Vocabulary cap when --build-vocab is set
    #[arg(long, default_value_t = 30522)]
    pub vocab_size: usize,

    /// Tokens per input sequence after truncation / padding
    #[arg(long, default_value_t = 64)]
    pub max_seq_len: usize,

    /// Share of cleaned records used for training
    #[arg(long, default_value_t = 0.8)]
    pub train_fraction: f64,

    /// Seed for the train/test shuffle and the training loader
    #[arg(long, default_value_t = 42)]
    pub seed: u64,

    /// Checkpoints (checkpoint-<step>/) go here
    #[arg(long, default_value = "results")]
    pub output_dir: PathBuf,

    /// Per-epoch metrics CSV goes here
    #[arg(long, default_value = "logs")]
    pub logging_dir: PathBuf,

    /// Final weights and run config go here
    #[arg(long, default_value = "results")]
    pub model_dir: PathBuf,

    #[arg(long, default_value = "results")]
    pub tokenizer_dir: PathBuf,

    /// Raw parameter snapshot (".bin" is appended)
    #[arg(long, default_value = "results/model_state")]
    pub snapshot_path: PathBuf,

    #[arg(long, default_value_t = 2e-5)]
    pub learning_rate: f64,

    #[arg(long, default_value_t = 32)]
    pub train_batch_size: usize,

    #[arg(long, default_value_t = 32)]
    pub eval_batch_size: usize,

    #[arg(long, default_value_t = 2)]
    pub epochs: usize,

    #[arg(long, default_value_t = 0.01)]
    pub weight_decay: f64,

    /// Half-precision checkpoints (`--fp16 false` for full precision)
    #[arg(long, default_value_t = true, action = ArgAction::Set)]
    pub fp16: bool,

    /// Maximum number of epoch checkpoints kept on disk
    #[arg(long, default_value_t = 1)]
    pub save_total_limit: usize,

    /// Log the running training loss every N steps
    #[arg(long, default_value_t = 9)]
    pub logging_steps: usize,

    #[arg(long, value_enum, default_value_t = EvalStrategyArg::Epoch)]
    pub evaluation_strategy: EvalStrategyArg,

    /// Hidden dimension of the transformer when it is not pretrained
    /// d_model must be divisible by num_heads
    #[arg(long, default_value_t = 256)]
    pub d_model: usize,

    #[arg(long, default_value_t = 8)]
    pub num_heads: usize,

    #[arg(long, default_value_t = 4)]
    pub num_layers: usize,

    /// Inner dimension of the feed-forward network
    #[arg(long, default_value_t = 1024)]
    pub d_ff: usize,

    #[arg(long, default_value_t = 0.1)]
    pub dropout: f64,
}

/// Convert CLI TrainArgs into the application-layer PipelineConfig.
/// The application layer never sees clap types.
impl From<TrainArgs> for PipelineConfig {
    fn from(a: TrainArgs) -> Self {
        PipelineConfig {
            data_path:      a.data_path,
            model_name:     a.model_name,
            build_vocab:    a.build_vocab,
            from_scratch:   a.from_scratch,
            vocab_size:     a.vocab_size,
            max_seq_len:    a.max_seq_len,
            train_fraction: a.train_fraction,
            model_dir:      a.model_dir,
            tokenizer_dir:  a.tokenizer_dir,
            snapshot_path:  a.snapshot_path,
            d_model:        a.d_model,
            num_heads:      a.num_heads,
            num_layers:     a.num_layers,
            d_ff:           a.d_ff,
            dropout:        a.dropout,
            training: TrainingArguments {
                output_dir:                  a.output_dir,
                logging_dir:                 a.logging_dir,
                learning_rate:               a.learning_rate,
                per_device_train_batch_size: a.train_batch_size,
                per_device_eval_batch_size:  a.eval_batch_size,
                num_train_epochs:            a.epochs,
                weight_decay:                a.weight_decay,
                fp16:                        a.fp16,
                save_total_limit:            a.save_total_limit,
                logging_steps:               a.logging_steps,
                evaluation_strategy:         a.evaluation_strategy.into(),
                seed:                        a.seed,
            },
        }
    }
}

/// All arguments for the `classify` command
#[derive(Args, Debug)]
pub struct ClassifyArgs {
    /// The text to classify
    #[arg(long)]
    pub text: String,

    /// Directory a `train` run saved its model into
    #[arg(long, default_value = "results")]
    pub model_dir: PathBuf,
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::Cli;
    use clap::Parser;

    fn train_config(argv: &[&str]) -> PipelineConfig {
        let cli = Cli::try_parse_from(argv).unwrap();
        match cli.command {
            Commands::Train(args) => args.into(),
            other => panic!("expected train, got {other:?}"),
        }
    }

    #[test]
    fn test_train_defaults_match_pipeline_defaults() {
        assert_eq!(train_config(&["tweet-classifier", "train"]), PipelineConfig::default());
    }

    #[test]
    fn test_train_flags_override() {
        let cfg = train_config(&[
            "tweet-classifier", "train",
            "--epochs", "3",
            "--fp16", "false",
            "--build-vocab",
            "--from-scratch",
            "--evaluation-strategy", "no",
        ]);
        assert_eq!(cfg.training.num_train_epochs, 3);
        assert!(!cfg.training.fp16);
        assert!(cfg.build_vocab);
        assert!(cfg.from_scratch);
        assert!(!cfg.uses_pretrained_weights());
        assert_eq!(cfg.training.evaluation_strategy, EvaluationStrategy::No);
    }

    #[test]
    fn test_classify_requires_text() {
        assert!(Cli::try_parse_from(["tweet-classifier", "classify"]).is_err());
        let cli = Cli::try_parse_from(["tweet-classifier", "classify", "--text", "fire!"]).unwrap();
        assert!(matches!(cli.command, Commands::Classify(ClassifyArgs { ref text, .. }) if text == "fire!"));
    }
}
