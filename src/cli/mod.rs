// ============================================================
// Layer 1 — CLI / Presentation Layer
// ============================================================
// This is the entry point for all user interaction.
// It uses the `clap` crate to parse command line arguments.
// All business logic is delegated to Layer 2 (application).
//
// Two commands are supported:
//   1. `train`    — fine-tunes on the tweets CSV and prints the
//                   evaluation (metrics, confusion matrix, ROC,
//                   classification report)
//   2. `classify` — loads the saved model and labels one text
//
// Reference: Rust Book §7 (Modules), §12 (CLI programs)

pub mod commands;
pub mod render;

use anyhow::Result;
use clap::Parser;
use commands::{ClassifyArgs, Commands, TrainArgs};

use crate::application::train_use_case::PipelineReport;

#[derive(Parser, Debug)]
#[command(
    name = "tweet-classifier",
    version = "0.1.0",
    about = "Fine-tune a transformer to tell disaster tweets from the rest, then classify new text."
)]
pub struct Cli {
    /// The subcommand to run (train or classify)
    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    /// Match on the subcommand and dispatch to the correct use case.
    pub fn run(self) -> Result<()> {
        match self.command {
            Commands::Train(args)    => run_train(args),
            Commands::Classify(args) => run_classify(args),
        }
    }
}

/// Handles the `train` subcommand.
fn run_train(args: TrainArgs) -> Result<()> {
    use crate::application::train_use_case::TrainUseCase;

    tracing::info!("Starting fine-tuning on: {}", args.data_path.display());

    let config    = args.into();
    let use_case  = TrainUseCase::new(config);
    let report    = use_case.execute()?;

    print_report(&report)?;
    println!("Model and tokenizer saved.");
    Ok(())
}

fn print_report(report: &PipelineReport) -> Result<()> {
    let eval = &report.evaluation;

    println!("\nRecords: {} cleaned, {} train, {} test", report.cleaned, report.train, report.test);
    println!("\nEvaluation results:\n{}", serde_json::to_string_pretty(&report.eval_metrics)?);

    println!("\nConfusion Matrix:\n{}", eval.confusion);
    println!("\n{}", render::confusion_heatmap(&eval.confusion));

    println!("Weighted F1: {:.4}", eval.weighted_f1);
    println!("Precision:   {:.4}", eval.precision);
    println!("Recall:      {:.4}", eval.recall);
    println!("Accuracy:    {:.4}", eval.accuracy);

    println!("\n{}", render::roc_plot(&eval.roc, eval.auc));
    println!("AUC: {:.4}", eval.auc);

    println!("\nClassification Report:\n{}", eval.classification_report);
    Ok(())
}

/// Handles the `classify` subcommand.
fn run_classify(args: ClassifyArgs) -> Result<()> {
    use crate::application::classify_use_case::ClassifyUseCase;

    type InferBackend = burn::backend::Wgpu;

    let device   = burn::backend::wgpu::WgpuDevice::default();
    let use_case = ClassifyUseCase::<InferBackend>::new(&args.model_dir, &device)?;
    let result   = use_case.classify(&args.text)?;

    println!("\nLabel: {} ({})", result.label_name, result.label);
    println!("P(disaster): {:.4}", result.disaster_probability);
    Ok(())
}
