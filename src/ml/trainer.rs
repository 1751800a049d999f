// ============================================================
// Layer 5 — Training Loop
// ============================================================
// Custom fine-tuning loop using Burn's DataLoader and AdamW,
// exposed to the application layer as a ClassifierTrainer.
//
// Per epoch:
//   1. Shuffled mini-batches (seeded) → forward → cross-entropy
//   2. backward → AdamW step with a linearly decaying learning rate
//   3. Running loss logged every `logging_steps` steps
//   4. Evaluation on the test set (evaluation_strategy = epoch)
//   5. Epoch line printed, CSV row appended, checkpoint written
//
// Key Burn insight:
//   - Training uses B (Autodiff<Wgpu>) for gradients
//   - model.valid() returns the model on B::InnerBackend
//   - Evaluation and the returned classifier live on the inner backend
//
// Reference: Burn Book §5, Loshchilov & Hutter (2019) AdamW

use std::path::PathBuf;

use anyhow::{bail, Result};
use burn::{
    data::dataloader::DataLoaderBuilder,
    module::AutodiffModule,
    optim::{AdamWConfig, GradientsParams, Optimizer},
    prelude::*,
    tensor::backend::AutodiffBackend,
};

use crate::domain::arguments::{EvaluationStrategy, TrainingArguments};
use crate::data::{batcher::ClassificationBatcher, dataset::EncodedDataset};
use crate::domain::metrics::Predictions;
use crate::domain::record::EncodedRecord;
use crate::domain::traits::{ClassifierTrainer, MetricsFn};
use crate::infra::{
    checkpoint::CheckpointManager,
    metrics::{EpochMetrics, MetricsLogger},
};
use crate::ml::inferencer::FineTunedClassifier;
use crate::ml::model::{ClassifierConfig, TextClassifier};
use crate::ml::pretrained;

pub type TrainBackend = burn::backend::Autodiff<burn::backend::Wgpu>;

pub struct BurnTrainer<B: AutodiffBackend> {
    model_config: ClassifierConfig,
    device:       B::Device,
    /// Safetensors checkpoint for the encoder; random init when absent
    pretrained:   Option<PathBuf>,
}

impl<B: AutodiffBackend> BurnTrainer<B> {
    pub fn new(model_config: ClassifierConfig, device: B::Device) -> Self {
        Self { model_config, device, pretrained: None }
    }

    pub fn with_pretrained(mut self, weights: PathBuf) -> Self {
        self.pretrained = Some(weights);
        self
    }

    fn init_model(&self) -> Result<TextClassifier<B>> {
        match &self.pretrained {
            Some(weights) => pretrained::init_from_pretrained(&self.model_config, weights, &self.device),
            None          => Ok(self.model_config.init(&self.device)),
        }
    }

    fn snapshot(&self, model: &TextClassifier<B>) -> Result<FineTunedClassifier<B::InnerBackend>> {
        FineTunedClassifier::new(model.valid(), self.model_config.clone(), self.device.clone())
    }
}

/// Linear decay from `base` to 0 over `total` steps.
fn scheduled_lr(base: f64, step: usize, total: usize) -> f64 {
    if total == 0 {
        return base;
    }
    base * (1.0 - step as f64 / total as f64).max(0.0)
}

fn accuracy_from_matrix(matrix: &[Vec<usize>]) -> f64 {
    let total: usize   = matrix.iter().flatten().sum();
    let correct: usize = matrix.iter().enumerate().map(|(i, row)| row[i]).sum();
    if total == 0 { 0.0 } else { correct as f64 / total as f64 }
}

impl<B: AutodiffBackend> ClassifierTrainer for BurnTrainer<B> {
    type Model = FineTunedClassifier<B::InnerBackend>;

    fn fit(
        &mut self,
        train:           &[EncodedRecord],
        eval:            &[EncodedRecord],
        args:            &TrainingArguments,
        compute_metrics: MetricsFn,
    ) -> Result<Self::Model> {
        if train.is_empty() {
            bail!("training partition is empty");
        }

        B::seed(args.seed);

        // ── Build model ───────────────────────────────────────────────────────
        let mut model = self.init_model()?;
        tracing::info!(
            "Model ready: {} layers, d_model={}, vocab={}, pretrained={}",
            self.model_config.num_layers,
            self.model_config.d_model,
            self.model_config.vocab_size,
            self.pretrained.is_some()
        );

        // ── AdamW optimiser ───────────────────────────────────────────────────
        let mut optim = AdamWConfig::new()
            .with_epsilon(1e-8)
            .with_weight_decay(args.weight_decay as f32)
            .init();

        // ── Training data loader ──────────────────────────────────────────────
        let train_loader = DataLoaderBuilder::new(ClassificationBatcher::<B>::new())
            .batch_size(args.per_device_train_batch_size)
            .shuffle(args.seed)
            .num_workers(1)
            .set_device(self.device.clone())
            .build(EncodedDataset::new(train.to_vec()));

        let steps_per_epoch = train.len().div_ceil(args.per_device_train_batch_size);
        let total_steps     = steps_per_epoch * args.num_train_epochs;

        let checkpoints = CheckpointManager::new(&args.output_dir);
        let logger      = MetricsLogger::new(&args.logging_dir)?;

        let mut step        = 0usize;
        let mut window_sum  = 0.0f64;
        let mut window_len  = 0usize;

        // ── Epoch loop ────────────────────────────────────────────────────────
        for epoch in 1..=args.num_train_epochs {
            let mut epoch_loss_sum = 0.0f64;
            let mut epoch_batches  = 0usize;

            for batch in train_loader.iter() {
                let output   = model.forward_classification(batch);
                let loss_val = output.loss.clone().into_scalar().elem::<f64>();

                let grads = output.loss.backward();
                let grads = GradientsParams::from_grads(grads, &model);
                model = optim.step(scheduled_lr(args.learning_rate, step, total_steps), model, grads);

                step           += 1;
                epoch_loss_sum += loss_val;
                epoch_batches  += 1;
                window_sum     += loss_val;
                window_len     += 1;

                if step % args.logging_steps == 0 {
                    tracing::info!(
                        "step {step}: loss={:.4} lr={:.3e} epoch={:.2}",
                        window_sum / window_len as f64,
                        scheduled_lr(args.learning_rate, step, total_steps),
                        step as f64 / steps_per_epoch as f64,
                    );
                    window_sum = 0.0;
                    window_len = 0;
                }
            }

            let mut row = EpochMetrics::new(epoch, step, epoch_loss_sum / epoch_batches.max(1) as f64);

            // ── Evaluation phase ──────────────────────────────────────────────
            if args.evaluation_strategy == EvaluationStrategy::Epoch {
                let snapshot    = self.snapshot(&model)?;
                let mut metrics = self.evaluate(&snapshot, eval, args, compute_metrics)?;
                metrics.insert_scalar("epoch", epoch as f64);
                tracing::info!("{}", serde_json::to_string(&metrics)?);

                let accuracy = metrics.matrix("eval_confusion_matrix").map_or(0.0, accuracy_from_matrix);
                row = row.with_eval(
                    metrics.scalar("eval_loss").unwrap_or(f64::NAN),
                    metrics.scalar("eval_f1").unwrap_or(f64::NAN),
                    accuracy,
                );
            }

            println!("{}", row.summary(args.num_train_epochs));
            logger.log(&row)?;

            checkpoints.save_checkpoint(
                &model,
                &self.model_config,
                step,
                args.fp16,
                args.save_total_limit,
            )?;
        }

        tracing::info!(
            "Training complete after {} steps, metrics in '{}'",
            step,
            logger.csv_path().display()
        );
        self.snapshot(&model)
    }

    fn predict(
        &self,
        model: &Self::Model,
        data:  &[EncodedRecord],
        args:  &TrainingArguments,
    ) -> Result<Predictions> {
        model.predict(data, args.per_device_eval_batch_size)
    }
}
