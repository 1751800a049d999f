// ============================================================
// Layer 2 — Training Orchestrator
// ============================================================
// Wires a ClassifierTrainer to the run's TrainingArguments:
//
//   Step 1: Validate arguments
//   Step 2: fit(train, test, args, compute_metrics)
//   Step 3: evaluate(test)  → "eval_"-prefixed metrics dictionary + epoch
//   Step 4: predict(test)   → raw logits for the report stage
//
// The orchestrator never touches tensors. All numerical work is
// behind the ClassifierTrainer trait, so the same workflow runs
// against Burn in production and against stubs in tests.
//
// Reference: Burn Book §5 (Training)

use anyhow::Result;

use crate::domain::arguments::TrainingArguments;
use crate::domain::metrics::{compute_metrics, EvalMetrics, Predictions};
use crate::domain::record::EncodedRecord;
use crate::domain::traits::ClassifierTrainer;

// ─── TrainingOutcome ─────────────────────────────────────────────────────────
pub struct TrainingOutcome<M> {
    pub model:        M,
    /// Final evaluation on the test set, keys prefixed with "eval_"
    pub eval_metrics: EvalMetrics,
    /// Raw test-set logits and labels, in test-set order
    pub predictions:  Predictions,
}

// ─── TrainingOrchestrator ────────────────────────────────────────────────────
pub struct TrainingOrchestrator {
    args: TrainingArguments,
}

impl TrainingOrchestrator {
    pub fn new(args: TrainingArguments) -> Result<Self> {
        args.validate()?;
        Ok(Self { args })
    }

    pub fn run<T: ClassifierTrainer>(
        &self,
        trainer: &mut T,
        train:   &[EncodedRecord],
        test:    &[EncodedRecord],
    ) -> Result<TrainingOutcome<T::Model>> {
        tracing::info!(
            "Fine-tuning on {} records for {} epoch(s), evaluating on {}",
            train.len(),
            self.args.num_train_epochs,
            test.len()
        );

        let model        = trainer.fit(train, test, &self.args, compute_metrics)?;
        let mut eval_metrics = trainer.evaluate(&model, test, &self.args, compute_metrics)?;
        eval_metrics.insert_scalar("epoch", self.args.num_train_epochs as f64);
        let predictions  = trainer.predict(&model, test, &self.args)?;

        tracing::info!("Final evaluation: {}", serde_json::to_string(&eval_metrics)?);
        Ok(TrainingOutcome { model, eval_metrics, predictions })
    }
}
