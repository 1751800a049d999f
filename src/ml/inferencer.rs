// ============================================================
// Layer 5 — Fine-Tuned Classifier
// ============================================================
// The trained model as the rest of the app sees it: a
// TextClassifier on a non-autodiff backend plus the config it was
// built from. Used for per-epoch evaluation during training, for
// the final test-set predictions, and by the `classify` command.
//
// Inference runs in order, batch by batch, without shuffling, so
// logits line up with the input records.
//
// Reference: Burn Book §6 (Inference)

use std::path::Path;

use anyhow::{anyhow, bail, Result};
use burn::{data::dataloader::batcher::Batcher, prelude::*};

use crate::data::batcher::ClassificationBatcher;
use crate::domain::metrics::Predictions;
use crate::domain::record::{EncodedRecord, NUM_LABELS};
use crate::domain::traits::Persistable;
use crate::infra::checkpoint::CheckpointManager;
use crate::ml::model::{ClassifierConfig, TextClassifier};

pub struct FineTunedClassifier<B: Backend> {
    model:  TextClassifier<B>,
    config: ClassifierConfig,
    device: B::Device,
}

impl<B: Backend> FineTunedClassifier<B> {
    pub fn new(model: TextClassifier<B>, config: ClassifierConfig, device: B::Device) -> Result<Self> {
        if config.num_labels != NUM_LABELS {
            bail!("expected a {NUM_LABELS}-label classifier, config has {}", config.num_labels);
        }
        Ok(Self { model, config, device })
    }

    /// Rebuild the classifier saved by `save_pretrained` in `dir`.
    pub fn load(dir: &Path, device: &B::Device) -> Result<Self> {
        let (model, config) = CheckpointManager::new(dir).load_model::<B>(device)?;
        Self::new(model, config, device.clone())
    }

    pub fn config(&self) -> &ClassifierConfig {
        &self.config
    }

    /// Raw logits for `data`, in order.
    pub fn logits(&self, data: &[EncodedRecord], batch_size: usize) -> Result<Vec<[f32; NUM_LABELS]>> {
        Ok(self.run(data, batch_size)?.0)
    }

    /// Logits, labels and mean cross-entropy loss for `data`.
    pub fn predict(&self, data: &[EncodedRecord], batch_size: usize) -> Result<Predictions> {
        let (logits, loss) = self.run(data, batch_size)?;
        let labels         = data.iter().map(|r| r.label).collect();
        let predictions    = Predictions::new(logits, labels);
        Ok(match loss {
            Some(loss) => predictions.with_loss(loss),
            None => predictions,
        })
    }

    fn run(&self, data: &[EncodedRecord], batch_size: usize) -> Result<(Vec<[f32; NUM_LABELS]>, Option<f64>)> {
        if batch_size == 0 {
            bail!("batch size must be at least 1");
        }

        let batcher      = ClassificationBatcher::<B>::new();
        let mut logits   = Vec::with_capacity(data.len());
        let mut loss_sum = 0.0f64;

        for chunk in data.chunks(batch_size) {
            let batch  = batcher.batch(chunk.to_vec(), &self.device);
            let output = self.model.forward_classification(batch);

            loss_sum += output.loss.into_scalar().elem::<f64>() * chunk.len() as f64;

            let flat: Vec<f32> = output
                .output
                .into_data()
                .convert::<f32>()
                .to_vec::<f32>()
                .map_err(|e| anyhow!("Cannot read logits: {e:?}"))?;
            logits.extend(flat.chunks_exact(NUM_LABELS).map(|row| [row[0], row[1]]));
        }

        let loss = (!data.is_empty()).then(|| loss_sum / data.len() as f64);
        Ok((logits, loss))
    }
}

impl<B: Backend> Persistable for FineTunedClassifier<B> {
    fn save_pretrained(&self, dir: &Path) -> Result<()> {
        CheckpointManager::new(dir).save_model(&self.model, &self.config)
    }

    fn save_snapshot(&self, path: &Path) -> Result<()> {
        CheckpointManager::save_snapshot(&self.model, path)
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use burn::backend::NdArray;

    type TestBackend = NdArray;

    fn classifier() -> FineTunedClassifier<TestBackend> {
        let config = ClassifierConfig::binary(16, 4)
            .with_d_model(8)
            .with_num_heads(2)
            .with_num_layers(1)
            .with_d_ff(16)
            .with_dropout(0.0);
        let device = Default::default();
        FineTunedClassifier::new(config.init(&device), config, device).unwrap()
    }

    fn records(n: usize) -> Vec<EncodedRecord> {
        (0..n)
            .map(|i| EncodedRecord {
                input_ids:      vec![2, 5 + (i as u32 % 10), 3, 0],
                attention_mask: vec![1, 1, 1, 0],
                label:          (i % 2) as u8,
            })
            .collect()
    }

    #[test]
    fn test_predict_keeps_order_across_batches() {
        let clf  = classifier();
        let data = records(5);

        let batched = clf.predict(&data, 2).unwrap();
        let single  = clf.predict(&data, 5).unwrap();

        assert_eq!(batched.len(), 5);
        assert_eq!(batched.labels, vec![0, 1, 0, 1, 0]);
        for (a, b) in batched.logits.iter().zip(&single.logits) {
            assert!((a[0] - b[0]).abs() < 1e-4 && (a[1] - b[1]).abs() < 1e-4);
        }
        let loss = batched.loss.unwrap();
        assert!(loss.is_finite() && loss > 0.0);
    }

    #[test]
    fn test_empty_input_has_no_loss() {
        let p = classifier().predict(&[], 4).unwrap();
        assert!(p.is_empty());
        assert!(p.loss.is_none());
    }

    #[test]
    fn test_save_pretrained_then_load() {
        let tmp = tempfile::tempdir().unwrap();
        let clf = classifier();
        clf.save_pretrained(tmp.path()).unwrap();

        let loaded = FineTunedClassifier::<TestBackend>::load(tmp.path(), &Default::default()).unwrap();
        let data   = records(3);
        let a      = clf.logits(&data, 8).unwrap();
        let b      = loaded.logits(&data, 8).unwrap();
        for (x, y) in a.iter().zip(&b) {
            assert!((x[0] - y[0]).abs() < 1e-5 && (x[1] - y[1]).abs() < 1e-5);
        }
    }

    #[test]
    fn test_rejects_non_binary_config() {
        let config = ClassifierConfig::new(16, 4).with_num_labels(3).with_d_model(8).with_num_heads(2);
        let device = Default::default();
        let model  = config.init::<TestBackend>(&device);
        assert!(FineTunedClassifier::new(model, config, device).is_err());
    }
}
