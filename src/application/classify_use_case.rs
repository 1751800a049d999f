// ============================================================
// Layer 2 — Classify Use Case
// ============================================================
// Reloads what a training run saved and labels new text:
//
//   train_config.json ─▶ PipelineConfig (max length, tokenizer dir)
//   tokenizer.json    ─▶ Tokenizer
//   model.mpk + config.json ─▶ FineTunedClassifier
//
//   text → TextNormalizer::clean → EncoderAdapter → logits
//        → argmax label + softmax probability of "disaster"

use std::path::Path;

use anyhow::Result;
use burn::prelude::Backend;
use tokenizers::Tokenizer;

use crate::application::train_use_case::PipelineConfig;
use crate::data::{encoder::EncoderAdapter, normalizer::TextNormalizer};
use crate::domain::metrics::{argmax, positive_probabilities};
use crate::domain::record::CleanedRecord;
use crate::infra::{checkpoint::CheckpointManager, tokenizer_store::TokenizerStore};
use crate::ml::inferencer::FineTunedClassifier;

/// Heatmap-style names for the two classes.
pub const CLASS_NAMES: [&str; 2] = ["Non-Disaster", "Disaster"];

#[derive(Debug, Clone, PartialEq)]
pub struct Classification {
    pub label:                u8,
    pub label_name:           &'static str,
    pub disaster_probability: f64,
    pub cleaned_text:         String,
}

pub struct ClassifyUseCase<B: Backend> {
    config:     PipelineConfig,
    normalizer: TextNormalizer,
    tokenizer:  Tokenizer,
    classifier: FineTunedClassifier<B>,
}

impl<B: Backend> ClassifyUseCase<B> {
    /// Load config, tokenizer and weights from a training run's model directory.
    pub fn new(model_dir: &Path, device: &B::Device) -> Result<Self> {
        let config     = CheckpointManager::new(model_dir).load_config()?;
        let tokenizer  = TokenizerStore::new(&config.tokenizer_dir).load()?;
        let classifier = FineTunedClassifier::load(model_dir, device)?;
        Ok(Self::from_parts(config, tokenizer, classifier))
    }

    pub fn from_parts(config: PipelineConfig, tokenizer: Tokenizer, classifier: FineTunedClassifier<B>) -> Self {
        Self { config, normalizer: TextNormalizer::new(), tokenizer, classifier }
    }

    pub fn classify(&self, text: &str) -> Result<Classification> {
        let cleaned = self.normalizer.clean(text);
        let adapter = EncoderAdapter::new(&self.tokenizer, self.config.max_seq_len)?;
        let record  = adapter.encode_record(&CleanedRecord { cleaned_text: cleaned.clone(), label: 0 })?;

        let logits = self.classifier.logits(std::slice::from_ref(&record), 1)?;
        let label  = argmax(&logits)[0];
        let prob   = positive_probabilities(&logits)[0];

        tracing::debug!("'{}' → logits {:?}", cleaned, logits[0]);
        Ok(Classification {
            label,
            label_name: CLASS_NAMES[label as usize],
            disaster_probability: prob,
            cleaned_text: cleaned,
        })
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::traits::{Persistable, TextEncoder};
    use burn::backend::NdArray;

    type TestBackend = NdArray;

    #[test]
    fn test_classify_after_saving_artifacts() {
        let tmp       = tempfile::tempdir().unwrap();
        let model_dir = tmp.path().join("results");
        let config    = PipelineConfig {
            max_seq_len:   8,
            d_model:       8,
            num_heads:     2,
            num_layers:    1,
            d_ff:          16,
            model_dir:     model_dir.clone(),
            tokenizer_dir: model_dir.clone(),
            ..Default::default()
        };

        let texts     = vec!["forest fire near la ronge".to_string(), "lovely sunny day".to_string()];
        let tokenizer = TokenizerStore::new(&model_dir).build_word_level(&texts, 50).unwrap();

        let device     = Default::default();
        let model_cfg  = config.model_config(TextEncoder::vocab_size(&tokenizer));
        let classifier = FineTunedClassifier::<TestBackend>::new(model_cfg.init(&device), model_cfg, device).unwrap();
        classifier.save_pretrained(&model_dir).unwrap();
        CheckpointManager::new(&model_dir).save_config(&config).unwrap();

        let use_case = ClassifyUseCase::<TestBackend>::new(&model_dir, &Default::default()).unwrap();
        let result   = use_case.classify("The FOREST is on fire!!!").unwrap();

        assert_eq!(result.cleaned_text, "forest fire");
        assert!(result.label <= 1);
        assert_eq!(result.label_name, CLASS_NAMES[result.label as usize]);
        assert!((0.0..=1.0).contains(&result.disaster_probability));
        assert_eq!(result.label == 1, result.disaster_probability > 0.5);
    }

    #[test]
    fn test_new_without_training_fails() {
        let tmp = tempfile::tempdir().unwrap();
        assert!(ClassifyUseCase::<TestBackend>::new(tmp.path(), &Default::default()).is_err());
    }
}
