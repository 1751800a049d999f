// ============================================================
// Layer 6 — Pretrained Model Store
// ============================================================
// Locates the two files a pretrained encoder needs:
//
//   config.json        — DistilBERT architecture (dim, n_layers,
//                        n_heads, hidden_dim, vocab_size, ...)
//   model.safetensors  — the checkpoint weights
//
// `fetch(name)` downloads both from the Hugging Face hub through
// hf-hub's cache, unless `name` is a local directory holding them.
// The architecture becomes a ClassifierConfig; the weights path is
// handed to ml::pretrained.

use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{anyhow, bail, Context, Result};
use serde::Deserialize;

use crate::ml::model::ClassifierConfig;

pub const CONFIG_FILE:  &str = "config.json";
pub const WEIGHTS_FILE: &str = "model.safetensors";

/// The fields of a DistilBERT `config.json` the classifier uses.
/// Defaults are distilbert-base-uncased.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct HubModelConfig {
    pub vocab_size:              usize,
    pub max_position_embeddings: usize,
    pub dim:                     usize,
    pub n_layers:                usize,
    pub n_heads:                 usize,
    pub hidden_dim:              usize,
    pub dropout:                 f64,
    pub seq_classif_dropout:     f64,
}

impl Default for HubModelConfig {
    fn default() -> Self {
        Self {
            vocab_size:              30522,
            max_position_embeddings: 512,
            dim:                     768,
            n_layers:                6,
            n_heads:                 12,
            hidden_dim:              3072,
            dropout:                 0.1,
            seq_classif_dropout:     0.2,
        }
    }
}

impl HubModelConfig {
    pub fn from_file(path: &Path) -> Result<Self> {
        let json = fs::read_to_string(path)
            .with_context(|| format!("Cannot read model config '{}'", path.display()))?;
        serde_json::from_str(&json)
            .with_context(|| format!("Invalid model config '{}'", path.display()))
    }

    pub fn classifier_config(&self) -> ClassifierConfig {
        ClassifierConfig::binary(self.vocab_size, self.max_position_embeddings)
            .with_d_model(self.dim)
            .with_num_heads(self.n_heads)
            .with_num_layers(self.n_layers)
            .with_d_ff(self.hidden_dim)
            .with_dropout(self.dropout)
            .with_classifier_dropout(self.seq_classif_dropout)
    }
}

#[derive(Debug, Clone)]
pub struct PretrainedModel {
    pub config:  HubModelConfig,
    pub weights: PathBuf,
}

impl PretrainedModel {
    /// Resolve `name` as a local directory, or else as a hub model id.
    pub fn fetch(name: &str) -> Result<Self> {
        let local = Path::new(name);
        if local.is_dir() {
            return Self::from_dir(local);
        }

        tracing::info!("Fetching pretrained weights for '{}'", name);
        let api  = hf_hub::api::sync::Api::new()
            .map_err(|e| anyhow!("Cannot reach the model hub: {e}"))?;
        let repo = api.model(name.to_string());

        let config = repo
            .get(CONFIG_FILE)
            .map_err(|e| anyhow!("Cannot fetch '{CONFIG_FILE}' for '{name}': {e}"))?;
        let weights = repo
            .get(WEIGHTS_FILE)
            .map_err(|e| anyhow!("Cannot fetch '{WEIGHTS_FILE}' for '{name}': {e}"))?;

        Ok(Self { config: HubModelConfig::from_file(&config)?, weights })
    }

    pub fn from_dir(dir: &Path) -> Result<Self> {
        let weights = dir.join(WEIGHTS_FILE);
        if !weights.is_file() {
            bail!("No '{WEIGHTS_FILE}' in '{}'", dir.display());
        }
        let config = HubModelConfig::from_file(&dir.join(CONFIG_FILE))?;
        Ok(Self { config, weights })
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;

    // config.json of distilbert-base-uncased
    const DISTILBERT_CONFIG: &str = r#"{
        "activation": "gelu",
        "architectures": ["DistilBertForMaskedLM"],
        "attention_dropout": 0.1,
        "dim": 768,
        "dropout": 0.1,
        "hidden_dim": 3072,
        "initializer_range": 0.02,
        "max_position_embeddings": 512,
        "model_type": "distilbert",
        "n_heads": 12,
        "n_layers": 6,
        "pad_token_id": 0,
        "qa_dropout": 0.1,
        "seq_classif_dropout": 0.2,
        "sinusoidal_pos_embds": false,
        "tie_weights_": true,
        "transformers_version": "4.10.0.dev0",
        "vocab_size": 30522
    }"#;

    #[test]
    fn test_distilbert_config_maps_to_classifier() {
        let tmp  = tempfile::tempdir().unwrap();
        let path = tmp.path().join(CONFIG_FILE);
        fs::write(&path, DISTILBERT_CONFIG).unwrap();

        let hub = HubModelConfig::from_file(&path).unwrap();
        assert_eq!(hub, HubModelConfig::default());

        let mc = hub.classifier_config();
        assert_eq!((mc.d_model, mc.num_heads, mc.num_layers, mc.d_ff), (768, 12, 6, 3072));
        assert_eq!(mc.vocab_size, 30522);
        assert_eq!(mc.max_position_embeddings, 512);
        assert_eq!(mc.classifier_dropout, 0.2);
        assert_eq!(mc.num_labels, 2);
    }

    #[test]
    fn test_local_directory_is_used_without_download() {
        let tmp = tempfile::tempdir().unwrap();
        fs::write(tmp.path().join(CONFIG_FILE), r#"{"dim": 32, "n_layers": 2}"#).unwrap();
        fs::write(tmp.path().join(WEIGHTS_FILE), b"").unwrap();

        let model = PretrainedModel::fetch(tmp.path().to_str().unwrap()).unwrap();
        assert_eq!(model.weights, tmp.path().join(WEIGHTS_FILE));
        assert_eq!(model.config.dim, 32);
        assert_eq!(model.config.n_layers, 2);
        assert_eq!(model.config.n_heads, 12);
    }

    #[test]
    fn test_directory_without_weights_is_an_error() {
        let tmp = tempfile::tempdir().unwrap();
        fs::write(tmp.path().join(CONFIG_FILE), DISTILBERT_CONFIG).unwrap();

        let err = PretrainedModel::from_dir(tmp.path()).unwrap_err();
        assert!(err.to_string().contains(WEIGHTS_FILE));
    }
}
