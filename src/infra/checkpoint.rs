// ============================================================
// Layer 6 — Checkpoint Manager
// ============================================================
// Saves and restores classifier weights with Burn's file recorders.
//
// Layout under the output directory:
//
//   results/
//     checkpoint-9/          ← written after an epoch (global step 9)
//       model.mpk.gz         ← weights (half precision when fp16 is on)
//       config.json          ← ClassifierConfig
//     checkpoint-18/
//     model.mpk              ← final fine-tuned weights (full precision)
//     config.json            ← ClassifierConfig for the final weights
//     train_config.json      ← PipelineConfig of the run
//     model_state.bin        ← raw parameter snapshot
//
// Retention:
//   After every checkpoint, the oldest checkpoint-* directories are
//   removed until at most `save_total_limit` remain.
//
// Reference: Burn Book §5 (Records and Checkpointing)
//            Rust Book §9 (Error Handling)

use anyhow::{anyhow, Context, Result};
use std::{
    fs,
    path::{Path, PathBuf},
};
use burn::{
    prelude::*,
    record::{
        BinFileRecorder, CompactRecorder, FullPrecisionSettings, NamedMpkFileRecorder,
        NamedMpkGzFileRecorder,
    },
};

use crate::application::train_use_case::PipelineConfig;
use crate::ml::model::{ClassifierConfig, TextClassifier};

const CHECKPOINT_PREFIX: &str = "checkpoint-";
const MODEL_STEM:        &str = "model";
const MODEL_CONFIG_FILE: &str = "config.json";
const RUN_CONFIG_FILE:   &str = "train_config.json";

/// Manages saving and loading of classifier weights and configs.
/// All files are stored in the configured directory.
#[derive(Debug, Clone)]
pub struct CheckpointManager {
    dir: PathBuf,
}

impl CheckpointManager {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn ensure_dir(dir: &Path) -> Result<()> {
        fs::create_dir_all(dir)
            .with_context(|| format!("Cannot create directory '{}'", dir.display()))
    }

    // ─── Epoch checkpoints ───────────────────────────────────────────────────

    /// Write `checkpoint-{step}` and prune older checkpoints so at
    /// most `save_total_limit` remain. Returns the checkpoint directory.
    pub fn save_checkpoint<B: Backend>(
        &self,
        model:            &TextClassifier<B>,
        config:           &ClassifierConfig,
        step:             usize,
        half_precision:   bool,
        save_total_limit: usize,
    ) -> Result<PathBuf> {
        let ckpt_dir = self.dir.join(format!("{CHECKPOINT_PREFIX}{step}"));
        Self::ensure_dir(&ckpt_dir)?;

        let path = ckpt_dir.join(MODEL_STEM);
        let saved = if half_precision {
            model.clone().save_file(path.clone(), &CompactRecorder::new())
        } else {
            model.clone().save_file(path.clone(), &NamedMpkGzFileRecorder::<FullPrecisionSettings>::new())
        };
        saved.with_context(|| format!("Failed to save checkpoint to '{}'", path.display()))?;

        config
            .save(ckpt_dir.join(MODEL_CONFIG_FILE))
            .with_context(|| format!("Cannot write model config to '{}'", ckpt_dir.display()))?;

        let removed = self.rotate(save_total_limit)?;
        tracing::debug!(
            "Saved checkpoint '{}' (removed {} older)",
            ckpt_dir.display(),
            removed.len()
        );
        Ok(ckpt_dir)
    }

    /// Existing checkpoints, oldest (lowest step) first.
    pub fn list_checkpoints(&self) -> Result<Vec<(usize, PathBuf)>> {
        if !self.dir.exists() {
            return Ok(Vec::new());
        }

        let mut found = Vec::new();
        for entry in fs::read_dir(&self.dir)
            .with_context(|| format!("Cannot list '{}'", self.dir.display()))?
        {
            let entry = entry?;
            let step = entry
                .file_name()
                .to_str()
                .and_then(|name| name.strip_prefix(CHECKPOINT_PREFIX))
                .and_then(|n| n.parse::<usize>().ok());
            if let (Some(step), true) = (step, entry.path().is_dir()) {
                found.push((step, entry.path()));
            }
        }
        found.sort_by_key(|(step, _)| *step);
        Ok(found)
    }

    fn rotate(&self, save_total_limit: usize) -> Result<Vec<PathBuf>> {
        let checkpoints = self.list_checkpoints()?;
        let excess      = checkpoints.len().saturating_sub(save_total_limit);

        let mut removed = Vec::with_capacity(excess);
        for (_, path) in checkpoints.into_iter().take(excess) {
            fs::remove_dir_all(&path)
                .with_context(|| format!("Cannot remove old checkpoint '{}'", path.display()))?;
            removed.push(path);
        }
        Ok(removed)
    }

    // ─── Final model ─────────────────────────────────────────────────────────

    /// Save full-precision weights plus `config.json` into the directory.
    pub fn save_model<B: Backend>(
        &self,
        model:  &TextClassifier<B>,
        config: &ClassifierConfig,
    ) -> Result<()> {
        Self::ensure_dir(&self.dir)?;

        let path = self.dir.join(MODEL_STEM);
        model
            .clone()
            .save_file(path.clone(), &NamedMpkFileRecorder::<FullPrecisionSettings>::new())
            .with_context(|| format!("Failed to save model to '{}'", path.display()))?;

        config
            .save(self.dir.join(MODEL_CONFIG_FILE))
            .with_context(|| format!("Cannot write model config to '{}'", self.dir.display()))?;

        tracing::debug!("Saved model weights to '{}'", self.dir.display());
        Ok(())
    }

    /// Rebuild the classifier from `config.json` and load the saved weights.
    pub fn load_model<B: Backend>(
        &self,
        device: &B::Device,
    ) -> Result<(TextClassifier<B>, ClassifierConfig)> {
        let config_path = self.dir.join(MODEL_CONFIG_FILE);
        let config = ClassifierConfig::load(&config_path).map_err(|e| {
            anyhow!(
                "Cannot read model config '{}': {e}. Have you run 'train' first?",
                config_path.display()
            )
        })?;

        let path  = self.dir.join(MODEL_STEM);
        let model = config
            .init::<B>(device)
            .load_file(path.clone(), &NamedMpkFileRecorder::<FullPrecisionSettings>::new(), device)
            .with_context(|| format!("Cannot load model weights '{}'", path.display()))?;

        tracing::info!("Model loaded from '{}'", self.dir.display());
        Ok((model, config))
    }

    /// Raw parameter snapshot as a single binary file.
    pub fn save_snapshot<B: Backend>(model: &TextClassifier<B>, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            Self::ensure_dir(parent)?;
        }
        model
            .clone()
            .save_file(path.to_path_buf(), &BinFileRecorder::<FullPrecisionSettings>::new())
            .with_context(|| format!("Failed to write snapshot '{}'", path.display()))?;
        Ok(())
    }

    // ─── Run configuration ───────────────────────────────────────────────────

    pub fn save_config(&self, cfg: &PipelineConfig) -> Result<()> {
        Self::ensure_dir(&self.dir)?;
        let path = self.dir.join(RUN_CONFIG_FILE);

        let json = serde_json::to_string_pretty(cfg)?;
        fs::write(&path, json)
            .with_context(|| format!("Cannot write config to '{}'", path.display()))?;

        tracing::debug!("Saved run config to '{}'", path.display());
        Ok(())
    }

    pub fn load_config(&self) -> Result<PipelineConfig> {
        let path = self.dir.join(RUN_CONFIG_FILE);

        let json = fs::read_to_string(&path).with_context(|| {
            format!(
                "Cannot read config from '{}'. \
                 Make sure you have run 'train' before 'classify'.",
                path.display()
            )
        })?;

        Ok(serde_json::from_str(&json)?)
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use burn::backend::NdArray;

    type TestBackend = NdArray;

    fn tiny() -> ClassifierConfig {
        ClassifierConfig::binary(16, 4)
            .with_d_model(8)
            .with_num_heads(2)
            .with_num_layers(1)
            .with_d_ff(16)
    }

    #[test]
    fn test_retention_keeps_newest() {
        let tmp     = tempfile::tempdir().unwrap();
        let manager = CheckpointManager::new(tmp.path());
        let config  = tiny();
        let model   = config.init::<TestBackend>(&Default::default());

        for step in [9, 18, 27] {
            manager.save_checkpoint(&model, &config, step, true, 2).unwrap();
        }

        let steps: Vec<usize> = manager.list_checkpoints().unwrap().into_iter().map(|(s, _)| s).collect();
        assert_eq!(steps, vec![18, 27]);
        assert!(!tmp.path().join("checkpoint-9").exists());
        assert!(tmp.path().join("checkpoint-27").join("config.json").exists());
    }

    #[test]
    fn test_full_precision_checkpoint() {
        let tmp     = tempfile::tempdir().unwrap();
        let manager = CheckpointManager::new(tmp.path());
        let config  = tiny();
        let model   = config.init::<TestBackend>(&Default::default());

        let dir = manager.save_checkpoint(&model, &config, 1, false, 1).unwrap();
        assert!(fs::read_dir(dir).unwrap().count() >= 2);
    }

    #[test]
    fn test_model_roundtrip_restores_config() {
        let tmp     = tempfile::tempdir().unwrap();
        let manager = CheckpointManager::new(tmp.path().join("results"));
        let config  = tiny();
        let device  = Default::default();
        let model   = config.init::<TestBackend>(&device);

        manager.save_model(&model, &config).unwrap();
        let (_, loaded) = manager.load_model::<TestBackend>(&device).unwrap();
        assert_eq!(loaded.vocab_size, 16);
        assert_eq!(loaded.max_position_embeddings, 4);
        assert_eq!(loaded.d_model, 8);
    }

    #[test]
    fn test_load_without_training_fails() {
        let tmp     = tempfile::tempdir().unwrap();
        let manager = CheckpointManager::new(tmp.path());
        assert!(manager.load_model::<TestBackend>(&Default::default()).is_err());
        assert!(manager.load_config().is_err());
    }

    #[test]
    fn test_run_config_roundtrip() {
        let tmp     = tempfile::tempdir().unwrap();
        let manager = CheckpointManager::new(tmp.path());
        let cfg     = PipelineConfig { max_seq_len: 32, ..Default::default() };

        manager.save_config(&cfg).unwrap();
        assert_eq!(manager.load_config().unwrap(), cfg);
    }

    #[test]
    fn test_snapshot_written() {
        let tmp    = tempfile::tempdir().unwrap();
        let config = tiny();
        let model  = config.init::<TestBackend>(&Default::default());
        let path   = tmp.path().join("nested").join("model_state");

        CheckpointManager::save_snapshot(&model, &path).unwrap();
        assert!(tmp.path().join("nested").join("model_state.bin").exists());
    }
}
