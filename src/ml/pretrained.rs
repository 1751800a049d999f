// ============================================================
// Layer 5 — Pretrained Encoder Weights
// ============================================================
// Loads a DistilBERT `model.safetensors` into the encoder half of
// the TextClassifier using burn-import's SafetensorsFileRecorder.
//
// Checkpoint keys are renamed onto the module tree:
//
//   distilbert.embeddings.LayerNorm.*           → embeddings.layer_norm.*
//   distilbert.transformer.layer.N.attention.q_lin.* → layers.N.attention.query.*
//     (k_lin → key, v_lin → value, out_lin → output)
//   distilbert.transformer.layer.N.ffn.lin1.*    → layers.N.lin1.*
//
// The PyTorch adapter transposes Linear weights and maps LayerNorm
// weight/bias onto gamma/beta. Keys outside the encoder (the MLM
// vocab_* head) are ignored; pre_classifier and classifier keep
// their fresh initialisation.
//
// Reference: burn-import documentation (Safetensors import)

use std::path::Path;

use anyhow::{anyhow, Result};
use burn::{
    prelude::*,
    record::{FullPrecisionSettings, Recorder},
};
use burn_import::safetensors::{AdapterType, LoadArgs, SafetensorsFileRecorder};

use crate::ml::model::{ClassifierConfig, TextClassifier, TransformerEncoder, TransformerEncoderRecord};

/// Checkpoint key → module path rewrites, applied in order.
const KEY_REMAP: &[(&str, &str)] = &[
    (r"^distilbert\.", ""),
    (r"^embeddings\.LayerNorm\.", "embeddings.layer_norm."),
    (r"^transformer\.layer\.", "layers."),
    (r"\.attention\.q_lin\.", ".attention.query."),
    (r"\.attention\.k_lin\.", ".attention.key."),
    (r"\.attention\.v_lin\.", ".attention.value."),
    (r"\.attention\.out_lin\.", ".attention.output."),
    (r"\.ffn\.(lin[12])\.", ".${1}."),
];

fn load_args(weights: &Path) -> LoadArgs {
    KEY_REMAP.iter().fold(
        LoadArgs::new(weights.to_path_buf()).with_adapter_type(AdapterType::PyTorch),
        |args, (pattern, replacement)| args.with_key_remap(pattern, replacement),
    )
}

/// Encoder built from `config` with its parameters read from `weights`.
pub fn load_encoder<B: Backend>(
    config:  &ClassifierConfig,
    weights: &Path,
    device:  &B::Device,
) -> Result<TransformerEncoder<B>> {
    let record: TransformerEncoderRecord<B> = SafetensorsFileRecorder::<FullPrecisionSettings>::default()
        .load(load_args(weights), device)
        .map_err(|e| anyhow!("Cannot load pretrained weights '{}': {e}", weights.display()))?;

    tracing::info!("Loaded pretrained encoder weights from '{}'", weights.display());
    Ok(config.init_encoder::<B>(device).load_record(record))
}

/// Classifier with a pretrained encoder and a freshly initialised head.
pub fn init_from_pretrained<B: Backend>(
    config:  &ClassifierConfig,
    weights: &Path,
    device:  &B::Device,
) -> Result<TextClassifier<B>> {
    let encoder = load_encoder(config, weights, device)?;
    Ok(TextClassifier { encoder, ..config.init(device) })
}
