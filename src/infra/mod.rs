// ============================================================
// Layer 6 — Infrastructure Layer
// ============================================================
// Handles the concerns shared by training and classification:
//
//   checkpoint.rs      — Saving and loading classifier weights
//                        with Burn's recorders, epoch checkpoints
//                        with retention, the raw parameter
//                        snapshot, and the run's PipelineConfig
//                        as JSON so `classify` can rebuild it.
//
//   tokenizer_store.rs — Tokenizer acquisition and persistence
//                        Pretrained download from the hub, an
//                        offline word-level fallback, and the
//                        TextEncoder impl for tokenizers::Tokenizer.
//
//   pretrained_store.rs — DistilBERT config.json and
//                        model.safetensors, from the hub cache
//                        or a local model directory.
//
//   metrics.rs         — Per-epoch metrics CSV in the logging
//                        directory.
//
// Reference: Rust Book §7 (Modules)
//            Rust Book §9 (Error Handling with anyhow)
//            Burn Book §5 (Checkpointing)

/// Classifier checkpoint saving and loading
pub mod checkpoint;

/// Tokenizer download, building, saving, and loading
pub mod tokenizer_store;

/// Pretrained model config and weights acquisition
pub mod pretrained_store;

/// Training metrics CSV logger
pub mod metrics;
