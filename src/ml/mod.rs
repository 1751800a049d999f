// ============================================================
// Layer 5 — ML / Model Layer (Burn)
// ============================================================
// This layer contains the Burn model, training and inference
// code. The application layer reaches it only through the
// ClassifierTrainer and Persistable traits.
//
// What's in this layer:
//
//   model.rs      — The transformer sequence classifier
//                   • Token + positional embeddings
//                   • Multi-head self-attention with padding mask
//                   • Feed-forward networks (GELU activation)
//                   • [CLS] pooling and a 2-way classification head
//
//   pretrained.rs — DistilBERT safetensors weights loaded into
//                   the encoder through burn-import, with the
//                   checkpoint keys renamed onto the module tree
//
//   trainer.rs    — The fine-tuning loop
//                   AdamW with weight decay, per-epoch evaluation,
//                   metrics CSV and checkpoint retention
//
//   inferencer.rs — The fine-tuned classifier
//                   Ordered batched logits, loss, save and load
//
// Reference: Burn Book §3 (Building Blocks)
//            Burn Book §5 (Training)
//            Devlin et al. (2019) BERT

/// Transformer encoder classification model
pub mod model;

/// Pretrained encoder weights from a safetensors checkpoint
pub mod pretrained;

/// Fine-tuning loop behind the ClassifierTrainer trait
pub mod trainer;

/// Fine-tuned classifier: batched inference and persistence
pub mod inferencer;
