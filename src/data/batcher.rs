// ============================================================
// Layer 4 — Classification Batcher
// ============================================================
// Implements Burn's Batcher trait to stack EncodedRecords into
// tensors the classifier can consume.
//
// How batching works here:
//   Input:  Vec of N EncodedRecords, each of length S
//   Output: ClassificationBatch with
//             input_ids [N, S]  (Int)
//             mask_pad  [N, S]  (Bool, true = padding)
//             labels    [N]     (Int)
//
//   Every record is already padded to the same length by the
//   EncoderAdapter, so flattening and reshaping is enough.
//
// Reference: Burn Book §4 (Batcher)

use std::marker::PhantomData;

use burn::{data::dataloader::batcher::Batcher, prelude::*};

use crate::domain::record::EncodedRecord;

/// A batch of encoded tweets on backend B.
#[derive(Debug, Clone)]
pub struct ClassificationBatch<B: Backend> {
    /// Token ids — shape: [batch_size, seq_len]
    pub input_ids: Tensor<B, 2, Int>,

    /// Padding mask — shape: [batch_size, seq_len]
    /// true where the attention mask was 0
    pub mask_pad: Tensor<B, 2, Bool>,

    /// Class labels — shape: [batch_size]
    pub labels: Tensor<B, 1, Int>,
}

/// Stateless batcher, typed by backend so the DataLoader knows
/// which backend to build tensors for.
#[derive(Clone, Debug, Default)]
pub struct ClassificationBatcher<B: Backend> {
    _backend: PhantomData<B>,
}

impl<B: Backend> ClassificationBatcher<B> {
    pub fn new() -> Self {
        Self { _backend: PhantomData }
    }
}

impl<B: Backend> Batcher<B, EncodedRecord, ClassificationBatch<B>> for ClassificationBatcher<B> {
    fn batch(&self, items: Vec<EncodedRecord>, device: &B::Device) -> ClassificationBatch<B> {
        let batch_size = items.len();
        let seq_len    = items.first().map_or(0, EncodedRecord::seq_len);

        // ── Flatten ids and mask ──────────────────────────────────────────────
        let ids_flat: Vec<i64> = items
            .iter()
            .flat_map(|r| r.input_ids.iter().map(|&x| x as i64))
            .collect();
        let mask_flat: Vec<i64> = items
            .iter()
            .flat_map(|r| r.attention_mask.iter().map(|&x| x as i64))
            .collect();
        let labels: Vec<i64> = items.iter().map(|r| r.label as i64).collect();

        // ── Create tensors ────────────────────────────────────────────────────
        let input_ids = Tensor::<B, 2, Int>::from_data(
            TensorData::new(ids_flat, [batch_size, seq_len]),
            device,
        );

        let attention_mask = Tensor::<B, 2, Int>::from_data(
            TensorData::new(mask_flat, [batch_size, seq_len]),
            device,
        );

        let labels = Tensor::<B, 1, Int>::from_data(
            TensorData::new(labels, [batch_size]),
            device,
        );

        ClassificationBatch {
            input_ids,
            mask_pad: attention_mask.equal_elem(0),
            labels,
        }
    }
}
