// ============================================================
// Layer 4 — Encoder Adapter
// ============================================================
// Wraps a TextEncoder (the pretrained tokenizer) and enforces the
// fixed-length contract the model relies on:
//
//   cleaned text ──tokenizer──▶ [CLS] w1 w2 ... [SEP]
//                ──fit_to_length(L)──▶ input_ids      (len L)
//                                      attention_mask (len L)
//
// Longer sequences are truncated to L (keeping the closing [SEP]
// as the last real token when the tokenizer has one), shorter ones
// are padded with the pad id. The mask is 1 for real tokens and 0
// for padding.
//
// Reference: Burn Book §4 (Datasets)

use anyhow::{bail, Result};

use crate::domain::record::{CleanedRecord, EncodedRecord};
use crate::domain::traits::TextEncoder;

pub const DEFAULT_MAX_SEQ_LEN: usize = 64;

/// Truncate or pad `ids` to exactly `max_len` and build the mask.
pub fn fit_to_length(
    mut ids: Vec<u32>,
    max_len: usize,
    pad_id:  u32,
    sep_id:  Option<u32>,
) -> (Vec<u32>, Vec<u32>) {
    if ids.len() > max_len {
        let closes_with_sep = sep_id.is_some() && ids.last().copied() == sep_id;
        ids.truncate(max_len);
        if let (true, Some(sep), Some(last)) = (closes_with_sep, sep_id, ids.last_mut()) {
            *last = sep;
        }
    }

    let real     = ids.len();
    let mut mask = vec![1u32; real];
    ids.resize(max_len, pad_id);
    mask.resize(max_len, 0);
    (ids, mask)
}

pub struct EncoderAdapter<'a, E: TextEncoder> {
    encoder: &'a E,
    max_len: usize,
}

impl<'a, E: TextEncoder> EncoderAdapter<'a, E> {
    pub fn new(encoder: &'a E, max_len: usize) -> Result<Self> {
        if max_len == 0 {
            bail!("max sequence length must be at least 1");
        }
        Ok(Self { encoder, max_len })
    }

    /// (input_ids, attention_mask), both of length `max_len`.
    pub fn encode_text(&self, text: &str) -> Result<(Vec<u32>, Vec<u32>)> {
        let ids = self.encoder.encode_ids(text)?;
        Ok(fit_to_length(ids, self.max_len, self.encoder.pad_id(), self.encoder.sep_id()))
    }

    pub fn encode_record(&self, record: &CleanedRecord) -> Result<EncodedRecord> {
        let (input_ids, attention_mask) = self.encode_text(&record.cleaned_text)?;
        Ok(EncodedRecord { input_ids, attention_mask, label: record.label })
    }

    pub fn encode_all(&self, records: &[CleanedRecord]) -> Result<Vec<EncodedRecord>> {
        let encoded = records
            .iter()
            .map(|r| self.encode_record(r))
            .collect::<Result<Vec<_>>>()?;

        let full = encoded.iter().filter(|e| e.real_tokens() == self.max_len).count();
        tracing::debug!(
            "Encoded {} records to length {} ({} filled the window)",
            encoded.len(),
            self.max_len,
            full
        );
        Ok(encoded)
    }
}
