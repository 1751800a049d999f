// ============================================================
// Layer 3 — Record Types
// ============================================================
// The three shapes a tweet passes through on its way to the
// model:
//
//   RawRecord      → one CSV row, fields exactly as read
//   CleanedRecord  → normalised text + integer label
//   EncodedRecord  → fixed-length token ids + attention mask
//
// Plus SplitDataset, the train/test pair produced by the
// Dataset Preparer.
//
// Reference: Rust Book §5 (Structs and Methods)

use serde::{Deserialize, Serialize};

/// Number of output classes (non-disaster, disaster).
pub const NUM_LABELS: usize = 2;

/// One row of the input CSV.
/// `text` and `label` are `None` when the field is missing
/// (empty or one of the NA markers), the rest are informational.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawRecord {
    pub id:       Option<String>,
    pub keyword:  Option<String>,
    pub location: Option<String>,
    pub text:     Option<String>,
    pub label:    Option<String>,
}

impl RawRecord {
    /// Build a record with only the two fields the pipeline needs.
    pub fn new(text: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            text:  Some(text.into()),
            label: Some(label.into()),
            ..Default::default()
        }
    }
}

/// A record after column selection, label coercion and text cleaning.
///
/// Invariants: `label` is 0 or 1, `cleaned_text` holds only
/// lowercase ASCII words separated by single spaces.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CleanedRecord {
    pub cleaned_text: String,
    pub label:        u8,
}

/// A record ready for the model. Every EncodedRecord in a run
/// has `input_ids.len() == attention_mask.len() == max_seq_len`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncodedRecord {
    pub input_ids:      Vec<u32>,
    pub attention_mask: Vec<u32>,
    pub label:          u8,
}

impl EncodedRecord {
    pub fn seq_len(&self) -> usize {
        self.input_ids.len()
    }

    /// Number of real (non-padding) positions.
    pub fn real_tokens(&self) -> usize {
        self.attention_mask.iter().filter(|&&m| m == 1).count()
    }
}

/// Disjoint train/test partitions of the cleaned dataset.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SplitDataset {
    pub train: Vec<CleanedRecord>,
    pub test:  Vec<CleanedRecord>,
}

impl SplitDataset {
    pub fn total(&self) -> usize {
        self.train.len() + self.test.len()
    }
}
