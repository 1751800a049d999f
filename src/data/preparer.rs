// ============================================================
// Layer 4 — Dataset Preparer
// ============================================================
// Turns raw CSV rows into the train/test split of CleanedRecords.
//
//   RawRecord ──drop incomplete──▶ (text, label string)
//             ──coerce label────▶ (text, 0 | 1)
//             ──normalise text──▶ CleanedRecord
//             ──seeded split────▶ SplitDataset { train, test }
//
// Policy:
//   - rows missing text or label are dropped, never imputed
//   - labels must be integers ("1", "0", or integral floats like "1.0");
//     anything else stops the run
//   - integer labels other than 0 / 1 stop the run too, before any
//     text is normalised
//   - one seeded shuffle-then-split, so re-runs are identical

use crate::data::{normalizer::TextNormalizer, splitter::split_train_test, DatasetError};
use crate::domain::record::{CleanedRecord, RawRecord, SplitDataset};

/// Coerce a label field to an integer.
///
/// Integral floats ("1.0", "0.0") are accepted and truncated to
/// their integer value; text and fractional values are rejected.
pub fn coerce_label(row: usize, value: &str) -> Result<i64, DatasetError> {
    let trimmed = value.trim();
    if let Ok(v) = trimmed.parse::<i64>() {
        return Ok(v);
    }
    match trimmed.parse::<f64>() {
        Ok(v) if v.is_finite() && v.fract() == 0.0 => Ok(v as i64),
        _ => Err(DatasetError::InvalidLabel { row, value: value.to_string() }),
    }
}

pub struct DatasetPreparer {
    normalizer:     TextNormalizer,
    train_fraction: f64,
    seed:           u64,
}

impl DatasetPreparer {
    pub fn new(train_fraction: f64, seed: u64) -> Self {
        Self {
            normalizer: TextNormalizer::new(),
            train_fraction,
            seed,
        }
    }

    /// Filter, coerce, clean and split. Row numbers in errors are
    /// 1-based positions among the data rows.
    pub fn prepare(&self, raw: Vec<RawRecord>) -> Result<SplitDataset, DatasetError> {
        let total = raw.len();
        tracing::debug!(
            "Ignoring id/keyword/location columns ({} rows with an id, {} with a keyword, {} with a location)",
            raw.iter().filter(|r| r.id.is_some()).count(),
            raw.iter().filter(|r| r.keyword.is_some()).count(),
            raw.iter().filter(|r| r.location.is_some()).count()
        );

        // ── Drop incomplete rows ──────────────────────────────────────────────
        let complete: Vec<(usize, String, String)> = raw
            .into_iter()
            .enumerate()
            .filter_map(|(i, r)| Some((i + 1, r.text?, r.label?)))
            .collect();

        if complete.len() < total {
            tracing::info!(
                "Dropped {} of {} rows with missing text or label",
                total - complete.len(),
                total
            );
        }

        // ── Coerce labels (all of them, before any cleaning) ──────────────────
        let labelled = complete
            .into_iter()
            .map(|(row, text, label)| {
                let value = coerce_label(row, &label)?;
                match u8::try_from(value) {
                    Ok(l @ (0 | 1)) => Ok((text, l)),
                    _ => Err(DatasetError::LabelOutOfRange { row, value }),
                }
            })
            .collect::<Result<Vec<_>, _>>()?;

        // ── Normalise text ────────────────────────────────────────────────────
        let cleaned: Vec<CleanedRecord> = labelled
            .into_iter()
            .map(|(text, label)| CleanedRecord {
                cleaned_text: self.normalizer.clean(&text),
                label,
            })
            .collect();

        let empty = cleaned.iter().filter(|r| r.cleaned_text.is_empty()).count();
        if empty > 0 {
            tracing::debug!("{} records are empty after cleaning", empty);
        }

        // ── Shuffle + split ───────────────────────────────────────────────────
        let (train, test) = split_train_test(cleaned, self.train_fraction, self.seed);
        Ok(SplitDataset { train, test })
    }
}
