use burn::data::dataset::Dataset;

use crate::domain::record::EncodedRecord;

/// In-memory encoded records, exposed to Burn's DataLoader.
pub struct EncodedDataset {
    records: Vec<EncodedRecord>,
}

impl EncodedDataset {
    pub fn new(records: Vec<EncodedRecord>) -> Self { Self { records } }
}

impl Dataset<EncodedRecord> for EncodedDataset {
    fn get(&self, index: usize) -> Option<EncodedRecord> {
        self.records.get(index).cloned()
    }

    fn len(&self) -> usize {
        self.records.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_and_len() {
        let record = EncodedRecord { input_ids: vec![2, 7, 3, 0], attention_mask: vec![1, 1, 1, 0], label: 1 };
        let ds     = EncodedDataset::new(vec![record.clone()]);
        assert_eq!(ds.len(), 1);
        assert_eq!(ds.get(0), Some(record));
        assert_eq!(ds.get(1), None);
    }
}
