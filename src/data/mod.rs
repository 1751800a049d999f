// ============================================================
// Layer 4 — Data Pipeline
// ============================================================
// This layer handles everything from the raw tweets CSV all the
// way to tensor batches.
//
// The pipeline flows in this order:
//
//   train.csv
//       │
//       ▼
//   CsvLoader         → reads Latin-1 bytes, yields RawRecords
//       │
//       ▼
//   DatasetPreparer   → drops incomplete rows, coerces labels,
//       │               cleans text (TextNormalizer), splits
//       ▼
//   EncoderAdapter    → token ids + attention mask, fixed length
//       │
//       ▼
//   EncodedDataset    → implements Burn's Dataset trait
//       │
//       ▼
//   ClassificationBatcher → stacks records into tensor batches
//
// Reference: Burn Book §4 (Datasets and Dataloaders)
//            Rust Book §13 (Iterators and Closures)

/// Errors raised while reading and validating the dataset
pub mod error;

/// Reads the tweets CSV into RawRecords
pub mod loader;

/// Lowercasing, symbol stripping and stopword removal
pub mod normalizer;

/// Filters, coerces labels, cleans and splits the dataset
pub mod preparer;

/// Seeded shuffle + train/test split
pub mod splitter;

/// Fixed-length token encoding on top of a TextEncoder
pub mod encoder;

/// Implements Burn's Dataset trait for encoded records
pub mod dataset;

/// Implements Burn's Batcher trait to create tensor batches
pub mod batcher;

pub use error::DatasetError;
