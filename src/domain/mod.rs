// ============================================================
// Layer 3 — Domain Layer
// ============================================================
// Pure Rust structs, traits and metric math.
//
// Rules for this layer:
//   - NO Burn framework types allowed here
//   - NO file I/O or network calls
//   - Only plain Rust structs, enums, traits and functions
//
// Reference: Rust Book §5 (Structs), §10 (Traits)

// Raw, cleaned and encoded records plus the train/test split
pub mod record;

// Confusion matrix, F1, ROC/AUC and the classification report
pub mod metrics;

// Hyperparameters of a fine-tuning run and their validation
pub mod arguments;

// Core abstractions (traits) that other layers implement
pub mod traits;
