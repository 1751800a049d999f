use thiserror::Error;

/// Fatal data-quality failures. None of these are recovered from:
/// the run stops at the first one.
#[derive(Debug, Error)]
pub enum DatasetError {
    #[error("cannot read '{path}': {source}")]
    Io {
        path:   String,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed CSV in '{path}': {source}")]
    Csv {
        path:   String,
        #[source]
        source: csv::Error,
    },

    #[error("row {row}: expected {expected} fields, saw {found}")]
    TooManyFields { row: usize, expected: usize, found: usize },

    #[error("required column '{0}' not found in header")]
    MissingColumn(&'static str),

    #[error("row {row}: label '{value}' cannot be converted to an integer")]
    InvalidLabel { row: usize, value: String },

    #[error("row {row}: label {value} is not a binary class (expected 0 or 1)")]
    LabelOutOfRange { row: usize, value: i64 },
}
