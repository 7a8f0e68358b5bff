//! Error types shared across the crate
//!
//! Every failure in the library surfaces as a typed `NetworkError`; nothing
//! is logged-and-swallowed inside the engine.

use thiserror::Error;

/// Errors produced by the network engine and its glue modules.
#[derive(Error, Debug)]
pub enum NetworkError {
    /// A vector or matrix length disagrees with the declared layer sizes.
    #[error("shape mismatch for {what}: expected {expected}, got {got}")]
    ShapeMismatch {
        /// Which tensor violated the invariant (e.g. "input", "b3").
        what: &'static str,
        /// Expected length.
        expected: usize,
        /// Observed length.
        got: usize,
    },

    /// A loaded snapshot declares non-positive layer sizes.
    #[error("invalid network: {0}")]
    InvalidNetwork(String),

    /// Reading or writing a file failed.
    #[error("persistence failure: {0}")]
    Persistence(#[from] std::io::Error),

    /// Encoding or decoding a JSON payload failed.
    #[error("encoding failure: {0}")]
    Encoding(#[from] serde_json::Error),

    /// The CSV reader rejected the dataset file.
    #[error("dataset read failed: {0}")]
    Dataset(#[from] csv::Error),

    /// A dataset record carries a label that does not parse as a number.
    #[error("record {record}: unparseable label '{label}'")]
    InvalidLabel {
        /// Zero-based record index in the file.
        record: usize,
        /// The raw label field.
        label: String,
    },

    /// A dataset record is missing the word or label field.
    #[error("record {0}: expected word and label fields")]
    MalformedRecord(usize),

    /// Training was started with no samples.
    #[error("dataset is empty")]
    EmptyDataset,

    /// A configuration value is out of range.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}
