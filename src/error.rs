//! Error types for counter construction and neighbor sweeps.

use thiserror::Error;

/// Main error type for PMI neighbor operations.
///
/// Unknown keys and zero marginals are not errors: they surface as absent
/// statistics and are skipped by the sweep.
#[derive(Debug, Error)]
pub enum PmiError {
    /// CSR arrays violate a structural invariant.
    #[error("Invalid counts matrix: {0}")]
    InvalidMatrix(String),

    /// The total key is not part of the key index.
    #[error("Total key not in index: {total_key}")]
    UnknownTotalKey { total_key: String },

    /// A key points outside the matrix.
    #[error("Index {index} for key {key} out of range (rows: {rows})")]
    IndexOutOfRange {
        key: String,
        index: usize,
        rows: usize,
    },

    /// Two keys share the same row.
    #[error("Keys {first} and {second} share row {index}")]
    DuplicateIndex {
        first: String,
        second: String,
        index: usize,
    },

    /// Configuration validation failed.
    #[error("Configuration error: {0}")]
    Config(String),

    /// A partition of the parallel sweep failed.
    #[error("Worker failure: {0}")]
    WorkerFailure(String),

    /// JSON serialization/deserialization failure.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// I/O operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
