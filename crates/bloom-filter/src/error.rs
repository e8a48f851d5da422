//! Error types for the Bloom filter crate

use thiserror::Error;

/// Errors that can occur when building, importing or combining filters
///
/// Out-of-range bit indices are not represented here: they are contract
/// violations on [`crate::BitArray`] and panic.
#[derive(Debug, Error, PartialEq)]
pub enum FilterError {
    #[error("Invalid filter parameters: {0}")]
    InvalidParameters(String),

    #[error("Invalid false positive rate: {fpr} (must be strictly between 0 and 1)")]
    InvalidFpr { fpr: f64 },

    #[error("Truncated filter data: expected {expected} bytes, got {actual}")]
    Truncated { expected: usize, actual: usize },

    #[error("Trailing bytes in filter data: expected {expected} bytes, got {actual}")]
    TrailingBytes { expected: usize, actual: usize },

    #[error("Incompatible filters: (m={left_m}, k={left_k}) vs (m={right_m}, k={right_k})")]
    IncompatibleFilters {
        left_m: u64,
        left_k: u64,
        right_m: u64,
        right_k: u64,
    },

    #[error("Serialization error: {0}")]
    Serialization(String),
}
