//! Error types for fem-sparse

use crate::builder::{AssemblyStats, StorageState};
use thiserror::Error;

/// Result type alias using the crate's [`SparseError`].
pub type Result<T> = std::result::Result<T, SparseError>;

/// Errors surfaced by the builder and its collaborators.
///
/// Backend status codes never reach callers raw; they are classified into
/// one of these variants by [`crate::backend::status`].
#[derive(Error, Debug)]
pub enum SparseError {
    /// Order or reserved capacity is zero where storage must be allocated.
    #[error("invalid dimensions: order {order}, reserved non-zeros {reserved_non_zeros}")]
    InvalidDimensions {
        /// Requested matrix order
        order: usize,
        /// Requested non-zero reservation
        reserved_non_zeros: usize,
    },

    /// An operation was requested in a phase that does not allow it.
    #[error("cannot {operation} while storage is {state}")]
    InvalidStateTransition {
        /// The rejected operation
        operation: &'static str,
        /// Phase the builder was in
        state: StorageState,
    },

    /// Row or column outside `0..order`.
    #[error("index ({row}, {col}) out of bounds for matrix of order {order}")]
    InvalidIndex {
        /// Zero-based row
        row: usize,
        /// Zero-based column
        col: usize,
        /// Matrix order
        order: usize,
    },

    /// The reserved non-zero budget cannot hold the requested structure.
    #[error(
        "reserved non-zero capacity {reserved_non_zeros} exhausted during {operation} ({stats}); \
         rebuild with a larger reservation"
    )]
    CapacityExceeded {
        /// The failing operation
        operation: &'static str,
        /// Reservation in effect
        reserved_non_zeros: usize,
        /// Counters of the builder at the time of failure
        stats: AssemblyStats,
    },

    /// Operand sizes disagree.
    #[error("dimension mismatch: expected {expected}, got {got}")]
    DimensionMismatch {
        /// Required length or order
        expected: usize,
        /// Supplied length or order
        got: usize,
    },

    /// An adopted compressed-row structure is inconsistent.
    #[error("malformed compressed-row structure: {reason}")]
    MalformedStructure {
        /// What was wrong
        reason: &'static str,
    },

    /// The backend returned a fatal status outside the known table.
    #[error("backend returned unrecognized status {code} during {operation}")]
    UnrecognizedStatus {
        /// The failing operation
        operation: &'static str,
        /// Raw status code
        code: u32,
    },

    /// A builder configuration could not be parsed or serialized.
    #[error("invalid builder configuration: {0}")]
    Config(#[from] serde_json::Error),
}
