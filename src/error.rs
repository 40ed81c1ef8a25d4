//! Error types for tablekv
//!
//! Provides a unified error type for all table operations. A miss is never an
//! error: lookups return `Ok(None)` when a key is absent.

use thiserror::Error;

/// Result type alias using TableError
pub type Result<T> = std::result::Result<T, TableError>;

/// Unified error type for tablekv operations
#[derive(Debug, Error)]
pub enum TableError {
    // -------------------------------------------------------------------------
    // Caller Errors
    // -------------------------------------------------------------------------
    /// Rejected before any mutation: empty key, wrong arity, bad names, ...
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Missing table: {0}")]
    MissingTable(String),

    #[error("Table already exists: {0}")]
    TableExists(String),

    // -------------------------------------------------------------------------
    // I/O Errors
    // -------------------------------------------------------------------------
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Traversal error: {0}")]
    Traversal(#[from] walkdir::Error),

    // -------------------------------------------------------------------------
    // Storage Errors
    // -------------------------------------------------------------------------
    /// A row or ledger file could not be decoded
    #[error("Corrupt file: {0}")]
    Corruption(String),

    // -------------------------------------------------------------------------
    // Internal Errors
    // -------------------------------------------------------------------------
    /// Unreachable under the growth policy (e.g. a probe sequence with no free slot)
    #[error("Invariant violation: {0}")]
    InvariantViolation(String),
}

impl TableError {
    pub(crate) fn invalid(msg: impl Into<String>) -> Self {
        TableError::InvalidArgument(msg.into())
    }

    pub(crate) fn corrupt(msg: impl Into<String>) -> Self {
        TableError::Corruption(msg.into())
    }
}
