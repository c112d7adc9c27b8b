//! Error types for expression generation and query snapshots

use sieve_core::{CoreError, FilterOperator};
use thiserror::Error;

/// Errors raised while compiling a query or restoring a snapshot.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GenerateError {
    #[error("Unexpected value for {property}: expected {expected}, got {actual}")]
    UnexpectedValueType {
        property: String,
        expected: String,
        actual: String,
    },

    #[error("Operator {operator} is not supported for {value_type} values")]
    UnsupportedOperator {
        operator: FilterOperator,
        value_type: String,
    },

    #[error("Snapshot error: {reason}")]
    Snapshot { reason: String },

    #[error(transparent)]
    Core(#[from] CoreError),
}

/// Result type for generator operations.
pub type GenerateResult<T> = Result<T, GenerateError>;

// =============================================================================
// TESTS
// =============================================================================
