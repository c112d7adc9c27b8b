//! Error types for SIEVE model operations

use thiserror::Error;

/// Errors raised while building or restoring query model values.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CoreError {
    #[error("Unsupported conjunction '{value}'")]
    InvalidConjunction { value: String },

    #[error("Unsupported filter operator '{value}'")]
    InvalidOperator { value: String },

    #[error("Unknown field path: {path}")]
    UnknownField { path: String },

    #[error("Invalid value for {field}: {reason}")]
    InvalidValue { field: String, reason: String },

    #[error("Field {path} has no accessor")]
    MissingAccessor { path: String },

    #[error("Accessor expects an entity of type {expected}")]
    EntityMismatch { expected: String },

    #[error("Page source failed: {reason}")]
    PageSource { reason: String },

    #[error("Cannot move past the last page")]
    PageExhausted,

    #[error("Invalid configuration for {field}: {reason}")]
    Config { field: String, reason: String },
}

/// Result type alias for model operations.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// TESTS
// =============================================================================
