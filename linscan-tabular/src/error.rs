//! Error types for tabular operations.

use thiserror::Error;

/// Errors from schema construction and row validation.
#[derive(Debug, Error)]
pub enum TabularError {
    /// Schema or structural error (duplicate column, arity mismatch, etc.)
    #[error("Schema error: {0}")]
    Schema(String),

    /// Column type string not recognised
    #[error("Unknown column type: {0}")]
    UnknownType(String),

    /// A value does not conform to its column type
    #[error("Value error: {0}")]
    Value(String),
}

impl TabularError {
    pub fn schema(msg: impl Into<String>) -> Self {
        Self::Schema(msg.into())
    }

    pub fn value(msg: impl Into<String>) -> Self {
        Self::Value(msg.into())
    }
}

/// Result type for tabular operations.
pub type Result<T> = std::result::Result<T, TabularError>;
