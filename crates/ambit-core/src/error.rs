//! Context error types.

use thiserror::Error;

/// Errors raised by ambient-context operations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ContextError {
    /// A required argument was missing or unusable.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
}

/// Result type for ambient-context operations.
pub type ContextResult<T> = Result<T, ContextError>;
