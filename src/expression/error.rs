//! Error types for expression access and conversion.

use thiserror::Error;

/// Errors raised by typed access to expressions.
///
/// All of these are recoverable: callers that want to branch instead of fail
/// use the non-failing accessors (`get_if`, `holds_alternative`).
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ExpressionError {
    /// The expression holds a different alternative than the one requested
    #[error("expected and actual type mismatch in expression \"{actual}\", expected {expected}")]
    TypeMismatch {
        expected: &'static str,
        actual: String,
    },

    /// Positional argument access past the end of the argument sequence
    #[error("argument index {index} out of bounds for expression with {count} arguments")]
    ArgumentIndexOutOfBounds { index: usize, count: usize },

    /// An extension atom has no counterpart in the target atom set
    #[error("cannot narrow atom {atom} of type {type_name} into the target expression system")]
    NarrowingFailed {
        atom: String,
        type_name: &'static str,
    },

    /// Arguments do not have the shape an operator expects
    #[error("invalid arguments for {head}: {reason}")]
    InvalidArguments { head: String, reason: String },
}

/// Result type for expression operations
pub type ExpressionResult<T> = Result<T, ExpressionError>;

impl ExpressionError {
    pub fn invalid_arguments(head: impl Into<String>, reason: impl Into<String>) -> Self {
        ExpressionError::InvalidArguments {
            head: head.into(),
            reason: reason.into(),
        }
    }
}
