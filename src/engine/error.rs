//! Engine layer error types.

use crate::expression::ExpressionError;
use thiserror::Error;

/// Failures raised while routing an expression through engines.
///
/// [`Coordinator::evaluate`](crate::engine::Coordinator::evaluate) turns every
/// one of these into an `ErrorWhenEvaluatingExpression` value; only
/// `try_evaluate` hands them out.
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Unknown engine: {0}")]
    UnknownEngine(String),

    #[error("Malformed {directive} directive: {reason}")]
    MalformedDirective {
        directive: &'static str,
        reason: String,
    },

    #[error("Engine {engine} failed: {message}")]
    Failure { engine: String, message: String },

    #[error(transparent)]
    Expression(#[from] ExpressionError),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Result type for engine operations.
pub type EngineResult<T> = Result<T, EngineError>;

impl EngineError {
    pub fn malformed(directive: &'static str, reason: impl Into<String>) -> Self {
        EngineError::MalformedDirective {
            directive,
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expression_errors_keep_their_message() {
        let err = EngineError::from(ExpressionError::TypeMismatch {
            expected: "string",
            actual: "9".to_string(),
        });
        assert_eq!(
            err.to_string(),
            "expected and actual type mismatch in expression \"9\", expected string"
        );

        let err = EngineError::from(anyhow::anyhow!("plugin gave up"));
        assert_eq!(err.to_string(), "plugin gave up");
    }
}
