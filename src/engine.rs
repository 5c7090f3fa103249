//! Evaluation pipeline: engines and the coordinator that routes expressions
//! through them.
//!
//! An engine is anything that maps an expression to a (possibly further
//! reduced) expression. The [`Coordinator`] owns an ordered pipeline of
//! engine identifiers, recognises its directive expressions and reifies every
//! failure as an `ErrorWhenEvaluatingExpression` value.

pub mod coordinator;
pub mod error;
pub mod reference;
pub mod registry;

pub use coordinator::{
    Coordinator, SharedCoordinator, ERROR_WHEN_EVALUATING_EXPRESSION, EVALUATE_IN_ENGINES,
    SET_DEFAULT_ENGINE_PIPELINE,
};
pub use error::{EngineError, EngineResult};
pub use reference::{ReferenceEngine, REFERENCE_ENGINE};
pub use registry::EngineRegistry;

use crate::expression::Expression;
use std::sync::Arc;

/// A pluggable evaluator.
///
/// Engines return the input unchanged when they have nothing to do with it.
pub trait Engine: Send + Sync {
    fn evaluate(&self, expr: Expression) -> EngineResult<Expression>;
}

impl<F> Engine for F
where
    F: Fn(Expression) -> EngineResult<Expression> + Send + Sync,
{
    fn evaluate(&self, expr: Expression) -> EngineResult<Expression> {
        self(expr)
    }
}

/// Wrap a function as an engine.
pub fn from_fn<F>(f: F) -> Arc<dyn Engine>
where
    F: Fn(Expression) -> EngineResult<Expression> + Send + Sync + 'static,
{
    Arc::new(f)
}
