//! The evaluation-pipeline coordinator.

use super::error::{EngineError, EngineResult};
use super::registry::EngineRegistry;
use super::Engine;
use crate::expression::{CloneReason, ComplexExpression, Expression, ExpressionBuilder};
use log::{debug, info, warn};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;

/// `SetDefaultEnginePipeline("id", ...)` replaces the pipeline.
pub const SET_DEFAULT_ENGINE_PIPELINE: &str = "SetDefaultEnginePipeline";

/// `EvaluateInEngines(List("id", ...), payload)` evaluates `payload` with the
/// listed engines instead of the pipeline.
pub const EVALUATE_IN_ENGINES: &str = "EvaluateInEngines";

/// Head of reified evaluation failures: `(input, "message")`.
pub const ERROR_WHEN_EVALUATING_EXPRESSION: &str = "ErrorWhenEvaluatingExpression";

/// Coordinator for hosts that evaluate from several threads. The lock
/// serialises pipeline resets against evaluations.
pub type SharedCoordinator = Arc<Mutex<Coordinator>>;

/// Routes expressions through an ordered pipeline of engines.
///
/// Engines are resolved through the registry on first use and cached, so a
/// pipeline naming an unknown engine only fails once something is evaluated
/// with it.
pub struct Coordinator {
    registry: EngineRegistry,
    pipeline: Vec<String>,
    resolved: HashMap<String, Arc<dyn Engine>>,
}

impl Coordinator {
    /// Coordinator with an empty pipeline.
    pub fn new(registry: EngineRegistry) -> Self {
        Self {
            registry,
            pipeline: Vec::new(),
            resolved: HashMap::new(),
        }
    }

    pub fn shared(self) -> SharedCoordinator {
        Arc::new(Mutex::new(self))
    }

    pub fn registry(&self) -> &EngineRegistry {
        &self.registry
    }

    pub fn pipeline(&self) -> &[String] {
        &self.pipeline
    }

    pub fn set_pipeline<I, S>(&mut self, ids: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.pipeline = ids.into_iter().map(Into::into).collect();
        info!("engine pipeline set to [{}]", self.pipeline.join(", "));
    }

    /// Evaluate `expr`. Never fails: any failure comes back as
    /// `ErrorWhenEvaluatingExpression(<input>, "<message>")`.
    pub fn evaluate(&mut self, expr: Expression) -> Expression {
        let input = expr.clone(CloneReason::EvaluationErrorReport);
        match self.try_evaluate(expr) {
            Ok(result) => result,
            Err(err) => {
                warn!("evaluation of {} failed: {}", input, err);
                ExpressionBuilder::new(ERROR_WHEN_EVALUATING_EXPRESSION)
                    .args([input, Expression::from(err.to_string())])
                    .into()
            }
        }
    }

    /// Evaluate `expr`, returning failures as errors.
    pub fn try_evaluate(&mut self, expr: Expression) -> EngineResult<Expression> {
        if expr.has_head(SET_DEFAULT_ENGINE_PIPELINE) {
            let directive: ComplexExpression = expr.get()?;
            let ids = directive
                .into_arguments()
                .into_iter()
                .map(|id| id.get::<String>())
                .collect::<Result<Vec<_>, _>>()?;
            if ids.is_empty() {
                return Err(EngineError::malformed(
                    SET_DEFAULT_ENGINE_PIPELINE,
                    "expected at least one engine identifier",
                ));
            }
            self.set_pipeline(ids);
            return Ok(Expression::Bool(true));
        }

        if expr.has_head(EVALUATE_IN_ENGINES) {
            let directive: ComplexExpression = expr.get()?;
            let mut arguments = directive.into_arguments().into_iter();
            let (Some(engines), Some(payload), None) =
                (arguments.next(), arguments.next(), arguments.next())
            else {
                return Err(EngineError::malformed(
                    EVALUATE_IN_ENGINES,
                    "expected an engine list and a payload",
                ));
            };
            if !engines.has_head("List") {
                return Err(EngineError::malformed(
                    EVALUATE_IN_ENGINES,
                    format!("expected a List of engine identifiers, got {}", engines),
                ));
            }
            let ids = engines
                .get::<ComplexExpression>()?
                .into_arguments()
                .into_iter()
                .map(|id| id.get::<String>())
                .collect::<Result<Vec<_>, _>>()?;
            return self.run(&ids, payload);
        }

        let pipeline = self.pipeline.clone();
        self.run(&pipeline, expr)
    }

    fn engine(&mut self, id: &str) -> EngineResult<Arc<dyn Engine>> {
        if let Some(engine) = self.resolved.get(id) {
            return Ok(Arc::clone(engine));
        }
        let engine = self.registry.resolve(id)?;
        info!("resolved engine {}", id);
        self.resolved.insert(id.to_string(), Arc::clone(&engine));
        Ok(engine)
    }

    fn run(&mut self, ids: &[String], mut expr: Expression) -> EngineResult<Expression> {
        for id in ids {
            let engine = self.engine(id)?;
            debug!("dispatching {} to engine {}", expr.type_name(), id);
            expr = engine.evaluate(expr)?;
        }
        Ok(expr)
    }
}

impl std::fmt::Debug for Coordinator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Coordinator")
            .field("registry", &self.registry)
            .field("pipeline", &self.pipeline)
            .finish()
    }
}
