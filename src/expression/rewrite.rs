//! Head-based pattern matching and rewriting.
//!
//! Two forms share the same semantics (ordered, first match wins, applied
//! once):
//!
//! - [`Transformer`]: a fluent chain over one value,
//!   `expr.on("Plus").apply(..).on("Times").apply(..).into_expression()`.
//!   Once a matcher fires, every later matcher in the chain is inactive.
//!   Further `apply` calls on the matcher that fired still run on its
//!   result, until the next `on`.
//! - [`RewriteRules`]: an ordered list of `(pattern, handler)` pairs applied
//!   by one dispatch call.

use crate::expression::atoms::{AtomSet, NoExtension};
use crate::expression::complex::{ComplexExpression, ExpressionArguments};
use crate::expression::span::ExpressionSpanArguments;
use crate::expression::{ExpressionResult, ExtensibleExpression, Symbol};
use log::trace;
use std::fmt;

/// Expected head of a matcher.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HeadPattern {
    /// Matches every complex expression
    Any,
    Exact(Symbol),
}

impl HeadPattern {
    pub fn matches(&self, head: &Symbol) -> bool {
        match self {
            HeadPattern::Any => true,
            HeadPattern::Exact(expected) => expected == head,
        }
    }
}

impl From<&str> for HeadPattern {
    fn from(name: &str) -> Self {
        HeadPattern::Exact(Symbol::new(name))
    }
}

impl From<Symbol> for HeadPattern {
    fn from(symbol: Symbol) -> Self {
        HeadPattern::Exact(symbol)
    }
}

impl fmt::Display for HeadPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HeadPattern::Any => write!(f, "_"),
            HeadPattern::Exact(symbol) => write!(f, "{}", symbol),
        }
    }
}

/// Fluent first-match-wins rewriter over one expression.
#[derive(Debug)]
pub struct Transformer<X = NoExtension> {
    value: ExtensibleExpression<X>,
    expected: HeadPattern,
    active: bool,
    in_line_with_matched: bool,
}

impl<X: AtomSet> ExtensibleExpression<X> {
    /// Start a rewrite chain expecting `pattern`.
    pub fn on(self, pattern: impl Into<HeadPattern>) -> Transformer<X> {
        Transformer {
            value: self,
            expected: pattern.into(),
            active: true,
            in_line_with_matched: false,
        }
    }
}

impl<X: AtomSet> Transformer<X> {
    /// Chain the next matcher. Stays inactive if an earlier one fired.
    pub fn on(self, pattern: impl Into<HeadPattern>) -> Self {
        Transformer {
            value: self.value,
            expected: pattern.into(),
            active: self.active,
            in_line_with_matched: false,
        }
    }

    /// Whether some matcher of the chain has fired.
    pub fn is_matched(&self) -> bool {
        !self.active
    }

    pub fn value(&self) -> &ExtensibleExpression<X> {
        &self.value
    }

    pub fn into_expression(self) -> ExtensibleExpression<X> {
        self.value
    }

    fn fires(&self, complex: &ComplexExpression<X>) -> bool {
        self.in_line_with_matched || (self.active && self.expected.matches(complex.head()))
    }

    /// Fallible variant of [`apply_with_head`](Self::apply_with_head).
    pub fn try_apply_with_head<F>(self, handler: F) -> ExpressionResult<Self>
    where
        F: FnOnce(
            Symbol,
            (),
            ExpressionArguments<X>,
            ExpressionSpanArguments,
        ) -> ExpressionResult<ExtensibleExpression<X>>,
    {
        let fires = matches!(&self.value, ExtensibleExpression::Complex(c) if self.fires(c));
        if !fires {
            return Ok(self);
        }
        let Transformer { value, expected, .. } = self;
        let ExtensibleExpression::Complex(complex) = value else {
            unreachable!("matched value is a complex expression");
        };
        trace!("rewriting {} on pattern {}", complex.head(), expected);
        let (head, statics, dynamics, spans) = complex.decompose();
        Ok(Transformer {
            value: handler(head, statics, dynamics, spans)?,
            expected,
            active: false,
            in_line_with_matched: true,
        })
    }

    /// Fallible variant of [`apply`](Self::apply).
    pub fn try_apply<F>(self, handler: F) -> ExpressionResult<Self>
    where
        F: FnOnce(
            (),
            ExpressionArguments<X>,
            ExpressionSpanArguments,
        ) -> ExpressionResult<ExtensibleExpression<X>>,
    {
        self.try_apply_with_head(|_, statics, dynamics, spans| handler(statics, dynamics, spans))
    }

    /// If the current value matches, decompose it and replace it with the
    /// handler's result. Otherwise pass it through.
    pub fn apply_with_head<F>(self, handler: F) -> Self
    where
        F: FnOnce(
            Symbol,
            (),
            ExpressionArguments<X>,
            ExpressionSpanArguments,
        ) -> ExtensibleExpression<X>,
    {
        let fires = matches!(&self.value, ExtensibleExpression::Complex(c) if self.fires(c));
        if !fires {
            return self;
        }
        let Transformer { value, expected, .. } = self;
        let ExtensibleExpression::Complex(complex) = value else {
            unreachable!("matched value is a complex expression");
        };
        let (head, statics, dynamics, spans) = complex.decompose();
        Transformer {
            value: handler(head, statics, dynamics, spans),
            expected,
            active: false,
            in_line_with_matched: true,
        }
    }

    /// Same as [`apply_with_head`](Self::apply_with_head) for handlers that
    /// do not need the head.
    pub fn apply<F>(self, handler: F) -> Self
    where
        F: FnOnce((), ExpressionArguments<X>, ExpressionSpanArguments) -> ExtensibleExpression<X>,
    {
        self.apply_with_head(|_, statics, dynamics, spans| handler(statics, dynamics, spans))
    }
}

impl<X: AtomSet> From<Transformer<X>> for ExtensibleExpression<X> {
    fn from(transformer: Transformer<X>) -> Self {
        transformer.into_expression()
    }
}

/// Handler that evaluates every dynamic argument with `evaluate` and rebuilds
/// the node. Statics and spans are kept as they are.
pub fn recurse<X, F>(
    mut evaluate: F,
) -> impl FnOnce(
    Symbol,
    (),
    ExpressionArguments<X>,
    ExpressionSpanArguments,
) -> ExtensibleExpression<X>
where
    X: AtomSet,
    F: FnMut(ExtensibleExpression<X>) -> ExtensibleExpression<X>,
{
    move |head: Symbol, statics: (), dynamics: ExpressionArguments<X>, spans| {
        let dynamics = dynamics.into_iter().map(&mut evaluate).collect();
        ExtensibleExpression::Complex(ComplexExpression::from_parts(head, statics, dynamics, spans))
    }
}

/// Fallible [`recurse`]; stops at the first failing argument.
pub fn try_recurse<X, F>(
    mut evaluate: F,
) -> impl FnOnce(
    Symbol,
    (),
    ExpressionArguments<X>,
    ExpressionSpanArguments,
) -> ExpressionResult<ExtensibleExpression<X>>
where
    X: AtomSet,
    F: FnMut(ExtensibleExpression<X>) -> ExpressionResult<ExtensibleExpression<X>>,
{
    move |head: Symbol, statics: (), dynamics: ExpressionArguments<X>, spans| {
        let dynamics = dynamics
            .into_iter()
            .map(&mut evaluate)
            .collect::<ExpressionResult<Vec<_>>>()?;
        Ok(ExtensibleExpression::Complex(ComplexExpression::from_parts(
            head, statics, dynamics, spans,
        )))
    }
}

type RuleHandler<'r, X> = Box<
    dyn Fn(
            Symbol,
            ExpressionArguments<X>,
            ExpressionSpanArguments,
        ) -> ExpressionResult<ExtensibleExpression<X>>
        + Send
        + Sync
        + 'r,
>;

/// Ordered rewrite rules applied by a single dispatch.
pub struct RewriteRules<'r, X = NoExtension> {
    rules: Vec<(HeadPattern, RuleHandler<'r, X>)>,
}

impl<'r, X: AtomSet> RewriteRules<'r, X> {
    pub fn new() -> Self {
        Self { rules: Vec::new() }
    }

    /// Append a rule. Earlier rules take precedence.
    pub fn rule<F>(mut self, pattern: impl Into<HeadPattern>, handler: F) -> Self
    where
        F: Fn(
                Symbol,
                ExpressionArguments<X>,
                ExpressionSpanArguments,
            ) -> ExpressionResult<ExtensibleExpression<X>>
            + Send
            + Sync
            + 'r,
    {
        self.rules.push((pattern.into(), Box::new(handler)));
        self
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Whether some rule would fire on `expr`.
    pub fn matches(&self, expr: &ExtensibleExpression<X>) -> bool {
        match expr.head() {
            Some(head) => self.rules.iter().any(|(pattern, _)| pattern.matches(head)),
            None => false,
        }
    }

    /// Rewrite `expr` with the first rule whose pattern matches its head.
    /// Atoms and unmatched nodes are returned unchanged.
    pub fn apply(
        &self,
        expr: ExtensibleExpression<X>,
    ) -> ExpressionResult<ExtensibleExpression<X>> {
        let ExtensibleExpression::Complex(complex) = expr else {
            return Ok(expr);
        };
        let Some((pattern, handler)) = self
            .rules
            .iter()
            .find(|(pattern, _)| pattern.matches(complex.head()))
        else {
            return Ok(ExtensibleExpression::Complex(complex));
        };
        trace!("rule {} fires on {}", pattern, complex.head());
        let (head, (), dynamics, spans) = complex.decompose();
        handler(head, dynamics, spans)
    }
}

impl<X: AtomSet> Default for RewriteRules<'_, X> {
    fn default() -> Self {
        Self::new()
    }
}

impl<X> fmt::Debug for RewriteRules<'_, X> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(self.rules.iter().map(|(pattern, _)| pattern))
            .finish()
    }
}
