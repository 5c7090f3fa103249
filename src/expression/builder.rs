//! Builder DSL for complex expressions.
//!
//! A builder is bound to a head symbol and turned into a node through one of
//! three entry points, one per argument channel:
//!
//! - [`call`](ExtensibleExpressionBuilder::call) with a tuple of atoms or
//!   statically typed sub-expressions yields a statically typed node,
//! - [`args`](ExtensibleExpressionBuilder::args) with anything convertible to
//!   an expression yields a node with dynamic arguments,
//! - [`spans`](ExtensibleExpressionBuilder::spans) yields a node with span
//!   arguments only.
//!
//! The [`complex!`](crate::complex) macro is shorthand for the dynamic form.

use crate::expression::atoms::{AtomSet, NoExtension};
use crate::expression::complex::{
    ComplexExpression, ComplexExpressionWithStaticArguments, StaticArguments,
};
use crate::expression::span::ExpressionSpanArgument;
use crate::expression::{ExtensibleExpression, Symbol};
use std::marker::PhantomData;
use std::ops::BitOr;

/// Builds complex expressions with a fixed head.
#[derive(Debug, Clone)]
pub struct ExtensibleExpressionBuilder<X = NoExtension> {
    head: Symbol,
    _atoms: PhantomData<fn() -> X>,
}

/// Builder for the plain expression system.
pub type ExpressionBuilder = ExtensibleExpressionBuilder<NoExtension>;

impl<X: AtomSet> ExtensibleExpressionBuilder<X> {
    pub fn new(head: impl Into<Symbol>) -> Self {
        Self {
            head: head.into(),
            _atoms: PhantomData,
        }
    }

    pub fn symbol(&self) -> Symbol {
        self.head.clone()
    }

    /// Statically typed node; the tuple stays a tuple.
    pub fn call<S: StaticArguments<X>>(
        &self,
        statics: S,
    ) -> ComplexExpressionWithStaticArguments<S, X> {
        ComplexExpressionWithStaticArguments::from_parts(
            self.head.clone(),
            statics,
            Vec::new(),
            Vec::new(),
        )
    }

    /// Node with dynamic arguments. Text literals become string atoms.
    pub fn args<I, E>(&self, args: I) -> ComplexExpression<X>
    where
        I: IntoIterator<Item = E>,
        E: Into<ExtensibleExpression<X>>,
    {
        ComplexExpression::new(self.head.clone(), args.into_iter().map(Into::into).collect())
    }

    /// Head-only node.
    pub fn empty(&self) -> ComplexExpression<X> {
        ComplexExpression::new(self.head.clone(), Vec::new())
    }

    /// Node with one span argument per input span.
    pub fn spans<I, A>(&self, spans: I) -> ComplexExpression<X>
    where
        I: IntoIterator<Item = A>,
        A: Into<ExpressionSpanArgument>,
    {
        let spans = spans.into_iter().map(Into::into).collect();
        ComplexExpression::with_spans(self.head.clone(), spans)
    }
}

impl<X> From<ExtensibleExpressionBuilder<X>> for Symbol {
    fn from(builder: ExtensibleExpressionBuilder<X>) -> Self {
        builder.head
    }
}

impl<X: AtomSet> From<&ExtensibleExpressionBuilder<X>> for ExtensibleExpression<X> {
    fn from(builder: &ExtensibleExpressionBuilder<X>) -> Self {
        ExtensibleExpression::Symbol(builder.symbol())
    }
}

/// `expr | &builder` wraps `expr` as the single argument of a new node.
impl<X: AtomSet> BitOr<&ExtensibleExpressionBuilder<X>> for ExtensibleExpression<X> {
    type Output = ExtensibleExpression<X>;

    fn bitor(self, builder: &ExtensibleExpressionBuilder<X>) -> Self::Output {
        ExtensibleExpression::Complex(builder.args([self]))
    }
}

/// Dynamic-form construction: `complex!("Plus", 1, 2)`.
#[macro_export]
macro_rules! complex {
    ($head:expr $(, $arg:expr)* $(,)?) => {{
        let args: ::std::vec::Vec<$crate::expression::Expression> =
            vec![$($crate::expression::Expression::from($arg)),*];
        $crate::expression::ComplexExpression::new($crate::expression::Symbol::new($head), args)
    }};
}
