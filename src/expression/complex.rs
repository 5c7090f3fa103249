//! Complex expressions: a head symbol plus three argument channels.
//!
//! - *static*: a tuple whose element types are known at compile time,
//! - *dynamic*: an ordered vector of expressions,
//! - *span*: an ordered vector of spans (bulk, homogeneous runs).
//!
//! Logically a node has one argument sequence, the concatenation of the
//! three channels with spans expanded element by element. Equality and
//! positional access work on that sequence, so the same node built through
//! different channels compares equal.

use crate::expression::atoms::{AtomSet, NarrowsTo, NoExtension, WidensTo};
use crate::expression::span::{ElementRef, ExpressionSpanArgument, ExpressionSpanArguments};
use crate::expression::{
    CloneReason, ExpressionError, ExpressionResult, ExtensibleExpression, Symbol,
};
use log::trace;
use std::fmt;

/// Dynamic argument channel.
pub type ExpressionArguments<X = NoExtension> = Vec<ExtensibleExpression<X>>;

/// Complex expression whose static channel has type `S`.
#[derive(Debug)]
pub struct ComplexExpressionWithStaticArguments<S = (), X = NoExtension> {
    head: Symbol,
    statics: S,
    dynamics: ExpressionArguments<X>,
    spans: ExpressionSpanArguments,
}

/// Complex expression with an empty static channel. This is the form stored
/// inside expressions.
pub type ComplexExpression<X = NoExtension> = ComplexExpressionWithStaticArguments<(), X>;

/// A value that may sit in the static channel.
pub trait StaticArgument<X: AtomSet>: Sized {
    fn to_expression(&self) -> ExtensibleExpression<X>;

    fn into_expression(self) -> ExtensibleExpression<X>;

    fn clone_static(&self, reason: CloneReason) -> Self;
}

/// A tuple of static arguments.
pub trait StaticArguments<X: AtomSet>: Sized {
    const LEN: usize;

    fn to_expressions(&self) -> ExpressionArguments<X>;

    fn into_expressions(self) -> ExpressionArguments<X>;

    fn clone_statics(&self, reason: CloneReason) -> Self;
}

macro_rules! atom_static_argument {
    ($ty:ty, $variant:ident) => {
        impl<X: AtomSet> StaticArgument<X> for $ty {
            fn to_expression(&self) -> ExtensibleExpression<X> {
                ExtensibleExpression::$variant(self.clone())
            }

            fn into_expression(self) -> ExtensibleExpression<X> {
                ExtensibleExpression::$variant(self)
            }

            fn clone_static(&self, _reason: CloneReason) -> Self {
                self.clone()
            }
        }
    };
}

atom_static_argument!(bool, Bool);
atom_static_argument!(i64, Int64);
atom_static_argument!(f64, Double);
atom_static_argument!(String, String);
atom_static_argument!(Symbol, Symbol);

impl<S, X> StaticArgument<X> for ComplexExpressionWithStaticArguments<S, X>
where
    X: AtomSet,
    S: StaticArguments<X>,
{
    fn to_expression(&self) -> ExtensibleExpression<X> {
        ExtensibleExpression::Complex(self.deep_copy().into_dynamic())
    }

    fn into_expression(self) -> ExtensibleExpression<X> {
        ExtensibleExpression::Complex(self.into_dynamic())
    }

    fn clone_static(&self, reason: CloneReason) -> Self {
        self.clone(reason)
    }
}

impl<X: AtomSet> StaticArguments<X> for () {
    const LEN: usize = 0;

    fn to_expressions(&self) -> ExpressionArguments<X> {
        Vec::new()
    }

    fn into_expressions(self) -> ExpressionArguments<X> {
        Vec::new()
    }

    fn clone_statics(&self, _reason: CloneReason) -> Self {}
}

macro_rules! tuple_static_arguments {
    ($len:expr; $($name:ident : $idx:tt),+) => {
        impl<X: AtomSet, $($name: StaticArgument<X>),+> StaticArguments<X> for ($($name,)+) {
            const LEN: usize = $len;

            fn to_expressions(&self) -> ExpressionArguments<X> {
                vec![$(self.$idx.to_expression()),+]
            }

            fn into_expressions(self) -> ExpressionArguments<X> {
                vec![$(self.$idx.into_expression()),+]
            }

            fn clone_statics(&self, reason: CloneReason) -> Self {
                ($(self.$idx.clone_static(reason),)+)
            }
        }
    };
}

tuple_static_arguments!(1; A: 0);
tuple_static_arguments!(2; A: 0, B: 1);
tuple_static_arguments!(3; A: 0, B: 1, C: 2);
tuple_static_arguments!(4; A: 0, B: 1, C: 2, D: 3);
tuple_static_arguments!(5; A: 0, B: 1, C: 2, D: 3, E: 4);
tuple_static_arguments!(6; A: 0, B: 1, C: 2, D: 3, E: 4, F: 5);
tuple_static_arguments!(7; A: 0, B: 1, C: 2, D: 3, E: 4, F: 5, G: 6);
tuple_static_arguments!(8; A: 0, B: 1, C: 2, D: 3, E: 4, F: 5, G: 6, H: 7);

/// One position of a node's logical argument sequence.
#[derive(Debug)]
pub enum ArgumentRef<'a, X = NoExtension> {
    /// Dynamic argument, borrowed in place
    Expression(&'a ExtensibleExpression<X>),
    /// Static argument, materialised as an expression
    Static(ExtensibleExpression<X>),
    /// One element of a span argument
    Element(ElementRef<'a>),
}

impl<X: AtomSet> ArgumentRef<'_, X> {
    fn as_expression(&self) -> Option<&ExtensibleExpression<X>> {
        match self {
            ArgumentRef::Expression(e) => Some(e),
            ArgumentRef::Static(e) => Some(e),
            ArgumentRef::Element(_) => None,
        }
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            ArgumentRef::Expression(e) => e.type_name(),
            ArgumentRef::Static(e) => e.type_name(),
            ArgumentRef::Element(element) => match element {
                ElementRef::Bool(_) => "bool",
                ElementRef::Int64(_) => "long",
                ElementRef::Double(_) => "double",
                ElementRef::String(_) => "string",
                ElementRef::Symbol(_) => "Symbol",
            },
        }
    }

    /// Owned copy of this argument.
    pub fn to_expression(&self) -> ExtensibleExpression<X> {
        match self {
            ArgumentRef::Expression(e) => e.deep_copy(),
            ArgumentRef::Static(e) => e.deep_copy(),
            ArgumentRef::Element(element) => element.clone().into(),
        }
    }

    pub fn into_expression(self) -> ExtensibleExpression<X> {
        match self {
            ArgumentRef::Expression(e) => e.deep_copy(),
            ArgumentRef::Static(e) => e,
            ArgumentRef::Element(element) => element.into(),
        }
    }
}

impl<X: AtomSet> PartialEq for ArgumentRef<'_, X> {
    fn eq(&self, other: &Self) -> bool {
        match (self.as_expression(), other.as_expression()) {
            (Some(a), Some(b)) => a == b,
            (Some(a), None) => matches!(other, ArgumentRef::Element(e) if a.eq_element(e)),
            (None, Some(b)) => matches!(self, ArgumentRef::Element(e) if b.eq_element(e)),
            (None, None) => match (self, other) {
                (ArgumentRef::Element(a), ArgumentRef::Element(b)) => a == b,
                _ => false,
            },
        }
    }
}

impl<X: AtomSet> PartialEq<ExtensibleExpression<X>> for ArgumentRef<'_, X> {
    fn eq(&self, other: &ExtensibleExpression<X>) -> bool {
        match self {
            ArgumentRef::Expression(e) => *e == other,
            ArgumentRef::Static(e) => e == other,
            ArgumentRef::Element(element) => other.eq_element(element),
        }
    }
}

macro_rules! argument_eq_atom {
    ($($ty:ty),+) => {
        $(
            impl<X: AtomSet> PartialEq<$ty> for ArgumentRef<'_, X> {
                fn eq(&self, other: &$ty) -> bool {
                    *self == ExtensibleExpression::<X>::from(other.clone())
                }
            }
        )+
    };
}

argument_eq_atom!(bool, i64, f64, String, Symbol);

impl<X: AtomSet> fmt::Display for ArgumentRef<'_, X> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgumentRef::Expression(e) => write!(f, "{}", e),
            ArgumentRef::Static(e) => write!(f, "{}", e),
            ArgumentRef::Element(element) => write!(f, "{}", element),
        }
    }
}

impl<S, X> ComplexExpressionWithStaticArguments<S, X>
where
    X: AtomSet,
    S: StaticArguments<X>,
{
    /// Recompose a node from its channels.
    pub fn from_parts(
        head: Symbol,
        statics: S,
        dynamics: ExpressionArguments<X>,
        spans: ExpressionSpanArguments,
    ) -> Self {
        Self {
            head,
            statics,
            dynamics,
            spans,
        }
    }

    pub fn head(&self) -> &Symbol {
        &self.head
    }

    pub fn statics(&self) -> &S {
        &self.statics
    }

    pub fn statics_mut(&mut self) -> &mut S {
        &mut self.statics
    }

    pub fn dynamic_arguments(&self) -> &[ExtensibleExpression<X>] {
        &self.dynamics
    }

    pub fn dynamic_arguments_mut(&mut self) -> &mut ExpressionArguments<X> {
        &mut self.dynamics
    }

    pub fn span_arguments(&self) -> &[ExpressionSpanArgument] {
        &self.spans
    }

    pub fn span_arguments_mut(&mut self) -> &mut ExpressionSpanArguments {
        &mut self.spans
    }

    /// Move the node apart into `(head, statics, dynamics, spans)`.
    pub fn decompose(self) -> (Symbol, S, ExpressionArguments<X>, ExpressionSpanArguments) {
        (self.head, self.statics, self.dynamics, self.spans)
    }

    /// Length of the logical argument sequence.
    pub fn argument_count(&self) -> usize {
        S::LEN + self.dynamics.len() + self.spans.iter().map(|s| s.len()).sum::<usize>()
    }

    /// The logical argument sequence: statics, then dynamics, then every
    /// span element in order.
    pub fn arguments(&self) -> impl Iterator<Item = ArgumentRef<'_, X>> + '_ {
        self.statics
            .to_expressions()
            .into_iter()
            .map(ArgumentRef::Static)
            .chain(self.dynamics.iter().map(ArgumentRef::Expression))
            .chain(
                self.spans
                    .iter()
                    .flat_map(|span| span.elements().map(ArgumentRef::Element)),
            )
    }

    /// Argument at `index` in the logical sequence.
    pub fn argument(&self, index: usize) -> Option<ArgumentRef<'_, X>> {
        if index < S::LEN {
            return self
                .statics
                .to_expressions()
                .into_iter()
                .nth(index)
                .map(ArgumentRef::Static);
        }
        let mut index = index - S::LEN;
        if let Some(e) = self.dynamics.get(index) {
            return Some(ArgumentRef::Expression(e));
        }
        index -= self.dynamics.len();
        for span in &self.spans {
            if index < span.len() {
                return span.element(index).map(ArgumentRef::Element);
            }
            index -= span.len();
        }
        None
    }

    /// Owned copy of one argument, leaving the node untouched.
    pub fn clone_argument(
        &self,
        index: usize,
        reason: CloneReason,
    ) -> ExpressionResult<ExtensibleExpression<X>> {
        trace!("cloning argument {} of {} ({:?})", index, self.head, reason);
        self.argument(index)
            .map(ArgumentRef::into_expression)
            .ok_or(ExpressionError::ArgumentIndexOutOfBounds {
                index,
                count: self.argument_count(),
            })
    }

    /// Move one argument out, dropping the rest of the node.
    pub fn into_argument(self, index: usize) -> ExpressionResult<ExtensibleExpression<X>> {
        let count = self.argument_count();
        self.into_arguments()
            .into_iter()
            .nth(index)
            .ok_or(ExpressionError::ArgumentIndexOutOfBounds { index, count })
    }

    /// Flatten all channels into one dynamic argument vector. Span elements
    /// become atoms.
    pub fn into_arguments(self) -> ExpressionArguments<X> {
        let mut arguments = self.statics.into_expressions();
        arguments.reserve(self.dynamics.len());
        arguments.extend(self.dynamics);
        for span in &self.spans {
            arguments.extend(span.elements().map(ExtensibleExpression::from));
        }
        arguments
    }

    /// Erase the static channel by moving it to the front of the dynamic one.
    pub fn into_dynamic(self) -> ComplexExpression<X> {
        let mut dynamics = self.statics.into_expressions();
        if dynamics.is_empty() {
            dynamics = self.dynamics;
        } else {
            dynamics.extend(self.dynamics);
        }
        ComplexExpression::from_parts(self.head, (), dynamics, self.spans)
    }

    /// Explicit deep copy.
    pub fn clone(&self, reason: CloneReason) -> Self {
        trace!("cloning complex expression {} ({:?})", self.head, reason);
        self.deep_copy()
    }

    pub(crate) fn deep_copy(&self) -> Self {
        Self {
            head: self.head.clone(),
            statics: self.statics.clone_statics(CloneReason::ArgumentExtraction),
            dynamics: self.dynamics.iter().map(|e| e.deep_copy()).collect(),
            spans: self.spans.iter().map(|s| s.clone_owned()).collect(),
        }
    }
}

impl<X: AtomSet> ComplexExpression<X> {
    pub fn new(head: Symbol, dynamics: ExpressionArguments<X>) -> Self {
        Self::from_parts(head, (), dynamics, Vec::new())
    }

    pub fn with_spans(head: Symbol, spans: ExpressionSpanArguments) -> Self {
        Self::from_parts(head, (), Vec::new(), spans)
    }

    pub fn widen<Y: AtomSet>(self) -> ComplexExpression<Y>
    where
        X: WidensTo<Y>,
    {
        ComplexExpression::from_parts(
            self.head,
            (),
            self.dynamics.into_iter().map(|e| e.widen()).collect(),
            self.spans,
        )
    }

    pub fn try_narrow<Y: AtomSet>(self) -> ExpressionResult<ComplexExpression<Y>>
    where
        X: NarrowsTo<Y>,
    {
        let dynamics = self
            .dynamics
            .into_iter()
            .map(|e| e.try_narrow())
            .collect::<ExpressionResult<Vec<_>>>()?;
        Ok(ComplexExpression::from_parts(
            self.head,
            (),
            dynamics,
            self.spans,
        ))
    }
}

impl<S1, S2, X> PartialEq<ComplexExpressionWithStaticArguments<S2, X>>
    for ComplexExpressionWithStaticArguments<S1, X>
where
    X: AtomSet,
    S1: StaticArguments<X>,
    S2: StaticArguments<X>,
{
    fn eq(&self, other: &ComplexExpressionWithStaticArguments<S2, X>) -> bool {
        if self.head != other.head || self.argument_count() != other.argument_count() {
            return false;
        }
        if S1::LEN == 0 && S2::LEN == 0 && self.spans.is_empty() && other.spans.is_empty() {
            return self.dynamics == other.dynamics;
        }
        self.arguments().zip(other.arguments()).all(|(a, b)| a == b)
    }
}

impl<S, X> PartialEq<ExtensibleExpression<X>> for ComplexExpressionWithStaticArguments<S, X>
where
    X: AtomSet,
    S: StaticArguments<X>,
{
    fn eq(&self, other: &ExtensibleExpression<X>) -> bool {
        other == self
    }
}

impl<S, X> fmt::Display for ComplexExpressionWithStaticArguments<S, X>
where
    X: AtomSet,
    S: StaticArguments<X>,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}[", self.head)?;
        for (i, argument) in self.arguments().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", argument)?;
        }
        write!(f, "]")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::complex;
    use crate::expression::{Expression, ExpressionBuilder, Span};
    use rand::Rng;

    fn random_pair() -> (i64, i64) {
        let mut rng = rand::thread_rng();
        (rng.gen_range(1..=100), rng.gen_range(1..=100))
    }

    #[test]
    fn test_channels_compare_equal() {
        for _ in 0..9 {
            let (v1, v2) = random_pair();
            let dynamic = complex!("UnevaluatedPlus", v1, v2);
            assert_eq!(dynamic.head().name(), "UnevaluatedPlus");
            assert!(dynamic.argument(0).unwrap() == v1);
            assert!(dynamic.argument(1).unwrap() == v2);

            let statics = ComplexExpressionWithStaticArguments::<(i64, i64)>::from_parts(
                Symbol::new("UnevaluatedPlus"),
                (v1, v2),
                Vec::new(),
                Vec::new(),
            );
            assert_eq!(dynamic, statics);
            assert_eq!(statics, dynamic);

            let spans = ComplexExpression::with_spans(
                Symbol::new("UnevaluatedPlus"),
                vec![Span::from_vec(vec![v1, v2]).into()],
            );
            assert_eq!(dynamic, spans);
            assert_eq!(spans, statics);

            let mixed = ComplexExpressionWithStaticArguments::<(i64,)>::from_parts(
                Symbol::new("UnevaluatedPlus"),
                (v1,),
                Vec::new(),
                vec![Span::from_vec(vec![v2]).into()],
            );
            assert_eq!(mixed, dynamic);
            assert_ne!(mixed, complex!("UnevaluatedPlus", v1, v2 + 1));
            assert_ne!(mixed, complex!("OtherHead", v1, v2));
        }
    }

    #[test]
    fn test_nested_span_expression() {
        let (v1, v2) = random_pair();
        let nested = ComplexExpression::with_spans(
            Symbol::new("UnevaluatedPlus"),
            vec![Span::from_vec(vec![v1, v2]).into()],
        );
        let outer = ComplexExpression::new(
            Symbol::new("UnevaluatedPlus"),
            vec![Expression::from(nested)],
        );
        assert_eq!(
            complex!("UnevaluatedPlus", complex!("UnevaluatedPlus", v1, v2)),
            outer
        );
    }

    #[test]
    fn test_static_complex_subexpression() {
        let (v1, _) = random_pair();
        let inner = ComplexExpressionWithStaticArguments::<(i64,)>::from_parts(
            Symbol::new("UnevaluatedPlus"),
            (v1,),
            Vec::new(),
            Vec::new(),
        );
        let outer = ExpressionBuilder::new("Duh").call((inner,));
        assert_eq!(outer.head().name(), "Duh");
        assert_eq!(outer.argument_count(), 1);
        assert_eq!(outer, complex!("Duh", complex!("UnevaluatedPlus", v1)));
    }

    #[test]
    fn test_decompose_and_recompose() {
        let e = complex!("List", 1, "two", Symbol::new("three"));
        let (head, statics, dynamics, spans) = e.decompose();
        assert_eq!(head.name(), "List");
        assert_eq!(dynamics.len(), 3);
        assert!(spans.is_empty());
        let rebuilt = ComplexExpression::from_parts(head, statics, dynamics, spans);
        assert_eq!(rebuilt, complex!("List", 1, "two", Symbol::new("three")));
    }

    #[test]
    fn test_argument_access_across_channels() {
        let e = ComplexExpressionWithStaticArguments::<(bool,)>::from_parts(
            Symbol::new("Row"),
            (true,),
            vec![Expression::from("x")],
            vec![
                Span::from_vec(vec![1.5, 2.5]).into(),
                Span::from_vec(vec![Symbol::new("s")]).into(),
            ],
        );
        assert_eq!(e.argument_count(), 5);
        assert!(e.argument(0).unwrap() == true);
        assert!(e.argument(1).unwrap() == "x".to_string());
        assert!(e.argument(3).unwrap() == 2.5);
        assert!(e.argument(4).unwrap() == Symbol::new("s"));
        assert!(e.argument(5).is_none());
        assert_eq!(e.to_string(), "Row[true, \"x\", 1.5, 2.5, s]");

        assert_eq!(
            e.clone_argument(2, CloneReason::ForTesting).unwrap(),
            Expression::Double(1.5)
        );
        assert_eq!(
            e.clone_argument(7, CloneReason::ForTesting).unwrap_err(),
            ExpressionError::ArgumentIndexOutOfBounds { index: 7, count: 5 }
        );
    }

    #[test]
    fn test_into_arguments_flattens_spans() {
        let e = ComplexExpression::<NoExtension>::from_parts(
            Symbol::new("duh"),
            (),
            vec![Expression::from(0)],
            vec![Span::from_vec(vec![1i64, 2, 3]).into()],
        );
        let args = e.into_arguments();
        assert_eq!(args.len(), 4);
        assert_eq!(args[3], Expression::Int64(3));
    }

    #[test]
    fn test_span_arguments_read_as_arguments() {
        let input = vec![5.0, 17.5, 3.25, 9.0, 1.0];
        let e = ExpressionBuilder::new("duh").spans([Span::from_vec(input.clone())]);
        assert_eq!(e.argument_count(), input.len());
        for (i, value) in input.iter().enumerate() {
            assert!(e.argument(i).unwrap() == *value);
        }
    }

    #[test]
    fn test_clone_with_spans_is_independent() {
        let e = ExpressionBuilder::new("duh").spans([Span::from_vec(vec![1i64, 2, 3])]);
        let mut copy = e.clone(CloneReason::ForTesting);
        if let ExpressionSpanArgument::Int64(span) = &mut copy.span_arguments_mut()[0] {
            span.make_mut()[0] = 42;
        }
        assert!(e.argument(0).unwrap() == 1i64);
        assert!(copy.argument(0).unwrap() == 42i64);
    }

    #[test]
    fn test_move_into_argument() {
        let e = complex!("List", complex!("howdie", 1, 2, 3));
        let inner = e.into_argument(0).unwrap();
        assert!(inner.has_head("howdie"));
    }
}
