//! The expression value: a closed sum of the core atoms, complex nodes and
//! the caller's extension atoms.

use crate::expression::atoms::{AtomSet, NarrowsTo, NoExtension, WidensTo};
use crate::expression::complex::{
    ComplexExpression, ComplexExpressionWithStaticArguments, StaticArguments,
};
use crate::expression::span::ElementRef;
use crate::expression::{ExpressionError, ExpressionResult, Symbol};
use log::trace;
use std::fmt;

/// Why an explicit deep copy was requested. Only used for diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CloneReason {
    ForTesting,
    /// The coordinator keeps the input around to report it on failure
    EvaluationErrorReport,
    /// Copies handed out across the foreign-call boundary
    ForeignCall,
    /// A single argument is copied out of a node that stays in place
    ArgumentExtraction,
    /// Values substituted into several places, e.g. a row value into a
    /// predicate
    Substitution,
    /// An engine keeps a copy of its input to return it unchanged
    EngineFallback,
}

/// Type tags of the core kinds. Extension atoms follow from 6 on.
pub mod type_tag {
    pub const BOOL: usize = 0;
    pub const INT64: usize = 1;
    pub const DOUBLE: usize = 2;
    pub const STRING: usize = 3;
    pub const SYMBOL: usize = 4;
    pub const COMPLEX: usize = 5;
    pub const FIRST_EXTENSION: usize = 6;
}

/// Expression over the core atoms plus the atom set `X`.
///
/// Expressions are moved, not copied: there is deliberately no `Clone`
/// implementation, use [`ExtensibleExpression::clone`] with a reason.
#[derive(Debug)]
pub enum ExtensibleExpression<X = NoExtension> {
    Bool(bool),
    Int64(i64),
    Double(f64),
    String(String),
    Symbol(Symbol),
    Complex(ComplexExpression<X>),
    Extension(X),
}

/// Expression over the core atoms only.
pub type Expression = ExtensibleExpression<NoExtension>;

/// Borrowed view of whichever alternative an expression currently holds.
#[derive(Debug)]
pub enum ExpressionRef<'a, X = NoExtension> {
    Bool(bool),
    Int64(i64),
    Double(f64),
    String(&'a str),
    Symbol(&'a Symbol),
    Complex(&'a ComplexExpression<X>),
    Extension(&'a X),
}

impl<X> Clone for ExpressionRef<'_, X> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<X> Copy for ExpressionRef<'_, X> {}

impl<X: AtomSet> ExtensibleExpression<X> {
    /// Type tag: 0 bool, 1 long, 2 double, 3 string, 4 symbol, 5 complex,
    /// then one tag per extension atom.
    pub fn type_index(&self) -> usize {
        match self {
            ExtensibleExpression::Bool(_) => type_tag::BOOL,
            ExtensibleExpression::Int64(_) => type_tag::INT64,
            ExtensibleExpression::Double(_) => type_tag::DOUBLE,
            ExtensibleExpression::String(_) => type_tag::STRING,
            ExtensibleExpression::Symbol(_) => type_tag::SYMBOL,
            ExtensibleExpression::Complex(_) => type_tag::COMPLEX,
            ExtensibleExpression::Extension(x) => type_tag::FIRST_EXTENSION + x.type_index(),
        }
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            ExtensibleExpression::Bool(_) => "bool",
            ExtensibleExpression::Int64(_) => "long",
            ExtensibleExpression::Double(_) => "double",
            ExtensibleExpression::String(_) => "string",
            ExtensibleExpression::Symbol(_) => "Symbol",
            ExtensibleExpression::Complex(_) => "ComplexExpression",
            ExtensibleExpression::Extension(x) => x.type_name(),
        }
    }

    /// Explicit deep copy. Spans mapped over external buffers come back as
    /// owned spans, so the copy is independent of the source in every way.
    pub fn clone(&self, reason: CloneReason) -> Self {
        trace!("cloning {} expression ({:?})", self.type_name(), reason);
        self.deep_copy()
    }

    pub(crate) fn deep_copy(&self) -> Self {
        match self {
            ExtensibleExpression::Bool(b) => ExtensibleExpression::Bool(*b),
            ExtensibleExpression::Int64(i) => ExtensibleExpression::Int64(*i),
            ExtensibleExpression::Double(d) => ExtensibleExpression::Double(*d),
            ExtensibleExpression::String(s) => ExtensibleExpression::String(s.clone()),
            ExtensibleExpression::Symbol(s) => ExtensibleExpression::Symbol(s.clone()),
            ExtensibleExpression::Complex(c) => ExtensibleExpression::Complex(c.deep_copy()),
            ExtensibleExpression::Extension(x) => ExtensibleExpression::Extension(x.clone_atom()),
        }
    }

    pub fn view(&self) -> ExpressionRef<'_, X> {
        match self {
            ExtensibleExpression::Bool(b) => ExpressionRef::Bool(*b),
            ExtensibleExpression::Int64(i) => ExpressionRef::Int64(*i),
            ExtensibleExpression::Double(d) => ExpressionRef::Double(*d),
            ExtensibleExpression::String(s) => ExpressionRef::String(s),
            ExtensibleExpression::Symbol(s) => ExpressionRef::Symbol(s),
            ExtensibleExpression::Complex(c) => ExpressionRef::Complex(c),
            ExtensibleExpression::Extension(x) => ExpressionRef::Extension(x),
        }
    }

    pub fn is_complex(&self) -> bool {
        matches!(self, ExtensibleExpression::Complex(_))
    }

    /// Head of a complex expression.
    pub fn head(&self) -> Option<&Symbol> {
        match self {
            ExtensibleExpression::Complex(c) => Some(c.head()),
            _ => None,
        }
    }

    /// Whether this is a complex expression with the given head.
    pub fn has_head(&self, name: &str) -> bool {
        self.head().is_some_and(|head| head == name)
    }

    /// Move into an expression system whose atom set contains this one.
    pub fn widen<Y: AtomSet>(self) -> ExtensibleExpression<Y>
    where
        X: WidensTo<Y>,
    {
        match self {
            ExtensibleExpression::Bool(b) => ExtensibleExpression::Bool(b),
            ExtensibleExpression::Int64(i) => ExtensibleExpression::Int64(i),
            ExtensibleExpression::Double(d) => ExtensibleExpression::Double(d),
            ExtensibleExpression::String(s) => ExtensibleExpression::String(s),
            ExtensibleExpression::Symbol(s) => ExtensibleExpression::Symbol(s),
            ExtensibleExpression::Complex(c) => ExtensibleExpression::Complex(c.widen()),
            ExtensibleExpression::Extension(x) => ExtensibleExpression::Extension(x.widen()),
        }
    }

    /// Move into another expression system, checking every extension atom on
    /// the way. Fails on the first atom the target cannot hold.
    pub fn try_narrow<Y: AtomSet>(self) -> ExpressionResult<ExtensibleExpression<Y>>
    where
        X: NarrowsTo<Y>,
    {
        Ok(match self {
            ExtensibleExpression::Bool(b) => ExtensibleExpression::Bool(b),
            ExtensibleExpression::Int64(i) => ExtensibleExpression::Int64(i),
            ExtensibleExpression::Double(d) => ExtensibleExpression::Double(d),
            ExtensibleExpression::String(s) => ExtensibleExpression::String(s),
            ExtensibleExpression::Symbol(s) => ExtensibleExpression::Symbol(s),
            ExtensibleExpression::Complex(c) => ExtensibleExpression::Complex(c.try_narrow()?),
            ExtensibleExpression::Extension(x) => match x.narrow() {
                Ok(y) => ExtensibleExpression::Extension(y),
                Err(x) => {
                    return Err(ExpressionError::NarrowingFailed {
                        atom: x.to_string(),
                        type_name: x.type_name(),
                    })
                }
            },
        })
    }

    /// Compare against one element of a span argument.
    pub(crate) fn eq_element(&self, element: &ElementRef<'_>) -> bool {
        match (self, element) {
            (ExtensibleExpression::Bool(a), ElementRef::Bool(b)) => a == b,
            (ExtensibleExpression::Int64(a), ElementRef::Int64(b)) => a == b,
            (ExtensibleExpression::Double(a), ElementRef::Double(b)) => a == b,
            (ExtensibleExpression::String(a), ElementRef::String(b)) => a.as_str() == &**b,
            (ExtensibleExpression::Symbol(a), ElementRef::Symbol(b)) => *a == **b,
            _ => false,
        }
    }
}

impl<X: AtomSet> PartialEq for ExtensibleExpression<X> {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (ExtensibleExpression::Bool(a), ExtensibleExpression::Bool(b)) => a == b,
            (ExtensibleExpression::Int64(a), ExtensibleExpression::Int64(b)) => a == b,
            (ExtensibleExpression::Double(a), ExtensibleExpression::Double(b)) => a == b,
            (ExtensibleExpression::String(a), ExtensibleExpression::String(b)) => a == b,
            (ExtensibleExpression::Symbol(a), ExtensibleExpression::Symbol(b)) => a == b,
            (ExtensibleExpression::Complex(a), ExtensibleExpression::Complex(b)) => a == b,
            (ExtensibleExpression::Extension(a), ExtensibleExpression::Extension(b)) => a == b,
            _ => false,
        }
    }
}

impl<S, X> PartialEq<ComplexExpressionWithStaticArguments<S, X>> for ExtensibleExpression<X>
where
    X: AtomSet,
    S: StaticArguments<X>,
{
    fn eq(&self, other: &ComplexExpressionWithStaticArguments<S, X>) -> bool {
        match self {
            ExtensibleExpression::Complex(c) => c == other,
            _ => false,
        }
    }
}

impl<X: AtomSet> fmt::Display for ExtensibleExpression<X> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExtensibleExpression::Bool(b) => write!(f, "{}", b),
            ExtensibleExpression::Int64(i) => write!(f, "{}", i),
            ExtensibleExpression::Double(d) => write!(f, "{:?}", d),
            ExtensibleExpression::String(s) => write!(f, "{:?}", s),
            ExtensibleExpression::Symbol(s) => write!(f, "{}", s),
            ExtensibleExpression::Complex(c) => write!(f, "{}", c),
            ExtensibleExpression::Extension(x) => write!(f, "{}", x),
        }
    }
}

impl fmt::Display for ElementRef<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ElementRef::Bool(b) => write!(f, "{}", b),
            ElementRef::Int64(i) => write!(f, "{}", i),
            ElementRef::Double(d) => write!(f, "{:?}", d),
            ElementRef::String(s) => write!(f, "{:?}", s),
            ElementRef::Symbol(s) => write!(f, "{}", s),
        }
    }
}

impl<X> From<bool> for ExtensibleExpression<X> {
    fn from(value: bool) -> Self {
        ExtensibleExpression::Bool(value)
    }
}

impl<X> From<i64> for ExtensibleExpression<X> {
    fn from(value: i64) -> Self {
        ExtensibleExpression::Int64(value)
    }
}

impl<X> From<i32> for ExtensibleExpression<X> {
    fn from(value: i32) -> Self {
        ExtensibleExpression::Int64(i64::from(value))
    }
}

impl<X> From<f64> for ExtensibleExpression<X> {
    fn from(value: f64) -> Self {
        ExtensibleExpression::Double(value)
    }
}

impl<X> From<f32> for ExtensibleExpression<X> {
    fn from(value: f32) -> Self {
        ExtensibleExpression::Double(f64::from(value))
    }
}

/// Text literals always become string atoms.
impl<X> From<&str> for ExtensibleExpression<X> {
    fn from(value: &str) -> Self {
        ExtensibleExpression::String(value.to_string())
    }
}

impl<X> From<String> for ExtensibleExpression<X> {
    fn from(value: String) -> Self {
        ExtensibleExpression::String(value)
    }
}

impl<X> From<Symbol> for ExtensibleExpression<X> {
    fn from(value: Symbol) -> Self {
        ExtensibleExpression::Symbol(value)
    }
}

impl<S, X> From<ComplexExpressionWithStaticArguments<S, X>> for ExtensibleExpression<X>
where
    X: AtomSet,
    S: StaticArguments<X>,
{
    fn from(value: ComplexExpressionWithStaticArguments<S, X>) -> Self {
        ExtensibleExpression::Complex(value.into_dynamic())
    }
}

impl<'a, X> From<ElementRef<'a>> for ExtensibleExpression<X> {
    fn from(element: ElementRef<'a>) -> Self {
        match element {
            ElementRef::Bool(b) => ExtensibleExpression::Bool(b),
            ElementRef::Int64(i) => ExtensibleExpression::Int64(i),
            ElementRef::Double(d) => ExtensibleExpression::Double(d),
            ElementRef::String(s) => ExtensibleExpression::String(s.into_owned()),
            ElementRef::Symbol(s) => ExtensibleExpression::Symbol(s.into_owned()),
        }
    }
}
