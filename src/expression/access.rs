//! Typed access to expression alternatives and visitor combinators over
//! argument sequences.

use crate::expression::atoms::AtomSet;
use crate::expression::complex::ComplexExpression;
use crate::expression::{
    ExpressionError, ExpressionRef, ExpressionResult, ExtensibleExpression, Symbol,
};

/// A type that is one of the core alternatives of an expression.
pub trait Alternative<X: AtomSet>: Sized {
    /// Name used in type-mismatch messages.
    const TYPE_NAME: &'static str;

    /// Move the alternative out, or hand the expression back untouched.
    fn take(expr: ExtensibleExpression<X>) -> Result<Self, ExtensibleExpression<X>>;

    fn peek(expr: &ExtensibleExpression<X>) -> Option<&Self>;

    fn peek_mut(expr: &mut ExtensibleExpression<X>) -> Option<&mut Self>;
}

macro_rules! alternative {
    ($ty:ty, $variant:ident, $name:expr) => {
        impl<X: AtomSet> Alternative<X> for $ty {
            const TYPE_NAME: &'static str = $name;

            fn take(expr: ExtensibleExpression<X>) -> Result<Self, ExtensibleExpression<X>> {
                match expr {
                    ExtensibleExpression::$variant(value) => Ok(value),
                    other => Err(other),
                }
            }

            fn peek(expr: &ExtensibleExpression<X>) -> Option<&Self> {
                match expr {
                    ExtensibleExpression::$variant(value) => Some(value),
                    _ => None,
                }
            }

            fn peek_mut(expr: &mut ExtensibleExpression<X>) -> Option<&mut Self> {
                match expr {
                    ExtensibleExpression::$variant(value) => Some(value),
                    _ => None,
                }
            }
        }
    };
}

alternative!(bool, Bool, "bool");
alternative!(i64, Int64, "long");
alternative!(f64, Double, "double");
alternative!(String, String, "string");
alternative!(Symbol, Symbol, "Symbol");
alternative!(ComplexExpression<X>, Complex, "ComplexExpression");

fn mismatch<T: Alternative<X>, X: AtomSet>(actual: &ExtensibleExpression<X>) -> ExpressionError {
    ExpressionError::TypeMismatch {
        expected: T::TYPE_NAME,
        actual: actual.to_string(),
    }
}

impl<X: AtomSet> ExtensibleExpression<X> {
    /// Move the `T` alternative out of the expression.
    pub fn get<T: Alternative<X>>(self) -> ExpressionResult<T> {
        T::take(self).map_err(|actual| mismatch::<T, X>(&actual))
    }

    pub fn get_ref<T: Alternative<X>>(&self) -> ExpressionResult<&T> {
        T::peek(self).ok_or_else(|| mismatch::<T, X>(self))
    }

    pub fn get_mut<T: Alternative<X>>(&mut self) -> ExpressionResult<&mut T> {
        if !self.holds_alternative::<T>() {
            return Err(mismatch::<T, X>(self));
        }
        match T::peek_mut(self) {
            Some(value) => Ok(value),
            None => unreachable!("{} alternative checked above", T::TYPE_NAME),
        }
    }

    pub fn get_if<T: Alternative<X>>(&self) -> Option<&T> {
        T::peek(self)
    }

    pub fn holds_alternative<T: Alternative<X>>(&self) -> bool {
        T::peek(self).is_some()
    }
}

pub fn get<T: Alternative<X>, X: AtomSet>(expr: ExtensibleExpression<X>) -> ExpressionResult<T> {
    expr.get()
}

pub fn get_ref<T: Alternative<X>, X: AtomSet>(
    expr: &ExtensibleExpression<X>,
) -> ExpressionResult<&T> {
    expr.get_ref()
}

pub fn get_mut<T: Alternative<X>, X: AtomSet>(
    expr: &mut ExtensibleExpression<X>,
) -> ExpressionResult<&mut T> {
    expr.get_mut()
}

pub fn get_if<T: Alternative<X>, X: AtomSet>(expr: &ExtensibleExpression<X>) -> Option<&T> {
    expr.get_if()
}

pub fn holds_alternative<T: Alternative<X>, X: AtomSet>(expr: &ExtensibleExpression<X>) -> bool {
    expr.holds_alternative::<T>()
}

/// Call `visitor` on the active alternative of every expression in order.
pub fn visit_each<'a, X, I, F>(items: I, mut visitor: F)
where
    X: AtomSet + 'a,
    I: IntoIterator<Item = &'a ExtensibleExpression<X>>,
    F: FnMut(ExpressionRef<'a, X>),
{
    for item in items {
        visitor(item.view());
    }
}

/// Left fold over the active alternatives, starting from `init`.
pub fn visit_accumulate<'a, X, I, A, F>(items: I, init: A, mut visitor: F) -> A
where
    X: AtomSet + 'a,
    I: IntoIterator<Item = &'a ExtensibleExpression<X>>,
    F: FnMut(A, ExpressionRef<'a, X>) -> A,
{
    items
        .into_iter()
        .fold(init, |state, item| visitor(state, item.view()))
}

/// Replace every expression with the visitor's result, in place. Each
/// element is moved into the visitor, never copied.
pub fn visit_transform<X, F>(items: &mut Vec<ExtensibleExpression<X>>, visitor: F)
where
    X: AtomSet,
    F: FnMut(ExtensibleExpression<X>) -> ExtensibleExpression<X>,
{
    let taken = std::mem::take(items);
    *items = taken.into_iter().map(visitor).collect();
}

/// Like [`visit_transform`], except that the transformed values are folded
/// with `visitor` instead of being stored.
pub fn visit_transform_accumulate<X, I, T, A, F>(
    items: I,
    mut transform: T,
    init: A,
    mut visitor: F,
) -> A
where
    X: AtomSet,
    I: IntoIterator<Item = ExtensibleExpression<X>>,
    T: FnMut(ExtensibleExpression<X>) -> ExtensibleExpression<X>,
    F: FnMut(A, ExpressionRef<'_, X>) -> A,
{
    items.into_iter().fold(init, |state, item| {
        let transformed = transform(item);
        visitor(state, transformed.view())
    })
}
