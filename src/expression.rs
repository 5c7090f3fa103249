//! Expression model: typed expression trees with bulk (span) arguments.
//!
//! This module provides:
//! - Symbols, atoms and complex nodes with static, dynamic and span channels
//! - Extensible atom sets with widening and narrowing conversions
//! - The builder DSL and the `complex!` macro
//! - Typed access and visitor combinators
//! - Head-based pattern matching for writing evaluators

pub mod access;
pub mod atoms;
pub mod builder;
pub mod complex;
pub mod error;
pub mod expr;
pub mod rewrite;
pub mod span;
pub mod symbol;

pub use access::{
    get, get_if, get_mut, get_ref, holds_alternative, visit_accumulate, visit_each, visit_transform,
    visit_transform_accumulate, Alternative,
};
pub use atoms::{AtomSet, NarrowsTo, NoExtension, WidensTo};
pub use builder::{ExpressionBuilder, ExtensibleExpressionBuilder};
pub use complex::{
    ArgumentRef, ComplexExpression, ComplexExpressionWithStaticArguments, ExpressionArguments,
    StaticArgument, StaticArguments,
};
pub use error::{ExpressionError, ExpressionResult};
pub use expr::{type_tag, CloneReason, Expression, ExpressionRef, ExtensibleExpression};
pub use rewrite::{recurse, try_recurse, HeadPattern, RewriteRules, Transformer};
pub use span::{
    ElementRef, ExpressionSpanArgument, ExpressionSpanArguments, FixedWidthElement, Span,
    SpanElement,
};
pub use symbol::Symbol;
