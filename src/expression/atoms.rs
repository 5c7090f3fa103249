//! Extension points for caller-declared atom types.
//!
//! Every expression system carries the six core kinds. An `AtomSet` adds
//! further atoms on top; `NoExtension` is the empty set and is what the plain
//! [`Expression`](crate::expression::Expression) uses. Conversions between
//! systems are driven by two traits: `WidensTo` (the source atoms are a
//! subset of the target's, always succeeds) and `NarrowsTo` (runtime check,
//! may hand the atom back).

use std::fmt;

/// A set of additional atom types, usually an enum with one variant per atom.
pub trait AtomSet: fmt::Debug + fmt::Display + PartialEq + Sized {
    /// Index of this atom within the set. The foreign type tag of an
    /// extension atom is `6 + type_index()`.
    fn type_index(&self) -> usize;

    fn type_name(&self) -> &'static str;

    /// Deep copy. Atom sets are not required to be `Clone`, mirroring
    /// expressions themselves.
    fn clone_atom(&self) -> Self;
}

/// Source atom set is a subset of `Target`.
pub trait WidensTo<Target: AtomSet>: AtomSet {
    fn widen(self) -> Target;
}

/// Runtime-checked conversion into `Target`; returns the atom unchanged when
/// it has no counterpart there.
pub trait NarrowsTo<Target: AtomSet>: AtomSet {
    fn narrow(self) -> Result<Target, Self>;
}

/// The empty atom set. Uninhabited, so `Extension` variants over it cannot be
/// constructed.
#[derive(Debug, PartialEq, Eq)]
pub enum NoExtension {}

impl fmt::Display for NoExtension {
    fn fmt(&self, _f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {}
    }
}

impl AtomSet for NoExtension {
    fn type_index(&self) -> usize {
        match *self {}
    }

    fn type_name(&self) -> &'static str {
        match *self {}
    }

    fn clone_atom(&self) -> Self {
        match *self {}
    }
}

impl<Target: AtomSet> WidensTo<Target> for NoExtension {
    fn widen(self) -> Target {
        match self {}
    }
}

impl<Source: AtomSet> NarrowsTo<NoExtension> for Source {
    fn narrow(self) -> Result<NoExtension, Self> {
        Err(self)
    }
}
