//! Symbols: the names used as expression heads and as symbolic atoms.

use std::borrow::Borrow;
use std::fmt;
use std::sync::Arc;

/// Immutable name value.
///
/// Cloning only bumps a reference count, so symbols are cheap to pass around
/// as dispatch keys. Equality, ordering and hashing are by name.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Symbol {
    name: Arc<str>,
}

impl Symbol {
    pub fn new(name: impl AsRef<str>) -> Self {
        Self {
            name: Arc::from(name.as_ref()),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl fmt::Debug for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Symbol({})", self.name)
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

impl From<&str> for Symbol {
    fn from(name: &str) -> Self {
        Symbol::new(name)
    }
}

impl From<String> for Symbol {
    fn from(name: String) -> Self {
        Self {
            name: Arc::from(name),
        }
    }
}

impl AsRef<str> for Symbol {
    fn as_ref(&self) -> &str {
        &self.name
    }
}

impl Borrow<str> for Symbol {
    fn borrow(&self) -> &str {
        &self.name
    }
}

impl PartialEq<str> for Symbol {
    fn eq(&self, other: &str) -> bool {
        &*self.name == other
    }
}

impl PartialEq<&str> for Symbol {
    fn eq(&self, other: &&str) -> bool {
        &*self.name == *other
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_symbol_equality_by_name() {
        let a = Symbol::new("Plus");
        let b = Symbol::from(String::from("Plus"));
        assert_eq!(a, b);
        assert_eq!(a, "Plus");
        assert_ne!(a, Symbol::new("Times"));
        assert!(Symbol::new("A") < Symbol::new("B"));
    }

    #[test]
    fn test_symbol_as_map_key() {
        let mut heads = HashMap::new();
        heads.insert(Symbol::new("Select"), 1);
        assert_eq!(heads.get("Select"), Some(&1));
    }

    #[test]
    fn test_symbol_display() {
        let s = Symbol::new("L_ORDERKEY");
        assert_eq!(s.to_string(), "L_ORDERKEY");
        assert_eq!(format!("{:?}", s), "Symbol(L_ORDERKEY)");
    }
}
