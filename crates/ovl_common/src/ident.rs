//! Interned names.

use lasso::ThreadedRodeo;
use serde::{Deserialize, Serialize};

/// A name of a core, port, register, signal or hierarchy level, interned in
/// the design's [`Interner`].
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub struct Ident(u32);

impl Ident {
    /// Wraps a raw key. Only meaningful against the interner that issued it.
    pub fn from_raw(key: u32) -> Self {
        Self(key)
    }

    /// The raw key.
    pub fn as_raw(self) -> u32 {
        self.0
    }
}

// SAFETY: `into_usize` widens a `u32`, and `try_from_usize` only accepts
// values that round-trip through it.
unsafe impl lasso::Key for Ident {
    fn into_usize(self) -> usize {
        self.0 as usize
    }

    fn try_from_usize(key: usize) -> Option<Self> {
        u32::try_from(key).ok().map(Self)
    }
}

/// Name table shared by every node of one design.
pub struct Interner {
    names: ThreadedRodeo<Ident>,
}

impl Interner {
    /// An empty table.
    pub fn new() -> Self {
        Self {
            names: ThreadedRodeo::new(),
        }
    }

    /// The key for `name`, adding it on first use.
    pub fn get_or_intern(&self, name: &str) -> Ident {
        self.names.get_or_intern(name)
    }

    /// The key for `name` if it was interned before.
    pub fn get(&self, name: &str) -> Option<Ident> {
        self.names.get(name)
    }

    /// The text behind `ident`. Panics on a key from another table.
    pub fn resolve(&self, ident: Ident) -> &str {
        self.names.resolve(&ident)
    }

    /// Number of distinct names.
    pub fn len(&self) -> usize {
        self.names.len()
    }

    /// Whether no name was interned yet.
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

impl Default for Interner {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Interner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Interner({} names)", self.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn repeated_names_share_a_key() {
        let names = Interner::new();
        let first = names.get_or_intern("S_AXI");
        let other = names.get_or_intern("M_AXI_GP0");
        assert_eq!(names.get_or_intern("S_AXI"), first);
        assert_ne!(first, other);
        assert_eq!(names.resolve(other), "M_AXI_GP0");
        assert_eq!(names.len(), 2);
    }

    #[test]
    fn lookup_without_interning() {
        let names = Interner::default();
        assert!(names.get("dout").is_none());
        assert!(names.is_empty());
        let key = names.get_or_intern("dout");
        assert_eq!(names.get("dout"), Some(key));
    }
}
