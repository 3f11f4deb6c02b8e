//! The property-name symbol table.

use crate::errors::DecodeError;
use std::collections::HashMap;

/// An append-only table of property names seen so far in a stream.
///
/// Decoders append on every name definition and resolve back-references by
/// index; encoders additionally keep the reverse mapping so a repeated name
/// is written as a reference. Indices are assigned in definition order and
/// never move.
#[derive(Clone, Debug, Default)]
pub struct SymbolTable {
    names: Vec<String>,
    lookup: HashMap<String, u32>,
}

impl SymbolTable {
    /// Creates an empty table.
    pub fn new() -> SymbolTable { SymbolTable::default() }

    /// Looks up `name`, defining it if absent.
    ///
    /// Returns the index and whether the name was already present.
    pub fn intern(&mut self, name: &str) -> (u32, bool) {
        if let Some(&ix) = self.lookup.get(name) {
            return (ix, true);
        }
        let ix = self.names.len() as u32;
        self.names.push(name.to_owned());
        self.lookup.insert(name.to_owned(), ix);
        (ix, false)
    }

    /// Appends a decoded name definition, returning its index.
    pub fn define(&mut self, name: String) -> u32 {
        let ix = self.names.len() as u32;
        self.lookup.insert(name.clone(), ix);
        self.names.push(name);
        ix
    }

    /// Resolves a back-reference.
    pub fn resolve(&self, index: u64) -> Result<&str, DecodeError> {
        let len = self.names.len();
        match self.names.get(index as usize) {
            Some(name) if index as usize as u64 == index => Ok(name),
            _ => Err(DecodeError::InvalidBackReference { index, len }),
        }
    }

    /// The number of names defined.
    pub fn len(&self) -> usize { self.names.len() }

    /// Indicates whether no names are defined.
    pub fn is_empty(&self) -> bool { self.names.is_empty() }

    /// Forgets all names, keeping the allocations.
    pub fn reset(&mut self) {
        self.names.clear();
        self.lookup.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn intern_is_idempotent() {
        let mut t = SymbolTable::new();
        assert_eq!(t.intern("a"), (0, false));
        assert_eq!(t.intern("b"), (1, false));
        assert_eq!(t.intern("a"), (0, true));
        assert_eq!(t.len(), 2);
    }

    #[test]
    fn resolve_checks_bounds() {
        let mut t = SymbolTable::new();
        t.define("only".to_string());
        assert_eq!(t.resolve(0).unwrap(), "only");
        assert!(t.resolve(1).is_err());
        assert!(t.resolve(u64::max_value()).is_err());
    }

    #[test]
    fn reset_forgets_everything() {
        let mut t = SymbolTable::new();
        t.intern("x");
        t.reset();
        assert!(t.is_empty());
        assert!(t.resolve(0).is_err());
        assert_eq!(t.intern("x"), (0, false));
    }
}
