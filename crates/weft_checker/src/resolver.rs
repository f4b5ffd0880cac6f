//! Scope resolution: effective values of hierarchical concerns.
//!
//! A concern set on an outer scope (namespace, interface, model) applies to
//! everything inside it unless a nearer declaration sets it too. Lookups walk
//! from the declaration outward and stop at the first hit; values are never
//! merged. Concerns that compose instead of override (route prefixes) use
//! [`Program::ancestors`] directly.

use weft_foundation::DeclId;

use crate::program::Program;
use crate::state::{StateKey, StateValue};

/// Iterator over a declaration and its enclosing scopes, innermost first.
#[derive(Clone, Debug)]
pub struct Ancestors<'p> {
    program: &'p Program,
    next: Option<DeclId>,
}

impl Iterator for Ancestors<'_> {
    type Item = DeclId;

    fn next(&mut self) -> Option<DeclId> {
        let current = self.next?;
        self.next = self.program.decl(current).parent;
        Some(current)
    }
}

impl Program {
    /// Walks from a declaration up to the global namespace, inclusive.
    #[must_use]
    pub fn ancestors(&self, decl: DeclId) -> Ancestors<'_> {
        Ancestors {
            program: self,
            next: Some(decl),
        }
    }

    /// Returns the nearest value of a concern and the declaration carrying it.
    #[must_use]
    pub fn effective_entry(&self, decl: DeclId, key: StateKey) -> Option<(DeclId, &StateValue)> {
        self.ancestors(decl)
            .find_map(|scope| self.state.get(scope, key).map(|value| (scope, value)))
    }

    /// Returns the nearest value of a concern, or `None` if no scope sets it.
    #[must_use]
    pub fn effective_value(&self, decl: DeclId, key: StateKey) -> Option<&StateValue> {
        self.effective_entry(decl, key).map(|(_, value)| value)
    }
}
