//! Effective state written by attribute behaviors.
//!
//! State is keyed by `(declaration, concern)`. The map is persistent
//! (`im::OrdMap`), so a frozen program can hand cheap snapshots to emitters
//! and iteration order is deterministic.

use std::fmt;

use indexmap::IndexMap;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use weft_foundation::{DeclId, TypeId};

/// Identifies one concern, e.g. `http.header`.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StateKey(&'static str);

impl StateKey {
    /// Creates a key.
    #[must_use]
    pub const fn new(name: &'static str) -> Self {
        Self(name)
    }

    /// Returns the key name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        self.0
    }
}

impl fmt::Debug for StateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "StateKey({})", self.0)
    }
}

/// A recorded value.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum StateValue {
    /// Presence flag or boolean option.
    Bool(bool),
    /// Integer value.
    Integer(i64),
    /// Float value.
    Float(f64),
    /// Text value.
    String(String),
    /// Named fields in insertion order.
    Record(IndexMap<String, StateValue>),
    /// Ordered values.
    List(Vec<StateValue>),
    /// A declaration handle.
    Decl(DeclId),
    /// A type handle.
    Type(TypeId),
}

impl StateValue {
    /// Returns the boolean, if this is one.
    #[must_use]
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Returns the string, if this is one.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the number as a float, if numeric.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Integer(n) => Some(*n as f64),
            Self::Float(n) => Some(*n),
            _ => None,
        }
    }

    /// Returns the record fields, if this is a record.
    #[must_use]
    pub fn as_record(&self) -> Option<&IndexMap<String, StateValue>> {
        match self {
            Self::Record(fields) => Some(fields),
            _ => None,
        }
    }

    /// Returns the list items, if this is a list.
    #[must_use]
    pub fn as_list(&self) -> Option<&[StateValue]> {
        match self {
            Self::List(items) => Some(items),
            _ => None,
        }
    }

    /// Returns the type handle, if this is one.
    #[must_use]
    pub fn as_type(&self) -> Option<TypeId> {
        match self {
            Self::Type(id) => Some(*id),
            _ => None,
        }
    }
}

/// Per-declaration, per-concern state.
#[derive(Clone, Debug, Default)]
pub struct StateMap {
    entries: im::OrdMap<(DeclId, StateKey), StateValue>,
}

impl StateMap {
    /// Creates an empty map.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the value recorded for a declaration.
    #[must_use]
    pub fn get(&self, decl: DeclId, key: StateKey) -> Option<&StateValue> {
        self.entries.get(&(decl, key))
    }

    /// Records a value, returning the previous one.
    pub fn set(&mut self, decl: DeclId, key: StateKey, value: StateValue) -> Option<StateValue> {
        self.entries.insert((decl, key), value)
    }

    /// Appends to a list value, creating it if absent.
    pub fn push(&mut self, decl: DeclId, key: StateKey, value: StateValue) {
        match self.entries.get_mut(&(decl, key)) {
            Some(StateValue::List(items)) => items.push(value),
            _ => {
                self.entries.insert((decl, key), StateValue::List(vec![value]));
            }
        }
    }

    /// Returns true if a value is recorded.
    #[must_use]
    pub fn contains(&self, decl: DeclId, key: StateKey) -> bool {
        self.entries.contains_key(&(decl, key))
    }

    /// Returns every declaration carrying the concern, in handle order.
    pub fn decls_with(&self, key: StateKey) -> impl Iterator<Item = DeclId> + '_ {
        self.entries
            .keys()
            .filter(move |(_, k)| *k == key)
            .map(|(decl, _)| *decl)
    }

    /// Iterates all entries in `(declaration, key)` order.
    pub fn iter(&self) -> impl Iterator<Item = (DeclId, StateKey, &StateValue)> {
        self.entries.iter().map(|((d, k), v)| (*d, *k, v))
    }

    /// Returns the number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl PartialEq for StateMap {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len() && self.iter().zip(other.iter()).all(|(a, b)| a == b)
    }
}
