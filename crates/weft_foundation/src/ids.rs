//! Arena handles.
//!
//! Declarations, types, and source files are stored in arenas owned by the
//! program; every cross-reference is one of these copyable indices.

use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

macro_rules! arena_id {
    ($(#[$meta:meta])* $name:ident, $label:literal) => {
        $(#[$meta])*
        #[derive(Copy, Clone, Eq, PartialEq, Hash, PartialOrd, Ord, Default)]
        #[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
        pub struct $name(u32);

        impl $name {
            /// Creates a handle from a raw index.
            #[must_use]
            pub const fn new(index: u32) -> Self {
                Self(index)
            }

            /// Creates a handle for the next slot of an arena of `len` entries.
            ///
            /// # Panics
            ///
            /// Panics if the arena exceeds `u32::MAX` entries.
            #[must_use]
            pub fn from_len(len: usize) -> Self {
                Self(u32::try_from(len).expect(concat!("too many ", $label, "s")))
            }

            /// Returns the raw index of this handle.
            #[must_use]
            pub const fn index(self) -> usize {
                self.0 as usize
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, concat!(stringify!($name), "({})"), self.0)
            }
        }
    };
}

arena_id!(
    /// Identifies one source file (one syntax tree).
    FileId,
    "file"
);

arena_id!(
    /// Identifies one declaration in the program's symbol graph.
    DeclId,
    "declaration"
);

arena_id!(
    /// Identifies one node in the program's type arena.
    TypeId,
    "type"
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn handles_round_trip_index() {
        assert_eq!(DeclId::new(7).index(), 7);
        assert_eq!(TypeId::from_len(3), TypeId::new(3));
    }

    #[test]
    fn handles_debug_format() {
        assert_eq!(format!("{:?}", DeclId::new(4)), "DeclId(4)");
        assert_eq!(format!("{:?}", FileId::new(0)), "FileId(0)");
    }

    #[test]
    fn handles_order_by_index() {
        assert!(TypeId::new(1) < TypeId::new(2));
    }
}
