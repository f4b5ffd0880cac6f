//! Source location tracking.
//!
//! `Span` tracks the position of syntax nodes in source files so that
//! diagnostics can point back at the text that caused them.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::ids::FileId;

/// A span of source text within one file.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Span {
    /// The file this span belongs to.
    pub file: FileId,
    /// Byte offset where this span starts.
    pub start: usize,
    /// Byte offset where this span ends (exclusive).
    pub end: usize,
    /// 1-based line number where this span starts.
    pub line: u32,
    /// 1-based column number where this span starts.
    pub column: u32,
}

impl Span {
    /// Creates a new span.
    #[must_use]
    pub const fn new(file: FileId, start: usize, end: usize, line: u32, column: u32) -> Self {
        Self {
            file,
            start,
            end,
            line,
            column,
        }
    }
}
