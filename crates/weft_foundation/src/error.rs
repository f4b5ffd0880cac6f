//! Error types for the Weft system.
//!
//! Uses `thiserror` for ergonomic error definition with rich context.
//! Errors are internal to the engine: anything a user can cause is turned
//! into a [`Diagnostic`](crate::Diagnostic) as close to its origin as possible.

use std::fmt;

use thiserror::Error;

use crate::ids::{DeclId, FileId};
use crate::span::Span;

/// Result type alias using [`Error`].
pub type Result<T> = std::result::Result<T, Error>;

/// The main error type for Weft operations.
#[derive(Debug, Error)]
#[error("{kind}")]
pub struct Error {
    /// The kind of error that occurred.
    pub kind: ErrorKind,
    /// Optional context about where the error occurred.
    pub context: Option<ErrorContext>,
}

impl Error {
    /// Creates a new error with the given kind.
    #[must_use]
    pub fn new(kind: ErrorKind) -> Self {
        Self {
            kind,
            context: None,
        }
    }

    /// Adds context to this error.
    #[must_use]
    pub fn with_context(mut self, context: ErrorContext) -> Self {
        self.context = Some(context);
        self
    }

    /// Records the span this error points at.
    ///
    /// The first span recorded wins, so the innermost node keeps its location
    /// as the error propagates outward.
    #[must_use]
    pub fn at_span(mut self, span: Span) -> Self {
        self.context
            .get_or_insert_with(ErrorContext::new)
            .span
            .get_or_insert(span);
        self
    }

    /// Records the source path this error occurred in.
    #[must_use]
    pub fn in_source(mut self, source: impl Into<String>) -> Self {
        let context = self.context.get_or_insert_with(ErrorContext::new);
        if context.source.is_none() {
            context.source = Some(source.into());
        }
        self
    }

    /// Returns the recorded span, if any.
    #[must_use]
    pub fn span(&self) -> Option<Span> {
        self.context.as_ref().and_then(|context| context.span)
    }

    /// Creates a malformed syntax tree error.
    #[must_use]
    pub fn malformed_tree(file: FileId, message: impl Into<String>) -> Self {
        Self::new(ErrorKind::MalformedTree {
            file,
            message: message.into(),
        })
    }

    /// Creates an error for a declaration handle that is not in the program.
    #[must_use]
    pub fn unknown_declaration(id: DeclId) -> Self {
        Self::new(ErrorKind::UnknownDeclaration(id))
    }

    /// Creates an error raised by an attribute behavior.
    #[must_use]
    pub fn attribute_fault(attribute: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(ErrorKind::AttributeFault {
            attribute: attribute.into(),
            message: message.into(),
        })
    }

    /// Creates an error for an argument value of the wrong shape.
    #[must_use]
    pub fn unexpected_value(expected: impl Into<String>, actual: impl Into<String>) -> Self {
        Self::new(ErrorKind::UnexpectedValue {
            expected: expected.into(),
            actual: actual.into(),
        })
    }

    /// Creates an internal invariant violation error.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Internal(message.into()))
    }
}

/// Categorized error kinds for pattern matching.
#[derive(Debug, Error)]
pub enum ErrorKind {
    /// A syntax tree the binder cannot interpret.
    #[error("malformed syntax tree in {file:?}: {message}")]
    MalformedTree {
        /// The offending file.
        file: FileId,
        /// What made the tree uninterpretable.
        message: String,
    },

    /// A declaration handle that does not belong to the program.
    #[error("unknown declaration: {0:?}")]
    UnknownDeclaration(DeclId),

    /// An attribute behavior failed.
    #[error("attribute @{attribute} failed: {message}")]
    AttributeFault {
        /// The attribute identifier.
        attribute: String,
        /// Description of the failure.
        message: String,
    },

    /// An argument value did not have the shape a behavior expected.
    #[error("unexpected value: expected {expected}, got {actual}")]
    UnexpectedValue {
        /// Description of the expected value.
        expected: String,
        /// Description of the value received.
        actual: String,
    },

    /// Mutation attempted on a frozen program.
    #[error("program is frozen")]
    Frozen,

    /// Internal error (should not happen).
    #[error("internal error: {0}")]
    Internal(String),
}

/// Context about where an error occurred.
#[derive(Debug, Clone, Default)]
pub struct ErrorContext {
    /// Source file path.
    pub source: Option<String>,
    /// Span in source.
    pub span: Option<Span>,
}

impl ErrorContext {
    /// Creates a new empty context.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the source file path.
    #[must_use]
    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }

    /// Sets the span.
    #[must_use]
    pub fn with_span(mut self, span: Span) -> Self {
        self.span = Some(span);
        self
    }
}

impl fmt::Display for ErrorContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(source) = &self.source {
            write!(f, "at {source}")?;
            if let Some(span) = self.span {
                write!(f, ":{}:{}", span.line, span.column)?;
            }
        }
        Ok(())
    }
}
