//! Diagnostics and the collector that accumulates them.
//!
//! Diagnostics are the only channel through which user-facing problems
//! surface. They are ordered by discovery and deduplicated only when code,
//! target, and message are all identical.

use std::collections::HashSet;
use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::ids::{DeclId, FileId};
use crate::span::Span;

/// Stable diagnostic codes.
///
/// Codes are the contract; message wording is not.
pub mod codes {
    /// Two non-namespace declarations share a name in one scope.
    pub const DUPLICATE_DECLARATION: &str = "duplicate-declaration";
    /// An attribute was applied to a declaration kind it does not accept.
    pub const DECORATOR_WRONG_TARGET: &str = "decorator-wrong-target";
    /// An attribute or template argument has the wrong type.
    pub const INVALID_ARGUMENT: &str = "invalid-argument";
    /// An attribute received too few or too many arguments.
    pub const INVALID_ARGUMENT_COUNT: &str = "invalid-argument-count";
    /// No attribute is registered under the identifier.
    pub const UNKNOWN_ATTRIBUTE: &str = "unknown-attribute";
    /// A template instantiation re-entered itself.
    pub const CIRCULAR_TEMPLATE: &str = "circular-template";
    /// A response model declares more than one status code property.
    pub const MULTIPLE_STATUS_CODES: &str = "multiple-status-codes";
    /// Two operations share a verb and path.
    pub const DUPLICATE_OPERATION: &str = "duplicate-operation";
    /// Only some operations sharing a verb and path are marked shareable.
    pub const SHARED_INCONSISTENCY: &str = "shared-inconsistency";
    /// A status code is not a three digit code between 100 and 599.
    pub const STATUS_CODE_INVALID: &str = "status-code-invalid";
    /// A server url template parameter has no matching parameter.
    pub const MISSING_SERVER_PARAM: &str = "missing-server-param";
    /// An attribute behavior faulted.
    pub const INTERNAL_ERROR: &str = "internal-error";
    /// An identifier did not resolve to any declaration.
    pub const UNKNOWN_IDENTIFIER: &str = "unknown-identifier";
    /// Template arguments do not match the template's parameters.
    pub const INVALID_TEMPLATE_ARGS: &str = "invalid-template-args";
    /// A checked relation between two types failed.
    pub const UNASSIGNABLE: &str = "unassignable";
    /// A syntax tree could not be bound at all.
    pub const INVALID_SYNTAX_TREE: &str = "invalid-syntax-tree";
    /// The same attribute was applied twice to one declaration.
    pub const DUPLICATE_ATTRIBUTE: &str = "duplicate-attribute";
}

/// Diagnostic severity.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Severity {
    /// Does not block emission unless promoted.
    Warning,
    /// Blocks emission.
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Warning => write!(f, "warning"),
            Self::Error => write!(f, "error"),
        }
    }
}

/// What a diagnostic points at.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum DiagnosticTarget {
    /// A declaration in the program.
    Decl(DeclId),
    /// A span of source text.
    Span(Span),
    /// A whole source file.
    File(FileId),
}

impl From<DeclId> for DiagnosticTarget {
    fn from(id: DeclId) -> Self {
        Self::Decl(id)
    }
}

impl From<Span> for DiagnosticTarget {
    fn from(span: Span) -> Self {
        Self::Span(span)
    }
}

/// A single reported problem.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Diagnostic {
    /// Stable identifier of the problem.
    pub code: String,
    /// How serious it is.
    pub severity: Severity,
    /// Human-readable description.
    pub message: String,
    /// What the problem is about.
    pub target: DiagnosticTarget,
}

impl Diagnostic {
    /// Creates an error diagnostic.
    #[must_use]
    pub fn error(
        code: impl Into<String>,
        target: impl Into<DiagnosticTarget>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            code: code.into(),
            severity: Severity::Error,
            message: message.into(),
            target: target.into(),
        }
    }

    /// Creates a warning diagnostic.
    #[must_use]
    pub fn warning(
        code: impl Into<String>,
        target: impl Into<DiagnosticTarget>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            severity: Severity::Warning,
            ..Self::error(code, target, message)
        }
    }

    /// Returns true if this diagnostic is an error.
    #[must_use]
    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}: {}", self.severity, self.code, self.message)
    }
}

/// Accumulates diagnostics in discovery order.
#[derive(Clone, Debug, Default)]
pub struct DiagnosticCollector {
    diagnostics: Vec<Diagnostic>,
    seen: HashSet<(String, DiagnosticTarget, String)>,
}

impl DiagnosticCollector {
    /// Creates an empty collector.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a diagnostic unless an identical one was already recorded.
    ///
    /// Returns true if the diagnostic was new.
    pub fn report(&mut self, diagnostic: Diagnostic) -> bool {
        let key = (
            diagnostic.code.clone(),
            diagnostic.target,
            diagnostic.message.clone(),
        );
        if !self.seen.insert(key) {
            return false;
        }
        debug!(
            code = %diagnostic.code,
            severity = %diagnostic.severity,
            target = ?diagnostic.target,
            "diagnostic reported"
        );
        self.diagnostics.push(diagnostic);
        true
    }

    /// Returns every diagnostic in discovery order.
    #[must_use]
    pub fn all(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    /// Returns true if any error-severity diagnostic was reported.
    #[must_use]
    pub fn has_error(&self) -> bool {
        self.diagnostics.iter().any(Diagnostic::is_error)
    }

    /// Returns the number of diagnostics.
    #[must_use]
    pub fn len(&self) -> usize {
        self.diagnostics.len()
    }

    /// Returns true if nothing was reported.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.diagnostics.is_empty()
    }

    /// Returns the diagnostics carrying the given code.
    pub fn by_code<'a>(&'a self, code: &'a str) -> impl Iterator<Item = &'a Diagnostic> + 'a {
        self.diagnostics.iter().filter(move |d| d.code == code)
    }

    /// Returns the diagnostics targeting the given declaration.
    pub fn for_decl(&self, decl: DeclId) -> impl Iterator<Item = &Diagnostic> + '_ {
        self.diagnostics
            .iter()
            .filter(move |d| d.target == DiagnosticTarget::Decl(decl))
    }

    /// Turns every warning into an error (warning-as-error mode).
    pub fn promote_warnings(&mut self) {
        for diagnostic in &mut self.diagnostics {
            diagnostic.severity = Severity::Error;
        }
    }

    /// Returns the `(code, target)` sequence, the stable shape of a run.
    #[must_use]
    pub fn signature(&self) -> Vec<(String, DiagnosticTarget)> {
        self.diagnostics
            .iter()
            .map(|d| (d.code.clone(), d.target))
            .collect()
    }
}
