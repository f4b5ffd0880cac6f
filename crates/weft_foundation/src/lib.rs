//! Spans, handles, errors, and diagnostics for Weft.
//!
//! This crate provides:
//! - [`Span`] - Source locations attached to syntax and diagnostics
//! - [`FileId`], [`DeclId`], [`TypeId`] - Arena handles shared by every layer
//! - [`Error`] - Rich error types with context
//! - [`Diagnostic`] and [`DiagnosticCollector`] - The user-facing problem channel

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod diagnostic;
pub mod error;
pub mod ids;
pub mod span;

pub use diagnostic::{Diagnostic, DiagnosticCollector, DiagnosticTarget, Severity, codes};
pub use error::{Error, ErrorContext, ErrorKind, Result};
pub use ids::{DeclId, FileId, TypeId};
pub use span::Span;
