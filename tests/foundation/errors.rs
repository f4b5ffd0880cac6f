//! Integration tests for Error types
//!
//! Tests error construction, display, context, and error kinds.

use weft_foundation::{DeclId, Error, ErrorContext, ErrorKind, FileId, Span};

// =============================================================================
// Error Construction
// =============================================================================

#[test]
fn error_unknown_declaration() {
    let err = Error::unknown_declaration(DeclId::new(42));
    assert!(matches!(err.kind, ErrorKind::UnknownDeclaration(_)));
    assert!(format!("{err}").contains("42"));
}

#[test]
fn error_unexpected_value() {
    let err = Error::unexpected_value("string", "integer");
    assert!(matches!(err.kind, ErrorKind::UnexpectedValue { .. }));
    assert_eq!(format!("{err}"), "unexpected value: expected string, got integer");
}

#[test]
fn error_attribute_fault() {
    let err = Error::attribute_fault("server", "url missing");
    assert_eq!(format!("{err}"), "attribute @server failed: url missing");
}

#[test]
fn error_internal() {
    let err = Error::internal("slot reused");
    assert_eq!(format!("{err}"), "internal error: slot reused");
}

#[test]
fn error_frozen() {
    let err = Error::new(ErrorKind::Frozen);
    assert_eq!(format!("{err}"), "program is frozen");
}

// =============================================================================
// Error Context
// =============================================================================

#[test]
fn error_with_context() {
    let span = Span::new(FileId::new(1), 10, 20, 3, 5);
    let err = Error::malformed_tree(FileId::new(1), "empty namespace path segment")
        .with_context(ErrorContext::new().with_source("main.tsp").with_span(span));
    let context = err.context.as_ref().unwrap();
    assert_eq!(context.source.as_deref(), Some("main.tsp"));
    assert_eq!(context.span, Some(span));
    assert_eq!(context.to_string(), "at main.tsp:3:5");
}

#[test]
fn error_context_without_span_names_the_source() {
    let err = Error::malformed_tree(FileId::new(1), "x").in_source("lib.tsp");
    assert!(err.span().is_none());
    assert_eq!(err.context.unwrap().to_string(), "at lib.tsp");
}

#[test]
fn error_without_context_has_none() {
    let err = Error::internal("x");
    assert!(err.context.is_none());
}
