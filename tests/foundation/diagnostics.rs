//! Integration tests for the diagnostic collector

use weft_foundation::{DeclId, Diagnostic, DiagnosticCollector, DiagnosticTarget, FileId, Severity, codes};

fn decl(n: u32) -> DeclId {
    DeclId::new(n)
}

// =============================================================================
// Reporting
// =============================================================================

#[test]
fn identical_diagnostics_are_reported_once() {
    let mut collector = DiagnosticCollector::new();
    assert!(collector.report(Diagnostic::error(codes::UNASSIGNABLE, decl(1), "no")));
    assert!(!collector.report(Diagnostic::error(codes::UNASSIGNABLE, decl(1), "no")));
    assert!(collector.report(Diagnostic::error(codes::UNASSIGNABLE, decl(2), "no")));
    assert!(collector.report(Diagnostic::error(codes::UNASSIGNABLE, decl(1), "other")));
    assert_eq!(collector.len(), 3);
}

#[test]
fn warnings_do_not_count_as_errors() {
    let mut collector = DiagnosticCollector::new();
    collector.report(Diagnostic::warning(codes::DUPLICATE_ATTRIBUTE, decl(0), "twice"));
    assert!(!collector.has_error());
    assert!(!collector.is_empty());
}

#[test]
fn promotion_turns_warnings_into_errors() {
    let mut collector = DiagnosticCollector::new();
    collector.report(Diagnostic::warning(codes::DUPLICATE_ATTRIBUTE, decl(0), "twice"));
    collector.promote_warnings();
    assert!(collector.has_error());
    assert_eq!(collector.all()[0].severity, Severity::Error);
}

// =============================================================================
// Queries
// =============================================================================

#[test]
fn query_by_code_and_declaration() {
    let mut collector = DiagnosticCollector::new();
    collector.report(Diagnostic::error(codes::UNKNOWN_IDENTIFIER, decl(1), "a"));
    collector.report(Diagnostic::error(codes::DUPLICATE_DECLARATION, decl(2), "b"));
    collector.report(Diagnostic::error(codes::UNKNOWN_IDENTIFIER, decl(2), "c"));
    assert_eq!(collector.by_code(codes::UNKNOWN_IDENTIFIER).count(), 2);
    let messages: Vec<_> = collector.for_decl(decl(2)).map(|d| d.message.as_str()).collect();
    assert_eq!(messages, vec!["b", "c"]);
}

#[test]
fn signature_is_code_and_target() {
    let mut collector = DiagnosticCollector::new();
    collector.report(Diagnostic::error(codes::INVALID_SYNTAX_TREE, DiagnosticTarget::File(FileId::new(4)), "bad"));
    assert_eq!(
        collector.signature(),
        vec![(codes::INVALID_SYNTAX_TREE.to_string(), DiagnosticTarget::File(FileId::new(4)))]
    );
}

#[test]
fn display_includes_severity_and_code() {
    let diagnostic = Diagnostic::warning(codes::DUPLICATE_ATTRIBUTE, decl(0), "@doc is applied more than once");
    assert_eq!(
        diagnostic.to_string(),
        "warning duplicate-attribute: @doc is applied more than once"
    );
}
