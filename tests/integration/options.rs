//! Checker options across the whole pipeline

use weft::checker::syntax::{AttributeNode, DeclNode, PropertyNode, TypeExpr, ValueExpr};
use weft::checker::{
    ArgValue, AttributeContext, AttributeDefinition, AttributeSignature, Checker, CheckerOptions, Library,
    ParamSignature, TargetKinds,
};
use weft::foundation::{Result, Severity, codes};

use crate::{check, file, widget_service};

#[test]
fn warnings_do_not_block_emit_by_default() {
    let program = check(CheckerOptions::default(), &widget_service());
    let warnings: Vec<_> = program.diagnostics().by_code(codes::DUPLICATE_ATTRIBUTE).collect();
    assert_eq!(warnings.len(), 1);
    assert_eq!(warnings[0].severity, Severity::Warning);
    assert!(!program.has_error());
    assert!(program.should_emit(false));
}

#[test]
fn warn_as_error_promotes_every_warning() {
    let program = check(CheckerOptions::strict(), &widget_service());
    assert!(program.diagnostics().all().iter().all(|d| d.severity == Severity::Error));
    assert!(program.has_error());
    assert!(!program.should_emit(false));
    assert!(program.should_emit(true));
}

#[test]
fn nostdlib_leaves_standard_names_unresolved() {
    let tree = file(
        0,
        "main.tsp",
        vec![DeclNode::model("M").with_property(PropertyNode::new("s", TypeExpr::reference("string")))],
    );
    let program = Checker::new(CheckerOptions::default().with_nostdlib(true)).check(&[tree]);
    assert_eq!(program.diagnostics().by_code(codes::UNKNOWN_IDENTIFIER).count(), 1);
    assert!(program.lookup("string").is_none());
}

fn weigh_library() -> Library {
    Library::new("weigh").with_attribute(AttributeDefinition::new(
        AttributeSignature::new("weigh", TargetKinds::any())
            .with_param(ParamSignature::required("grams", TypeExpr::reference("int32"))),
        |_: &mut AttributeContext<'_>, _: &[ArgValue]| -> Result<()> { Ok(()) },
    ))
}

fn weighed(value: f64) -> Vec<weft::checker::syntax::SyntaxTree> {
    vec![file(
        0,
        "main.tsp",
        vec![DeclNode::model("Parcel")
            .with_attribute(AttributeNode::new("weigh").with_arg(ValueExpr::Float(value)))],
    )]
}

#[test]
fn numeric_narrowing_is_opt_in() {
    let strict = Checker::new(CheckerOptions::default())
        .with_library(weigh_library())
        .check(&weighed(3.0));
    assert_eq!(strict.diagnostics().by_code(codes::INVALID_ARGUMENT).count(), 1);

    let narrowing = Checker::new(CheckerOptions::default().with_numeric_narrowing(true))
        .with_library(weigh_library());
    assert!(narrowing.check(&weighed(3.0)).diagnostics().is_empty());
    assert_eq!(
        narrowing
            .check(&weighed(3.5))
            .diagnostics()
            .by_code(codes::INVALID_ARGUMENT)
            .count(),
        1
    );
}
