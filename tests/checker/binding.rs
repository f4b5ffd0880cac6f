//! Binding and name resolution through the checker

use weft_checker::DeclKind;
use weft_checker::syntax::{DeclNode, PropertyNode, Statement, TypeExpr};
use weft_foundation::{DiagnosticTarget, FileId, codes};

use crate::{check, check_with, file};

// =============================================================================
// Namespaces
// =============================================================================

#[test]
fn namespaces_merge_across_files() {
    let a = file(
        0,
        "a.tsp",
        vec![DeclNode::namespace(
            "Store",
            vec![Statement::Declaration(DeclNode::model("Pet"))],
        )],
    );
    let b = file(
        1,
        "b.tsp",
        vec![DeclNode::namespace(
            "Store",
            vec![Statement::Declaration(DeclNode::model("Toy"))],
        )],
    );
    let program = check_with(&[a, b], Vec::new());
    assert!(program.lookup("Store.Pet").is_some());
    assert!(program.lookup("Store.Toy").is_some());
    assert!(program.diagnostics().is_empty());
}

#[test]
fn dotted_namespace_names_nest() {
    let program = check(vec![DeclNode::namespace(
        "Contoso.Store",
        vec![Statement::Declaration(DeclNode::model("Order"))],
    )]);
    let order = program.lookup("Contoso.Store.Order").unwrap();
    assert_eq!(program.qualified_name(order), "Contoso.Store.Order");
    let store = program.lookup("Contoso.Store").unwrap();
    assert_eq!(program.decl(store).kind, DeclKind::Namespace);
}

// =============================================================================
// Conflicts
// =============================================================================

#[test]
fn first_declaration_wins_a_name_conflict() {
    let program = check(vec![
        DeclNode::model("Pet"),
        DeclNode::model("Pet").with_property(PropertyNode::new("x", TypeExpr::reference("string"))),
    ]);
    let pet = program.lookup("Pet").unwrap();
    assert!(program.decl(pet).members.is_empty());
    let dupes: Vec<_> = program.diagnostics().by_code(codes::DUPLICATE_DECLARATION).collect();
    assert_eq!(dupes.len(), 1);
    assert_eq!(dupes[0].message, "Duplicate name: \"Pet\"");
}

#[test]
fn malformed_tree_does_not_stop_other_files() {
    let bad = file(5, "bad.tsp", vec![DeclNode::namespace("A..B", Vec::new())]);
    let good = file(6, "good.tsp", vec![DeclNode::model("Fine")]);
    let program = check_with(&[bad, good], Vec::new());
    let errors: Vec<_> = program.diagnostics().by_code(codes::INVALID_SYNTAX_TREE).collect();
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].target, DiagnosticTarget::File(FileId::new(5)));
    assert!(program.lookup("Fine").is_some());
    assert!(!program.should_emit(false));
}

// =============================================================================
// Usings
// =============================================================================

#[test]
fn using_brings_namespace_members_into_scope() {
    let lib = file(
        0,
        "lib.tsp",
        vec![DeclNode::namespace(
            "Lib",
            vec![Statement::Declaration(DeclNode::model("Shared"))],
        )],
    );
    let user = file(
        1,
        "user.tsp",
        vec![DeclNode::model("Local").with_property(PropertyNode::new(
            "s",
            TypeExpr::reference("Shared"),
        ))],
    )
    .with_using("Lib");
    let program = check_with(&[lib, user], Vec::new());
    assert!(program.diagnostics().is_empty());
    let s = program.lookup("Local.s").unwrap();
    let shared = program.lookup("Lib.Shared").unwrap();
    assert_eq!(program.type_of(s), program.type_of(shared));
}

#[test]
fn unresolved_names_are_reported() {
    let program = check(vec![DeclNode::model("M").with_property(PropertyNode::new(
        "a",
        TypeExpr::reference("Missing"),
    ))]);
    let errors: Vec<_> = program.diagnostics().by_code(codes::UNKNOWN_IDENTIFIER).collect();
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].message, "Unknown identifier 'Missing'");
}

#[test]
fn unknown_using_is_reported() {
    let tree = file(0, "main.tsp", Vec::new()).with_using("Nowhere");
    let program = check_with(&[tree], Vec::new());
    assert_eq!(program.diagnostics().by_code(codes::UNKNOWN_IDENTIFIER).count(), 1);
}
