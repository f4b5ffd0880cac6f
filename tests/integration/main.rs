//! Cross-layer integration tests for Weft
//!
//! Tests that verify correct interaction between the checker, the standard
//! library, and the HTTP library over whole programs.

mod determinism;
mod options;
mod sharing;

use weft::checker::syntax::{AttributeNode, DeclNode, PropertyNode, Statement, SyntaxTree, TypeExpr, ValueExpr};
use weft::checker::{Checker, CheckerOptions, FrozenProgram};
use weft::foundation::FileId;

/// Builds one file from declarations.
pub fn file(index: u32, path: &str, decls: Vec<DeclNode>) -> SyntaxTree {
    decls
        .into_iter()
        .fold(SyntaxTree::new(FileId::new(index), path), SyntaxTree::with_decl)
}

/// Checks with the HTTP library under the given options.
pub fn check(options: CheckerOptions, trees: &[SyntaxTree]) -> FrozenProgram {
    Checker::new(options)
        .with_library(weft::http::http_library())
        .check(trees)
}

/// A small service with one warning (a repeated verb) and no errors.
pub fn widget_service() -> Vec<SyntaxTree> {
    let ops = vec![
        DeclNode::operation("list")
            .with_attribute(AttributeNode::new("route").with_arg(ValueExpr::string("/widgets")))
            .with_attribute(AttributeNode::new("get"))
            .with_attribute(AttributeNode::new("get"))
            .with_parameter(
                PropertyNode::new("pageSize", TypeExpr::reference("int32"))
                    .with_attribute(AttributeNode::new("query")),
            )
            .returning(TypeExpr::reference("OkResponse")),
    ];
    let widgets = DeclNode::namespace(
        "Widgets",
        ops.into_iter().map(Statement::Declaration).collect(),
    );
    let model = DeclNode::namespace(
        "Widgets",
        vec![Statement::Declaration(
            DeclNode::model("Widget")
                .with_property(PropertyNode::new("id", TypeExpr::reference("string")))
                .with_property(PropertyNode::optional("weight", TypeExpr::reference("float64"))),
        )],
    );
    vec![file(0, "ops.tsp", vec![widgets]), file(1, "models.tsp", vec![model])]
}
