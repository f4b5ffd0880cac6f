//! Integration tests for Layer 2: HTTP
//!
//! Tests for the HTTP library checked together with user sources spread
//! over several files, and property tests for name case conversion.

mod case;
mod service;

use weft_checker::syntax::{DeclNode, SyntaxTree};
use weft_checker::{Checker, CheckerOptions, FrozenProgram};
use weft_foundation::FileId;

/// Builds one file from declarations.
pub fn file(index: u32, path: &str, decls: Vec<DeclNode>) -> SyntaxTree {
    decls
        .into_iter()
        .fold(SyntaxTree::new(FileId::new(index), path), SyntaxTree::with_decl)
}

/// Checks the trees with the standard and HTTP libraries.
pub fn check(trees: &[SyntaxTree]) -> FrozenProgram {
    Checker::new(CheckerOptions::default())
        .with_library(weft_http::http_library())
        .check(trees)
}

/// Codes of every reported diagnostic, in order.
pub fn codes(program: &FrozenProgram) -> Vec<String> {
    program
        .diagnostics()
        .all()
        .iter()
        .map(|d| d.code.clone())
        .collect()
}
