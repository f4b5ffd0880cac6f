//! Integration tests for Layer 1: Checker
//!
//! Tests for binding, type evaluation, relations, templates, and the
//! attribute engine, driven through the full checking pipeline.

mod attributes;
mod binding;
mod types;

use weft_checker::syntax::{DeclNode, SyntaxTree};
use weft_checker::{Checker, CheckerOptions, FrozenProgram, Library};
use weft_foundation::FileId;

/// Builds one file from declarations.
pub fn file(index: u32, path: &str, decls: Vec<DeclNode>) -> SyntaxTree {
    decls
        .into_iter()
        .fold(SyntaxTree::new(FileId::new(index), path), SyntaxTree::with_decl)
}

/// Checks the trees with the standard library and any extra libraries.
pub fn check_with(trees: &[SyntaxTree], libraries: Vec<Library>) -> FrozenProgram {
    libraries
        .into_iter()
        .fold(Checker::new(CheckerOptions::default()), Checker::with_library)
        .check(trees)
}

/// Checks one file with the standard library.
pub fn check(decls: Vec<DeclNode>) -> FrozenProgram {
    check_with(&[file(0, "main.tsp", decls)], Vec::new())
}
