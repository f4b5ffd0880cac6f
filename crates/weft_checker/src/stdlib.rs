//! The standard library: root scalars and documentation/bounds attributes.
//!
//! Included in every check unless [`CheckerOptions::nostdlib`] is set.
//!
//! [`CheckerOptions::nostdlib`]: crate::options::CheckerOptions::nostdlib

use weft_foundation::{DeclId, Error};

use crate::attribute::{
    AttributeContext, AttributeDefinition, AttributeSignature, ParamSignature, TargetKinds,
};
use crate::library::Library;
use crate::program::{DeclKind, Program};
use crate::state::{StateKey, StateValue};
use crate::syntax::{DeclNode, TypeExpr};
use crate::types::{NumericBounds, Type};
use crate::value::ArgValue;

/// `@doc` text.
pub const DOC: StateKey = StateKey::new("doc");
/// `@minValue` bound.
pub const MIN_VALUE: StateKey = StateKey::new("minValue");
/// `@maxValue` bound.
pub const MAX_VALUE: StateKey = StateKey::new("maxValue");

/// Root scalars and their bases, in declaration order.
const SCALARS: &[(&str, Option<&str>)] = &[
    ("string", None),
    ("boolean", None),
    ("bytes", None),
    ("numeric", None),
    ("integer", Some("numeric")),
    ("float", Some("numeric")),
    ("int64", Some("integer")),
    ("int32", Some("int64")),
    ("int16", Some("int32")),
    ("int8", Some("int16")),
    ("safeint", Some("int64")),
    ("uint64", Some("integer")),
    ("uint32", Some("uint64")),
    ("uint16", Some("uint32")),
    ("uint8", Some("uint16")),
    ("float64", Some("float")),
    ("float32", Some("float64")),
    ("decimal", Some("numeric")),
    ("decimal128", Some("decimal")),
    ("plainDate", None),
    ("plainTime", None),
    ("utcDateTime", None),
    ("offsetDateTime", None),
    ("duration", None),
    ("url", Some("string")),
];

/// Builds the standard library.
#[must_use]
pub fn standard_library() -> Library {
    let mut library = Library::new("std");
    for (name, base) in SCALARS {
        library = library.with_decl(DeclNode::scalar(*name, *base));
    }

    let value_targets = || TargetKinds::of(&[DeclKind::ModelProperty, DeclKind::Scalar]);
    library
        .with_attribute(AttributeDefinition::new(
            AttributeSignature::new("doc", TargetKinds::any())
                .with_param(ParamSignature::required("text", TypeExpr::reference("string"))),
            apply_doc,
        ))
        .with_attribute(AttributeDefinition::new(
            AttributeSignature::new("minValue", value_targets())
                .with_param(ParamSignature::required("value", TypeExpr::reference("numeric"))),
            |ctx: &mut AttributeContext<'_>, args: &[ArgValue]| apply_bound(ctx, args, MIN_VALUE),
        ))
        .with_attribute(AttributeDefinition::new(
            AttributeSignature::new("maxValue", value_targets())
                .with_param(ParamSignature::required("value", TypeExpr::reference("numeric"))),
            |ctx: &mut AttributeContext<'_>, args: &[ArgValue]| apply_bound(ctx, args, MAX_VALUE),
        ))
}

fn apply_doc(ctx: &mut AttributeContext<'_>, args: &[ArgValue]) -> weft_foundation::Result<()> {
    let text = args
        .first()
        .and_then(ArgValue::as_str)
        .ok_or_else(|| Error::unexpected_value("string", "non-string"))?;
    ctx.set_state(DOC, StateValue::String(text.to_string()));
    Ok(())
}

fn apply_bound(
    ctx: &mut AttributeContext<'_>,
    args: &[ArgValue],
    key: StateKey,
) -> weft_foundation::Result<()> {
    let value = args
        .first()
        .and_then(ArgValue::as_f64)
        .ok_or_else(|| Error::unexpected_value("number", "non-numeric"))?;
    ctx.set_state(key, StateValue::Float(value));
    Ok(())
}

// =============================================================================
// Accessors
// =============================================================================

/// Returns the `@doc` text of a declaration.
#[must_use]
pub fn doc(program: &Program, decl: DeclId) -> Option<&str> {
    program.state_of(decl, DOC).and_then(StateValue::as_str)
}

/// Returns the `@minValue` recorded on a declaration.
#[must_use]
pub fn min_value(program: &Program, decl: DeclId) -> Option<f64> {
    program.state_of(decl, MIN_VALUE).and_then(StateValue::as_f64)
}

/// Returns the `@maxValue` recorded on a declaration.
#[must_use]
pub fn max_value(program: &Program, decl: DeclId) -> Option<f64> {
    program.state_of(decl, MAX_VALUE).and_then(StateValue::as_f64)
}

fn recorded_bounds(program: &Program, decl: DeclId) -> NumericBounds {
    NumericBounds::new(min_value(program, decl), max_value(program, decl))
}

/// Effective numeric bounds of a property or scalar: attributes on the
/// declaration itself, then on every scalar in its type's base chain, then
/// the scalars' own bounds.
#[must_use]
pub fn numeric_bounds(program: &Program, decl: DeclId) -> NumericBounds {
    let mut bounds = recorded_bounds(program, decl);
    let types = program.types();
    let mut current = program.type_of(decl).map(|t| types.unwrap_instance(t));
    while let Some(id) = current {
        let Type::Scalar(scalar) = types.get(id) else {
            break;
        };
        bounds = bounds
            .intersect(recorded_bounds(program, scalar.decl))
            .intersect(scalar.bounds);
        current = scalar.base;
    }
    bounds
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::checker::Checker;
    use crate::options::CheckerOptions;
    use crate::syntax::{AttributeNode, PropertyNode, SyntaxTree, ValueExpr};
    use weft_foundation::{FileId, codes};

    fn check(tree: SyntaxTree) -> crate::program::FrozenProgram {
        Checker::new(CheckerOptions::default()).check(&[tree])
    }

    #[test]
    fn root_scalars_are_global() {
        let program = check(SyntaxTree::new(FileId::new(0), "main.tsp"));
        for (name, _) in SCALARS {
            assert!(program.lookup(name).is_some(), "missing {name}");
        }
        assert!(program.diagnostics().is_empty());
    }

    #[test]
    fn fixed_width_integers_carry_bounds() {
        let tree = SyntaxTree::new(FileId::new(0), "main.tsp").with_decl(
            DeclNode::model("M").with_property(PropertyNode::new("n", TypeExpr::reference("uint8"))),
        );
        let program = check(tree);
        let n = program.lookup("M.n").unwrap();
        let bounds = numeric_bounds(&program, n);
        assert_eq!(bounds, NumericBounds::new(Some(0.0), Some(255.0)));
    }

    #[test]
    fn attribute_bounds_narrow_scalar_bounds() {
        let tree = SyntaxTree::new(FileId::new(0), "main.tsp").with_decl(
            DeclNode::model("M").with_property(
                PropertyNode::new("code", TypeExpr::reference("int32"))
                    .with_attribute(AttributeNode::new("minValue").with_arg(ValueExpr::Integer(200)))
                    .with_attribute(AttributeNode::new("maxValue").with_arg(ValueExpr::Integer(299))),
            ),
        );
        let program = check(tree);
        let code = program.lookup("M.code").unwrap();
        assert_eq!(min_value(&program, code), Some(200.0));
        assert_eq!(
            numeric_bounds(&program, code),
            NumericBounds::new(Some(200.0), Some(299.0))
        );
    }

    #[test]
    fn doc_on_any_declaration() {
        let tree = SyntaxTree::new(FileId::new(0), "main.tsp").with_decl(
            DeclNode::operation("read")
                .with_attribute(AttributeNode::new("doc").with_arg(ValueExpr::string("Reads."))),
        );
        let program = check(tree);
        let read = program.lookup("read").unwrap();
        assert_eq!(doc(&program, read), Some("Reads."));
    }

    #[test]
    fn bounds_reject_string_arguments() {
        let tree = SyntaxTree::new(FileId::new(0), "main.tsp").with_decl(
            DeclNode::model("M").with_property(
                PropertyNode::new("n", TypeExpr::reference("int32"))
                    .with_attribute(AttributeNode::new("minValue").with_arg(ValueExpr::string("low"))),
            ),
        );
        let program = check(tree);
        assert_eq!(program.diagnostics().by_code(codes::INVALID_ARGUMENT).count(), 1);
    }

    #[test]
    fn nostdlib_skips_prelude() {
        let program = Checker::new(CheckerOptions::default().with_nostdlib(true))
            .check(&[SyntaxTree::new(FileId::new(0), "main.tsp")]);
        assert!(program.lookup("string").is_none());
    }
}
