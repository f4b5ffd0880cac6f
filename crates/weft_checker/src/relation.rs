//! Structural assignability between types.
//!
//! Queries carry the set of `(source, target)` pairs currently being related.
//! Meeting a pair again while it is still open assumes it holds, which lets
//! mutually recursive models terminate.

use std::collections::HashSet;

use weft_foundation::{DiagnosticTarget, TypeId, codes};

use crate::program::Program;
use crate::types::{LiteralValue, ModelType, ScalarKind, ScalarType, Type};

impl Program {
    /// Returns true if a value of `source` may be used where `target` is
    /// expected. Reports nothing.
    #[must_use]
    pub fn is_assignable(&self, source: TypeId, target: TypeId) -> bool {
        Relation {
            program: self,
            open: HashSet::new(),
        }
        .related(source, target)
    }

    /// Like [`Program::is_assignable`], reporting `unassignable` on failure.
    pub fn check_assignable(
        &mut self,
        source: TypeId,
        target: TypeId,
        at: impl Into<DiagnosticTarget>,
    ) -> bool {
        if self.is_assignable(source, target) {
            return true;
        }
        let message = format!(
            "Type '{}' is not assignable to type '{}'",
            self.render_type(source),
            self.render_type(target)
        );
        self.error(codes::UNASSIGNABLE, at, message);
        false
    }
}

struct Relation<'p> {
    program: &'p Program,
    open: HashSet<(TypeId, TypeId)>,
}

impl Relation<'_> {
    fn related(&mut self, source: TypeId, target: TypeId) -> bool {
        let program = self.program;
        let types = program.types();
        let source = types.unwrap_instance(source);
        let target = types.unwrap_instance(target);
        if source == target || types.is_error(source) || types.is_error(target) {
            return true;
        }

        match (types.get(source), types.get(target)) {
            (_, Type::Unknown) | (Type::Never, _) => return true,
            (Type::Pending, _) | (_, Type::Pending) => return true,
            (Type::Void, _) | (_, Type::Void) => return false,
            (Type::TemplateParameter { constraint, .. }, _) => {
                let constraint = constraint.unwrap_or(types.intrinsics().unknown);
                return self.related(constraint, target);
            }
            (_, Type::TemplateParameter { constraint, .. }) => {
                let constraint = constraint.unwrap_or(types.intrinsics().unknown);
                return self.related(source, constraint);
            }
            _ => {}
        }

        if !self.open.insert((source, target)) {
            return true;
        }
        let result = self.structural(source, target);
        self.open.remove(&(source, target));
        result
    }

    fn structural(&mut self, source: TypeId, target: TypeId) -> bool {
        let program = self.program;
        let types = program.types();
        match (types.get(source), types.get(target)) {
            (Type::Union { variants, .. }, _) => variants.iter().all(|v| self.related(*v, target)),
            (_, Type::Union { variants, .. }) => variants.iter().any(|v| self.related(source, *v)),
            (Type::Literal(literal), Type::Scalar(scalar)) => self.literal_fits(literal, scalar),
            (Type::Literal(a), Type::Literal(b)) => a == b,
            (Type::Scalar(a), Type::Scalar(_)) => self.extends(a, target),
            (Type::Model(a), Type::Model(b)) => self.model_related(a, b),
            (Type::Model(_) | Type::AnyModel, Type::AnyModel) => true,
            (Type::Tuple(a), Type::Tuple(b)) => {
                a.len() == b.len() && a.iter().zip(b).all(|(s, t)| self.related(*s, *t))
            }
            (Type::Tuple(items), Type::Array(element)) => {
                items.iter().all(|s| self.related(*s, *element))
            }
            (Type::Array(a), Type::Array(b)) => self.related(*a, *b),
            (Type::EnumMember { owner, .. }, Type::Enum { decl }) => owner == decl,
            (Type::Declaration { decl: a, .. }, Type::Declaration { decl: b, .. }) => a == b,
            _ => false,
        }
    }

    fn literal_fits(&self, literal: &LiteralValue, scalar: &ScalarType) -> bool {
        let in_bounds = |value: f64| scalar.bounds.contains(value);
        match (literal, scalar.kind) {
            (LiteralValue::String(_), ScalarKind::String)
            | (LiteralValue::Boolean(_), ScalarKind::Boolean) => true,
            (
                LiteralValue::Integer(_),
                ScalarKind::Integer | ScalarKind::Float | ScalarKind::Numeric,
            )
            | (LiteralValue::Float(_), ScalarKind::Float | ScalarKind::Numeric) => {
                literal.as_f64().is_some_and(in_bounds)
            }
            (LiteralValue::Float(value), ScalarKind::Integer) => {
                self.program.options().allow_numeric_narrowing
                    && value.fract() == 0.0
                    && in_bounds(*value)
            }
            _ => false,
        }
    }

    fn extends(&self, source: &ScalarType, target: TypeId) -> bool {
        let types = self.program.types();
        let mut base = source.base;
        while let Some(current) = base {
            if current == target {
                return true;
            }
            base = match types.get(current) {
                Type::Scalar(scalar) => scalar.base,
                _ => None,
            };
        }
        false
    }

    fn model_related(&mut self, source: &ModelType, target: &ModelType) -> bool {
        for (name, expected) in &target.properties {
            match source.properties.get(name) {
                Some(actual) => {
                    if actual.optional && !expected.optional {
                        return false;
                    }
                    if !self.related(actual.ty, expected.ty) {
                        return false;
                    }
                }
                None if expected.optional => {}
                None => return false,
            }
        }
        !target.closed
            || source
                .properties
                .keys()
                .all(|name| target.properties.contains_key(name))
    }
}
