//! Type evaluation: from syntax to arena types.
//!
//! Declaration types are computed lazily and memoized per declaration. Models,
//! unions, and scalars reserve their arena slot before their content is
//! evaluated, so self-references and mutual references resolve to the slot
//! instead of recursing.

use indexmap::IndexMap;
use tracing::trace;
use weft_foundation::{DeclId, DiagnosticTarget, Span, TypeId, codes};

use crate::binder::Resolution;
use crate::program::{DeclKind, DeclSyntax, Program};
use crate::syntax::{PropertyNode, TemplateArg, TypeExpr};
use crate::types::{LiteralValue, ModelType, NumericBounds, PropertyType, ScalarKind, ScalarType, Type};

/// Names bound for the duration of one evaluation (template arguments being
/// resolved). Checked before any scope.
pub(crate) type Locals = IndexMap<String, TypeId>;

/// Primitive family of the standard root scalars.
fn builtin_kind(name: &str) -> Option<ScalarKind> {
    Some(match name {
        "string" => ScalarKind::String,
        "boolean" => ScalarKind::Boolean,
        "numeric" => ScalarKind::Numeric,
        "integer" => ScalarKind::Integer,
        "float" | "decimal" => ScalarKind::Float,
        _ => return None,
    })
}

/// Value range of the fixed-width standard scalars.
#[allow(clippy::cast_precision_loss)]
fn builtin_bounds(name: &str) -> Option<NumericBounds> {
    let (min, max) = match name {
        "int8" => (f64::from(i8::MIN), f64::from(i8::MAX)),
        "int16" => (f64::from(i16::MIN), f64::from(i16::MAX)),
        "int32" => (f64::from(i32::MIN), f64::from(i32::MAX)),
        "int64" => (i64::MIN as f64, i64::MAX as f64),
        "uint8" => (0.0, f64::from(u8::MAX)),
        "uint16" => (0.0, f64::from(u16::MAX)),
        "uint32" => (0.0, f64::from(u32::MAX)),
        "uint64" => (0.0, u64::MAX as f64),
        "safeint" => (-9_007_199_254_740_991.0, 9_007_199_254_740_991.0),
        _ => return None,
    };
    Some(NumericBounds::new(Some(min), Some(max)))
}

/// Diagnostic target for something found while evaluating in `scope`.
pub(crate) fn at(scope: DeclId, span: Span) -> DiagnosticTarget {
    if span == Span::default() {
        DiagnosticTarget::Decl(scope)
    } else {
        DiagnosticTarget::Span(span)
    }
}

impl Program {
    // =========================================================================
    // Expressions
    // =========================================================================

    /// Evaluates a type expression in a scope.
    pub fn eval_type(&mut self, expr: &TypeExpr, scope: DeclId) -> TypeId {
        self.eval_type_in(expr, scope, &Locals::new())
    }

    pub(crate) fn eval_type_in(&mut self, expr: &TypeExpr, scope: DeclId, locals: &Locals) -> TypeId {
        match expr {
            TypeExpr::Reference { path, args, span } => {
                self.eval_reference(path, args, *span, scope, locals)
            }
            TypeExpr::String(s) => self.types.literal(LiteralValue::String(s.clone())),
            TypeExpr::Integer(n) => self.types.literal(LiteralValue::Integer(*n)),
            TypeExpr::Float(n) => self.types.literal(LiteralValue::Float(*n)),
            TypeExpr::Boolean(b) => self.types.literal(LiteralValue::Boolean(*b)),
            TypeExpr::Union(items) => {
                let variants = items
                    .iter()
                    .map(|item| self.eval_type_in(item, scope, locals))
                    .collect();
                self.types.alloc(Type::Union {
                    decl: None,
                    variants,
                })
            }
            TypeExpr::Intersection(items) => self.eval_intersection(items, scope, locals),
            TypeExpr::Tuple(items) => {
                let items = items
                    .iter()
                    .map(|item| self.eval_type_in(item, scope, locals))
                    .collect();
                self.types.alloc(Type::Tuple(items))
            }
            TypeExpr::Array(element) => {
                let element = self.eval_type_in(element, scope, locals);
                self.types.alloc(Type::Array(element))
            }
            TypeExpr::Model { properties, span } => {
                self.eval_model_expression(properties, *span, scope, locals)
            }
        }
    }

    fn intrinsic(&self, name: &str) -> Option<TypeId> {
        let intrinsics = self.types.intrinsics();
        match name {
            "unknown" => Some(intrinsics.unknown),
            "void" => Some(intrinsics.void),
            "never" => Some(intrinsics.never),
            "Record" => Some(intrinsics.any_model),
            _ => None,
        }
    }

    fn eval_reference(
        &mut self,
        path: &[String],
        args: &[TemplateArg],
        span: Span,
        scope: DeclId,
        locals: &Locals,
    ) -> TypeId {
        let error = self.types.error();
        let target = at(scope, span);
        let Some(first) = path.first() else {
            return error;
        };

        let found = match locals.get(first) {
            Some(ty) => Some(Resolution::Type(*ty)),
            None => self.resolve_name(first, scope),
        };
        let mut resolved = match found {
            Some(resolution) => resolution,
            None => {
                if path.len() == 1 {
                    if let Some(ty) = self.intrinsic(first) {
                        return ty;
                    }
                }
                self.error(
                    codes::UNKNOWN_IDENTIFIER,
                    target,
                    format!("Unknown identifier '{first}'"),
                );
                return error;
            }
        };

        for (index, segment) in path.iter().enumerate().skip(1) {
            let member = match resolved {
                Resolution::Decl(decl) => self.member(decl, segment),
                Resolution::Type(_) => None,
            };
            let Some(member) = member else {
                self.error(
                    codes::UNKNOWN_IDENTIFIER,
                    target,
                    format!("Unknown identifier '{}'", path[..=index].join(".")),
                );
                return error;
            };
            resolved = Resolution::Decl(member);
        }

        match resolved {
            Resolution::Type(ty) => {
                if !args.is_empty() {
                    self.error(
                        codes::INVALID_TEMPLATE_ARGS,
                        target,
                        format!("'{}' is not a template", path.join(".")),
                    );
                }
                ty
            }
            Resolution::Decl(decl) => {
                if self.decl(decl).is_template() {
                    let args = self.resolve_template_args(decl, args, scope, locals, target);
                    return self.instantiate(decl, args);
                }
                if !args.is_empty() {
                    self.error(
                        codes::INVALID_TEMPLATE_ARGS,
                        target,
                        format!("'{}' is not a template", self.qualified_name(decl)),
                    );
                }
                self.type_of_decl(decl)
            }
        }
    }

    fn eval_intersection(&mut self, items: &[TypeExpr], scope: DeclId, locals: &Locals) -> TypeId {
        let mut properties = IndexMap::new();
        for item in items {
            let part = self.eval_type_in(item, scope, locals);
            if self.types.is_error(part) {
                continue;
            }
            match self.types.as_model(part).map(|m| m.properties.clone()) {
                Some(inherited) => properties.extend(inherited),
                None => {
                    let rendered = self.render_type(part);
                    self.error(
                        codes::UNASSIGNABLE,
                        scope,
                        format!("Cannot intersect non-model type '{rendered}'"),
                    );
                }
            }
        }
        self.types.alloc(Type::Model(ModelType {
            decl: None,
            name: None,
            properties,
            closed: false,
        }))
    }

    fn eval_model_expression(
        &mut self,
        properties: &[PropertyNode],
        span: Span,
        scope: DeclId,
        locals: &Locals,
    ) -> TypeId {
        let file = self.decl(scope).file;
        let anon = self.alloc_decl(DeclKind::Model, None, Some(scope));
        {
            let decl = self.decl_mut(anon);
            decl.span = span;
            decl.file = file;
            decl.syntax = DeclSyntax::Model {
                is: None,
                extends: None,
                closed: false,
            };
        }
        let slot = self.types.reserve();
        self.decl_types.insert(anon, slot);

        let mut props = IndexMap::new();
        for property in properties {
            let id = self.alloc_decl(
                DeclKind::ModelProperty,
                Some(property.name.clone()),
                Some(anon),
            );
            {
                let decl = self.decl_mut(id);
                decl.span = property.span;
                decl.file = file;
                decl.attributes = property.attributes.clone();
                decl.syntax = DeclSyntax::Property {
                    ty: property.ty.clone(),
                    optional: property.optional,
                };
            }
            if self.attach(anon, &property.name, id).is_some() {
                self.decl_mut(id).shadowed = true;
                self.error(
                    codes::DUPLICATE_DECLARATION,
                    id,
                    format!("Duplicate name: \"{}\"", property.name),
                );
                continue;
            }
            let ty = self.eval_type_in(&property.ty, anon, locals);
            self.decl_types.insert(id, ty);
            props.insert(
                property.name.clone(),
                PropertyType {
                    ty,
                    optional: property.optional,
                    decl: Some(id),
                },
            );
        }

        self.types.complete(
            slot,
            Type::Model(ModelType {
                decl: Some(anon),
                name: None,
                properties: props,
                closed: false,
            }),
        );
        slot
    }

    // =========================================================================
    // Declarations
    // =========================================================================

    /// Returns the type of a declaration, evaluating it on first use.
    pub fn type_of_decl(&mut self, id: DeclId) -> TypeId {
        if let Some(ty) = self.decl_types.get(&id) {
            return *ty;
        }
        let kind = self.decl(id).kind;
        trace!(decl = ?id, %kind, "evaluating declaration type");
        let ty = match kind {
            DeclKind::Namespace | DeclKind::Interface => {
                self.types.alloc(Type::Declaration { decl: id, kind })
            }
            DeclKind::Operation => {
                let ty = self.types.alloc(Type::Declaration { decl: id, kind });
                self.decl_types.insert(id, ty);
                self.resolve_operation(id);
                return ty;
            }
            DeclKind::Model => {
                self.ensure_template_bindings(id);
                let slot = self.types.reserve();
                self.decl_types.insert(id, slot);
                self.fill_model(id, slot);
                return slot;
            }
            DeclKind::ModelProperty | DeclKind::OperationParameter | DeclKind::UnionVariant => {
                let scope = self.decl(id).parent.unwrap_or_else(|| self.global());
                self.ensure_template_bindings(scope);
                let expr = match &self.decl(id).syntax {
                    DeclSyntax::Property { ty, .. } | DeclSyntax::Variant { ty } => ty.clone(),
                    _ => return self.types.error(),
                };
                self.eval_type(&expr, scope)
            }
            DeclKind::Enum => self.types.alloc(Type::Enum { decl: id }),
            DeclKind::EnumMember => {
                let decl = self.decl(id);
                let member = Type::EnumMember {
                    owner: decl.parent.unwrap_or(id),
                    member: id,
                    name: decl.name_or_empty().to_string(),
                };
                self.types.alloc(member)
            }
            DeclKind::Union => {
                let slot = self.types.reserve();
                self.decl_types.insert(id, slot);
                let members: Vec<DeclId> = self.decl(id).members.values().copied().collect();
                let variants = members.into_iter().map(|m| self.type_of_decl(m)).collect();
                self.types.complete(
                    slot,
                    Type::Union {
                        decl: Some(id),
                        variants,
                    },
                );
                return slot;
            }
            DeclKind::Scalar => {
                let slot = self.types.reserve();
                self.decl_types.insert(id, slot);
                self.fill_scalar(id, slot);
                return slot;
            }
            DeclKind::Alias => self.resolve_alias(id),
        };
        self.decl_types.insert(id, ty);
        ty
    }

    fn resolve_operation(&mut self, id: DeclId) {
        let members: Vec<DeclId> = self.decl(id).members.values().copied().collect();
        for member in members {
            self.type_of_decl(member);
        }
        let returns = match &self.decl(id).syntax {
            DeclSyntax::Operation { returns } => returns.clone(),
            _ => TypeExpr::reference("void"),
        };
        let ty = self.eval_type(&returns, id);
        self.return_types.insert(id, ty);
    }

    pub(crate) fn fill_model(&mut self, id: DeclId, slot: TypeId) {
        let (is, extends, closed) = match &self.decl(id).syntax {
            DeclSyntax::Model {
                is,
                extends,
                closed,
            } => (is.clone(), extends.clone(), *closed),
            _ => (None, None, false),
        };

        let mut properties = IndexMap::new();
        for (keyword, expr) in [("is", is), ("extends", extends)] {
            let Some(expr) = expr else { continue };
            let base = self.eval_type(&expr, id);
            self.inherit(id, keyword, base, &mut properties);
        }

        let members: Vec<DeclId> = self.decl(id).members.values().copied().collect();
        for member in members {
            let ty = self.type_of_decl(member);
            let decl = self.decl(member);
            properties.insert(
                decl.name_or_empty().to_string(),
                PropertyType {
                    ty,
                    optional: decl.is_optional(),
                    decl: Some(member),
                },
            );
        }

        let name = self.decl(id).name.clone();
        self.types.complete(
            slot,
            Type::Model(ModelType {
                decl: Some(id),
                name,
                properties,
                closed,
            }),
        );
    }

    fn inherit(
        &mut self,
        model: DeclId,
        keyword: &str,
        base: TypeId,
        properties: &mut IndexMap<String, PropertyType>,
    ) {
        if self.types.is_error(base) {
            return;
        }
        if let Some(inherited) = self.types.as_model(base).map(|m| m.properties.clone()) {
            properties.extend(inherited);
            return;
        }
        let name = self.qualified_name(model);
        if matches!(self.types.get(self.types.unwrap_instance(base)), Type::Pending) {
            self.error(
                codes::CIRCULAR_TEMPLATE,
                model,
                format!("Model '{name}' recursively references itself through '{keyword}'"),
            );
        } else {
            let rendered = self.render_type(base);
            self.error(
                codes::UNASSIGNABLE,
                model,
                format!("Model '{name}' can only use '{keyword}' with another model, found '{rendered}'"),
            );
        }
    }

    fn fill_scalar(&mut self, id: DeclId, slot: TypeId) {
        let (extends, min, max) = match &self.decl(id).syntax {
            DeclSyntax::Scalar { extends, min, max } => (extends.clone(), *min, *max),
            _ => (None, None, None),
        };
        let name = self.decl(id).name_or_empty().to_string();
        let standard = self.decl(id).parent == Some(self.global());

        let mut base = None;
        let mut inherited_kind = None;
        let mut bounds = NumericBounds::default();
        if let Some(expr) = extends {
            let candidate = self.eval_type(&expr, id);
            match self.types.get(candidate) {
                Type::Scalar(scalar) => {
                    base = Some(candidate);
                    inherited_kind = Some(scalar.kind);
                    bounds = scalar.bounds;
                }
                Type::Error => {}
                Type::Pending => self.error(
                    codes::CIRCULAR_TEMPLATE,
                    id,
                    format!("Scalar '{name}' recursively extends itself"),
                ),
                _ => {
                    let rendered = self.render_type(candidate);
                    self.error(
                        codes::UNASSIGNABLE,
                        id,
                        format!("Scalar '{name}' can only extend another scalar, found '{rendered}'"),
                    );
                }
            }
        }

        let own_kind = if standard { builtin_kind(&name) } else { None };
        if standard {
            if let Some(builtin) = builtin_bounds(&name) {
                bounds = bounds.intersect(builtin);
            }
        }
        bounds = bounds.intersect(NumericBounds::new(min, max));

        self.types.complete(
            slot,
            Type::Scalar(ScalarType {
                decl: id,
                name,
                base,
                kind: own_kind.or(inherited_kind).unwrap_or(ScalarKind::Opaque),
                bounds,
            }),
        );
    }

    fn resolve_alias(&mut self, id: DeclId) -> TypeId {
        if self.resolving.contains(&id) {
            let name = self.qualified_name(id);
            self.error(
                codes::CIRCULAR_TEMPLATE,
                id,
                format!("Alias '{name}' recursively references itself"),
            );
            return self.types.error();
        }
        self.ensure_template_bindings(id);
        let DeclSyntax::Alias { target } = self.decl(id).syntax.clone() else {
            return self.types.error();
        };
        self.resolving.push(id);
        let ty = self.eval_type(&target, id);
        self.resolving.pop();
        ty
    }
}
