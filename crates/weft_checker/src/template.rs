//! Template instantiation cache.
//!
//! Instances are keyed by the template declaration and the structural key of
//! each argument, so equal arguments always yield the same type handle. A
//! template model's instance is cached before its properties are evaluated;
//! a property that refers back to the same instance therefore resolves to it.
//! Aliases cannot be cached early, so an alias that re-enters its own
//! in-progress instantiation is circular.

use std::collections::HashMap;

use tracing::{debug, trace};
use weft_foundation::{DeclId, DiagnosticTarget, TypeId, codes};

use crate::evaluator::Locals;
use crate::program::{DeclKind, DeclSyntax, Program};
use crate::syntax::TemplateArg;
use crate::types::{Type, TypeKey};

type CacheKey = (DeclId, Vec<TypeKey>);

/// Memoized template instances.
#[derive(Clone, Debug, Default)]
pub struct TemplateCache {
    entries: HashMap<CacheKey, TypeId>,
    in_progress: Vec<CacheKey>,
    hits: usize,
}

impl TemplateCache {
    /// Creates an empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of distinct instances.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if nothing was instantiated.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns how many lookups were answered from the cache.
    #[must_use]
    pub fn hits(&self) -> usize {
        self.hits
    }

    /// Returns how many instantiations are currently nested.
    #[must_use]
    pub fn depth(&self) -> usize {
        self.in_progress.len()
    }
}

impl Program {
    /// Instantiates a template with already-resolved arguments.
    ///
    /// Returns the `Instantiated` type, or the error type if the
    /// instantiation is circular or nests deeper than
    /// `max_template_depth`.
    pub fn instantiate(&mut self, template: DeclId, args: Vec<TypeId>) -> TypeId {
        let key: CacheKey = (template, args.iter().map(|a| self.types.key(*a)).collect());
        if let Some(&hit) = self.templates.entries.get(&key) {
            self.templates.hits += 1;
            trace!(template = ?template, "template cache hit");
            return hit;
        }

        let name = self.qualified_name(template);
        if self.templates.in_progress.contains(&key) {
            self.error(
                codes::CIRCULAR_TEMPLATE,
                template,
                format!("Template '{name}' recursively references itself"),
            );
            return self.types.error();
        }
        if self.templates.in_progress.len() >= self.options().max_template_depth {
            self.error(
                codes::CIRCULAR_TEMPLATE,
                template,
                format!(
                    "Template '{name}' instantiation exceeds the maximum depth of {}",
                    self.options().max_template_depth
                ),
            );
            return self.types.error();
        }

        debug!(template = %name, args = args.len(), "instantiating template");
        let instance = self.create_instance(template, &args);
        match self.decl(template).kind {
            DeclKind::Model => {
                let body = self.types.reserve();
                let wrapper = self.types.alloc(Type::Instantiated {
                    template,
                    args,
                    body,
                });
                self.decl_types.insert(instance, wrapper);
                self.templates.entries.insert(key.clone(), wrapper);
                self.templates.in_progress.push(key);
                self.fill_model(instance, body);
                self.templates.in_progress.pop();
                wrapper
            }
            _ => {
                let DeclSyntax::Alias { target } = self.decl(instance).syntax.clone() else {
                    return self.types.error();
                };
                self.templates.in_progress.push(key.clone());
                let body = self.eval_type(&target, instance);
                self.templates.in_progress.pop();
                let result = if self.types.is_error(body) {
                    body
                } else {
                    self.types.alloc(Type::Instantiated {
                        template,
                        args,
                        body,
                    })
                };
                self.decl_types.insert(instance, result);
                self.templates.entries.insert(key, result);
                result
            }
        }
    }

    /// Creates the declaration standing for one instance: same name, parent,
    /// attributes and syntax as the template, with parameters bound to the
    /// arguments.
    fn create_instance(&mut self, template: DeclId, args: &[TypeId]) -> DeclId {
        let source = self.decl(template).clone();
        let instance = self.alloc_decl(source.kind, source.name.clone(), source.parent);
        {
            let decl = self.decl_mut(instance);
            decl.span = source.span;
            decl.file = source.file;
            decl.attributes = source.attributes.clone();
            decl.syntax = source.syntax.clone();
            decl.usings = source.usings.clone();
            decl.instance_of = Some((template, args.to_vec()));
            decl.bindings = source
                .template_params
                .iter()
                .map(|p| p.name.clone())
                .zip(args.iter().copied())
                .collect();
        }
        for (name, member) in &source.members {
            let original = self.decl(*member).clone();
            let copy = self.alloc_decl(original.kind, original.name.clone(), Some(instance));
            let decl = self.decl_mut(copy);
            decl.span = original.span;
            decl.file = original.file;
            decl.attributes = original.attributes;
            decl.syntax = original.syntax;
            self.attach(instance, name, copy);
        }
        instance
    }

    /// Binds a template's parameters to `TemplateParameter` types so the
    /// declaration itself can be checked.
    pub(crate) fn ensure_template_bindings(&mut self, id: DeclId) {
        let decl = self.decl(id);
        if !decl.is_template() || !decl.bindings.is_empty() || self.resolving.contains(&id) {
            return;
        }
        let params = decl.template_params.clone();
        self.resolving.push(id);
        let mut locals = Locals::new();
        for param in &params {
            let constraint = param
                .constraint
                .as_ref()
                .map(|c| self.eval_type_in(c, id, &locals));
            let default = param
                .default
                .as_ref()
                .map(|d| self.eval_type_in(d, id, &locals));
            let ty = self.types.alloc(Type::TemplateParameter {
                name: param.name.clone(),
                constraint,
                default,
            });
            locals.insert(param.name.clone(), ty);
        }
        self.resolving.pop();
        self.decl_mut(id).bindings = locals;
    }

    /// Matches reference arguments to a template's parameters.
    ///
    /// Positional arguments fill parameters in order; named arguments fill by
    /// name; missing ones take their default. Problems are reported and the
    /// affected slot becomes the error type.
    pub(crate) fn resolve_template_args(
        &mut self,
        template: DeclId,
        args: &[TemplateArg],
        scope: DeclId,
        locals: &Locals,
        target: DiagnosticTarget,
    ) -> Vec<TypeId> {
        let params = self.decl(template).template_params.clone();
        let name = self.qualified_name(template);
        let error = self.types.error();

        let positional = args.iter().filter(|a| a.name.is_none()).count();
        if positional > params.len() {
            self.error(
                codes::INVALID_TEMPLATE_ARGS,
                target,
                format!(
                    "Too many template arguments for '{name}': expected {}, got {positional}",
                    params.len()
                ),
            );
        }

        let mut values: Vec<Option<TypeId>> = vec![None; params.len()];
        let mut seen_named = false;
        for (index, arg) in args.iter().enumerate() {
            let value = self.eval_type_in(&arg.value, scope, locals);
            match &arg.name {
                None if seen_named => self.error(
                    codes::INVALID_TEMPLATE_ARGS,
                    target,
                    "Positional template arguments cannot follow named arguments",
                ),
                None => {
                    if let Some(slot) = values.get_mut(index) {
                        *slot = Some(value);
                    }
                }
                Some(arg_name) => {
                    seen_named = true;
                    match params.iter().position(|p| &p.name == arg_name) {
                        None => self.error(
                            codes::INVALID_TEMPLATE_ARGS,
                            target,
                            format!("'{name}' has no template parameter named '{arg_name}'"),
                        ),
                        Some(i) if values[i].is_some() => self.error(
                            codes::INVALID_TEMPLATE_ARGS,
                            target,
                            format!("Template argument '{arg_name}' is specified more than once"),
                        ),
                        Some(i) => values[i] = Some(value),
                    }
                }
            }
        }

        let mut bound = Locals::new();
        let mut resolved = Vec::with_capacity(params.len());
        for (param, value) in params.iter().zip(values) {
            let mut ty = match (value, &param.default) {
                (Some(ty), _) => ty,
                (None, Some(default)) => self.eval_type_in(default, template, &bound),
                (None, None) => {
                    self.error(
                        codes::INVALID_TEMPLATE_ARGS,
                        target,
                        format!("Template argument '{}' of '{name}' is required", param.name),
                    );
                    error
                }
            };
            if let Some(constraint) = &param.constraint {
                let constraint = self.eval_type_in(constraint, template, &bound);
                if !self.is_assignable(ty, constraint) {
                    let rendered = self.render_type(ty);
                    let expected = self.render_type(constraint);
                    self.error(
                        codes::INVALID_ARGUMENT,
                        target,
                        format!(
                            "Argument '{rendered}' is not assignable to the constraint '{expected}' of template parameter '{}'",
                            param.name
                        ),
                    );
                    ty = error;
                }
            }
            bound.insert(param.name.clone(), ty);
            resolved.push(ty);
        }
        resolved
    }
}
