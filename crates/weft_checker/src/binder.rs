//! Binder: builds the declaration graph from syntax trees.
//!
//! Trees are bound in path order so the resulting graph does not depend on
//! the order a host hands files over. Namespaces with the same qualified name
//! merge into one declaration; any other repeated name in a scope is a
//! duplicate, reported against the later declaration, which is then
//! unreachable by lookup.

use tracing::{debug, trace, warn};
use weft_foundation::{DeclId, Diagnostic, DiagnosticTarget, Error, FileId, Result, Span, TypeId, codes};

use crate::program::{DeclKind, DeclSyntax, Program};
use crate::syntax::{DeclNode, DeclNodeKind, PropertyNode, Statement, SyntaxTree};

/// A `using` statement waiting for every tree to be bound.
#[derive(Clone, Debug)]
pub(crate) struct PendingUsing {
    /// Enclosing namespace; `None` for file-level imports.
    scope: Option<DeclId>,
    file: FileId,
    path: Vec<String>,
    span: Span,
}

/// What an identifier resolved to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Resolution {
    /// A name bound directly to a type (template parameter or argument).
    Type(TypeId),
    /// A declaration.
    Decl(DeclId),
}

// =============================================================================
// Binding
// =============================================================================

/// Binds syntax trees into the program, in path order.
///
/// A tree that cannot be interpreted is reported as `invalid-syntax-tree`
/// against its file and skipped; the remaining trees bind normally.
pub fn bind(program: &mut Program, trees: &[SyntaxTree]) {
    let mut ordered: Vec<&SyntaxTree> = trees.iter().collect();
    ordered.sort_by(|a, b| a.path.cmp(&b.path));

    for tree in ordered {
        if let Err(err) = validate_tree(tree) {
            let err = err.in_source(&tree.path);
            let location = err.context.as_ref().map(ToString::to_string).unwrap_or_default();
            warn!(%location, error = %err, "skipping malformed syntax tree");
            let target = err
                .span()
                .map_or(DiagnosticTarget::File(tree.file), DiagnosticTarget::Span);
            program.report(Diagnostic::error(codes::INVALID_SYNTAX_TREE, target, err.to_string()));
            continue;
        }
        debug!(path = %tree.path, statements = tree.statements.len(), "binding syntax tree");
        program.files.insert(tree.file, tree.path.clone());
        let global = program.global();
        let mut binder = Binder {
            program: &mut *program,
            file: tree.file,
        };
        binder.bind_statements(global, &tree.statements);
    }
}

/// Resolves `using` statements and library auto-imports.
///
/// Runs after every tree is bound, so imports may name namespaces declared
/// in any file.
pub fn resolve_imports(program: &mut Program, auto_namespaces: &[String]) {
    for pending in std::mem::take(&mut program.pending_usings) {
        let qualified = pending.path.join(".");
        let target = program
            .lookup(&qualified)
            .filter(|id| program.decl(*id).kind == DeclKind::Namespace);
        let Some(namespace) = target else {
            let at = pending.scope.unwrap_or_else(|| program.global());
            program.report(Diagnostic::error(
                codes::UNKNOWN_IDENTIFIER,
                if pending.span == Span::default() {
                    DiagnosticTarget::Decl(at)
                } else {
                    DiagnosticTarget::Span(pending.span)
                },
                format!("Unknown namespace '{qualified}'"),
            ));
            continue;
        };
        match pending.scope {
            Some(scope) => program.decl_mut(scope).usings.push(namespace),
            None => program
                .file_usings
                .entry(pending.file)
                .or_default()
                .push(namespace),
        }
    }

    for name in auto_namespaces {
        match program.lookup(name) {
            Some(ns) if !program.auto_usings.contains(&ns) => program.auto_usings.push(ns),
            Some(_) => {}
            None => debug!(namespace = %name, "auto-import namespace not declared"),
        }
    }
}

struct Binder<'p> {
    program: &'p mut Program,
    file: FileId,
}

impl Binder<'_> {
    fn bind_statements(&mut self, scope: DeclId, statements: &[Statement]) {
        for statement in statements {
            match statement {
                Statement::Using { path, span } => {
                    let scope = (scope != self.program.global()).then_some(scope);
                    self.program.pending_usings.push(PendingUsing {
                        scope,
                        file: self.file,
                        path: path.clone(),
                        span: *span,
                    });
                }
                Statement::Declaration(node) => match &node.kind {
                    DeclNodeKind::Namespace { statements } => {
                        let ns = self.namespace_path(scope, node);
                        self.program
                            .decl_mut(ns)
                            .attributes
                            .extend(node.attributes.iter().cloned());
                        self.bind_statements(ns, statements);
                    }
                    _ => {
                        self.declare(scope, node);
                    }
                },
            }
        }
    }

    /// Gets or creates each segment of a dotted namespace name.
    fn namespace_path(&mut self, scope: DeclId, node: &DeclNode) -> DeclId {
        let mut current = scope;
        for segment in node.name.split('.') {
            current = match self.program.member(current, segment) {
                Some(existing) if self.program.decl(existing).kind == DeclKind::Namespace => {
                    debug!(namespace = %segment, "merging namespace");
                    existing
                }
                _ => {
                    let id = self.new_decl(DeclKind::Namespace, segment, current, node.span);
                    self.attach_or_shadow(current, segment, id);
                    id
                }
            };
        }
        current
    }

    fn new_decl(&mut self, kind: DeclKind, name: &str, parent: DeclId, span: Span) -> DeclId {
        let id = self
            .program
            .alloc_decl(kind, Some(name.to_string()), Some(parent));
        let decl = self.program.decl_mut(id);
        decl.span = span;
        decl.file = self.file;
        id
    }

    fn attach_or_shadow(&mut self, scope: DeclId, name: &str, id: DeclId) {
        if let Some(existing) = self.program.attach(scope, name, id) {
            trace!(?existing, duplicate = ?id, name, "duplicate declaration");
            self.program.decl_mut(id).shadowed = true;
            self.program.report(Diagnostic::error(
                codes::DUPLICATE_DECLARATION,
                id,
                format!("Duplicate name: \"{name}\""),
            ));
        }
    }

    fn declare(&mut self, scope: DeclId, node: &DeclNode) -> DeclId {
        let (kind, syntax, template_params) = match &node.kind {
            DeclNodeKind::Namespace { .. } => unreachable!("namespaces bind through namespace_path"),
            DeclNodeKind::Model {
                template_params,
                is,
                extends,
                closed,
                ..
            } => (
                DeclKind::Model,
                DeclSyntax::Model {
                    is: is.clone(),
                    extends: extends.clone(),
                    closed: *closed,
                },
                template_params.clone(),
            ),
            DeclNodeKind::Operation { returns, .. } => (
                DeclKind::Operation,
                DeclSyntax::Operation {
                    returns: returns.clone(),
                },
                Vec::new(),
            ),
            DeclNodeKind::Interface { .. } => (DeclKind::Interface, DeclSyntax::None, Vec::new()),
            DeclNodeKind::Enum { .. } => (DeclKind::Enum, DeclSyntax::None, Vec::new()),
            DeclNodeKind::Union { .. } => (DeclKind::Union, DeclSyntax::None, Vec::new()),
            DeclNodeKind::Scalar { extends, min, max } => (
                DeclKind::Scalar,
                DeclSyntax::Scalar {
                    extends: extends.clone(),
                    min: *min,
                    max: *max,
                },
                Vec::new(),
            ),
            DeclNodeKind::Alias {
                template_params,
                target,
            } => (
                DeclKind::Alias,
                DeclSyntax::Alias {
                    target: target.clone(),
                },
                template_params.clone(),
            ),
        };

        let id = self.new_decl(kind, &node.name, scope, node.span);
        {
            let decl = self.program.decl_mut(id);
            decl.attributes = node.attributes.clone();
            decl.template_params = template_params;
            decl.syntax = syntax;
        }
        self.attach_or_shadow(scope, &node.name, id);

        match &node.kind {
            DeclNodeKind::Model { properties, .. } => {
                for property in properties {
                    self.declare_property(id, property, DeclKind::ModelProperty);
                }
            }
            DeclNodeKind::Operation { parameters, .. } => {
                for parameter in parameters {
                    self.declare_property(id, parameter, DeclKind::OperationParameter);
                }
            }
            DeclNodeKind::Interface { operations } => {
                for operation in operations {
                    self.declare(id, operation);
                }
            }
            DeclNodeKind::Enum { members } => {
                for member in members {
                    let m = self.new_decl(DeclKind::EnumMember, &member.name, id, member.span);
                    self.program.decl_mut(m).attributes = member.attributes.clone();
                    self.attach_or_shadow(id, &member.name, m);
                }
            }
            DeclNodeKind::Union { variants } => {
                for variant in variants {
                    let v = self.new_decl(DeclKind::UnionVariant, &variant.name, id, variant.span);
                    let decl = self.program.decl_mut(v);
                    decl.attributes = variant.attributes.clone();
                    decl.syntax = DeclSyntax::Variant {
                        ty: variant.ty.clone(),
                    };
                    self.attach_or_shadow(id, &variant.name, v);
                }
            }
            DeclNodeKind::Namespace { .. } | DeclNodeKind::Scalar { .. } | DeclNodeKind::Alias { .. } => {}
        }
        id
    }

    fn declare_property(&mut self, owner: DeclId, property: &PropertyNode, kind: DeclKind) -> DeclId {
        let id = self.new_decl(kind, &property.name, owner, property.span);
        let decl = self.program.decl_mut(id);
        decl.attributes = property.attributes.clone();
        decl.syntax = DeclSyntax::Property {
            ty: property.ty.clone(),
            optional: property.optional,
        };
        self.attach_or_shadow(owner, &property.name, id);
        id
    }
}

// =============================================================================
// Validation
// =============================================================================

fn validate_tree(tree: &SyntaxTree) -> Result<()> {
    tree.statements
        .iter()
        .try_for_each(|s| validate_statement(tree.file, s))
}

fn validate_statement(file: FileId, statement: &Statement) -> Result<()> {
    match statement {
        Statement::Using { path, .. } => {
            if path.is_empty() || path.iter().any(String::is_empty) {
                return Err(Error::malformed_tree(file, "using statement with an empty path"));
            }
            Ok(())
        }
        Statement::Declaration(node) => validate_decl(file, node),
    }
}

fn validate_decl(file: FileId, node: &DeclNode) -> Result<()> {
    validate_decl_content(file, node).map_err(|err| {
        if node.span == Span::default() {
            err
        } else {
            err.at_span(node.span)
        }
    })
}

fn validate_decl_content(file: FileId, node: &DeclNode) -> Result<()> {
    if node.name.is_empty() {
        return Err(Error::malformed_tree(file, "declaration without a name"));
    }
    let named = |name: &str, what: &str| {
        if name.is_empty() {
            Err(Error::malformed_tree(
                file,
                format!("{what} without a name in '{}'", node.name),
            ))
        } else {
            Ok(())
        }
    };
    match &node.kind {
        DeclNodeKind::Namespace { statements } => {
            if node.name.split('.').any(str::is_empty) {
                return Err(Error::malformed_tree(
                    file,
                    format!("empty namespace path segment in '{}'", node.name),
                ));
            }
            statements
                .iter()
                .try_for_each(|s| validate_statement(file, s))
        }
        DeclNodeKind::Model {
            template_params,
            properties,
            ..
        } => {
            template_params
                .iter()
                .try_for_each(|p| named(&p.name, "template parameter"))?;
            properties.iter().try_for_each(|p| named(&p.name, "property"))
        }
        DeclNodeKind::Operation { parameters, .. } => {
            parameters.iter().try_for_each(|p| named(&p.name, "parameter"))
        }
        DeclNodeKind::Interface { operations } => operations.iter().try_for_each(|op| {
            if !matches!(op.kind, DeclNodeKind::Operation { .. }) {
                return Err(Error::malformed_tree(
                    file,
                    format!("interface '{}' contains a non-operation member", node.name),
                ));
            }
            validate_decl(file, op)
        }),
        DeclNodeKind::Enum { members } => members.iter().try_for_each(|m| named(&m.name, "member")),
        DeclNodeKind::Union { variants } => {
            variants.iter().try_for_each(|v| named(&v.name, "variant"))
        }
        DeclNodeKind::Scalar { .. } => Ok(()),
        DeclNodeKind::Alias {
            template_params, ..
        } => template_params
            .iter()
            .try_for_each(|p| named(&p.name, "template parameter")),
    }
}

// =============================================================================
// Name resolution
// =============================================================================

impl Program {
    /// Resolves an identifier from a scope.
    ///
    /// Order: names bound in the scope and each enclosing scope (template
    /// parameters, then namespace members), up to the global namespace; then
    /// namespaces imported by `using` in those scopes and in the scope's file;
    /// then library auto-imports. The first match wins.
    #[must_use]
    pub fn resolve_name(&self, name: &str, scope: DeclId) -> Option<Resolution> {
        for id in self.ancestors(scope) {
            let decl = self.decl(id);
            if let Some(ty) = decl.bindings.get(name) {
                return Some(Resolution::Type(*ty));
            }
            if decl.kind == DeclKind::Namespace {
                if let Some(member) = decl.members.get(name) {
                    return Some(Resolution::Decl(*member));
                }
            }
        }

        let file = self.decl(scope).file;
        let mut imported = self
            .ancestors(scope)
            .flat_map(|id| self.decl(id).usings.iter().copied())
            .chain(self.file_usings.get(&file).into_iter().flatten().copied())
            .chain(self.auto_usings.iter().copied());
        imported
            .find_map(|ns| self.member(ns, name))
            .map(Resolution::Decl)
    }
}
