//! The program: owner of the symbol graph, types, state, and diagnostics.
//!
//! Declarations live in one vector addressed by [`DeclId`]; parents and
//! members are handles, never ownership. Every pass threads `&mut Program`
//! explicitly. Once checking completes the program is frozen into a
//! [`FrozenProgram`], a cheap shareable read-only handle.

use std::collections::HashMap;
use std::fmt;
use std::ops::Deref;
use std::sync::Arc;

use indexmap::IndexMap;
use weft_foundation::{
    DeclId, Diagnostic, DiagnosticCollector, DiagnosticTarget, Error, FileId, Result, Span, TypeId,
};

use crate::attribute::AttributeApplication;
use crate::binder::PendingUsing;
use crate::options::CheckerOptions;
use crate::state::{StateKey, StateMap, StateValue};
use crate::syntax::{AttributeNode, TemplateParamNode, TypeExpr};
use crate::template::TemplateCache;
use crate::types::{Type, TypeArena};

// =============================================================================
// DeclKind
// =============================================================================

/// Kind of a declaration.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum DeclKind {
    /// `namespace`
    Namespace,
    /// `model`
    Model,
    /// A property of a model.
    ModelProperty,
    /// `op`
    Operation,
    /// A parameter of an operation.
    OperationParameter,
    /// `interface`
    Interface,
    /// `enum`
    Enum,
    /// A member of an enum.
    EnumMember,
    /// `union`
    Union,
    /// A named variant of a union.
    UnionVariant,
    /// `scalar`
    Scalar,
    /// `alias`
    Alias,
}

impl DeclKind {
    /// Returns the kind's display name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Namespace => "Namespace",
            Self::Model => "Model",
            Self::ModelProperty => "ModelProperty",
            Self::Operation => "Operation",
            Self::OperationParameter => "OperationParameter",
            Self::Interface => "Interface",
            Self::Enum => "Enum",
            Self::EnumMember => "EnumMember",
            Self::Union => "Union",
            Self::UnionVariant => "UnionVariant",
            Self::Scalar => "Scalar",
            Self::Alias => "Alias",
        }
    }

    /// Returns true if a declaration of this kind is accepted where
    /// `expected` is required. Operation parameters stand in for model
    /// properties.
    #[must_use]
    pub fn satisfies(self, expected: Self) -> bool {
        self == expected || (self == Self::OperationParameter && expected == Self::ModelProperty)
    }

    /// Returns true for kinds that carry a value type (properties and parameters).
    #[must_use]
    pub const fn is_property(self) -> bool {
        matches!(self, Self::ModelProperty | Self::OperationParameter)
    }
}

impl fmt::Display for DeclKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// =============================================================================
// Declaration
// =============================================================================

/// Kind-specific syntax kept on a declaration until its type is evaluated.
#[derive(Clone, Debug, PartialEq, Default)]
pub enum DeclSyntax {
    /// Nothing to evaluate (namespaces, interfaces, enums, members).
    #[default]
    None,
    /// Model heritage.
    Model {
        /// `is` source.
        is: Option<TypeExpr>,
        /// `extends` base.
        extends: Option<TypeExpr>,
        /// Closed flag.
        closed: bool,
    },
    /// Property or parameter type.
    Property {
        /// Declared type.
        ty: TypeExpr,
        /// Optional flag.
        optional: bool,
    },
    /// Operation return type.
    Operation {
        /// Declared return type.
        returns: TypeExpr,
    },
    /// Union variant type.
    Variant {
        /// Declared type.
        ty: TypeExpr,
    },
    /// Scalar base and bounds.
    Scalar {
        /// Base scalar.
        extends: Option<TypeExpr>,
        /// Lower bound.
        min: Option<f64>,
        /// Upper bound.
        max: Option<f64>,
    },
    /// Alias target.
    Alias {
        /// Aliased type.
        target: TypeExpr,
    },
}

/// A node of the symbol graph.
#[derive(Clone, Debug)]
pub struct Declaration {
    /// This declaration's handle.
    pub id: DeclId,
    /// Declaration kind.
    pub kind: DeclKind,
    /// Name; `None` for the global namespace and anonymous models.
    pub name: Option<String>,
    /// Enclosing scope.
    pub parent: Option<DeclId>,
    /// Named members in declaration order.
    pub members: IndexMap<String, DeclId>,
    /// Source span.
    pub span: Span,
    /// File the declaration was bound from.
    pub file: FileId,
    /// Attribute applications in source order (merged across namespace fragments).
    pub attributes: Vec<AttributeNode>,
    /// Template parameters; empty for non-templates and instances.
    pub template_params: Vec<TemplateParamNode>,
    /// Kind-specific syntax.
    pub syntax: DeclSyntax,
    /// Template and arguments this declaration instantiates.
    pub instance_of: Option<(DeclId, Vec<TypeId>)>,
    /// Names bound to types in this scope (template parameters and arguments).
    pub bindings: IndexMap<String, TypeId>,
    /// Lost a duplicate-name conflict; unreachable by lookup.
    pub shadowed: bool,
    /// Namespaces imported into this scope by `using`.
    pub usings: Vec<DeclId>,
}

impl Declaration {
    pub(crate) fn new(id: DeclId, kind: DeclKind, name: Option<String>, parent: Option<DeclId>) -> Self {
        Self {
            id,
            kind,
            name,
            parent,
            members: IndexMap::new(),
            span: Span::default(),
            file: FileId::default(),
            attributes: Vec::new(),
            template_params: Vec::new(),
            syntax: DeclSyntax::None,
            instance_of: None,
            bindings: IndexMap::new(),
            shadowed: false,
            usings: Vec::new(),
        }
    }

    /// Returns true for uninstantiated templates.
    #[must_use]
    pub fn is_template(&self) -> bool {
        !self.template_params.is_empty()
    }

    /// Returns the name, or `""` when anonymous.
    #[must_use]
    pub fn name_or_empty(&self) -> &str {
        self.name.as_deref().unwrap_or("")
    }

    /// Returns true if the declared property or parameter is optional.
    #[must_use]
    pub fn is_optional(&self) -> bool {
        matches!(self.syntax, DeclSyntax::Property { optional: true, .. })
    }
}

// =============================================================================
// Program
// =============================================================================

/// Everything one compilation produces.
#[derive(Debug)]
pub struct Program {
    pub(crate) decls: Vec<Declaration>,
    global: DeclId,
    pub(crate) file_usings: HashMap<FileId, Vec<DeclId>>,
    pub(crate) pending_usings: Vec<PendingUsing>,
    pub(crate) auto_usings: Vec<DeclId>,
    pub(crate) files: IndexMap<FileId, String>,
    pub(crate) types: TypeArena,
    pub(crate) decl_types: HashMap<DeclId, TypeId>,
    pub(crate) return_types: HashMap<DeclId, TypeId>,
    pub(crate) resolving: Vec<DeclId>,
    pub(crate) templates: TemplateCache,
    pub(crate) state: StateMap,
    pub(crate) applications: Vec<AttributeApplication>,
    pub(crate) diagnostics: DiagnosticCollector,
    options: CheckerOptions,
}

impl Program {
    /// Creates an empty program holding only the global namespace.
    #[must_use]
    pub fn new(options: CheckerOptions) -> Self {
        let global = DeclId::new(0);
        Self {
            decls: vec![Declaration::new(global, DeclKind::Namespace, None, None)],
            global,
            file_usings: HashMap::new(),
            pending_usings: Vec::new(),
            auto_usings: Vec::new(),
            files: IndexMap::new(),
            types: TypeArena::new(),
            decl_types: HashMap::new(),
            return_types: HashMap::new(),
            resolving: Vec::new(),
            templates: TemplateCache::new(),
            state: StateMap::new(),
            applications: Vec::new(),
            diagnostics: DiagnosticCollector::new(),
            options,
        }
    }

    // --- declarations -------------------------------------------------------

    /// Returns the global namespace.
    #[must_use]
    pub fn global(&self) -> DeclId {
        self.global
    }

    /// Returns a declaration.
    ///
    /// # Panics
    ///
    /// Panics if the handle does not come from this program.
    #[must_use]
    pub fn decl(&self, id: DeclId) -> &Declaration {
        &self.decls[id.index()]
    }

    /// Returns a declaration, or an error for a foreign handle.
    pub fn try_decl(&self, id: DeclId) -> Result<&Declaration> {
        self.decls
            .get(id.index())
            .ok_or_else(|| Error::unknown_declaration(id))
    }

    pub(crate) fn decl_mut(&mut self, id: DeclId) -> &mut Declaration {
        &mut self.decls[id.index()]
    }

    /// Iterates all declarations in creation order.
    pub fn decls(&self) -> impl Iterator<Item = &Declaration> {
        self.decls.iter()
    }

    /// Returns the number of declarations.
    #[must_use]
    pub fn decl_count(&self) -> usize {
        self.decls.len()
    }

    /// Allocates a declaration without attaching it to a scope.
    pub(crate) fn alloc_decl(
        &mut self,
        kind: DeclKind,
        name: Option<String>,
        parent: Option<DeclId>,
    ) -> DeclId {
        let id = DeclId::from_len(self.decls.len());
        self.decls.push(Declaration::new(id, kind, name, parent));
        id
    }

    /// Attaches a named declaration to its parent's members.
    ///
    /// Returns the existing member if the name is already taken.
    pub(crate) fn attach(&mut self, parent: DeclId, name: &str, id: DeclId) -> Option<DeclId> {
        let members = &mut self.decl_mut(parent).members;
        if let Some(existing) = members.get(name) {
            return Some(*existing);
        }
        members.insert(name.to_string(), id);
        None
    }

    /// Returns a named member of a declaration.
    #[must_use]
    pub fn member(&self, decl: DeclId, name: &str) -> Option<DeclId> {
        self.decl(decl).members.get(name).copied()
    }

    /// Looks up a declaration by dotted path from the global namespace.
    #[must_use]
    pub fn lookup(&self, qualified: &str) -> Option<DeclId> {
        if qualified.is_empty() {
            return Some(self.global);
        }
        qualified
            .split('.')
            .try_fold(self.global, |scope, segment| self.member(scope, segment))
    }

    /// Returns the dotted name of a declaration from the global namespace.
    #[must_use]
    pub fn qualified_name(&self, id: DeclId) -> String {
        if id != self.global && self.decl(id).name.is_none() {
            return String::from("(anonymous)");
        }
        let mut segments: Vec<&str> = self
            .ancestors(id)
            .filter_map(|d| self.decl(d).name.as_deref())
            .collect();
        segments.reverse();
        segments.join(".")
    }

    /// Returns true if the declaration or an ancestor lost a duplicate conflict.
    #[must_use]
    pub fn is_shadowed(&self, id: DeclId) -> bool {
        self.ancestors(id).any(|d| self.decl(d).shadowed)
    }

    /// Returns true if the declaration sits inside an uninstantiated template,
    /// or inside an instance whose arguments are still template parameters.
    #[must_use]
    pub fn in_template(&self, id: DeclId) -> bool {
        self.ancestors(id).any(|d| {
            let decl = self.decl(d);
            decl.is_template()
                || decl.instance_of.as_ref().is_some_and(|(_, args)| {
                    args.iter()
                        .any(|a| matches!(self.types.get(*a), Type::TemplateParameter { .. }))
                })
        })
    }

    /// Returns the source path of a bound file.
    #[must_use]
    pub fn file_path(&self, file: FileId) -> Option<&str> {
        self.files.get(&file).map(String::as_str)
    }

    // --- types --------------------------------------------------------------

    /// Returns the type arena.
    #[must_use]
    pub fn types(&self) -> &TypeArena {
        &self.types
    }

    /// Returns the evaluated type of a declaration, if it has been evaluated.
    #[must_use]
    pub fn type_of(&self, decl: DeclId) -> Option<TypeId> {
        self.decl_types.get(&decl).copied()
    }

    /// Returns the evaluated return type of an operation.
    #[must_use]
    pub fn return_type(&self, operation: DeclId) -> Option<TypeId> {
        self.return_types.get(&operation).copied()
    }

    /// Returns the template instantiation cache.
    #[must_use]
    pub fn templates(&self) -> &TemplateCache {
        &self.templates
    }

    /// Renders a type for messages.
    #[must_use]
    pub fn render_type(&self, id: TypeId) -> String {
        match self.types.get(id) {
            Type::Error => String::from("<error>"),
            Type::Unknown => String::from("unknown"),
            Type::Void => String::from("void"),
            Type::Never => String::from("never"),
            Type::AnyModel => String::from("Record<unknown>"),
            Type::Pending => String::from("<pending>"),
            Type::Scalar(scalar) => scalar.name.clone(),
            Type::Literal(value) => value.to_string(),
            Type::Model(model) => match (&model.name, model.decl) {
                (Some(_), Some(decl)) => self.qualified_name(decl),
                (Some(name), None) => name.clone(),
                _ => {
                    let props: Vec<String> = model
                        .properties
                        .iter()
                        .map(|(name, prop)| {
                            let mark = if prop.optional { "?" } else { "" };
                            format!("{name}{mark}: {}", self.render_type(prop.ty))
                        })
                        .collect();
                    format!("{{ {} }}", props.join(", "))
                }
            },
            Type::Union {
                decl: Some(decl), ..
            } => self.qualified_name(*decl),
            Type::Union { variants, .. } => variants
                .iter()
                .map(|v| self.render_type(*v))
                .collect::<Vec<_>>()
                .join(" | "),
            Type::Tuple(items) => format!(
                "[{}]",
                items
                    .iter()
                    .map(|v| self.render_type(*v))
                    .collect::<Vec<_>>()
                    .join(", ")
            ),
            Type::Array(element) => format!("{}[]", self.render_type(*element)),
            Type::Enum { decl } | Type::Declaration { decl, .. } => self.qualified_name(*decl),
            Type::EnumMember { owner, name, .. } => {
                format!("{}.{name}", self.qualified_name(*owner))
            }
            Type::TemplateParameter { name, .. } => name.clone(),
            Type::Instantiated { template, args, .. } => format!(
                "{}<{}>",
                self.qualified_name(*template),
                args.iter()
                    .map(|a| self.render_type(*a))
                    .collect::<Vec<_>>()
                    .join(", ")
            ),
        }
    }

    // --- state --------------------------------------------------------------

    /// Returns the effective state.
    #[must_use]
    pub fn state(&self) -> &StateMap {
        &self.state
    }

    /// Returns a state value recorded directly on a declaration.
    #[must_use]
    pub fn state_of(&self, decl: DeclId, key: StateKey) -> Option<&StateValue> {
        self.state.get(decl, key)
    }

    /// Records a state value on a declaration.
    pub fn set_state(&mut self, decl: DeclId, key: StateKey, value: StateValue) {
        self.state.set(decl, key, value);
    }

    /// Appends to a list-valued state entry.
    pub fn push_state(&mut self, decl: DeclId, key: StateKey, value: StateValue) {
        self.state.push(decl, key, value);
    }

    /// Returns every attribute application that ran, in application order.
    #[must_use]
    pub fn applications(&self) -> &[AttributeApplication] {
        &self.applications
    }

    // --- diagnostics --------------------------------------------------------

    /// Returns the diagnostic collector.
    #[must_use]
    pub fn diagnostics(&self) -> &DiagnosticCollector {
        &self.diagnostics
    }

    /// Reports a diagnostic.
    pub fn report(&mut self, diagnostic: Diagnostic) -> bool {
        self.diagnostics.report(diagnostic)
    }

    /// Reports an error diagnostic.
    pub fn error(&mut self, code: &str, target: impl Into<DiagnosticTarget>, message: impl Into<String>) {
        self.report(Diagnostic::error(code, target, message));
    }

    /// Returns true if any error was reported.
    #[must_use]
    pub fn has_error(&self) -> bool {
        self.diagnostics.has_error()
    }

    /// Returns true if emitters should run: no errors, or the host overrides.
    #[must_use]
    pub fn should_emit(&self, override_errors: bool) -> bool {
        override_errors || !self.has_error()
    }

    /// Returns the options this program was checked with.
    #[must_use]
    pub fn options(&self) -> &CheckerOptions {
        &self.options
    }

    pub(crate) fn promote_warnings(&mut self) {
        self.diagnostics.promote_warnings();
    }

    /// Freezes the program for read-only sharing.
    #[must_use]
    pub fn freeze(self) -> FrozenProgram {
        FrozenProgram(Arc::new(self))
    }
}

// =============================================================================
// FrozenProgram
// =============================================================================

/// A checked program, shareable across threads and never mutated again.
#[derive(Clone, Debug)]
pub struct FrozenProgram(Arc<Program>);

impl Deref for FrozenProgram {
    type Target = Program;

    fn deref(&self) -> &Program {
        &self.0
    }
}
