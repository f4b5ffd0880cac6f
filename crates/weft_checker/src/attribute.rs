//! Attribute registry and application engine.
//!
//! An attribute is a signature (accepted target kinds and typed parameters)
//! plus a behavior. Applying one never fails hard: each validation step that
//! fails reports one diagnostic and stops, and errors or panics escaping the
//! behavior are converted to `internal-error`.

use std::any::Any;
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use indexmap::IndexMap;
use tracing::{debug, trace, warn};
use weft_foundation::{DeclId, Diagnostic, Error, ErrorKind, Result, Span, TypeId, codes};

use crate::program::{DeclKind, Declaration, Program};
use crate::state::{StateKey, StateValue};
use crate::syntax::{AttributeNode, TypeExpr};
use crate::value::ArgValue;

// =============================================================================
// Signatures
// =============================================================================

/// Declaration kinds an attribute accepts. Empty means any kind.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TargetKinds(Vec<DeclKind>);

impl TargetKinds {
    /// Accepts every declaration kind.
    #[must_use]
    pub fn any() -> Self {
        Self::default()
    }

    /// Accepts the listed kinds.
    #[must_use]
    pub fn of(kinds: &[DeclKind]) -> Self {
        Self(kinds.to_vec())
    }

    /// Returns true if a declaration of `kind` is accepted.
    #[must_use]
    pub fn accepts(&self, kind: DeclKind) -> bool {
        self.0.is_empty() || self.0.iter().any(|expected| kind.satisfies(*expected))
    }
}

impl fmt::Display for TargetKinds {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            return f.write_str("any declaration");
        }
        let names: Vec<&str> = self.0.iter().map(|k| k.name()).collect();
        f.write_str(&names.join(" | "))
    }
}

/// One declared parameter.
#[derive(Clone, Debug, PartialEq)]
pub struct ParamSignature {
    /// Parameter name.
    pub name: String,
    /// Declared type, resolved when checking starts.
    pub ty: TypeExpr,
    /// May be omitted.
    pub optional: bool,
    /// Absorbs any number of trailing arguments.
    pub variadic: bool,
}

impl ParamSignature {
    /// A required parameter.
    #[must_use]
    pub fn required(name: impl Into<String>, ty: TypeExpr) -> Self {
        Self {
            name: name.into(),
            ty,
            optional: false,
            variadic: false,
        }
    }

    /// An optional parameter.
    #[must_use]
    pub fn optional(name: impl Into<String>, ty: TypeExpr) -> Self {
        Self {
            optional: true,
            ..Self::required(name, ty)
        }
    }

    /// A variadic rest parameter.
    #[must_use]
    pub fn variadic(name: impl Into<String>, ty: TypeExpr) -> Self {
        Self {
            variadic: true,
            ..Self::required(name, ty)
        }
    }
}

/// Target constraint and parameter list of an attribute.
#[derive(Clone, Debug, PartialEq)]
pub struct AttributeSignature {
    /// Identifier, without `@`.
    pub name: String,
    /// Accepted targets.
    pub targets: TargetKinds,
    /// Parameters in order.
    pub params: Vec<ParamSignature>,
}

impl AttributeSignature {
    /// Creates a signature with no parameters.
    #[must_use]
    pub fn new(name: impl Into<String>, targets: TargetKinds) -> Self {
        Self {
            name: name.into(),
            targets,
            params: Vec::new(),
        }
    }

    /// Appends a parameter.
    #[must_use]
    pub fn with_param(mut self, param: ParamSignature) -> Self {
        self.params.push(param);
        self
    }

    /// Minimum number of arguments.
    #[must_use]
    pub fn min_args(&self) -> usize {
        self.params
            .iter()
            .filter(|p| !p.optional && !p.variadic)
            .count()
    }

    /// Maximum number of arguments; `None` when variadic.
    #[must_use]
    pub fn max_args(&self) -> Option<usize> {
        if self.params.iter().any(|p| p.variadic) {
            None
        } else {
            Some(self.params.len())
        }
    }

    fn count_message(&self, actual: usize) -> String {
        let min = self.min_args();
        match self.max_args() {
            Some(max) if max == min => format!("Expected {min} arguments, but got {actual}."),
            Some(max) => format!("Expected {min}-{max} arguments, but got {actual}."),
            None => format!("Expected at least {min} arguments, but got {actual}."),
        }
    }
}

/// What happens when one attribute is applied to one declaration twice.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum DuplicatePolicy {
    /// Every application contributes (e.g. a list of servers).
    Accumulate,
    /// The last application wins silently.
    #[default]
    LastWins,
    /// The last application wins, with a `duplicate-attribute` warning.
    Warn,
}

// =============================================================================
// Behaviors
// =============================================================================

/// Logic run when an attribute is applied.
pub trait AttributeBehavior: Send + Sync {
    /// Applies the attribute; arguments have already been validated.
    fn apply(&self, ctx: &mut AttributeContext<'_>, args: &[ArgValue]) -> Result<()>;
}

impl<F> AttributeBehavior for F
where
    F: Fn(&mut AttributeContext<'_>, &[ArgValue]) -> Result<()> + Send + Sync,
{
    fn apply(&self, ctx: &mut AttributeContext<'_>, args: &[ArgValue]) -> Result<()> {
        self(ctx, args)
    }
}

/// A registered attribute.
#[derive(Clone)]
pub struct AttributeDefinition {
    /// Signature.
    pub signature: AttributeSignature,
    /// Same-declaration duplicate handling.
    pub policy: DuplicatePolicy,
    /// Namespace the parameter types are resolved in; `""` is global.
    pub scope: String,
    behavior: Arc<dyn AttributeBehavior>,
}

impl AttributeDefinition {
    /// Creates a definition resolving parameter types globally.
    #[must_use]
    pub fn new(signature: AttributeSignature, behavior: impl AttributeBehavior + 'static) -> Self {
        Self {
            signature,
            policy: DuplicatePolicy::default(),
            scope: String::new(),
            behavior: Arc::new(behavior),
        }
    }

    /// Sets the duplicate policy.
    #[must_use]
    pub fn with_policy(mut self, policy: DuplicatePolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Resolves parameter types in the given namespace.
    #[must_use]
    pub fn in_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.scope = namespace.into();
        self
    }

    /// Returns the identifier.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.signature.name
    }
}

impl fmt::Debug for AttributeDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AttributeDefinition")
            .field("signature", &self.signature)
            .field("policy", &self.policy)
            .field("scope", &self.scope)
            .finish_non_exhaustive()
    }
}

// =============================================================================
// AttributeRegistry
// =============================================================================

/// Attribute definitions by identifier, in registration order.
#[derive(Clone, Debug, Default)]
pub struct AttributeRegistry {
    definitions: IndexMap<String, AttributeDefinition>,
}

impl AttributeRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a definition.
    ///
    /// # Errors
    ///
    /// Fails if the identifier is already registered.
    pub fn register(&mut self, definition: AttributeDefinition) -> Result<()> {
        let name = definition.name().to_string();
        if self.definitions.contains_key(&name) {
            return Err(Error::internal(format!("attribute @{name} registered twice")));
        }
        self.definitions.insert(name, definition);
        Ok(())
    }

    /// Looks up a definition.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&AttributeDefinition> {
        self.definitions.get(name)
    }

    /// Returns true if the identifier is registered.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.definitions.contains_key(name)
    }

    /// Iterates definitions in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &AttributeDefinition> {
        self.definitions.values()
    }

    /// Returns the number of definitions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    /// Returns true if empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }
}

// =============================================================================
// Applications and context
// =============================================================================

/// One attribute applied to one declaration with evaluated arguments.
#[derive(Clone, Debug, PartialEq)]
pub struct AttributeApplication {
    /// Attribute identifier.
    pub name: String,
    /// Target declaration.
    pub target: DeclId,
    /// Evaluated arguments in order.
    pub args: Vec<ArgValue>,
    /// Source span.
    pub span: Span,
}

/// What a behavior sees: the program, the target, and the application.
pub struct AttributeContext<'a> {
    program: &'a mut Program,
    application: &'a AttributeApplication,
}

impl AttributeContext<'_> {
    /// Returns the target declaration handle.
    #[must_use]
    pub fn target(&self) -> DeclId {
        self.application.target
    }

    /// Returns the target declaration.
    #[must_use]
    pub fn target_decl(&self) -> &Declaration {
        self.program.decl(self.application.target)
    }

    /// Returns the attribute identifier.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.application.name
    }

    /// Returns the application span.
    #[must_use]
    pub fn span(&self) -> Span {
        self.application.span
    }

    /// Returns the program.
    #[must_use]
    pub fn program(&self) -> &Program {
        self.program
    }

    /// Returns the program for type queries that evaluate lazily.
    pub fn program_mut(&mut self) -> &mut Program {
        self.program
    }

    /// Returns the type of the target declaration.
    pub fn target_type(&mut self) -> TypeId {
        self.program.type_of_decl(self.application.target)
    }

    /// Reports a diagnostic.
    pub fn report(&mut self, diagnostic: Diagnostic) {
        self.program.report(diagnostic);
    }

    /// Reports an error against the target declaration.
    pub fn error(&mut self, code: &str, message: impl Into<String>) {
        let target = self.application.target;
        self.program.error(code, target, message);
    }

    /// Records state on the target.
    pub fn set_state(&mut self, key: StateKey, value: StateValue) {
        self.program.set_state(self.application.target, key, value);
    }

    /// Appends to list state on the target.
    pub fn push_state(&mut self, key: StateKey, value: StateValue) {
        self.program.push_state(self.application.target, key, value);
    }

    /// Returns state recorded on the target.
    #[must_use]
    pub fn state(&self, key: StateKey) -> Option<&StateValue> {
        self.program.state_of(self.application.target, key)
    }
}

// =============================================================================
// AttributeEngine
// =============================================================================

/// Validates and runs attribute applications against one program.
#[derive(Debug)]
pub struct AttributeEngine<'r> {
    registry: &'r AttributeRegistry,
    param_types: HashMap<String, Vec<TypeId>>,
    applied: HashSet<(DeclId, String)>,
}

impl<'r> AttributeEngine<'r> {
    /// Creates an engine, resolving every parameter type once.
    pub fn new(registry: &'r AttributeRegistry, program: &mut Program) -> Self {
        let mut param_types = HashMap::new();
        for definition in registry.iter() {
            let scope = program
                .lookup(&definition.scope)
                .unwrap_or_else(|| program.global());
            let types = definition
                .signature
                .params
                .iter()
                .map(|p| program.eval_type(&p.ty, scope))
                .collect();
            param_types.insert(definition.name().to_string(), types);
        }
        debug!(attributes = registry.len(), "resolved attribute signatures");
        Self {
            registry,
            param_types,
            applied: HashSet::new(),
        }
    }

    fn param_type(&self, definition: &AttributeDefinition, index: usize) -> Option<TypeId> {
        let types = self.param_types.get(definition.name())?;
        let params = &definition.signature.params;
        match params.get(index) {
            Some(_) => types.get(index).copied(),
            None if params.last().is_some_and(|p| p.variadic) => types.last().copied(),
            None => None,
        }
    }

    /// Evaluates an attribute node's arguments in the target's scope and applies it.
    pub fn apply_node(&mut self, program: &mut Program, target: DeclId, node: &AttributeNode) -> bool {
        if !self.registry.contains(&node.name) {
            program.error(
                codes::UNKNOWN_ATTRIBUTE,
                target,
                format!("Unknown decorator @{}", node.name),
            );
            return false;
        }
        let args = node
            .args
            .iter()
            .map(|arg| program.eval_value(arg, target))
            .collect();
        self.apply(
            program,
            AttributeApplication {
                name: node.name.clone(),
                target,
                args,
                span: node.span,
            },
        )
    }

    /// Validates and runs one application. Returns true if the behavior ran
    /// to completion.
    pub fn apply(&mut self, program: &mut Program, application: AttributeApplication) -> bool {
        let target = application.target;
        let registry = self.registry;
        let Some(definition) = registry.get(&application.name) else {
            program.error(
                codes::UNKNOWN_ATTRIBUTE,
                target,
                format!("Unknown decorator @{}", application.name),
            );
            return false;
        };
        let signature = &definition.signature;

        let kind = program.decl(target).kind;
        if !signature.targets.accepts(kind) {
            let message = format!(
                "Cannot apply @{} decorator to {} since it is not assignable to {}",
                signature.name,
                program.qualified_name(target),
                signature.targets
            );
            program.error(codes::DECORATOR_WRONG_TARGET, target, message);
            return false;
        }

        let count = application.args.len();
        if count < signature.min_args() || signature.max_args().is_some_and(|max| count > max) {
            program.error(
                codes::INVALID_ARGUMENT_COUNT,
                target,
                signature.count_message(count),
            );
            return false;
        }

        let mut valid = true;
        for (index, arg) in application.args.iter().enumerate() {
            let Some(expected) = self.param_type(definition, index) else {
                continue;
            };
            let actual = program.value_type(arg);
            if !program.is_assignable(actual, expected) {
                let message = format!(
                    "Argument of type '{}' is not assignable to parameter of type '{}'",
                    arg.render(program),
                    program.render_type(expected)
                );
                program.error(codes::INVALID_ARGUMENT, target, message);
                valid = false;
            }
        }
        if !valid {
            return false;
        }

        if !self.applied.insert((target, application.name.clone()))
            && definition.policy == DuplicatePolicy::Warn
        {
            program.report(Diagnostic::warning(
                codes::DUPLICATE_ATTRIBUTE,
                target,
                format!("@{} is applied more than once", application.name),
            ));
        }

        trace!(attribute = %application.name, target = ?target, "applying attribute");
        let behavior = Arc::clone(&definition.behavior);
        let outcome = {
            let mut ctx = AttributeContext {
                program: &mut *program,
                application: &application,
            };
            panic::catch_unwind(AssertUnwindSafe(|| {
                behavior.apply(&mut ctx, &application.args)
            }))
        };

        let fault = match outcome {
            Ok(Ok(())) => {
                program.applications.push(application);
                return true;
            }
            Ok(Err(err)) => match err.kind {
                ErrorKind::AttributeFault { .. } => err,
                _ => Error::attribute_fault(&application.name, err.to_string()),
            },
            Err(payload) => Error::attribute_fault(&application.name, panic_message(&*payload)),
        };
        warn!(attribute = %application.name, error = %fault, "attribute behavior faulted");
        program.error(codes::INTERNAL_ERROR, target, fault.to_string());
        false
    }
}

pub(crate) fn panic_message(payload: &(dyn Any + Send)) -> String {
    payload
        .downcast_ref::<&str>()
        .map(|s| (*s).to_string())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| String::from("behavior panicked"))
}
