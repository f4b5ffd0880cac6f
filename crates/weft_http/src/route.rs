//! Verbs, `@route`, `@sharedRoute`, and route uniqueness.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use std::fmt;

use indexmap::IndexMap;
use tracing::debug;
use weft_checker::attribute::DuplicatePolicy;
use weft_checker::program::{DeclKind, Program};
use weft_checker::syntax::TypeExpr;
use weft_checker::{
    ArgValue, AttributeContext, AttributeDefinition, AttributeSignature, Library, ParamSignature,
    ProgramValidator, StateKey, StateValue, TargetKinds,
};
use weft_foundation::{DeclId, Diagnostic, Error, Result, codes};

use crate::define;
use crate::metadata::{is_body, is_body_root};

/// Explicit verb of an operation.
pub const VERB: StateKey = StateKey::new("http.verb");
/// `@patch` options.
pub const PATCH_OPTIONS: StateKey = StateKey::new("http.patchOptions");
/// Route segment of a namespace, interface, or operation.
pub const ROUTE: StateKey = StateKey::new("http.route");
/// `@sharedRoute` flag.
pub const SHARED_ROUTE: StateKey = StateKey::new("http.sharedRoute");

/// HTTP method.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum HttpVerb {
    /// `GET`
    Get,
    /// `PUT`
    Put,
    /// `POST`
    Post,
    /// `PATCH`
    Patch,
    /// `DELETE`
    Delete,
    /// `HEAD`
    Head,
}

impl HttpVerb {
    /// Every verb, in attribute order.
    pub const ALL: [Self; 6] = [
        Self::Get,
        Self::Put,
        Self::Post,
        Self::Patch,
        Self::Delete,
        Self::Head,
    ];

    /// Lowercase name, which is also the attribute name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Get => "get",
            Self::Put => "put",
            Self::Post => "post",
            Self::Patch => "patch",
            Self::Delete => "delete",
            Self::Head => "head",
        }
    }

    /// Parses a lowercase verb name.
    #[must_use]
    pub fn parse(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|v| v.as_str() == name)
    }
}

impl fmt::Display for HttpVerb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// Behaviors
// =============================================================================

fn set_verb(ctx: &mut AttributeContext<'_>, verb: HttpVerb) {
    let previous = ctx.state(VERB).and_then(StateValue::as_str).and_then(HttpVerb::parse);
    if previous.is_some_and(|p| p != verb) {
        let target = ctx.target();
        let name = ctx.program().qualified_name(target);
        ctx.report(Diagnostic::warning(
            codes::DUPLICATE_ATTRIBUTE,
            target,
            format!("HTTP verb already applied to {name}"),
        ));
    }
    ctx.set_state(VERB, StateValue::String(verb.as_str().to_string()));
}

fn verb_attribute(verb: HttpVerb) -> AttributeDefinition {
    let signature = AttributeSignature::new(verb.as_str(), TargetKinds::of(&[DeclKind::Operation]));
    let definition = if verb == HttpVerb::Patch {
        define(
            signature.with_param(ParamSignature::optional(
                "options",
                TypeExpr::reference("PatchOptions"),
            )),
            |ctx: &mut AttributeContext<'_>, args: &[ArgValue]| -> Result<()> {
                set_verb(ctx, HttpVerb::Patch);
                if let Some(value) = args
                    .first()
                    .and_then(ArgValue::as_record)
                    .and_then(|fields| fields.get("implicitOptionality"))
                    .and_then(ArgValue::as_bool)
                {
                    let mut fields = IndexMap::new();
                    fields.insert("implicitOptionality".to_string(), StateValue::Bool(value));
                    ctx.set_state(PATCH_OPTIONS, StateValue::Record(fields));
                }
                Ok(())
            },
        )
    } else {
        define(
            signature,
            move |ctx: &mut AttributeContext<'_>, _: &[ArgValue]| -> Result<()> {
                set_verb(ctx, verb);
                Ok(())
            },
        )
    };
    definition.with_policy(DuplicatePolicy::Warn)
}

fn apply_route(ctx: &mut AttributeContext<'_>, args: &[ArgValue]) -> Result<()> {
    let path = args
        .first()
        .and_then(ArgValue::as_str)
        .ok_or_else(|| Error::unexpected_value("route path", "missing argument"))?;
    ctx.set_state(ROUTE, StateValue::String(path.to_string()));
    Ok(())
}

pub(crate) fn register(library: Library) -> Library {
    let library = HttpVerb::ALL
        .into_iter()
        .fold(library, |library, verb| library.with_attribute(verb_attribute(verb)));
    library
        .with_attribute(define(
            AttributeSignature::new(
                "route",
                TargetKinds::of(&[DeclKind::Namespace, DeclKind::Interface, DeclKind::Operation]),
            )
            .with_param(ParamSignature::required("path", TypeExpr::reference("string"))),
            apply_route,
        ))
        .with_attribute(define(
            AttributeSignature::new("sharedRoute", TargetKinds::of(&[DeclKind::Operation])),
            |ctx: &mut AttributeContext<'_>, _: &[ArgValue]| -> Result<()> {
                ctx.set_state(SHARED_ROUTE, StateValue::Bool(true));
                Ok(())
            },
        ))
        .with_validator(RouteValidator)
}

// =============================================================================
// Accessors
// =============================================================================

/// Returns the verb set explicitly on an operation.
#[must_use]
pub fn explicit_verb(program: &Program, op: DeclId) -> Option<HttpVerb> {
    program
        .state_of(op, VERB)
        .and_then(StateValue::as_str)
        .and_then(HttpVerb::parse)
}

/// Returns the operation's verb: the explicit one, else `post` when a
/// parameter is the body, else `get`.
#[must_use]
pub fn verb(program: &Program, op: DeclId) -> HttpVerb {
    if let Some(verb) = explicit_verb(program, op) {
        return verb;
    }
    let has_body = program
        .decl(op)
        .members
        .values()
        .any(|&param| is_body(program, param) || is_body_root(program, param));
    if has_body { HttpVerb::Post } else { HttpVerb::Get }
}

/// Returns `implicitOptionality` from `@patch` options.
#[must_use]
pub fn implicit_optionality(program: &Program, op: DeclId) -> bool {
    program
        .state_of(op, PATCH_OPTIONS)
        .and_then(StateValue::as_record)
        .and_then(|fields| fields.get("implicitOptionality"))
        .and_then(StateValue::as_bool)
        .unwrap_or(false)
}

/// Returns true if the operation is marked `@sharedRoute`.
#[must_use]
pub fn is_shared_route(program: &Program, op: DeclId) -> bool {
    program.state_of(op, SHARED_ROUTE).is_some()
}

/// Returns the route segment set directly on a declaration.
#[must_use]
pub fn route_segment(program: &Program, decl: DeclId) -> Option<&str> {
    program.state_of(decl, ROUTE).and_then(StateValue::as_str)
}

/// Returns true if the declaration or any enclosing scope has a route segment.
#[must_use]
pub fn has_route(program: &Program, decl: DeclId) -> bool {
    program
        .ancestors(decl)
        .any(|scope| route_segment(program, scope).is_some())
}

/// Joins route segments with single slashes. Segments opening with `{/`
/// or `{?` are path or query expansions and attach without a slash.
#[must_use]
pub fn join_route<'a>(segments: impl IntoIterator<Item = &'a str>) -> String {
    let mut path = String::new();
    for segment in segments {
        if segment.starts_with("{/") || segment.starts_with("{?") {
            path.push_str(segment);
            continue;
        }
        let trimmed = segment.trim_matches('/');
        if trimmed.is_empty() {
            continue;
        }
        if !path.ends_with('/') {
            path.push('/');
        }
        path.push_str(trimmed);
    }
    if !path.starts_with('/') {
        path.insert(0, '/');
    }
    path
}

/// Returns the full route of a declaration: every enclosing segment from the
/// outermost scope inward.
#[must_use]
pub fn route_path(program: &Program, decl: DeclId) -> String {
    let mut segments: Vec<&str> = program
        .ancestors(decl)
        .filter_map(|scope| route_segment(program, scope))
        .collect();
    segments.reverse();
    join_route(segments)
}

// =============================================================================
// Validation
// =============================================================================

/// Reports operations that share a verb and path.
#[derive(Clone, Copy, Debug, Default)]
pub struct RouteValidator;

impl RouteValidator {
    fn groups(program: &Program) -> IndexMap<String, Vec<DeclId>> {
        let mut groups: IndexMap<String, Vec<DeclId>> = IndexMap::new();
        for decl in program.decls() {
            if decl.kind != DeclKind::Operation
                || decl.shadowed
                || decl.is_template()
                || program.in_template(decl.id)
                || !has_route(program, decl.id)
            {
                continue;
            }
            let key = format!("{} {}", verb(program, decl.id), route_path(program, decl.id));
            groups.entry(key).or_default().push(decl.id);
        }
        groups
    }
}

impl ProgramValidator for RouteValidator {
    fn name(&self) -> &str {
        "http-routes"
    }

    fn validate(&self, program: &mut Program) -> Result<()> {
        let groups = Self::groups(program);
        debug!(routes = groups.len(), "validating routes");
        for (route, ops) in groups {
            if ops.len() < 2 {
                continue;
            }
            let shared = ops.iter().filter(|&&op| is_shared_route(program, op)).count();
            if shared == ops.len() {
                continue;
            }
            for op in ops {
                if shared == 0 {
                    let name = program.decl(op).name_or_empty().to_string();
                    program.error(
                        codes::DUPLICATE_OPERATION,
                        op,
                        format!("Duplicate operation \"{name}\" routed at \"{route}\"."),
                    );
                } else {
                    program.error(
                        codes::SHARED_INCONSISTENCY,
                        op,
                        format!(
                            "Each operation routed at \"{route}\" needs to have the @sharedRoute decorator."
                        ),
                    );
                }
            }
        }
        Ok(())
    }
}
