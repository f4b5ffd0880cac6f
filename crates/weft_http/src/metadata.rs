//! Parameter location and body attributes.
//!
//! `@header`, `@cookie`, `@query`, and `@path` take an optional name or
//! options record. Without an explicit name, each derives one from the
//! property name: headers use kebab-case, cookies snake_case, query and path
//! parameters keep the name unchanged.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use indexmap::IndexMap;
use weft_checker::attribute::DuplicatePolicy;
use weft_checker::program::{DeclKind, Program};
use weft_checker::syntax::TypeExpr;
use weft_checker::{
    ArgValue, AttributeContext, AttributeSignature, Library, ParamSignature, StateKey, StateValue,
    TargetKinds,
};
use weft_foundation::{DeclId, Error, Result};

use crate::case::parse_case;
use crate::define;

/// `@header` options.
pub const HEADER: StateKey = StateKey::new("http.header");
/// `@cookie` options.
pub const COOKIE: StateKey = StateKey::new("http.cookie");
/// `@query` options.
pub const QUERY: StateKey = StateKey::new("http.query");
/// `@path` options.
pub const PATH: StateKey = StateKey::new("http.path");
/// `@body` flag.
pub const BODY: StateKey = StateKey::new("http.body");
/// `@bodyRoot` flag.
pub const BODY_ROOT: StateKey = StateKey::new("http.bodyRoot");
/// `@bodyIgnore` flag.
pub const BODY_IGNORE: StateKey = StateKey::new("http.bodyIgnore");

// =============================================================================
// Options
// =============================================================================

/// Resolved `@header` options.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct HeaderFieldOptions {
    /// Header name.
    pub name: String,
    /// Explode arrays into repeated headers.
    pub explode: Option<bool>,
}

/// Resolved `@cookie` options.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct CookieParamOptions {
    /// Cookie name.
    pub name: String,
}

/// Resolved `@query` options.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct QueryParamOptions {
    /// Query parameter name.
    pub name: String,
    /// Explode arrays into repeated parameters.
    pub explode: Option<bool>,
}

/// Resolved `@path` options.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PathParamOptions {
    /// Path parameter name.
    pub name: String,
    /// Explode expansion.
    pub explode: bool,
    /// Allow reserved characters unencoded.
    pub allow_reserved: bool,
    /// Expansion style.
    pub style: String,
}

/// The `nameOrOptions` argument, if given.
struct NameOrOptions<'a> {
    name: Option<&'a str>,
    fields: Option<&'a IndexMap<String, ArgValue>>,
}

impl<'a> NameOrOptions<'a> {
    fn parse(arg: Option<&'a ArgValue>) -> Result<Self> {
        match arg {
            None => Ok(Self {
                name: None,
                fields: None,
            }),
            Some(ArgValue::String(name)) => Ok(Self {
                name: Some(name),
                fields: None,
            }),
            Some(ArgValue::Record(fields)) => Ok(Self {
                name: fields.get("name").and_then(ArgValue::as_str),
                fields: Some(fields),
            }),
            Some(_) => Err(Error::unexpected_value("name or options record", "other value")),
        }
    }

    fn flag(&self, key: &str) -> Option<bool> {
        self.fields?.get(key).and_then(ArgValue::as_bool)
    }

    fn text(&self, key: &str) -> Option<&'a str> {
        self.fields?.get(key).and_then(ArgValue::as_str)
    }

    fn name_or(&self, ctx: &AttributeContext<'_>, derive: impl FnOnce(&str) -> String) -> String {
        self.name
            .map_or_else(|| derive(ctx.target_decl().name_or_empty()), str::to_string)
    }
}

fn record(kind: &str, name: String) -> IndexMap<String, StateValue> {
    let mut fields = IndexMap::new();
    fields.insert("type".to_string(), StateValue::String(kind.to_string()));
    fields.insert("name".to_string(), StateValue::String(name));
    fields
}

// =============================================================================
// Behaviors
// =============================================================================

fn apply_header(ctx: &mut AttributeContext<'_>, args: &[ArgValue]) -> Result<()> {
    let options = NameOrOptions::parse(args.first())?;
    let name = options.name_or(ctx, |n| parse_case(n).kebab_case());
    let mut fields = record("header", name);
    if let Some(explode) = options.flag("explode") {
        fields.insert("explode".to_string(), StateValue::Bool(explode));
    }
    ctx.set_state(HEADER, StateValue::Record(fields));
    Ok(())
}

fn apply_cookie(ctx: &mut AttributeContext<'_>, args: &[ArgValue]) -> Result<()> {
    let options = NameOrOptions::parse(args.first())?;
    let name = options.name_or(ctx, |n| parse_case(n).snake_case());
    ctx.set_state(COOKIE, StateValue::Record(record("cookie", name)));
    Ok(())
}

fn apply_query(ctx: &mut AttributeContext<'_>, args: &[ArgValue]) -> Result<()> {
    let options = NameOrOptions::parse(args.first())?;
    let name = options.name_or(ctx, str::to_string);
    let mut fields = record("query", name);
    if let Some(explode) = options.flag("explode") {
        fields.insert("explode".to_string(), StateValue::Bool(explode));
    }
    ctx.set_state(QUERY, StateValue::Record(fields));
    Ok(())
}

fn apply_path(ctx: &mut AttributeContext<'_>, args: &[ArgValue]) -> Result<()> {
    let options = NameOrOptions::parse(args.first())?;
    let name = options.name_or(ctx, str::to_string);
    let mut fields = record("path", name);
    fields.insert(
        "allowReserved".to_string(),
        StateValue::Bool(options.flag("allowReserved").unwrap_or(false)),
    );
    fields.insert(
        "explode".to_string(),
        StateValue::Bool(options.flag("explode").unwrap_or(false)),
    );
    fields.insert(
        "style".to_string(),
        StateValue::String(options.text("style").unwrap_or("simple").to_string()),
    );
    ctx.set_state(PATH, StateValue::Record(fields));
    Ok(())
}

fn property_targets() -> TargetKinds {
    TargetKinds::of(&[DeclKind::ModelProperty])
}

fn name_bearing(
    name: &str,
    options: &str,
    behavior: fn(&mut AttributeContext<'_>, &[ArgValue]) -> Result<()>,
) -> weft_checker::AttributeDefinition {
    let ty = TypeExpr::Union(vec![
        TypeExpr::reference("string"),
        TypeExpr::reference(options),
    ]);
    define(
        AttributeSignature::new(name, property_targets())
            .with_param(ParamSignature::optional("nameOrOptions", ty)),
        behavior,
    )
    .with_policy(DuplicatePolicy::Warn)
}

fn flag(name: &str, key: StateKey) -> weft_checker::AttributeDefinition {
    define(
        AttributeSignature::new(name, property_targets()),
        move |ctx: &mut AttributeContext<'_>, _: &[ArgValue]| -> Result<()> {
            ctx.set_state(key, StateValue::Bool(true));
            Ok(())
        },
    )
}

pub(crate) fn register(library: Library) -> Library {
    library
        .with_attribute(name_bearing("header", "HeaderOptions", apply_header))
        .with_attribute(name_bearing("cookie", "CookieOptions", apply_cookie))
        .with_attribute(name_bearing("query", "QueryOptions", apply_query))
        .with_attribute(name_bearing("path", "PathOptions", apply_path))
        .with_attribute(flag("body", BODY))
        .with_attribute(flag("bodyRoot", BODY_ROOT))
        .with_attribute(flag("bodyIgnore", BODY_IGNORE))
}

// =============================================================================
// Accessors
// =============================================================================

fn fields(program: &Program, decl: DeclId, key: StateKey) -> Option<&IndexMap<String, StateValue>> {
    program.state_of(decl, key).and_then(StateValue::as_record)
}

fn text(fields: &IndexMap<String, StateValue>, key: &str) -> Option<String> {
    fields.get(key).and_then(StateValue::as_str).map(str::to_string)
}

fn boolean(fields: &IndexMap<String, StateValue>, key: &str) -> Option<bool> {
    fields.get(key).and_then(StateValue::as_bool)
}

/// Returns true if the property is a header.
#[must_use]
pub fn is_header(program: &Program, decl: DeclId) -> bool {
    program.state_of(decl, HEADER).is_some()
}

/// Returns the header options of a property.
#[must_use]
pub fn header_options(program: &Program, decl: DeclId) -> Option<HeaderFieldOptions> {
    let fields = fields(program, decl, HEADER)?;
    Some(HeaderFieldOptions {
        name: text(fields, "name")?,
        explode: boolean(fields, "explode"),
    })
}

/// Returns the header name of a property.
#[must_use]
pub fn header_name(program: &Program, decl: DeclId) -> Option<String> {
    header_options(program, decl).map(|o| o.name)
}

/// Returns true if the property is a cookie.
#[must_use]
pub fn is_cookie(program: &Program, decl: DeclId) -> bool {
    program.state_of(decl, COOKIE).is_some()
}

/// Returns the cookie options of a property.
#[must_use]
pub fn cookie_options(program: &Program, decl: DeclId) -> Option<CookieParamOptions> {
    let fields = fields(program, decl, COOKIE)?;
    Some(CookieParamOptions {
        name: text(fields, "name")?,
    })
}

/// Returns true if the property is a query parameter.
#[must_use]
pub fn is_query(program: &Program, decl: DeclId) -> bool {
    program.state_of(decl, QUERY).is_some()
}

/// Returns the query options of a property.
#[must_use]
pub fn query_options(program: &Program, decl: DeclId) -> Option<QueryParamOptions> {
    let fields = fields(program, decl, QUERY)?;
    Some(QueryParamOptions {
        name: text(fields, "name")?,
        explode: boolean(fields, "explode"),
    })
}

/// Returns the query parameter name of a property.
#[must_use]
pub fn query_name(program: &Program, decl: DeclId) -> Option<String> {
    query_options(program, decl).map(|o| o.name)
}

/// Returns true if the property is a path parameter.
#[must_use]
pub fn is_path(program: &Program, decl: DeclId) -> bool {
    program.state_of(decl, PATH).is_some()
}

/// Returns the path options of a property.
#[must_use]
pub fn path_options(program: &Program, decl: DeclId) -> Option<PathParamOptions> {
    let fields = fields(program, decl, PATH)?;
    Some(PathParamOptions {
        name: text(fields, "name")?,
        explode: boolean(fields, "explode").unwrap_or(false),
        allow_reserved: boolean(fields, "allowReserved").unwrap_or(false),
        style: text(fields, "style").unwrap_or_else(|| String::from("simple")),
    })
}

/// Returns the path parameter name of a property.
#[must_use]
pub fn path_name(program: &Program, decl: DeclId) -> Option<String> {
    path_options(program, decl).map(|o| o.name)
}

/// Returns true if the property is the body.
#[must_use]
pub fn is_body(program: &Program, decl: DeclId) -> bool {
    program.state_of(decl, BODY).is_some()
}

/// Returns true if the property is the body root.
#[must_use]
pub fn is_body_root(program: &Program, decl: DeclId) -> bool {
    program.state_of(decl, BODY_ROOT).is_some()
}

/// Returns true if the property is excluded from the body.
#[must_use]
pub fn is_body_ignore(program: &Program, decl: DeclId) -> bool {
    program.state_of(decl, BODY_IGNORE).is_some()
}
