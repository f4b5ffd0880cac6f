//! `@server`.

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
use weft_foundation::{DeclId, Error, Result, TypeId, codes};

use crate::define;

/// Servers declared on a namespace.
pub const SERVERS: StateKey = StateKey::new("http.servers");

/// One `@server` declaration.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct HttpServer {
    /// Server url, possibly with `{param}` placeholders.
    pub url: String,
    /// Description.
    pub description: Option<String>,
    /// Placeholder types by name.
    pub parameters: IndexMap<String, TypeId>,
}

/// Placeholder names in a url, in order of appearance.
#[must_use]
pub fn url_parameters(url: &str) -> Vec<&str> {
    let mut names = Vec::new();
    let mut rest = url;
    while let Some(open) = rest.find('{') {
        let after = &rest[open + 1..];
        let Some(close) = after.find('}') else {
            break;
        };
        names.push(&after[..close]);
        rest = &after[close + 1..];
    }
    names
}

fn parameter_types(ctx: &mut AttributeContext<'_>, arg: Option<&ArgValue>) -> Result<IndexMap<String, TypeId>> {
    match arg {
        None => Ok(IndexMap::new()),
        Some(ArgValue::Type(ty)) => {
            let types = ctx.program().types();
            let model = types
                .as_model(types.unwrap_instance(*ty))
                .ok_or_else(|| Error::unexpected_value("parameters model", "non-model type"))?;
            Ok(model
                .properties
                .iter()
                .map(|(name, property)| (name.clone(), property.ty))
                .collect())
        }
        Some(ArgValue::Record(fields)) => Ok(fields
            .iter()
            .map(|(name, value)| (name.clone(), ctx.program_mut().value_type(value)))
            .collect()),
        Some(_) => Err(Error::unexpected_value("parameters model", "other value")),
    }
}

fn apply_server(ctx: &mut AttributeContext<'_>, args: &[ArgValue]) -> Result<()> {
    let url = args
        .first()
        .and_then(ArgValue::as_str)
        .ok_or_else(|| Error::unexpected_value("server url", "missing argument"))?
        .to_string();
    let description = args.get(1).and_then(ArgValue::as_str).map(str::to_string);
    let parameters = parameter_types(ctx, args.get(2))?;

    let missing: Vec<String> = url_parameters(&url)
        .into_iter()
        .filter(|name| !parameters.contains_key(*name))
        .map(str::to_string)
        .collect();
    if !missing.is_empty() {
        for name in missing {
            ctx.error(
                codes::MISSING_SERVER_PARAM,
                format!("Server url contains parameter '{name}' but wasn't found in given parameters"),
            );
        }
        return Ok(());
    }

    let mut fields = IndexMap::new();
    fields.insert("url".to_string(), StateValue::String(url));
    if let Some(description) = description {
        fields.insert("description".to_string(), StateValue::String(description));
    }
    let parameters = parameters
        .into_iter()
        .map(|(name, ty)| (name, StateValue::Type(ty)))
        .collect();
    fields.insert("parameters".to_string(), StateValue::Record(parameters));
    ctx.push_state(SERVERS, StateValue::Record(fields));
    Ok(())
}

pub(crate) fn register(library: Library) -> Library {
    library.with_attribute(
        define(
            AttributeSignature::new("server", TargetKinds::of(&[DeclKind::Namespace]))
                .with_param(ParamSignature::required("url", TypeExpr::reference("string")))
                .with_param(ParamSignature::optional(
                    "description",
                    TypeExpr::reference("string"),
                ))
                .with_param(ParamSignature::optional(
                    "parameters",
                    TypeExpr::reference("Record"),
                )),
            apply_server,
        )
        .with_policy(DuplicatePolicy::Accumulate),
    )
}

fn server_from_state(value: &StateValue) -> Option<HttpServer> {
    let fields = value.as_record()?;
    Some(HttpServer {
        url: fields.get("url")?.as_str()?.to_string(),
        description: fields
            .get("description")
            .and_then(StateValue::as_str)
            .map(str::to_string),
        parameters: fields
            .get("parameters")
            .and_then(StateValue::as_record)
            .map(|params| {
                params
                    .iter()
                    .filter_map(|(name, v)| Some((name.clone(), v.as_type()?)))
                    .collect()
            })
            .unwrap_or_default(),
    })
}

/// Returns the servers declared on a namespace, in source order.
#[must_use]
pub fn servers(program: &Program, namespace: DeclId) -> Vec<HttpServer> {
    let mut servers: Vec<HttpServer> = program
        .state_of(namespace, SERVERS)
        .and_then(StateValue::as_list)
        .map(|items| items.iter().filter_map(server_from_state).collect())
        .unwrap_or_default();
    // Attributes apply innermost-first, so the list is in reverse source order.
    servers.reverse();
    servers
}
