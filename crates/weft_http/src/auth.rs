//! `@useAuth` and authentication resolution.
//!
//! The attribute records the configuration type as given. Resolution reads
//! it back nearest-wins from an operation outward and turns it into options:
//! a union offers alternatives, a tuple combines schemes that must all be
//! satisfied, and a model is a single scheme.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use weft_checker::program::{DeclKind, Program};
use weft_checker::stdlib::doc;
use weft_checker::syntax::TypeExpr;
use weft_checker::{
    ArgValue, AttributeContext, AttributeSignature, Library, LiteralValue, ModelType,
    ParamSignature, StateKey, StateValue, TargetKinds, Type,
};
use weft_foundation::{DeclId, Result, TypeId, codes};

use crate::define;

/// Authentication configuration type.
pub const USE_AUTH: StateKey = StateKey::new("http.useAuth");

/// Every option a client may pick from.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Authentication {
    /// Alternatives, in declaration order.
    pub options: Vec<AuthOption>,
}

/// Schemes that are used together.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct AuthOption {
    /// Combined schemes.
    pub schemes: Vec<AuthScheme>,
}

/// One authentication scheme.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct AuthScheme {
    /// Name of the declaring model.
    pub id: String,
    /// `@doc` of the declaring model.
    pub description: Option<String>,
    /// What the scheme requires.
    pub kind: AuthKind,
    /// The model type the scheme was read from.
    pub model: TypeId,
}

/// Scheme details by authentication type.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum AuthKind {
    /// HTTP authentication such as `Basic` or `Bearer`.
    Http {
        /// Scheme name.
        scheme: String,
    },
    /// An API key.
    ApiKey {
        /// `header`, `query`, or `cookie`.
        location: String,
        /// Key name.
        name: String,
    },
    /// OAuth 2.0.
    OAuth2 {
        /// Supported flows.
        flows: Vec<OAuth2Flow>,
    },
    /// OpenID Connect discovery.
    OpenIdConnect {
        /// Discovery url.
        url: String,
    },
    /// Explicitly unauthenticated.
    NoAuth,
}

/// One OAuth 2.0 flow.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct OAuth2Flow {
    /// Flow type, e.g. `implicit`.
    pub kind: String,
    /// Authorization endpoint.
    pub authorization_url: Option<String>,
    /// Token endpoint.
    pub token_url: Option<String>,
    /// Refresh endpoint.
    pub refresh_url: Option<String>,
    /// Scopes; the configuration's default scopes when the flow lists none.
    pub scopes: Vec<String>,
}

// =============================================================================
// Attribute
// =============================================================================

fn is_configuration(program: &Program, ty: TypeId) -> bool {
    let types = program.types();
    matches!(
        types.get(types.unwrap_instance(ty)),
        Type::Model(_) | Type::Tuple(_) | Type::Union { .. } | Type::Error
    )
}

fn apply_use_auth(ctx: &mut AttributeContext<'_>, args: &[ArgValue]) -> Result<()> {
    match args.first().and_then(ArgValue::as_type) {
        Some(ty) if is_configuration(ctx.program(), ty) => {
            ctx.set_state(USE_AUTH, StateValue::Type(ty));
        }
        _ => {
            let rendered = args
                .first()
                .map(|a| a.render(ctx.program()))
                .unwrap_or_default();
            ctx.error(
                codes::INVALID_ARGUMENT,
                format!("Argument '{rendered}' is not a model, tuple, or union of authentication models"),
            );
        }
    }
    Ok(())
}

pub(crate) fn register(library: Library) -> Library {
    library.with_attribute(define(
        AttributeSignature::new(
            "useAuth",
            TargetKinds::of(&[DeclKind::Namespace, DeclKind::Interface, DeclKind::Operation]),
        )
        .with_param(ParamSignature::required("auth", TypeExpr::reference("unknown"))),
        apply_use_auth,
    ))
}

// =============================================================================
// Resolution
// =============================================================================

/// Text of a string literal or enum member type.
fn text(program: &Program, ty: TypeId) -> Option<String> {
    let types = program.types();
    match types.get(types.unwrap_instance(ty)) {
        Type::Literal(LiteralValue::String(s)) => Some(s.clone()),
        Type::EnumMember { name, .. } => Some(name.clone()),
        _ => None,
    }
}

/// Items of a tuple type; empty for anything else.
fn items(program: &Program, ty: TypeId) -> Vec<TypeId> {
    let types = program.types();
    match types.get(types.unwrap_instance(ty)) {
        Type::Tuple(items) => items.clone(),
        _ => Vec::new(),
    }
}

fn field(program: &Program, model: &ModelType, name: &str) -> Option<String> {
    model
        .properties
        .get(name)
        .and_then(|property| text(program, property.ty))
}

fn strings(program: &Program, model: &ModelType, name: &str) -> Vec<String> {
    model
        .properties
        .get(name)
        .map(|property| {
            items(program, property.ty)
                .into_iter()
                .filter_map(|item| text(program, item))
                .collect()
        })
        .unwrap_or_default()
}

fn flow(program: &Program, ty: TypeId, default_scopes: &[String]) -> Option<OAuth2Flow> {
    let model = program.types().as_model(ty)?;
    let scopes = strings(program, model, "scopes");
    Some(OAuth2Flow {
        kind: field(program, model, "type")?,
        authorization_url: field(program, model, "authorizationUrl"),
        token_url: field(program, model, "tokenUrl"),
        refresh_url: field(program, model, "refreshUrl"),
        scopes: if scopes.is_empty() {
            default_scopes.to_vec()
        } else {
            scopes
        },
    })
}

fn scheme(program: &Program, ty: TypeId) -> Option<AuthScheme> {
    let model = program.types().as_model(ty)?;
    let kind = match field(program, model, "type")?.as_str() {
        "http" => AuthKind::Http {
            scheme: field(program, model, "scheme").unwrap_or_default(),
        },
        "apiKey" => AuthKind::ApiKey {
            location: field(program, model, "in").unwrap_or_default(),
            name: field(program, model, "name").unwrap_or_default(),
        },
        "oauth2" => {
            let defaults = strings(program, model, "defaultScopes");
            let flows = model
                .properties
                .get("flows")
                .map(|property| {
                    items(program, property.ty)
                        .into_iter()
                        .filter_map(|item| flow(program, item, &defaults))
                        .collect()
                })
                .unwrap_or_default();
            AuthKind::OAuth2 { flows }
        }
        "openIdConnect" => AuthKind::OpenIdConnect {
            url: field(program, model, "openIdConnectUrl").unwrap_or_default(),
        },
        "noAuth" => AuthKind::NoAuth,
        _ => return None,
    };
    let decl = model.decl;
    let id = model
        .name
        .clone()
        .or_else(|| decl.and_then(|d| program.decl(d).name.clone()))
        .unwrap_or_default();
    Some(AuthScheme {
        id,
        description: decl.and_then(|d| doc(program, d)).map(str::to_string),
        kind,
        model: ty,
    })
}

fn option(program: &Program, ty: TypeId) -> AuthOption {
    let types = program.types();
    let schemes = match types.get(types.unwrap_instance(ty)) {
        Type::Tuple(items) => items.iter().filter_map(|item| scheme(program, *item)).collect(),
        _ => scheme(program, ty).into_iter().collect(),
    };
    AuthOption { schemes }
}

/// Builds the options a configuration type describes.
#[must_use]
pub fn authentication_of(program: &Program, config: TypeId) -> Authentication {
    let types = program.types();
    let options = match types.get(types.unwrap_instance(config)) {
        Type::Union { variants, .. } => variants.iter().map(|v| option(program, *v)).collect(),
        _ => vec![option(program, config)],
    };
    Authentication { options }
}

/// Returns the authentication in effect for a declaration: its own
/// `@useAuth`, or the nearest enclosing one.
#[must_use]
pub fn get_authentication(program: &Program, decl: DeclId) -> Option<Authentication> {
    let config = program.effective_value(decl, USE_AUTH)?.as_type()?;
    Some(authentication_of(program, config))
}
