//! Declarations of the `Http` namespace.

use weft_checker::syntax::{
    AttributeNode, DeclNode, PropertyNode, Statement, TemplateParamNode, TypeExpr, VariantNode,
};

/// Namespace holding every prelude declaration.
pub const NAMESPACE: &str = "Http";

fn optional(name: &str, ty: &str) -> PropertyNode {
    PropertyNode::optional(name, TypeExpr::reference(ty))
}

fn required(name: &str, ty: TypeExpr) -> PropertyNode {
    PropertyNode::new(name, ty)
}

fn options_models() -> Vec<DeclNode> {
    let style = TypeExpr::Union(
        ["simple", "label", "matrix", "fragment", "path"]
            .into_iter()
            .map(TypeExpr::string)
            .collect(),
    );
    vec![
        DeclNode::model("HeaderOptions")
            .with_property(optional("name", "string"))
            .with_property(optional("explode", "boolean"))
            .closed(),
        DeclNode::model("CookieOptions")
            .with_property(optional("name", "string"))
            .closed(),
        DeclNode::model("QueryOptions")
            .with_property(optional("name", "string"))
            .with_property(optional("explode", "boolean"))
            .closed(),
        DeclNode::model("PathOptions")
            .with_property(optional("name", "string"))
            .with_property(optional("explode", "boolean"))
            .with_property(PropertyNode::optional("style", style))
            .with_property(optional("allowReserved", "boolean"))
            .closed(),
        DeclNode::model("PatchOptions")
            .with_property(optional("implicitOptionality", "boolean"))
            .closed(),
    ]
}

fn flow(name: &str, kind: &str, urls: &[(&str, bool)]) -> DeclNode {
    let mut model = DeclNode::model(name).with_property(required(
        "type",
        TypeExpr::reference(&format!("OAuth2FlowType.{kind}")),
    ));
    for (url, is_required) in urls {
        model = model.with_property(if *is_required {
            required(url, TypeExpr::reference("string"))
        } else {
            optional(url, "string")
        });
    }
    model.with_property(PropertyNode::optional(
        "scopes",
        TypeExpr::array(TypeExpr::reference("string")),
    ))
}

fn auth_models() -> Vec<DeclNode> {
    let auth_type = |member: &str| required("type", TypeExpr::reference(&format!("AuthType.{member}")));
    vec![
        DeclNode::enumeration(
            "AuthType",
            &["http", "apiKey", "oauth2", "openIdConnect", "noAuth"],
        ),
        DeclNode::enumeration("ApiKeyLocation", &["header", "query", "cookie"]),
        DeclNode::enumeration(
            "OAuth2FlowType",
            &["authorizationCode", "implicit", "password", "clientCredentials"],
        ),
        DeclNode::model("BasicAuth")
            .with_property(auth_type("http"))
            .with_property(required("scheme", TypeExpr::string("Basic"))),
        DeclNode::model("BearerAuth")
            .with_property(auth_type("http"))
            .with_property(required("scheme", TypeExpr::string("Bearer"))),
        DeclNode::model("ApiKeyAuth")
            .with_template_param(
                TemplateParamNode::new("Location").extends(TypeExpr::reference("ApiKeyLocation")),
            )
            .with_template_param(TemplateParamNode::new("Name").extends(TypeExpr::reference("string")))
            .with_property(auth_type("apiKey"))
            .with_property(required("in", TypeExpr::reference("Location")))
            .with_property(required("name", TypeExpr::reference("Name"))),
        flow(
            "AuthorizationCodeFlow",
            "authorizationCode",
            &[("authorizationUrl", true), ("tokenUrl", true), ("refreshUrl", false)],
        ),
        flow(
            "ImplicitFlow",
            "implicit",
            &[("authorizationUrl", true), ("refreshUrl", false)],
        ),
        flow(
            "PasswordFlow",
            "password",
            &[("authorizationUrl", true), ("refreshUrl", false)],
        ),
        flow(
            "ClientCredentialsFlow",
            "clientCredentials",
            &[("tokenUrl", true), ("refreshUrl", false)],
        ),
        DeclNode::union(
            "OAuth2Flow",
            vec![
                VariantNode::new("authorizationCode", TypeExpr::reference("AuthorizationCodeFlow")),
                VariantNode::new("implicit", TypeExpr::reference("ImplicitFlow")),
                VariantNode::new("password", TypeExpr::reference("PasswordFlow")),
                VariantNode::new("clientCredentials", TypeExpr::reference("ClientCredentialsFlow")),
            ],
        ),
        DeclNode::model("OAuth2Auth")
            .with_template_param(
                TemplateParamNode::new("Flows")
                    .extends(TypeExpr::array(TypeExpr::reference("OAuth2Flow"))),
            )
            .with_template_param(
                TemplateParamNode::new("Scopes")
                    .extends(TypeExpr::array(TypeExpr::reference("string")))
                    .with_default(TypeExpr::Tuple(Vec::new())),
            )
            .with_property(auth_type("oauth2"))
            .with_property(required("flows", TypeExpr::reference("Flows")))
            .with_property(required("defaultScopes", TypeExpr::reference("Scopes"))),
        DeclNode::model("NoAuth").with_property(auth_type("noAuth")),
    ]
}

fn response_models() -> Vec<DeclNode> {
    [
        ("OkResponse", 200),
        ("CreatedResponse", 201),
        ("AcceptedResponse", 202),
        ("NoContentResponse", 204),
        ("MovedResponse", 301),
        ("NotModifiedResponse", 304),
        ("BadRequestResponse", 400),
        ("UnauthorizedResponse", 401),
        ("ForbiddenResponse", 403),
        ("NotFoundResponse", 404),
        ("ConflictResponse", 409),
    ]
    .into_iter()
    .map(|(name, code)| {
        DeclNode::model(name).with_property(
            required("statusCode", TypeExpr::Integer(code))
                .with_attribute(AttributeNode::new("statusCode")),
        )
    })
    .collect()
}

/// The `Http` namespace declaration.
#[must_use]
pub fn declarations() -> DeclNode {
    let statements = options_models()
        .into_iter()
        .chain(auth_models())
        .chain(response_models())
        .map(Statement::Declaration)
        .collect();
    DeclNode::namespace(NAMESPACE, statements)
}
