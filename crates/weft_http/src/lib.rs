//! HTTP attribute library for Weft.
//!
//! This crate provides:
//! - [`http_library`] - The library to hand to a [`Checker`](weft_checker::Checker)
//! - [`metadata`] - `@header`, `@cookie`, `@query`, `@path`, `@body`, `@bodyRoot`, `@bodyIgnore`
//! - [`status_code`] - `@statusCode` and its code/range resolution
//! - [`route`] - Verbs, `@route`, `@sharedRoute`, and route uniqueness
//! - [`server`] - `@server`
//! - [`auth`] - `@useAuth` and authentication resolution
//! - [`private`] - `@Private.includeInapplicableMetadataInPayload`
//! - [`responses`] - Response status-code validation
//! - [`case`] - Name case conversion used for default parameter names
//!
//! ```
//! use weft_checker::syntax::{AttributeNode, DeclNode, PropertyNode, SyntaxTree, TypeExpr};
//! use weft_checker::{Checker, CheckerOptions};
//! use weft_foundation::FileId;
//!
//! let tree = SyntaxTree::new(FileId::new(0), "main.tsp").with_decl(
//!     DeclNode::operation("read").with_parameter(
//!         PropertyNode::new("MyHeader", TypeExpr::reference("string"))
//!             .with_attribute(AttributeNode::new("header")),
//!     ),
//! );
//! let program = Checker::new(CheckerOptions::default())
//!     .with_library(weft_http::http_library())
//!     .check(&[tree]);
//! let param = program.lookup("read.MyHeader").unwrap();
//! assert_eq!(weft_http::metadata::header_name(&program, param).as_deref(), Some("my-header"));
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod auth;
pub mod case;
pub mod metadata;
pub mod prelude;
pub mod private;
pub mod responses;
pub mod route;
pub mod server;
pub mod status_code;

use weft_checker::{AttributeBehavior, AttributeDefinition, AttributeSignature, Library};

pub use auth::{AuthKind, AuthOption, AuthScheme, Authentication, OAuth2Flow, get_authentication};
pub use metadata::{CookieParamOptions, HeaderFieldOptions, PathParamOptions, QueryParamOptions};
pub use responses::StatusCodeValidator;
pub use route::{HttpVerb, RouteValidator};
pub use server::{HttpServer, servers};
pub use status_code::StatusCode;

/// Builds the HTTP library: prelude, attributes, and validators.
#[must_use]
pub fn http_library() -> Library {
    let library = Library::new("http")
        .with_decl(prelude::declarations())
        .with_auto_import(prelude::NAMESPACE);
    let library = metadata::register(library);
    let library = status_code::register(library);
    let library = route::register(library);
    let library = server::register(library);
    let library = auth::register(library);
    let library = private::register(library);
    responses::register(library)
}

/// A definition whose parameter types resolve inside the `Http` namespace.
pub(crate) fn define(
    signature: AttributeSignature,
    behavior: impl AttributeBehavior + 'static,
) -> AttributeDefinition {
    AttributeDefinition::new(signature, behavior).in_namespace(prelude::NAMESPACE)
}
