//! Syntax tree shapes consumed by the binder.
//!
//! The parser is an external collaborator; this module only fixes the node
//! shapes it hands over. Builders let hosts and tests assemble trees without
//! a textual grammar:
//!
//! ```
//! use weft_checker::syntax::{AttributeNode, DeclNode, PropertyNode, TypeExpr, ValueExpr};
//!
//! let op = DeclNode::operation("read")
//!     .with_parameter(
//!         PropertyNode::new("id", TypeExpr::reference("string"))
//!             .with_attribute(AttributeNode::new("header").with_arg(ValueExpr::string("x-id"))),
//!     )
//!     .returning(TypeExpr::reference("string"));
//! assert_eq!(op.name, "read");
//! ```

use weft_foundation::{FileId, Span};

/// One parsed source file.
#[derive(Clone, Debug, PartialEq)]
pub struct SyntaxTree {
    /// File handle assigned by the host.
    pub file: FileId,
    /// Path used for deterministic ordering and diagnostics.
    pub path: String,
    /// Top-level statements in source order.
    pub statements: Vec<Statement>,
}

impl SyntaxTree {
    /// Creates an empty tree.
    #[must_use]
    pub fn new(file: FileId, path: impl Into<String>) -> Self {
        Self {
            file,
            path: path.into(),
            statements: Vec::new(),
        }
    }

    /// Appends a declaration.
    #[must_use]
    pub fn with_decl(mut self, decl: DeclNode) -> Self {
        self.statements.push(Statement::Declaration(decl));
        self
    }

    /// Appends a `using` statement.
    #[must_use]
    pub fn with_using(mut self, path: &str) -> Self {
        self.statements.push(Statement::using(path));
        self
    }
}

/// A statement inside a file or namespace body.
#[derive(Clone, Debug, PartialEq)]
pub enum Statement {
    /// A declaration.
    Declaration(DeclNode),
    /// `using A.B;`
    Using {
        /// Namespace path segments.
        path: Vec<String>,
        /// Source span.
        span: Span,
    },
}

impl Statement {
    /// Creates a `using` statement from a dotted path.
    #[must_use]
    pub fn using(path: &str) -> Self {
        Self::Using {
            path: split_path(path),
            span: Span::default(),
        }
    }
}

/// A declaration node.
#[derive(Clone, Debug, PartialEq)]
pub struct DeclNode {
    /// Declared name. Namespace names may be dotted.
    pub name: String,
    /// Kind-specific content.
    pub kind: DeclNodeKind,
    /// Attributes in source order.
    pub attributes: Vec<AttributeNode>,
    /// Source span.
    pub span: Span,
}

/// Kind-specific declaration content.
#[derive(Clone, Debug, PartialEq)]
pub enum DeclNodeKind {
    /// `namespace A.B { ... }`
    Namespace {
        /// Body statements.
        statements: Vec<Statement>,
    },
    /// `model M<T> is Base { ... }`
    Model {
        /// Template parameters.
        template_params: Vec<TemplateParamNode>,
        /// Properties in source order.
        properties: Vec<PropertyNode>,
        /// `is` source whose properties are copied in first.
        is: Option<TypeExpr>,
        /// `extends` base whose properties are inherited.
        extends: Option<TypeExpr>,
        /// Whether excess properties are rejected by assignability.
        closed: bool,
    },
    /// `op name(params): returns;`
    Operation {
        /// Parameters in source order.
        parameters: Vec<PropertyNode>,
        /// Return type.
        returns: TypeExpr,
    },
    /// `interface I { ops }`
    Interface {
        /// Member operations (each an `Operation` node).
        operations: Vec<DeclNode>,
    },
    /// `enum E { a, b }`
    Enum {
        /// Members in source order.
        members: Vec<MemberNode>,
    },
    /// `union U { a: A, b: B }`
    Union {
        /// Variants in source order.
        variants: Vec<VariantNode>,
    },
    /// `scalar S extends Base;`
    Scalar {
        /// Base scalar.
        extends: Option<TypeExpr>,
        /// Inclusive lower numeric bound.
        min: Option<f64>,
        /// Inclusive upper numeric bound.
        max: Option<f64>,
    },
    /// `alias A<T> = target;`
    Alias {
        /// Template parameters.
        template_params: Vec<TemplateParamNode>,
        /// Aliased type.
        target: TypeExpr,
    },
}

impl DeclNode {
    fn new(name: impl Into<String>, kind: DeclNodeKind) -> Self {
        Self {
            name: name.into(),
            kind,
            attributes: Vec::new(),
            span: Span::default(),
        }
    }

    /// Creates a namespace with the given body.
    #[must_use]
    pub fn namespace(name: impl Into<String>, statements: Vec<Statement>) -> Self {
        Self::new(name, DeclNodeKind::Namespace { statements })
    }

    /// Creates an empty model.
    #[must_use]
    pub fn model(name: impl Into<String>) -> Self {
        Self::new(
            name,
            DeclNodeKind::Model {
                template_params: Vec::new(),
                properties: Vec::new(),
                is: None,
                extends: None,
                closed: false,
            },
        )
    }

    /// Creates an operation returning `void`.
    #[must_use]
    pub fn operation(name: impl Into<String>) -> Self {
        Self::new(
            name,
            DeclNodeKind::Operation {
                parameters: Vec::new(),
                returns: TypeExpr::reference("void"),
            },
        )
    }

    /// Creates an interface with the given operations.
    #[must_use]
    pub fn interface(name: impl Into<String>, operations: Vec<DeclNode>) -> Self {
        Self::new(name, DeclNodeKind::Interface { operations })
    }

    /// Creates an enum with plain members.
    #[must_use]
    pub fn enumeration(name: impl Into<String>, members: &[&str]) -> Self {
        Self::new(
            name,
            DeclNodeKind::Enum {
                members: members.iter().map(|m| MemberNode::new(*m)).collect(),
            },
        )
    }

    /// Creates a named union.
    #[must_use]
    pub fn union(name: impl Into<String>, variants: Vec<VariantNode>) -> Self {
        Self::new(name, DeclNodeKind::Union { variants })
    }

    /// Creates a scalar, optionally extending a base.
    #[must_use]
    pub fn scalar(name: impl Into<String>, extends: Option<&str>) -> Self {
        Self::new(
            name,
            DeclNodeKind::Scalar {
                extends: extends.map(TypeExpr::reference),
                min: None,
                max: None,
            },
        )
    }

    /// Creates an alias.
    #[must_use]
    pub fn alias(name: impl Into<String>, target: TypeExpr) -> Self {
        Self::new(
            name,
            DeclNodeKind::Alias {
                template_params: Vec::new(),
                target,
            },
        )
    }

    /// Attaches an attribute.
    #[must_use]
    pub fn with_attribute(mut self, attribute: AttributeNode) -> Self {
        self.attributes.push(attribute);
        self
    }

    /// Sets the span.
    #[must_use]
    pub fn with_span(mut self, span: Span) -> Self {
        self.span = span;
        self
    }

    /// Adds a model property. No effect on other kinds.
    #[must_use]
    pub fn with_property(mut self, property: PropertyNode) -> Self {
        if let DeclNodeKind::Model { properties, .. } = &mut self.kind {
            properties.push(property);
        }
        self
    }

    /// Adds an operation parameter. No effect on other kinds.
    #[must_use]
    pub fn with_parameter(mut self, parameter: PropertyNode) -> Self {
        if let DeclNodeKind::Operation { parameters, .. } = &mut self.kind {
            parameters.push(parameter);
        }
        self
    }

    /// Sets an operation's return type. No effect on other kinds.
    #[must_use]
    pub fn returning(mut self, ty: TypeExpr) -> Self {
        if let DeclNodeKind::Operation { returns, .. } = &mut self.kind {
            *returns = ty;
        }
        self
    }

    /// Adds a template parameter to a model or alias.
    #[must_use]
    pub fn with_template_param(mut self, param: TemplateParamNode) -> Self {
        match &mut self.kind {
            DeclNodeKind::Model {
                template_params, ..
            }
            | DeclNodeKind::Alias {
                template_params, ..
            } => template_params.push(param),
            _ => {}
        }
        self
    }

    /// Sets a model's `is` source.
    #[must_use]
    pub fn is(mut self, source: TypeExpr) -> Self {
        if let DeclNodeKind::Model { is, .. } = &mut self.kind {
            *is = Some(source);
        }
        self
    }

    /// Sets a model's `extends` base.
    #[must_use]
    pub fn extends(mut self, base: TypeExpr) -> Self {
        if let DeclNodeKind::Model { extends, .. } = &mut self.kind {
            *extends = Some(base);
        }
        self
    }

    /// Marks a model closed.
    #[must_use]
    pub fn closed(mut self) -> Self {
        if let DeclNodeKind::Model { closed, .. } = &mut self.kind {
            *closed = true;
        }
        self
    }

    /// Sets numeric bounds on a scalar.
    #[must_use]
    pub fn with_bounds(mut self, lower: Option<f64>, upper: Option<f64>) -> Self {
        if let DeclNodeKind::Scalar { min, max, .. } = &mut self.kind {
            *min = lower;
            *max = upper;
        }
        self
    }

    /// Returns true for template declarations.
    #[must_use]
    pub fn is_template(&self) -> bool {
        match &self.kind {
            DeclNodeKind::Model {
                template_params, ..
            }
            | DeclNodeKind::Alias {
                template_params, ..
            } => !template_params.is_empty(),
            _ => false,
        }
    }
}

/// A model property or operation parameter.
#[derive(Clone, Debug, PartialEq)]
pub struct PropertyNode {
    /// Property name.
    pub name: String,
    /// Declared type.
    pub ty: TypeExpr,
    /// `name?: T`
    pub optional: bool,
    /// Attributes in source order.
    pub attributes: Vec<AttributeNode>,
    /// Source span.
    pub span: Span,
}

impl PropertyNode {
    /// Creates a required property.
    #[must_use]
    pub fn new(name: impl Into<String>, ty: TypeExpr) -> Self {
        Self {
            name: name.into(),
            ty,
            optional: false,
            attributes: Vec::new(),
            span: Span::default(),
        }
    }

    /// Creates an optional property.
    #[must_use]
    pub fn optional(name: impl Into<String>, ty: TypeExpr) -> Self {
        Self {
            optional: true,
            ..Self::new(name, ty)
        }
    }

    /// Attaches an attribute.
    #[must_use]
    pub fn with_attribute(mut self, attribute: AttributeNode) -> Self {
        self.attributes.push(attribute);
        self
    }

    /// Sets the span.
    #[must_use]
    pub fn with_span(mut self, span: Span) -> Self {
        self.span = span;
        self
    }
}

/// An enum member.
#[derive(Clone, Debug, PartialEq)]
pub struct MemberNode {
    /// Member name.
    pub name: String,
    /// Attributes in source order.
    pub attributes: Vec<AttributeNode>,
    /// Source span.
    pub span: Span,
}

impl MemberNode {
    /// Creates a member.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attributes: Vec::new(),
            span: Span::default(),
        }
    }
}

/// A named union variant.
#[derive(Clone, Debug, PartialEq)]
pub struct VariantNode {
    /// Variant name.
    pub name: String,
    /// Variant type.
    pub ty: TypeExpr,
    /// Attributes in source order.
    pub attributes: Vec<AttributeNode>,
    /// Source span.
    pub span: Span,
}

impl VariantNode {
    /// Creates a variant.
    #[must_use]
    pub fn new(name: impl Into<String>, ty: TypeExpr) -> Self {
        Self {
            name: name.into(),
            ty,
            attributes: Vec::new(),
            span: Span::default(),
        }
    }
}

/// A template parameter: `T extends Constraint = Default`.
#[derive(Clone, Debug, PartialEq)]
pub struct TemplateParamNode {
    /// Parameter name.
    pub name: String,
    /// Constraint every argument must satisfy.
    pub constraint: Option<TypeExpr>,
    /// Default used when the argument is omitted.
    pub default: Option<TypeExpr>,
    /// Source span.
    pub span: Span,
}

impl TemplateParamNode {
    /// Creates an unconstrained parameter.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            constraint: None,
            default: None,
            span: Span::default(),
        }
    }

    /// Sets the constraint.
    #[must_use]
    pub fn extends(mut self, constraint: TypeExpr) -> Self {
        self.constraint = Some(constraint);
        self
    }

    /// Sets the default.
    #[must_use]
    pub fn with_default(mut self, default: TypeExpr) -> Self {
        self.default = Some(default);
        self
    }
}

/// A template argument, positional or named.
#[derive(Clone, Debug, PartialEq)]
pub struct TemplateArg {
    /// `Name=` prefix for named arguments.
    pub name: Option<String>,
    /// Argument type.
    pub value: TypeExpr,
}

impl TemplateArg {
    /// Creates a positional argument.
    #[must_use]
    pub fn positional(value: TypeExpr) -> Self {
        Self { name: None, value }
    }

    /// Creates a named argument.
    #[must_use]
    pub fn named(name: impl Into<String>, value: TypeExpr) -> Self {
        Self {
            name: Some(name.into()),
            value,
        }
    }
}

/// A type expression.
#[derive(Clone, Debug, PartialEq)]
pub enum TypeExpr {
    /// `A.B.C<args>`
    Reference {
        /// Path segments.
        path: Vec<String>,
        /// Template arguments.
        args: Vec<TemplateArg>,
        /// Source span.
        span: Span,
    },
    /// `"text"`
    String(String),
    /// `42`
    Integer(i64),
    /// `4.2`
    Float(f64),
    /// `true`
    Boolean(bool),
    /// `A | B`
    Union(Vec<TypeExpr>),
    /// `A & B`
    Intersection(Vec<TypeExpr>),
    /// `[A, B]`
    Tuple(Vec<TypeExpr>),
    /// `A[]`
    Array(Box<TypeExpr>),
    /// `{ a: A }`
    Model {
        /// Properties in source order.
        properties: Vec<PropertyNode>,
        /// Source span.
        span: Span,
    },
}

impl TypeExpr {
    /// Creates a reference from a dotted path.
    #[must_use]
    pub fn reference(path: &str) -> Self {
        Self::Reference {
            path: split_path(path),
            args: Vec::new(),
            span: Span::default(),
        }
    }

    /// Creates a reference with positional template arguments.
    #[must_use]
    pub fn instance(path: &str, args: Vec<TypeExpr>) -> Self {
        Self::instance_with(path, args.into_iter().map(TemplateArg::positional).collect())
    }

    /// Creates a reference with explicit (possibly named) template arguments.
    #[must_use]
    pub fn instance_with(path: &str, args: Vec<TemplateArg>) -> Self {
        Self::Reference {
            path: split_path(path),
            args,
            span: Span::default(),
        }
    }

    /// Creates a string literal type.
    #[must_use]
    pub fn string(value: impl Into<String>) -> Self {
        Self::String(value.into())
    }

    /// Creates an array type.
    #[must_use]
    pub fn array(element: TypeExpr) -> Self {
        Self::Array(Box::new(element))
    }

    /// Creates an anonymous model type.
    #[must_use]
    pub fn model(properties: Vec<PropertyNode>) -> Self {
        Self::Model {
            properties,
            span: Span::default(),
        }
    }
}

/// An attribute application in source.
#[derive(Clone, Debug, PartialEq)]
pub struct AttributeNode {
    /// Identifier, possibly dotted (`Private.flag`).
    pub name: String,
    /// Argument expressions.
    pub args: Vec<ValueExpr>,
    /// Source span.
    pub span: Span,
}

impl AttributeNode {
    /// Creates an attribute with no arguments.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            args: Vec::new(),
            span: Span::default(),
        }
    }

    /// Appends an argument.
    #[must_use]
    pub fn with_arg(mut self, arg: ValueExpr) -> Self {
        self.args.push(arg);
        self
    }

    /// Sets the span.
    #[must_use]
    pub fn with_span(mut self, span: Span) -> Self {
        self.span = span;
        self
    }
}

/// An attribute argument expression.
#[derive(Clone, Debug, PartialEq)]
pub enum ValueExpr {
    /// `"text"`
    String(String),
    /// `42`
    Integer(i64),
    /// `4.2`
    Float(f64),
    /// `true`
    Boolean(bool),
    /// `#{ name: value }`
    Record(Vec<(String, ValueExpr)>),
    /// `#[a, b]`
    Array(Vec<ValueExpr>),
    /// A type or declaration reference used as a value.
    Type(TypeExpr),
}

impl ValueExpr {
    /// Creates a string value.
    #[must_use]
    pub fn string(value: impl Into<String>) -> Self {
        Self::String(value.into())
    }

    /// Creates a record value from field pairs.
    #[must_use]
    pub fn record(fields: Vec<(&str, ValueExpr)>) -> Self {
        Self::Record(
            fields
                .into_iter()
                .map(|(k, v)| (k.to_string(), v))
                .collect(),
        )
    }

    /// Creates a reference value from a dotted path.
    #[must_use]
    pub fn reference(path: &str) -> Self {
        Self::Type(TypeExpr::reference(path))
    }
}

/// Splits a dotted path into segments.
#[must_use]
pub fn split_path(path: &str) -> Vec<String> {
    path.split('.').map(String::from).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builders_fill_kind_specific_fields() {
        let model = DeclNode::model("Pet")
            .with_property(PropertyNode::new("name", TypeExpr::reference("string")))
            .with_property(PropertyNode::optional("age", TypeExpr::reference("int32")))
            .closed();
        match model.kind {
            DeclNodeKind::Model {
                properties, closed, ..
            } => {
                assert_eq!(properties.len(), 2);
                assert!(properties[1].optional);
                assert!(closed);
            }
            other => panic!("expected model, got {other:?}"),
        }
    }

    #[test]
    fn builders_ignore_mismatched_kinds() {
        let op = DeclNode::operation("op").with_property(PropertyNode::new(
            "x",
            TypeExpr::reference("string"),
        ));
        match op.kind {
            DeclNodeKind::Operation { parameters, .. } => assert!(parameters.is_empty()),
            other => panic!("expected operation, got {other:?}"),
        }
    }

    #[test]
    fn template_detection() {
        let plain = DeclNode::model("A");
        let generic = DeclNode::model("B").with_template_param(TemplateParamNode::new("T"));
        assert!(!plain.is_template());
        assert!(generic.is_template());
    }

    #[test]
    fn dotted_references_split() {
        match TypeExpr::reference("ApiKeyLocation.header") {
            TypeExpr::Reference { path, .. } => assert_eq!(path, vec!["ApiKeyLocation", "header"]),
            other => panic!("expected reference, got {other:?}"),
        }
    }
}
