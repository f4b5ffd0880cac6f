//! Type arena.
//!
//! Types live in an arena addressed by [`TypeId`], so recursive and mutually
//! recursive shapes are plain edges rather than ownership cycles. Literal,
//! tuple, array, and anonymous union types are interned by structure, so two
//! structurally equal occurrences share one handle.

use std::collections::HashMap;
use std::fmt;

use indexmap::IndexMap;
use weft_foundation::{DeclId, TypeId};

use crate::program::DeclKind;

/// Literal constant types.
#[derive(Clone, Debug, PartialEq)]
pub enum LiteralValue {
    /// `"text"`
    String(String),
    /// `42`
    Integer(i64),
    /// `4.2`
    Float(f64),
    /// `true`
    Boolean(bool),
}

impl LiteralValue {
    /// Returns the numeric value, if numeric.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Integer(n) => Some(*n as f64),
            Self::Float(n) => Some(*n),
            _ => None,
        }
    }
}

impl fmt::Display for LiteralValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::String(s) => write!(f, "\"{s}\""),
            Self::Integer(n) => write!(f, "{n}"),
            Self::Float(n) => write!(f, "{n}"),
            Self::Boolean(b) => write!(f, "{b}"),
        }
    }
}

/// The primitive family a scalar belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ScalarKind {
    /// Accepts string literals.
    String,
    /// Accepts boolean literals.
    Boolean,
    /// Accepts integer literals only.
    Integer,
    /// Accepts integer and float literals.
    Float,
    /// Any numeric literal.
    Numeric,
    /// No literal form (bytes, dates, user roots).
    Opaque,
}

/// Inclusive numeric bounds.
#[derive(Clone, Copy, Debug, PartialEq, Default)]
pub struct NumericBounds {
    /// Lower bound.
    pub min: Option<f64>,
    /// Upper bound.
    pub max: Option<f64>,
}

impl NumericBounds {
    /// Creates bounds.
    #[must_use]
    pub const fn new(min: Option<f64>, max: Option<f64>) -> Self {
        Self { min, max }
    }

    /// Returns true if the value lies within the bounds.
    #[must_use]
    pub fn contains(&self, value: f64) -> bool {
        self.min.is_none_or(|m| value >= m) && self.max.is_none_or(|m| value <= m)
    }

    /// Narrows these bounds by another set.
    #[must_use]
    pub fn intersect(self, other: Self) -> Self {
        Self {
            min: match (self.min, other.min) {
                (Some(a), Some(b)) => Some(a.max(b)),
                (a, b) => a.or(b),
            },
            max: match (self.max, other.max) {
                (Some(a), Some(b)) => Some(a.min(b)),
                (a, b) => a.or(b),
            },
        }
    }
}

/// A named scalar.
#[derive(Clone, Debug, PartialEq)]
pub struct ScalarType {
    /// Declaring scalar.
    pub decl: DeclId,
    /// Scalar name.
    pub name: String,
    /// Base scalar type, if it extends one.
    pub base: Option<TypeId>,
    /// Primitive family.
    pub kind: ScalarKind,
    /// Effective bounds including inherited ones.
    pub bounds: NumericBounds,
}

/// One property slot of a model type.
#[derive(Clone, Debug, PartialEq)]
pub struct PropertyType {
    /// Property value type.
    pub ty: TypeId,
    /// Whether the property may be omitted.
    pub optional: bool,
    /// Declaring property, if any (record values have none).
    pub decl: Option<DeclId>,
}

/// A structural model.
#[derive(Clone, Debug, PartialEq)]
pub struct ModelType {
    /// Declaring model (anonymous models have an unnamed declaration).
    pub decl: Option<DeclId>,
    /// Model name; `None` for anonymous models and record values.
    pub name: Option<String>,
    /// Properties in declaration order.
    pub properties: IndexMap<String, PropertyType>,
    /// Rejects excess properties.
    pub closed: bool,
}

/// A structural type expression.
#[derive(Clone, Debug, PartialEq)]
pub enum Type {
    /// Sentinel for unresolved or invalid types; relates to everything.
    Error,
    /// Top type.
    Unknown,
    /// No value.
    Void,
    /// Bottom type.
    Never,
    /// Any model (`Record<unknown>`).
    AnyModel,
    /// Reserved slot whose content is still being computed.
    Pending,
    /// A named scalar.
    Scalar(ScalarType),
    /// A literal constant.
    Literal(LiteralValue),
    /// A model.
    Model(ModelType),
    /// A union; `decl` is set for named unions.
    Union {
        /// Declaring union.
        decl: Option<DeclId>,
        /// Member types in order.
        variants: Vec<TypeId>,
    },
    /// A fixed-length tuple.
    Tuple(Vec<TypeId>),
    /// A homogeneous array.
    Array(TypeId),
    /// An enum.
    Enum {
        /// Declaring enum.
        decl: DeclId,
    },
    /// One enum member.
    EnumMember {
        /// Owning enum.
        owner: DeclId,
        /// Member declaration.
        member: DeclId,
        /// Member name.
        name: String,
    },
    /// An uninstantiated template parameter.
    TemplateParameter {
        /// Parameter name.
        name: String,
        /// Constraint type.
        constraint: Option<TypeId>,
        /// Default type.
        default: Option<TypeId>,
    },
    /// A template applied to concrete arguments.
    Instantiated {
        /// Template declaration.
        template: DeclId,
        /// Argument tuple after defaults.
        args: Vec<TypeId>,
        /// The instantiated body.
        body: TypeId,
    },
    /// A non-type declaration used as a value (operation, interface, namespace).
    Declaration {
        /// Referenced declaration.
        decl: DeclId,
        /// Its kind.
        kind: DeclKind,
    },
}

/// Structural identity of a type, used for interning and cache keys.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum TypeKey {
    /// Nominal identity.
    Id(TypeId),
    /// String literal.
    String(String),
    /// Integer literal.
    Integer(i64),
    /// Float literal by bit pattern.
    Float(u64),
    /// Boolean literal.
    Boolean(bool),
    /// Tuple of keys.
    Tuple(Vec<TypeKey>),
    /// Array of key.
    Array(Box<TypeKey>),
    /// Anonymous union of keys.
    Union(Vec<TypeKey>),
    /// Anonymous model: (name, optional, key) per property, plus closed flag.
    Model(Vec<(String, bool, TypeKey)>, bool),
}

const KEY_DEPTH_LIMIT: usize = 32;

/// Well-known handles allocated with every arena.
#[derive(Clone, Copy, Debug)]
pub struct Intrinsics {
    /// The error sentinel.
    pub error: TypeId,
    /// `unknown`
    pub unknown: TypeId,
    /// `void`
    pub void: TypeId,
    /// `never`
    pub never: TypeId,
    /// `Record<unknown>`
    pub any_model: TypeId,
}

/// Arena owning every type of one program.
#[derive(Clone, Debug)]
pub struct TypeArena {
    types: Vec<Type>,
    interned: HashMap<TypeKey, TypeId>,
    intrinsics: Intrinsics,
}

impl Default for TypeArena {
    fn default() -> Self {
        Self::new()
    }
}

impl TypeArena {
    /// Creates an arena with the intrinsic types pre-allocated.
    #[must_use]
    pub fn new() -> Self {
        let types = vec![
            Type::Error,
            Type::Unknown,
            Type::Void,
            Type::Never,
            Type::AnyModel,
        ];
        Self {
            types,
            interned: HashMap::new(),
            intrinsics: Intrinsics {
                error: TypeId::new(0),
                unknown: TypeId::new(1),
                void: TypeId::new(2),
                never: TypeId::new(3),
                any_model: TypeId::new(4),
            },
        }
    }

    /// Returns the intrinsic handles.
    #[must_use]
    pub fn intrinsics(&self) -> Intrinsics {
        self.intrinsics
    }

    /// Returns the error sentinel.
    #[must_use]
    pub fn error(&self) -> TypeId {
        self.intrinsics.error
    }

    /// Returns the type behind a handle.
    ///
    /// # Panics
    ///
    /// Panics if the handle does not come from this arena.
    #[must_use]
    pub fn get(&self, id: TypeId) -> &Type {
        &self.types[id.index()]
    }

    /// Returns the number of types.
    #[must_use]
    pub fn len(&self) -> usize {
        self.types.len()
    }

    /// Returns true if only intrinsics exist.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.types.len() <= 5
    }

    /// Allocates a type, interning it when it is structural.
    pub fn alloc(&mut self, ty: Type) -> TypeId {
        let internable = matches!(
            ty,
            Type::Literal(_) | Type::Tuple(_) | Type::Array(_) | Type::Union { decl: None, .. }
        );
        if internable {
            let key = self.key_of(&ty, 0);
            if let Some(&id) = self.interned.get(&key) {
                return id;
            }
            let id = self.push(ty);
            self.interned.insert(key, id);
            return id;
        }
        self.push(ty)
    }

    /// Allocates a literal type.
    pub fn literal(&mut self, value: LiteralValue) -> TypeId {
        self.alloc(Type::Literal(value))
    }

    /// Reserves a slot to be completed later with [`TypeArena::complete`].
    pub fn reserve(&mut self) -> TypeId {
        self.push(Type::Pending)
    }

    /// Fills a reserved slot.
    pub fn complete(&mut self, id: TypeId, ty: Type) {
        debug_assert!(
            matches!(self.types[id.index()], Type::Pending),
            "type {id:?} completed twice"
        );
        self.types[id.index()] = ty;
    }

    fn push(&mut self, ty: Type) -> TypeId {
        let id = TypeId::from_len(self.types.len());
        self.types.push(ty);
        id
    }

    /// Strips `Instantiated` wrappers down to the body.
    #[must_use]
    pub fn unwrap_instance(&self, mut id: TypeId) -> TypeId {
        while let Type::Instantiated { body, .. } = self.get(id) {
            id = *body;
        }
        id
    }

    /// Returns the model behind a handle, looking through instantiations.
    #[must_use]
    pub fn as_model(&self, id: TypeId) -> Option<&ModelType> {
        match self.get(self.unwrap_instance(id)) {
            Type::Model(model) => Some(model),
            _ => None,
        }
    }

    /// Returns true for the error sentinel.
    #[must_use]
    pub fn is_error(&self, id: TypeId) -> bool {
        matches!(self.get(id), Type::Error)
    }

    /// Returns the structural key of a type.
    #[must_use]
    pub fn key(&self, id: TypeId) -> TypeKey {
        self.key_at(id, 0)
    }

    fn key_at(&self, id: TypeId, depth: usize) -> TypeKey {
        if depth > KEY_DEPTH_LIMIT {
            return TypeKey::Id(id);
        }
        let ty = self.get(id);
        let structural = match ty {
            Type::Literal(_) | Type::Tuple(_) | Type::Array(_) | Type::Union { decl: None, .. } => {
                true
            }
            Type::Model(model) => model.name.is_none(),
            _ => false,
        };
        if structural {
            self.key_of(ty, depth)
        } else {
            TypeKey::Id(id)
        }
    }

    fn key_of(&self, ty: &Type, depth: usize) -> TypeKey {
        let child = |id: &TypeId| self.key_at(*id, depth + 1);
        match ty {
            Type::Literal(LiteralValue::String(s)) => TypeKey::String(s.clone()),
            Type::Literal(LiteralValue::Integer(n)) => TypeKey::Integer(*n),
            Type::Literal(LiteralValue::Float(n)) => TypeKey::Float(n.to_bits()),
            Type::Literal(LiteralValue::Boolean(b)) => TypeKey::Boolean(*b),
            Type::Tuple(items) => TypeKey::Tuple(items.iter().map(child).collect()),
            Type::Array(element) => TypeKey::Array(Box::new(child(element))),
            Type::Union { variants, .. } => TypeKey::Union(variants.iter().map(child).collect()),
            Type::Model(model) => TypeKey::Model(
                model
                    .properties
                    .iter()
                    .map(|(name, prop)| (name.clone(), prop.optional, child(&prop.ty)))
                    .collect(),
                model.closed,
            ),
            _ => unreachable!("key_of called on a nominal type"),
        }
    }
}
