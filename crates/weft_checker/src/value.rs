//! Attribute argument values.

use indexmap::IndexMap;
use weft_foundation::{DeclId, TypeId};

use crate::program::Program;
use crate::syntax::ValueExpr;
use crate::types::{LiteralValue, ModelType, PropertyType, Type};

/// An evaluated attribute argument.
#[derive(Clone, Debug, PartialEq)]
pub enum ArgValue {
    /// String value.
    String(String),
    /// Integer value.
    Integer(i64),
    /// Float value.
    Float(f64),
    /// Boolean value.
    Boolean(bool),
    /// `#{ name: value }`
    Record(IndexMap<String, ArgValue>),
    /// `#[a, b]`
    Array(Vec<ArgValue>),
    /// A type or declaration reference.
    Type(TypeId),
}

impl ArgValue {
    /// Returns the string, if this is one.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the boolean, if this is one.
    #[must_use]
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    /// Returns the number as a float, if numeric.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Integer(n) => Some(*n as f64),
            Self::Float(n) => Some(*n),
            _ => None,
        }
    }

    /// Returns the record fields, if this is a record.
    #[must_use]
    pub fn as_record(&self) -> Option<&IndexMap<String, ArgValue>> {
        match self {
            Self::Record(fields) => Some(fields),
            _ => None,
        }
    }

    /// Returns the type handle, if this is a reference.
    #[must_use]
    pub fn as_type(&self) -> Option<TypeId> {
        match self {
            Self::Type(id) => Some(*id),
            _ => None,
        }
    }

    /// Renders the value for messages.
    #[must_use]
    pub fn render(&self, program: &Program) -> String {
        match self {
            Self::String(s) => format!("\"{s}\""),
            Self::Integer(n) => n.to_string(),
            Self::Float(n) => n.to_string(),
            Self::Boolean(b) => b.to_string(),
            Self::Record(fields) => {
                let fields: Vec<String> = fields
                    .iter()
                    .map(|(k, v)| format!("{k}: {}", v.render(program)))
                    .collect();
                format!("#{{{}}}", fields.join(", "))
            }
            Self::Array(items) => {
                let items: Vec<String> = items.iter().map(|v| v.render(program)).collect();
                format!("#[{}]", items.join(", "))
            }
            Self::Type(id) => program.render_type(*id),
        }
    }
}

impl Program {
    /// Evaluates an argument expression in a scope.
    pub fn eval_value(&mut self, expr: &ValueExpr, scope: DeclId) -> ArgValue {
        match expr {
            ValueExpr::String(s) => ArgValue::String(s.clone()),
            ValueExpr::Integer(n) => ArgValue::Integer(*n),
            ValueExpr::Float(n) => ArgValue::Float(*n),
            ValueExpr::Boolean(b) => ArgValue::Boolean(*b),
            ValueExpr::Record(fields) => ArgValue::Record(
                fields
                    .iter()
                    .map(|(k, v)| (k.clone(), self.eval_value(v, scope)))
                    .collect(),
            ),
            ValueExpr::Array(items) => {
                ArgValue::Array(items.iter().map(|v| self.eval_value(v, scope)).collect())
            }
            ValueExpr::Type(ty) => ArgValue::Type(self.eval_type(ty, scope)),
        }
    }

    /// Returns the type a value is checked against parameter types with.
    ///
    /// Scalars become literals, records become open anonymous models, and
    /// arrays become tuples.
    pub fn value_type(&mut self, value: &ArgValue) -> TypeId {
        match value {
            ArgValue::String(s) => self.types.literal(LiteralValue::String(s.clone())),
            ArgValue::Integer(n) => self.types.literal(LiteralValue::Integer(*n)),
            ArgValue::Float(n) => self.types.literal(LiteralValue::Float(*n)),
            ArgValue::Boolean(b) => self.types.literal(LiteralValue::Boolean(*b)),
            ArgValue::Record(fields) => {
                let properties = fields
                    .iter()
                    .map(|(name, v)| {
                        let ty = self.value_type(v);
                        (
                            name.clone(),
                            PropertyType {
                                ty,
                                optional: false,
                                decl: None,
                            },
                        )
                    })
                    .collect();
                self.types.alloc(Type::Model(ModelType {
                    decl: None,
                    name: None,
                    properties,
                    closed: false,
                }))
            }
            ArgValue::Array(items) => {
                let items = items.iter().map(|v| self.value_type(v)).collect();
                self.types.alloc(Type::Tuple(items))
            }
            ArgValue::Type(id) => *id,
        }
    }
}
