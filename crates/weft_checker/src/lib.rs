//! Binder, type relations, templates, and attribute engine for Weft.
//!
//! This crate provides:
//! - [`syntax`] - Tree shapes handed over by the parser
//! - [`Program`] - Owner of declarations, types, state, and diagnostics
//! - [`binder`] - Declaration graph construction and name resolution
//! - [`TypeArena`] - Arena of structural types
//! - Assignability ([`Program::is_assignable`]) and template instantiation
//!   ([`Program::instantiate`])
//! - [`AttributeRegistry`] and [`AttributeEngine`] - Attribute validation and application
//! - [`Program::effective_value`] - Nearest-wins scope resolution
//! - [`Library`] and [`stdlib`] - Prelude declarations, attributes, validators
//! - [`Checker`] - The full pipeline

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod attribute;
pub mod binder;
pub mod checker;
pub mod evaluator;
pub mod library;
pub mod options;
pub mod program;
pub mod relation;
pub mod resolver;
pub mod state;
pub mod stdlib;
pub mod syntax;
pub mod template;
pub mod types;
pub mod value;

pub use attribute::{
    AttributeApplication, AttributeBehavior, AttributeContext, AttributeDefinition,
    AttributeEngine, AttributeRegistry, AttributeSignature, DuplicatePolicy, ParamSignature,
    TargetKinds,
};
pub use binder::Resolution;
pub use checker::Checker;
pub use library::{Library, ProgramValidator};
pub use options::CheckerOptions;
pub use program::{DeclKind, DeclSyntax, Declaration, FrozenProgram, Program};
pub use resolver::Ancestors;
pub use state::{StateKey, StateMap, StateValue};
pub use template::TemplateCache;
pub use types::{
    Intrinsics, LiteralValue, ModelType, NumericBounds, PropertyType, ScalarKind, ScalarType, Type,
    TypeArena, TypeKey,
};
pub use value::ArgValue;
