//! Response validation.

use std::collections::HashSet;

use weft_checker::program::{DeclKind, Program};
use weft_checker::{Library, ModelType, ProgramValidator, Type};
use weft_foundation::{DeclId, Result, TypeId, codes};

use crate::metadata::is_body_root;
use crate::status_code::is_status_code;

/// Reports response models with more than one `@statusCode` property.
#[derive(Clone, Copy, Debug, Default)]
pub struct StatusCodeValidator;

/// Response models of a return type; union variants are separate responses.
#[must_use]
pub fn response_models(program: &Program, ty: TypeId) -> Vec<TypeId> {
    let types = program.types();
    match types.get(types.unwrap_instance(ty)) {
        Type::Union { variants, .. } => variants
            .iter()
            .flat_map(|v| response_models(program, *v))
            .collect(),
        Type::Model(_) => vec![ty],
        _ => Vec::new(),
    }
}

/// `@statusCode` properties of a response model, including those reached
/// through `@bodyRoot` properties.
#[must_use]
pub fn status_code_properties(program: &Program, response: TypeId) -> Vec<DeclId> {
    let mut found = Vec::new();
    let types = program.types();
    let mut visited = HashSet::from([types.unwrap_instance(response)]);
    if let Some(model) = types.as_model(response) {
        collect(program, model, &mut visited, &mut found);
    }
    found
}

fn collect(
    program: &Program,
    model: &ModelType,
    visited: &mut HashSet<TypeId>,
    found: &mut Vec<DeclId>,
) {
    let types = program.types();
    for property in model.properties.values() {
        let Some(decl) = property.decl else {
            continue;
        };
        if is_status_code(program, decl) {
            found.push(decl);
        } else if is_body_root(program, decl) {
            let inner = types.unwrap_instance(property.ty);
            if !visited.insert(inner) {
                continue;
            }
            if let Some(inner) = types.as_model(inner) {
                collect(program, inner, visited, found);
            }
        }
    }
}

impl ProgramValidator for StatusCodeValidator {
    fn name(&self) -> &str {
        "http-status-codes"
    }

    fn validate(&self, program: &mut Program) -> Result<()> {
        let offending: Vec<DeclId> = program
            .decls()
            .filter(|d| {
                d.kind == DeclKind::Operation
                    && !d.shadowed
                    && !d.is_template()
                    && !program.in_template(d.id)
            })
            .filter(|d| {
                program.return_type(d.id).is_some_and(|ty| {
                    response_models(program, ty)
                        .into_iter()
                        .any(|response| status_code_properties(program, response).len() > 1)
                })
            })
            .map(|d| d.id)
            .collect();
        for op in offending {
            program.error(
                codes::MULTIPLE_STATUS_CODES,
                op,
                "Multiple `@statusCode` decorators defined for this operation response.",
            );
        }
        Ok(())
    }
}

pub(crate) fn register(library: Library) -> Library {
    library.with_validator(StatusCodeValidator)
}
