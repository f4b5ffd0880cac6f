//! The checking pipeline.
//!
//! Binder, type evaluation, attribute application, library validators,
//! warning promotion, freeze. Each pass reports into the program's
//! diagnostics and never aborts the run.

use std::collections::HashSet;
use std::panic::{self, AssertUnwindSafe};

use tracing::{debug, warn};
use weft_foundation::{DeclId, FileId, codes};

use crate::attribute::{AttributeEngine, AttributeRegistry, panic_message};
use crate::binder;
use crate::library::Library;
use crate::options::CheckerOptions;
use crate::program::{FrozenProgram, Program};
use crate::stdlib::standard_library;
use crate::syntax::SyntaxTree;
use crate::types::Type;

/// File handles at or above this value are reserved for library preludes.
pub const PRELUDE_FILE_BASE: u32 = u32::MAX - 0xFFFF;

/// Runs a full check over a set of syntax trees.
///
/// ```
/// use weft_checker::{Checker, CheckerOptions};
/// use weft_checker::syntax::{DeclNode, SyntaxTree};
/// use weft_foundation::FileId;
///
/// let tree = SyntaxTree::new(FileId::new(0), "main.tsp").with_decl(DeclNode::model("Pet"));
/// let program = Checker::new(CheckerOptions::default()).check(&[tree]);
/// assert!(program.lookup("Pet").is_some());
/// assert!(program.should_emit(false));
/// ```
#[derive(Debug, Clone)]
pub struct Checker {
    options: CheckerOptions,
    libraries: Vec<Library>,
}

impl Checker {
    /// Creates a checker with the standard library unless `nostdlib` is set.
    #[must_use]
    pub fn new(options: CheckerOptions) -> Self {
        let libraries = if options.nostdlib {
            Vec::new()
        } else {
            vec![standard_library()]
        };
        Self { options, libraries }
    }

    /// Adds a library.
    #[must_use]
    pub fn with_library(mut self, library: Library) -> Self {
        self.libraries.push(library);
        self
    }

    /// Returns the libraries in load order.
    #[must_use]
    pub fn libraries(&self) -> &[Library] {
        &self.libraries
    }

    /// Returns the options.
    #[must_use]
    pub fn options(&self) -> &CheckerOptions {
        &self.options
    }

    /// Checks the trees and freezes the result.
    #[must_use]
    pub fn check(&self, trees: &[SyntaxTree]) -> FrozenProgram {
        let mut program = Program::new(self.options.clone());

        let registry = self.build_registry(&mut program);
        self.bind(&mut program, trees);

        let mut engine = AttributeEngine::new(&registry, &mut program);
        evaluate_types(&mut program);
        apply_attributes(&mut program, &mut engine);
        self.run_validators(&mut program);

        if self.options.warn_as_error {
            program.promote_warnings();
        }
        debug!(
            declarations = program.decl_count(),
            types = program.types().len(),
            diagnostics = program.diagnostics().len(),
            "check complete"
        );
        program.freeze()
    }

    fn build_registry(&self, program: &mut Program) -> AttributeRegistry {
        let mut registry = AttributeRegistry::new();
        for library in &self.libraries {
            for definition in &library.attributes {
                if let Err(err) = registry.register(definition.clone()) {
                    warn!(library = %library.name, error = %err, "attribute registration failed");
                    let global = program.global();
                    program.error(codes::INTERNAL_ERROR, global, err.to_string());
                }
            }
        }
        registry
    }

    fn bind(&self, program: &mut Program, trees: &[SyntaxTree]) {
        let preludes: Vec<SyntaxTree> = self
            .libraries
            .iter()
            .enumerate()
            .filter(|(_, library)| !library.prelude.is_empty())
            .map(|(index, library)| SyntaxTree {
                file: prelude_file(index),
                path: format!("<{}>/{index:04}", library.name),
                statements: library.prelude.clone(),
            })
            .collect();
        binder::bind(program, &preludes);
        binder::bind(program, trees);

        let auto: Vec<String> = self
            .libraries
            .iter()
            .flat_map(|library| library.auto_imports.iter().cloned())
            .collect();
        binder::resolve_imports(program, &auto);
        debug!(declarations = program.decl_count(), "binding complete");
    }

    fn run_validators(&self, program: &mut Program) {
        for library in &self.libraries {
            for validator in &library.validators {
                debug!(validator = validator.name(), "running validator");
                let outcome =
                    panic::catch_unwind(AssertUnwindSafe(|| validator.validate(&mut *program)));
                let fault = match outcome {
                    Ok(Ok(())) => continue,
                    Ok(Err(err)) => err.to_string(),
                    Err(payload) => panic_message(&*payload),
                };
                warn!(validator = validator.name(), error = %fault, "validator faulted");
                let global = program.global();
                program.error(
                    codes::INTERNAL_ERROR,
                    global,
                    format!("validator {} failed: {fault}", validator.name()),
                );
            }
        }
    }
}

#[allow(clippy::cast_possible_truncation)]
fn prelude_file(index: usize) -> FileId {
    FileId::new(PRELUDE_FILE_BASE + index as u32)
}

/// Evaluates the type of every reachable declaration, including instances
/// created along the way.
fn evaluate_types(program: &mut Program) {
    let mut index = 0;
    while index < program.decl_count() {
        let id = DeclId::from_len(index);
        if !program.is_shadowed(id) {
            program.type_of_decl(id);
        }
        index += 1;
    }
    debug!(
        types = program.types().len(),
        instances = program.templates().len(),
        "type evaluation complete"
    );
}

/// Applies attributes in declaration creation order.
fn apply_attributes(program: &mut Program, engine: &mut AttributeEngine<'_>) {
    let mut done = HashSet::new();
    // Attribute arguments can instantiate templates, which adds declarations.
    let mut index = 0;
    while index < program.decl_count() {
        apply_decl(program, engine, DeclId::from_len(index), &mut done);
        index += 1;
    }
    debug!(
        applications = program.applications().len(),
        "attribute application complete"
    );
}

fn apply_decl(
    program: &mut Program,
    engine: &mut AttributeEngine<'_>,
    id: DeclId,
    done: &mut HashSet<DeclId>,
) {
    if !done.insert(id) || program.is_shadowed(id) || program.in_template(id) {
        return;
    }
    // Bounds on a scalar must be in place before anything reads them through
    // a property of that scalar type.
    if let Some(dependency) = scalar_dependency(program, id) {
        apply_decl(program, engine, dependency, done);
    }
    let attributes = program.decl(id).attributes.clone();
    for node in attributes.iter().rev() {
        engine.apply_node(program, id, node);
    }
}

/// The scalar declaration a property's type or a scalar's base points at.
fn scalar_dependency(program: &Program, id: DeclId) -> Option<DeclId> {
    let types = program.types();
    let ty = types.unwrap_instance(program.type_of(id)?);
    match types.get(ty) {
        Type::Scalar(scalar) if scalar.decl == id => {
            let base = types.unwrap_instance(scalar.base?);
            match types.get(base) {
                Type::Scalar(base) => Some(base.decl),
                _ => None,
            }
        }
        Type::Scalar(scalar) => Some(scalar.decl),
        _ => None,
    }
}
