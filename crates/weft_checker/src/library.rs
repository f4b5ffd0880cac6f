//! Libraries: bundles of prelude declarations, attributes, and validators.

use std::fmt;
use std::sync::Arc;

use weft_foundation::Result;

use crate::attribute::AttributeDefinition;
use crate::program::Program;
use crate::syntax::{DeclNode, Statement};

/// A whole-program pass run after every attribute has been applied.
pub trait ProgramValidator: Send + Sync {
    /// Name used in logs and fault messages.
    fn name(&self) -> &str;

    /// Inspects the program and reports diagnostics.
    ///
    /// # Errors
    ///
    /// An `Err` is an engine fault; the checker reports it as `internal-error`.
    fn validate(&self, program: &mut Program) -> Result<()>;
}

/// Contributions a library makes to a check.
#[derive(Clone, Default)]
pub struct Library {
    /// Library name.
    pub name: String,
    /// Declarations bound before user sources.
    pub prelude: Vec<Statement>,
    /// Attribute registrations.
    pub attributes: Vec<AttributeDefinition>,
    /// Post-application validators, run in order.
    pub validators: Vec<Arc<dyn ProgramValidator>>,
    /// Namespaces visible from every user file without a `using`.
    pub auto_imports: Vec<String>,
}

impl Library {
    /// Creates an empty library.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Adds a prelude declaration.
    #[must_use]
    pub fn with_decl(mut self, decl: DeclNode) -> Self {
        self.prelude.push(Statement::Declaration(decl));
        self
    }

    /// Adds an attribute.
    #[must_use]
    pub fn with_attribute(mut self, definition: AttributeDefinition) -> Self {
        self.attributes.push(definition);
        self
    }

    /// Adds a validator.
    #[must_use]
    pub fn with_validator(mut self, validator: impl ProgramValidator + 'static) -> Self {
        self.validators.push(Arc::new(validator));
        self
    }

    /// Makes a namespace visible from every file.
    #[must_use]
    pub fn with_auto_import(mut self, namespace: impl Into<String>) -> Self {
        self.auto_imports.push(namespace.into());
        self
    }
}

impl fmt::Debug for Library {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let validators: Vec<&str> = self.validators.iter().map(|v| v.name()).collect();
        f.debug_struct("Library")
            .field("name", &self.name)
            .field("prelude", &self.prelude.len())
            .field("attributes", &self.attributes.len())
            .field("validators", &validators)
            .field("auto_imports", &self.auto_imports)
            .finish()
    }
}
