//! Configuration for a checking run.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Options controlling one compilation.
///
/// Hosts usually start from [`CheckerOptions::default`] or one of the
/// presets and adjust with the `with_*` builder methods.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default, rename_all = "kebab-case"))]
pub struct CheckerOptions {
    /// Promote every warning to an error once checking completes.
    pub warn_as_error: bool,

    /// Allow float literals with a zero fractional part where an integer
    /// scalar is expected.
    pub allow_numeric_narrowing: bool,

    /// Skip the standard library prelude (scalars, `@doc`, bounds).
    pub nostdlib: bool,

    /// Maximum nesting of template instantiations before the chain is
    /// treated as circular.
    pub max_template_depth: usize,
}

impl Default for CheckerOptions {
    fn default() -> Self {
        Self {
            warn_as_error: false,
            allow_numeric_narrowing: false,
            nostdlib: false,
            max_template_depth: 64,
        }
    }
}

impl CheckerOptions {
    /// Creates the default options.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Options for CI pipelines: warnings fail the build.
    #[must_use]
    pub fn strict() -> Self {
        Self {
            warn_as_error: true,
            ..Self::default()
        }
    }

    /// Builder method to set warning-as-error mode.
    #[must_use]
    pub fn with_warn_as_error(mut self, enabled: bool) -> Self {
        self.warn_as_error = enabled;
        self
    }

    /// Builder method to allow float-to-integer narrowing of literals.
    #[must_use]
    pub fn with_numeric_narrowing(mut self, enabled: bool) -> Self {
        self.allow_numeric_narrowing = enabled;
        self
    }

    /// Builder method to skip the standard library.
    #[must_use]
    pub fn with_nostdlib(mut self, enabled: bool) -> Self {
        self.nostdlib = enabled;
        self
    }

    /// Builder method to set the template nesting limit.
    #[must_use]
    pub fn with_max_template_depth(mut self, depth: usize) -> Self {
        self.max_template_depth = depth;
        self
    }
}
