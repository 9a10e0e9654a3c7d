//! Compiler configuration.

/// Default limit on nesting of expressions and sub-queries.
pub const DEFAULT_MAX_DEPTH: usize = 128;

/// Limits applied while parsing and compiling a statement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BuildOptions {
    /// Maximum nesting depth of expressions and sub-queries. Deeper input
    /// fails with [`BuildError::TooDeep`](crate::BuildError::TooDeep)
    /// instead of exhausting the stack.
    pub max_depth: usize,
}

impl BuildOptions {
    /// Creates options with the default limits.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }

    /// Sets the maximum nesting depth.
    #[must_use]
    pub const fn max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }
}

impl Default for BuildOptions {
    fn default() -> Self {
        Self::new()
    }
}
