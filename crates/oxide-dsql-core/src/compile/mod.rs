//! Compilation from the typed model to command text and parameters.
//!
//! Three layers cooperate through one [`Fragment`] per build:
//!
//! - [`ExpressionCompiler`] handles expression nodes and operator grammars.
//! - [`ClauseCompiler`] emits one clause at a time.
//! - [`Assembler`] validates a statement and drives the clause compiler in
//!   the fixed clause order.
//!
//! Sub-queries inside expressions recurse back into the assembler through
//! the [`StatementCompiler`] trait, so the expression layer never depends on
//! the assembler directly.

mod clause;
mod expr;
mod operator;
mod statement;

pub use clause::ClauseCompiler;
pub use expr::ExpressionCompiler;
pub use statement::Assembler;

use crate::dialect::Dialect;
use crate::error::{BuildError, Result};
use crate::model::StatementSpec;
use crate::options::BuildOptions;
use crate::value::SqlValue;

/// Capability to compile a nested statement into an existing fragment.
pub trait StatementCompiler {
    /// Appends `spec` to `fragment`, unwrapped.
    ///
    /// # Errors
    ///
    /// Returns the first validation failure found in `spec`.
    fn compile_statement(&self, spec: &StatementSpec, fragment: &mut Fragment<'_>) -> Result<()>;
}

/// Append-only accumulator of command text and bound parameters.
///
/// Placeholders are numbered from the parameter count, so one fragment
/// threaded through the whole recursion numbers them in emission order.
pub struct Fragment<'d> {
    dialect: &'d dyn Dialect,
    sql: String,
    params: Vec<SqlValue>,
    depth: usize,
    max_depth: usize,
}

impl<'d> Fragment<'d> {
    /// Creates an empty fragment.
    #[must_use]
    pub fn new(dialect: &'d dyn Dialect, options: &BuildOptions) -> Self {
        Self {
            dialect,
            sql: String::new(),
            params: Vec::new(),
            depth: 0,
            max_depth: options.max_depth,
        }
    }

    /// Returns the command text emitted so far.
    #[must_use]
    pub fn sql(&self) -> &str {
        &self.sql
    }

    /// Returns the parameters bound so far.
    #[must_use]
    pub fn params(&self) -> &[SqlValue] {
        &self.params
    }

    /// Appends raw text.
    pub fn push(&mut self, text: &str) {
        self.sql.push_str(text);
    }

    /// Adds a separating space unless at the start or after `(` or a space.
    pub fn space(&mut self) {
        if !self.sql.is_empty() && !self.sql.ends_with(['(', ' ']) {
            self.sql.push(' ');
        }
    }

    /// Appends a keyword preceded by a separating space.
    pub fn keyword(&mut self, keyword: &str) {
        self.space();
        self.sql.push_str(keyword);
    }

    /// Appends a quoted identifier.
    pub fn identifier(&mut self, name: &str) {
        let quoted = self.dialect.quote_identifier(name);
        self.sql.push_str(&quoted);
    }

    /// Appends a comma-separated, parenthesized identifier list.
    pub fn identifier_list(&mut self, names: &[String]) {
        self.sql.push('(');
        for (i, name) in names.iter().enumerate() {
            if i > 0 {
                self.sql.push_str(", ");
            }
            self.identifier(name);
        }
        self.sql.push(')');
    }

    /// Binds a value and appends its placeholder.
    pub fn bind(&mut self, value: SqlValue) {
        self.params.push(value);
        let placeholder = self.dialect.placeholder(self.params.len());
        self.sql.push_str(&placeholder);
    }

    /// Runs `f` one nesting level deeper.
    ///
    /// # Errors
    ///
    /// Returns [`BuildError::TooDeep`] once the configured limit is reached,
    /// otherwise whatever `f` returns.
    pub fn nested<T>(&mut self, f: impl FnOnce(&mut Self) -> Result<T>) -> Result<T> {
        if self.depth >= self.max_depth {
            return Err(BuildError::TooDeep {
                limit: self.max_depth,
            });
        }
        self.depth += 1;
        let result = f(self);
        self.depth -= 1;
        result
    }

    /// Consumes the fragment, returning the command and its parameters.
    #[must_use]
    pub fn finish(self) -> (String, Vec<SqlValue>) {
        (self.sql, self.params)
    }
}
