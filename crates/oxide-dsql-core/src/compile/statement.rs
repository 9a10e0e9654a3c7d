//! Statement assembly.

use tracing::{debug, trace};

use super::{ClauseCompiler, Fragment, StatementCompiler};
use crate::dialect::{Dialect, PostgresDialect};
use crate::error::Result;
use crate::model::StatementSpec;
use crate::options::BuildOptions;
use crate::validate;
use crate::value::SqlValue;

/// Top-level statement compiler.
///
/// Owns nothing but configuration: every [`build`](Self::build) call
/// allocates its own [`Fragment`], so one assembler can be shared freely
/// between threads.
#[derive(Debug, Default, Clone, Copy)]
pub struct Assembler {
    dialect: PostgresDialect,
    options: BuildOptions,
}

impl Assembler {
    /// Creates an assembler with the default limits.
    #[must_use]
    pub const fn new() -> Self {
        Self::with_options(BuildOptions::new())
    }

    /// Creates an assembler with custom limits.
    #[must_use]
    pub const fn with_options(options: BuildOptions) -> Self {
        Self {
            dialect: PostgresDialect::new(),
            options,
        }
    }

    /// Returns the configured limits.
    #[must_use]
    pub const fn options(&self) -> &BuildOptions {
        &self.options
    }

    /// Compiles a statement into command text and its parameters.
    ///
    /// With `wrap` the command is enclosed in parentheses, as when it
    /// appears nested in another statement. Either the whole command is
    /// returned or an error is; partial output is discarded.
    ///
    /// # Errors
    ///
    /// Returns the first validation failure found anywhere in `spec`.
    pub fn build(&self, spec: &StatementSpec, wrap: bool) -> Result<(String, Vec<SqlValue>)> {
        let mut fragment = Fragment::new(&self.dialect, &self.options);
        if wrap {
            fragment.push("(");
        }
        self.compile_statement(spec, &mut fragment)?;
        if wrap {
            fragment.push(")");
        }
        let (sql, params) = fragment.finish();
        debug!(
            dialect = self.dialect.name(),
            params = params.len(),
            "Compiled statement"
        );
        trace!(sql = %sql, "Statement text");
        Ok((sql, params))
    }
}

impl StatementCompiler for Assembler {
    fn compile_statement(&self, spec: &StatementSpec, f: &mut Fragment<'_>) -> Result<()> {
        f.nested(|f| {
            validate::check_verbs(spec)?;
            if let Some(items) = &spec.combine {
                validate::check_combine_chain(items)?;
            }
            if let Some(items) = &spec.from {
                validate::check_from_chain(items)?;
            }

            let clauses = ClauseCompiler::new(self);
            if let Some(items) = &spec.combine {
                trace!(items = items.len(), "COMBINE");
                clauses.combine(items, f)?;
            }
            if let Some(items) = &spec.with {
                trace!(items = items.len(), "WITH");
                clauses.with(items, f)?;
            }
            if spec.delete {
                clauses.delete(f);
            }
            if let Some(target) = &spec.insert {
                clauses.insert(target, f)?;
            }
            if let Some(items) = &spec.select {
                clauses.select(items, f)?;
            }
            if let Some(target) = &spec.update {
                clauses.update(target, f)?;
            }
            if let Some(rows) = &spec.values {
                clauses.values(rows, f)?;
            }
            if let Some(items) = &spec.from {
                clauses.from(items, f)?;
            }
            if let Some(predicates) = &spec.where_ {
                clauses.where_(predicates, f)?;
            }
            if let Some(keys) = &spec.group_by {
                clauses.group_by(keys, f)?;
            }
            if let Some(predicates) = &spec.having {
                clauses.having(predicates, f)?;
            }
            if let Some(items) = &spec.order_by {
                clauses.order_by(items, f)?;
            }
            if let Some(limit) = &spec.limit {
                clauses.limit(limit, f)?;
            }
            if let Some(offset) = &spec.offset {
                clauses.offset(offset, f)?;
            }
            if let Some(items) = &spec.returning {
                clauses.returning(items, f)?;
            }
            Ok(())
        })
    }
}
