//! Expression compilation.

use super::{Fragment, StatementCompiler};
use crate::error::{BuildError, Result};
use crate::model::{ColumnRef, Expr, FunctionCall, StatementSpec};

/// Compiles expression nodes into a [`Fragment`].
///
/// Sub-queries are handed to the [`StatementCompiler`] this compiler was
/// created with.
pub struct ExpressionCompiler<'s, S: ?Sized> {
    pub(super) statements: &'s S,
}

impl<'s, S: StatementCompiler + ?Sized> ExpressionCompiler<'s, S> {
    /// Creates an expression compiler delegating sub-queries to `statements`.
    #[must_use]
    pub const fn new(statements: &'s S) -> Self {
        Self { statements }
    }

    /// Appends one expression.
    ///
    /// # Errors
    ///
    /// Returns the first validation failure in `expr` or its children.
    pub fn compile(&self, expr: &Expr, f: &mut Fragment<'_>) -> Result<()> {
        f.nested(|f| match expr {
            Expr::List(items) => {
                if items.is_empty() {
                    return Err(BuildError::malformed(
                        "expression list",
                        "requires at least one item",
                    ));
                }
                self.compile_list(items, ", ", f)
            }
            Expr::Column(column) => {
                compile_column(column, f);
                Ok(())
            }
            Expr::Value(value) => {
                f.bind(value.clone());
                Ok(())
            }
            Expr::Default => {
                f.push("DEFAULT");
                Ok(())
            }
            Expr::Function(call) => self.compile_function(call, f),
            Expr::Operation(operation) => self.compile_operation(operation, f),
            Expr::SubQuery(spec) => self.compile_sub_query(spec, f),
        })
    }

    /// Appends `items` separated by `joiner`.
    ///
    /// # Errors
    ///
    /// Returns the first validation failure among the items.
    pub fn compile_list(&self, items: &[Expr], joiner: &str, f: &mut Fragment<'_>) -> Result<()> {
        compile_items(items, joiner, f, |expr, f| self.compile(expr, f))
    }

    /// Appends `(items)`, comma separated.
    ///
    /// # Errors
    ///
    /// Returns the first validation failure among the items.
    pub fn compile_wrapped_list(&self, items: &[Expr], f: &mut Fragment<'_>) -> Result<()> {
        f.push("(");
        self.compile_list(items, ", ", f)?;
        f.push(")");
        Ok(())
    }

    fn compile_function(&self, call: &FunctionCall, f: &mut Fragment<'_>) -> Result<()> {
        if let Some(schema) = &call.schema {
            f.identifier(schema);
            f.push(".");
        }
        f.push(call.name.as_str());
        self.compile_wrapped_list(&call.args, f)
    }

    /// Appends `(statement)`.
    ///
    /// # Errors
    ///
    /// Returns the first validation failure in the nested statement.
    pub fn compile_sub_query(&self, spec: &StatementSpec, f: &mut Fragment<'_>) -> Result<()> {
        f.push("(");
        self.statements.compile_statement(spec, f)?;
        f.push(")");
        Ok(())
    }
}

/// Appends `items` separated by `joiner`, compiling each with `item`.
pub(super) fn compile_items<T>(
    items: &[T],
    joiner: &str,
    f: &mut Fragment<'_>,
    mut item: impl FnMut(&T, &mut Fragment<'_>) -> Result<()>,
) -> Result<()> {
    for (i, value) in items.iter().enumerate() {
        if i > 0 {
            f.push(joiner);
        }
        item(value, f)?;
    }
    Ok(())
}

fn compile_column(column: &ColumnRef, f: &mut Fragment<'_>) {
    if let Some(correlation) = &column.correlation {
        f.identifier(correlation);
        f.push(".");
    }
    if column.is_wildcard() {
        f.push("*");
    } else {
        f.identifier(&column.name);
    }
}
