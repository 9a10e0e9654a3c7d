//! # oxide-dsql-core
//!
//! A declarative SQL statement compiler for PostgreSQL.
//!
//! A statement is described as plain nested data, usually JSON coming from
//! a service layer, and compiled into a command string plus an ordered list
//! of parameters.
//!
//! This crate provides:
//! - A closed expression model with allow-lists for every keyword
//! - A recursive compiler that quotes every identifier and binds every literal
//! - Structural validation of join chains and set-operation chains
//! - A small executor contract for running the result
//!
//! ## Building a statement
//!
//! ```rust
//! use oxide_dsql_core::{build_statement_value, SqlValue};
//! use serde_json::json;
//!
//! let (sql, params) = build_statement_value(
//!     &json!({
//!         "select": [{"column": "name"}],
//!         "from": [{"table": "users"}],
//!         "where": [{"left": {"column": "id"}, "operator": "=", "right": {"value": 5}}],
//!     }),
//!     false,
//! )
//! .unwrap();
//!
//! assert_eq!(sql, r#"SELECT "name" FROM "users" WHERE "id" = $1"#);
//! assert_eq!(params, vec![SqlValue::Int(5)]);
//! ```
//!
//! ## SQL Injection Prevention
//!
//! Literal data only ever reaches the parameter list, and names are always
//! quoted:
//!
//! ```rust
//! use oxide_dsql_core::build_statement_value;
//! use serde_json::json;
//!
//! let user_input = "'; DROP TABLE users; --";
//! let (sql, params) = build_statement_value(
//!     &json!({
//!         "select": [{"column": "id"}],
//!         "from": [{"table": "users"}],
//!         "where": [{"left": {"column": "name"}, "operator": "=", "right": user_input}],
//!     }),
//!     false,
//! )
//! .unwrap();
//!
//! assert!(!sql.contains("DROP"));
//! assert_eq!(params.len(), 1);
//! ```

pub mod compile;
pub mod dialect;
pub mod error;
pub mod executor;
pub mod model;
pub mod options;
pub mod validate;
pub mod value;

pub use compile::{Assembler, ClauseCompiler, ExpressionCompiler, Fragment, StatementCompiler};
pub use error::{BuildError, Result};
pub use executor::{ExecuteError, Executor, Row};
pub use model::{Expr, StatementSpec};
pub use options::BuildOptions;
pub use value::{SqlValue, ToSqlValue};

/// Compiles a typed statement with the default limits.
///
/// # Errors
///
/// Returns the first validation failure found in `spec`.
pub fn build_statement(spec: &StatementSpec, wrap: bool) -> Result<(String, Vec<SqlValue>)> {
    Assembler::new().build(spec, wrap)
}

/// Parses and compiles a JSON statement description with the default limits.
///
/// # Errors
///
/// Returns the first shape or validation failure found in `node`.
pub fn build_statement_value(
    node: &serde_json::Value,
    wrap: bool,
) -> Result<(String, Vec<SqlValue>)> {
    build_statement(&StatementSpec::from_value(node)?, wrap)
}

/// Compiles a single expression, or a list of them joined by `joiner`.
///
/// Sub-queries inside the expression are compiled with a default
/// [`Assembler`], so their placeholders continue the same numbering.
///
/// # Errors
///
/// Returns the first validation failure found in `expr`.
pub fn compile_expression(expr: &Expr, joiner: &str) -> Result<(String, Vec<SqlValue>)> {
    let assembler = Assembler::new();
    let dialect = dialect::PostgresDialect::new();
    let mut fragment = Fragment::new(&dialect, assembler.options());
    let compiler = ExpressionCompiler::new(&assembler);
    match expr {
        Expr::List(items) if !items.is_empty() => {
            compiler.compile_list(items, joiner, &mut fragment)?;
        }
        _ => compiler.compile(expr, &mut fragment)?,
    }
    Ok(fragment.finish())
}
