//! Contract for backends that run compiled statements.

use std::future::Future;

use serde_json::{Map, Value};
use tracing::debug;

use crate::compile::Assembler;
use crate::error::BuildError;
use crate::model::StatementSpec;
use crate::value::SqlValue;

/// One result row, keyed by column name.
pub type Row = Map<String, Value>;

/// A backend that runs a command with positional parameters.
pub trait Executor {
    /// Backend failure (connectivity, constraint violation, decoding).
    type Error: std::error::Error + Send + Sync + 'static;

    /// Runs a row-returning command.
    fn fetch_all(
        &self,
        sql: &str,
        params: &[SqlValue],
    ) -> impl Future<Output = Result<Vec<Row>, Self::Error>> + Send;

    /// Runs a command and returns the number of affected rows.
    fn execute(
        &self,
        sql: &str,
        params: &[SqlValue],
    ) -> impl Future<Output = Result<u64, Self::Error>> + Send;
}

/// Failure of a compile-then-run call.
#[derive(Debug, thiserror::Error)]
pub enum ExecuteError<E> {
    /// The statement description was rejected before reaching the backend.
    #[error(transparent)]
    Build(#[from] BuildError),

    /// The backend rejected or failed to run the command.
    #[error("executor error: {0}")]
    Executor(#[source] E),
}

/// Compiles `spec` and fetches its rows.
///
/// # Errors
///
/// Returns [`ExecuteError::Build`] if compilation fails, in which case the
/// executor is never called, or [`ExecuteError::Executor`] if the backend
/// fails.
pub async fn fetch<X: Executor + Sync>(
    executor: &X,
    assembler: &Assembler,
    spec: &StatementSpec,
) -> Result<Vec<Row>, ExecuteError<X::Error>> {
    let (sql, params) = assembler.build(spec, false)?;
    debug!(params = params.len(), "Fetching rows");
    executor
        .fetch_all(&sql, &params)
        .await
        .map_err(ExecuteError::Executor)
}

/// Compiles `spec` and runs it, returning the affected row count.
///
/// # Errors
///
/// Same as [`fetch`].
pub async fn execute<X: Executor + Sync>(
    executor: &X,
    assembler: &Assembler,
    spec: &StatementSpec,
) -> Result<u64, ExecuteError<X::Error>> {
    let (sql, params) = assembler.build(spec, false)?;
    debug!(params = params.len(), "Executing statement");
    executor
        .execute(&sql, &params)
        .await
        .map_err(ExecuteError::Executor)
}
