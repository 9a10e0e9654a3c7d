//! # oxide-dsql-sqlx
//!
//! Runs statements compiled by `oxide-dsql-core` against PostgreSQL.
//!
//! ```rust,no_run
//! use oxide_dsql_core::{executor, Assembler, StatementSpec};
//! use oxide_dsql_sqlx::PgExecutor;
//! use serde_json::json;
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let pg = PgExecutor::connect("postgres://localhost/app", 5).await?;
//! let spec = StatementSpec::from_value(&json!({
//!     "select": [{"column": "id"}],
//!     "from": [{"table": "users"}],
//! }))?;
//! let rows = executor::fetch(&pg, &Assembler::new(), &spec).await?;
//! # let _ = rows;
//! # Ok(())
//! # }
//! ```

pub mod decode;
pub mod error;
pub mod executor;

pub use decode::{decode_row, ColumnKind};
pub use error::{PgExecutorError, Result};
pub use executor::PgExecutor;
