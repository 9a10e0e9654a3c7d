//! Error types for the PostgreSQL executor.

/// Errors raised while running a compiled statement.
#[derive(Debug, thiserror::Error)]
pub enum PgExecutorError {
    /// Connection, protocol or constraint failure reported by the server.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// A result column has a type with no JSON mapping.
    #[error("Unsupported column type {type_name} for column '{column}'")]
    UnsupportedColumn {
        /// Column name.
        column: String,
        /// PostgreSQL type name.
        type_name: String,
    },
}

/// Result type for executor operations.
pub type Result<T> = std::result::Result<T, PgExecutorError>;
