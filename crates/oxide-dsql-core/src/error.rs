//! Error types for statement compilation.

/// Errors raised while turning a statement description into SQL.
///
/// Every variant is a local validation failure: it is reported to the
/// caller of [`build_statement`](crate::build_statement) unchanged and no
/// partial command is ever returned alongside it.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BuildError {
    /// A node matches none of the known expression shapes.
    #[error("invalid expression: {0}")]
    InvalidExpression(String),

    /// A literal payload is not null, bool, int, float or string.
    #[error("unsupported value type: {0}")]
    UnsupportedValueType(String),

    /// Operator token outside the allow-list.
    #[error("unsupported operator: {0}")]
    UnsupportedOperator(String),

    /// Function name outside the allow-list.
    #[error("unsupported function: {0}")]
    UnsupportedFunction(String),

    /// CAST target type outside the allow-list.
    #[error("unsupported CAST type: {0}")]
    UnsupportedCastType(String),

    /// INTERVAL field outside the allow-list.
    #[error("unsupported INTERVAL field: {0}")]
    UnsupportedInterval(String),

    /// Join kind outside the allow-list.
    #[error("unsupported join type: {0}")]
    UnsupportedJoinType(String),

    /// Combine kind outside the allow-list.
    #[error("unsupported combine type: {0}")]
    UnsupportedCombineType(String),

    /// A clause or operator is missing a required field, or carries
    /// fields that cannot be used together.
    #[error("malformed {clause}: {message}")]
    MalformedClause {
        /// Clause or operator being compiled.
        clause: &'static str,
        /// What is wrong with it.
        message: String,
    },

    /// A combine chain or join chain violates its ordering rules.
    #[error("malformed {clause} sequence at item {index}: {message}")]
    MalformedSequence {
        /// Clause holding the sequence.
        clause: &'static str,
        /// Zero-based position of the offending item.
        index: usize,
        /// What is wrong with it.
        message: String,
    },

    /// The input nests deeper than the configured limit.
    #[error("statement nests deeper than the limit of {limit} levels")]
    TooDeep {
        /// The configured maximum depth.
        limit: usize,
    },
}

impl BuildError {
    pub(crate) fn malformed(clause: &'static str, message: impl Into<String>) -> Self {
        Self::MalformedClause {
            clause,
            message: message.into(),
        }
    }

    pub(crate) fn sequence(clause: &'static str, index: usize, message: impl Into<String>) -> Self {
        Self::MalformedSequence {
            clause,
            index,
            message: message.into(),
        }
    }
}

/// Result type for statement compilation.
pub type Result<T> = std::result::Result<T, BuildError>;
