//! Expression Model
//!
//! A statement description is a tree of plain data. This module defines the
//! closed set of shapes that tree may take, the allow-lists bounding every
//! keyword, and the conversion from generic JSON into the typed tree.
//!
//! # Example
//!
//! ```rust
//! use oxide_dsql_core::model::{Expr, StatementSpec};
//! use serde_json::json;
//!
//! let spec = StatementSpec::from_value(&json!({
//!     "select": [{"column": "name"}],
//!     "from": [{"table": "products"}],
//! }))
//! .unwrap();
//!
//! assert_eq!(spec.select.unwrap()[0].expr, Expr::column("name"));
//! ```

mod classify;
mod parse;
mod tokens;

pub use classify::{classify, Variant};
pub use tokens::{
    CastType, CombineKind, Direction, FunctionName, IntervalField, JoinKind, NullsOrder, Operator,
    OperatorKind,
};

use crate::value::{SqlValue, ToSqlValue};

/// An expression node.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// A sequence of expressions in a list position.
    List(Vec<Expr>),
    /// A column reference.
    Column(ColumnRef),
    /// A literal bound as a parameter.
    Value(SqlValue),
    /// The `DEFAULT` keyword.
    Default,
    /// An allow-listed function call.
    Function(FunctionCall),
    /// An operator application.
    Operation(Box<Operation>),
    /// A nested statement.
    SubQuery(Box<StatementSpec>),
}

impl Expr {
    /// Creates a column reference.
    #[must_use]
    pub fn column(name: &str) -> Self {
        Self::Column(ColumnRef::new(name))
    }

    /// Creates a column reference qualified by a table or alias.
    #[must_use]
    pub fn qualified(correlation: &str, name: &str) -> Self {
        Self::Column(ColumnRef::qualified(correlation, name))
    }

    /// Creates a parameterized literal.
    #[must_use]
    pub fn value<T: ToSqlValue>(value: T) -> Self {
        Self::Value(value.to_sql_value())
    }

    /// Creates a function call.
    #[must_use]
    pub fn function(name: FunctionName, args: Vec<Self>) -> Self {
        Self::Function(FunctionCall {
            name,
            args,
            schema: None,
        })
    }

    /// Creates a nested statement.
    #[must_use]
    pub fn sub_query(spec: StatementSpec) -> Self {
        Self::SubQuery(Box::new(spec))
    }

    /// Creates a binary infix operation.
    #[must_use]
    pub fn infix(self, operator: Operator, right: Self) -> Self {
        Self::Operation(Box::new(Operation::Infix {
            operator,
            operands: vec![self, right],
        }))
    }

    /// Creates an equality operation.
    #[must_use]
    pub fn eq(self, right: Self) -> Self {
        self.infix(Operator::Eq, right)
    }

    /// Creates a parenthesized AND chain.
    #[must_use]
    pub fn and(operands: Vec<Self>) -> Self {
        Self::Operation(Box::new(Operation::Logical {
            operator: Operator::And,
            operands,
        }))
    }

    /// Creates a parenthesized OR chain.
    #[must_use]
    pub fn or(operands: Vec<Self>) -> Self {
        Self::Operation(Box::new(Operation::Logical {
            operator: Operator::Or,
            operands,
        }))
    }

    /// Creates an IN operation.
    #[must_use]
    pub fn in_list(self, right: Vec<Self>) -> Self {
        Self::Operation(Box::new(Operation::In { left: self, right }))
    }

    /// Creates an IS operation.
    #[must_use]
    pub fn is(self, target: IsTarget) -> Self {
        Self::Operation(Box::new(Operation::Is {
            left: self,
            target,
            negated: false,
        }))
    }
}

impl From<Operation> for Expr {
    fn from(operation: Operation) -> Self {
        Self::Operation(Box::new(operation))
    }
}

/// A column reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnRef {
    /// Optional table or alias qualifier.
    pub correlation: Option<String>,
    /// Column name, or `*`.
    pub name: String,
}

impl ColumnRef {
    /// Creates an unqualified column reference.
    #[must_use]
    pub fn new(name: &str) -> Self {
        Self {
            correlation: None,
            name: String::from(name),
        }
    }

    /// Creates a qualified column reference.
    #[must_use]
    pub fn qualified(correlation: &str, name: &str) -> Self {
        Self {
            correlation: Some(String::from(correlation)),
            name: String::from(name),
        }
    }

    /// Returns true for the `*` wildcard.
    #[must_use]
    pub fn is_wildcard(&self) -> bool {
        self.name == "*"
    }
}

/// A function call.
#[derive(Debug, Clone, PartialEq)]
pub struct FunctionCall {
    /// Allow-listed function name.
    pub name: FunctionName,
    /// Arguments, compiled comma-separated.
    pub args: Vec<Expr>,
    /// Optional schema qualifier.
    pub schema: Option<String>,
}

/// An operator application.
#[derive(Debug, Clone, PartialEq)]
pub enum Operation {
    /// `a op b [op c ...]`
    Infix {
        /// Infix or mixed operator.
        operator: Operator,
        /// Two or more operands.
        operands: Vec<Expr>,
    },
    /// `op a`
    Prefix {
        /// Prefix or mixed operator.
        operator: Operator,
        /// The single operand.
        operand: Expr,
    },
    /// `(a AND b ...)` or `(a OR b ...)`
    Logical {
        /// `AND` or `OR`.
        operator: Operator,
        /// Operands joined by the operator.
        operands: Vec<Expr>,
    },
    /// `x BETWEEN [SYMMETRIC] low AND high`
    Between {
        /// Tested expression.
        expression: Expr,
        /// Lower bound.
        low: Expr,
        /// Upper bound.
        high: Expr,
        /// Emit `SYMMETRIC`.
        symmetric: bool,
    },
    /// `CAST(x AS type)`
    Cast(Cast),
    /// `x IN (a, b, ...)`
    In {
        /// Tested expression.
        left: Expr,
        /// Candidates.
        right: Vec<Expr>,
    },
    /// `x IS [NOT] TRUE|FALSE|NULL|UNKNOWN`
    Is {
        /// Tested expression.
        left: Expr,
        /// Right-hand keyword.
        target: IsTarget,
        /// Emit `IS NOT`.
        negated: bool,
    },
    /// `TRIM([side] [characters] FROM x)`
    Trim {
        /// Trimmed expression.
        expression: Expr,
        /// Optional set of characters to strip.
        characters: Option<Expr>,
        /// Optional side keyword.
        side: Option<TrimSide>,
    },
}

/// Right-hand side of `IS`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IsTarget {
    /// `TRUE`
    True,
    /// `FALSE`
    False,
    /// `NULL`
    Null,
    /// `UNKNOWN`
    Unknown,
}

impl IsTarget {
    /// Maps a boolean right-hand side to its keyword.
    #[must_use]
    pub const fn from_bool(value: bool) -> Self {
        if value { Self::True } else { Self::False }
    }

    /// Returns the SQL keyword.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::True => "TRUE",
            Self::False => "FALSE",
            Self::Null => "NULL",
            Self::Unknown => "UNKNOWN",
        }
    }
}

/// Side keyword for `TRIM`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrimSide {
    /// `BOTH`
    Both,
    /// `LEADING`
    Leading,
    /// `TRAILING`
    Trailing,
}

impl TrimSide {
    /// Returns the SQL keyword.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Both => "BOTH",
            Self::Leading => "LEADING",
            Self::Trailing => "TRAILING",
        }
    }
}

/// A `CAST` operation.
#[derive(Debug, Clone, PartialEq)]
pub struct Cast {
    /// Expression being converted.
    pub expression: Expr,
    /// Target type.
    pub target: CastType,
    /// Field restriction, `INTERVAL` only.
    pub interval: Option<IntervalField>,
    /// Emit `VARYING`.
    pub varying: bool,
    /// Length modifier. Excludes `precision`.
    pub length: Option<u32>,
    /// Precision modifier. Excludes `length`.
    pub precision: Option<u32>,
    /// Scale, only together with `precision`.
    pub scale: Option<u32>,
    /// `WITH TIME ZONE` (true) or `WITHOUT TIME ZONE` (false).
    pub with_time_zone: Option<bool>,
}

impl Cast {
    /// Creates a plain cast with no modifiers.
    #[must_use]
    pub const fn new(expression: Expr, target: CastType) -> Self {
        Self {
            expression,
            target,
            interval: None,
            varying: false,
            length: None,
            precision: None,
            scale: None,
            with_time_zone: None,
        }
    }
}

/// A full statement description.
///
/// Clauses are emitted in field order; absent clauses are skipped.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StatementSpec {
    /// Set-operation chain.
    pub combine: Option<Vec<CombineItem>>,
    /// Common table expressions.
    pub with: Option<Vec<WithItem>>,
    /// `DELETE` verb; the target comes from `from`.
    pub delete: bool,
    /// `INSERT INTO` target.
    pub insert: Option<InsertTarget>,
    /// Select list.
    pub select: Option<Vec<SelectItem>>,
    /// `UPDATE` target and assignments.
    pub update: Option<UpdateTarget>,
    /// `VALUES` rows.
    pub values: Option<Vec<Vec<Expr>>>,
    /// Base relation followed by joins.
    pub from: Option<Vec<FromItem>>,
    /// AND-joined predicates.
    pub where_: Option<Vec<Expr>>,
    /// Grouping keys.
    pub group_by: Option<Vec<Expr>>,
    /// AND-joined predicates over groups.
    pub having: Option<Vec<Expr>>,
    /// Sort keys.
    pub order_by: Option<Vec<OrderByItem>>,
    /// Row limit.
    pub limit: Option<Expr>,
    /// Row offset.
    pub offset: Option<Expr>,
    /// Returned expressions.
    pub returning: Option<Vec<Expr>>,
}

impl StatementSpec {
    /// Returns true if a primary verb (`DELETE`, `INSERT`, `SELECT`,
    /// `UPDATE`) or a bare `VALUES` list is present.
    #[must_use]
    pub const fn has_verb(&self) -> bool {
        self.delete
            || self.insert.is_some()
            || self.select.is_some()
            || self.update.is_some()
            || self.values.is_some()
    }
}

/// One arm of a `UNION`/`INTERSECT`/`EXCEPT` chain.
#[derive(Debug, Clone, PartialEq)]
pub struct CombineItem {
    /// The arm's statement.
    pub sub_query: StatementSpec,
    /// Set operation joining this arm to the next one.
    pub kind: Option<CombineKind>,
    /// `ALL` (true) or `DISTINCT` (false). Absent means `DISTINCT`.
    pub all: Option<bool>,
}

/// A common table expression.
#[derive(Debug, Clone, PartialEq)]
pub struct WithItem {
    /// CTE name.
    pub name: String,
    /// Optional column names.
    pub columns: Option<Vec<String>>,
    /// The CTE body.
    pub sub_query: StatementSpec,
    /// `MATERIALIZED` (true), `NOT MATERIALIZED` (false), or unspecified.
    pub materialized: Option<bool>,
    /// Request `WITH RECURSIVE`.
    pub recursive: bool,
}

/// `INSERT INTO` target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InsertTarget {
    /// Table name.
    pub table: String,
    /// Optional alias.
    pub alias: Option<String>,
    /// Optional column list.
    pub columns: Option<Vec<String>>,
}

/// One entry of a select list.
#[derive(Debug, Clone, PartialEq)]
pub struct SelectItem {
    /// Selected expression.
    pub expr: Expr,
    /// Optional output name.
    pub alias: Option<String>,
}

impl SelectItem {
    /// Creates an unaliased select item.
    #[must_use]
    pub const fn new(expr: Expr) -> Self {
        Self { expr, alias: None }
    }

    /// Creates an aliased select item.
    #[must_use]
    pub fn aliased(expr: Expr, alias: &str) -> Self {
        Self {
            expr,
            alias: Some(String::from(alias)),
        }
    }
}

/// `UPDATE` target.
#[derive(Debug, Clone, PartialEq)]
pub struct UpdateTarget {
    /// Table name.
    pub table: String,
    /// Optional alias.
    pub alias: Option<String>,
    /// Assignments in emission order.
    pub set: Vec<Assignment>,
}

/// One `column = expression` assignment.
#[derive(Debug, Clone, PartialEq)]
pub struct Assignment {
    /// Assigned column.
    pub column: String,
    /// New value.
    pub value: Expr,
}

impl Assignment {
    /// Creates an assignment.
    #[must_use]
    pub fn new(column: &str, value: Expr) -> Self {
        Self {
            column: String::from(column),
            value,
        }
    }
}

/// What a FROM item reads from.
#[derive(Debug, Clone, PartialEq)]
pub enum FromSource {
    /// A named table.
    Table(String),
    /// A derived table.
    SubQuery(Box<StatementSpec>),
}

/// One FROM item: the base relation or a join.
#[derive(Debug, Clone, PartialEq)]
pub struct FromItem {
    /// Relation being read.
    pub source: FromSource,
    /// Optional alias.
    pub alias: Option<String>,
    /// Join kind; absent on the base relation.
    pub kind: Option<JoinKind>,
    /// Join predicates, AND-joined.
    pub on: Option<Vec<Expr>>,
}

impl FromItem {
    /// Creates a base relation reading a table.
    #[must_use]
    pub fn table(name: &str) -> Self {
        Self {
            source: FromSource::Table(String::from(name)),
            alias: None,
            kind: None,
            on: None,
        }
    }

    /// Sets the alias.
    #[must_use]
    pub fn alias(mut self, alias: &str) -> Self {
        self.alias = Some(String::from(alias));
        self
    }

    /// Turns the item into a join.
    #[must_use]
    pub fn join(mut self, kind: JoinKind, on: Option<Vec<Expr>>) -> Self {
        self.kind = Some(kind);
        self.on = on;
        self
    }
}

/// One ORDER BY key.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderByItem {
    /// Sort expression.
    pub expr: Expr,
    /// Sort direction.
    pub direction: Direction,
    /// Optional null placement.
    pub nulls: Option<NullsOrder>,
}

impl OrderByItem {
    /// Creates an ascending key.
    #[must_use]
    pub const fn asc(expr: Expr) -> Self {
        Self {
            expr,
            direction: Direction::Asc,
            nulls: None,
        }
    }

    /// Creates a descending key.
    #[must_use]
    pub const fn desc(expr: Expr) -> Self {
        Self {
            expr,
            direction: Direction::Desc,
            nulls: None,
        }
    }
}
