//! Allow-lists for every keyword that reaches the command text.
//!
//! Function names, operators, type names and clause modifiers are the only
//! caller-chosen words emitted unquoted, so each one is parsed into a closed
//! enum before compilation. Anything outside these lists is rejected.

use std::fmt;

use crate::error::{BuildError, Result};

/// Uppercases a token and collapses runs of whitespace.
fn normalize(token: &str) -> String {
    token
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_uppercase()
}

macro_rules! allow_list {
    (
        $(#[$meta:meta])*
        pub enum $name:ident rejects $error:expr;
        {
            $( $(#[$vmeta:meta])* $variant:ident => $token:literal ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum $name {
            $( $(#[$vmeta])* $variant, )+
        }

        impl $name {
            /// Every accepted token, in declaration order.
            pub const ALL: &'static [Self] = &[$(Self::$variant),+];

            /// Returns the SQL token.
            #[must_use]
            pub const fn as_str(self) -> &'static str {
                match self {
                    $(Self::$variant => $token,)+
                }
            }

            /// Parses a token case-insensitively.
            ///
            /// # Errors
            ///
            /// Returns an error naming the token when it is not in the list.
            pub fn parse(token: &str) -> Result<Self> {
                let normalized = normalize(token);
                match normalized.as_str() {
                    $($token => Ok(Self::$variant),)+
                    _ => Err(($error)(normalized)),
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

allow_list! {
    /// Functions callable through a `function_name` node.
    pub enum FunctionName rejects BuildError::UnsupportedFunction;
    {
        Avg => "AVG",
        Coalesce => "COALESCE",
        Count => "COUNT",
        Length => "LENGTH",
        Lower => "LOWER",
        Max => "MAX",
        Min => "MIN",
        Sum => "SUM",
        Trim => "TRIM",
        Upper => "UPPER",
    }
}

allow_list! {
    /// Operator tokens accepted in an `operator` node.
    pub enum Operator rejects BuildError::UnsupportedOperator;
    {
        Eq => "=",
        NotEq => "!=",
        LtGt => "<>",
        Gt => ">",
        Lt => "<",
        GtEq => ">=",
        LtEq => "<=",
        Mul => "*",
        Div => "/",
        Mod => "%",
        Concat => "||",
        Like => "LIKE",
        ILike => "ILIKE",
        Add => "+",
        Sub => "-",
        Not => "NOT",
        And => "AND",
        Or => "OR",
        Between => "BETWEEN",
        Cast => "CAST",
        In => "IN",
        Is => "IS",
        IsNot => "IS NOT",
        Trim => "TRIM",
    }
}

/// The sub-grammar an operator token compiles with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperatorKind {
    /// Binary, symbol between operands.
    Infix,
    /// Unary, symbol before the operand.
    Prefix,
    /// Either infix or prefix depending on the arguments given.
    Mixed,
    /// Parenthesized AND/OR chain.
    Logical,
    /// `x BETWEEN low AND high`.
    Between,
    /// `CAST(x AS type)`.
    Cast,
    /// `x IN (...)`.
    In,
    /// `x IS [NOT] TRUE|FALSE|NULL|UNKNOWN`.
    Is,
    /// `TRIM(... FROM x)`.
    Trim,
}

impl Operator {
    /// Returns the sub-grammar used for this operator.
    #[must_use]
    pub const fn kind(self) -> OperatorKind {
        match self {
            Self::Eq
            | Self::NotEq
            | Self::LtGt
            | Self::Gt
            | Self::Lt
            | Self::GtEq
            | Self::LtEq
            | Self::Mul
            | Self::Div
            | Self::Mod
            | Self::Concat
            | Self::Like
            | Self::ILike => OperatorKind::Infix,
            Self::Add | Self::Sub => OperatorKind::Mixed,
            Self::Not => OperatorKind::Prefix,
            Self::And | Self::Or => OperatorKind::Logical,
            Self::Between => OperatorKind::Between,
            Self::Cast => OperatorKind::Cast,
            Self::In => OperatorKind::In,
            Self::Is | Self::IsNot => OperatorKind::Is,
            Self::Trim => OperatorKind::Trim,
        }
    }

    /// Returns true if the operator may stand before a single operand.
    #[must_use]
    pub const fn is_prefix(self) -> bool {
        matches!(self.kind(), OperatorKind::Prefix | OperatorKind::Mixed)
    }

    /// Returns true if the operator may stand between operands.
    #[must_use]
    pub const fn is_infix(self) -> bool {
        matches!(
            self.kind(),
            OperatorKind::Infix | OperatorKind::Mixed | OperatorKind::Logical
        )
    }
}

allow_list! {
    /// Target types for CAST.
    pub enum CastType rejects BuildError::UnsupportedCastType;
    {
        BigInt => "BIGINT",
        BigSerial => "BIGSERIAL",
        Bit => "BIT",
        Boolean => "BOOLEAN",
        Box => "BOX",
        Bytea => "BYTEA",
        Character => "CHARACTER",
        Circle => "CIRCLE",
        Date => "DATE",
        Decimal => "DECIMAL",
        DoublePrecision => "DOUBLE PRECISION",
        Integer => "INTEGER",
        Interval => "INTERVAL",
        Json => "JSON",
        Jsonb => "JSONB",
        Line => "LINE",
        Lseg => "LSEG",
        Money => "MONEY",
        Numeric => "NUMERIC",
        Path => "PATH",
        Point => "POINT",
        Polygon => "POLYGON",
        Real => "REAL",
        RegClass => "REGCLASS",
        Serial => "SERIAL",
        SmallInt => "SMALLINT",
        SmallSerial => "SMALLSERIAL",
        Text => "TEXT",
        Time => "TIME",
        Timestamp => "TIMESTAMP",
        Uuid => "UUID",
        Xml => "XML",
    }
}

impl CastType {
    /// Returns true if `VARYING` may follow the type name.
    #[must_use]
    pub const fn accepts_varying(self) -> bool {
        matches!(self, Self::Character | Self::Bit)
    }

    /// Returns true if a time zone modifier may follow the type name.
    #[must_use]
    pub const fn accepts_time_zone(self) -> bool {
        matches!(self, Self::Time | Self::Timestamp)
    }
}

allow_list! {
    /// Field restrictions for `INTERVAL` casts.
    pub enum IntervalField rejects BuildError::UnsupportedInterval;
    {
        Year => "YEAR",
        Month => "MONTH",
        Day => "DAY",
        Hour => "HOUR",
        Minute => "MINUTE",
        Second => "SECOND",
        YearToMonth => "YEAR TO MONTH",
        DayToHour => "DAY TO HOUR",
        DayToMinute => "DAY TO MINUTE",
        DayToSecond => "DAY TO SECOND",
        HourToMinute => "HOUR TO MINUTE",
        HourToSecond => "HOUR TO SECOND",
        MinuteToSecond => "MINUTE TO SECOND",
    }
}

allow_list! {
    /// Join kinds for FROM items after the first.
    pub enum JoinKind rejects BuildError::UnsupportedJoinType;
    {
        Inner => "INNER",
        Left => "LEFT",
        Right => "RIGHT",
        Full => "FULL",
        Cross => "CROSS",
    }
}

impl JoinKind {
    /// Returns true if the join needs an `ON` predicate.
    #[must_use]
    pub const fn requires_on(self) -> bool {
        !matches!(self, Self::Cross)
    }
}

allow_list! {
    /// Set operations joining combine items.
    pub enum CombineKind rejects BuildError::UnsupportedCombineType;
    {
        Union => "UNION",
        Intersect => "INTERSECT",
        Except => "EXCEPT",
    }
}

allow_list! {
    /// ORDER BY direction.
    pub enum Direction rejects |token: String| {
        BuildError::malformed("ORDER BY", format!("invalid direction '{token}'"))
    };
    {
        Asc => "ASC",
        Desc => "DESC",
    }
}

allow_list! {
    /// ORDER BY null placement.
    pub enum NullsOrder rejects |token: String| {
        BuildError::malformed("ORDER BY", format!("invalid NULLS placement '{token}'"))
    };
    {
        First => "FIRST",
        Last => "LAST",
    }
}
