//! Conversion of PostgreSQL rows into generic JSON rows.

use oxide_dsql_core::Row;
use serde_json::Value;
use sqlx::postgres::PgRow;
use sqlx::{Column, Row as _, TypeInfo, ValueRef};

use crate::error::{PgExecutorError, Result};

/// JSON mapping chosen for a PostgreSQL column type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    /// `BOOL`
    Bool,
    /// `INT2`
    SmallInt,
    /// `INT4`
    Int,
    /// `INT8`
    BigInt,
    /// `FLOAT4`
    Real,
    /// `FLOAT8`
    Double,
    /// `TEXT`, `VARCHAR`, `BPCHAR`, `NAME`
    Text,
    /// `JSON`, `JSONB`
    Json,
}

impl ColumnKind {
    /// Looks up the mapping for a type name as reported by the server.
    #[must_use]
    pub fn from_type_name(name: &str) -> Option<Self> {
        match name.to_ascii_uppercase().as_str() {
            "BOOL" => Some(Self::Bool),
            "INT2" => Some(Self::SmallInt),
            "INT4" => Some(Self::Int),
            "INT8" => Some(Self::BigInt),
            "FLOAT4" => Some(Self::Real),
            "FLOAT8" => Some(Self::Double),
            "TEXT" | "VARCHAR" | "BPCHAR" | "NAME" => Some(Self::Text),
            "JSON" | "JSONB" => Some(Self::Json),
            _ => None,
        }
    }
}

/// Decodes every column of `row`, keyed by column name.
///
/// # Errors
///
/// Returns [`PgExecutorError::UnsupportedColumn`] for a column type with no
/// mapping, or a database error if a value fails to decode.
pub fn decode_row(row: &PgRow) -> Result<Row> {
    let mut decoded = Row::new();
    for (index, column) in row.columns().iter().enumerate() {
        let type_name = column.type_info().name();
        let kind = ColumnKind::from_type_name(type_name).ok_or_else(|| {
            PgExecutorError::UnsupportedColumn {
                column: column.name().to_owned(),
                type_name: type_name.to_owned(),
            }
        })?;
        let value = if row.try_get_raw(index)?.is_null() {
            Value::Null
        } else {
            decode_value(row, index, kind)?
        };
        decoded.insert(column.name().to_owned(), value);
    }
    Ok(decoded)
}

fn decode_value(row: &PgRow, index: usize, kind: ColumnKind) -> Result<Value> {
    let value = match kind {
        ColumnKind::Bool => Value::from(row.try_get::<bool, _>(index)?),
        ColumnKind::SmallInt => Value::from(row.try_get::<i16, _>(index)?),
        ColumnKind::Int => Value::from(row.try_get::<i32, _>(index)?),
        ColumnKind::BigInt => Value::from(row.try_get::<i64, _>(index)?),
        ColumnKind::Real => Value::from(f64::from(row.try_get::<f32, _>(index)?)),
        ColumnKind::Double => Value::from(row.try_get::<f64, _>(index)?),
        ColumnKind::Text => Value::from(row.try_get::<String, _>(index)?),
        ColumnKind::Json => row.try_get::<Value, _>(index)?,
    };
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_type_names() {
        assert_eq!(ColumnKind::from_type_name("BOOL"), Some(ColumnKind::Bool));
        assert_eq!(ColumnKind::from_type_name("int8"), Some(ColumnKind::BigInt));
        assert_eq!(ColumnKind::from_type_name("VARCHAR"), Some(ColumnKind::Text));
        assert_eq!(ColumnKind::from_type_name("BPCHAR"), Some(ColumnKind::Text));
        assert_eq!(ColumnKind::from_type_name("JSONB"), Some(ColumnKind::Json));
    }

    #[test]
    fn test_unmapped_type_names() {
        assert_eq!(ColumnKind::from_type_name("TIMESTAMPTZ"), None);
        assert_eq!(ColumnKind::from_type_name("BYTEA"), None);
        assert_eq!(ColumnKind::from_type_name("NUMERIC"), None);
    }
}
