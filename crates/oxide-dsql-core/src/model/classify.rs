//! Expression shape detection for generic input.

use serde_json::Value;

use crate::error::{BuildError, Result};

/// The shape of a generic expression node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Variant {
    /// A sequence of expressions.
    List,
    /// A bare null.
    Null,
    /// A bare boolean.
    Bool,
    /// A bare integer.
    Int,
    /// A bare float.
    Float,
    /// A bare string.
    String,
    /// A mapping with a `column` key.
    Column,
    /// A mapping with a `default` key.
    Default,
    /// A mapping with a `function_name` key.
    Function,
    /// A mapping with an `operator` key.
    Operator,
    /// A mapping with a `sub_query` key.
    SubQuery,
    /// A mapping with a `value` key.
    Value,
}

/// Discriminating keys for mappings, in precedence order.
const MAPPING_KEYS: &[(&[&str], Variant)] = &[
    (&["column"], Variant::Column),
    (&["default"], Variant::Default),
    (&["function_name"], Variant::Function),
    (&["operator"], Variant::Operator),
    (&["sub_query", "sub query"], Variant::SubQuery),
    (&["value"], Variant::Value),
];

/// Maps a generic node to exactly one expression shape.
///
/// Scalars and sequences are recognized by type. Mappings are recognized by
/// the first discriminating key found in the fixed order `column`,
/// `default`, `function_name`, `operator`, `sub_query`, `value`, so a node
/// carrying several of them always resolves the same way.
///
/// # Errors
///
/// Returns [`BuildError::InvalidExpression`] for a mapping with none of the
/// discriminating keys.
pub fn classify(node: &Value) -> Result<Variant> {
    match node {
        Value::Array(_) => Ok(Variant::List),
        Value::Null => Ok(Variant::Null),
        Value::Bool(_) => Ok(Variant::Bool),
        Value::Number(n) if n.is_i64() || n.is_u64() => Ok(Variant::Int),
        Value::Number(_) => Ok(Variant::Float),
        Value::String(_) => Ok(Variant::String),
        Value::Object(map) => MAPPING_KEYS
            .iter()
            .find(|(keys, _)| keys.iter().any(|key| map.contains_key(*key)))
            .map(|(_, variant)| *variant)
            .ok_or_else(|| {
                let keys: Vec<&str> = map.keys().map(String::as_str).collect();
                BuildError::InvalidExpression(format!(
                    "no expression key among [{}]",
                    keys.join(", ")
                ))
            }),
    }
}
