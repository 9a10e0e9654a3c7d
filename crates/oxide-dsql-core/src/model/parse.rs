//! Conversion from generic JSON into the typed model.
//!
//! Field presence and field types are checked here. Rules spanning several
//! fields or several items (CAST modifiers, join and combine chains) are
//! left to the compilers so that trees built in Rust get the same checks.

use serde::{Deserialize, Deserializer};
use serde_json::{Map, Value};

use super::classify::{classify, Variant};
use super::tokens::{
    CastType, CombineKind, Direction, FunctionName, IntervalField, JoinKind, NullsOrder, Operator,
    OperatorKind,
};
use super::{
    Assignment, Cast, ColumnRef, CombineItem, Expr, FromItem, FromSource, FunctionCall,
    InsertTarget, IsTarget, OrderByItem, Operation, SelectItem, StatementSpec, TrimSide,
    UpdateTarget, WithItem,
};
use crate::error::{BuildError, Result};
use crate::options::BuildOptions;
use crate::value::SqlValue;

/// Top-level keys of a statement mapping, with accepted spellings.
const STATEMENT_KEYS: &[&[&str]] = &[
    &["combine"],
    &["with"],
    &["delete"],
    &["insert"],
    &["select"],
    &["update"],
    &["values"],
    &["from"],
    &["where"],
    &["group_by", "group by"],
    &["having"],
    &["order_by", "order by"],
    &["limit"],
    &["offset"],
    &["returning"],
];

const SUB_QUERY: &[&str] = &["sub_query", "sub query"];

impl StatementSpec {
    /// Parses a statement description from generic JSON.
    ///
    /// # Errors
    ///
    /// Returns a [`BuildError`] naming the first shape problem found.
    pub fn from_value(node: &Value) -> Result<Self> {
        Self::from_value_with(node, &BuildOptions::default())
    }

    /// Parses a statement description with custom limits.
    ///
    /// # Errors
    ///
    /// Returns a [`BuildError`] naming the first shape problem found.
    pub fn from_value_with(node: &Value, options: &BuildOptions) -> Result<Self> {
        ModelParser::new(options).statement(node)
    }
}

impl Expr {
    /// Parses an expression node from generic JSON.
    ///
    /// # Errors
    ///
    /// Returns a [`BuildError`] naming the first shape problem found.
    pub fn from_value(node: &Value) -> Result<Self> {
        ModelParser::new(&BuildOptions::default()).expr(node)
    }
}

impl<'de> Deserialize<'de> for StatementSpec {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let node = Value::deserialize(deserializer)?;
        Self::from_value(&node).map_err(serde::de::Error::custom)
    }
}

impl<'de> Deserialize<'de> for Expr {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let node = Value::deserialize(deserializer)?;
        Self::from_value(&node).map_err(serde::de::Error::custom)
    }
}

/// Recursive-descent walker over a JSON tree.
struct ModelParser {
    depth: usize,
    max_depth: usize,
}

impl ModelParser {
    const fn new(options: &BuildOptions) -> Self {
        Self {
            depth: 0,
            max_depth: options.max_depth,
        }
    }

    fn nested<T>(&mut self, f: impl FnOnce(&mut Self) -> Result<T>) -> Result<T> {
        if self.depth >= self.max_depth {
            return Err(BuildError::TooDeep {
                limit: self.max_depth,
            });
        }
        self.depth += 1;
        let result = f(self);
        self.depth -= 1;
        result
    }

    // ------------------------------------------------------------------
    // Expressions
    // ------------------------------------------------------------------

    fn expr(&mut self, node: &Value) -> Result<Expr> {
        self.nested(|p| match classify(node)? {
            Variant::List => p.expr_items(node, "expression list").map(Expr::List),
            Variant::Null | Variant::Bool | Variant::Int | Variant::Float | Variant::String => {
                SqlValue::from_json(node).map(Expr::Value)
            }
            Variant::Column => column(object("column", node)?),
            Variant::Default => default_marker(object("default", node)?),
            Variant::Function => p.function(object("function", node)?),
            Variant::Operator => p.operation(object("operator", node)?),
            Variant::SubQuery => {
                let map = object("sub-query", node)?;
                let sub = field(map, SUB_QUERY).unwrap_or(&Value::Null);
                p.statement(sub).map(|spec| Expr::SubQuery(Box::new(spec)))
            }
            Variant::Value => {
                let map = object("value", node)?;
                SqlValue::from_json(map.get("value").unwrap_or(&Value::Null)).map(Expr::Value)
            }
        })
    }

    /// Parses a sequence of expressions.
    fn expr_items(&mut self, node: &Value, clause: &'static str) -> Result<Vec<Expr>> {
        array(clause, node)?.iter().map(|item| self.expr(item)).collect()
    }

    /// Parses a clause list; a lone expression counts as a one-item list.
    fn expr_list(&mut self, node: &Value, clause: &'static str) -> Result<Vec<Expr>> {
        if node.is_array() {
            self.expr_items(node, clause)
        } else {
            Ok(vec![self.expr(node)?])
        }
    }

    fn required_expr(
        &mut self,
        clause: &'static str,
        map: &Map<String, Value>,
        keys: &[&str],
    ) -> Result<Expr> {
        let node = field(map, keys).ok_or_else(|| {
            BuildError::malformed(clause, format!("requires '{}'", keys.join("' or '")))
        })?;
        self.expr(node)
    }

    fn optional_expr(&mut self, map: &Map<String, Value>, key: &str) -> Result<Option<Expr>> {
        field(map, &[key]).map(|node| self.expr(node)).transpose()
    }

    fn function(&mut self, map: &Map<String, Value>) -> Result<Expr> {
        let name = FunctionName::parse(&required_string("function", map, "function_name")?)?;
        let args = match field(map, &["args"]) {
            Some(node) => self.expr_items(node, "function")?,
            None => Vec::new(),
        };
        Ok(Expr::Function(FunctionCall {
            name,
            args,
            schema: identifier("function", map, "schema_name")?,
        }))
    }

    fn operation(&mut self, map: &Map<String, Value>) -> Result<Expr> {
        let operator = Operator::parse(&required_string("operator", map, "operator")?)?;
        let operation = match operator.kind() {
            OperatorKind::Infix => Operation::Infix {
                operator,
                operands: self.infix_operands(operator, map)?,
            },
            OperatorKind::Logical => Operation::Logical {
                operator,
                operands: self.infix_operands(operator, map)?,
            },
            OperatorKind::Mixed => {
                let binary = field(map, &["expressions"]).is_some()
                    || (field(map, &["left"]).is_some() && field(map, &["right"]).is_some());
                if binary {
                    Operation::Infix {
                        operator,
                        operands: self.infix_operands(operator, map)?,
                    }
                } else {
                    Operation::Prefix {
                        operator,
                        operand: self.prefix_operand(operator, map)?,
                    }
                }
            }
            OperatorKind::Prefix => Operation::Prefix {
                operator,
                operand: self.prefix_operand(operator, map)?,
            },
            OperatorKind::Between => Operation::Between {
                expression: self.required_expr("BETWEEN", map, &["expression"])?,
                low: self.required_expr("BETWEEN", map, &["low", "left"])?,
                high: self.required_expr("BETWEEN", map, &["high", "right"])?,
                symmetric: flag("BETWEEN", map, "symmetric")?.unwrap_or(false),
            },
            OperatorKind::Cast => Operation::Cast(self.cast(map)?),
            OperatorKind::In => {
                let left = self.required_expr("IN", map, &["left"])?;
                let right = match field(map, &["right"]) {
                    Some(node @ Value::Array(_)) => self.expr_items(node, "IN")?,
                    Some(_) => {
                        return Err(BuildError::malformed("IN", "'right' must be a sequence"));
                    }
                    None => return Err(BuildError::malformed("IN", "requires 'right'")),
                };
                Operation::In { left, right }
            }
            OperatorKind::Is => Operation::Is {
                left: self.required_expr("IS", map, &["left"])?,
                target: is_target(map)?,
                negated: operator == Operator::IsNot,
            },
            OperatorKind::Trim => Operation::Trim {
                expression: self.required_expr("TRIM", map, &["expression"])?,
                characters: self.optional_expr(map, "characters")?,
                side: trim_side(map)?,
            },
        };
        Ok(operation.into())
    }

    fn prefix_operand(&mut self, operator: Operator, map: &Map<String, Value>) -> Result<Expr> {
        self.required_expr(operator_name(operator), map, &["operand", "left"])
    }

    fn infix_operands(
        &mut self,
        operator: Operator,
        map: &Map<String, Value>,
    ) -> Result<Vec<Expr>> {
        if let Some(node) = field(map, &["expressions"]) {
            return self.expr_items(node, operator_name(operator));
        }
        match (field(map, &["left"]), field(map, &["right"])) {
            (Some(left), Some(right)) => Ok(vec![self.expr(left)?, self.expr(right)?]),
            _ => Err(BuildError::malformed(
                operator_name(operator),
                "requires 'left' and 'right', or 'expressions'",
            )),
        }
    }

    fn cast(&mut self, map: &Map<String, Value>) -> Result<Cast> {
        let expression = self.required_expr("CAST", map, &["expression"])?;
        let target = CastType::parse(&required_string("CAST", map, "type")?)?;
        let interval = string("CAST", map, "interval")?
            .map(|token| IntervalField::parse(&token))
            .transpose()?;
        Ok(Cast {
            expression,
            target,
            interval,
            varying: flag("CAST", map, "varying")?.unwrap_or(false),
            length: unsigned("CAST", map, "length")?,
            precision: unsigned("CAST", map, "precision")?,
            scale: unsigned("CAST", map, "scale")?,
            with_time_zone: flag("CAST", map, "with_time_zone")?,
        })
    }

    // ------------------------------------------------------------------
    // Statements
    // ------------------------------------------------------------------

    fn statement(&mut self, node: &Value) -> Result<StatementSpec> {
        self.nested(|p| {
            let map = object("statement", node)?;
            if let Some(key) = map
                .keys()
                .find(|key| !STATEMENT_KEYS.iter().any(|names| names.contains(&key.as_str())))
            {
                return Err(BuildError::malformed(
                    "statement",
                    format!("unknown clause '{key}'"),
                ));
            }

            let mut spec = StatementSpec::default();
            if let Some(node) = field(map, &["combine"]) {
                spec.combine = Some(p.items(node, "COMBINE", Self::combine_item)?);
            }
            if let Some(node) = field(map, &["with"]) {
                spec.with = Some(p.items(node, "WITH", Self::with_item)?);
            }
            spec.delete = !matches!(field(map, &["delete"]), None | Some(Value::Bool(false)));
            if let Some(node) = field(map, &["insert"]) {
                spec.insert = Some(insert_target(object("INSERT", node)?)?);
            }
            if let Some(node) = field(map, &["select"]) {
                spec.select = Some(p.items(node, "SELECT", Self::select_item)?);
            }
            if let Some(node) = field(map, &["update"]) {
                spec.update = Some(p.update_target(object("UPDATE", node)?)?);
            }
            if let Some(node) = field(map, &["values"]) {
                spec.values = Some(p.items(node, "VALUES", |p, row| {
                    if row.is_array() {
                        p.expr_items(row, "VALUES")
                    } else {
                        Err(BuildError::malformed("VALUES", "each row must be a sequence"))
                    }
                })?);
            }
            if let Some(node) = field(map, &["from"]) {
                spec.from = Some(p.items(node, "FROM", Self::from_item)?);
            }
            if let Some(node) = field(map, &["where"]) {
                spec.where_ = Some(p.expr_list(node, "WHERE")?);
            }
            if let Some(node) = field(map, &["group_by", "group by"]) {
                spec.group_by = Some(p.expr_list(node, "GROUP BY")?);
            }
            if let Some(node) = field(map, &["having"]) {
                spec.having = Some(p.expr_list(node, "HAVING")?);
            }
            if let Some(node) = field(map, &["order_by", "order by"]) {
                spec.order_by = Some(p.items(node, "ORDER BY", Self::order_by_item)?);
            }
            if let Some(node) = field(map, &["limit"]) {
                spec.limit = Some(p.single_expr(node, "LIMIT")?);
            }
            if let Some(node) = field(map, &["offset"]) {
                spec.offset = Some(p.single_expr(node, "OFFSET")?);
            }
            if let Some(node) = field(map, &["returning"]) {
                spec.returning = Some(p.expr_list(node, "RETURNING")?);
            }
            Ok(spec)
        })
    }

    fn single_expr(&mut self, node: &Value, clause: &'static str) -> Result<Expr> {
        if node.is_array() {
            return Err(BuildError::malformed(clause, "takes a single expression"));
        }
        self.expr(node)
    }

    fn items<T>(
        &mut self,
        node: &Value,
        clause: &'static str,
        mut item: impl FnMut(&mut Self, &Value) -> Result<T>,
    ) -> Result<Vec<T>> {
        array(clause, node)?
            .iter()
            .map(|node| item(self, node))
            .collect()
    }

    fn sub_query(
        &mut self,
        clause: &'static str,
        map: &Map<String, Value>,
    ) -> Result<StatementSpec> {
        let node = field(map, SUB_QUERY)
            .ok_or_else(|| BuildError::malformed(clause, "requires 'sub_query'"))?;
        self.statement(node)
    }

    fn combine_item(&mut self, node: &Value) -> Result<CombineItem> {
        let map = object("COMBINE", node)?;
        Ok(CombineItem {
            sub_query: self.sub_query("COMBINE", map)?,
            kind: string("COMBINE", map, "type")?
                .map(|token| CombineKind::parse(&token))
                .transpose()?,
            all: flag("COMBINE", map, "all")?,
        })
    }

    fn with_item(&mut self, node: &Value) -> Result<WithItem> {
        let map = object("WITH", node)?;
        Ok(WithItem {
            name: required_identifier("WITH", map, "name")?,
            columns: identifier_list("WITH", map, "columns")?,
            sub_query: self.sub_query("WITH", map)?,
            materialized: flag("WITH", map, "materialized")?,
            recursive: flag("WITH", map, "recursive")?.unwrap_or(false),
        })
    }

    fn select_item(&mut self, node: &Value) -> Result<SelectItem> {
        let alias = match node {
            Value::Object(map) => identifier("SELECT", map, "alias")?,
            _ => None,
        };
        Ok(SelectItem {
            expr: self.expr(node)?,
            alias,
        })
    }

    fn update_target(&mut self, map: &Map<String, Value>) -> Result<UpdateTarget> {
        let table = required_identifier("UPDATE", map, "table")?;
        let set = match field(map, &["set"]) {
            Some(Value::Object(assignments)) => assignments
                .iter()
                .map(|(column, value)| {
                    Ok(Assignment {
                        column: non_empty_identifier("UPDATE", "set", column.clone())?,
                        value: self.expr(value)?,
                    })
                })
                .collect::<Result<Vec<_>>>()?,
            Some(_) => return Err(BuildError::malformed("UPDATE", "'set' must be a mapping")),
            None => return Err(BuildError::malformed("UPDATE", "requires 'set'")),
        };
        Ok(UpdateTarget {
            table,
            alias: identifier("UPDATE", map, "alias")?,
            set,
        })
    }

    fn from_item(&mut self, node: &Value) -> Result<FromItem> {
        let map = object("FROM", node)?;
        let table = identifier("FROM", map, "table")?;
        let source = match (table, field(map, SUB_QUERY)) {
            (Some(table), None) => FromSource::Table(table),
            (None, Some(sub)) => FromSource::SubQuery(Box::new(self.statement(sub)?)),
            (Some(_), Some(_)) => {
                return Err(BuildError::malformed(
                    "FROM",
                    "item cannot have both 'table' and 'sub_query'",
                ));
            }
            (None, None) => {
                return Err(BuildError::malformed(
                    "FROM",
                    "item requires 'table' or 'sub_query'",
                ));
            }
        };
        Ok(FromItem {
            source,
            alias: identifier("FROM", map, "alias")?,
            kind: string("FROM", map, "type")?
                .map(|token| JoinKind::parse(&token))
                .transpose()?,
            on: field(map, &["on"])
                .map(|node| self.expr_list(node, "ON"))
                .transpose()?,
        })
    }

    fn order_by_item(&mut self, node: &Value) -> Result<OrderByItem> {
        let Value::Object(map) = node else {
            return Ok(OrderByItem::asc(self.expr(node)?));
        };
        let expr = match field(map, &["expression"]) {
            Some(inner) if !map.contains_key("operator") => self.expr(inner)?,
            _ => self.expr(node)?,
        };
        Ok(OrderByItem {
            expr,
            direction: string("ORDER BY", map, "direction")?
                .map_or(Ok(Direction::Asc), |token| Direction::parse(&token))?,
            nulls: string("ORDER BY", map, "nulls")?
                .map(|token| NullsOrder::parse(&token))
                .transpose()?,
        })
    }
}

// ----------------------------------------------------------------------
// Field helpers
// ----------------------------------------------------------------------

/// Returns the first present, non-null field among `keys`.
fn field<'a>(map: &'a Map<String, Value>, keys: &[&str]) -> Option<&'a Value> {
    keys.iter()
        .filter_map(|key| map.get(*key))
        .find(|value| !value.is_null())
}

fn object<'a>(clause: &'static str, node: &'a Value) -> Result<&'a Map<String, Value>> {
    node.as_object()
        .ok_or_else(|| BuildError::malformed(clause, format!("expected a mapping, found {node}")))
}

fn array<'a>(clause: &'static str, node: &'a Value) -> Result<&'a Vec<Value>> {
    node.as_array()
        .ok_or_else(|| BuildError::malformed(clause, format!("expected a sequence, found {node}")))
}

fn string(clause: &'static str, map: &Map<String, Value>, key: &str) -> Result<Option<String>> {
    match field(map, &[key]) {
        None => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.clone())),
        Some(_) => Err(BuildError::malformed(
            clause,
            format!("'{key}' must be a string"),
        )),
    }
}

fn required_string(clause: &'static str, map: &Map<String, Value>, key: &str) -> Result<String> {
    string(clause, map, key)?
        .ok_or_else(|| BuildError::malformed(clause, format!("requires '{key}'")))
}

/// Checks that an identifier is not empty; `""` is not a valid name.
fn non_empty_identifier(clause: &'static str, key: &str, name: String) -> Result<String> {
    if name.is_empty() {
        return Err(BuildError::malformed(
            clause,
            format!("'{key}' cannot be an empty name"),
        ));
    }
    Ok(name)
}

fn identifier(
    clause: &'static str,
    map: &Map<String, Value>,
    key: &str,
) -> Result<Option<String>> {
    string(clause, map, key)?
        .map(|name| non_empty_identifier(clause, key, name))
        .transpose()
}

fn required_identifier(
    clause: &'static str,
    map: &Map<String, Value>,
    key: &str,
) -> Result<String> {
    identifier(clause, map, key)?
        .ok_or_else(|| BuildError::malformed(clause, format!("requires '{key}'")))
}

fn identifier_list(
    clause: &'static str,
    map: &Map<String, Value>,
    key: &str,
) -> Result<Option<Vec<String>>> {
    let Some(node) = field(map, &[key]) else {
        return Ok(None);
    };
    array(clause, node)?
        .iter()
        .map(|item| {
            let name = item.as_str().ok_or_else(|| {
                BuildError::malformed(clause, format!("'{key}' must contain only strings"))
            })?;
            non_empty_identifier(clause, key, name.to_owned())
        })
        .collect::<Result<Vec<_>>>()
        .map(Some)
}

fn flag(clause: &'static str, map: &Map<String, Value>, key: &str) -> Result<Option<bool>> {
    match field(map, &[key]) {
        None => Ok(None),
        Some(Value::Bool(b)) => Ok(Some(*b)),
        Some(_) => Err(BuildError::malformed(
            clause,
            format!("'{key}' must be a boolean"),
        )),
    }
}

fn unsigned(clause: &'static str, map: &Map<String, Value>, key: &str) -> Result<Option<u32>> {
    match field(map, &[key]) {
        None => Ok(None),
        Some(Value::Number(n)) => n
            .as_u64()
            .and_then(|n| u32::try_from(n).ok())
            .map(Some)
            .ok_or_else(|| {
                BuildError::malformed(clause, format!("'{key}' must be a non-negative integer"))
            }),
        Some(_) => Err(BuildError::malformed(
            clause,
            format!("'{key}' must be a non-negative integer"),
        )),
    }
}

fn column(map: &Map<String, Value>) -> Result<Expr> {
    Ok(Expr::Column(ColumnRef {
        correlation: identifier("column", map, "correlation")?,
        name: required_identifier("column", map, "column")?,
    }))
}

fn default_marker(map: &Map<String, Value>) -> Result<Expr> {
    match map.get("default") {
        Some(Value::Bool(true)) => Ok(Expr::Default),
        _ => Err(BuildError::malformed("default", "'default' must be true")),
    }
}

fn insert_target(map: &Map<String, Value>) -> Result<InsertTarget> {
    Ok(InsertTarget {
        table: required_identifier("INSERT", map, "table")?,
        alias: identifier("INSERT", map, "alias")?,
        columns: identifier_list("INSERT", map, "columns")?,
    })
}

/// Reads the right-hand side of IS. Unlike other fields an explicit null
/// is meaningful here, so the raw map is consulted.
fn is_target(map: &Map<String, Value>) -> Result<IsTarget> {
    match map.get("right") {
        None => Ok(IsTarget::Unknown),
        Some(Value::Null) => Ok(IsTarget::Null),
        Some(Value::Bool(b)) => Ok(IsTarget::from_bool(*b)),
        Some(other) => Err(BuildError::malformed(
            "IS",
            format!("unsupported right-hand side {other}"),
        )),
    }
}

fn trim_side(map: &Map<String, Value>) -> Result<Option<TrimSide>> {
    for (key, side) in [
        ("both", TrimSide::Both),
        ("trailing", TrimSide::Trailing),
        ("leading", TrimSide::Leading),
    ] {
        if flag("TRIM", map, key)?.unwrap_or(false) {
            return Ok(Some(side));
        }
    }
    Ok(None)
}

const fn operator_name(operator: Operator) -> &'static str {
    operator.as_str()
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_bare_scalars_become_values() {
        assert_eq!(Expr::from_value(&json!(5)), Ok(Expr::value(5)));
        assert_eq!(Expr::from_value(&json!(null)), Ok(Expr::Value(SqlValue::Null)));
    }

    #[test]
    fn test_column_with_correlation() {
        assert_eq!(
            Expr::from_value(&json!({"column": "id", "correlation": "u"})),
            Ok(Expr::qualified("u", "id"))
        );
    }

    #[test]
    fn test_value_rejects_containers() {
        assert!(matches!(
            Expr::from_value(&json!({"value": [1, 2]})),
            Err(BuildError::UnsupportedValueType(_))
        ));
    }

    #[test]
    fn test_default_must_be_true() {
        assert_eq!(Expr::from_value(&json!({"default": true})), Ok(Expr::Default));
        assert!(matches!(
            Expr::from_value(&json!({"default": "yes"})),
            Err(BuildError::MalformedClause { .. })
        ));
    }

    #[test]
    fn test_mixed_operator_shapes() {
        let binary = Expr::from_value(&json!({
            "operator": "-", "left": {"value": 3}, "right": {"value": 1}
        }))
        .unwrap();
        assert!(matches!(
            binary,
            Expr::Operation(ref op) if matches!(**op, Operation::Infix { .. })
        ));

        let unary = Expr::from_value(&json!({"operator": "-", "operand": {"value": 1}})).unwrap();
        assert!(matches!(
            unary,
            Expr::Operation(ref op) if matches!(**op, Operation::Prefix { .. })
        ));

        assert!(matches!(
            Expr::from_value(&json!({"operator": "+"})),
            Err(BuildError::MalformedClause { clause: "+", .. })
        ));
    }

    #[test]
    fn test_logical_operator_keeps_its_variant() {
        let expr = Expr::from_value(&json!({
            "operator": "or",
            "expressions": [{"column": "a"}, {"column": "b"}]
        }))
        .unwrap();
        assert_eq!(expr, Expr::or(vec![Expr::column("a"), Expr::column("b")]));
    }

    #[test]
    fn test_in_requires_sequence() {
        assert!(matches!(
            Expr::from_value(&json!({
                "operator": "IN", "left": {"column": "a"}, "right": {"value": 1}
            })),
            Err(BuildError::MalformedClause { clause: "IN", .. })
        ));
    }

    #[test]
    fn test_is_right_hand_side() {
        let parse = |right: Option<Value>| {
            let mut node = json!({"operator": "IS", "left": {"column": "a"}});
            if let Some(right) = right {
                node["right"] = right;
            }
            Expr::from_value(&node)
        };
        assert_eq!(parse(None), Ok(Expr::column("a").is(IsTarget::Unknown)));
        assert_eq!(parse(Some(json!(null))), Ok(Expr::column("a").is(IsTarget::Null)));
        assert_eq!(parse(Some(json!(true))), Ok(Expr::column("a").is(IsTarget::True)));
        assert!(matches!(
            parse(Some(json!("maybe"))),
            Err(BuildError::MalformedClause { clause: "IS", .. })
        ));
    }

    #[test]
    fn test_trim_side_precedence() {
        let expr = Expr::from_value(&json!({
            "operator": "TRIM", "expression": {"column": "a"},
            "leading": true, "trailing": true
        }))
        .unwrap();
        assert!(matches!(
            expr,
            Expr::Operation(ref op)
                if matches!(**op, Operation::Trim { side: Some(TrimSide::Trailing), .. })
        ));
    }

    #[test]
    fn test_cast_rejects_negative_length() {
        assert!(matches!(
            Expr::from_value(&json!({
                "operator": "CAST", "expression": {"value": 1}, "type": "CHARACTER", "length": -1
            })),
            Err(BuildError::MalformedClause { clause: "CAST", .. })
        ));
    }

    #[test]
    fn test_statement_rejects_unknown_clause() {
        assert!(matches!(
            StatementSpec::from_value(&json!({"select": [1], "wher": []})),
            Err(BuildError::MalformedClause { clause: "statement", .. })
        ));
    }

    #[test]
    fn test_statement_accepts_spaced_keys() {
        let spec = StatementSpec::from_value(&json!({
            "select": [{"column": "a"}],
            "group by": [{"column": "a"}],
            "order by": [{"expression": {"column": "a"}, "direction": "desc"}],
        }))
        .unwrap();
        assert_eq!(spec.group_by, Some(vec![Expr::column("a")]));
        assert_eq!(
            spec.order_by,
            Some(vec![OrderByItem::desc(Expr::column("a"))])
        );
    }

    #[test]
    fn test_update_keeps_assignment_order() {
        let spec = StatementSpec::from_value(&json!({
            "update": {"table": "t", "set": {"z": {"value": 1}, "a": {"value": 2}}},
        }))
        .unwrap();
        let columns: Vec<_> = spec
            .update
            .unwrap()
            .set
            .into_iter()
            .map(|a| a.column)
            .collect();
        assert_eq!(columns, ["z", "a"]);
    }

    #[test]
    fn test_update_requires_set_mapping() {
        assert!(matches!(
            StatementSpec::from_value(&json!({"update": {"table": "t"}})),
            Err(BuildError::MalformedClause { clause: "UPDATE", .. })
        ));
        assert!(matches!(
            StatementSpec::from_value(&json!({"update": {"table": "t", "set": []}})),
            Err(BuildError::MalformedClause { clause: "UPDATE", .. })
        ));
    }

    #[test]
    fn test_insert_requires_table() {
        assert!(matches!(
            StatementSpec::from_value(&json!({"insert": {"columns": ["a"]}})),
            Err(BuildError::MalformedClause { clause: "INSERT", .. })
        ));
    }

    #[test]
    fn test_empty_names_are_rejected() {
        let cases = [
            (json!({"select": [{"column": ""}]}), "column"),
            (json!({"select": [{"column": "a", "correlation": ""}]}), "column"),
            (json!({"select": [{"column": "a", "alias": ""}]}), "SELECT"),
            (json!({"select": [1], "from": [{"table": ""}]}), "FROM"),
            (json!({"select": [1], "from": [{"table": "t", "alias": ""}]}), "FROM"),
            (json!({"insert": {"table": "t", "columns": ["a", ""]}}), "INSERT"),
            (json!({"update": {"table": "t", "set": {"": 1}}}), "UPDATE"),
            (
                json!({"with": [{"name": "", "sub_query": {"select": [1]}}], "select": [1]}),
                "WITH",
            ),
        ];
        for (node, clause) in cases {
            match StatementSpec::from_value(&node) {
                Err(BuildError::MalformedClause { clause: found, .. }) => {
                    assert_eq!(found, clause, "for {node}");
                }
                other => panic!("Expected MalformedClause for {node}, got {other:?}"),
            }
        }
    }

    #[test]
    fn test_from_item_needs_exactly_one_source() {
        assert!(matches!(
            StatementSpec::from_value(&json!({"select": [1], "from": [{"alias": "x"}]})),
            Err(BuildError::MalformedClause { clause: "FROM", .. })
        ));
    }

    #[test]
    fn test_from_rejects_unknown_join_kind() {
        assert_eq!(
            StatementSpec::from_value(&json!({
                "select": [1],
                "from": [{"table": "a"}, {"table": "b", "type": "natural"}]
            })),
            Err(BuildError::UnsupportedJoinType(String::from("NATURAL")))
        );
    }

    #[test]
    fn test_depth_limit() {
        let mut node = json!({"value": 1});
        for _ in 0..10 {
            node = json!({"operator": "NOT", "operand": node});
        }
        let options = BuildOptions::new().max_depth(5);
        let spec = json!({"select": [node]});
        assert_eq!(
            StatementSpec::from_value_with(&spec, &options),
            Err(BuildError::TooDeep { limit: 5 })
        );
    }

    #[test]
    fn test_deserialize_impl() {
        let spec: StatementSpec =
            serde_json::from_str(r#"{"select": [{"column": "a", "alias": "b"}]}"#).unwrap();
        assert_eq!(
            spec.select,
            Some(vec![SelectItem::aliased(Expr::column("a"), "b")])
        );
    }
}
