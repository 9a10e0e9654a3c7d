#![allow(dead_code)]

use oxide_dsql_core::{build_statement_value, BuildError, SqlValue};
use serde_json::Value;

pub fn build(node: &Value) -> (String, Vec<SqlValue>) {
    build_statement_value(node, false)
        .unwrap_or_else(|e| panic!("Failed to build: {node}\nError: {e:?}"))
}

pub fn build_sql(node: &Value) -> String {
    build(node).0
}

pub fn build_err(node: &Value) -> BuildError {
    build_statement_value(node, false).expect_err(&format!("Expected build error for: {node}"))
}

pub fn text(s: &str) -> SqlValue {
    SqlValue::Text(String::from(s))
}

/// Returns the `$n` placeholders of `sql` in order of appearance.
pub fn placeholders(sql: &str) -> Vec<usize> {
    let mut found = Vec::new();
    let mut rest = sql;
    while let Some(pos) = rest.find('$') {
        rest = &rest[pos + 1..];
        let digits: String = rest.chars().take_while(char::is_ascii_digit).collect();
        if let Ok(n) = digits.parse() {
            found.push(n);
        }
        rest = &rest[digits.len()..];
    }
    found
}

/// Asserts placeholders are exactly `$1..$n` in order, `n` being the
/// number of parameters.
pub fn assert_numbered(sql: &str, params: &[SqlValue]) {
    let expected: Vec<usize> = (1..=params.len()).collect();
    assert_eq!(placeholders(sql), expected, "placeholders of: {sql}");
}
