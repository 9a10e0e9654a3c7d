//! Per-clause emission.
//!
//! Each method emits one clause, keyword first, and checks the item rules
//! local to that clause. Chain rules go through [`crate::validate`] so the
//! assembler's upfront pass and these per-item checks cannot drift apart.

use super::expr::compile_items;
use super::{ExpressionCompiler, Fragment, StatementCompiler};
use crate::error::{BuildError, Result};
use crate::model::{
    CombineItem, Expr, FromItem, FromSource, InsertTarget, OrderByItem, SelectItem, UpdateTarget,
    WithItem,
};
use crate::validate;

fn single(clause: &'static str, expr: &Expr) -> Result<()> {
    if matches!(expr, Expr::List(_)) {
        return Err(BuildError::malformed(clause, "takes a single expression"));
    }
    Ok(())
}

fn non_empty<T>(clause: &'static str, items: &[T]) -> Result<()> {
    if items.is_empty() {
        return Err(BuildError::malformed(clause, "requires at least one item"));
    }
    Ok(())
}

/// Emits individual clauses into a [`Fragment`].
pub struct ClauseCompiler<'s, S: ?Sized> {
    exprs: ExpressionCompiler<'s, S>,
}

impl<'s, S: StatementCompiler + ?Sized> ClauseCompiler<'s, S> {
    /// Creates a clause compiler delegating sub-queries to `statements`.
    #[must_use]
    pub const fn new(statements: &'s S) -> Self {
        Self {
            exprs: ExpressionCompiler::new(statements),
        }
    }

    /// `(A) UNION ALL (B) ...`
    ///
    /// # Errors
    ///
    /// Returns [`BuildError::MalformedSequence`] for a misplaced `type` or
    /// `all`, or the first failure inside an arm.
    pub fn combine(&self, items: &[CombineItem], f: &mut Fragment<'_>) -> Result<()> {
        non_empty("COMBINE", items)?;
        for (index, item) in items.iter().enumerate() {
            validate::check_combine_item(index, items.len(), item)?;
            f.space();
            self.exprs.compile_sub_query(&item.sub_query, f)?;
            if let Some(kind) = item.kind {
                f.keyword(kind.as_str());
                f.keyword(if item.all == Some(true) { "ALL" } else { "DISTINCT" });
            }
        }
        Ok(())
    }

    /// `WITH [RECURSIVE] name [(columns)] AS [[NOT] MATERIALIZED] (query), ...`
    ///
    /// # Errors
    ///
    /// Returns [`BuildError::MalformedClause`] for an empty item or column
    /// list, or the first failure inside a sub-query.
    pub fn with(&self, items: &[WithItem], f: &mut Fragment<'_>) -> Result<()> {
        non_empty("WITH", items)?;
        f.keyword("WITH");
        if items.iter().any(|item| item.recursive) {
            f.keyword("RECURSIVE");
        }
        for (index, item) in items.iter().enumerate() {
            if index > 0 {
                f.push(",");
            }
            f.space();
            f.identifier(&item.name);
            if let Some(columns) = &item.columns {
                non_empty("WITH", columns)?;
                f.space();
                f.identifier_list(columns);
            }
            f.keyword("AS");
            match item.materialized {
                Some(true) => f.keyword("MATERIALIZED"),
                Some(false) => f.keyword("NOT MATERIALIZED"),
                None => {}
            }
            f.space();
            self.exprs.compile_sub_query(&item.sub_query, f)?;
        }
        Ok(())
    }

    /// `DELETE`; the target table comes from the FROM clause.
    #[allow(clippy::unused_self)]
    pub fn delete(&self, f: &mut Fragment<'_>) {
        f.keyword("DELETE");
    }

    /// `INSERT INTO "table" [AS "alias"] [("column", ...)]`
    ///
    /// # Errors
    ///
    /// Returns [`BuildError::MalformedClause`] for an empty column list.
    pub fn insert(&self, target: &InsertTarget, f: &mut Fragment<'_>) -> Result<()> {
        f.keyword("INSERT INTO");
        f.space();
        f.identifier(&target.table);
        alias(target.alias.as_deref(), f);
        if let Some(columns) = &target.columns {
            non_empty("INSERT", columns)?;
            f.space();
            f.identifier_list(columns);
        }
        Ok(())
    }

    /// `SELECT item [AS "alias"], ...`
    ///
    /// # Errors
    ///
    /// Returns [`BuildError::MalformedClause`] for an empty list, or the
    /// first failure inside an item.
    pub fn select(&self, items: &[SelectItem], f: &mut Fragment<'_>) -> Result<()> {
        non_empty("SELECT", items)?;
        f.keyword("SELECT ");
        compile_items(items, ", ", f, |item, f| {
            self.exprs.compile(&item.expr, f)?;
            alias(item.alias.as_deref(), f);
            Ok(())
        })
    }

    /// `UPDATE "table" [AS "alias"] SET "column" = value, ...`
    ///
    /// # Errors
    ///
    /// Returns [`BuildError::MalformedClause`] for an empty assignment list,
    /// or the first failure inside a value.
    pub fn update(&self, target: &UpdateTarget, f: &mut Fragment<'_>) -> Result<()> {
        non_empty("UPDATE", &target.set)?;
        f.keyword("UPDATE");
        f.space();
        f.identifier(&target.table);
        alias(target.alias.as_deref(), f);
        f.keyword("SET ");
        compile_items(&target.set, ", ", f, |assignment, f| {
            f.identifier(&assignment.column);
            f.push(" = ");
            self.exprs.compile(&assignment.value, f)
        })
    }

    /// `VALUES (row), (row), ...`
    ///
    /// # Errors
    ///
    /// Returns [`BuildError::MalformedClause`] for no rows or an empty row.
    pub fn values(&self, rows: &[Vec<Expr>], f: &mut Fragment<'_>) -> Result<()> {
        non_empty("VALUES", rows)?;
        f.keyword("VALUES ");
        compile_items(rows, ", ", f, |row, f| {
            non_empty("VALUES", row)?;
            self.exprs.compile_wrapped_list(row, f)
        })
    }

    /// `FROM base [AS "alias"] [KIND JOIN item [AS "alias"] [ON a AND b]] ...`
    ///
    /// # Errors
    ///
    /// Returns [`BuildError::MalformedSequence`] for a misplaced join kind
    /// or `on`, or the first failure inside an item.
    pub fn from(&self, items: &[FromItem], f: &mut Fragment<'_>) -> Result<()> {
        non_empty("FROM", items)?;
        f.keyword("FROM");
        for (index, item) in items.iter().enumerate() {
            validate::check_from_item(index, item)?;
            if let Some(kind) = item.kind {
                f.keyword(kind.as_str());
                f.keyword("JOIN");
            }
            f.space();
            match &item.source {
                FromSource::Table(table) => f.identifier(table),
                FromSource::SubQuery(spec) => self.exprs.compile_sub_query(spec, f)?,
            }
            alias(item.alias.as_deref(), f);
            if let Some(on) = &item.on {
                f.keyword("ON ");
                self.exprs.compile_list(on, " AND ", f)?;
            }
        }
        Ok(())
    }

    /// `WHERE a AND b ...`
    ///
    /// # Errors
    ///
    /// Returns [`BuildError::MalformedClause`] for an empty list, or the
    /// first failure inside a predicate.
    pub fn where_(&self, predicates: &[Expr], f: &mut Fragment<'_>) -> Result<()> {
        self.joined("WHERE", predicates, " AND ", f)
    }

    /// `GROUP BY a AND b ...`
    ///
    /// Keys are joined with `AND`, not commas.
    ///
    /// # Errors
    ///
    /// Returns [`BuildError::MalformedClause`] for an empty list, or the
    /// first failure inside a key.
    pub fn group_by(&self, keys: &[Expr], f: &mut Fragment<'_>) -> Result<()> {
        self.joined("GROUP BY", keys, " AND ", f)
    }

    /// `HAVING a AND b ...`
    ///
    /// # Errors
    ///
    /// Returns [`BuildError::MalformedClause`] for an empty list, or the
    /// first failure inside a predicate.
    pub fn having(&self, predicates: &[Expr], f: &mut Fragment<'_>) -> Result<()> {
        self.joined("HAVING", predicates, " AND ", f)
    }

    /// `ORDER BY key ASC|DESC [NULLS FIRST|LAST], ...`
    ///
    /// # Errors
    ///
    /// Returns [`BuildError::MalformedClause`] for an empty list, or the
    /// first failure inside a key.
    pub fn order_by(&self, items: &[OrderByItem], f: &mut Fragment<'_>) -> Result<()> {
        non_empty("ORDER BY", items)?;
        f.keyword("ORDER BY ");
        compile_items(items, ", ", f, |item, f| {
            self.exprs.compile(&item.expr, f)?;
            f.keyword(item.direction.as_str());
            if let Some(nulls) = item.nulls {
                f.keyword("NULLS");
                f.keyword(nulls.as_str());
            }
            Ok(())
        })
    }

    /// `LIMIT expr`
    ///
    /// # Errors
    ///
    /// Returns [`BuildError::MalformedClause`] for a sequence, or the first
    /// failure inside the expression.
    pub fn limit(&self, limit: &Expr, f: &mut Fragment<'_>) -> Result<()> {
        single("LIMIT", limit)?;
        f.keyword("LIMIT ");
        self.exprs.compile(limit, f)
    }

    /// `OFFSET expr`
    ///
    /// # Errors
    ///
    /// Returns [`BuildError::MalformedClause`] for a sequence, or the first
    /// failure inside the expression.
    pub fn offset(&self, offset: &Expr, f: &mut Fragment<'_>) -> Result<()> {
        single("OFFSET", offset)?;
        f.keyword("OFFSET ");
        self.exprs.compile(offset, f)
    }

    /// `RETURNING a, b ...`
    ///
    /// # Errors
    ///
    /// Returns [`BuildError::MalformedClause`] for an empty list, or the
    /// first failure inside an expression.
    pub fn returning(&self, items: &[Expr], f: &mut Fragment<'_>) -> Result<()> {
        self.joined("RETURNING", items, ", ", f)
    }

    fn joined(
        &self,
        clause: &'static str,
        items: &[Expr],
        joiner: &str,
        f: &mut Fragment<'_>,
    ) -> Result<()> {
        non_empty(clause, items)?;
        f.keyword(clause);
        f.space();
        self.exprs.compile_list(items, joiner, f)
    }
}

fn alias(alias: Option<&str>, f: &mut Fragment<'_>) {
    if let Some(alias) = alias {
        f.keyword("AS");
        f.space();
        f.identifier(alias);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dialect::PostgresDialect;
    use crate::model::{
        Assignment, CombineKind, Direction, JoinKind, NullsOrder, StatementSpec,
    };
    use crate::options::BuildOptions;
    use crate::value::SqlValue;

    /// Emits `Q` for every nested statement.
    struct Marker;

    impl StatementCompiler for Marker {
        fn compile_statement(&self, _spec: &StatementSpec, f: &mut Fragment<'_>) -> Result<()> {
            f.push("Q");
            Ok(())
        }
    }

    fn emit(
        build: impl FnOnce(&ClauseCompiler<'_, Marker>, &mut Fragment<'_>) -> Result<()>,
    ) -> Result<(String, Vec<SqlValue>)> {
        let dialect = PostgresDialect::new();
        let mut f = Fragment::new(&dialect, &BuildOptions::default());
        build(&ClauseCompiler::new(&Marker), &mut f)?;
        Ok(f.finish())
    }

    fn arm(kind: Option<CombineKind>, all: Option<bool>) -> CombineItem {
        CombineItem {
            sub_query: StatementSpec::default(),
            kind,
            all,
        }
    }

    #[test]
    fn test_combine() {
        let items = [
            arm(Some(CombineKind::Union), Some(true)),
            arm(Some(CombineKind::Except), None),
            arm(None, None),
        ];
        let (sql, _) = emit(|c, f| c.combine(&items, f)).unwrap();
        assert_eq!(sql, "(Q) UNION ALL (Q) EXCEPT DISTINCT (Q)");
    }

    #[test]
    fn test_with() {
        let items = [
            WithItem {
                name: String::from("a"),
                columns: Some(vec![String::from("x"), String::from("y")]),
                sub_query: StatementSpec::default(),
                materialized: Some(false),
                recursive: false,
            },
            WithItem {
                name: String::from("b"),
                columns: None,
                sub_query: StatementSpec::default(),
                materialized: None,
                recursive: true,
            },
        ];
        let (sql, _) = emit(|c, f| c.with(&items, f)).unwrap();
        assert_eq!(
            sql,
            "WITH RECURSIVE \"a\" (\"x\", \"y\") AS NOT MATERIALIZED (Q), \"b\" AS (Q)"
        );
    }

    #[test]
    fn test_insert_with_alias() {
        let target = InsertTarget {
            table: String::from("t"),
            alias: Some(String::from("x")),
            columns: Some(vec![String::from("a")]),
        };
        let (sql, _) = emit(|c, f| c.insert(&target, f)).unwrap();
        assert_eq!(sql, "INSERT INTO \"t\" AS \"x\" (\"a\")");
    }

    #[test]
    fn test_select_aliases() {
        let items = [
            SelectItem::aliased(Expr::column("a"), "b"),
            SelectItem::new(Expr::value(1)),
        ];
        let (sql, params) = emit(|c, f| c.select(&items, f)).unwrap();
        assert_eq!(sql, "SELECT \"a\" AS \"b\", $1");
        assert_eq!(params, [SqlValue::Int(1)]);
        assert!(matches!(
            emit(|c, f| c.select(&[], f)),
            Err(BuildError::MalformedClause { clause: "SELECT", .. })
        ));
    }

    #[test]
    fn test_update_set() {
        let target = UpdateTarget {
            table: String::from("t"),
            alias: None,
            set: vec![
                Assignment::new("a", Expr::value(1)),
                Assignment::new("b", Expr::Default),
            ],
        };
        let (sql, _) = emit(|c, f| c.update(&target, f)).unwrap();
        assert_eq!(sql, "UPDATE \"t\" SET \"a\" = $1, \"b\" = DEFAULT");
    }

    #[test]
    fn test_values_rows() {
        let rows = [vec![Expr::value(1), Expr::value(2)], vec![Expr::value(3), Expr::Default]];
        let (sql, params) = emit(|c, f| c.values(&rows, f)).unwrap();
        assert_eq!(sql, "VALUES ($1, $2), ($3, DEFAULT)");
        assert_eq!(params.len(), 3);
        assert!(emit(|c, f| c.values(&[vec![]], f)).is_err());
    }

    #[test]
    fn test_from_joins() {
        let on = vec![
            Expr::qualified("a", "id").eq(Expr::qualified("b", "a_id")),
            Expr::qualified("b", "live").eq(Expr::value(true)),
        ];
        let items = [
            FromItem::table("t1").alias("a"),
            FromItem::table("t2").alias("b").join(JoinKind::Left, Some(on)),
            FromItem {
                source: FromSource::SubQuery(Box::default()),
                alias: Some(String::from("c")),
                kind: Some(JoinKind::Cross),
                on: None,
            },
        ];
        let (sql, _) = emit(|c, f| c.from(&items, f)).unwrap();
        assert_eq!(
            sql,
            concat!(
                r#"FROM "t1" AS "a" LEFT JOIN "t2" AS "b""#,
                r#" ON "a"."id" = "b"."a_id" AND "b"."live" = $1"#,
                r#" CROSS JOIN (Q) AS "c""#,
            )
        );
    }

    #[test]
    fn test_group_by_keeps_and_joiner() {
        let keys = [Expr::column("a"), Expr::column("b")];
        let (sql, _) = emit(|c, f| c.group_by(&keys, f)).unwrap();
        assert_eq!(sql, "GROUP BY \"a\" AND \"b\"");
    }

    #[test]
    fn test_order_by() {
        let items = [
            OrderByItem::asc(Expr::column("a")),
            OrderByItem {
                expr: Expr::column("b"),
                direction: Direction::Desc,
                nulls: Some(NullsOrder::Last),
            },
        ];
        let (sql, _) = emit(|c, f| c.order_by(&items, f)).unwrap();
        assert_eq!(sql, "ORDER BY \"a\" ASC, \"b\" DESC NULLS LAST");
    }

    #[test]
    fn test_limit_offset_returning() {
        let (sql, params) = emit(|c, f| {
            c.limit(&Expr::value(10), f)?;
            c.offset(&Expr::value(20), f)?;
            c.returning(&[Expr::column("id")], f)
        })
        .unwrap();
        assert_eq!(sql, "LIMIT $1 OFFSET $2 RETURNING \"id\"");
        assert_eq!(params, [SqlValue::Int(10), SqlValue::Int(20)]);
    }

    #[test]
    fn test_limit_and_offset_take_one_expression() {
        let pair = Expr::List(vec![Expr::value(1), Expr::value(2)]);
        assert!(matches!(
            emit(|c, f| c.limit(&pair, f)),
            Err(BuildError::MalformedClause { clause: "LIMIT", .. })
        ));
        assert!(matches!(
            emit(|c, f| c.offset(&pair, f)),
            Err(BuildError::MalformedClause { clause: "OFFSET", .. })
        ));
    }
}
