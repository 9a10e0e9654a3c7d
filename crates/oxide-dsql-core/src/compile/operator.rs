//! Operator sub-grammars.

use super::{ExpressionCompiler, Fragment, StatementCompiler};
use crate::error::{BuildError, Result};
use crate::model::{Cast, Expr, Operation, Operator, TrimSide};
use crate::validate;

impl<S: StatementCompiler + ?Sized> ExpressionCompiler<'_, S> {
    pub(super) fn compile_operation(
        &self,
        operation: &Operation,
        f: &mut Fragment<'_>,
    ) -> Result<()> {
        match operation {
            Operation::Infix { operator, operands } => self.compile_infix(*operator, operands, f),
            Operation::Prefix { operator, operand } => self.compile_prefix(*operator, operand, f),
            Operation::Logical { operator, operands } => {
                self.compile_logical(*operator, operands, f)
            }
            Operation::Between {
                expression,
                low,
                high,
                symmetric,
            } => {
                self.compile(expression, f)?;
                f.keyword("BETWEEN");
                if *symmetric {
                    f.keyword("SYMMETRIC");
                }
                f.space();
                self.compile(low, f)?;
                f.keyword("AND ");
                self.compile(high, f)
            }
            Operation::Cast(cast) => self.compile_cast(cast, f),
            Operation::In { left, right } => {
                if right.is_empty() {
                    return Err(BuildError::malformed(
                        "IN",
                        "right-hand side requires at least one item",
                    ));
                }
                self.compile(left, f)?;
                f.keyword("IN ");
                self.compile_wrapped_list(right, f)
            }
            Operation::Is {
                left,
                target,
                negated,
            } => {
                self.compile(left, f)?;
                f.keyword(if *negated { "IS NOT" } else { "IS" });
                f.keyword(target.as_str());
                Ok(())
            }
            Operation::Trim {
                expression,
                characters,
                side,
            } => self.compile_trim(expression, characters.as_ref(), *side, f),
        }
    }

    fn compile_infix(
        &self,
        operator: Operator,
        operands: &[Expr],
        f: &mut Fragment<'_>,
    ) -> Result<()> {
        if !operator.is_infix() {
            return Err(BuildError::malformed(
                operator.as_str(),
                "is not an infix operator",
            ));
        }
        if operands.len() < 2 {
            return Err(BuildError::malformed(
                operator.as_str(),
                "requires at least two operands",
            ));
        }
        let joiner = format!(" {operator} ");
        self.compile_list(operands, &joiner, f)
    }

    fn compile_prefix(
        &self,
        operator: Operator,
        operand: &Expr,
        f: &mut Fragment<'_>,
    ) -> Result<()> {
        if !operator.is_prefix() {
            return Err(BuildError::malformed(
                operator.as_str(),
                "is not a prefix operator",
            ));
        }
        // Always separated: `-` followed by a negated operand would open a
        // `--` line comment.
        f.push(operator.as_str());
        f.push(" ");
        self.compile(operand, f)
    }

    fn compile_logical(
        &self,
        operator: Operator,
        operands: &[Expr],
        f: &mut Fragment<'_>,
    ) -> Result<()> {
        if !matches!(operator, Operator::And | Operator::Or) {
            return Err(BuildError::malformed(
                operator.as_str(),
                "is not a logical operator",
            ));
        }
        if operands.is_empty() {
            return Err(BuildError::malformed(
                operator.as_str(),
                "requires at least one operand",
            ));
        }
        let joiner = format!(" {operator} ");
        f.push("(");
        self.compile_list(operands, &joiner, f)?;
        f.push(")");
        Ok(())
    }

    fn compile_cast(&self, cast: &Cast, f: &mut Fragment<'_>) -> Result<()> {
        validate::check_cast(cast)?;
        f.push("CAST(");
        self.compile(&cast.expression, f)?;
        f.keyword("AS");
        f.keyword(cast.target.as_str());
        if let Some(interval) = cast.interval {
            f.keyword(interval.as_str());
        }
        if cast.varying {
            f.keyword("VARYING");
        }
        match (cast.length, cast.precision, cast.scale) {
            (Some(length), _, _) => f.push(&format!("({length})")),
            (None, Some(precision), Some(scale)) => f.push(&format!("({precision}, {scale})")),
            (None, Some(precision), None) => f.push(&format!("({precision})")),
            (None, None, _) => {}
        }
        match cast.with_time_zone {
            Some(true) => f.keyword("WITH TIME ZONE"),
            Some(false) => f.keyword("WITHOUT TIME ZONE"),
            None => {}
        }
        f.push(")");
        Ok(())
    }

    fn compile_trim(
        &self,
        expression: &Expr,
        characters: Option<&Expr>,
        side: Option<TrimSide>,
        f: &mut Fragment<'_>,
    ) -> Result<()> {
        f.push("TRIM(");
        if let Some(side) = side {
            f.keyword(side.as_str());
        }
        if let Some(characters) = characters {
            f.space();
            self.compile(characters, f)?;
        }
        f.keyword("FROM ");
        self.compile(expression, f)?;
        f.push(")");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dialect::PostgresDialect;
    use crate::model::{CastType, IntervalField, IsTarget, StatementSpec};
    use crate::options::BuildOptions;
    use crate::value::SqlValue;

    struct NoStatements;

    impl StatementCompiler for NoStatements {
        fn compile_statement(&self, _spec: &StatementSpec, _f: &mut Fragment<'_>) -> Result<()> {
            Ok(())
        }
    }

    fn compile(expr: &Expr) -> Result<(String, Vec<SqlValue>)> {
        let dialect = PostgresDialect::new();
        let mut f = Fragment::new(&dialect, &BuildOptions::default());
        ExpressionCompiler::new(&NoStatements).compile(expr, &mut f)?;
        Ok(f.finish())
    }

    fn sql(expr: &Expr) -> String {
        compile(expr).unwrap().0
    }

    fn op(operation: Operation) -> Expr {
        operation.into()
    }

    #[test]
    fn test_infix_chain() {
        let expr = op(Operation::Infix {
            operator: Operator::Concat,
            operands: vec![Expr::column("a"), Expr::value("-"), Expr::column("b")],
        });
        assert_eq!(sql(&expr), "\"a\" || $1 || \"b\"");
        assert!(matches!(
            compile(&op(Operation::Infix {
                operator: Operator::Eq,
                operands: vec![Expr::column("a")],
            })),
            Err(BuildError::MalformedClause { clause: "=", .. })
        ));
    }

    #[test]
    fn test_prefix_spacing() {
        let not = op(Operation::Prefix {
            operator: Operator::Not,
            operand: Expr::column("active"),
        });
        assert_eq!(sql(&not), "NOT \"active\"");
        let neg = op(Operation::Prefix {
            operator: Operator::Sub,
            operand: Expr::column("x"),
        });
        assert_eq!(sql(&neg), "- \"x\"");
        assert!(compile(&op(Operation::Prefix {
            operator: Operator::Eq,
            operand: Expr::column("x"),
        }))
        .is_err());
    }

    #[test]
    fn test_nested_negation_never_opens_a_comment() {
        let inner = op(Operation::Prefix {
            operator: Operator::Sub,
            operand: Expr::column("b"),
        });
        let outer = op(Operation::Prefix {
            operator: Operator::Sub,
            operand: inner,
        });
        let (sql, params) = compile(&Expr::column("a").eq(outer).infix(
            Operator::Concat,
            Expr::value(7),
        ))
        .unwrap();
        assert_eq!(sql, "\"a\" = - - \"b\" || $1");
        assert!(!sql.contains("--"));
        assert_eq!(params, [SqlValue::Int(7)]);
    }

    #[test]
    fn test_logical_is_parenthesized() {
        let expr = Expr::or(vec![
            Expr::column("a").eq(Expr::value(1)),
            Expr::column("b").eq(Expr::value(2)),
        ]);
        assert_eq!(sql(&expr), "(\"a\" = $1 OR \"b\" = $2)");
    }

    #[test]
    fn test_between() {
        let expr = op(Operation::Between {
            expression: Expr::column("n"),
            low: Expr::value(1),
            high: Expr::value(9),
            symmetric: true,
        });
        assert_eq!(sql(&expr), "\"n\" BETWEEN SYMMETRIC $1 AND $2");
    }

    #[test]
    fn test_cast_variants() {
        let mut cast = Cast::new(Expr::column("c"), CastType::Character);
        cast.varying = true;
        cast.length = Some(20);
        assert_eq!(
            sql(&op(Operation::Cast(cast))),
            "CAST(\"c\" AS CHARACTER VARYING(20))"
        );

        let mut cast = Cast::new(Expr::value(5.23), CastType::Decimal);
        cast.precision = Some(5);
        cast.scale = Some(2);
        assert_eq!(sql(&op(Operation::Cast(cast))), "CAST($1 AS DECIMAL(5, 2))");

        let mut cast = Cast::new(Expr::value("1 day"), CastType::Interval);
        cast.interval = Some(IntervalField::DayToSecond);
        assert_eq!(
            sql(&op(Operation::Cast(cast))),
            "CAST($1 AS INTERVAL DAY TO SECOND)"
        );

        let mut cast = Cast::new(Expr::column("t"), CastType::Timestamp);
        cast.precision = Some(3);
        cast.with_time_zone = Some(false);
        assert_eq!(
            sql(&op(Operation::Cast(cast))),
            "CAST(\"t\" AS TIMESTAMP(3) WITHOUT TIME ZONE)"
        );
    }

    #[test]
    fn test_in_and_is() {
        let expr = Expr::column("id").in_list(vec![Expr::value(1), Expr::value(2)]);
        assert_eq!(sql(&expr), "\"id\" IN ($1, $2)");
        assert!(matches!(
            compile(&Expr::column("id").in_list(vec![])),
            Err(BuildError::MalformedClause { clause: "IN", .. })
        ));

        let is_not = op(Operation::Is {
            left: Expr::column("flag"),
            target: IsTarget::from_bool(true),
            negated: true,
        });
        assert_eq!(sql(&is_not), "\"flag\" IS NOT TRUE");
        assert_eq!(
            sql(&Expr::column("x").is(IsTarget::Unknown)),
            "\"x\" IS UNKNOWN"
        );
    }

    #[test]
    fn test_trim() {
        let expr = op(Operation::Trim {
            expression: Expr::column("name"),
            characters: Some(Expr::value("x")),
            side: Some(TrimSide::Leading),
        });
        assert_eq!(sql(&expr), "TRIM(LEADING $1 FROM \"name\")");

        let bare = op(Operation::Trim {
            expression: Expr::column("name"),
            characters: None,
            side: None,
        });
        assert_eq!(sql(&bare), "TRIM(FROM \"name\")");
    }
}
