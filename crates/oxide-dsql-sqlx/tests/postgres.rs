//! Round trips against a live server. Run with
//! `DATABASE_URL=postgres://... cargo test -- --ignored`.

use oxide_dsql_core::{executor, Assembler, Executor, StatementSpec};
use oxide_dsql_sqlx::PgExecutor;
use serde_json::json;

async fn raw(pg: &PgExecutor, sql: &str) {
    Executor::execute(pg, sql, &[]).await.expect(sql);
}

async fn connect() -> PgExecutor {
    let url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");
    PgExecutor::connect(&url, 1).await.expect("connect")
}

#[tokio::test]
#[ignore = "requires a PostgreSQL server in DATABASE_URL"]
async fn select_binds_every_value_type() {
    let pg = connect().await;
    let spec = StatementSpec::from_value(&json!({
        "select": [
            {"operator": "CAST", "expression": {"value": 7}, "type": "BIGINT", "alias": "i"},
            {"operator": "CAST", "expression": {"value": "x"}, "type": "TEXT", "alias": "t"},
            {"operator": "CAST", "expression": {"value": true}, "type": "BOOLEAN", "alias": "b"},
            {"operator": "CAST", "expression": {"value": null}, "type": "TEXT", "alias": "n"},
        ],
    }))
    .unwrap();
    let rows = executor::fetch(&pg, &Assembler::new(), &spec).await.unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["i"], json!(7));
    assert_eq!(rows[0]["t"], json!("x"));
    assert_eq!(rows[0]["b"], json!(true));
    assert_eq!(rows[0]["n"], json!(null));
}

#[tokio::test]
#[ignore = "requires a PostgreSQL server in DATABASE_URL"]
async fn combine_runs_on_server() {
    let pg = connect().await;
    let spec = StatementSpec::from_value(&json!({
        "combine": [
            {
                "sub_query": {"select": [
                    {"operator": "CAST", "expression": 1, "type": "INTEGER", "alias": "v"},
                ]},
                "type": "UNION",
                "all": true,
            },
            {"sub_query": {"select": [
                {"operator": "CAST", "expression": 2, "type": "INTEGER"},
            ]}},
        ],
        "order_by": [{"column": "v", "direction": "desc"}],
    }))
    .unwrap();
    let rows = executor::fetch(&pg, &Assembler::new(), &spec).await.unwrap();
    let values: Vec<_> = rows.iter().map(|row| row["v"].clone()).collect();
    assert_eq!(values, [json!(2), json!(1)]);
}

#[tokio::test]
#[ignore = "requires a PostgreSQL server in DATABASE_URL"]
async fn null_is_written_to_integer_columns() {
    let pg = connect().await;
    let assembler = Assembler::new();
    let spec = |node: serde_json::Value| StatementSpec::from_value(&node).unwrap();

    raw(&pg, "DROP TABLE IF EXISTS oxide_dsql_nulls").await;
    raw(&pg, "CREATE TABLE oxide_dsql_nulls (id int4, n int4)").await;

    let insert = spec(json!({
        "insert": {"table": "oxide_dsql_nulls", "columns": ["id", "n"]},
        "values": [[1, null], [2, 5]],
    }));
    assert_eq!(executor::execute(&pg, &assembler, &insert).await.unwrap(), 2);

    let update = spec(json!({
        "update": {"table": "oxide_dsql_nulls", "set": {"n": null}},
        "where": [{"left": {"column": "id"}, "operator": "=", "right": 2}],
    }));
    assert_eq!(executor::execute(&pg, &assembler, &update).await.unwrap(), 1);

    let select = spec(json!({
        "select": [{"column": "n"}],
        "from": [{"table": "oxide_dsql_nulls"}],
        "order_by": [{"column": "id"}],
    }));
    let rows = executor::fetch(&pg, &assembler, &select).await.unwrap();
    let values: Vec<_> = rows.iter().map(|row| row["n"].clone()).collect();
    assert_eq!(values, [json!(null), json!(null)]);

    raw(&pg, "DROP TABLE oxide_dsql_nulls").await;
}
