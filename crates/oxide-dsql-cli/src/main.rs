//! oxide-dsql CLI
//!
//! Compiles JSON statement descriptions to parameterized PostgreSQL, and
//! optionally runs them.

use std::io::Read;
use std::path::PathBuf;

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use serde_json::{json, Value};
use tracing::{debug, info, Level};
use tracing_subscriber::FmtSubscriber;

use oxide_dsql_core::options::DEFAULT_MAX_DEPTH;
use oxide_dsql_core::{executor, Assembler, BuildOptions, StatementSpec};
use oxide_dsql_sqlx::PgExecutor;

/// Declarative SQL statement compiler for PostgreSQL.
#[derive(Parser)]
#[command(name = "oxide-dsql")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Maximum nesting depth of expressions and sub-queries.
    #[arg(long, env = "OXIDE_DSQL_MAX_DEPTH", default_value_t = DEFAULT_MAX_DEPTH)]
    max_depth: usize,

    /// Enable verbose output.
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct Input {
    /// JSON statement file (stdin if not specified).
    #[arg(short, long)]
    input: Option<PathBuf>,

    /// Pretty-print the JSON output.
    #[arg(long)]
    pretty: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the command text and its parameters.
    Compile {
        #[command(flatten)]
        input: Input,

        /// Wrap the command in parentheses, as a sub-query.
        #[arg(short, long)]
        wrap: bool,
    },

    /// Run the statement and print the resulting rows.
    Run {
        #[command(flatten)]
        input: Input,

        /// Database connection string.
        #[arg(short, long, env = "DATABASE_URL")]
        database: String,

        /// Maximum pool connections.
        #[arg(long, default_value_t = 1)]
        max_connections: u32,

        /// Print the affected row count instead of rows.
        #[arg(long)]
        rows_affected: bool,
    },
}

fn read_spec(input: &Input, options: &BuildOptions) -> anyhow::Result<StatementSpec> {
    let raw = match &input.input {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?,
        None => {
            let mut raw = String::new();
            std::io::stdin()
                .read_to_string(&mut raw)
                .context("Failed to read stdin")?;
            raw
        }
    };
    let node: Value = serde_json::from_str(&raw).context("Input is not valid JSON")?;
    Ok(StatementSpec::from_value_with(&node, options)?)
}

fn print(value: &Value, pretty: bool) -> anyhow::Result<()> {
    let text = if pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    };
    println!("{text}");
    Ok(())
}

fn compiled(assembler: &Assembler, spec: &StatementSpec, wrap: bool) -> anyhow::Result<Value> {
    let (command, parameters) = assembler.build(spec, wrap)?;
    Ok(json!({"command": command, "parameters": serde_json::to_value(parameters)?}))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Logs go to stderr; stdout carries the JSON result.
    let log_level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::WARN
    };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(false)
        .without_time()
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let options = BuildOptions::new().max_depth(cli.max_depth);
    let assembler = Assembler::with_options(options);

    match cli.command {
        Commands::Compile { input, wrap } => {
            let spec = read_spec(&input, &options)?;
            print(&compiled(&assembler, &spec, wrap)?, input.pretty)?;
        }
        Commands::Run {
            input,
            database,
            max_connections,
            rows_affected,
        } => {
            let spec = read_spec(&input, &options)?;
            let pg = PgExecutor::connect(&database, max_connections).await?;
            if rows_affected {
                let count = executor::execute(&pg, &assembler, &spec).await?;
                info!(count, "Statement executed");
                print(&json!({"rows_affected": count}), input.pretty)?;
            } else {
                let rows = executor::fetch(&pg, &assembler, &spec).await?;
                debug!(rows = rows.len(), "Rows fetched");
                print(&Value::Array(rows.into_iter().map(Value::Object).collect()), input.pretty)?;
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_definition() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn test_compile_arguments() {
        let cli = Cli::try_parse_from([
            "oxide-dsql",
            "--max-depth",
            "8",
            "compile",
            "--wrap",
            "-i",
            "q.json",
        ])
        .unwrap();
        assert_eq!(cli.max_depth, 8);
        match cli.command {
            Commands::Compile { input, wrap } => {
                assert!(wrap);
                assert_eq!(input.input, Some(PathBuf::from("q.json")));
            }
            Commands::Run { .. } => panic!("expected compile"),
        }
    }

    #[test]
    fn test_compiled_output_shape() {
        let spec = StatementSpec::from_value(&json!({
            "select": [{"column": "a"}],
            "from": [{"table": "t"}],
            "where": [{"left": {"column": "a"}, "operator": "=", "right": "x"}],
        }))
        .unwrap();
        let output = compiled(&Assembler::new(), &spec, false).unwrap();
        assert_eq!(
            output,
            json!({"command": r#"SELECT "a" FROM "t" WHERE "a" = $1"#, "parameters": ["x"]})
        );
    }
}
