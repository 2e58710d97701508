//! tinytable CLI
//!
//! Command-line interface for inspecting and editing tables on disk.

use std::fs;
use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tinytable::{
    Condition, Config, Operator, Result, Row, RowStore, Schema, Table, TableError, TableKind,
    Value,
};
use tracing_subscriber::{fmt, EnvFilter};

/// tinytable CLI
#[derive(Parser, Debug)]
#[command(name = "tinytable")]
#[command(about = "Inspect and edit tinytable tables")]
#[command(version)]
struct Args {
    /// Directory holding the table files
    #[arg(short, long, default_value = "./tinytable_data")]
    data_dir: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Create a table from a JSON column list
    Create {
        /// Table name
        table: String,

        /// Engine: static or dynamic
        #[arg(short, long, default_value = "static")]
        kind: String,

        /// Path to a JSON array of {"name", "type", "size"}
        #[arg(short, long)]
        schema: PathBuf,
    },

    /// Append a row given as column=value pairs
    Insert {
        table: String,
        values: Vec<String>,
    },

    /// Replace a row given as column=value pairs
    Update {
        table: String,
        row: i64,
        values: Vec<String>,
    },

    /// Print one row
    Get { table: String, row: i64 },

    /// Tombstone one row
    Delete { table: String, row: i64 },

    /// Print every live row
    Dump { table: String },

    /// Print live rows matching column:Operator:literal conditions
    Scan {
        table: String,

        #[arg(short, long = "where")]
        conditions: Vec<String>,
    },
}

fn main() {
    // Initialize tracing/logging
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,tinytable=debug"));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let config = Config::builder().data_dir(&args.data_dir).build();

    if let Err(e) = run(&config, args.command) {
        tracing::error!("{}", e);
        std::process::exit(1);
    }
}

fn run(config: &Config, command: Commands) -> Result<()> {
    match command {
        Commands::Create {
            table,
            kind,
            schema,
        } => {
            let kind: TableKind = kind.parse()?;
            let schema = Schema::from_json(&fs::read_to_string(schema)?)?;
            Table::create(config, &table, kind, schema)?.close()?;
            tracing::info!("Created {} table '{}'", kind, table);
        }
        Commands::Insert { table, values } => {
            let mut table = Table::open(config, &table)?;
            let row = parse_row(table.schema(), &values)?;
            let n = table.insert(&row)?;
            println!("{}", n);
            table.close()?;
        }
        Commands::Update { table, row, values } => {
            let mut table = Table::open(config, &table)?;
            let values = parse_row(table.schema(), &values)?;
            table.update(row, &values)?;
            table.close()?;
        }
        Commands::Get { table, row } => {
            let mut table = Table::open(config, &table)?;
            let values = table.read_row(row)?;
            print_row(table.schema(), row, &values);
            table.close()?;
        }
        Commands::Delete { table, row } => {
            let mut table = Table::open(config, &table)?;
            table.delete_row(row)?;
            table.close()?;
        }
        Commands::Dump { table } => {
            let mut table = Table::open(config, &table)?;
            for (n, row) in table.scan(&[])? {
                print_row(table.schema(), n, &row);
            }
            table.close()?;
        }
        Commands::Scan { table, conditions } => {
            let mut table = Table::open(config, &table)?;
            let conditions = conditions
                .iter()
                .map(|c| parse_condition(table.schema(), c))
                .collect::<Result<Vec<_>>>()?;
            for (n, row) in table.scan(&conditions)? {
                print_row(table.schema(), n, &row);
            }
            table.close()?;
        }
    }
    Ok(())
}

/// Parse `column=value` pairs using each column's kind
fn parse_row(schema: &Schema, pairs: &[String]) -> Result<Row> {
    let mut row = Row::new();
    for pair in pairs {
        let (name, text) = pair
            .split_once('=')
            .ok_or_else(|| TableError::MalformedValue(format!("expected column=value, got '{}'", pair)))?;
        row.insert(name, parse_value(schema, name, text)?);
    }
    Ok(row)
}

/// Parse `column:Operator:literal`
fn parse_condition(schema: &Schema, text: &str) -> Result<Condition> {
    let mut parts = text.splitn(3, ':');
    match (parts.next(), parts.next(), parts.next()) {
        (Some(column), Some(operator), Some(literal)) => {
            let operator: Operator = operator.parse()?;
            Ok(Condition::new(
                column,
                operator,
                parse_value(schema, column, literal)?,
            ))
        }
        _ => Err(TableError::MalformedValue(format!(
            "expected column:Operator:literal, got '{}'",
            text
        ))),
    }
}

fn parse_value(schema: &Schema, column: &str, text: &str) -> Result<Value> {
    let descriptor = schema
        .column(column)
        .ok_or_else(|| TableError::Schema(format!("no column named '{}'", column)))?;
    Value::parse_as(descriptor.kind, text)
}

fn print_row(schema: &Schema, row_number: i64, row: &Row) {
    let fields: Vec<String> = schema
        .columns()
        .iter()
        .filter_map(|c| row.get(&c.name).map(|v| format!("{}={}", c.name, v)))
        .collect();
    println!("{}\t{}", row_number, fields.join(" "));
}
