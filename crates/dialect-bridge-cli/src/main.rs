//! dialect-bridge CLI - inspect per-dialect quoting, type names and decoding.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use clap::{Parser, Subcommand, ValueEnum};
use dialect_bridge::core::memory::Fixture;
use dialect_bridge::core::types::CatalogColumn;
use dialect_bridge::{AdapterConfig, BridgeError, ColumnHint, DialectCatalog, Session, Value};
use rust_decimal::Decimal;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::{info, Level};

#[derive(Parser)]
#[command(name = "dialect-bridge")]
#[command(about = "Inspect SQL dialect quoting, type names and column decoding")]
#[command(version)]
struct Cli {
    /// Path to YAML adapter configuration (supplies the dialect and options)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Output JSON instead of text
    #[arg(long)]
    output_json: bool,

    /// Log format: text or json
    #[arg(long, default_value = "text")]
    log_format: String,

    /// Log verbosity: debug, info, warn, error
    #[arg(long, default_value = "info")]
    verbosity: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List built-in dialects and their aliases
    Dialects,

    /// Render a value as a SQL literal
    Quote {
        /// Dialect name or alias (overrides the config file)
        #[arg(short, long)]
        dialect: Option<String>,

        /// How to interpret VALUE
        #[arg(long, value_enum, default_value = "text")]
        kind: ValueKind,

        /// Target column kind (integer, float, decimal, boolean, text, binary, date, time, timestamp)
        #[arg(long)]
        hint: Option<String>,

        /// Literal input value
        value: String,
    },

    /// Reconstruct a declared type name from catalog metadata
    TypeName {
        /// Dialect name or alias (overrides the config file)
        #[arg(short, long)]
        dialect: Option<String>,

        /// Base type name as reported by the catalog
        #[arg(long = "type")]
        type_name: String,

        /// Column size / precision
        #[arg(long)]
        precision: Option<i64>,

        /// Decimal digits / scale
        #[arg(long)]
        scale: Option<i32>,
    },

    /// Fold an identifier between backend and host case
    Fold {
        /// Dialect name or alias (overrides the config file)
        #[arg(short, long)]
        dialect: Option<String>,

        /// external: backend to host; internal: host to backend
        #[arg(long, value_enum, default_value = "external")]
        direction: Direction,

        /// Also print the quoted backend form
        #[arg(long)]
        quoted: bool,

        /// Identifier to fold
        name: String,
    },

    /// Decode a recorded result fixture (JSON)
    Decode {
        /// Dialect name or alias (overrides the config file)
        #[arg(short, long)]
        dialect: Option<String>,

        /// Path to the fixture file
        #[arg(long)]
        fixture: PathBuf,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum ValueKind {
    Text,
    Int,
    Float,
    Decimal,
    Bool,
    Hex,
    Null,
    Date,
    Time,
    Timestamp,
}

#[derive(Clone, Copy, ValueEnum)]
enum Direction {
    External,
    Internal,
}

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{}", e.format_detailed());
            ExitCode::from(e.exit_code())
        }
    }
}

fn run() -> Result<(), BridgeError> {
    let cli = Cli::parse();

    setup_logging(&cli.verbosity, &cli.log_format).map_err(BridgeError::Config)?;

    let catalog = DialectCatalog::with_builtins();

    match cli.command {
        Commands::Dialects => list_dialects(&catalog, cli.output_json)?,

        Commands::Quote {
            dialect,
            kind,
            hint,
            value,
        } => {
            let session = open_session(&catalog, cli.config.as_deref(), dialect)?;
            let hint = hint.map(|h| h.parse::<ColumnHint>()).transpose()?;
            let value = parse_value(kind, &value)?;
            println!("{}", session.quote(&value, hint));
        }

        Commands::TypeName {
            dialect,
            type_name,
            precision,
            scale,
        } => {
            let session = open_session(&catalog, cli.config.as_deref(), dialect)?;
            let column = CatalogColumn::new("column", type_name, precision, scale);
            println!("{}", session.reconstruct_type_name(&column));
        }

        Commands::Fold {
            dialect,
            direction,
            quoted,
            name,
        } => {
            let session = open_session(&catalog, cli.config.as_deref(), dialect)?;
            let folded = match direction {
                Direction::External => session.to_external(&name),
                Direction::Internal => session.to_internal(&name),
            };
            println!("{}", folded);
            if quoted {
                println!("{}", session.quote_ident(&session.to_internal(&name))?);
            }
        }

        Commands::Decode { dialect, fixture } => {
            let mut session = open_session(&catalog, cli.config.as_deref(), dialect)?;
            let text = std::fs::read_to_string(&fixture)?;
            let mut cursor = Fixture::from_json(&text)?.into_cursor()?;
            info!("Decoding fixture {:?}", fixture);

            let rows = session.decode_all(&mut cursor)?;
            let json = serde_json::Value::Array(rows.iter().map(|r| r.to_json()).collect());
            if cli.output_json {
                println!("{}", serde_json::to_string(&json)?);
            } else {
                println!("{}", serde_json::to_string_pretty(&json)?);
            }
        }
    }

    Ok(())
}

/// Open a session from the config file, the `--dialect` flag, or both.
fn open_session(
    catalog: &DialectCatalog,
    config_path: Option<&Path>,
    dialect: Option<String>,
) -> Result<Session, BridgeError> {
    let config = match (config_path, dialect) {
        (Some(path), dialect) => {
            let mut config = AdapterConfig::load(path)?;
            info!("Loaded configuration from {:?}", path);
            if let Some(d) = dialect {
                config.dialect = d;
            }
            config
        }
        (None, Some(d)) => AdapterConfig::for_dialect(d),
        (None, None) => {
            return Err(BridgeError::Config(
                "No dialect given (use --dialect or --config)".to_string(),
            ))
        }
    };
    Session::open(catalog, config)
}

fn list_dialects(catalog: &DialectCatalog, output_json: bool) -> Result<(), BridgeError> {
    let mut entries = Vec::new();
    for name in catalog.dialect_names() {
        let dialect = catalog.require_dialect(name)?;
        entries.push((
            name,
            catalog.aliases_of(name),
            format!("{:?}", dialect.identifier_case()).to_lowercase(),
            format!("{:?}", dialect.savepoint_strategy()).to_lowercase(),
        ));
    }

    if output_json {
        let json: Vec<_> = entries
            .iter()
            .map(|(name, aliases, case, savepoints)| {
                serde_json::json!({
                    "name": name,
                    "aliases": aliases,
                    "identifier_case": case,
                    "savepoints": savepoints,
                })
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&json)?);
    } else {
        println!("{:<10} {:<8} {:<10} ALIASES", "NAME", "CASE", "SAVEPOINTS");
        for (name, aliases, case, savepoints) in &entries {
            println!("{:<10} {:<8} {:<10} {}", name, case, savepoints, aliases.join(", "));
        }
    }
    Ok(())
}

fn parse_value(kind: ValueKind, raw: &str) -> Result<Value, BridgeError> {
    let invalid = |what: &str| BridgeError::Config(format!("Invalid {} value: {:?}", what, raw));
    let value = match kind {
        ValueKind::Text => Value::Text(raw.to_string()),
        ValueKind::Null => Value::Null,
        ValueKind::Int => Value::Integer(raw.trim().parse().map_err(|_| invalid("int"))?),
        ValueKind::Float => Value::Float(raw.trim().parse().map_err(|_| invalid("float"))?),
        ValueKind::Decimal => Value::Decimal(raw.trim().parse::<Decimal>().map_err(|_| invalid("decimal"))?),
        ValueKind::Bool => match raw.trim().to_lowercase().as_str() {
            "true" | "t" | "1" | "yes" => Value::Bool(true),
            "false" | "f" | "0" | "no" => Value::Bool(false),
            _ => return Err(invalid("bool")),
        },
        ValueKind::Hex => Value::Bytes(hex::decode(raw.trim()).map_err(|_| invalid("hex"))?),
        ValueKind::Date => Value::Date(
            NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d").map_err(|_| invalid("date"))?,
        ),
        ValueKind::Time => Value::Time(
            NaiveTime::parse_from_str(raw.trim(), "%H:%M:%S%.f").map_err(|_| invalid("time"))?,
        ),
        ValueKind::Timestamp => {
            let trimmed = raw.trim();
            let ts = NaiveDateTime::parse_from_str(trimmed, "%Y-%m-%d %H:%M:%S%.f")
                .or_else(|_| NaiveDateTime::parse_from_str(trimmed, "%Y-%m-%dT%H:%M:%S%.f"))
                .map_err(|_| invalid("timestamp"))?;
            Value::Timestamp(ts)
        }
    };
    Ok(value)
}

fn setup_logging(verbosity: &str, format: &str) -> Result<(), String> {
    let level = match verbosity.to_lowercase().as_str() {
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        other => return Err(format!("Unknown verbosity: {}", other)),
    };

    // stdout carries command output
    let subscriber = tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .with_target(false);

    match format {
        "json" => subscriber.json().init(),
        "text" => subscriber.init(),
        other => return Err(format!("Unknown log format: {}", other)),
    }

    Ok(())
}
