//! ormql CLI - Render JSON query documents to parameterized SQL
//!
//! Usage:
//!   ormql render <query.json> [--config <ormql.toml>] [--dialect <dialect>] [--output sql|json]
//!   ormql entities [--config <ormql.toml>]
//!
//! Examples:
//!   ormql render queries/adults.json
//!   ormql render queries/adults.json --dialect postgres --output json
//!   ormql entities --config ./ormql.toml

use clap::{Parser, Subcommand, ValueEnum};
use ormql::config::Settings;
use ormql::document::QueryDocument;
use ormql::sql::Dialect;
use ormql::Db;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "ormql")]
#[command(about = "ormql - Compile typed query documents to parameterized SQL")]
#[command(version)]
struct Cli {
    /// Config file (defaults to ORMQL_CONFIG, ./ormql.toml, then the user config dir)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Render a query document to SQL and arguments
    Render {
        /// Path to the query document (.json)
        file: PathBuf,

        /// SQL dialect, overriding the configured one
        #[arg(short, long)]
        dialect: Option<DialectArg>,

        /// Output format
        #[arg(short, long, default_value = "sql")]
        output: OutputFormat,
    },

    /// List configured entities and their columns
    Entities,
}

#[derive(Clone, Copy, ValueEnum)]
enum DialectArg {
    Mysql,
    Postgres,
    Sqlite,
}

impl From<DialectArg> for Dialect {
    fn from(arg: DialectArg) -> Self {
        match arg {
            DialectArg::Mysql => Dialect::MySql,
            DialectArg::Postgres => Dialect::Postgres,
            DialectArg::Sqlite => Dialect::Sqlite,
        }
    }
}

#[derive(Clone, ValueEnum)]
enum OutputFormat {
    /// SQL followed by an args comment
    Sql,
    /// {"sql": ..., "args": [...]}
    Json,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("ormql=warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let settings = match load_settings(cli.config) {
        Ok(s) => s,
        Err(code) => return code,
    };

    match cli.command {
        Commands::Render {
            file,
            dialect,
            output,
        } => cmd_render(&settings, file, dialect, output),
        Commands::Entities => cmd_entities(&settings),
    }
}

fn load_settings(path: Option<PathBuf>) -> Result<Settings, ExitCode> {
    let loaded = match path {
        Some(path) => Settings::from_file(path),
        None => Settings::load(),
    };
    loaded.map_err(|e| {
        eprintln!("Error loading config: {}", e);
        ExitCode::FAILURE
    })
}

fn cmd_render(
    settings: &Settings,
    file: PathBuf,
    dialect: Option<DialectArg>,
    output: OutputFormat,
) -> ExitCode {
    let db = match settings.db() {
        Ok(db) => db,
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::FAILURE;
        }
    };
    let db = match dialect {
        Some(d) => Db::new(Arc::clone(db.registry()), Arc::new(Dialect::from(d))),
        None => db,
    };

    let doc = match QueryDocument::from_file(&file) {
        Ok(doc) => doc,
        Err(e) => {
            eprintln!("Error reading {}: {}", file.display(), e);
            return ExitCode::FAILURE;
        }
    };

    let query = match doc.render(&db) {
        Ok(q) => q,
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    match output {
        OutputFormat::Sql => {
            println!("{}", query.sql);
            if !query.args.is_empty() {
                let args: Vec<String> = query.args.iter().map(|a| a.to_string()).collect();
                println!("-- args: [{}]", args.join(", "));
            }
        }
        OutputFormat::Json => match serde_json::to_string_pretty(&query) {
            Ok(json) => println!("{}", json),
            Err(e) => {
                eprintln!("Error: {}", e);
                return ExitCode::FAILURE;
            }
        },
    }

    ExitCode::SUCCESS
}

fn cmd_entities(settings: &Settings) -> ExitCode {
    let registry = match settings.registry() {
        Ok(r) => r,
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    if registry.is_empty() {
        println!("No entities configured.");
        return ExitCode::SUCCESS;
    }

    for name in registry.names() {
        let Some(meta) = registry.get(&name) else {
            continue;
        };
        println!("{} ({})", name, meta.table_name);
        for (field, column) in meta.iter() {
            println!("  {} -> {}", field, column);
        }
    }

    ExitCode::SUCCESS
}
