//! Command line interface
//!
//! ```text
//! docql translate "SELECT name FROM users WHERE age > 30" --pretty
//! docql run "SELECT * FROM orders LIMIT 5" --data orders.json
//! ```

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use docql_core::ParseMode;
use serde_json::Value;

use crate::config::Config;
use crate::database::Database;
use crate::store::MemoryStore;

#[derive(Parser, Debug)]
#[command(name = "docql")]
#[command(about = "Compile SQL-like queries into document-store pipelines", long_about = None)]
pub struct CliArgs {
    /// Directory holding docql.toml and .env
    #[arg(long, global = true, default_value = ".")]
    pub config: PathBuf,

    /// Reject malformed conditions, aggregates and sort clauses
    #[arg(long, global = true)]
    pub strict: bool,

    /// Debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Print the compiled pipeline of a statement
    Translate {
        /// SELECT statement
        sql: String,

        /// Pretty-print JSON output
        #[arg(long)]
        pretty: bool,
    },

    /// Run a statement against documents loaded from a JSON file
    Run {
        /// SELECT statement
        sql: String,

        /// JSON file of the form {"collection": [documents..]}
        #[arg(long)]
        data: Option<PathBuf>,

        /// Pretty-print JSON output
        #[arg(long)]
        pretty: bool,
    },
}

fn print_json(value: &Value, pretty: bool) -> anyhow::Result<()> {
    let out = if pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    };
    println!("{}", out);
    Ok(())
}

fn load_store(path: &Path) -> anyhow::Result<MemoryStore> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| anyhow::anyhow!("Cannot read data file {}: {}", path.display(), e))?;
    let data: Value = serde_json::from_str(&content)?;
    Ok(MemoryStore::from_json(data)?)
}

pub async fn execute(args: CliArgs) -> anyhow::Result<()> {
    let mut config = Config::load(&args.config)?;
    if args.strict {
        config.parse_mode = ParseMode::Strict;
    }

    match args.command {
        Command::Translate { sql, pretty } => {
            let db = Database::from_config(&config, MemoryStore::new());
            let compiled = db.compile(&sql)?;
            for condition in &compiled.degraded {
                tracing::warn!(condition = %condition, "Unparseable condition replaced by an empty filter");
            }
            print_json(&compiled.to_document(), pretty)
        }
        Command::Run { sql, data, pretty } => {
            let Some(path) = data.or_else(|| config.data_file.clone()) else {
                anyhow::bail!("No data file given. Pass --data or set data_file in docql.toml.");
            };
            let store = load_store(&path)?;
            tracing::debug!(collections = ?store.list_collections(), "Loaded data file");

            let db = Database::from_config(&config, store);
            let docs = db.sql(&sql).await?;
            print_json(&Value::Array(docs), pretty)
        }
    }
}
