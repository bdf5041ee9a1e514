//! Metrix CLI - Admin Command Line Interface
//!
//! This binary opens a Metrix index store directly and runs one command
//! against it.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use metrix_common::{IndexRecord, IndexStoreConfig};
use metrix_index_store::IndexStore;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(name = "metrix-cli")]
#[command(about = "Metrix Index Store Admin CLI")]
#[command(version)]
struct Args {
    /// Configuration file path (TOML)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Index database path, overrides the config file
    #[arg(long)]
    db: Option<PathBuf>,

    /// Print records as JSON
    #[arg(long)]
    json: bool,

    /// Log level
    #[arg(long, default_value = "warn")]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Store or overwrite an index
    Put {
        /// Metric name (e.g. timer.mean_90.api.get)
        name: String,
        /// Observation time in seconds since the epoch
        stamp: u32,
        /// Anomaly score
        score: f64,
        /// Rolling average
        average: f64,
    },
    /// Show one index
    Get {
        /// Metric name
        name: String,
    },
    /// Delete an index
    Delete {
        /// Metric name
        name: String,
    },
    /// List indexes matching a wildcard pattern (e.g. timer.*.api.*)
    Filter {
        /// Dot-separated pattern, `*` matches one segment
        pattern: String,
    },
    /// Count indexes
    Len,
    /// List all indexes
    List,
    /// Reload the store and report corrupt entries
    Check,
}

/// Build the store config from the config file and command line overrides.
fn resolve_config(config: Option<&PathBuf>, db: Option<&PathBuf>) -> Result<IndexStoreConfig> {
    let mut resolved = match config {
        Some(path) => IndexStoreConfig::from_toml_file(path)
            .with_context(|| format!("failed to load config {}", path.display()))?,
        None => IndexStoreConfig::default(),
    };
    if let Some(db) = db {
        resolved.path = db.clone();
    }
    Ok(resolved)
}

fn print_records(records: &[IndexRecord], json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(records)?);
    } else {
        for record in records {
            println!("{record}");
        }
    }
    Ok(())
}

fn run(store: &IndexStore, command: Commands, json: bool) -> Result<()> {
    match command {
        Commands::Put {
            name,
            stamp,
            score,
            average,
        } => {
            store.put(&IndexRecord::new(name, stamp, score, average))?;
        }
        Commands::Get { name } => {
            let record = store.get(&name)?;
            print_records(&[record], json)?;
        }
        Commands::Delete { name } => {
            store.delete(&name)?;
        }
        Commands::Filter { pattern } => {
            print_records(&store.filter(&pattern)?, json)?;
        }
        Commands::Len => {
            println!("{}", store.len()?);
        }
        Commands::List => {
            print_records(&store.all()?, json)?;
        }
        Commands::Check => {
            let report = store.load()?;
            println!("Loaded:  {}", report.loaded);
            println!("Corrupt: {}", report.corrupt.len());
            for entry in &report.corrupt {
                println!("  {}: {}", entry.name, entry.reason);
            }
        }
    }
    Ok(())
}

fn main() -> Result<()> {
    // Parse command line arguments
    let args = Args::parse();

    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| args.log_level.clone().into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = resolve_config(args.config.as_ref(), args.db.as_ref())?;
    info!("Using index store at {:?}", config.path);

    let store = IndexStore::open(config)?;
    let result = run(&store, args.command, args.json);
    store.close()?;
    result
}
