//! btchrr command line: batched inserts into SQLite

mod config;
mod logging;
mod rows;

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use btchrr_batch::{BatchInserter, BatchOptions, Batcher, GroupSizing};
use btchrr_core::ExecutionContext;
use btchrr_driver_sqlite::SqliteExecutor;
use clap::{Parser, Subcommand, ValueEnum};

use config::Config;

#[derive(Parser)]
#[command(name = "btchrr", about = "Batch single-row inserts into multi-row statements", version)]
struct Cli {
    /// Config file (defaults to the user config directory)
    #[arg(long, global = true, env = "BTCHRR_CONFIG")]
    config: Option<PathBuf>,

    /// Log filter used when RUST_LOG is unset
    #[arg(long, global = true, env = "BTCHRR_LOG")]
    log_level: Option<String>,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    json_logs: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Args)]
struct BatchArgs {
    /// Single-row statement, e.g. "INSERT INTO t (a, b) VALUES (?, ?)"
    #[arg(long)]
    sql: String,

    /// JSON file with rows (array of arrays, or array of scalars); `-` reads stdin
    #[arg(long)]
    rows: PathBuf,

    /// Items per statement
    #[arg(long, env = "BTCHRR_BATCH_SIZE")]
    batch_size: Option<usize>,

    /// Size every statement from the batch size, including a short last one
    #[arg(long)]
    legacy_sizing: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Insert rows into a SQLite database
    Insert {
        /// Path to the SQLite database (`:memory:` for a throwaway one)
        #[arg(long, env = "BTCHRR_DATABASE")]
        database: PathBuf,

        #[command(flatten)]
        batch: BatchArgs,

        /// Skip validating the statement before inserting
        #[arg(long)]
        no_check: bool,

        /// Abort remaining batches after this many milliseconds
        #[arg(long)]
        timeout_ms: Option<u64>,

        /// Output format
        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },
    /// Print the rewritten statements without executing them
    Plan {
        #[command(flatten)]
        batch: BatchArgs,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

impl BatchArgs {
    fn apply(&self, mut options: BatchOptions) -> BatchOptions {
        if let Some(size) = self.batch_size {
            options.batch_size = size;
        }
        if self.legacy_sizing {
            options.row_sizing = GroupSizing::ConfiguredBatchSize;
        }
        options
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = Config::load(cli.config.as_deref())?;

    let filter = cli.log_level.as_deref().unwrap_or(&config.logging.level);
    logging::init(filter, cli.json_logs || config.logging.json)?;

    match cli.command {
        Commands::Insert {
            database,
            batch,
            no_check,
            timeout_ms,
            format,
        } => {
            let mut options = batch.apply(config.batch);
            if no_check {
                options.check_statement = false;
            }
            let items = rows::read_rows(&batch.rows)?;
            let executor = Arc::new(
                SqliteExecutor::open(&database)
                    .with_context(|| format!("Failed to open {}", database.display()))?,
            );
            let inserter = BatchInserter::new(options, executor)?;

            let ctx = match timeout_ms {
                Some(ms) => ExecutionContext::with_timeout(Duration::from_millis(ms)),
                None => ExecutionContext::new(),
            };
            let canceller = ctx.clone();
            tokio::spawn(async move {
                if tokio::signal::ctrl_c().await.is_ok() {
                    tracing::warn!("interrupt received, aborting the running batch");
                    canceller.cancel();
                }
            });

            let result = inserter
                .execute(&ctx, &batch.sql, &items)
                .await
                .context("Batched insert failed")?;

            match format {
                OutputFormat::Text => {
                    println!("batches:        {}", result.batches);
                    println!("affected rows:  {}", result.affected_rows);
                    match result.last_insert_id {
                        Some(id) => println!("last insert id: {}", id),
                        None => println!("last insert id: -"),
                    }
                    println!("elapsed:        {:?}", result.elapsed);
                }
                OutputFormat::Json => {
                    let out = serde_json::json!({
                        "batches": result.batches,
                        "affected_rows": result.affected_rows,
                        "last_insert_id": result.last_insert_id,
                        "elapsed_ms": result.elapsed.as_millis() as u64,
                    });
                    println!("{}", serde_json::to_string_pretty(&out)?);
                }
            }
        }
        Commands::Plan { batch } => {
            let options = batch.apply(config.batch);
            let items = rows::read_rows(&batch.rows)?;
            let batcher = Batcher::new(options)?;

            for planned in batcher.build_batches(&batch.sql, &items)? {
                println!(
                    "-- batch {} ({} rows, {} params)",
                    planned.index,
                    planned.len(),
                    planned.params().len()
                );
                println!("{}", planned.statement);
            }
        }
    }

    Ok(())
}
