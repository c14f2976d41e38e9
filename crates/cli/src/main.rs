//! tododb CLI - applies schema migrations and queries todos
//!
//! Composition root: concrete SQLite adapters are constructed here and
//! passed explicitly into the core runner and repository.

mod config;
mod logging;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use std::sync::Arc;
use tabled::{Table, Tabled};
use tracing::info;

use tododb_core::application::migrate::{MigrationRunner, ReapplyPolicy};
use tododb_core::application::shutdown_channel;
use tododb_core::domain::MigrationRecord;
use tododb_core::filter::{Comparable, PatternMatch, SetMembership, TodoFilter};
use tododb_core::port::time_provider::SystemTimeProvider;
use tododb_core::port::TodoRepository;
use tododb_infra_sqlite::{
    create_pool, SqliteMigrationRecorder, SqliteStatementExecutor, SqliteTodoRepository,
};

const VERSION: &str = env!("CARGO_PKG_VERSION");

#[derive(Parser)]
#[command(name = "tododb")]
#[command(about = "tododb schema migrations and queries", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// SQLite database path or sqlx URL
    #[arg(long, env = "TODODB_DB_PATH", default_value = config::DEFAULT_DB_PATH)]
    db: String,

    /// Log format: pretty | json
    #[arg(long, env = "TODODB_LOG_FORMAT", default_value = "pretty")]
    log_format: String,
}

#[derive(Clone, Copy, ValueEnum)]
enum PolicyArg {
    /// Re-execute every file on every run
    Always,
    /// Skip files already recorded with the same hash
    SkipApplied,
}

impl From<PolicyArg> for ReapplyPolicy {
    fn from(arg: PolicyArg) -> Self {
        match arg {
            PolicyArg::Always => ReapplyPolicy::Always,
            PolicyArg::SkipApplied => ReapplyPolicy::SkipApplied,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Apply every script in the migration directory
    Migrate {
        /// Migration directory (empty = bundled scripts)
        #[arg(long, env = "TODODB_MIGRATION_PATH", default_value = "")]
        path: String,

        #[arg(long, value_enum, default_value = "always")]
        policy: PolicyArg,
    },

    /// Show the migration audit trail
    History,

    /// Find todos
    Find {
        /// Title LIKE pattern (e.g. "%11%")
        #[arg(long)]
        title_like: Option<String>,

        /// Category names (repeatable)
        #[arg(long)]
        category: Vec<String>,

        #[arg(long)]
        category_id: Option<i64>,

        #[arg(long)]
        done: Option<bool>,

        #[arg(long, default_value = "0")]
        offset: i64,

        #[arg(short = 'n', long, default_value = "10")]
        limit: i64,
    },
}

#[derive(Tabled)]
struct HistoryRow {
    id: i64,
    filename: String,
    hash: String,
    success: bool,
    applied_at: String,
}

impl From<MigrationRecord> for HistoryRow {
    fn from(record: MigrationRecord) -> Self {
        let applied_at = chrono::DateTime::<chrono::Utc>::from_timestamp_millis(record.timestamp)
            .map(|t| t.to_rfc3339())
            .unwrap_or_else(|| record.timestamp.to_string());
        Self {
            id: record.id,
            filename: record.filename,
            hash: record.hash.chars().take(16).collect(),
            success: record.success,
            applied_at,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // 1. Initialize logging
    logging::init_logging(&cli.log_format)?;
    info!("tododb v{} starting...", VERSION);

    // 2. Initialize database
    config::ensure_db_dir(&cli.db)?;
    let database_url = config::database_url(&cli.db);
    info!(database_url = %database_url, "Initializing database...");
    let pool = create_pool(&database_url)
        .await
        .with_context(|| format!("DB pool creation failed: {}", database_url))?;

    match cli.command {
        Commands::Migrate { path, policy } => {
            let dir = config::resolve_migration_dir(&path)?;

            // 3. DI wiring
            let recorder = Arc::new(SqliteMigrationRecorder::new(pool.clone()));
            recorder.ensure_table().await?;

            let (shutdown_tx, shutdown_rx) = shutdown_channel();
            tokio::spawn(async move {
                if tokio::signal::ctrl_c().await.is_ok() {
                    tracing::warn!("Shutdown signal received, stopping after current statement");
                    shutdown_tx.shutdown();
                }
            });

            let runner = MigrationRunner::new(
                Arc::new(SqliteStatementExecutor::new(pool.clone())),
                recorder,
                Arc::new(SystemTimeProvider),
            )
            .with_policy(policy.into())
            .with_shutdown(shutdown_rx);

            let report = runner
                .run(&dir)
                .await
                .with_context(|| format!("Migration failed in {}", dir.display()))?;

            println!("{}", "✓ Migrations complete".green().bold());
            for record in &report.applied {
                println!("  {} {}", "✓".green(), record.filename);
            }
            for filename in &report.skipped {
                println!("  ○ {} (already applied)", filename);
            }
        }

        Commands::History => {
            let recorder = SqliteMigrationRecorder::new(pool.clone());
            recorder.ensure_table().await?;
            let rows: Vec<HistoryRow> = recorder
                .history()
                .await?
                .into_iter()
                .map(HistoryRow::from)
                .collect();

            if rows.is_empty() {
                println!("{}", "No migrations recorded".yellow());
            } else {
                println!("{}", Table::new(rows));
            }
        }

        Commands::Find {
            title_like,
            category,
            category_id,
            done,
            offset,
            limit,
        } => {
            let mut filter = TodoFilter::new();
            if let Some(pattern) = title_like {
                filter.title().like(pattern);
            }
            if !category.is_empty() {
                filter.category().is_in(category);
            }
            if let Some(id) = category_id {
                filter.category_id().equal(id);
            }
            if let Some(done) = done {
                filter.done().equal(done);
            }

            let repo = SqliteTodoRepository::new(pool.clone());
            let (total, todos) = repo.find(Some(&filter), offset, limit).await?;

            println!(
                "{}",
                format!("{} of {} todos", todos.len(), total).cyan().bold()
            );
            println!("{}", serde_json::to_string_pretty(&todos)?);
        }
    }

    pool.close().await;
    Ok(())
}
