//! sysgraph-rules: run the diagnosis rule engine from the command line.
//!
//! Configuration comes from `SYSGRAPH_*` environment variables (and `.env`).
//! Results and statistics are printed to stdout as JSON; logs go to stderr.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing::info;

use sysgraph_core::config::load_dotenv;
use sysgraph_core::{RuleEngineConfig, Value};
use sysgraph_rules::loader::LoadStatus;
use sysgraph_rules::{RuleEngine, SyncReport};

// ── CLI ─────────────────────────────────────────────────────────────

/// Evaluate diagnosis rules against a system snapshot.
#[derive(Parser, Debug)]
#[command(name = "sysgraph-rules", version, about)]
struct Cli {
    /// Skip remote rules for this invocation.
    #[arg(long, global = true)]
    builtin_only: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the enabled rules against a JSON snapshot.
    Run {
        /// Path to the snapshot JSON file.
        #[arg(long, env = "SYSGRAPH_SNAPSHOT")]
        snapshot: PathBuf,

        /// Only run rules of this category.
        #[arg(long)]
        category: Option<String>,

        /// Synchronize remote rules before running.
        #[arg(long)]
        sync: bool,
    },
    /// List the enabled rules.
    List {
        #[arg(long)]
        category: Option<String>,
    },
    /// Print rule statistics.
    Stats,
    /// Synchronize remote rules once and report per-file status.
    Sync,
    /// Keep remote rules synchronized until interrupted.
    Watch,
}

// ── main ────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    load_dotenv();
    let cli = Cli::parse();

    let mut config = RuleEngineConfig::from_env();
    if cli.builtin_only {
        config.enable_remote_rules = false;
    }
    config.validate()?;
    config.log_summary();

    let engine = RuleEngine::new(config);

    match cli.command {
        Command::Run {
            snapshot,
            category,
            sync,
        } => {
            let raw = std::fs::read_to_string(&snapshot)
                .with_context(|| format!("failed to read snapshot {}", snapshot.display()))?;
            let snapshot: Value = serde_json::from_str(&raw)
                .with_context(|| format!("failed to parse snapshot {}", snapshot.display()))?;

            sync_remote(&engine, sync).await;

            let results = match category {
                Some(category) => engine.run_category(&snapshot, &category),
                None => engine.run(&snapshot),
            };
            println!("{}", serde_json::to_string_pretty(&results)?);
        }
        Command::List { category } => {
            load_cached(&engine).await;
            let rules = match category {
                Some(category) => engine.store().rules_by_category(&category),
                None => engine.store().rules(),
            };
            println!("{}", serde_json::to_string_pretty(&rules)?);
        }
        Command::Stats => {
            load_cached(&engine).await;
            println!("{}", serde_json::to_string_pretty(&engine.statistics())?);
        }
        Command::Sync => {
            anyhow::ensure!(
                engine.config().enable_remote_rules,
                "remote rules are disabled (SYSGRAPH_ENABLE_REMOTE_RULES)"
            );
            let report = engine.git_synchronizer().sync_once().await;
            print_report(&report);
            if let Some(err) = report.fetch_error {
                anyhow::bail!("fetch failed: {err}");
            }
        }
        Command::Watch => {
            anyhow::ensure!(
                engine.config().enable_remote_rules,
                "remote rules are disabled (SYSGRAPH_ENABLE_REMOTE_RULES)"
            );
            let handle = Arc::new(engine.git_synchronizer()).start();
            tokio::signal::ctrl_c()
                .await
                .context("failed to listen for ctrl_c")?;
            info!("shutdown signal received");
            handle.stop().await;
        }
    }

    Ok(())
}

/// Fetch (when `fetch` is set) and load the remote cache into the store.
async fn sync_remote(engine: &RuleEngine, fetch: bool) {
    if !engine.config().enable_remote_rules {
        return;
    }
    let synchronizer = engine.git_synchronizer();
    if fetch {
        synchronizer.sync_once().await;
    } else {
        synchronizer.reload().await;
    }
}

/// Load whatever the rule cache already holds, without fetching.
async fn load_cached(engine: &RuleEngine) {
    sync_remote(engine, false).await;
}

fn print_report(report: &SyncReport) {
    for file in &report.files {
        match &file.status {
            LoadStatus::Loaded { rule_ids } => {
                println!("loaded   {} ({} rules)", file.path.display(), rule_ids.len())
            }
            LoadStatus::Skipped { reason } => {
                println!("skipped  {} ({})", file.path.display(), reason)
            }
            LoadStatus::Failed { error } => println!("failed   {} ({})", file.path.display(), error),
        }
    }
    println!(
        "fetched: {}, remote rules loaded: {}",
        report.fetched, report.rules_loaded
    );
}
