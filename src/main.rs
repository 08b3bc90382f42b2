// ABOUTME: Entry point for the flotilla CLI application.
// ABOUTME: Parses arguments and dispatches to appropriate command handlers.

mod cli;

use std::env;
use std::sync::Arc;

use clap::Parser;
use cli::{Cli, Commands};
use flotilla::backend::MemoryBackend;
use flotilla::commands;
use flotilla::config::{self, BackendKind, Config};
use flotilla::error::Result;
use flotilla::output::{Output, OutputMode};
use flotilla::store::MemoryStorage;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Initialize tracing subscriber based on verbose flag
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("warn")
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .init();

    let mode = if cli.json {
        OutputMode::Json
    } else {
        OutputMode::Normal
    };

    let result = run(cli, mode).await;

    if let Err(e) = result {
        Output::new(mode).error(&e.to_string());
        std::process::exit(1);
    }
}

async fn run(cli: Cli, mode: OutputMode) -> Result<()> {
    match cli.command {
        Commands::Init { group, force } => {
            let cwd = env::current_dir()?;
            config::init_config(&cwd, group.as_deref(), force)
        }
        Commands::Diff => {
            let config = discover_config()?;
            let backend = connect_backend(&config);
            commands::diff::run(&config, backend.as_ref(), &Output::new(mode)).await?;
            Ok(())
        }
        Commands::Apply { force, dry_run } => {
            let config = discover_config()?;
            let backend = connect_backend(&config);
            let opts = commands::apply::ApplyOptions { force, dry_run };
            commands::apply::run(&config, backend, connect_storage(), &opts, Output::new(mode))
                .await?;
            Ok(())
        }
        Commands::Rollback { group } => {
            let config = discover_config()?;
            let backend = connect_backend(&config);
            let group = group.unwrap_or_else(|| config.group.clone());
            commands::rollback::run(&group, backend, connect_storage(), Output::new(mode)).await
        }
    }
}

fn discover_config() -> Result<Config> {
    let cwd = env::current_dir()?;
    Config::discover(&cwd)
}

fn connect_backend(config: &Config) -> Arc<MemoryBackend> {
    match config.backend {
        BackendKind::Memory => Arc::new(MemoryBackend::new()),
    }
}

// Version snapshots live only as long as this process: `rollback` can only
// undo an `apply` from the same run. Cross-process history needs a durable
// VersionStorage driver and a `storage:` config section to select it.
fn connect_storage() -> Arc<MemoryStorage> {
    Arc::new(MemoryStorage::new())
}
