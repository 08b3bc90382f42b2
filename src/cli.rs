// ABOUTME: Command-line interface definition using clap derive macros.
// ABOUTME: Defines all subcommands and their arguments.

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "flotilla")]
#[command(about = "Declarative release reconciliation with transactional rollback")]
#[command(version)]
pub struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Emit JSON lines instead of human-readable output
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize a new flotilla.yml configuration file
    Init {
        /// Release-group name to scaffold
        #[arg(short, long)]
        group: Option<String>,

        /// Overwrite an existing configuration file
        #[arg(short, long)]
        force: bool,
    },

    /// Show what an apply would change, without mutating anything
    Diff,

    /// Reconcile desired releases against the cluster
    Apply {
        /// Force-replace the named releases or charts
        #[arg(long)]
        force: Vec<String>,

        /// Run validation and diff passes only
        #[arg(long)]
        dry_run: bool,
    },

    /// Roll the release group back to its prior recorded state
    Rollback {
        /// Release group to roll back (defaults to the configured group)
        #[arg(short, long)]
        group: Option<String>,
    },
}
