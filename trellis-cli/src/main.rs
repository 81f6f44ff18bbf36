//! Trellis — declarative issue-tree import for Linear-style trackers.
//!
//! # Usage
//!
//! ```text
//! trellis import <plan.json|plan.yaml> [--dry-run] [--update] [--json]
//! trellis teams [--json]
//! trellis issues <team> [--json]
//! ```

mod commands;
mod config;

use anyhow::Result;
use clap::{Parser, Subcommand};

use commands::{import::ImportArgs, issues::IssuesArgs, teams::TeamsArgs};

// ---------------------------------------------------------------------------
// CLI entry point
// ---------------------------------------------------------------------------

#[derive(Parser, Debug)]
#[command(
    name = "trellis",
    version,
    about = "Reconcile a declared issue tree against a remote tracker",
    long_about = None,
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Import a plan document: create missing issues, optionally update matched ones.
    Import(ImportArgs),

    /// List the teams visible to the configured API key.
    Teams(TeamsArgs),

    /// List a team's issues with state and age.
    Issues(IssuesArgs),
}

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();
    match cli.command {
        Commands::Import(args) => args.run(),
        Commands::Teams(args) => args.run(),
        Commands::Issues(args) => args.run(),
    }
}
