//! `trellis import` — reconcile a plan document against the remote tracker.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;

use trellis_core::Plan;
use trellis_import::{ImportOptions, ImportReport, ReportEntry};

use crate::commands::client_for;
use crate::config;

/// Arguments for `trellis import`.
#[derive(Args, Debug)]
pub struct ImportArgs {
    /// Path to the plan document (.json, .yaml or .yml).
    pub plan: PathBuf,

    /// Report what would happen without creating or updating anything.
    #[arg(long)]
    pub dry_run: bool,

    /// Patch issues that already exist instead of skipping them.
    #[arg(long)]
    pub update: bool,

    /// Emit the run report as JSON.
    #[arg(long)]
    pub json: bool,
}

impl ImportArgs {
    pub fn run(self) -> Result<()> {
        let plan = Plan::load(&self.plan)?;
        plan.validate()?;

        let settings = config::load()?;
        let mut client = client_for(settings);

        let options = ImportOptions {
            dry_run: self.dry_run,
            update: self.update,
        };
        let report = trellis_import::run(&mut client, &plan, options)
            .with_context(|| format!("import failed for {}", self.plan.display()))?;

        if self.json {
            println!(
                "{}",
                serde_json::to_string_pretty(&report).context("failed to serialize report")?
            );
            return Ok(());
        }

        print_report(&plan.team, &report);
        Ok(())
    }
}

fn print_report(team: &str, report: &ImportReport) {
    let prefix = if report.dry_run { "[dry-run] " } else { "" };

    println!(
        "{prefix}✓ '{team}' reconciled ({} created, {} updated, {} skipped)",
        report.created.len(),
        report.updated.len(),
        report.skipped.len(),
    );

    for entry in &report.created {
        println!("  +  {}", describe(entry));
    }
    for entry in &report.updated {
        println!("  ✎  {}", describe(entry));
    }
    for entry in &report.skipped {
        println!("  ·  {}", describe(entry));
    }

    for warning in &report.warnings {
        println!("{} {warning}", "warning:".yellow().bold());
    }
}

fn describe(entry: &ReportEntry) -> String {
    let mut line = format!("{}  {}", entry.identifier, entry.title);
    if let Some(parent) = &entry.parent {
        line.push_str(&format!("  (under {parent})"));
    }
    if let Some(url) = &entry.url {
        line.push_str(&format!("  {}", url.bright_black()));
    }
    line
}
