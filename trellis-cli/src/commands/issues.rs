//! `trellis issues` — list a team's issues with state and age.

use std::collections::HashMap;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use clap::Args;
use colored::Colorize;
use serde::Serialize;
use tabled::{settings::Style, Table, Tabled};

use trellis_client::IssueApi;
use trellis_core::IssueId;
use trellis_import::resolver;

use crate::commands::client_for;
use crate::config;

/// Arguments for `trellis issues`.
#[derive(Args, Debug)]
pub struct IssuesArgs {
    /// Team name or key.
    pub team: String,

    /// Emit machine-readable JSON.
    #[arg(long)]
    pub json: bool,
}

#[derive(Serialize)]
struct IssueJson {
    identifier: String,
    title: String,
    state: Option<String>,
    parent: Option<String>,
    url: Option<String>,
    created_at: String,
}

#[derive(Tabled)]
struct IssueTableRow {
    #[tabled(rename = "identifier")]
    identifier: String,
    #[tabled(rename = "title")]
    title: String,
    #[tabled(rename = "state")]
    state: String,
    #[tabled(rename = "age")]
    age: String,
}

impl IssuesArgs {
    pub fn run(self) -> Result<()> {
        let settings = config::load()?;
        let mut client = client_for(settings);

        let team = resolver::resolve_team(&mut client, &self.team)?;
        let issues = client
            .issues(&team.id)
            .with_context(|| format!("failed to list issues for '{}'", team.name))?;

        if self.json {
            let identifiers: HashMap<IssueId, String> = issues
                .iter()
                .map(|issue| (issue.id.clone(), issue.identifier.clone()))
                .collect();
            let payload: Vec<IssueJson> = issues
                .into_iter()
                .map(|issue| IssueJson {
                    parent: issue
                        .parent_id
                        .as_ref()
                        .and_then(|id| identifiers.get(id).cloned()),
                    identifier: issue.identifier,
                    title: issue.title,
                    state: issue.state,
                    url: issue.url,
                    created_at: issue.created_at.to_rfc3339(),
                })
                .collect();
            println!(
                "{}",
                serde_json::to_string_pretty(&payload).context("failed to serialize issues JSON")?
            );
            return Ok(());
        }

        println!(
            "Trellis v{} | {} ({}) | {} issues",
            env!("CARGO_PKG_VERSION"),
            team.name.bold(),
            team.key,
            issues.len(),
        );

        if issues.is_empty() {
            return Ok(());
        }

        let rows: Vec<IssueTableRow> = issues
            .into_iter()
            .map(|issue| IssueTableRow {
                identifier: issue.identifier,
                title: issue.title,
                state: issue.state.unwrap_or_else(|| "-".to_string()),
                age: format_age(issue.created_at),
            })
            .collect();
        let mut table = Table::new(rows);
        table.with(Style::rounded());
        println!("{table}");
        Ok(())
    }
}

/// Format age from an issue's `createdAt` timestamp.
fn format_age(created_at: DateTime<Utc>) -> String {
    let age = Utc::now().signed_duration_since(created_at).num_seconds().max(0) as u64;
    format_seconds(age)
}

fn format_seconds(seconds: u64) -> String {
    if seconds < 60 {
        return format!("{seconds}s");
    }
    if seconds < 60 * 60 {
        return format!("{}m", seconds / 60);
    }
    if seconds < 60 * 60 * 24 {
        return format!("{}h", seconds / (60 * 60));
    }
    format!("{}d", seconds / (60 * 60 * 24))
}
