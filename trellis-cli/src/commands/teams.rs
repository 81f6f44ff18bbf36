//! `trellis teams` — list the teams visible to the configured API key.

use anyhow::{Context, Result};
use clap::Args;
use serde::Serialize;
use tabled::{settings::Style, Table, Tabled};

use trellis_client::IssueApi;

use crate::commands::client_for;
use crate::config;

/// Arguments for `trellis teams`.
#[derive(Args, Debug)]
pub struct TeamsArgs {
    /// Emit machine-readable JSON.
    #[arg(long)]
    pub json: bool,
}

#[derive(Serialize)]
struct TeamJson {
    key: String,
    name: String,
    id: String,
}

#[derive(Tabled)]
struct TeamTableRow {
    #[tabled(rename = "key")]
    key: String,
    #[tabled(rename = "name")]
    name: String,
    #[tabled(rename = "id")]
    id: String,
}

impl TeamsArgs {
    pub fn run(self) -> Result<()> {
        let settings = config::load()?;
        let mut client = client_for(settings);
        let teams = client.teams().context("failed to list teams")?;

        if self.json {
            let payload: Vec<TeamJson> = teams
                .into_iter()
                .map(|team| TeamJson {
                    key: team.key,
                    name: team.name,
                    id: team.id.to_string(),
                })
                .collect();
            println!(
                "{}",
                serde_json::to_string_pretty(&payload).context("failed to serialize teams JSON")?
            );
            return Ok(());
        }

        if teams.is_empty() {
            println!("No teams visible to this API key.");
            return Ok(());
        }

        let rows: Vec<TeamTableRow> = teams
            .into_iter()
            .map(|team| TeamTableRow {
                key: team.key,
                name: team.name,
                id: team.id.to_string(),
            })
            .collect();
        let mut table = Table::new(rows);
        table.with(Style::rounded());
        println!("{table}");
        Ok(())
    }
}
