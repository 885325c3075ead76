//! Maintenance commands over the item cache.

use anyhow::Result;
use clap::{Parser, Subcommand};

use crate::bot::AppState;
use crate::store::{Domain, FieldMap, FieldValue};

#[derive(Parser, Debug)]
#[command(name = "bloxlink")]
#[command(about = "Inspect and edit cached Bloxlink user and guild data")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Print an item's raw fields as JSON
    Fetch {
        #[arg(value_parser = parse_domain)]
        domain: Domain,
        id: String,
        /// Fields to fetch (all when omitted)
        aspects: Vec<String>,
    },

    /// Print a user as JSON
    User {
        id: String,
        aspects: Vec<String>,
    },

    /// Print a guild's data as JSON
    Guild {
        id: String,
        aspects: Vec<String>,
    },

    /// Set fields on an item in every tier
    Update {
        #[arg(value_parser = parse_domain)]
        domain: Domain,
        id: String,
        /// Assignments like `premium=true`
        #[arg(value_parser = parse_assignment, required = true)]
        fields: Vec<(String, FieldValue)>,
    },
}

fn parse_domain(raw: &str) -> Result<Domain, String> {
    Domain::new(raw).map_err(|e| e.to_string())
}

fn parse_assignment(raw: &str) -> Result<(String, FieldValue), String> {
    match raw.split_once('=') {
        Some((name, value)) if !name.is_empty() => {
            Ok((name.to_string(), FieldValue::parse_literal(value)))
        }
        _ => Err(format!("expected field=value, got '{raw}'")),
    }
}

/// Run a command and return what should be printed.
pub async fn execute(command: Command, state: &AppState) -> Result<String> {
    let output = match command {
        Command::Fetch { domain, id, aspects } => {
            let fields = state.items.fetch(&domain, &id, &aspects).await?;
            serde_json::to_string_pretty(&fields)?
        }
        Command::User { id, aspects } => {
            let aspects: Vec<&str> = aspects.iter().map(String::as_str).collect();
            let user = state.fetch_user(&id, &aspects).await?;
            serde_json::to_string_pretty(&user)?
        }
        Command::Guild { id, aspects } => {
            let aspects: Vec<&str> = aspects.iter().map(String::as_str).collect();
            let guild = state.fetch_guild_data(&id, &aspects).await?;
            serde_json::to_string_pretty(&guild)?
        }
        Command::Update { domain, id, fields } => {
            let fields: FieldMap = fields.into_iter().collect();
            state.items.update(&domain, &id, &fields).await?;
            format!("updated {} field(s) on {}", fields.len(), domain.key(&id))
        }
    };

    Ok(output)
}
