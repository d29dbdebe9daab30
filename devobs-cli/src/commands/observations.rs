use anyhow::Context;
use clap::Subcommand;

use devobs_core::types::ObservationKey;

use super::{Session, print_json};

#[derive(Subcommand, Debug)]
pub enum ObservationsCommand {
    /// List observation keys of one kind (e.g. repos, websites, github_changes)
    List { kind: String },
    /// Print one observation's content
    Show {
        kind: String,
        name: String,
        key: String,
    },
}

pub async fn run(cmd: ObservationsCommand, session: &Session) -> anyhow::Result<()> {
    let observations = &session.store.observations;
    match cmd {
        ObservationsCommand::List { kind } => {
            let mut keys = session
                .pending("Fetching observation keys", observations.fetch_keys(&kind))
                .await
                .with_context(|| format!("Failed to list observations of kind {kind}"))?;
            if session.json {
                return print_json(&keys);
            }
            if keys.is_empty() {
                println!("No observations of kind {kind}.");
                return Ok(());
            }
            keys.sort();
            for key in &keys {
                println!("  {:<40} {}", key.name, key.key);
            }
            println!();
            println!("  {} observations", keys.len());
        }
        ObservationsCommand::Show { kind, name, key } => {
            let key = ObservationKey::new(kind, name, key);
            let observation = session
                .pending("Fetching observation", observations.get_or_fetch(&key))
                .await
                .with_context(|| format!("Failed to fetch observation {key}"))?
                .with_context(|| format!("Observation {key} not found"))?;
            if session.json {
                return print_json(&observation);
            }
            println!("{}", observation.content);
        }
    }
    Ok(())
}
