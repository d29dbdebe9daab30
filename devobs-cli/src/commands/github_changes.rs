use anyhow::Context;
use clap::Subcommand;

use super::{Session, or_dash, print_json};

#[derive(Subcommand, Debug)]
pub enum GithubChangesCommand {
    /// List stored GitHub change summaries
    List,
    /// Show the change summary of one repository
    Show {
        repo_id: String,
        #[arg(long)]
        days: Option<u32>,
    },
    /// Trigger a change analysis for one repository
    Trigger { repo_id: String },
}

pub async fn run(cmd: GithubChangesCommand, session: &Session) -> anyhow::Result<()> {
    let changes = &session.store.github_changes;
    match cmd {
        GithubChangesCommand::List => {
            let entries = session
                .pending("Fetching GitHub changes", changes.fetch_entries())
                .await
                .context("Failed to list GitHub changes")?;
            if session.json {
                return print_json(&entries);
            }
            if entries.is_empty() {
                println!("No GitHub change summaries stored.");
                return Ok(());
            }
            println!("  {:<40} {:<8} {}", "REPOSITORY", "PERIOD", "KEY");
            for e in &entries {
                println!("  {:<40} {:<8} {}", e.repository, e.period, e.key);
            }
            println!();
            println!("  {} summaries", entries.len());
        }
        GithubChangesCommand::Show { repo_id, days } => {
            let days = days.unwrap_or(session.config.changes.default_days);
            let summary = session
                .pending("Fetching change summary", changes.fetch_repo(&repo_id, days))
                .await
                .with_context(|| format!("Failed to fetch GitHub changes for {repo_id}"))?;
            if session.json {
                return print_json(&summary);
            }
            println!("{} ({} days)", summary.repository, summary.period_days);
            println!("  Last updated: {}", or_dash(summary.last_updated.as_deref()));
            match (&summary.summary, &summary.message) {
                (Some(text), _) => {
                    println!();
                    println!("{text}");
                }
                (None, Some(message)) => println!("  {message}"),
                (None, None) => println!("  No summary available yet."),
            }
        }
        GithubChangesCommand::Trigger { repo_id } => {
            session
                .pending("Triggering change analysis", changes.trigger(&repo_id))
                .await
                .with_context(|| format!("Failed to trigger GitHub changes for {repo_id}"))?;
            println!("Change analysis triggered for {repo_id}");
        }
    }
    Ok(())
}
