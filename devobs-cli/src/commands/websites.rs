use anyhow::Context;
use clap::Subcommand;

use devobs_core::normalize::website_key_prefix;
use devobs_core::types::Website;

use super::{Session, print_json};

#[derive(Subcommand, Debug)]
pub enum WebsitesCommand {
    /// List all tracked websites
    List,
    /// Show one website
    Show { id: String },
    /// Start tracking a website
    Add { url: String },
    /// Stop tracking a website
    Delete { id: String },
    /// Ask the backend to crawl a website again
    Rescan { id: String },
}

pub async fn run(cmd: WebsitesCommand, session: &Session) -> anyhow::Result<()> {
    let sites = &session.store.websites;
    match cmd {
        WebsitesCommand::List => {
            let list = session
                .pending("Fetching websites", sites.fetch_all())
                .await
                .context("Failed to list websites")?;
            if session.json {
                return print_json(&list);
            }
            print_table(&list);
        }
        WebsitesCommand::Show { id } => {
            let site = session
                .pending("Fetching website", sites.fetch_by_id(&id))
                .await
                .context("Failed to fetch website")?
                .with_context(|| format!("Website {id} not found"))?;
            if session.json {
                return print_json(&site);
            }
            println!("  ID:         {}", site.id);
            println!("  URL:        {}", site.url);
            println!("  Key prefix: {}", website_key_prefix(&site.url));
        }
        WebsitesCommand::Add { url } => {
            session
                .pending("Fetching websites", sites.fetch_all())
                .await
                .context("Failed to list websites")?;
            let added = session
                .pending("Adding website", sites.add(&url))
                .await
                .with_context(|| format!("Cannot add {url}"))?;
            match added {
                Some(site) if session.json => return print_json(&site),
                Some(site) => println!("Added {} ({})", site.url, site.id),
                None => println!("Added {url}"),
            }
        }
        WebsitesCommand::Delete { id } => {
            let remaining = session
                .pending("Deleting website", sites.delete(&id))
                .await
                .with_context(|| format!("Failed to delete website {id}"))?;
            if session.json {
                return print_json(&remaining);
            }
            println!("Deleted {id}; {} websites remain", remaining.len());
        }
        WebsitesCommand::Rescan { id } => {
            session
                .pending("Scheduling rescan", sites.rescan(&id))
                .await
                .with_context(|| format!("Failed to rescan website {id}"))?;
            println!("Rescan scheduled for {id}");
        }
    }
    Ok(())
}

fn print_table(sites: &[Website]) {
    if sites.is_empty() {
        println!("No websites tracked. Add one with `devobs websites add <url>`.");
        return;
    }
    println!("  {:<38} {:<50}", "ID", "URL");
    for site in sites {
        println!("  {:<38} {:<50}", site.id, site.url);
    }
    println!();
    println!("  {} websites", sites.len());
}
