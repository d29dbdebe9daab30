use anyhow::Context;
use clap::Subcommand;

use devobs_core::types::GitHubRepository;

use super::{Session, or_dash, print_json};

#[derive(Subcommand, Debug)]
pub enum ReposCommand {
    /// List all tracked repositories
    List,
    /// Show one repository
    Show { id: String },
    /// Start tracking a repository (https://github.com/owner/repo)
    Add { url: String },
    /// Stop tracking a repository
    Delete { id: String },
    /// Ask the backend to re-analyse a repository
    Rescan { id: String },
    /// Enroll a repository for recurring change analysis
    Enroll { id: String },
    /// Remove a repository from recurring change analysis
    Unenroll { id: String },
    /// Show change-analysis enrollment status
    Status { id: String },
}

pub async fn run(cmd: ReposCommand, session: &Session) -> anyhow::Result<()> {
    let repos = &session.store.repositories;
    match cmd {
        ReposCommand::List => {
            let list = session
                .pending("Fetching repositories", repos.fetch_all())
                .await
                .context("Failed to list repositories")?;
            if session.json {
                return print_json(&list);
            }
            print_table(&list);
        }
        ReposCommand::Show { id } => {
            let repo = session
                .pending("Fetching repository", repos.fetch_by_id(&id))
                .await
                .context("Failed to fetch repository")?
                .with_context(|| format!("Repository {id} not found"))?;
            if session.json {
                return print_json(&repo);
            }
            print_detail(&repo);
        }
        ReposCommand::Add { url } => {
            // Duplicate detection runs against what the backend already has.
            session
                .pending("Fetching repositories", repos.fetch_all())
                .await
                .context("Failed to list repositories")?;
            let added = session
                .pending("Adding repository", repos.add(&url))
                .await
                .with_context(|| format!("Cannot add {url}"))?;
            match added {
                Some(repo) if session.json => return print_json(&repo),
                Some(repo) => println!("Added {} ({})", repo.full_name, repo.id),
                None => println!("Added {url}"),
            }
        }
        ReposCommand::Delete { id } => {
            let remaining = session
                .pending("Deleting repository", repos.delete(&id))
                .await
                .with_context(|| format!("Failed to delete repository {id}"))?;
            if session.json {
                return print_json(&remaining);
            }
            println!("Deleted {id}; {} repositories remain", remaining.len());
        }
        ReposCommand::Rescan { id } => {
            session
                .pending("Scheduling rescan", repos.rescan(&id))
                .await
                .with_context(|| format!("Failed to rescan repository {id}"))?;
            println!("Rescan scheduled for {id}");
        }
        ReposCommand::Enroll { id } => {
            let repo = session
                .pending("Enrolling repository", repos.enroll(&id))
                .await
                .with_context(|| format!("Failed to enroll repository {id}"))?;
            report_enrollment(&id, repo.as_ref(), session.json)?;
        }
        ReposCommand::Unenroll { id } => {
            let repo = session
                .pending("Unenrolling repository", repos.unenroll(&id))
                .await
                .with_context(|| format!("Failed to unenroll repository {id}"))?;
            report_enrollment(&id, repo.as_ref(), session.json)?;
        }
        ReposCommand::Status { id } => {
            let status = session
                .pending("Fetching enrollment status", repos.enrollment_status(&id))
                .await
                .with_context(|| format!("Failed to fetch enrollment status for {id}"))?;
            if session.json {
                return print_json(&status);
            }
            println!("  Enrolled:      {}", if status.enrolled { "yes" } else { "no" });
            println!("  Last analysis: {}", or_dash(status.last_analysis));
        }
    }
    Ok(())
}

fn report_enrollment(id: &str, repo: Option<&GitHubRepository>, json: bool) -> anyhow::Result<()> {
    match repo {
        Some(repo) if json => print_json(repo),
        Some(repo) => {
            println!(
                "{}: {}",
                repo.full_name,
                if repo.is_enrolled() { "enrolled" } else { "not enrolled" }
            );
            Ok(())
        }
        None => anyhow::bail!("Repository {id} not found after update"),
    }
}

fn print_table(repos: &[GitHubRepository]) {
    if repos.is_empty() {
        println!("No repositories tracked. Add one with `devobs repos add <url>`.");
        return;
    }
    println!("  {:<38} {:<40} {:<8}", "ID", "FULL NAME", "ENROLLED");
    for repo in repos {
        println!(
            "  {:<38} {:<40} {:<8}",
            repo.id,
            repo.full_name,
            if repo.is_enrolled() { "yes" } else { "no" }
        );
    }
    println!();
    println!("  {} repositories", repos.len());
}

fn print_detail(repo: &GitHubRepository) {
    println!("{}", repo.full_name);
    println!();
    println!("  ID:            {}", repo.id);
    println!("  Name:          {}", repo.name);
    println!("  URL:           {}", repo.url);
    println!(
        "  Enrolled:      {}",
        if repo.is_enrolled() { "yes" } else { "no" }
    );
    println!("  Last analysis: {}", or_dash(repo.last_analysis()));

    let Some(props) = &repo.properties else {
        return;
    };
    if let Some(meta) = &props.meta {
        println!("  Clone URL:     {}", or_dash(meta.clone_url.as_deref()));
        println!("  Size (KB):     {}", or_dash(meta.size_kb));
        println!("  Refreshed:     {}", or_dash(meta.last_refresh));
    }
    if let Some(app) = &props.app_info {
        println!("  Installation:  {}", or_dash(app.installation_id));
    }
}
