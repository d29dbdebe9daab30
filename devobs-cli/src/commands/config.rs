use std::path::PathBuf;

use anyhow::Context;
use clap::Subcommand;

use devobs_core::types::{Analyzer, GlobalConfig};

use super::{Session, or_dash, print_json};

#[derive(Subcommand, Debug)]
pub enum ConfigCommand {
    /// Show the backend's global configuration
    Show,
    /// Replace the global configuration with the JSON in FILE
    Update {
        #[arg(long)]
        file: PathBuf,
    },
    /// Show whether user management is enabled
    Users,
    /// Print the resolved local client configuration
    Local,
}

pub async fn run(cmd: ConfigCommand, session: &Session) -> anyhow::Result<()> {
    let store = &session.store.config;
    match cmd {
        ConfigCommand::Show => {
            let config = session
                .pending("Fetching global config", store.fetch())
                .await
                .context("Failed to fetch global config")?;
            if session.json {
                return print_json(&config);
            }
            print_global(&config);
        }
        ConfigCommand::Update { file } => {
            let text = std::fs::read_to_string(&file)
                .with_context(|| format!("Cannot read {}", file.display()))?;
            let config: GlobalConfig = serde_json::from_str(&text)
                .with_context(|| format!("Invalid global config JSON in {}", file.display()))?;
            let updated = session
                .pending("Updating global config", store.update(&config))
                .await
                .context("Failed to update global config")?;
            if session.json {
                return print_json(&updated);
            }
            println!("Global config updated.");
            print_global(&updated);
        }
        ConfigCommand::Users => {
            let status = session
                .pending("Fetching user management status", store.fetch_user_status())
                .await
                .context("Failed to fetch user management status")?;
            if session.json {
                return print_json(&status);
            }
            println!(
                "  User management: {}",
                if status.enabled { "enabled" } else { "disabled" }
            );
            println!("  Public API key:  {}", or_dash(status.public_api_key));
        }
        ConfigCommand::Local => {
            println!("  Base URL:        {}", session.config.server.base_url);
            println!("  API prefix:      {}", session.config.server.api_prefix);
            println!("  Timeout (s):     {}", session.config.server.timeout_secs);
            println!(
                "  Auth:            {}",
                if session.config.auth.enabled {
                    format!("bearer token from ${}", session.config.auth.token_env)
                } else {
                    "disabled".to_string()
                }
            );
            println!(
                "  Change reports:  {}",
                session.config.changes.endpoints.as_str()
            );
            println!("  Default days:    {}", session.config.changes.default_days);
        }
    }
    Ok(())
}

fn print_global(config: &GlobalConfig) {
    if let Some(analysis) = &config.analysis {
        print_analyzers("Repository analyzers", &analysis.repo_analyzers);
        print_analyzers("Website analyzers", &analysis.site_analyzers);
        println!(
            "  Masking: {}",
            if analysis.disable_masking { "disabled" } else { "enabled" }
        );
        println!();
    }
    if let Some(flatten) = config.repo_analysis.as_ref().and_then(|r| r.flatten.as_ref()) {
        println!("  Flatten:");
        println!("    max tokens per chunk:  {}", flatten.max_tokens_per_chunk);
        println!("    max file size (bytes): {}", flatten.max_file_size_bytes);
        println!("    large repo (MB):       {}", flatten.large_repo_threshold_mb);
        println!("    compress:              {}", flatten.compress);
        println!("    compress large:        {}", flatten.compress_large);
        println!("    output style:          {}", flatten.out_style);
        println!();
    }
    if let Some(crawling) = &config.website_crawling {
        println!(
            "  Website scan timeout: {}s",
            crawling.website_scan_timeout_seconds
        );
    }
}

fn print_analyzers(title: &str, analyzers: &[Analyzer]) {
    println!("  {title}: {}", analyzers.len());
    for a in analyzers {
        println!("    {:<24} {}", a.name, a.file_name);
    }
}
