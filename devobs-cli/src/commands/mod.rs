pub mod changes;
pub mod config;
pub mod github_changes;
pub mod key;
pub mod observations;
pub mod repos;
pub mod validate;
pub mod websites;

use std::future::Future;
use std::sync::Arc;

use anyhow::Context;
use clap::Subcommand;
use serde::Serialize;

use devobs_core::api::ApiClient;
use devobs_core::config::DevObsConfig;
use devobs_core::progress::{IndicatifReporter, NoopReporter, ProgressReporter, track};
use devobs_core::store::AppStore;

use crate::GlobalArgs;

#[derive(Subcommand, Debug)]
pub enum Command {
    /// List and manage tracked GitHub repositories
    #[command(subcommand)]
    Repos(repos::ReposCommand),
    /// List and manage tracked websites
    #[command(subcommand)]
    Websites(websites::WebsitesCommand),
    /// Browse stored analysis observations
    #[command(subcommand)]
    Observations(observations::ObservationsCommand),
    /// Show or update the backend's global configuration
    #[command(subcommand)]
    Config(config::ConfigCommand),
    /// Change reports per repository
    #[command(subcommand)]
    Changes(changes::ChangesCommand),
    /// Stored GitHub change summaries
    #[command(subcommand, name = "github-changes")]
    GithubChanges(github_changes::GithubChangesCommand),
    /// Check a repository or website URL without contacting the backend
    Validate(validate::ValidateArgs),
    /// Print the observation key prefix derived from a website URL
    Key(key::KeyArgs),
}

pub async fn run(cmd: Command, global: GlobalArgs) -> anyhow::Result<()> {
    match cmd {
        Command::Validate(args) => validate::run(&args),
        Command::Key(args) => key::run(&args, global.json),
        Command::Repos(cmd) => repos::run(cmd, &Session::open(&global)?).await,
        Command::Websites(cmd) => websites::run(cmd, &Session::open(&global)?).await,
        Command::Observations(cmd) => observations::run(cmd, &Session::open(&global)?).await,
        Command::Config(cmd) => config::run(cmd, &Session::open(&global)?).await,
        Command::Changes(cmd) => changes::run(cmd, &Session::open(&global)?).await,
        Command::GithubChanges(cmd) => github_changes::run(cmd, &Session::open(&global)?).await,
    }
}

/// Everything a backend-facing command needs for one invocation.
pub struct Session {
    pub config: DevObsConfig,
    pub store: AppStore,
    pub json: bool,
    reporter: Box<dyn ProgressReporter>,
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("config", &self.config)
            .field("json", &self.json)
            .finish_non_exhaustive()
    }
}

impl Session {
    pub fn open(global: &GlobalArgs) -> anyhow::Result<Self> {
        let cwd = std::env::current_dir().context("Cannot resolve current directory")?;
        let mut config = DevObsConfig::discover(global.config.as_deref(), &cwd)
            .context("Cannot load config")?;
        if let Some(base_url) = &global.base_url {
            config = config
                .with_base_url(base_url)
                .context("Invalid --base-url")?;
        }

        let client = ApiClient::new(&config).context("Cannot build API client")?;
        tracing::debug!(base_url = client.base_url(), "Using backend");

        let store = AppStore::new(Arc::new(client), config.changes.endpoints);
        let reporter: Box<dyn ProgressReporter> = if global.quiet || global.json {
            Box::new(NoopReporter)
        } else {
            Box::new(IndicatifReporter::stderr())
        };

        Ok(Self {
            config,
            store,
            json: global.json,
            reporter,
        })
    }

    /// Await `fut` behind a spinner labelled `task`.
    pub async fn pending<F, T>(&self, task: &str, fut: F) -> T
    where
        F: Future<Output = T>,
    {
        track(self.reporter.as_ref(), task, fut).await
    }
}

pub fn print_json<T: Serialize + ?Sized>(value: &T) -> anyhow::Result<()> {
    let text = serde_json::to_string_pretty(value).context("Failed to serialize output")?;
    println!("{text}");
    Ok(())
}

/// Shorten `s` to at most `max` characters, marking the cut with `…`.
pub fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let head: String = s.chars().take(max.saturating_sub(1)).collect();
        format!("{head}…")
    }
}

pub fn or_dash(value: Option<impl std::fmt::Display>) -> String {
    value.map_or_else(|| "-".to_string(), |v| v.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truncate_respects_char_boundaries() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("ééééé", 3), "éé…");
    }

    #[test]
    fn or_dash_fills_missing() {
        assert_eq!(or_dash(None::<u32>), "-");
        assert_eq!(or_dash(Some(3)), "3");
    }
}
