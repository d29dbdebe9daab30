use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use tracing::info;

use crate::api::ObserverApi;
use crate::normalize::repo_changes_key;
use crate::types::{GitHubChangesEntry, RepoChanges};

/// Stored `github_changes` observations and per-repository summaries.
#[derive(Debug)]
pub struct GitHubChangesStore {
    api: Arc<dyn ObserverApi>,
    entries: RwLock<Vec<GitHubChangesEntry>>,
    by_repo: RwLock<HashMap<(String, u32), RepoChanges>>,
}

impl GitHubChangesStore {
    pub fn new(api: Arc<dyn ObserverApi>) -> Self {
        Self {
            api,
            entries: RwLock::new(Vec::new()),
            by_repo: RwLock::new(HashMap::new()),
        }
    }

    pub fn entries(&self) -> Vec<GitHubChangesEntry> {
        self.entries
            .read()
            .expect("github changes lock poisoned")
            .clone()
    }

    pub fn cached(&self, repo_id: &str, days: u32) -> Option<RepoChanges> {
        self.by_repo
            .read()
            .expect("github changes lock poisoned")
            .get(&(repo_id.to_string(), days))
            .cloned()
    }

    pub async fn fetch_entries(&self) -> crate::error::Result<Vec<GitHubChangesEntry>> {
        let entries = self.api.list_github_changes().await?;
        *self.entries.write().expect("github changes lock poisoned") = entries.clone();
        Ok(entries)
    }

    /// Entry whose key matches `full_name` and `days`, from the last listing.
    pub fn entry_for(&self, full_name: &str, days: u32) -> Option<GitHubChangesEntry> {
        let wanted = repo_changes_key(full_name, days);
        self.entries()
            .into_iter()
            .find(|e| e.key == wanted || format!("{}/{}", e.name, e.key) == wanted)
    }

    pub async fn fetch_repo(&self, repo_id: &str, days: u32) -> crate::error::Result<RepoChanges> {
        let changes = self.api.get_repo_changes(repo_id, days).await?;
        self.by_repo
            .write()
            .expect("github changes lock poisoned")
            .insert((repo_id.to_string(), days), changes.clone());
        Ok(changes)
    }

    pub async fn trigger(&self, repo_id: &str) -> crate::error::Result<()> {
        self.api.trigger_github_changes(repo_id).await?;
        info!(repo_id, "GitHub changes analysis triggered");
        Ok(())
    }
}
