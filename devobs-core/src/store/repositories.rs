use std::sync::Arc;

use tracing::{debug, info};

use crate::api::ObserverApi;
use crate::error::{DevObsError, StoreError};
use crate::types::{EnrollmentStatus, GitHubRepository};
use crate::validate::validate_github_url;

use super::EntityMap;

/// Repository slice: id → [`GitHubRepository`].
#[derive(Debug)]
pub struct RepositoryStore {
    api: Arc<dyn ObserverApi>,
    repositories: EntityMap<GitHubRepository>,
}

impl RepositoryStore {
    pub fn new(api: Arc<dyn ObserverApi>) -> Self {
        Self {
            api,
            repositories: EntityMap::new(),
        }
    }

    /// Snapshot of all repositories, ordered by id.
    pub fn all(&self) -> Vec<GitHubRepository> {
        self.repositories.values()
    }

    pub fn get(&self, id: &str) -> Option<GitHubRepository> {
        self.repositories.get(id)
    }

    /// Replace the slice with the backend's list.
    pub async fn fetch_all(&self) -> crate::error::Result<Vec<GitHubRepository>> {
        let repos = self.api.list_repositories().await?;
        debug!(count = repos.len(), "Fetched repositories");
        self.repositories.replace_all(repos.iter().cloned());
        Ok(repos)
    }

    /// Merge one repository; a missing repository leaves the slice as is.
    pub async fn fetch_by_id(&self, id: &str) -> crate::error::Result<Option<GitHubRepository>> {
        let repo = self.api.get_repository(id).await?;
        match &repo {
            Some(r) => self.repositories.merge([r.clone()]),
            None => debug!(id, "Repository not found"),
        }
        Ok(repo)
    }

    /// Validate `url`, register it, and merge the new repository.
    ///
    /// When the backend acknowledges without echoing the repository, the
    /// list is refetched and the entry with the same URL returned.
    pub async fn add(&self, url: &str) -> crate::error::Result<Option<GitHubRepository>> {
        let existing = self.repositories.values();
        if let Some(err) = validate_github_url(url, &existing) {
            return Err(DevObsError::Validation(err));
        }

        let created = self.api.add_repository(url).await?;
        if let Some(repo) = created {
            info!(id = %repo.id, url, "Repository added");
            self.repositories.merge([repo.clone()]);
            return Ok(Some(repo));
        }

        info!(url, "Repository added; refreshing list");
        let repos = self.fetch_all().await?;
        Ok(repos.into_iter().find(|r| r.url == url))
    }

    /// Delete a repository; the backend's remaining list replaces the slice.
    pub async fn delete(&self, id: &str) -> crate::error::Result<Vec<GitHubRepository>> {
        let remaining = self.api.delete_repository(id).await?;
        info!(id, remaining = remaining.len(), "Repository deleted");
        self.repositories.replace_all(remaining.iter().cloned());
        Ok(remaining)
    }

    /// Ask the backend to re-analyse a repository soon.
    pub async fn rescan(&self, id: &str) -> crate::error::Result<()> {
        self.api.rescan_repository(id).await?;
        info!(id, "Repository rescan scheduled");
        Ok(())
    }

    /// Enroll for recurring change analysis, then refetch the repository.
    pub async fn enroll(&self, id: &str) -> crate::error::Result<Option<GitHubRepository>> {
        let ack = self.api.enroll_repository(id).await?;
        if !ack.success {
            return Err(StoreError::Rejected {
                action: "enroll",
                message: ack.message,
            }
            .into());
        }
        info!(id, "Repository enrolled for change analysis");
        self.fetch_by_id(id).await
    }

    /// Stop recurring change analysis, then refetch the repository.
    pub async fn unenroll(&self, id: &str) -> crate::error::Result<Option<GitHubRepository>> {
        let ack = self.api.unenroll_repository(id).await?;
        if !ack.success {
            return Err(StoreError::Rejected {
                action: "unenroll",
                message: ack.message,
            }
            .into());
        }
        info!(id, "Repository unenrolled from change analysis");
        self.fetch_by_id(id).await
    }

    pub async fn enrollment_status(&self, id: &str) -> crate::error::Result<EnrollmentStatus> {
        self.api.enrollment_status(id).await
    }
}
