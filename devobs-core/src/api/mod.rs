//! Typed access to the dev-observer REST API.
//!
//! [`ObserverApi`] is the seam every store slice talks through. The
//! production implementation is [`client::ApiClient`] (reqwest); tests plug
//! in an in-memory backend.

pub mod auth;
pub mod client;
pub mod messages;
pub mod paths;

use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::config::ChangeEndpointFamily;
use crate::types::{
    ChangeAnalysis, EnrollmentStatus, GitHubChangesEntry, GitHubRepository, GlobalConfig,
    Observation, ObservationKey, RepoChanges, UserManagementStatus, Website,
};

pub use client::ApiClient;
pub use messages::ActionAck;
pub use paths::ChangeReportFilter;

/// Conversion between a backend message and its protobuf-JSON form.
///
/// Implemented once per message; the defaults go through serde.
pub trait ApiMessage: Serialize + DeserializeOwned + Send + 'static {
    fn from_json(value: serde_json::Value) -> Result<Self, serde_json::Error> {
        serde_json::from_value(value)
    }

    fn to_json(&self) -> Result<serde_json::Value, serde_json::Error> {
        serde_json::to_value(self)
    }
}

macro_rules! api_messages {
    ($($ty:ty),* $(,)?) => {
        $(impl ApiMessage for $ty {})*
    };
}

api_messages!(
    messages::ListGithubRepositoriesResponse,
    messages::GetGithubRepositoryResponse,
    messages::AddGithubRepositoryRequest,
    messages::AddGithubRepositoryResponse,
    messages::DeleteGithubRepositoryResponse,
    messages::ActionAck,
    messages::ListWebSitesResponse,
    messages::GetWebSiteResponse,
    messages::AddWebSiteRequest,
    messages::AddWebSiteResponse,
    messages::DeleteWebSiteResponse,
    messages::GetObservationsResponse,
    messages::GetObservationResponse,
    messages::GetGlobalConfigResponse,
    messages::UpdateGlobalConfigRequest,
    messages::UpdateGlobalConfigResponse,
    messages::GetUserManagementStatusResponse,
    messages::GetChangeSummariesResponse,
    messages::ListChangesSummariesResponse,
    messages::GetChangesSummaryResponse,
    messages::CreateChangesSummaryRequest,
    messages::CreateChangesSummaryResponse,
    messages::DeleteChangesSummaryResponse,
    messages::ListGitHubChangesResponse,
    EnrollmentStatus,
    RepoChanges,
);

/// Every backend operation the client layer offers.
#[async_trait::async_trait]
pub trait ObserverApi: Send + Sync + std::fmt::Debug {
    // ── Repositories ───────────────────────────────────────────────

    async fn list_repositories(&self) -> crate::error::Result<Vec<GitHubRepository>>;

    /// `Ok(None)` when the backend has no such repository.
    async fn get_repository(&self, id: &str) -> crate::error::Result<Option<GitHubRepository>>;

    async fn add_repository(&self, url: &str) -> crate::error::Result<Option<GitHubRepository>>;

    /// Returns the remaining repositories.
    async fn delete_repository(&self, id: &str) -> crate::error::Result<Vec<GitHubRepository>>;

    async fn rescan_repository(&self, id: &str) -> crate::error::Result<()>;

    async fn enroll_repository(&self, id: &str) -> crate::error::Result<ActionAck>;

    async fn unenroll_repository(&self, id: &str) -> crate::error::Result<ActionAck>;

    async fn enrollment_status(&self, id: &str) -> crate::error::Result<EnrollmentStatus>;

    // ── Websites ───────────────────────────────────────────────────

    async fn list_websites(&self) -> crate::error::Result<Vec<Website>>;

    async fn get_website(&self, id: &str) -> crate::error::Result<Option<Website>>;

    async fn add_website(&self, url: &str) -> crate::error::Result<Option<Website>>;

    /// Returns the remaining websites.
    async fn delete_website(&self, id: &str) -> crate::error::Result<Vec<Website>>;

    async fn rescan_website(&self, id: &str) -> crate::error::Result<()>;

    // ── Observations ───────────────────────────────────────────────

    async fn list_observation_keys(&self, kind: &str) -> crate::error::Result<Vec<ObservationKey>>;

    async fn get_observation(
        &self,
        key: &ObservationKey,
    ) -> crate::error::Result<Option<Observation>>;

    // ── Config ─────────────────────────────────────────────────────

    async fn get_global_config(&self) -> crate::error::Result<GlobalConfig>;

    async fn update_global_config(&self, config: &GlobalConfig)
    -> crate::error::Result<GlobalConfig>;

    async fn user_management_status(&self) -> crate::error::Result<UserManagementStatus>;

    // ── Change reports ─────────────────────────────────────────────

    async fn list_change_reports(
        &self,
        family: ChangeEndpointFamily,
        filter: &ChangeReportFilter,
    ) -> crate::error::Result<Vec<ChangeAnalysis>>;

    async fn get_change_report(
        &self,
        family: ChangeEndpointFamily,
        id: &str,
    ) -> crate::error::Result<Option<ChangeAnalysis>>;

    async fn create_change_report(
        &self,
        family: ChangeEndpointFamily,
        repo_id: &str,
        days_back: u32,
    ) -> crate::error::Result<Option<ChangeAnalysis>>;

    /// Returns the backend's `success` flag.
    async fn delete_change_report(
        &self,
        family: ChangeEndpointFamily,
        id: &str,
    ) -> crate::error::Result<bool>;

    // ── GitHub changes ─────────────────────────────────────────────

    async fn list_github_changes(&self) -> crate::error::Result<Vec<GitHubChangesEntry>>;

    async fn get_repo_changes(&self, repo_id: &str, days: u32)
    -> crate::error::Result<RepoChanges>;

    async fn trigger_github_changes(&self, repo_id: &str) -> crate::error::Result<()>;
}
