// Request/response envelopes of the dev-observer web API.

use serde::{Deserialize, Serialize};

use crate::types::{
    ChangeAnalysis, GitHubChangesEntry, GitHubRepository, GlobalConfig, Observation,
    ObservationKey, UserManagementStatus, Website,
};

// ── Repositories ───────────────────────────────────────────────────

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ListGithubRepositoriesResponse {
    pub repos: Vec<GitHubRepository>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct GetGithubRepositoryResponse {
    pub repo: Option<GitHubRepository>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AddGithubRepositoryRequest {
    pub url: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AddGithubRepositoryResponse {
    pub repo: Option<GitHubRepository>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DeleteGithubRepositoryResponse {
    pub repos: Vec<GitHubRepository>,
}

/// `{success, message}` reply of enroll/unenroll.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ActionAck {
    pub success: bool,
    pub message: String,
}

// ── Websites ───────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ListWebSitesResponse {
    pub sites: Vec<Website>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct GetWebSiteResponse {
    pub site: Option<Website>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AddWebSiteRequest {
    pub url: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AddWebSiteResponse {
    pub site: Option<Website>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DeleteWebSiteResponse {
    pub sites: Vec<Website>,
}

// ── Observations ───────────────────────────────────────────────────

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct GetObservationsResponse {
    pub keys: Vec<ObservationKey>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct GetObservationResponse {
    pub observation: Option<Observation>,
}

// ── Config ─────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct GetGlobalConfigResponse {
    pub config: Option<GlobalConfig>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct UpdateGlobalConfigRequest {
    pub config: Option<GlobalConfig>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct UpdateGlobalConfigResponse {
    pub config: Option<GlobalConfig>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct GetUserManagementStatusResponse {
    pub status: Option<UserManagementStatus>,
}

// ── Change reports ─────────────────────────────────────────────────

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct GetChangeSummariesResponse {
    pub summaries: Vec<ChangeAnalysis>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ListChangesSummariesResponse {
    pub summaries: Vec<ChangeAnalysis>,
    #[serde(alias = "total_count")]
    pub total_count: u64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct GetChangesSummaryResponse {
    pub summary: Option<ChangeAnalysis>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CreateChangesSummaryRequest {
    pub repo_id: String,
    pub days_back: u32,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CreateChangesSummaryResponse {
    pub summary: Option<ChangeAnalysis>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DeleteChangesSummaryResponse {
    pub success: bool,
}

// ── GitHub changes ─────────────────────────────────────────────────

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ListGitHubChangesResponse {
    pub changes: Vec<GitHubChangesEntry>,
    pub total: u64,
}
