// In-memory dev-observer backend and fixtures for store integration tests.

use std::collections::{BTreeMap, HashSet};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tokio::sync::Notify;

use devobs_core::api::{ActionAck, ChangeReportFilter, ObserverApi};
use devobs_core::config::ChangeEndpointFamily;
use devobs_core::error::{ApiError, Result, StoreError};
use devobs_core::store::AppStore;
use devobs_core::types::{
    AnalysisStatus, ChangeAnalysis, ChangeAnalysisConfig, EnrollmentStatus, GitHubChangesEntry,
    GitHubRepository, GitProperties, GlobalConfig, Observation, ObservationKey, RepoChanges,
    UserManagementStatus, Website,
};

#[derive(Debug, Default)]
struct State {
    repos: BTreeMap<String, GitHubRepository>,
    websites: BTreeMap<String, Website>,
    observations: BTreeMap<String, Observation>,
    config: GlobalConfig,
    user_status: UserManagementStatus,
    reports: BTreeMap<String, ChangeAnalysis>,
    github_changes: Vec<GitHubChangesEntry>,
    /// Parents whose change-report listing fails with HTTP 500.
    failing_parents: HashSet<String>,
    /// Parents whose change-report listing waits on `gate`.
    gated_parents: HashSet<String>,
    reject_enrollment: bool,
    echo_created: bool,
    calls: Vec<String>,
}

/// Backend double implementing [`ObserverApi`] over in-memory maps.
#[derive(Debug)]
pub struct FakeBackend {
    state: Mutex<State>,
    next_id: AtomicU64,
    gate: Notify,
}

impl Default for FakeBackend {
    fn default() -> Self {
        Self::new()
    }
}

fn not_found(what: &str, id: &str) -> ApiError {
    ApiError::Status {
        status: 404,
        status_text: format!("{what} {id} not found"),
    }
}

impl FakeBackend {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(State {
                echo_created: true,
                ..State::default()
            }),
            next_id: AtomicU64::new(1),
            gate: Notify::new(),
        }
    }

    fn state(&self) -> std::sync::MutexGuard<'_, State> {
        self.state.lock().expect("fake backend mutex poisoned")
    }

    fn record(&self, call: impl Into<String>) {
        self.state().calls.push(call.into());
    }

    fn fresh_id(&self, prefix: &str) -> String {
        format!("{prefix}-{}", self.next_id.fetch_add(1, Ordering::Relaxed))
    }

    // ── Seeding ────────────────────────────────────────────────────

    pub fn with_repo(self, id: &str, full_name: &str) -> Self {
        let repo = repo(id, full_name);
        self.state().repos.insert(id.to_string(), repo);
        self
    }

    pub fn with_website(self, id: &str, url: &str) -> Self {
        self.state().websites.insert(
            id.to_string(),
            Website {
                id: id.into(),
                url: url.into(),
            },
        );
        self
    }

    pub fn with_observation(self, kind: &str, name: &str, key: &str, content: &str) -> Self {
        let obs = Observation {
            kind: kind.into(),
            name: name.into(),
            key: key.into(),
            content: content.into(),
        };
        self.state()
            .observations
            .insert(obs.observation_key().cache_key(), obs);
        self
    }

    pub fn with_report(self, id: &str, repo_id: &str, status: AnalysisStatus) -> Self {
        self.state().reports.insert(
            id.to_string(),
            ChangeAnalysis {
                id: id.into(),
                repo_id: repo_id.into(),
                status,
                ..ChangeAnalysis::default()
            },
        );
        self
    }

    pub fn with_github_changes(self, entry: GitHubChangesEntry) -> Self {
        self.state().github_changes.push(entry);
        self
    }

    pub fn with_config(self, config: GlobalConfig) -> Self {
        self.state().config = config;
        self
    }

    // ── Fault injection ────────────────────────────────────────────

    /// Make change-report listing for `parent` fail with HTTP 500.
    pub fn fail_reports_for(&self, parent: &str) {
        self.state().failing_parents.insert(parent.to_string());
    }

    pub fn heal_reports_for(&self, parent: &str) {
        self.state().failing_parents.remove(parent);
    }

    /// Hold change-report listing for `parent` until [`Self::release`].
    pub fn gate_reports_for(&self, parent: &str) {
        self.state().gated_parents.insert(parent.to_string());
    }

    pub fn release(&self) {
        self.gate.notify_one();
    }

    /// Acknowledge enrollment changes with `success: false`.
    pub fn reject_enrollment(&self) {
        self.state().reject_enrollment = true;
    }

    /// Make create calls return an empty envelope instead of the new entity.
    pub fn stop_echoing_created(&self) {
        self.state().echo_created = false;
    }

    // ── Inspection ─────────────────────────────────────────────────

    pub fn calls(&self) -> Vec<String> {
        self.state().calls.clone()
    }

    pub fn call_count(&self, prefix: &str) -> usize {
        self.state()
            .calls
            .iter()
            .filter(|c| c.starts_with(prefix))
            .count()
    }

    /// Remove a repository behind the client's back.
    pub fn drop_repo(&self, id: &str) {
        self.state().repos.remove(id);
    }

    /// Delete a stored observation behind the client's back.
    pub fn drop_observation(&self, key: &ObservationKey) {
        self.state().observations.remove(&key.cache_key());
    }

    /// Edit a repository behind the client's back.
    pub fn rename_repo(&self, id: &str, full_name: &str) {
        if let Some(r) = self.state().repos.get_mut(id) {
            r.full_name = full_name.to_string();
        }
    }
}

/// Repository fixture with a GitHub URL derived from `full_name`.
pub fn repo(id: &str, full_name: &str) -> GitHubRepository {
    let name = full_name.rsplit('/').next().unwrap_or(full_name);
    GitHubRepository {
        id: id.into(),
        name: name.into(),
        url: format!("https://github.com/{full_name}"),
        full_name: full_name.into(),
        properties: None,
    }
}

/// A store wired to `backend` with the given change-report family.
pub fn store_over(backend: &Arc<FakeBackend>, family: ChangeEndpointFamily) -> AppStore {
    AppStore::new(Arc::clone(backend) as Arc<dyn ObserverApi>, family)
}

#[async_trait]
impl ObserverApi for FakeBackend {
    async fn list_repositories(&self) -> Result<Vec<GitHubRepository>> {
        self.record("list_repositories");
        Ok(self.state().repos.values().cloned().collect())
    }

    async fn get_repository(&self, id: &str) -> Result<Option<GitHubRepository>> {
        self.record(format!("get_repository {id}"));
        Ok(self.state().repos.get(id).cloned())
    }

    async fn add_repository(&self, url: &str) -> Result<Option<GitHubRepository>> {
        self.record(format!("add_repository {url}"));
        let id = self.fresh_id("repo");
        let full_name = url
            .trim_start_matches("https://github.com/")
            .trim_end_matches(".git")
            .trim_end_matches('/')
            .to_string();
        let mut created = repo(&id, &full_name);
        created.url = url.to_string();
        let mut state = self.state();
        state.repos.insert(id, created.clone());
        Ok(state.echo_created.then_some(created))
    }

    async fn delete_repository(&self, id: &str) -> Result<Vec<GitHubRepository>> {
        self.record(format!("delete_repository {id}"));
        let mut state = self.state();
        state.repos.remove(id).ok_or_else(|| not_found("repository", id))?;
        Ok(state.repos.values().cloned().collect())
    }

    async fn rescan_repository(&self, id: &str) -> Result<()> {
        self.record(format!("rescan_repository {id}"));
        if self.state().repos.contains_key(id) {
            Ok(())
        } else {
            Err(not_found("repository", id).into())
        }
    }

    async fn enroll_repository(&self, id: &str) -> Result<ActionAck> {
        self.record(format!("enroll_repository {id}"));
        self.set_enrollment(id, true)
    }

    async fn unenroll_repository(&self, id: &str) -> Result<ActionAck> {
        self.record(format!("unenroll_repository {id}"));
        self.set_enrollment(id, false)
    }

    async fn enrollment_status(&self, id: &str) -> Result<EnrollmentStatus> {
        self.record(format!("enrollment_status {id}"));
        let state = self.state();
        let repo = state.repos.get(id).ok_or_else(|| not_found("repository", id))?;
        Ok(EnrollmentStatus {
            enrolled: repo.is_enrolled(),
            last_analysis: repo.last_analysis(),
        })
    }

    async fn list_websites(&self) -> Result<Vec<Website>> {
        self.record("list_websites");
        Ok(self.state().websites.values().cloned().collect())
    }

    async fn get_website(&self, id: &str) -> Result<Option<Website>> {
        self.record(format!("get_website {id}"));
        Ok(self.state().websites.get(id).cloned())
    }

    async fn add_website(&self, url: &str) -> Result<Option<Website>> {
        self.record(format!("add_website {url}"));
        let id = self.fresh_id("site");
        let site = Website {
            id: id.clone(),
            url: url.to_string(),
        };
        let mut state = self.state();
        state.websites.insert(id, site.clone());
        Ok(state.echo_created.then_some(site))
    }

    async fn delete_website(&self, id: &str) -> Result<Vec<Website>> {
        self.record(format!("delete_website {id}"));
        let mut state = self.state();
        state.websites.remove(id).ok_or_else(|| not_found("website", id))?;
        Ok(state.websites.values().cloned().collect())
    }

    async fn rescan_website(&self, id: &str) -> Result<()> {
        self.record(format!("rescan_website {id}"));
        Ok(())
    }

    async fn list_observation_keys(&self, kind: &str) -> Result<Vec<ObservationKey>> {
        self.record(format!("list_observation_keys {kind}"));
        Ok(self
            .state()
            .observations
            .values()
            .filter(|o| o.kind == kind)
            .map(Observation::observation_key)
            .collect())
    }

    async fn get_observation(&self, key: &ObservationKey) -> Result<Option<Observation>> {
        self.record(format!("get_observation {key}"));
        Ok(self.state().observations.get(&key.cache_key()).cloned())
    }

    async fn get_global_config(&self) -> Result<GlobalConfig> {
        self.record("get_global_config");
        Ok(self.state().config.clone())
    }

    async fn update_global_config(&self, config: &GlobalConfig) -> Result<GlobalConfig> {
        self.record("update_global_config");
        let mut state = self.state();
        state.config = config.clone();
        Ok(state.config.clone())
    }

    async fn user_management_status(&self) -> Result<UserManagementStatus> {
        self.record("user_management_status");
        Ok(self.state().user_status.clone())
    }

    async fn list_change_reports(
        &self,
        family: ChangeEndpointFamily,
        filter: &ChangeReportFilter,
    ) -> Result<Vec<ChangeAnalysis>> {
        let parent = filter.repo_id.clone().unwrap_or_default();
        self.record(format!("list_change_reports {} {parent}", family.as_str()));

        let gated = self.state().gated_parents.remove(&parent);
        if gated {
            self.gate.notified().await;
        }

        let state = self.state();
        if state.failing_parents.contains(&parent) {
            return Err(ApiError::Status {
                status: 500,
                status_text: "Internal Server Error".into(),
            }
            .into());
        }
        Ok(state
            .reports
            .values()
            .filter(|r| r.repo_id == parent)
            .filter(|r| filter.status.as_ref().is_none_or(|s| &r.status == s))
            .cloned()
            .collect())
    }

    async fn get_change_report(
        &self,
        family: ChangeEndpointFamily,
        id: &str,
    ) -> Result<Option<ChangeAnalysis>> {
        self.record(format!("get_change_report {} {id}", family.as_str()));
        if family == ChangeEndpointFamily::ChangeAnalysis {
            return Err(StoreError::Unsupported(format!(
                "get change report is not offered by {}",
                family.as_str()
            ))
            .into());
        }
        Ok(self.state().reports.get(id).cloned())
    }

    async fn create_change_report(
        &self,
        family: ChangeEndpointFamily,
        repo_id: &str,
        days_back: u32,
    ) -> Result<Option<ChangeAnalysis>> {
        self.record(format!("create_change_report {} {repo_id}", family.as_str()));
        let report = ChangeAnalysis {
            id: self.fresh_id("report"),
            repo_id: repo_id.into(),
            status: AnalysisStatus::Pending,
            period_days: Some(days_back),
            ..ChangeAnalysis::default()
        };
        let mut state = self.state();
        state.reports.insert(report.id.clone(), report.clone());
        Ok(state.echo_created.then_some(report))
    }

    async fn delete_change_report(&self, family: ChangeEndpointFamily, id: &str) -> Result<bool> {
        self.record(format!("delete_change_report {} {id}", family.as_str()));
        Ok(self.state().reports.remove(id).is_some())
    }

    async fn list_github_changes(&self) -> Result<Vec<GitHubChangesEntry>> {
        self.record("list_github_changes");
        Ok(self.state().github_changes.clone())
    }

    async fn get_repo_changes(&self, repo_id: &str, days: u32) -> Result<RepoChanges> {
        self.record(format!("get_repo_changes {repo_id} {days}"));
        let state = self.state();
        let repo = state
            .repos
            .get(repo_id)
            .ok_or_else(|| not_found("repository", repo_id))?;
        Ok(RepoChanges {
            repository: repo.full_name.clone(),
            period_days: days,
            summary: None,
            message: Some("No changes summary available yet".into()),
            last_updated: None,
        })
    }

    async fn trigger_github_changes(&self, repo_id: &str) -> Result<()> {
        self.record(format!("trigger_github_changes {repo_id}"));
        Ok(())
    }
}

impl FakeBackend {
    fn set_enrollment(&self, id: &str, enrolled: bool) -> Result<ActionAck> {
        let mut state = self.state();
        if state.reject_enrollment {
            return Ok(ActionAck {
                success: false,
                message: "enrollment is locked".into(),
            });
        }
        let repo = state
            .repos
            .get_mut(id)
            .ok_or_else(|| not_found("repository", id))?;
        let props = repo.properties.get_or_insert_with(GitProperties::default);
        props.change_analysis = Some(ChangeAnalysisConfig {
            enrolled,
            last_analysis: None,
        });
        Ok(ActionAck {
            success: true,
            message: String::new(),
        })
    }
}
