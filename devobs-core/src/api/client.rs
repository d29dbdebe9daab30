// HTTP implementation of `ObserverApi` over reqwest.

use std::sync::Once;
use std::time::Duration;

use reqwest::{Client, Method, Response};
use tracing::{debug, instrument, warn};

use crate::config::{ChangeEndpointFamily, DevObsConfig};
use crate::error::{ApiError, ConfigError, StoreError};
use crate::types::{
    ChangeAnalysis, EnrollmentStatus, GitHubChangesEntry, GitHubRepository, GlobalConfig,
    Observation, ObservationKey, RepoChanges, UserManagementStatus, Website,
};

use super::auth::{self, TokenProvider};
use super::messages::{
    ActionAck, AddGithubRepositoryRequest, AddGithubRepositoryResponse, AddWebSiteRequest,
    AddWebSiteResponse, CreateChangesSummaryRequest, CreateChangesSummaryResponse,
    DeleteChangesSummaryResponse, DeleteGithubRepositoryResponse, DeleteWebSiteResponse,
    GetChangeSummariesResponse, GetChangesSummaryResponse, GetGithubRepositoryResponse,
    GetGlobalConfigResponse, GetObservationResponse, GetObservationsResponse,
    GetUserManagementStatusResponse, GetWebSiteResponse, ListChangesSummariesResponse,
    ListGitHubChangesResponse, ListGithubRepositoriesResponse, ListWebSitesResponse,
    UpdateGlobalConfigRequest, UpdateGlobalConfigResponse,
};
use super::{ApiMessage, ChangeReportFilter, ObserverApi, paths};

const USER_AGENT: &str = concat!("devobs/", env!("CARGO_PKG_VERSION"));

/// Typed client for the dev-observer web API.
///
/// Requests are not retried or cached; every failure surfaces to the caller.
#[derive(Debug)]
pub struct ApiClient {
    client: Client,
    base_url: String,
    token: Option<Box<dyn TokenProvider>>,
}

impl ApiClient {
    /// Build a client from config; attaches the env-token provider when
    /// `auth.enabled`.
    pub fn new(config: &DevObsConfig) -> crate::error::Result<Self> {
        install_crypto_provider();
        let client = Client::builder()
            .timeout(Duration::from_secs(config.server.timeout_secs))
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| ConfigError::Invalid(format!("HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: config.api_url(""),
            token: auth::provider_for(&config.auth),
        })
    }

    /// Replace the token source (e.g. with a session-backed provider).
    #[must_use]
    pub fn with_token_provider(mut self, provider: Box<dyn TokenProvider>) -> Self {
        self.token = Some(provider);
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Send a request and parse the JSON body as `T`.
    #[instrument(skip(self, query, body))]
    pub async fn request<T: ApiMessage>(
        &self,
        method: Method,
        path: &str,
        query: &[(&str, String)],
        body: Option<serde_json::Value>,
    ) -> crate::error::Result<T> {
        let resp = self.send(method, path, query, body).await?;
        let text = resp
            .text()
            .await
            .map_err(|e| ApiError::Network(format!("read body of {path}: {e}")))?;
        let value: serde_json::Value = serde_json::from_str(&text)
            .map_err(|e| ApiError::Parse(format!("{path}: {e}")))?;
        Ok(T::from_json(value).map_err(|e| ApiError::Parse(format!("{path}: {e}")))?)
    }

    /// Send a request whose response body carries nothing of interest.
    #[instrument(skip(self, body))]
    pub async fn request_empty(
        &self,
        method: Method,
        path: &str,
        body: Option<serde_json::Value>,
    ) -> crate::error::Result<()> {
        self.send(method, path, &[], body).await?;
        Ok(())
    }

    async fn send(
        &self,
        method: Method,
        path: &str,
        query: &[(&str, String)],
        body: Option<serde_json::Value>,
    ) -> crate::error::Result<Response> {
        let url = format!("{}{path}", self.base_url);
        let mut req = self
            .client
            .request(method.clone(), &url)
            .header("Accept", "application/json");

        if !query.is_empty() {
            req = req.query(query);
        }
        if let Some(body) = &body {
            req = req.json(body);
        }
        if let Some(provider) = &self.token {
            let token = provider.token().await?;
            req = req.bearer_auth(token);
        }

        debug!(%url, "API request");

        let resp = req
            .send()
            .await
            .map_err(|e| ApiError::Network(format!("{method} {url}: {e}")))?;

        let status = resp.status();
        if !status.is_success() {
            let status_text = status
                .canonical_reason()
                .map_or_else(|| status.as_u16().to_string(), str::to_string);
            warn!(%url, status = status.as_u16(), %status_text, "API request failed");
            return Err(ApiError::Status {
                status: status.as_u16(),
                status_text,
            }
            .into());
        }

        Ok(resp)
    }
}

/// reqwest is built without a default rustls provider; pick aws-lc-rs once.
fn install_crypto_provider() {
    static INSTALL: Once = Once::new();
    INSTALL.call_once(|| {
        // Err means another provider is already installed, which is fine.
        let _ = rustls::crypto::aws_lc_rs::default_provider().install_default();
    });
}

fn encode<B: ApiMessage>(body: &B) -> crate::error::Result<serde_json::Value> {
    Ok(body
        .to_json()
        .map_err(|e| ApiError::Parse(format!("encode request: {e}")))?)
}

fn unsupported(family: ChangeEndpointFamily, op: &str) -> crate::error::DevObsError {
    StoreError::Unsupported(format!("{op} is not offered by the {} endpoints", family.as_str()))
        .into()
}

#[async_trait::async_trait]
impl ObserverApi for ApiClient {
    // ── Repositories ───────────────────────────────────────────────

    async fn list_repositories(&self) -> crate::error::Result<Vec<GitHubRepository>> {
        let resp: ListGithubRepositoriesResponse = self
            .request(Method::GET, paths::REPOSITORIES, &[], None)
            .await?;
        Ok(resp.repos)
    }

    async fn get_repository(&self, id: &str) -> crate::error::Result<Option<GitHubRepository>> {
        let resp: GetGithubRepositoryResponse = self
            .request(Method::GET, &paths::repository(id), &[], None)
            .await?;
        Ok(resp.repo)
    }

    async fn add_repository(&self, url: &str) -> crate::error::Result<Option<GitHubRepository>> {
        let body = encode(&AddGithubRepositoryRequest {
            url: url.to_string(),
        })?;
        let resp: AddGithubRepositoryResponse = self
            .request(Method::POST, paths::REPOSITORIES, &[], Some(body))
            .await?;
        Ok(resp.repo)
    }

    async fn delete_repository(&self, id: &str) -> crate::error::Result<Vec<GitHubRepository>> {
        let resp: DeleteGithubRepositoryResponse = self
            .request(Method::DELETE, &paths::repository(id), &[], None)
            .await?;
        Ok(resp.repos)
    }

    async fn rescan_repository(&self, id: &str) -> crate::error::Result<()> {
        self.request_empty(Method::POST, &paths::repository_rescan(id), None)
            .await
    }

    async fn enroll_repository(&self, id: &str) -> crate::error::Result<ActionAck> {
        self.request(
            Method::POST,
            &paths::repository_change_analysis(id, "enroll"),
            &[],
            None,
        )
        .await
    }

    async fn unenroll_repository(&self, id: &str) -> crate::error::Result<ActionAck> {
        self.request(
            Method::POST,
            &paths::repository_change_analysis(id, "unenroll"),
            &[],
            None,
        )
        .await
    }

    async fn enrollment_status(&self, id: &str) -> crate::error::Result<EnrollmentStatus> {
        self.request(
            Method::GET,
            &paths::repository_change_analysis(id, "status"),
            &[],
            None,
        )
        .await
    }

    // ── Websites ───────────────────────────────────────────────────

    async fn list_websites(&self) -> crate::error::Result<Vec<Website>> {
        let resp: ListWebSitesResponse = self.request(Method::GET, paths::WEBSITES, &[], None).await?;
        Ok(resp.sites)
    }

    async fn get_website(&self, id: &str) -> crate::error::Result<Option<Website>> {
        let resp: GetWebSiteResponse = self
            .request(Method::GET, &paths::website(id), &[], None)
            .await?;
        Ok(resp.site)
    }

    async fn add_website(&self, url: &str) -> crate::error::Result<Option<Website>> {
        let body = encode(&AddWebSiteRequest {
            url: url.to_string(),
        })?;
        let resp: AddWebSiteResponse = self
            .request(Method::POST, paths::WEBSITES, &[], Some(body))
            .await?;
        Ok(resp.site)
    }

    async fn delete_website(&self, id: &str) -> crate::error::Result<Vec<Website>> {
        let resp: DeleteWebSiteResponse = self
            .request(Method::DELETE, &paths::website(id), &[], None)
            .await?;
        Ok(resp.sites)
    }

    async fn rescan_website(&self, id: &str) -> crate::error::Result<()> {
        self.request_empty(Method::POST, &paths::website_rescan(id), None)
            .await
    }

    // ── Observations ───────────────────────────────────────────────

    async fn list_observation_keys(&self, kind: &str) -> crate::error::Result<Vec<ObservationKey>> {
        let resp: GetObservationsResponse = self
            .request(Method::GET, &paths::observations_by_kind(kind), &[], None)
            .await?;
        Ok(resp.keys)
    }

    async fn get_observation(
        &self,
        key: &ObservationKey,
    ) -> crate::error::Result<Option<Observation>> {
        let resp: GetObservationResponse = self
            .request(Method::GET, &paths::observation(key), &[], None)
            .await?;
        Ok(resp.observation)
    }

    // ── Config ─────────────────────────────────────────────────────

    async fn get_global_config(&self) -> crate::error::Result<GlobalConfig> {
        let resp: GetGlobalConfigResponse = self.request(Method::GET, paths::CONFIG, &[], None).await?;
        Ok(resp.config.unwrap_or_default())
    }

    async fn update_global_config(
        &self,
        config: &GlobalConfig,
    ) -> crate::error::Result<GlobalConfig> {
        let body = encode(&UpdateGlobalConfigRequest {
            config: Some(config.clone()),
        })?;
        let resp: UpdateGlobalConfigResponse = self
            .request(Method::POST, paths::CONFIG, &[], Some(body))
            .await?;
        Ok(resp.config.unwrap_or_default())
    }

    async fn user_management_status(&self) -> crate::error::Result<UserManagementStatus> {
        let resp: GetUserManagementStatusResponse = self
            .request(Method::GET, paths::USERS_STATUS, &[], None)
            .await?;
        Ok(resp.status.unwrap_or_default())
    }

    // ── Change reports ─────────────────────────────────────────────

    async fn list_change_reports(
        &self,
        family: ChangeEndpointFamily,
        filter: &ChangeReportFilter,
    ) -> crate::error::Result<Vec<ChangeAnalysis>> {
        let query = filter.to_query();
        match family {
            ChangeEndpointFamily::ChangeAnalysis => {
                let resp: GetChangeSummariesResponse = self
                    .request(Method::GET, family.list_path(), &query, None)
                    .await?;
                Ok(resp.summaries)
            }
            ChangeEndpointFamily::ChangesSummaries => {
                let resp: ListChangesSummariesResponse = self
                    .request(Method::GET, family.list_path(), &query, None)
                    .await?;
                Ok(resp.summaries)
            }
        }
    }

    async fn get_change_report(
        &self,
        family: ChangeEndpointFamily,
        id: &str,
    ) -> crate::error::Result<Option<ChangeAnalysis>> {
        let path = family
            .item_path(id)
            .ok_or_else(|| unsupported(family, "fetching a single report"))?;
        let resp: GetChangesSummaryResponse = self.request(Method::GET, &path, &[], None).await?;
        Ok(resp.summary)
    }

    async fn create_change_report(
        &self,
        family: ChangeEndpointFamily,
        repo_id: &str,
        days_back: u32,
    ) -> crate::error::Result<Option<ChangeAnalysis>> {
        let path = family
            .create_path()
            .ok_or_else(|| unsupported(family, "creating a report"))?;
        let body = encode(&CreateChangesSummaryRequest {
            repo_id: repo_id.to_string(),
            days_back,
        })?;
        let resp: CreateChangesSummaryResponse =
            self.request(Method::POST, path, &[], Some(body)).await?;
        Ok(resp.summary)
    }

    async fn delete_change_report(
        &self,
        family: ChangeEndpointFamily,
        id: &str,
    ) -> crate::error::Result<bool> {
        let path = family
            .item_path(id)
            .ok_or_else(|| unsupported(family, "deleting a report"))?;
        let resp: DeleteChangesSummaryResponse =
            self.request(Method::DELETE, &path, &[], None).await?;
        Ok(resp.success)
    }

    // ── GitHub changes ─────────────────────────────────────────────

    async fn list_github_changes(&self) -> crate::error::Result<Vec<GitHubChangesEntry>> {
        let resp: ListGitHubChangesResponse = self
            .request(Method::GET, paths::GITHUB_CHANGES, &[], None)
            .await?;
        Ok(resp.changes)
    }

    async fn get_repo_changes(
        &self,
        repo_id: &str,
        days: u32,
    ) -> crate::error::Result<RepoChanges> {
        self.request(
            Method::GET,
            &paths::repo_github_changes(repo_id),
            &[("days", days.to_string())],
            None,
        )
        .await
    }

    async fn trigger_github_changes(&self, repo_id: &str) -> crate::error::Result<()> {
        self.request_empty(Method::POST, &paths::github_changes_trigger(repo_id), None)
            .await
    }
}

// ── Tests ───────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;
    use tokio::task::JoinHandle;

    use super::*;
    use crate::api::auth::StaticTokenProvider;
    use crate::error::DevObsError;

    /// Serve exactly one canned HTTP response; yields the raw request text.
    async fn serve_once(status_line: &'static str, body: &'static str) -> (String, JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let handle = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut raw = Vec::new();
            let mut buf = [0u8; 4096];
            loop {
                let n = socket.read(&mut buf).await.unwrap();
                raw.extend_from_slice(&buf[..n]);
                let text = String::from_utf8_lossy(&raw).to_string();
                if let Some(head_end) = text.find("\r\n\r\n") {
                    let content_length = text[..head_end]
                        .lines()
                        .find_map(|l| {
                            let (k, v) = l.split_once(':')?;
                            k.eq_ignore_ascii_case("content-length")
                                .then(|| v.trim().parse::<usize>().ok())?
                        })
                        .unwrap_or(0);
                    if raw.len() >= head_end + 4 + content_length {
                        break;
                    }
                }
                if n == 0 {
                    break;
                }
            }
            let response = format!(
                "HTTP/1.1 {status_line}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                body.len()
            );
            socket.write_all(response.as_bytes()).await.unwrap();
            socket.shutdown().await.ok();
            String::from_utf8_lossy(&raw).to_string()
        });
        (format!("http://{addr}"), handle)
    }

    fn client_for(base_url: &str) -> ApiClient {
        let mut config = DevObsConfig::default();
        config.server.base_url = base_url.to_string();
        ApiClient::new(&config).unwrap()
    }

    #[test]
    fn base_url_includes_prefix() {
        let client = client_for("http://observer.local:8090/");
        assert_eq!(client.base_url(), "http://observer.local:8090/api/v1");
    }

    #[tokio::test]
    async fn lists_repositories() {
        let (base, server) = serve_once(
            "200 OK",
            r#"{"repos":[{"id":"1","name":"api","url":"https://github.com/acme/api","fullName":"acme/api"}]}"#,
        )
        .await;
        let repos = client_for(&base).list_repositories().await.unwrap();
        assert_eq!(repos.len(), 1);
        assert_eq!(repos[0].full_name, "acme/api");

        let request = server.await.unwrap();
        assert!(request.starts_with("GET /api/v1/repositories HTTP/1.1"));
        assert!(!request.to_lowercase().contains("authorization:"));
    }

    #[tokio::test]
    async fn non_success_carries_status_text() {
        let (base, _server) = serve_once("404 Not Found", r#"{"detail":"nope"}"#).await;
        let err = client_for(&base).get_repository("missing").await.unwrap_err();
        match err {
            DevObsError::Api(ApiError::Status {
                status,
                status_text,
            }) => {
                assert_eq!(status, 404);
                assert_eq!(status_text, "Not Found");
            }
            other => panic!("expected status error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn malformed_json_is_parse_error() {
        let (base, _server) = serve_once("200 OK", "{not json").await;
        let err = client_for(&base).list_websites().await.unwrap_err();
        assert!(matches!(err, DevObsError::Api(ApiError::Parse(_))));
    }

    #[tokio::test]
    async fn bearer_token_attached_when_provider_set() {
        let (base, server) = serve_once("200 OK", r#"{"keys":[]}"#).await;
        let client = client_for(&base)
            .with_token_provider(Box::new(StaticTokenProvider("s3cret".to_string())));
        let keys = client.list_observation_keys("repos").await.unwrap();
        assert!(keys.is_empty());

        let request = server.await.unwrap().to_lowercase();
        assert!(request.contains("authorization: bearer s3cret"));
    }

    #[tokio::test]
    async fn empty_response_body_is_ignored() {
        let (base, server) = serve_once("200 OK", "").await;
        client_for(&base).rescan_repository("r1").await.unwrap();
        let request = server.await.unwrap();
        assert!(request.starts_with("POST /api/v1/repositories/r1/rescan HTTP/1.1"));
    }

    #[tokio::test]
    async fn observation_request_uses_pipe_key() {
        let (base, server) = serve_once(
            "200 OK",
            r##"{"observation":{"kind":"repos","name":"arch","key":"a/b/analysis.md","content":"# A"}}"##,
        )
        .await;
        let key = ObservationKey::new("repos", "arch", "a/b/analysis.md");
        let obs = client_for(&base).get_observation(&key).await.unwrap().unwrap();
        assert_eq!(obs.content, "# A");

        let request = server.await.unwrap();
        assert!(request.starts_with("GET /api/v1/observation/repos/arch/a|b|analysis.md HTTP/1.1"));
    }

    #[tokio::test]
    async fn add_repository_posts_url() {
        let (base, server) = serve_once(
            "200 OK",
            r#"{"repo":{"id":"9","url":"https://github.com/a/b","fullName":"a/b"}}"#,
        )
        .await;
        let repo = client_for(&base)
            .add_repository("https://github.com/a/b")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(repo.id, "9");

        let request = server.await.unwrap();
        assert!(request.starts_with("POST /api/v1/repositories HTTP/1.1"));
        assert!(request.contains(r#"{"url":"https://github.com/a/b"}"#));
    }

    #[tokio::test]
    async fn unsupported_family_operation_fails_without_network() {
        let client = client_for("http://127.0.0.1:9");
        let err = client
            .delete_change_report(ChangeEndpointFamily::ChangeAnalysis, "x")
            .await
            .unwrap_err();
        assert!(matches!(err, DevObsError::Store(StoreError::Unsupported(_))));
    }
}
