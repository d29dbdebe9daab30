use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ── Entity trait ───────────────────────────────────────────────────

/// Anything the store keeps in an id-keyed map.
pub trait Entity: Clone + Send + Sync + 'static {
    /// Server-assigned identifier.
    fn id(&self) -> &str;
}

macro_rules! entity {
    ($name:ident) => {
        impl Entity for $name {
            fn id(&self) -> &str {
                &self.id
            }
        }
    };
}

// ── Repositories ───────────────────────────────────────────────────

/// A GitHub repository registered with the observer.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GitHubRepository {
    pub id: String,
    pub name: String,
    pub url: String,
    #[serde(alias = "full_name")]
    pub full_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub properties: Option<GitProperties>,
}

entity!(GitHubRepository);

impl GitHubRepository {
    /// Whether the repository is enrolled for recurring change analysis.
    pub fn is_enrolled(&self) -> bool {
        self.properties
            .as_ref()
            .and_then(|p| p.change_analysis.as_ref())
            .is_some_and(|c| c.enrolled)
    }

    /// Timestamp of the most recent change analysis, if any.
    pub fn last_analysis(&self) -> Option<DateTime<Utc>> {
        self.properties
            .as_ref()
            .and_then(|p| p.change_analysis.as_ref())
            .and_then(|c| c.last_analysis)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GitProperties {
    #[serde(alias = "app_info", skip_serializing_if = "Option::is_none")]
    pub app_info: Option<GitAppInfo>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meta: Option<GitMeta>,
    #[serde(alias = "change_analysis", skip_serializing_if = "Option::is_none")]
    pub change_analysis: Option<ChangeAnalysisConfig>,
}

/// GitHub App installation metadata.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GitAppInfo {
    #[serde(alias = "last_refresh", skip_serializing_if = "Option::is_none")]
    pub last_refresh: Option<DateTime<Utc>>,
    #[serde(
        alias = "installation_id",
        with = "pb_int::option",
        skip_serializing_if = "Option::is_none"
    )]
    pub installation_id: Option<u64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GitMeta {
    #[serde(alias = "last_refresh", skip_serializing_if = "Option::is_none")]
    pub last_refresh: Option<DateTime<Utc>>,
    #[serde(alias = "clone_url", skip_serializing_if = "Option::is_none")]
    pub clone_url: Option<String>,
    #[serde(
        alias = "size_kb",
        with = "pb_int::option",
        skip_serializing_if = "Option::is_none"
    )]
    pub size_kb: Option<u64>,
}

/// Change-analysis enrollment state stored on a repository.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ChangeAnalysisConfig {
    pub enrolled: bool,
    #[serde(alias = "last_analysis", skip_serializing_if = "Option::is_none")]
    pub last_analysis: Option<DateTime<Utc>>,
}

// ── Websites ───────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Website {
    pub id: String,
    pub url: String,
}

entity!(Website);

// ── Observations ───────────────────────────────────────────────────

/// Composite address of an observation: category, analyzer, opaque key.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(default)]
pub struct ObservationKey {
    pub kind: String,
    pub name: String,
    pub key: String,
}

impl ObservationKey {
    pub fn new(kind: impl Into<String>, name: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            name: name.into(),
            key: key.into(),
        }
    }

    /// The key as it travels in a URL path: every `/` becomes `|`.
    pub fn path_segment(&self) -> String {
        self.key.replace('/', "|")
    }

    /// Canonical cache string `kind/name/key`.
    pub fn cache_key(&self) -> String {
        format!("{}/{}/{}", self.kind, self.name, self.key)
    }
}

impl std::fmt::Display for ObservationKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.cache_key())
    }
}

/// A stored text artifact (usually markdown) produced by an analyzer.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Observation {
    pub kind: String,
    pub name: String,
    pub key: String,
    pub content: String,
}

impl Observation {
    pub fn observation_key(&self) -> ObservationKey {
        ObservationKey::new(&self.kind, &self.name, &self.key)
    }
}

// ── Change analysis ────────────────────────────────────────────────

/// Lifecycle of a change-analysis job.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum AnalysisStatus {
    #[default]
    Pending,
    Processing,
    Completed,
    Failed,
    /// A status string this client does not know; kept verbatim.
    Unknown(String),
}

impl AnalysisStatus {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Pending => "pending",
            Self::Processing => "processing",
            Self::Completed => "completed",
            Self::Failed => "failed",
            Self::Unknown(s) => s,
        }
    }
}

impl From<String> for AnalysisStatus {
    fn from(s: String) -> Self {
        match s.to_ascii_lowercase().as_str() {
            "pending" | "" => Self::Pending,
            "processing" | "in_progress" | "running" => Self::Processing,
            "completed" | "complete" | "done" => Self::Completed,
            "failed" | "error" => Self::Failed,
            _ => Self::Unknown(s),
        }
    }
}

impl From<AnalysisStatus> for String {
    fn from(status: AnalysisStatus) -> Self {
        status.as_str().to_string()
    }
}

impl std::fmt::Display for AnalysisStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Aggregate diff statistics for an analysed period.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ChangeStats {
    #[serde(alias = "commit_count", alias = "totalCommits", alias = "total_commits")]
    pub commit_count: u64,
    pub additions: u64,
    pub deletions: u64,
    #[serde(alias = "files_changed")]
    pub files_changed: u64,
    /// Lines changed per language.
    #[serde(alias = "language_breakdown", alias = "languageBreakdown")]
    pub languages: BTreeMap<String, u64>,
}

/// One report describing repository activity over a period.
///
/// Accepts the field names of every backend revision of this message
/// (`ChangeSummary`, `ChangesSummary`, `RepoChangeAnalysis`).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ChangeAnalysis {
    #[serde(alias = "jobId", alias = "job_id")]
    pub id: String,
    #[serde(alias = "repo_id")]
    pub repo_id: String,
    #[serde(alias = "repo_name", skip_serializing_if = "Option::is_none")]
    pub repo_name: Option<String>,
    pub status: AnalysisStatus,
    #[serde(alias = "error_message", skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
    #[serde(alias = "observation_key", skip_serializing_if = "Option::is_none")]
    pub observation_key: Option<String>,
    #[serde(
        alias = "summary_content",
        alias = "summary",
        skip_serializing_if = "Option::is_none"
    )]
    pub summary_content: Option<String>,
    #[serde(alias = "statistics", skip_serializing_if = "Option::is_none")]
    pub stats: Option<ChangeStats>,
    #[serde(alias = "period_days", alias = "daysBack", alias = "days_back", skip_serializing_if = "Option::is_none")]
    pub period_days: Option<u32>,
    #[serde(alias = "analyzed_at", skip_serializing_if = "Option::is_none")]
    pub analyzed_at: Option<DateTime<Utc>>,
    #[serde(alias = "created_at", skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

entity!(ChangeAnalysis);

/// Enrollment flag plus last-analysis timestamp for one repository.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EnrollmentStatus {
    pub enrolled: bool,
    #[serde(alias = "last_analysis", skip_serializing_if = "Option::is_none")]
    pub last_analysis: Option<DateTime<Utc>>,
}

// ── GitHub changes ─────────────────────────────────────────────────

/// Listing entry of a stored `github_changes` observation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GitHubChangesEntry {
    pub repository: String,
    pub period: String,
    pub name: String,
    pub key: String,
}

/// Changes summary of one repository for a number of days.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RepoChanges {
    pub repository: String,
    #[serde(alias = "period_days")]
    pub period_days: u32,
    pub summary: Option<String>,
    pub message: Option<String>,
    #[serde(alias = "last_updated")]
    pub last_updated: Option<String>,
}

// ── Global config ──────────────────────────────────────────────────

/// Backend-wide analysis configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GlobalConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub analysis: Option<AnalysisConfig>,
    #[serde(alias = "repo_analysis", skip_serializing_if = "Option::is_none")]
    pub repo_analysis: Option<RepoAnalysisConfig>,
    #[serde(alias = "website_crawling", skip_serializing_if = "Option::is_none")]
    pub website_crawling: Option<WebsiteCrawlingConfig>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AnalysisConfig {
    #[serde(alias = "repo_analyzers")]
    pub repo_analyzers: Vec<Analyzer>,
    #[serde(alias = "site_analyzers")]
    pub site_analyzers: Vec<Analyzer>,
    #[serde(alias = "disable_masking")]
    pub disable_masking: bool,
}

/// A named prompt that produces one observation file per entity.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Analyzer {
    pub name: String,
    #[serde(alias = "prompt_prefix")]
    pub prompt_prefix: String,
    #[serde(alias = "file_name")]
    pub file_name: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RepoAnalysisConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub flatten: Option<FlattenConfig>,
}

/// Repository flattening knobs applied before analysis.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
#[allow(clippy::struct_excessive_bools)]
pub struct FlattenConfig {
    #[serde(alias = "max_tokens_per_chunk")]
    pub max_tokens_per_chunk: u64,
    #[serde(alias = "max_file_size_bytes", with = "pb_int")]
    pub max_file_size_bytes: u64,
    #[serde(alias = "large_repo_threshold_mb")]
    pub large_repo_threshold_mb: u64,
    #[serde(alias = "ignore_pattern")]
    pub ignore_pattern: String,
    #[serde(alias = "large_repo_ignore_pattern")]
    pub large_repo_ignore_pattern: String,
    pub compress: bool,
    #[serde(alias = "compress_large")]
    pub compress_large: bool,
    #[serde(alias = "out_style")]
    pub out_style: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct WebsiteCrawlingConfig {
    #[serde(alias = "website_scan_timeout_seconds")]
    pub website_scan_timeout_seconds: u32,
}

/// Whether the backend sits behind an identity provider.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UserManagementStatus {
    pub enabled: bool,
    #[serde(alias = "public_api_key", skip_serializing_if = "Option::is_none")]
    pub public_api_key: Option<String>,
}

// ── Protobuf JSON integers ─────────────────────────────────────────

/// Protobuf JSON encodes 64-bit integers as strings; accept either form.
mod pb_int {
    use serde::{Deserialize, Deserializer, Serializer};

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Num(u64),
        Str(String),
    }

    fn parse<E: serde::de::Error>(raw: Raw) -> Result<u64, E> {
        match raw {
            Raw::Num(n) => Ok(n),
            Raw::Str(s) => s.parse().map_err(E::custom),
        }
    }

    #[allow(clippy::trivially_copy_pass_by_ref)]
    pub fn serialize<S: Serializer>(value: &u64, ser: S) -> Result<S::Ok, S::Error> {
        ser.serialize_str(&value.to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(de: D) -> Result<u64, D::Error> {
        parse(Raw::deserialize(de)?)
    }

    pub mod option {
        use serde::{Deserialize, Deserializer, Serializer};

        use super::Raw;

        #[allow(clippy::ref_option)]
        pub fn serialize<S: Serializer>(value: &Option<u64>, ser: S) -> Result<S::Ok, S::Error> {
            match value {
                Some(v) => ser.serialize_str(&v.to_string()),
                None => ser.serialize_none(),
            }
        }

        pub fn deserialize<'de, D: Deserializer<'de>>(de: D) -> Result<Option<u64>, D::Error> {
            Option::<Raw>::deserialize(de)?.map(super::parse).transpose()
        }
    }
}

// ── Tests ──────────────────────────────────────────────────────────
