// Endpoint path templates, relative to the API prefix.

use chrono::{DateTime, SecondsFormat, Utc};

use crate::config::ChangeEndpointFamily;
use crate::types::{AnalysisStatus, ObservationKey};

pub const REPOSITORIES: &str = "/repositories";
pub const WEBSITES: &str = "/websites";
pub const CONFIG: &str = "/config";
pub const USERS_STATUS: &str = "/config/users/status";
pub const GITHUB_CHANGES: &str = "/github-changes";

pub fn repository(id: &str) -> String {
    format!("{REPOSITORIES}/{id}")
}

pub fn repository_rescan(id: &str) -> String {
    format!("{REPOSITORIES}/{id}/rescan")
}

/// `action` is one of `enroll`, `unenroll`, `status`.
pub fn repository_change_analysis(id: &str, action: &str) -> String {
    format!("{REPOSITORIES}/{id}/change-analysis/{action}")
}

pub fn website(id: &str) -> String {
    format!("{WEBSITES}/{id}")
}

pub fn website_rescan(id: &str) -> String {
    format!("{WEBSITES}/{id}/rescan")
}

pub fn observations_by_kind(kind: &str) -> String {
    format!("/observations/kind/{kind}")
}

/// The key's `/` separators travel as `|` so it stays one path segment.
pub fn observation(key: &ObservationKey) -> String {
    format!(
        "/observation/{}/{}/{}",
        key.kind,
        key.name,
        key.path_segment()
    )
}

pub fn repo_github_changes(repo_id: &str) -> String {
    format!("{GITHUB_CHANGES}/{repo_id}")
}

pub fn github_changes_trigger(repo_id: &str) -> String {
    format!("{GITHUB_CHANGES}/{repo_id}/trigger")
}

impl ChangeEndpointFamily {
    /// Collection path for listing reports.
    pub fn list_path(self) -> &'static str {
        match self {
            Self::ChangeAnalysis => "/change-summaries",
            Self::ChangesSummaries => "/changes-summaries",
        }
    }

    /// Path of one report; `None` when the family has no per-report route.
    pub fn item_path(self, id: &str) -> Option<String> {
        match self {
            Self::ChangeAnalysis => None,
            Self::ChangesSummaries => Some(format!("/changes-summaries/{id}")),
        }
    }

    /// Path accepting on-demand report creation.
    pub fn create_path(self) -> Option<&'static str> {
        match self {
            Self::ChangeAnalysis => None,
            Self::ChangesSummaries => Some("/changes-summaries"),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::ChangeAnalysis => "change-analysis",
            Self::ChangesSummaries => "changes-summaries",
        }
    }
}

/// Query filter for listing change reports.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChangeReportFilter {
    pub repo_id: Option<String>,
    pub status: Option<AnalysisStatus>,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
    pub limit: Option<u32>,
    pub offset: Option<u32>,
}

impl ChangeReportFilter {
    /// Filter for a single repository.
    pub fn for_repo(repo_id: impl Into<String>) -> Self {
        Self {
            repo_id: Some(repo_id.into()),
            ..Self::default()
        }
    }

    /// Query-string pairs, omitting unset fields.
    pub fn to_query(&self) -> Vec<(&'static str, String)> {
        let mut query = Vec::new();
        if let Some(repo_id) = &self.repo_id {
            query.push(("repo_id", repo_id.clone()));
        }
        if let Some(status) = &self.status {
            query.push(("status", status.as_str().to_string()));
        }
        if let Some(start) = &self.start_date {
            query.push(("start_date", start.to_rfc3339_opts(SecondsFormat::Secs, true)));
        }
        if let Some(end) = &self.end_date {
            query.push(("end_date", end.to_rfc3339_opts(SecondsFormat::Secs, true)));
        }
        if let Some(limit) = self.limit {
            query.push(("limit", limit.to_string()));
        }
        if let Some(offset) = self.offset {
            query.push(("offset", offset.to_string()));
        }
        query
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    #[test]
    fn observation_path_substitutes_slashes() {
        let key = ObservationKey::new("repos", "arch", "owner/repo/analysis.md");
        assert_eq!(
            observation(&key),
            "/observation/repos/arch/owner|repo|analysis.md"
        );
    }

    #[test]
    fn repository_paths() {
        assert_eq!(repository("r1"), "/repositories/r1");
        assert_eq!(repository_rescan("r1"), "/repositories/r1/rescan");
        assert_eq!(
            repository_change_analysis("r1", "enroll"),
            "/repositories/r1/change-analysis/enroll"
        );
        assert_eq!(website_rescan("w1"), "/websites/w1/rescan");
        assert_eq!(github_changes_trigger("r1"), "/github-changes/r1/trigger");
    }

    #[test]
    fn change_family_templates() {
        let legacy = ChangeEndpointFamily::ChangeAnalysis;
        assert_eq!(legacy.list_path(), "/change-summaries");
        assert!(legacy.item_path("x").is_none());
        assert!(legacy.create_path().is_none());

        let crud = ChangeEndpointFamily::ChangesSummaries;
        assert_eq!(crud.item_path("s1").as_deref(), Some("/changes-summaries/s1"));
        assert_eq!(crud.create_path(), Some("/changes-summaries"));
    }

    #[test]
    fn filter_query_omits_unset() {
        assert!(ChangeReportFilter::default().to_query().is_empty());

        let filter = ChangeReportFilter {
            status: Some(AnalysisStatus::Completed),
            start_date: Some(Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap()),
            offset: Some(20),
            ..ChangeReportFilter::for_repo("r1")
        };
        assert_eq!(
            filter.to_query(),
            vec![
                ("repo_id", "r1".to_string()),
                ("status", "completed".to_string()),
                ("start_date", "2025-01-01T00:00:00Z".to_string()),
                ("offset", "20".to_string()),
            ]
        );
    }
}
