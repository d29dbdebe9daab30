//! Client-side form validation, run before any network call.
//!
//! Validators return `None` for acceptable input or a [`ValidationError`]
//! naming the field and a user-facing message. Duplicate detection compares
//! the raw strings exactly: `https://github.com/a/b` and
//! `https://github.com/a/b.git` count as different repositories.

use std::sync::OnceLock;

use regex::Regex;
use reqwest::Url;

use crate::error::ValidationError;
use crate::types::{GitHubRepository, Website};

pub const URL_FIELD: &str = "url";

static GITHUB_HTTPS_RE: OnceLock<Regex> = OnceLock::new();

/// Owner and repository segments may carry a query or fragment.
fn github_https_re() -> &'static Regex {
    GITHUB_HTTPS_RE
        .get_or_init(|| Regex::new(r"^https://github\.com/[^\\/]+/[^\\/]+/?$").unwrap())
}

/// Validate a GitHub repository URL against the repositories already added.
pub fn validate_github_url<'a>(
    url: &str,
    existing: impl IntoIterator<Item = &'a GitHubRepository>,
) -> Option<ValidationError> {
    if url.is_empty() {
        return Some(ValidationError::new(URL_FIELD, "Repository URL is required"));
    }

    // scp-style SSH remotes are not URLs and fail here.
    if Url::parse(url).is_err() {
        return Some(ValidationError::new(URL_FIELD, "Invalid URL format"));
    }
    if !github_https_re().is_match(url) {
        return Some(ValidationError::new(
            URL_FIELD,
            "URL must be a valid GitHub repository URL",
        ));
    }

    if existing.into_iter().any(|repo| repo.url == url) {
        return Some(ValidationError::new(
            URL_FIELD,
            "This repository has already been added",
        ));
    }

    None
}

/// Validate a website URL against the websites already added.
pub fn validate_website_url<'a>(
    url: &str,
    existing: impl IntoIterator<Item = &'a Website>,
) -> Option<ValidationError> {
    if url.is_empty() {
        return Some(ValidationError::new(URL_FIELD, "Website URL is required"));
    }

    let Ok(parsed) = Url::parse(url) else {
        return Some(ValidationError::new(URL_FIELD, "Invalid URL format"));
    };
    if !matches!(parsed.scheme(), "http" | "https") {
        return Some(ValidationError::new(URL_FIELD, "URL must use http or https"));
    }

    if existing.into_iter().any(|site| site.url == url) {
        return Some(ValidationError::new(
            URL_FIELD,
            "This website has already been added",
        ));
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    const NO_REPOS: &[GitHubRepository] = &[];
    const NO_SITES: &[Website] = &[];

    fn repo(url: &str) -> GitHubRepository {
        GitHubRepository {
            id: "1".into(),
            url: url.into(),
            ..GitHubRepository::default()
        }
    }

    fn message(err: Option<ValidationError>) -> String {
        err.map(|e| e.message).unwrap_or_default()
    }

    #[test]
    fn empty_url_is_required() {
        let err = validate_github_url("", NO_REPOS).unwrap();
        assert_eq!(err.field, "url");
        assert_eq!(err.message, "Repository URL is required");
    }

    #[test]
    fn non_url_is_invalid_format() {
        assert_eq!(
            message(validate_github_url("not a url", NO_REPOS)),
            "Invalid URL format"
        );
    }

    #[test]
    fn other_forge_is_rejected() {
        assert_eq!(
            message(validate_github_url("https://gitlab.com/a/b", NO_REPOS)),
            "URL must be a valid GitHub repository URL"
        );
        assert_eq!(
            message(validate_github_url("https://github.com/only-owner", NO_REPOS)),
            "URL must be a valid GitHub repository URL"
        );
        assert_eq!(
            message(validate_github_url("http://github.com/a/b", NO_REPOS)),
            "URL must be a valid GitHub repository URL"
        );
    }

    #[test]
    fn exact_duplicate_is_rejected() {
        let existing = [repo("https://github.com/owner/repo")];
        assert_eq!(
            message(validate_github_url("https://github.com/owner/repo", &existing)),
            "This repository has already been added"
        );
    }

    #[test]
    fn duplicate_check_is_exact_string() {
        let existing = [repo("https://github.com/owner/repo")];
        assert!(validate_github_url("https://github.com/owner/repo/", &existing).is_none());
        assert!(validate_github_url("https://github.com/Owner/Repo", &existing).is_none());
    }

    #[test]
    fn valid_urls_pass() {
        assert!(validate_github_url("https://github.com/owner/repo", NO_REPOS).is_none());
        assert!(validate_github_url("https://github.com/owner/repo/", NO_REPOS).is_none());
        assert!(validate_github_url("https://github.com/my.org/my-repo_2", NO_REPOS).is_none());
    }

    #[test]
    fn query_and_fragment_are_accepted() {
        assert!(validate_github_url("https://github.com/owner/repo?tab=readme", NO_REPOS).is_none());
        assert!(validate_github_url("https://github.com/owner/repo#readme", NO_REPOS).is_none());
    }

    #[test]
    fn ssh_remote_is_invalid_format() {
        assert_eq!(
            message(validate_github_url("git@github.com:owner/repo.git", NO_REPOS)),
            "Invalid URL format"
        );
    }

    #[test]
    fn whitespace_only_is_not_treated_as_empty() {
        assert_eq!(
            message(validate_github_url("   ", NO_REPOS)),
            "Invalid URL format"
        );
        assert_eq!(
            message(validate_website_url("   ", NO_SITES)),
            "Invalid URL format"
        );
    }

    #[test]
    fn website_validation() {
        let existing = [Website {
            id: "w1".into(),
            url: "https://devplan.com/".into(),
        }];
        assert_eq!(
            message(validate_website_url("", &existing)),
            "Website URL is required"
        );
        assert_eq!(
            message(validate_website_url("devplan.com", &existing)),
            "Invalid URL format"
        );
        assert_eq!(
            message(validate_website_url("ftp://devplan.com", &existing)),
            "URL must use http or https"
        );
        assert_eq!(
            message(validate_website_url("https://devplan.com/", &existing)),
            "This website has already been added"
        );
        assert!(validate_website_url("https://devplan.com/docs", &existing).is_none());
    }
}
