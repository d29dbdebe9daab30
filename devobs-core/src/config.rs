use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Environment variable naming an explicit config file.
pub const CONFIG_ENV: &str = "DEVOBS_CONFIG";
/// Project-local config location, relative to the working directory.
pub const LOCAL_CONFIG_PATH: &str = ".devobs/config.toml";

/// Top-level devobs configuration, matching `.devobs/config.toml`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DevObsConfig {
    #[serde(default)]
    pub server: ServerSection,
    #[serde(default)]
    pub auth: AuthSection,
    #[serde(default)]
    pub changes: ChangesSection,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerSection {
    pub base_url: String,
    pub api_prefix: String,
    pub timeout_secs: u64,
}

impl Default for ServerSection {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8090".to_string(),
            api_prefix: "/api/v1".to_string(),
            timeout_secs: 30,
        }
    }
}

/// Bearer-token settings. With `enabled = false` requests go out
/// unauthenticated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthSection {
    pub enabled: bool,
    pub token_env: String,
}

impl Default for AuthSection {
    fn default() -> Self {
        Self {
            enabled: false,
            token_env: "DEVOBS_TOKEN".to_string(),
        }
    }
}

/// Which backend endpoint family serves change reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum ChangeEndpointFamily {
    /// `/change-summaries` filtered by repo, plus enrollment endpoints.
    #[default]
    ChangeAnalysis,
    /// `/changes-summaries` CRUD with on-demand creation.
    ChangesSummaries,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChangesSection {
    pub endpoints: ChangeEndpointFamily,
    pub default_days: u32,
}

impl Default for ChangesSection {
    fn default() -> Self {
        Self {
            endpoints: ChangeEndpointFamily::ChangeAnalysis,
            default_days: 7,
        }
    }
}

impl DevObsConfig {
    /// Parse a config from TOML text.
    pub fn from_toml(text: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(text).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Load a config file that must exist.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::NotFound(path.display().to_string()));
        }
        let text = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::Invalid(format!("{}: {e}", path.display())))?;
        Self::from_toml(&text)
    }

    /// Resolve the config: explicit path, then `$DEVOBS_CONFIG`, then
    /// `.devobs/config.toml` under `cwd`, else defaults.
    pub fn discover(explicit: Option<&Path>, cwd: &Path) -> Result<Self, ConfigError> {
        if let Some(path) = explicit {
            return Self::load(path);
        }
        if let Some(path) = std::env::var_os(CONFIG_ENV).map(PathBuf::from) {
            return Self::load(&path);
        }
        let local = cwd.join(LOCAL_CONFIG_PATH);
        if local.exists() {
            return Self::load(&local);
        }
        Ok(Self::default())
    }

    /// Replace `server.base_url` and re-check the result.
    pub fn with_base_url(mut self, base_url: &str) -> Result<Self, ConfigError> {
        base_url.clone_into(&mut self.server.base_url);
        self.validate()?;
        Ok(self)
    }

    /// Full URL of an API path, e.g. `/repositories` →
    /// `http://localhost:8090/api/v1/repositories`.
    pub fn api_url(&self, path: &str) -> String {
        format!(
            "{}{}{path}",
            self.server.base_url.trim_end_matches('/'),
            self.server.api_prefix.trim_end_matches('/'),
        )
    }

    fn validate(&self) -> Result<(), ConfigError> {
        let base = &self.server.base_url;
        if !(base.starts_with("http://") || base.starts_with("https://")) {
            return Err(ConfigError::Invalid(format!(
                "server.base_url must start with http:// or https://, got {base:?}"
            )));
        }
        if !self.server.api_prefix.is_empty() && !self.server.api_prefix.starts_with('/') {
            return Err(ConfigError::Invalid(format!(
                "server.api_prefix must start with '/', got {:?}",
                self.server.api_prefix
            )));
        }
        if self.changes.default_days == 0 {
            return Err(ConfigError::Invalid(
                "changes.default_days must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_url_override_is_validated() {
        let config = DevObsConfig::default()
            .with_base_url("https://observer.example.com")
            .unwrap();
        assert_eq!(config.server.base_url, "https://observer.example.com");

        let err = DevObsConfig::default()
            .with_base_url("localhost:8090")
            .unwrap_err();
        assert!(err.to_string().contains("server.base_url"));
    }

    #[test]
    fn defaults() {
        let config = DevObsConfig::default();
        assert_eq!(config.server.base_url, "http://localhost:8090");
        assert_eq!(config.server.api_prefix, "/api/v1");
        assert!(!config.auth.enabled);
        assert_eq!(config.auth.token_env, "DEVOBS_TOKEN");
        assert_eq!(config.changes.endpoints, ChangeEndpointFamily::ChangeAnalysis);
        assert_eq!(config.changes.default_days, 7);
    }

    #[test]
    fn partial_toml_keeps_defaults() {
        let config = DevObsConfig::from_toml(
            r#"
            [server]
            base_url = "https://observer.example.com/"

            [changes]
            endpoints = "changes-summaries"
            "#,
        )
        .unwrap();
        assert_eq!(config.server.api_prefix, "/api/v1");
        assert_eq!(config.server.timeout_secs, 30);
        assert_eq!(config.changes.endpoints, ChangeEndpointFamily::ChangesSummaries);
        assert_eq!(
            config.api_url("/repositories"),
            "https://observer.example.com/api/v1/repositories"
        );
    }

    #[test]
    fn rejects_bad_base_url() {
        let err = DevObsConfig::from_toml("[server]\nbase_url = \"localhost:8090\"\n").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn rejects_bad_toml() {
        let err = DevObsConfig::from_toml("[server\n").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = DevObsConfig::load(&dir.path().join("nope.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::NotFound(_)));
    }

    #[test]
    fn discover_prefers_explicit_then_local() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join(".devobs")).unwrap();
        std::fs::write(
            dir.path().join(LOCAL_CONFIG_PATH),
            "[auth]\nenabled = true\n",
        )
        .unwrap();
        let explicit = dir.path().join("other.toml");
        std::fs::write(&explicit, "[server]\ntimeout_secs = 5\n").unwrap();

        let config = DevObsConfig::discover(Some(&explicit), dir.path()).unwrap();
        assert_eq!(config.server.timeout_secs, 5);
        assert!(!config.auth.enabled);

        // Skip when the variable is set in the test environment.
        if std::env::var_os(CONFIG_ENV).is_none() {
            let config = DevObsConfig::discover(None, dir.path()).unwrap();
            assert!(config.auth.enabled);
        }
    }
}
