use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::{MonitorError, Result};

/// Top-level configuration for the team activity monitor.
///
/// Loaded from `~/.team-monitor/config.toml` by default. Credentials may also
/// come from the environment via [`MonitorConfig::apply_env_overrides`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MonitorConfig {
    #[serde(default)]
    pub general: GeneralConfig,
    #[serde(default)]
    pub jira: JiraConfig,
    #[serde(default)]
    pub github: GitHubConfig,
    #[serde(default)]
    pub query: QueryConfig,
}

impl MonitorConfig {
    /// Load configuration from a TOML file.
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: MonitorConfig = toml::from_str(&content)?;
        info!("Configuration loaded from {}", path.display());
        Ok(config)
    }

    /// Save the current configuration to a TOML file.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content =
            toml::to_string_pretty(self).map_err(|e| MonitorError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        info!("Configuration saved to {}", path.display());
        Ok(())
    }

    /// Write a default configuration to `path`.
    ///
    /// An existing file is left alone unless `overwrite` is set. Returns
    /// whether a file was written.
    pub fn write_default(path: &Path, overwrite: bool) -> Result<bool> {
        if path.exists() && !overwrite {
            warn!("Configuration already exists at {}", path.display());
            return Ok(false);
        }
        Self::default().save(path)?;
        Ok(true)
    }

    /// Overlay provider credentials from environment variables.
    ///
    /// Reads `JIRA_BASE_URL`, `JIRA_EMAIL`, `JIRA_API_TOKEN`, `GITHUB_TOKEN`
    /// and `GITHUB_API_URL`. Empty variables are ignored.
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(v) = get("JIRA_BASE_URL") {
            self.jira.base_url = v;
        }
        if let Some(v) = get("JIRA_EMAIL") {
            self.jira.email = v;
        }
        if let Some(v) = get("JIRA_API_TOKEN") {
            self.jira.api_token = v;
        }
        if let Some(v) = get("GITHUB_TOKEN") {
            self.github.token = v;
        }
        if let Some(v) = get("GITHUB_API_URL") {
            self.github.base_url = v;
        }
    }
}

/// General application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Log level: trace, debug, info, warn, error.
    pub log_level: String,
    /// Address the HTTP API binds to.
    pub bind_address: String,
    /// HTTP API port.
    pub port: u16,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            bind_address: "127.0.0.1".to_string(),
            port: 5000,
        }
    }
}

/// Jira issue tracker connection settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct JiraConfig {
    /// Instance URL, e.g. `https://company.atlassian.net`.
    pub base_url: String,
    /// Account email used for basic auth.
    pub email: String,
    pub api_token: String,
    /// Maximum issues returned per query.
    pub max_results: u32,
}

impl Default for JiraConfig {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            email: String::new(),
            api_token: String::new(),
            max_results: 50,
        }
    }
}

/// GitHub source control connection settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GitHubConfig {
    pub base_url: String,
    /// Personal access token.
    pub token: String,
    /// Maximum commits / pull requests returned per query (capped at 100).
    pub max_results: u32,
}

impl Default for GitHubConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.github.com".to_string(),
            token: String::new(),
            max_results: 100,
        }
    }
}

/// Query pipeline settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct QueryConfig {
    /// Trailing window used when a request does not specify one.
    pub default_days: u32,
    /// Largest accepted window.
    pub max_days: u32,
    /// Per-provider fetch timeout in seconds.
    pub fetch_timeout_secs: u64,
    /// Items enumerated per section before "+N more".
    pub display_cap: usize,
    /// Commit message display width in characters.
    pub message_width: usize,
    /// Known team members. Empty disables the roster check.
    pub roster: Vec<String>,
}

impl Default for QueryConfig {
    fn default() -> Self {
        Self {
            default_days: 7,
            max_days: 365,
            fetch_timeout_secs: 10,
            display_cap: 5,
            message_width: 60,
            roster: Vec::new(),
        }
    }
}
