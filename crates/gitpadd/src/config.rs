//! TOML configuration for the gitpad daemon.
//!
//! Every section is optional. Command-line flags and their environment
//! variables are applied on top of the file by `gitpadd start`.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, bail};
use gitpad_remote::{DEFAULT_API_URL, GithubConfig};
use gitpad_store::StoreUrl;
use gitpad_web::DEFAULT_COMMIT_MESSAGE;
use serde::Deserialize;

/// Top-level configuration, parsed from TOML.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct CliConfig {
    /// HTTP listener.
    pub server: ServerSection,
    /// Hosted repository and the edited file.
    pub github: GithubSection,
    /// Admin panel.
    pub admin: AdminSection,
    /// Document store for lock state and audit records.
    pub store: StoreSection,
    /// Logging configuration.
    pub log: LogSection,
}

/// `[server]` section.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ServerSection {
    /// Address for the web editor.
    pub listen_addr: String,
}

impl Default for ServerSection {
    fn default() -> Self {
        Self {
            listen_addr: "0.0.0.0:8080".to_string(),
        }
    }
}

/// `[github]` section.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct GithubSection {
    /// API base URL.
    pub api_url: String,
    /// Access token with write permission on the repository.
    pub token: String,
    /// Repository as `owner/name`.
    pub repo: String,
    /// Path of the edited file inside the repository.
    pub file_path: String,
    /// Branch to edit. Unset means the repository's default branch.
    pub branch: Option<String>,
    /// Commit message for editor saves.
    pub commit_message: Option<String>,
    /// Per-request timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for GithubSection {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            token: String::new(),
            repo: String::new(),
            file_path: String::new(),
            branch: None,
            commit_message: None,
            timeout_secs: 10,
        }
    }
}

/// `[admin]` section.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct AdminSection {
    /// Password for the admin panel. Unset disables admin actions.
    pub password: Option<String>,
}

/// `[store]` section.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct StoreSection {
    /// Store URL: `memory:`, `fjall:<path>` or a bare path.
    pub url: String,
}

impl Default for StoreSection {
    fn default() -> Self {
        let dir = dirs::home_dir()
            .map(|h| h.join(".gitpad").join("store"))
            .unwrap_or_else(|| PathBuf::from(".gitpad/store"));
        Self {
            url: format!("fjall:{}", dir.display()),
        }
    }
}

/// `[log]` section.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct LogSection {
    /// Log level filter (e.g. `"info"`, `"debug"`, `"warn"`).
    pub level: String,
}

impl Default for LogSection {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

impl CliConfig {
    /// Load config from a TOML file, or use defaults if no path given.
    pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        match path {
            Some(p) => {
                let content = std::fs::read_to_string(p)
                    .with_context(|| format!("failed to read {}", p.display()))?;
                let config: CliConfig = toml::from_str(&content)?;
                Ok(config)
            }
            None => Ok(Self::default()),
        }
    }

    /// Parse config from a TOML string (used in tests).
    #[cfg(test)]
    pub fn from_toml(s: &str) -> anyhow::Result<Self> {
        Ok(toml::from_str(s)?)
    }

    /// Parsed `[store] url`.
    pub fn store_url(&self) -> anyhow::Result<StoreUrl> {
        self.store
            .url
            .parse()
            .with_context(|| format!("invalid store url {:?}", self.store.url))
    }

    /// Client settings for the hosted repository.
    ///
    /// Fails when the token, repository or file path is missing.
    pub fn github_config(&self) -> anyhow::Result<GithubConfig> {
        let github = &self.github;
        if github.token.is_empty() {
            bail!("no GitHub token configured (set GITHUB_TOKEN or [github] token)");
        }
        if github.repo.is_empty() {
            bail!("no repository configured (set GITHUB_REPO or [github] repo)");
        }
        if github.file_path.is_empty() {
            bail!("no file path configured (set GITHUB_FILE_PATH or [github] file_path)");
        }

        let mut config = GithubConfig::new(&github.token, &github.repo);
        config.api_url = github.api_url.clone();
        config.branch = github.branch.clone().filter(|b| !b.is_empty());
        config.timeout = Duration::from_secs(github.timeout_secs.max(1));
        Ok(config)
    }

    /// Effective commit message for editor saves.
    pub fn commit_message(&self) -> String {
        self.github
            .commit_message
            .clone()
            .filter(|m| !m.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_COMMIT_MESSAGE.to_string())
    }
}
