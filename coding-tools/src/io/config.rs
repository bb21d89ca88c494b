//! Tool server configuration (optional TOML file plus environment overrides).

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, anyhow};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::core::confine::absolute_base;

pub const WORKSPACE_DIR_ENV: &str = "WORKSPACE_DIR";
pub const GITHUB_API_URL_ENV: &str = "GITHUB_API_URL";

/// Tool server configuration (TOML).
///
/// Missing fields default to values suitable for a container with the
/// workspace mounted at `/workspace`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ToolsConfig {
    /// Root that every clone destination and repository path is confined to.
    pub workspace_dir: PathBuf,

    /// Wall-clock limit for a single git invocation (clone can be slow).
    pub git_timeout_secs: u64,

    /// Truncate captured git stdout/stderr beyond this many bytes.
    pub output_limit_bytes: usize,

    pub git: GitIdentity,

    pub github: GitHubConfig,
}

/// Identity written into freshly cloned repositories so commits work.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct GitIdentity {
    pub user_name: String,
    pub user_email: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct GitHubConfig {
    pub api_url: String,
    /// Name of the environment variable holding the API token.
    pub token_env: String,
}

impl Default for GitIdentity {
    fn default() -> Self {
        Self {
            user_name: "Coding Agent".to_string(),
            user_email: "coding-agent@localhost".to_string(),
        }
    }
}

impl Default for GitHubConfig {
    fn default() -> Self {
        Self {
            api_url: "https://api.github.com".to_string(),
            token_env: "GITHUB_TOKEN".to_string(),
        }
    }
}

impl Default for ToolsConfig {
    fn default() -> Self {
        Self {
            workspace_dir: PathBuf::from("/workspace"),
            git_timeout_secs: 300,
            output_limit_bytes: 1_000_000,
            git: GitIdentity::default(),
            github: GitHubConfig::default(),
        }
    }
}

impl ToolsConfig {
    pub fn validate(&self) -> Result<()> {
        if self.workspace_dir.as_os_str().is_empty() {
            return Err(anyhow!("workspace_dir must not be empty"));
        }
        if self.git_timeout_secs == 0 {
            return Err(anyhow!("git_timeout_secs must be > 0"));
        }
        if self.output_limit_bytes == 0 {
            return Err(anyhow!("output_limit_bytes must be > 0"));
        }
        if self.github.api_url.trim().is_empty() {
            return Err(anyhow!("github.api_url must not be empty"));
        }
        if self.github.token_env.trim().is_empty() {
            return Err(anyhow!("github.token_env must not be empty"));
        }
        Ok(())
    }

    /// Apply overrides from `lookup` (normally `std::env::var`).
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(dir) = lookup(WORKSPACE_DIR_ENV).filter(|v| !v.trim().is_empty()) {
            debug!(workspace_dir = %dir, "workspace dir from environment");
            self.workspace_dir = PathBuf::from(dir);
        }
        if let Some(url) = lookup(GITHUB_API_URL_ENV).filter(|v| !v.trim().is_empty()) {
            self.github.api_url = url;
        }
    }

    /// Pin `workspace_dir` to an absolute, normalized path.
    ///
    /// Done once at load time; the value is read-only afterwards.
    fn pin_workspace(&mut self) -> Result<()> {
        self.workspace_dir = absolute_base(&self.workspace_dir).context("resolve workspace_dir")?;
        Ok(())
    }
}

/// Load config from an optional TOML file, then apply environment overrides.
///
/// A missing or absent file yields `ToolsConfig::default()`.
pub fn load_config(path: Option<&Path>) -> Result<ToolsConfig> {
    load_config_with_env(path, |key| std::env::var(key).ok())
}

pub fn load_config_with_env<F>(path: Option<&Path>, lookup: F) -> Result<ToolsConfig>
where
    F: Fn(&str) -> Option<String>,
{
    let mut cfg = match path {
        Some(path) if path.exists() => {
            let contents =
                fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
            toml::from_str(&contents).with_context(|| format!("parse {}", path.display()))?
        }
        _ => ToolsConfig::default(),
    };
    cfg.apply_env(lookup);
    cfg.validate()?;
    cfg.pin_workspace()?;
    debug!(workspace_dir = %cfg.workspace_dir.display(), "config loaded");
    Ok(cfg)
}
