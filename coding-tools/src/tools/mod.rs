//! Agent-callable tools.
//!
//! Each tool validates its raw arguments through [`crate::core`] before any
//! process or network call, then returns a flat JSON record with a `success`
//! flag. Expected failures (rejected paths, git errors, API errors) are
//! records too; only malformed calls become [`ToolCallError`]s.

pub mod git_tools;
pub mod github_tools;
pub mod schema;

use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use jsonschema::Draft;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::core::confine::{ConfinedPath, PathRejection};
use crate::core::refname::InvalidRefArg;
use crate::core::repo_ref::UnparseableRepoRef;
use crate::io::config::ToolsConfig;
use crate::io::git::Git;
use crate::io::github::{GitHubApi, GitHubClient, GitHubError};
use crate::io::workspace::{RepoLookupError, resolve_repo};

/// Shared, read-only state for tool calls.
pub struct ToolContext {
    config: ToolsConfig,
    github: Option<Box<dyn GitHubApi>>,
}

impl ToolContext {
    pub fn new(config: ToolsConfig, github: Option<Box<dyn GitHubApi>>) -> Self {
        Self { config, github }
    }

    /// Build a context whose GitHub client is authenticated from the token
    /// variable named in the config. A missing token leaves GitHub tools
    /// disabled rather than failing startup.
    pub fn from_env(config: ToolsConfig) -> Result<Self> {
        let token = std::env::var(&config.github.token_env)
            .ok()
            .filter(|t| !t.trim().is_empty());
        let github: Option<Box<dyn GitHubApi>> = match token {
            Some(token) => Some(Box::new(
                GitHubClient::new(&config.github.api_url, &token).context("create GitHub client")?,
            )),
            None => {
                info!(env = %config.github.token_env, "no GitHub token; GitHub tools disabled");
                None
            }
        };
        Ok(Self::new(config, github))
    }

    pub fn config(&self) -> &ToolsConfig {
        &self.config
    }

    pub fn workspace(&self) -> &Path {
        &self.config.workspace_dir
    }

    pub(crate) fn git(&self) -> Git {
        Git::new(
            &self.config.workspace_dir,
            Duration::from_secs(self.config.git_timeout_secs),
            self.config.output_limit_bytes,
        )
    }

    pub(crate) fn github(&self) -> ToolResult<&dyn GitHubApi> {
        self.github.as_deref().ok_or_else(|| {
            ToolOutput::failure(format!(
                "{} environment variable not set. Please configure it.",
                self.config.github.token_env
            ))
        })
    }

    /// Resolve an optional repository path to an existing directory in the workspace.
    pub(crate) fn repo(&self, repo_path: Option<&str>) -> ToolResult<ConfinedPath> {
        let repo = resolve_repo(self.workspace(), repo_path)?;
        if !repo.as_path().is_dir() {
            return Err(ToolOutput::failure(format!("Repository not found: {repo}")));
        }
        Ok(repo)
    }
}

/// Flat JSON record returned by every tool.
#[derive(Debug, Clone, PartialEq)]
pub struct ToolOutput {
    success: bool,
    fields: Map<String, Value>,
}

/// Handler-internal result: the error side is already a failure record.
pub type ToolResult<T> = std::result::Result<T, ToolOutput>;

impl ToolOutput {
    pub fn success<T: Serialize>(record: &T) -> Self {
        match serde_json::to_value(record) {
            Ok(Value::Object(fields)) => Self {
                success: true,
                fields,
            },
            Ok(other) => Self::failure(format!("tool produced a non-object record: {other}")),
            Err(err) => Self::failure(format!("serialize tool record: {err}")),
        }
    }

    pub fn failure(error: impl Into<String>) -> Self {
        let mut fields = Map::new();
        fields.insert("error".to_string(), Value::String(error.into()));
        Self {
            success: false,
            fields,
        }
    }

    pub fn with_field(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.fields.insert(key.to_string(), value.into());
        self
    }

    pub fn finish<T: Serialize>(result: ToolResult<T>) -> Self {
        match result {
            Ok(record) => Self::success(&record),
            Err(failure) => failure,
        }
    }

    pub fn is_success(&self) -> bool {
        self.success
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    /// Failure text, if this is a failure record.
    pub fn error(&self) -> Option<&str> {
        if self.success {
            return None;
        }
        self.fields.get("error").and_then(Value::as_str)
    }

    pub fn to_json(&self) -> Value {
        let mut object = Map::with_capacity(self.fields.len() + 1);
        object.insert("success".to_string(), Value::Bool(self.success));
        for (key, value) in &self.fields {
            object.insert(key.clone(), value.clone());
        }
        Value::Object(object)
    }
}

impl From<PathRejection> for ToolOutput {
    fn from(rejection: PathRejection) -> Self {
        warn!(reason = %rejection, "path rejected");
        Self::failure(rejection.to_string())
    }
}

impl From<UnparseableRepoRef> for ToolOutput {
    fn from(err: UnparseableRepoRef) -> Self {
        warn!("repository reference rejected");
        Self::failure(err.to_string())
    }
}

impl From<InvalidRefArg> for ToolOutput {
    fn from(err: InvalidRefArg) -> Self {
        warn!(kind = err.kind, "ref argument rejected");
        Self::failure(err.to_string())
    }
}

impl From<RepoLookupError> for ToolOutput {
    fn from(err: RepoLookupError) -> Self {
        match err {
            RepoLookupError::Rejected(rejection) => rejection.into(),
            other => Self::failure(other.message()),
        }
    }
}

impl From<GitHubError> for ToolOutput {
    fn from(err: GitHubError) -> Self {
        let failure = Self::failure(err.to_string());
        match err.status() {
            Some(status) => failure.with_field("status", status),
            None => failure,
        }
    }
}

impl From<anyhow::Error> for ToolOutput {
    fn from(err: anyhow::Error) -> Self {
        Self::failure(format!("{err:#}"))
    }
}

/// A call that could not be dispatched to a tool at all.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ToolCallError {
    #[error("Unknown tool: {0}")]
    UnknownTool(String),
    #[error("Invalid arguments for {tool}: {message}")]
    InvalidArguments { tool: String, message: String },
}

/// Validate `arguments` against the tool's input schema and run the tool.
///
/// `null` arguments are treated as an empty object.
pub fn call_tool(
    ctx: &ToolContext,
    name: &str,
    arguments: &Value,
) -> Result<ToolOutput, ToolCallError> {
    let definition =
        schema::find_tool(name).ok_or_else(|| ToolCallError::UnknownTool(name.to_string()))?;
    let arguments = match arguments {
        Value::Null => Value::Object(Map::new()),
        other => other.clone(),
    };
    validate_arguments(name, &definition["inputSchema"], &arguments)?;
    debug!(tool = name, "dispatching tool call");

    let output = match name {
        "git_clone" => git_tools::git_clone(ctx, &decode(name, arguments)?),
        "git_status" => git_tools::git_status(ctx, &decode(name, arguments)?),
        "git_diff" => git_tools::git_diff(ctx, &decode(name, arguments)?),
        "git_commit" => git_tools::git_commit(ctx, &decode(name, arguments)?),
        "git_push" => git_tools::git_push(ctx, &decode(name, arguments)?),
        "git_checkout_branch" => git_tools::git_checkout_branch(ctx, &decode(name, arguments)?),
        "github_create_pr" => github_tools::github_create_pr(ctx, &decode(name, arguments)?),
        "github_list_prs" => github_tools::github_list_prs(ctx, &decode(name, arguments)?),
        "github_get_issue" => github_tools::github_get_issue(ctx, &decode(name, arguments)?),
        other => return Err(ToolCallError::UnknownTool(other.to_string())),
    };
    if let Some(error) = output.error() {
        info!(tool = name, error, "tool call failed");
    }
    Ok(output)
}

/// Check arguments against a JSON Schema (Draft 2020-12).
fn validate_arguments(tool: &str, schema: &Value, arguments: &Value) -> Result<(), ToolCallError> {
    let invalid = |message: String| ToolCallError::InvalidArguments {
        tool: tool.to_string(),
        message,
    };
    let compiled = jsonschema::options()
        .with_draft(Draft::Draft202012)
        .build(schema)
        .map_err(|err| invalid(format!("compile input schema: {err}")))?;
    let messages: Vec<String> = compiled
        .iter_errors(arguments)
        .map(|err| err.to_string())
        .collect();
    if !messages.is_empty() {
        return Err(invalid(messages.join("; ")));
    }
    Ok(())
}

fn decode<T: DeserializeOwned>(tool: &str, arguments: Value) -> Result<T, ToolCallError> {
    serde_json::from_value(arguments).map_err(|err| ToolCallError::InvalidArguments {
        tool: tool.to_string(),
        message: err.to_string(),
    })
}
