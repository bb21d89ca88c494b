//! GitHub REST client for pull requests and issues.
//!
//! The [`GitHubApi`] trait decouples the tools from HTTP. Production uses
//! [`GitHubClient`]; tests script responses through a fake. Only validated
//! [`RepoRef`] parts are ever interpolated into request URLs.

use std::fmt;
use std::time::Duration;

use anyhow::{Context, Result};
use reqwest::StatusCode;
use reqwest::blocking::{Client, RequestBuilder};
use reqwest::header::{ACCEPT, AUTHORIZATION, HeaderMap, HeaderValue, USER_AGENT};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, instrument, warn};

use crate::core::repo_ref::RepoRef;

const API_VERSION: &str = "2022-11-28";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Failure talking to the GitHub API.
#[derive(Debug, Error)]
pub enum GitHubError {
    /// GitHub answered with a non-success status.
    #[error("GitHub API error: {message}")]
    Api { status: u16, message: String },
    #[error("GitHub request failed: {0}")]
    Transport(String),
    #[error("GitHub response could not be decoded: {0}")]
    Decode(String),
}

impl GitHubError {
    pub fn status(&self) -> Option<u16> {
        match self {
            GitHubError::Api { status, .. } => Some(*status),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct User {
    pub login: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct BranchRef {
    #[serde(rename = "ref")]
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PullRequest {
    pub number: u64,
    pub title: String,
    pub state: String,
    pub html_url: String,
    pub user: Option<User>,
    pub head: BranchRef,
    pub base: BranchRef,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
    #[serde(default)]
    pub draft: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Label {
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Issue {
    pub number: u64,
    pub title: String,
    pub state: String,
    pub html_url: String,
    pub body: Option<String>,
    pub user: Option<User>,
    #[serde(default)]
    pub labels: Vec<Label>,
    #[serde(default)]
    pub assignees: Vec<User>,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
    pub closed_at: Option<String>,
    #[serde(default)]
    pub comments: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct IssueComment {
    pub id: u64,
    pub user: Option<User>,
    pub body: Option<String>,
    pub created_at: Option<String>,
}

/// Request body for creating a pull request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewPullRequest {
    pub title: String,
    pub body: String,
    pub head: String,
    pub base: String,
    pub draft: bool,
}

/// Pull request state filter accepted by the list endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PullState {
    Open,
    Closed,
    All,
}

impl PullState {
    pub fn as_str(self) -> &'static str {
        match self {
            PullState::Open => "open",
            PullState::Closed => "closed",
            PullState::All => "all",
        }
    }
}

impl fmt::Display for PullState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Operations the tools need from GitHub.
pub trait GitHubApi: Send + Sync {
    fn create_pull(&self, repo: &RepoRef, pull: &NewPullRequest)
    -> Result<PullRequest, GitHubError>;

    /// Most recently updated first, at most `limit` entries (one page).
    fn list_pulls(
        &self,
        repo: &RepoRef,
        state: PullState,
        limit: u8,
    ) -> Result<Vec<PullRequest>, GitHubError>;

    fn get_issue(&self, repo: &RepoRef, number: u64) -> Result<Issue, GitHubError>;

    /// Oldest first, at most `limit` entries (one page).
    fn list_issue_comments(
        &self,
        repo: &RepoRef,
        number: u64,
        limit: u8,
    ) -> Result<Vec<IssueComment>, GitHubError>;
}

/// Blocking GitHub REST client authenticated with a bearer token.
#[derive(Debug, Clone)]
pub struct GitHubClient {
    client: Client,
    api_url: String,
    token: String,
}

impl GitHubClient {
    /// Create a new GitHub client.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be created.
    pub fn new(api_url: &str, token: &str) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(
            ACCEPT,
            HeaderValue::from_static("application/vnd.github+json"),
        );
        headers.insert("X-GitHub-Api-Version", HeaderValue::from_static(API_VERSION));
        headers.insert(
            USER_AGENT,
            HeaderValue::from_static(concat!("coding-tools/", env!("CARGO_PKG_VERSION"))),
        );

        let client = Client::builder()
            .default_headers(headers)
            .timeout(REQUEST_TIMEOUT)
            .build()
            .context("create HTTP client")?;

        Ok(Self {
            client,
            api_url: api_url.trim_end_matches('/').to_string(),
            token: token.to_string(),
        })
    }

    fn repo_url(&self, repo: &RepoRef, suffix: &str) -> String {
        format!(
            "{}/repos/{}/{}/{suffix}",
            self.api_url,
            repo.owner(),
            repo.name()
        )
    }

    fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, GitHubError> {
        let response = request
            .header(AUTHORIZATION, format!("Bearer {}", self.token))
            .send()
            .map_err(|e| GitHubError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            warn!(status = status.as_u16(), "GitHub API returned an error");
            return Err(GitHubError::Api {
                status: status.as_u16(),
                message: api_error_message(status, &body),
            });
        }
        response
            .json()
            .map_err(|e| GitHubError::Decode(e.to_string()))
    }
}

impl GitHubApi for GitHubClient {
    #[instrument(skip_all, fields(repo = %repo, head = %pull.head, base = %pull.base))]
    fn create_pull(
        &self,
        repo: &RepoRef,
        pull: &NewPullRequest,
    ) -> Result<PullRequest, GitHubError> {
        debug!("creating pull request");
        self.send(self.client.post(self.repo_url(repo, "pulls")).json(pull))
    }

    #[instrument(skip_all, fields(repo = %repo, state = %state, limit = limit))]
    fn list_pulls(
        &self,
        repo: &RepoRef,
        state: PullState,
        limit: u8,
    ) -> Result<Vec<PullRequest>, GitHubError> {
        let per_page = limit.to_string();
        let request = self.client.get(self.repo_url(repo, "pulls")).query(&[
            ("state", state.as_str()),
            ("sort", "updated"),
            ("direction", "desc"),
            ("per_page", per_page.as_str()),
        ]);
        let mut pulls: Vec<PullRequest> = self.send(request)?;
        pulls.truncate(usize::from(limit));
        Ok(pulls)
    }

    #[instrument(skip_all, fields(repo = %repo, number = number))]
    fn get_issue(&self, repo: &RepoRef, number: u64) -> Result<Issue, GitHubError> {
        self.send(
            self.client
                .get(self.repo_url(repo, &format!("issues/{number}"))),
        )
    }

    #[instrument(skip_all, fields(repo = %repo, number = number, limit = limit))]
    fn list_issue_comments(
        &self,
        repo: &RepoRef,
        number: u64,
        limit: u8,
    ) -> Result<Vec<IssueComment>, GitHubError> {
        let per_page = limit.to_string();
        let request = self
            .client
            .get(self.repo_url(repo, &format!("issues/{number}/comments")))
            .query(&[("per_page", per_page.as_str())]);
        let mut comments: Vec<IssueComment> = self.send(request)?;
        comments.truncate(usize::from(limit));
        Ok(comments)
    }
}

/// Human-readable message for a failed API call.
///
/// GitHub error bodies are usually `{"message": ...}`; otherwise the raw body
/// is used, and an empty body falls back to the status line.
pub fn api_error_message(status: StatusCode, body: &str) -> String {
    let body = body.trim();
    if let Ok(Value::Object(map)) = serde_json::from_str::<Value>(body)
        && let Some(Value::String(message)) = map.get("message")
        && !message.is_empty()
    {
        return message.clone();
    }
    if !body.is_empty() {
        return body.to_string();
    }
    match status.canonical_reason() {
        Some(reason) => format!("{} {reason}", status.as_u16()),
        None => format!("HTTP status {}", status.as_u16()),
    }
}
