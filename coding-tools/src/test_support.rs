//! Test-only helpers: a temporary workspace with real git repositories and a
//! scripted GitHub fake.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::sync::{Arc, Mutex};

use anyhow::{Context, Result, bail};
use tempfile::TempDir;

use crate::core::repo_ref::RepoRef;
use crate::io::config::ToolsConfig;
use crate::io::github::{
    BranchRef, GitHubApi, GitHubError, Issue, IssueComment, Label, NewPullRequest, PullRequest,
    PullState, User,
};
use crate::tools::ToolContext;

/// Run git in `dir`, failing on a non-zero exit. Returns trimmed stdout.
pub fn git(dir: &Path, args: &[&str]) -> Result<String> {
    let output = Command::new("git")
        .args(args)
        .current_dir(dir)
        .env("GIT_TERMINAL_PROMPT", "0")
        .output()
        .with_context(|| format!("spawn git {}", args.join(" ")))?;
    if !output.status.success() {
        bail!(
            "git {} failed: {}",
            args.join(" "),
            String::from_utf8_lossy(&output.stderr).trim()
        );
    }
    Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
}

/// Temporary directory laid out as `workspace/` plus `remotes/` outside it.
pub struct TestWorkspace {
    dir: TempDir,
}

impl TestWorkspace {
    pub fn new() -> Result<Self> {
        let dir = tempfile::tempdir().context("create temp dir")?;
        fs::create_dir_all(dir.path().join("workspace")).context("create workspace")?;
        fs::create_dir_all(dir.path().join("remotes")).context("create remotes")?;
        Ok(Self { dir })
    }

    pub fn path(&self) -> PathBuf {
        self.dir.path().join("workspace")
    }

    pub fn remotes(&self) -> PathBuf {
        self.dir.path().join("remotes")
    }

    pub fn config(&self) -> ToolsConfig {
        ToolsConfig {
            workspace_dir: self.path(),
            git_timeout_secs: 30,
            ..ToolsConfig::default()
        }
    }

    pub fn context(&self) -> ToolContext {
        ToolContext::new(self.config(), None)
    }

    pub fn context_with_github(&self, github: FakeGitHub) -> ToolContext {
        ToolContext::new(self.config(), Some(Box::new(github)))
    }

    /// Create `workspace/<name>` as a repository on `main` with one commit.
    pub fn init_repo(&self, name: &str) -> Result<PathBuf> {
        let repo = self.path().join(name);
        fs::create_dir_all(&repo).with_context(|| format!("create {}", repo.display()))?;
        git(&repo, &["init", "--quiet"])?;
        git(&repo, &["symbolic-ref", "HEAD", "refs/heads/main"])?;
        git(&repo, &["config", "user.email", "tests@localhost"])?;
        git(&repo, &["config", "user.name", "Tests"])?;
        git(&repo, &["config", "commit.gpgsign", "false"])?;
        fs::write(repo.join("README.md"), "# test\n").context("write README")?;
        git(&repo, &["add", "README.md"])?;
        git(&repo, &["commit", "--quiet", "-m", "initial commit"])?;
        Ok(repo)
    }

    /// Create a bare repository outside the workspace and register it as `origin`.
    pub fn add_bare_origin(&self, repo: &Path) -> Result<PathBuf> {
        let name = repo
            .file_name()
            .context("repository has no name")?
            .to_string_lossy()
            .into_owned();
        let remote = self.remotes().join(format!("{name}.git"));
        git(&self.remotes(), &["init", "--quiet", "--bare", &format!("{name}.git")])?;
        let remote_str = remote.to_string_lossy().into_owned();
        git(repo, &["remote", "add", "origin", &remote_str])?;
        Ok(remote)
    }
}

/// A minimal pull request fixture.
pub fn pull(number: u64, title: &str, head: &str) -> PullRequest {
    PullRequest {
        number,
        title: title.to_string(),
        state: "open".to_string(),
        html_url: format!("https://github.com/owner/repo/pull/{number}"),
        user: Some(User {
            login: "octocat".to_string(),
        }),
        head: BranchRef {
            name: head.to_string(),
        },
        base: BranchRef {
            name: "main".to_string(),
        },
        created_at: Some("2024-01-01T00:00:00Z".to_string()),
        updated_at: Some("2024-01-02T00:00:00Z".to_string()),
        draft: false,
    }
}

/// A minimal issue fixture with `comments` reported comments.
pub fn issue(number: u64, comments: u64) -> Issue {
    Issue {
        number,
        title: "Test Issue".to_string(),
        state: "open".to_string(),
        html_url: format!("https://github.com/owner/repo/issues/{number}"),
        body: Some("Issue body".to_string()),
        user: Some(User {
            login: "reporter".to_string(),
        }),
        labels: vec![Label {
            name: "bug".to_string(),
        }],
        assignees: Vec::new(),
        created_at: Some("2024-01-01T00:00:00Z".to_string()),
        updated_at: None,
        closed_at: None,
        comments,
    }
}

pub fn comment(id: u64, body: &str) -> IssueComment {
    IssueComment {
        id,
        user: None,
        body: Some(body.to_string()),
        created_at: Some("2024-01-03T00:00:00Z".to_string()),
    }
}

/// Scripted [`GitHubApi`] that records each call as `"<method> <owner/name>"`.
#[derive(Default)]
pub struct FakeGitHub {
    pulls: Vec<PullRequest>,
    issue: Option<Issue>,
    comments: Vec<IssueComment>,
    failure: Option<(u16, String)>,
    calls: Arc<Mutex<Vec<String>>>,
}

impl FakeGitHub {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_pulls(mut self, pulls: Vec<PullRequest>) -> Self {
        self.pulls = pulls;
        self
    }

    pub fn with_issue(mut self, issue: Issue, comments: Vec<IssueComment>) -> Self {
        self.issue = Some(issue);
        self.comments = comments;
        self
    }

    /// Every call fails with an API error.
    pub fn failing(mut self, status: u16, message: &str) -> Self {
        self.failure = Some((status, message.to_string()));
        self
    }

    /// Shared call log; take it before handing the fake to a context.
    pub fn calls(&self) -> Arc<Mutex<Vec<String>>> {
        Arc::clone(&self.calls)
    }

    fn record(&self, method: &str, repo: &RepoRef) -> Result<(), GitHubError> {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(format!("{method} {repo}"));
        }
        match &self.failure {
            Some((status, message)) => Err(GitHubError::Api {
                status: *status,
                message: message.clone(),
            }),
            None => Ok(()),
        }
    }
}

impl GitHubApi for FakeGitHub {
    fn create_pull(
        &self,
        repo: &RepoRef,
        new: &NewPullRequest,
    ) -> Result<PullRequest, GitHubError> {
        self.record("create_pull", repo)?;
        let mut created = pull(42, &new.title, &new.head);
        created.base.name = new.base.clone();
        created.draft = new.draft;
        created.html_url = format!("https://github.com/{repo}/pull/42");
        Ok(created)
    }

    fn list_pulls(
        &self,
        repo: &RepoRef,
        state: PullState,
        limit: u8,
    ) -> Result<Vec<PullRequest>, GitHubError> {
        self.record("list_pulls", repo)?;
        Ok(self
            .pulls
            .iter()
            .filter(|p| state == PullState::All || p.state == state.as_str())
            .take(usize::from(limit))
            .cloned()
            .collect())
    }

    fn get_issue(&self, repo: &RepoRef, number: u64) -> Result<Issue, GitHubError> {
        self.record("get_issue", repo)?;
        match &self.issue {
            Some(issue) if issue.number == number => Ok(issue.clone()),
            _ => Err(GitHubError::Api {
                status: 404,
                message: "Not Found".to_string(),
            }),
        }
    }

    fn list_issue_comments(
        &self,
        repo: &RepoRef,
        _number: u64,
        limit: u8,
    ) -> Result<Vec<IssueComment>, GitHubError> {
        self.record("list_issue_comments", repo)?;
        Ok(self
            .comments
            .iter()
            .take(usize::from(limit))
            .cloned()
            .collect())
    }
}
