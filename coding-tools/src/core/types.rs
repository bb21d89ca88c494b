//! Result records returned by the agent tools.
//!
//! Each record is serialized as the body of a successful tool response; the
//! tool layer adds the `success` flag. Field names are part of the contract
//! with the agent and must stay stable.

use std::path::PathBuf;

use serde::Serialize;

use crate::core::status::FileStatus;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CloneRecord {
    pub path: PathBuf,
    pub branch: String,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatusRecord {
    pub path: PathBuf,
    pub branch: String,
    pub files: Vec<FileStatus>,
    pub is_clean: bool,
    pub raw_status: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DiffRecord {
    pub path: PathBuf,
    pub staged: bool,
    pub diff: String,
    pub has_changes: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CommitRecord {
    pub path: PathBuf,
    pub message: String,
    pub commit_hash: String,
    pub output: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PushRecord {
    pub path: PathBuf,
    pub remote: String,
    pub branch: String,
    pub message: String,
    /// git reports push progress on stderr.
    pub output: String,
}

/// What `git_checkout_branch` did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum BranchAction {
    #[serde(rename = "switched to")]
    Switched,
    #[serde(rename = "created and switched to")]
    Created,
}

impl BranchAction {
    pub fn as_str(self) -> &'static str {
        match self {
            BranchAction::Switched => "switched to",
            BranchAction::Created => "created and switched to",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CheckoutRecord {
    pub path: PathBuf,
    pub branch: String,
    pub action: BranchAction,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CreatedPullRecord {
    pub pr_number: u64,
    pub pr_url: String,
    pub title: String,
    pub state: String,
    pub head: String,
    pub base: String,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PullSummary {
    pub number: u64,
    pub title: String,
    pub state: String,
    pub url: String,
    pub author: String,
    pub head: String,
    pub base: String,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
    pub draft: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PullListRecord {
    pub repo: String,
    pub state: String,
    pub count: usize,
    pub pull_requests: Vec<PullSummary>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CommentRecord {
    pub id: u64,
    pub author: String,
    pub body: Option<String>,
    pub created_at: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IssueRecord {
    pub number: u64,
    pub title: String,
    pub state: String,
    pub url: String,
    pub body: Option<String>,
    pub author: String,
    pub labels: Vec<String>,
    pub assignees: Vec<String>,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
    pub closed_at: Option<String>,
    pub comments_count: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comments: Option<Vec<CommentRecord>>,
}
