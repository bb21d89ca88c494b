//! GitHub tools: create and list pull requests, read issues.

use serde::Deserialize;
use tracing::info;

use crate::core::repo_ref::parse_repo_ref;
use crate::core::types::{
    CommentRecord, CreatedPullRecord, IssueRecord, PullListRecord, PullSummary,
};
use crate::io::github::{NewPullRequest, PullRequest, PullState, User};
use crate::tools::{ToolContext, ToolOutput, ToolResult};

/// Largest page GitHub serves.
const MAX_PAGE: u32 = 100;

fn default_base() -> String {
    "main".to_string()
}

fn default_limit() -> u32 {
    10
}

fn default_max_comments() -> u32 {
    10
}

fn default_state() -> PullState {
    PullState::Open
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreatePrArgs {
    pub title: String,
    #[serde(default)]
    pub body: String,
    pub head: String,
    #[serde(default = "default_base")]
    pub base: String,
    pub repo: Option<String>,
    #[serde(default)]
    pub draft: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ListPrsArgs {
    pub repo: String,
    #[serde(default = "default_state")]
    pub state: PullState,
    #[serde(default = "default_limit")]
    pub limit: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GetIssueArgs {
    pub repo: String,
    pub issue_number: u64,
    #[serde(default)]
    pub include_comments: bool,
    #[serde(default = "default_max_comments")]
    pub max_comments: u32,
}

fn login(user: Option<&User>) -> String {
    user.map_or_else(|| "unknown".to_string(), |u| u.login.clone())
}

/// Clamp a requested count to one API page.
fn page_size(requested: u32) -> u8 {
    u8::try_from(requested.clamp(1, MAX_PAGE)).unwrap_or(u8::MAX)
}

fn summarize(pull: &PullRequest) -> PullSummary {
    PullSummary {
        number: pull.number,
        title: pull.title.clone(),
        state: pull.state.clone(),
        url: pull.html_url.clone(),
        author: login(pull.user.as_ref()),
        head: pull.head.name.clone(),
        base: pull.base.name.clone(),
        created_at: pull.created_at.clone(),
        updated_at: pull.updated_at.clone(),
        draft: pull.draft,
    }
}

pub fn github_create_pr(ctx: &ToolContext, args: &CreatePrArgs) -> ToolOutput {
    ToolOutput::finish(create_pr(ctx, args))
}

fn create_pr(ctx: &ToolContext, args: &CreatePrArgs) -> ToolResult<CreatedPullRecord> {
    let github = ctx.github()?;
    let repo = parse_repo_ref(args.repo.as_deref())?;
    let pull = github.create_pull(
        &repo,
        &NewPullRequest {
            title: args.title.clone(),
            body: args.body.clone(),
            head: args.head.clone(),
            base: args.base.clone(),
            draft: args.draft,
        },
    )?;
    info!(repo = %repo, number = pull.number, "created pull request");
    Ok(CreatedPullRecord {
        message: format!("Successfully created PR #{}: {}", pull.number, pull.html_url),
        pr_number: pull.number,
        pr_url: pull.html_url,
        title: pull.title,
        state: pull.state,
        head: pull.head.name,
        base: pull.base.name,
    })
}

pub fn github_list_prs(ctx: &ToolContext, args: &ListPrsArgs) -> ToolOutput {
    ToolOutput::finish(list_prs(ctx, args))
}

fn list_prs(ctx: &ToolContext, args: &ListPrsArgs) -> ToolResult<PullListRecord> {
    let github = ctx.github()?;
    let repo = parse_repo_ref(Some(&args.repo))?;
    let pulls = github.list_pulls(&repo, args.state, page_size(args.limit))?;
    let pull_requests: Vec<PullSummary> = pulls.iter().map(summarize).collect();
    Ok(PullListRecord {
        repo: repo.full_name(),
        state: args.state.to_string(),
        count: pull_requests.len(),
        pull_requests,
    })
}

pub fn github_get_issue(ctx: &ToolContext, args: &GetIssueArgs) -> ToolOutput {
    ToolOutput::finish(get_issue(ctx, args))
}

fn get_issue(ctx: &ToolContext, args: &GetIssueArgs) -> ToolResult<IssueRecord> {
    let github = ctx.github()?;
    let repo = parse_repo_ref(Some(&args.repo))?;
    let issue = github.get_issue(&repo, args.issue_number)?;

    let comments = if !args.include_comments || issue.comments == 0 {
        None
    } else if args.max_comments == 0 {
        Some(Vec::new())
    } else {
        let fetched =
            github.list_issue_comments(&repo, issue.number, page_size(args.max_comments))?;
        Some(
            fetched
                .into_iter()
                .map(|comment| CommentRecord {
                    id: comment.id,
                    author: login(comment.user.as_ref()),
                    body: comment.body,
                    created_at: comment.created_at,
                })
                .collect(),
        )
    };

    Ok(IssueRecord {
        number: issue.number,
        title: issue.title,
        state: issue.state,
        url: issue.html_url,
        body: issue.body,
        author: login(issue.user.as_ref()),
        labels: issue.labels.into_iter().map(|label| label.name).collect(),
        assignees: issue.assignees.into_iter().map(|user| user.login).collect(),
        created_at: issue.created_at,
        updated_at: issue.updated_at,
        closed_at: issue.closed_at,
        comments_count: issue.comments,
        comments,
    })
}
