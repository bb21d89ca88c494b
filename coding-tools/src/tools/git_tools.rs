//! Git tools: clone, status, diff, commit, push, checkout.

use std::fs;

use anyhow::Context;
use serde::Deserialize;
use tracing::{info, warn};

use crate::core::confine::{absolute_base, confine};
use crate::core::refname::{check_branch_name, check_ref_arg};
use crate::core::repo_ref::parse_repo_ref;
use crate::core::status::parse_short_status;
use crate::core::types::{
    BranchAction, CheckoutRecord, CloneRecord, CommitRecord, DiffRecord, PushRecord, StatusRecord,
};
use crate::io::git::{CloneOptions, PushOptions};
use crate::tools::{ToolContext, ToolOutput, ToolResult};

pub const NOTHING_TO_COMMIT: &str = "Nothing to commit - working tree is clean";

fn default_branch() -> String {
    "main".to_string()
}

fn default_remote() -> String {
    "origin".to_string()
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, Deserialize)]
pub struct CloneArgs {
    pub repo_url: String,
    #[serde(default = "default_branch")]
    pub branch: String,
    pub target_dir: Option<String>,
    pub depth: Option<u32>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RepoArgs {
    pub repo_path: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct DiffArgs {
    pub repo_path: Option<String>,
    #[serde(default)]
    pub staged: bool,
    pub file_path: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CommitArgs {
    pub message: String,
    pub repo_path: Option<String>,
    pub files: Option<Vec<String>>,
    #[serde(default = "default_true")]
    pub all_changes: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PushArgs {
    pub repo_path: Option<String>,
    #[serde(default = "default_remote")]
    pub remote: String,
    pub branch: Option<String>,
    #[serde(default = "default_true")]
    pub set_upstream: bool,
    #[serde(default)]
    pub force: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CheckoutArgs {
    pub branch_name: String,
    pub repo_path: Option<String>,
    #[serde(default = "default_true")]
    pub create: bool,
    pub start_point: Option<String>,
}

/// Clone a GitHub repository into the workspace.
///
/// The URL handed to git is rebuilt from the parsed reference, never taken
/// from the raw argument.
pub fn git_clone(ctx: &ToolContext, args: &CloneArgs) -> ToolOutput {
    ToolOutput::finish(clone(ctx, args))
}

fn clone(ctx: &ToolContext, args: &CloneArgs) -> ToolResult<CloneRecord> {
    let repo = parse_repo_ref(Some(&args.repo_url))?;
    let branch = check_branch_name("branch", &args.branch)?;
    if args.depth == Some(0) {
        return Err(ToolOutput::failure("depth must be at least 1"));
    }

    let target = args.target_dir.as_deref().unwrap_or(repo.name());
    let dest = confine(target, ctx.workspace())?;
    if dest.as_path() == absolute_base(ctx.workspace())? {
        return Err(ToolOutput::failure(
            "Target directory must be a subdirectory of the workspace",
        ));
    }
    if dest.as_path().exists() {
        return Err(
            ToolOutput::failure(format!("Directory already exists: {dest}")).with_field(
                "suggestion",
                "Use a different target_dir or remove the existing directory",
            ),
        );
    }
    fs::create_dir_all(ctx.workspace())
        .with_context(|| format!("create workspace {}", ctx.workspace().display()))?;

    let url = repo.clone_url();
    let git = ctx.git();
    let out = git.clone_into(
        &CloneOptions {
            url: &url,
            branch,
            depth: args.depth,
        },
        &dest,
    )?;
    if !out.success {
        return Err(ToolOutput::failure(out.error_text("Clone failed")).with_field("stdout", out.stdout));
    }

    let cloned = git.at(&dest);
    let identity = &ctx.config().git;
    for (key, value) in [
        ("user.email", identity.user_email.as_str()),
        ("user.name", identity.user_name.as_str()),
    ] {
        let out = cloned.config_set(key, value)?;
        if !out.success {
            warn!(key, error = %out.error_text("git config failed"), "could not set identity");
        }
    }

    info!(repo = %repo, path = %dest, "cloned repository");
    Ok(CloneRecord {
        message: format!("Successfully cloned {url} to {dest}"),
        path: dest.into_path_buf(),
        branch: branch.to_string(),
    })
}

pub fn git_status(ctx: &ToolContext, args: &RepoArgs) -> ToolOutput {
    ToolOutput::finish(status(ctx, args))
}

fn status(ctx: &ToolContext, args: &RepoArgs) -> ToolResult<StatusRecord> {
    let repo = ctx.repo(args.repo_path.as_deref())?;
    let git = ctx.git().at(&repo);
    let out = git.status_short()?;
    if !out.success {
        return Err(ToolOutput::failure(out.error_text("git status failed")));
    }
    let branch = git
        .current_branch()?
        .unwrap_or_else(|| "unknown".to_string());
    let files = parse_short_status(&out.stdout);
    Ok(StatusRecord {
        path: repo.into_path_buf(),
        branch,
        is_clean: files.is_empty(),
        files,
        raw_status: out.stdout,
    })
}

pub fn git_diff(ctx: &ToolContext, args: &DiffArgs) -> ToolOutput {
    ToolOutput::finish(diff(ctx, args))
}

fn diff(ctx: &ToolContext, args: &DiffArgs) -> ToolResult<DiffRecord> {
    let repo = ctx.repo(args.repo_path.as_deref())?;
    let file = args
        .file_path
        .as_deref()
        .map(|file| confine(file, repo.as_path()))
        .transpose()?;
    let out = ctx.git().at(&repo).diff(args.staged, file.as_ref())?;
    if !out.success {
        return Err(ToolOutput::failure(out.error_text("git diff failed")));
    }
    Ok(DiffRecord {
        path: repo.into_path_buf(),
        staged: args.staged,
        has_changes: !out.stdout.trim().is_empty(),
        diff: out.stdout,
    })
}

pub fn git_commit(ctx: &ToolContext, args: &CommitArgs) -> ToolOutput {
    ToolOutput::finish(commit(ctx, args))
}

fn commit(ctx: &ToolContext, args: &CommitArgs) -> ToolResult<CommitRecord> {
    if args.message.trim().is_empty() {
        return Err(ToolOutput::failure("Commit message must not be empty"));
    }
    let repo = ctx.repo(args.repo_path.as_deref())?;
    let git = ctx.git().at(&repo);

    match args.files.as_deref() {
        Some(files) if !files.is_empty() => {
            // Confine every file before staging any of them.
            let confined = files
                .iter()
                .map(|file| confine(file, repo.as_path()))
                .collect::<Result<Vec<_>, _>>()?;
            for (file, path) in files.iter().zip(&confined) {
                let out = git.add_path(path)?;
                if !out.success {
                    return Err(ToolOutput::failure(format!(
                        "Failed to stage {file}: {}",
                        out.error_text("git add failed")
                    )));
                }
            }
        }
        _ if args.all_changes => {
            let out = git.add_all()?;
            if !out.success {
                return Err(ToolOutput::failure(format!(
                    "Failed to stage changes: {}",
                    out.error_text("git add failed")
                )));
            }
        }
        _ => {}
    }

    let out = git.commit(&args.message)?;
    if !out.success {
        let combined = format!("{}\n{}", out.stdout, out.stderr);
        if combined.contains("nothing to commit") || combined.contains("no changes added to commit")
        {
            return Err(ToolOutput::failure(NOTHING_TO_COMMIT));
        }
        return Err(ToolOutput::failure(out.error_text("git commit failed")));
    }

    let commit_hash = git.head_sha()?.unwrap_or_else(|| "unknown".to_string());
    info!(path = %repo, commit = %commit_hash, "committed");
    Ok(CommitRecord {
        path: repo.into_path_buf(),
        message: args.message.clone(),
        commit_hash,
        output: out.stdout,
    })
}

pub fn git_push(ctx: &ToolContext, args: &PushArgs) -> ToolOutput {
    ToolOutput::finish(push(ctx, args))
}

fn push(ctx: &ToolContext, args: &PushArgs) -> ToolResult<PushRecord> {
    let remote = check_branch_name("remote", &args.remote)?;
    let requested = args
        .branch
        .as_deref()
        .map(|branch| check_branch_name("branch", branch))
        .transpose()?;
    let repo = ctx.repo(args.repo_path.as_deref())?;
    let git = ctx.git().at(&repo);

    let branch = match requested {
        Some(branch) => branch.to_string(),
        None => git
            .current_branch()?
            .ok_or_else(|| ToolOutput::failure("Could not determine current branch"))?,
    };
    let out = git.push(&PushOptions {
        remote,
        branch: &branch,
        set_upstream: args.set_upstream,
        force: args.force,
    })?;
    if !out.success {
        return Err(ToolOutput::failure(out.error_text("git push failed")));
    }

    info!(path = %repo, remote, branch = %branch, "pushed");
    Ok(PushRecord {
        path: repo.into_path_buf(),
        remote: remote.to_string(),
        message: format!("Successfully pushed to {remote}/{branch}"),
        branch,
        output: out.stderr,
    })
}

pub fn git_checkout_branch(ctx: &ToolContext, args: &CheckoutArgs) -> ToolOutput {
    ToolOutput::finish(checkout(ctx, args))
}

fn checkout(ctx: &ToolContext, args: &CheckoutArgs) -> ToolResult<CheckoutRecord> {
    let branch = check_branch_name("branch", &args.branch_name)?;
    let start_point = args
        .start_point
        .as_deref()
        .map(|start| check_ref_arg("start point", start))
        .transpose()?;
    let repo = ctx.repo(args.repo_path.as_deref())?;
    let git = ctx.git().at(&repo);

    let (out, action) = if git.branch_exists(branch)? {
        (git.checkout_branch(branch)?, BranchAction::Switched)
    } else if args.create {
        (
            git.checkout_new_branch(branch, start_point)?,
            BranchAction::Created,
        )
    } else {
        return Err(ToolOutput::failure(format!(
            "Branch '{branch}' does not exist. Set create=true to create it."
        )));
    };
    if !out.success {
        return Err(ToolOutput::failure(out.error_text("git checkout failed")));
    }

    Ok(CheckoutRecord {
        path: repo.into_path_buf(),
        branch: branch.to_string(),
        message: format!("Successfully {} branch '{branch}'", action.as_str()),
        action,
    })
}
