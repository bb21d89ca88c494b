//! Git adapter for the agent tools.
//!
//! Every invocation goes through [`run_command_with_timeout`] so a hung
//! network operation cannot stall the server. Working directories and path
//! arguments are [`ConfinedPath`]s; raw agent strings never reach `git`.

use std::path::{Path, PathBuf};
use std::process::Command;
use std::time::Duration;

use anyhow::Result;
use tracing::{debug, instrument, warn};

use crate::core::confine::ConfinedPath;
use crate::io::process::run_command_with_timeout;

/// Outcome of a git invocation that ran to completion (or timed out).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GitOutput {
    pub success: bool,
    pub code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl GitOutput {
    /// Best available failure text: stderr, then stdout, then `fallback`.
    pub fn error_text(&self, fallback: &str) -> String {
        [self.stderr.trim(), self.stdout.trim()]
            .into_iter()
            .find(|text| !text.is_empty())
            .unwrap_or(fallback)
            .to_string()
    }
}

/// Options for `git clone`.
#[derive(Debug, Clone)]
pub struct CloneOptions<'a> {
    pub url: &'a str,
    pub branch: &'a str,
    pub depth: Option<u32>,
}

/// Options for `git push`.
#[derive(Debug, Clone)]
pub struct PushOptions<'a> {
    pub remote: &'a str,
    pub branch: &'a str,
    pub set_upstream: bool,
    pub force: bool,
}

/// Wrapper for executing git commands in a working directory.
#[derive(Debug, Clone)]
pub struct Git {
    workdir: PathBuf,
    timeout: Duration,
    output_limit_bytes: usize,
}

impl Git {
    pub fn new(workdir: impl Into<PathBuf>, timeout: Duration, output_limit_bytes: usize) -> Self {
        Self {
            workdir: workdir.into(),
            timeout,
            output_limit_bytes,
        }
    }

    pub fn workdir(&self) -> &Path {
        &self.workdir
    }

    /// A wrapper with the same limits, running in `workdir`.
    pub fn at(&self, workdir: &ConfinedPath) -> Self {
        Self {
            workdir: workdir.as_path().to_path_buf(),
            ..self.clone()
        }
    }

    /// Clone `opts.url` into `dest`, running from this wrapper's workdir.
    #[instrument(skip_all, fields(branch = opts.branch, depth = ?opts.depth))]
    pub fn clone_into(&self, opts: &CloneOptions<'_>, dest: &ConfinedPath) -> Result<GitOutput> {
        let depth = opts.depth.map(|d| d.to_string());
        let dest = dest.as_path().to_string_lossy();
        let mut args = vec!["clone", "--branch", opts.branch];
        if let Some(depth) = depth.as_deref() {
            args.extend(["--depth", depth]);
        }
        args.extend(["--", opts.url, dest.as_ref()]);
        self.run(&args)
    }

    /// Set a repository-local config value.
    pub fn config_set(&self, key: &str, value: &str) -> Result<GitOutput> {
        self.run(&["config", key, value])
    }

    pub fn status_short(&self) -> Result<GitOutput> {
        self.run(&["status", "--short"])
    }

    /// Return the current branch name, or `None` when it cannot be determined.
    ///
    /// A detached HEAD counts as undetermined.
    #[instrument(skip_all)]
    pub fn current_branch(&self) -> Result<Option<String>> {
        let out = self.run(&["rev-parse", "--abbrev-ref", "HEAD"])?;
        if !out.success {
            return Ok(None);
        }
        let name = out.stdout.trim().to_string();
        if name.is_empty() || name == "HEAD" {
            warn!("detached or unborn HEAD");
            return Ok(None);
        }
        debug!(branch = %name, "current branch");
        Ok(Some(name))
    }

    /// Full SHA of HEAD, or `None` if it cannot be resolved.
    pub fn head_sha(&self) -> Result<Option<String>> {
        let out = self.run(&["rev-parse", "HEAD"])?;
        Ok(out.success.then(|| out.stdout.trim().to_string()))
    }

    pub fn diff(&self, staged: bool, file: Option<&ConfinedPath>) -> Result<GitOutput> {
        let file = file.map(|f| f.as_path().to_string_lossy().into_owned());
        let mut args = vec!["diff"];
        if staged {
            args.push("--staged");
        }
        if let Some(file) = file.as_deref() {
            args.extend(["--", file]);
        }
        self.run(&args)
    }

    /// Stage all changes (respects .gitignore).
    pub fn add_all(&self) -> Result<GitOutput> {
        self.run(&["add", "-A"])
    }

    pub fn add_path(&self, path: &ConfinedPath) -> Result<GitOutput> {
        let path = path.as_path().to_string_lossy();
        self.run(&["add", "--", path.as_ref()])
    }

    #[instrument(skip_all)]
    pub fn commit(&self, message: &str) -> Result<GitOutput> {
        debug!("committing staged changes");
        self.run(&["commit", "-m", message])
    }

    /// Push a local branch. It is sent as an explicit
    /// `refs/heads/<b>:refs/heads/<b>` refspec, so only `--force` can rewrite
    /// the remote branch.
    #[instrument(skip_all, fields(remote = opts.remote, branch = opts.branch, force = opts.force))]
    pub fn push(&self, opts: &PushOptions<'_>) -> Result<GitOutput> {
        let refspec = format!("refs/heads/{b}:refs/heads/{b}", b = opts.branch);
        let mut args = vec!["push"];
        if opts.set_upstream {
            args.push("-u");
        }
        if opts.force {
            args.push("--force");
        }
        args.extend([opts.remote, refspec.as_str()]);
        self.run(&args)
    }

    /// Check whether a local branch exists.
    pub fn branch_exists(&self, branch: &str) -> Result<bool> {
        let out = self.run(&[
            "show-ref",
            "--verify",
            "--quiet",
            &format!("refs/heads/{branch}"),
        ])?;
        Ok(out.success)
    }

    /// Checkout an existing branch.
    #[instrument(skip_all, fields(branch = branch))]
    pub fn checkout_branch(&self, branch: &str) -> Result<GitOutput> {
        debug!(branch, "checking out branch");
        self.run(&["checkout", branch])
    }

    /// Create and checkout a new branch at `start_point` (HEAD when absent).
    #[instrument(skip_all, fields(branch = branch))]
    pub fn checkout_new_branch(&self, branch: &str, start_point: Option<&str>) -> Result<GitOutput> {
        debug!(branch, ?start_point, "creating and checking out new branch");
        let mut args = vec!["checkout", "-b", branch];
        if let Some(start) = start_point {
            args.push(start);
        }
        self.run(&args)
    }

    fn run(&self, args: &[&str]) -> Result<GitOutput> {
        let mut cmd = Command::new("git");
        cmd.args(args)
            .current_dir(&self.workdir)
            .env("GIT_TERMINAL_PROMPT", "0");
        let output = run_command_with_timeout(cmd, self.timeout, self.output_limit_bytes)?;
        if output.timed_out {
            warn!(subcommand = args.first().copied(), "git timed out");
            return Ok(GitOutput {
                success: false,
                code: None,
                stdout: output.stdout_text(),
                stderr: format!("Command timed out after {} seconds", self.timeout.as_secs()),
            });
        }
        let result = GitOutput {
            success: output.success(),
            code: output.status.code(),
            stdout: output.stdout_text(),
            stderr: output.stderr_text(),
        };
        debug!(
            subcommand = args.first().copied(),
            success = result.success,
            "git finished"
        );
        Ok(result)
    }
}
