//! Locating repositories inside the workspace directory.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use tracing::debug;

use crate::core::confine::{ConfinedPath, PathRejection, confine};

pub const NO_REPOSITORY: &str = "No repository found. Clone a repository first.";

/// Why a repository could not be resolved for a tool call.
#[derive(Debug)]
pub enum RepoLookupError {
    Rejected(PathRejection),
    NotFound,
    Io(anyhow::Error),
}

impl RepoLookupError {
    pub fn message(&self) -> String {
        match self {
            RepoLookupError::Rejected(rejection) => rejection.to_string(),
            RepoLookupError::NotFound => NO_REPOSITORY.to_string(),
            RepoLookupError::Io(err) => format!("{err:#}"),
        }
    }
}

/// Resolve the repository a tool should operate on.
///
/// An explicit `repo_path` is confined to the workspace. Without one, the first
/// workspace child (by name) that contains `.git` is used.
pub fn resolve_repo(
    workspace: &Path,
    repo_path: Option<&str>,
) -> Result<ConfinedPath, RepoLookupError> {
    match repo_path {
        Some(path) => confine(path, workspace).map_err(RepoLookupError::Rejected),
        None => match find_default_repo(workspace) {
            Ok(Some(found)) => Ok(found),
            Ok(None) => Err(RepoLookupError::NotFound),
            Err(err) => Err(RepoLookupError::Io(err)),
        },
    }
}

/// First directory directly under `workspace` that holds a `.git` entry.
///
/// Entries are visited in lexicographic order so the choice is stable.
pub fn find_default_repo(workspace: &Path) -> Result<Option<ConfinedPath>> {
    if !workspace.is_dir() {
        return Ok(None);
    }
    let mut names = Vec::new();
    for entry in fs::read_dir(workspace)
        .with_context(|| format!("read workspace {}", workspace.display()))?
    {
        let entry = entry.with_context(|| format!("read entry in {}", workspace.display()))?;
        let path = entry.path();
        if path.is_dir() && path.join(".git").exists() {
            names.push(entry.file_name());
        }
    }
    names.sort();
    let Some(name) = names.into_iter().next() else {
        return Ok(None);
    };
    // Entries from read_dir are single relative components, so this cannot escape.
    let repo = confine(&name, workspace)
        .with_context(|| format!("confine workspace entry {}", name.to_string_lossy()))?;
    debug!(repo = %repo, "default repository");
    Ok(Some(repo))
}
