//! Tool definitions advertised over `tools/list`.
//!
//! Input schemas double as the argument validator for `tools/call`.

use serde_json::{Value, json};

pub const TOOL_NAMES: [&str; 9] = [
    "git_clone",
    "git_status",
    "git_diff",
    "git_commit",
    "git_push",
    "git_checkout_branch",
    "github_create_pr",
    "github_list_prs",
    "github_get_issue",
];

fn repo_path_property() -> Value {
    json!({
        "type": "string",
        "description": "Repository directory relative to the workspace. Defaults to the first cloned repository."
    })
}

fn git_clone() -> Value {
    json!({
        "name": "git_clone",
        "description": "Clone a GitHub repository into the workspace.",
        "inputSchema": {
            "type": "object",
            "properties": {
                "repo_url": {
                    "type": "string",
                    "description": "Repository as owner/repo, https://github.com/owner/repo, or git@github.com:owner/repo.git"
                },
                "branch": {"type": "string", "description": "Branch to clone", "default": "main"},
                "target_dir": {
                    "type": "string",
                    "description": "Directory name relative to the workspace. Defaults to the repository name."
                },
                "depth": {"type": "integer", "minimum": 1, "description": "Shallow clone depth"}
            },
            "required": ["repo_url"]
        }
    })
}

fn git_status() -> Value {
    json!({
        "name": "git_status",
        "description": "Show the working tree status of a repository.",
        "inputSchema": {
            "type": "object",
            "properties": {
                "repo_path": repo_path_property()
            }
        }
    })
}

fn git_diff() -> Value {
    json!({
        "name": "git_diff",
        "description": "Show unstaged or staged changes, optionally for a single file.",
        "inputSchema": {
            "type": "object",
            "properties": {
                "repo_path": repo_path_property(),
                "staged": {"type": "boolean", "default": false, "description": "Show staged changes"},
                "file_path": {"type": "string", "description": "File relative to the repository"}
            }
        }
    })
}

fn git_commit() -> Value {
    json!({
        "name": "git_commit",
        "description": "Stage changes and create a commit.",
        "inputSchema": {
            "type": "object",
            "properties": {
                "message": {"type": "string", "description": "Commit message"},
                "repo_path": repo_path_property(),
                "files": {
                    "type": "array",
                    "items": {"type": "string"},
                    "description": "Files to stage, relative to the repository"
                },
                "all_changes": {
                    "type": "boolean",
                    "default": true,
                    "description": "Stage all changes when no files are listed"
                }
            },
            "required": ["message"]
        }
    })
}

fn git_push() -> Value {
    json!({
        "name": "git_push",
        "description": "Push a branch to a remote.",
        "inputSchema": {
            "type": "object",
            "properties": {
                "repo_path": repo_path_property(),
                "remote": {"type": "string", "default": "origin"},
                "branch": {"type": "string", "description": "Branch to push. Defaults to the current branch."},
                "set_upstream": {"type": "boolean", "default": true},
                "force": {"type": "boolean", "default": false}
            }
        }
    })
}

fn git_checkout_branch() -> Value {
    json!({
        "name": "git_checkout_branch",
        "description": "Switch to a branch, creating it if needed.",
        "inputSchema": {
            "type": "object",
            "properties": {
                "branch_name": {"type": "string"},
                "repo_path": repo_path_property(),
                "create": {"type": "boolean", "default": true, "description": "Create the branch if it does not exist"},
                "start_point": {"type": "string", "description": "Commit or branch to start a new branch from"}
            },
            "required": ["branch_name"]
        }
    })
}

fn github_create_pr() -> Value {
    json!({
        "name": "github_create_pr",
        "description": "Open a pull request on GitHub.",
        "inputSchema": {
            "type": "object",
            "properties": {
                "title": {"type": "string"},
                "body": {"type": "string", "default": ""},
                "head": {"type": "string", "description": "Branch containing the changes"},
                "base": {"type": "string", "default": "main"},
                "repo": {"type": "string", "description": "Repository as owner/repo"},
                "draft": {"type": "boolean", "default": false}
            },
            "required": ["title", "head"]
        }
    })
}

fn github_list_prs() -> Value {
    json!({
        "name": "github_list_prs",
        "description": "List pull requests, most recently updated first.",
        "inputSchema": {
            "type": "object",
            "properties": {
                "repo": {"type": "string", "description": "Repository as owner/repo"},
                "state": {"type": "string", "enum": ["open", "closed", "all"], "default": "open"},
                "limit": {"type": "integer", "minimum": 0, "default": 10, "description": "At most 100"}
            },
            "required": ["repo"]
        }
    })
}

fn github_get_issue() -> Value {
    json!({
        "name": "github_get_issue",
        "description": "Read an issue and optionally its comments.",
        "inputSchema": {
            "type": "object",
            "properties": {
                "repo": {"type": "string", "description": "Repository as owner/repo"},
                "issue_number": {"type": "integer", "minimum": 1},
                "include_comments": {"type": "boolean", "default": false},
                "max_comments": {"type": "integer", "minimum": 0, "default": 10}
            },
            "required": ["repo", "issue_number"]
        }
    })
}

/// All tool definitions in advertised order.
pub fn tool_definitions() -> Vec<Value> {
    vec![
        git_clone(),
        git_status(),
        git_diff(),
        git_commit(),
        git_push(),
        git_checkout_branch(),
        github_create_pr(),
        github_list_prs(),
        github_get_issue(),
    ]
}

pub fn find_tool(name: &str) -> Option<Value> {
    tool_definitions()
        .into_iter()
        .find(|tool| tool["name"] == name)
}
