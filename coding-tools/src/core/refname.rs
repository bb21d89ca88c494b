//! Checks for ref-like arguments forwarded to git (branches, remotes, start points).
//!
//! These values end up as positional git arguments, so anything that git could
//! read as an option is refused before a process is spawned. Branch and remote
//! names are held to a stricter rule: refspec syntax (`+src`, `src:dst`) and
//! revision operators are refused so a push can never force or delete on its own.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Invalid {kind} '{value}': {reason}")]
pub struct InvalidRefArg {
    pub kind: &'static str,
    pub value: String,
    pub reason: &'static str,
}

/// Characters git refuses in ref names, plus `:` and `+` which carry refspec meaning.
const FORBIDDEN_NAME_CHARS: &[char] = &[':', '?', '*', '[', '\\', '^', '~', '+'];

/// Validate a revision-like argument (start points), returning it unchanged.
pub fn check_ref_arg<'a>(kind: &'static str, value: &'a str) -> Result<&'a str, InvalidRefArg> {
    let reason = if value.is_empty() {
        Some("must not be empty")
    } else if value.starts_with('-') {
        Some("must not start with '-'")
    } else if value.chars().any(|c| c.is_whitespace() || c.is_control()) {
        Some("must not contain whitespace or control characters")
    } else {
        None
    };
    match reason {
        Some(reason) => Err(InvalidRefArg {
            kind,
            value: value.to_string(),
            reason,
        }),
        None => Ok(value),
    }
}

/// Validate a branch or remote name.
///
/// Follows the `git check-ref-format --branch` rules that matter here and
/// additionally refuses `+` anywhere.
pub fn check_branch_name<'a>(
    kind: &'static str,
    value: &'a str,
) -> Result<&'a str, InvalidRefArg> {
    check_ref_arg(kind, value)?;
    let reason = if value.contains(FORBIDDEN_NAME_CHARS) {
        Some("must not contain any of : ? * [ \\ ^ ~ +")
    } else if value.contains("..") || value.contains("@{") || value == "@" {
        Some("must not contain '..' or '@{'")
    } else if value.starts_with(['.', '/'])
        || value.ends_with(['.', '/'])
        || value.contains("//")
        || value.contains("/.")
    {
        Some("is not a valid ref name")
    } else if value.ends_with(".lock") {
        Some("must not end with '.lock'")
    } else {
        None
    };
    match reason {
        Some(reason) => Err(InvalidRefArg {
            kind,
            value: value.to_string(),
            reason,
        }),
        None => Ok(value),
    }
}
