//! Parsing of GitHub repository references supplied by the agent.
//!
//! Three shapes are accepted, each as a fully anchored pattern:
//!
//! - `https://github.com/<owner>/<name>` (scheme and `www.` optional)
//! - `git@github.com:<owner>/<name>`
//! - `<owner>/<name>`
//!
//! A trailing `.git` on the name is stripped. Every other input is
//! [`UnparseableRepoRef`]. Patterns are compiled with the `regex` crate, whose
//! matcher runs in linear time regardless of input.

use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;
use thiserror::Error;

// The host is matched case-insensitively; owner and name are left as typed.
static HTTPS_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^(?i:(?:https?://)?(?:www\.)?github\.com)/([A-Za-z0-9_.-]+)/([A-Za-z0-9_.-]+?)(?:\.git)?/?$",
    )
    .unwrap()
});
static SSH_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^git@(?i:github\.com):([A-Za-z0-9_.-]+)/([A-Za-z0-9_.-]+?)(?:\.git)?$").unwrap()
});
static BARE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([A-Za-z0-9_.-]+)/([A-Za-z0-9_.-]+?)(?:\.git)?$").unwrap()
});

/// Which of the accepted textual shapes a reference was written in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RepoRefShape {
    Https,
    Ssh,
    Bare,
}

impl RepoRefShape {
    pub fn as_str(self) -> &'static str {
        match self {
            RepoRefShape::Https => "https",
            RepoRefShape::Ssh => "ssh",
            RepoRefShape::Bare => "bare",
        }
    }
}

/// A validated `(owner, name)` pair.
///
/// Both parts are non-empty, drawn from `[A-Za-z0-9_.-]`, and never consist of
/// dots alone, so they can be placed into URL paths without escaping.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RepoRef {
    owner: String,
    name: String,
    shape: RepoRefShape,
}

/// The input matched none of the accepted shapes (or was missing).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("Could not parse repository. Provide repo in 'owner/repo' format.")]
pub struct UnparseableRepoRef;

impl RepoRef {
    pub fn owner(&self) -> &str {
        &self.owner
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn shape(&self) -> RepoRefShape {
        self.shape
    }

    /// `owner/name`, as used by the GitHub REST API.
    pub fn full_name(&self) -> String {
        format!("{}/{}", self.owner, self.name)
    }

    /// Canonical clone URL rebuilt from the validated parts.
    ///
    /// SSH references keep SSH transport; HTTPS and bare references clone
    /// over HTTPS.
    pub fn clone_url(&self) -> String {
        match self.shape {
            RepoRefShape::Ssh => format!("git@github.com:{}/{}.git", self.owner, self.name),
            RepoRefShape::Https | RepoRefShape::Bare => {
                format!("https://github.com/{}/{}.git", self.owner, self.name)
            }
        }
    }
}

impl fmt::Display for RepoRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.name)
    }
}

impl FromStr for RepoRef {
    type Err = UnparseableRepoRef;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_repo_ref(Some(s))
    }
}

/// Parse an untrusted repository reference.
///
/// Leading and trailing whitespace is ignored. Shapes are tried in a fixed
/// order (HTTPS, SSH, bare); they cannot overlap, so the order only decides
/// which pattern reports a miss first.
pub fn parse_repo_ref(input: Option<&str>) -> Result<RepoRef, UnparseableRepoRef> {
    let input = input.map(str::trim).unwrap_or_default();
    if input.is_empty() {
        return Err(UnparseableRepoRef);
    }

    let shapes: [(RepoRefShape, &Regex); 3] = [
        (RepoRefShape::Https, &*HTTPS_RE),
        (RepoRefShape::Ssh, &*SSH_RE),
        (RepoRefShape::Bare, &*BARE_RE),
    ];
    for (shape, pattern) in shapes {
        let Some(caps) = pattern.captures(input) else {
            continue;
        };
        let (owner, name) = (&caps[1], &caps[2]);
        if is_dot_only(owner) || is_dot_only(name) {
            return Err(UnparseableRepoRef);
        }
        return Ok(RepoRef {
            owner: owner.to_string(),
            name: name.to_string(),
            shape,
        });
    }
    Err(UnparseableRepoRef)
}

/// `.` and `..` would be reinterpreted as path segments once placed in a URL.
fn is_dot_only(token: &str) -> bool {
    token.chars().all(|c| c == '.')
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parts(input: &str) -> (String, String) {
        let repo = parse_repo_ref(Some(input)).expect("expected reference to parse");
        (repo.owner().to_string(), repo.name().to_string())
    }

    fn owner_repo() -> (String, String) {
        ("owner".to_string(), "repo".to_string())
    }

    #[test]
    fn parses_https_url() {
        assert_eq!(parts("https://github.com/owner/repo"), owner_repo());
    }

    #[test]
    fn strips_git_suffix() {
        assert_eq!(parts("https://github.com/owner/repo.git"), owner_repo());
        assert_eq!(parts("git@github.com:owner/repo.git"), owner_repo());
        assert_eq!(parts("owner/repo.git"), owner_repo());
    }

    #[test]
    fn accepts_trailing_slash_on_https() {
        assert_eq!(parts("https://github.com/owner/repo/"), owner_repo());
        assert_eq!(parts("https://github.com/owner/repo.git/"), owner_repo());
    }

    #[test]
    fn accepts_optional_scheme_and_www() {
        assert_eq!(parts("github.com/owner/repo"), owner_repo());
        assert_eq!(parts("http://github.com/owner/repo"), owner_repo());
        assert_eq!(parts("https://www.github.com/owner/repo"), owner_repo());
    }

    #[test]
    fn host_match_ignores_case() {
        assert_eq!(parts("HTTPS://GitHub.COM/owner/repo"), owner_repo());
        assert_eq!(parts("git@GITHUB.com:owner/repo"), owner_repo());
    }

    #[test]
    fn parses_ssh_url() {
        let repo = parse_repo_ref(Some("git@github.com:owner/repo")).expect("parse");
        assert_eq!(repo.shape(), RepoRefShape::Ssh);
        assert_eq!(repo.full_name(), "owner/repo");
    }

    #[test]
    fn parses_bare_reference_with_special_chars() {
        assert_eq!(
            parts("my-org/my_repo.test"),
            ("my-org".to_string(), "my_repo.test".to_string())
        );
    }

    #[test]
    fn trims_surrounding_whitespace() {
        assert_eq!(
            parse_repo_ref(Some("  owner/repo  ")),
            parse_repo_ref(Some("owner/repo"))
        );
        assert_eq!(parts("\towner/repo\n"), owner_repo());
    }

    #[test]
    fn rejects_missing_or_empty_input() {
        assert_eq!(parse_repo_ref(None), Err(UnparseableRepoRef));
        assert_eq!(parse_repo_ref(Some("")), Err(UnparseableRepoRef));
        assert_eq!(parse_repo_ref(Some("   ")), Err(UnparseableRepoRef));
    }

    #[test]
    fn rejects_invalid_and_adversarial_references() {
        for input in [
            "invalid",
            "owner/repo/extra",
            "owner/repo/extra/path",
            "https://evil.com/github.com/owner/repo",
            "https://github.com.evil.com/owner/repo",
            "https://github.com@evil.com/owner/repo",
            "https://user@github.com/owner/repo",
            "https://evil.com/path?redirect=github.com/owner/repo",
            "https://github.com/owner/repo?x=1",
            "https://github.com/owner/repo#readme",
            "https://github.com:443/owner/repo",
            "https://github.com/owner",
            "ftp://github.com/owner/repo",
            "git@github.com/owner/repo",
            "git@evil.com:owner/repo",
            "ssh://git@github.com/owner/repo",
            "/owner/repo",
            "owner/",
            "owner repo/x",
            "owner/re po",
        ] {
            assert_eq!(parse_repo_ref(Some(input)), Err(UnparseableRepoRef), "{input}");
        }
    }

    #[test]
    fn rejects_dot_only_tokens() {
        for input in ["../repo", "owner/..", "./repo", "https://github.com/owner/.."] {
            assert_eq!(parse_repo_ref(Some(input)), Err(UnparseableRepoRef), "{input}");
        }
    }

    #[test]
    fn clone_url_is_rebuilt_from_parts() {
        let https: RepoRef = "https://github.com/owner/repo/".parse().expect("parse");
        assert_eq!(https.clone_url(), "https://github.com/owner/repo.git");

        let bare: RepoRef = "owner/repo".parse().expect("parse");
        assert_eq!(bare.clone_url(), "https://github.com/owner/repo.git");

        let ssh: RepoRef = "git@github.com:owner/repo.git".parse().expect("parse");
        assert_eq!(ssh.clone_url(), "git@github.com:owner/repo.git");
    }

    #[test]
    fn error_text_is_user_facing() {
        assert_eq!(
            UnparseableRepoRef.to_string(),
            "Could not parse repository. Provide repo in 'owner/repo' format."
        );
    }
}
