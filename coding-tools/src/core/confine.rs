//! Confinement of caller-supplied paths to a base directory.
//!
//! Confinement is purely lexical: `.` and `..` are resolved segment by segment
//! and nothing is looked up on disk, so a target that does not exist yet (a
//! clone destination, a file about to be staged) is judged exactly like one
//! that does. Callers decide separately whether the confined path exists.

use std::fmt;
use std::path::{Component, Path, PathBuf};

use thiserror::Error;

/// Why a target path was refused.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PathRejection {
    /// The target is rooted (`/tmp/x`, `\\x`, `C:\x`).
    #[error("Absolute paths are not allowed. Use a relative directory name instead of '{target}'")]
    AbsolutePath { target: String },
    /// The normalized target resolves outside the base directory.
    #[error("Path traversal detected. Target must be within {}", base.display())]
    Traversal { base: PathBuf },
    /// The base directory could not be made absolute (no working directory).
    #[error("Base directory '{}' cannot be resolved to an absolute path", base.display())]
    UnresolvableBase { base: PathBuf },
}

/// An absolute path proven to lie within (or equal) a base directory.
///
/// Only [`confine`] constructs this type.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ConfinedPath {
    path: PathBuf,
}

impl ConfinedPath {
    pub fn as_path(&self) -> &Path {
        &self.path
    }

    pub fn into_path_buf(self) -> PathBuf {
        self.path
    }
}

impl AsRef<Path> for ConfinedPath {
    fn as_ref(&self) -> &Path {
        &self.path
    }
}

impl fmt::Display for ConfinedPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.path.display())
    }
}

/// Resolve `target` against `base`, refusing anything that escapes `base`.
///
/// - Rooted targets are rejected before any joining happens.
/// - `base` is made absolute and normalized; it does not have to exist. An
///   empty base means the current directory.
/// - An empty target behaves like `.` and resolves to `base` itself.
/// - Containment is decided per path component, so `/workspaceevil` is never
///   considered inside `/workspace`.
pub fn confine(
    target: impl AsRef<Path>,
    base: impl AsRef<Path>,
) -> Result<ConfinedPath, PathRejection> {
    let target = target.as_ref();
    if is_rooted(target) {
        return Err(PathRejection::AbsolutePath {
            target: target.display().to_string(),
        });
    }

    let base = absolute_base(base.as_ref())?;
    let candidate = normalize_lexically(&base.join(target));
    if !is_within(&candidate, &base) {
        return Err(PathRejection::Traversal { base });
    }
    Ok(ConfinedPath { path: candidate })
}

/// Make `base` absolute (relative to the current directory) and normalize it.
///
/// `std::path::absolute` only consults the working directory; it never
/// requires `base` to exist. It refuses an empty path, which is read as `.`.
pub fn absolute_base(base: &Path) -> Result<PathBuf, PathRejection> {
    let base = if base.as_os_str().is_empty() {
        Path::new(".")
    } else {
        base
    };
    let absolute = std::path::absolute(base).map_err(|_| PathRejection::UnresolvableBase {
        base: base.to_path_buf(),
    })?;
    Ok(normalize_lexically(&absolute))
}

/// Resolve `.` and `..` without touching the filesystem.
///
/// `..` directly under a root is dropped (there is nothing above `/`). For
/// relative inputs, leading `..` segments that cannot be cancelled are kept so
/// containment checks still see them.
pub fn normalize_lexically(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::Prefix(_) | Component::RootDir => out.push(component.as_os_str()),
            Component::CurDir => {}
            Component::ParentDir => {
                if matches!(out.components().next_back(), Some(Component::Normal(_))) {
                    out.pop();
                } else if !out.has_root() {
                    out.push("..");
                }
            }
            Component::Normal(segment) => out.push(segment),
        }
    }
    out
}

fn is_rooted(target: &Path) -> bool {
    target.is_absolute()
        || target.has_root()
        || matches!(target.components().next(), Some(Component::Prefix(_)))
}

fn is_within(candidate: &Path, base: &Path) -> bool {
    candidate.starts_with(base) && !candidate.components().any(|c| c == Component::ParentDir)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn accepted(target: &str) -> PathBuf {
        confine(target, "/workspace")
            .expect("expected target to be confined")
            .into_path_buf()
    }

    fn rejected(target: &str) -> PathRejection {
        confine(target, "/workspace").expect_err("expected target to be rejected")
    }

    #[test]
    fn simple_directory_is_joined_onto_base() {
        assert_eq!(accepted("my-repo"), PathBuf::from("/workspace/my-repo"));
    }

    #[test]
    fn nested_directory_is_joined_onto_base() {
        assert_eq!(accepted("org/repo"), PathBuf::from("/workspace/org/repo"));
    }

    #[test]
    fn dots_inside_names_are_plain_characters() {
        assert_eq!(
            accepted("my.repo.name"),
            PathBuf::from("/workspace/my.repo.name")
        );
    }

    #[test]
    fn current_dir_resolves_to_base() {
        assert_eq!(accepted("."), PathBuf::from("/workspace"));
        assert_eq!(accepted("./my-repo"), PathBuf::from("/workspace/my-repo"));
    }

    #[test]
    fn empty_target_is_treated_as_current_dir() {
        assert_eq!(accepted(""), PathBuf::from("/workspace"));
        assert_eq!(confine("", "/workspace"), confine(".", "/workspace"));
    }

    #[test]
    fn inner_parent_segments_that_stay_inside_are_accepted() {
        assert_eq!(accepted("a/b/../c"), PathBuf::from("/workspace/a/c"));
        assert_eq!(accepted("a/.."), PathBuf::from("/workspace"));
    }

    #[test]
    fn absolute_targets_are_rejected() {
        for target in ["/tmp/evil", "/etc/passwd", "/workspace/inside"] {
            let err = rejected(target);
            assert!(matches!(err, PathRejection::AbsolutePath { .. }), "{target}");
            assert!(err.to_string().contains("Absolute paths are not allowed"));
        }
    }

    #[test]
    fn traversal_is_rejected() {
        for target in [
            "../x",
            "../escape",
            "../../etc/passwd",
            "foo/../../etc",
            "x/../../y",
            "..",
        ] {
            let err = rejected(target);
            assert_eq!(
                err,
                PathRejection::Traversal {
                    base: PathBuf::from("/workspace")
                },
                "{target}"
            );
            assert!(err.to_string().contains("Path traversal detected"));
        }
    }

    #[test]
    fn sibling_sharing_a_string_prefix_is_rejected() {
        let err = rejected("../workspaceevil");
        assert!(matches!(err, PathRejection::Traversal { .. }));
    }

    #[test]
    fn base_is_normalized_before_comparison() {
        let confined = confine("repo", "/srv/./workspace/../workspace").expect("confined");
        assert_eq!(confined.as_path(), Path::new("/srv/workspace/repo"));

        let err = confine("../other", "/srv/workspace/").expect_err("rejected");
        assert_eq!(
            err,
            PathRejection::Traversal {
                base: PathBuf::from("/srv/workspace")
            }
        );
    }

    #[test]
    fn root_base_accepts_any_relative_target() {
        let confined = confine("../../etc", "/").expect("confined");
        assert_eq!(confined.as_path(), Path::new("/etc"));
    }

    #[test]
    fn normalize_keeps_uncancelled_parents_on_relative_paths() {
        assert_eq!(
            normalize_lexically(Path::new("../a/./b/..")),
            PathBuf::from("../a")
        );
        assert_eq!(normalize_lexically(Path::new("/../a")), PathBuf::from("/a"));
    }

    #[test]
    fn empty_base_means_current_directory() {
        let cwd = normalize_lexically(&std::env::current_dir().expect("cwd"));
        let confined = confine("x", "").expect("confined");
        assert!(confined.as_path().is_absolute(), "{confined}");
        assert_eq!(confined.as_path(), cwd.join("x"));

        let err = confine("../x", "").expect_err("rejected");
        assert_eq!(err, PathRejection::Traversal { base: cwd });
    }

    #[test]
    fn relative_base_is_made_absolute() {
        let cwd = normalize_lexically(&std::env::current_dir().expect("cwd"));
        let confined = confine("repo", "ws/./inner").expect("confined");
        assert_eq!(confined.as_path(), cwd.join("ws/inner/repo"));
    }

    #[test]
    fn confinement_is_idempotent() {
        assert_eq!(confine("a/../b", "/workspace"), confine("a/../b", "/workspace"));
        assert_eq!(confine("./x", "/workspace"), confine("x", "/workspace"));
    }
}
