//! Property-based tests for repository reference parsing.

use coding_tools::core::repo_ref::{RepoRefShape, parse_repo_ref};
use proptest::prelude::*;

mod strategies {
    use proptest::prelude::*;

    /// Owner or name without dots, so `.git` stripping cannot interfere.
    pub fn token() -> impl Strategy<Value = String> {
        "[A-Za-z0-9_-]{1,16}"
    }

    /// Arbitrary short text, mostly printable.
    pub fn noise() -> impl Strategy<Value = String> {
        "[ -~]{0,40}"
    }
}

fn is_valid_token(token: &str) -> bool {
    !token.is_empty()
        && !token.chars().all(|c| c == '.')
        && token
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '-'))
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(500))]

    /// All accepted shapes agree on owner and name.
    #[test]
    fn shapes_agree(owner in strategies::token(), name in strategies::token(), git in any::<bool>()) {
        let suffix = if git { ".git" } else { "" };
        let inputs = [
            (format!("https://github.com/{owner}/{name}{suffix}"), RepoRefShape::Https),
            (format!("git@github.com:{owner}/{name}{suffix}"), RepoRefShape::Ssh),
            (format!("{owner}/{name}{suffix}"), RepoRefShape::Bare),
        ];
        for (input, shape) in inputs {
            let repo = parse_repo_ref(Some(&input)).expect("well-formed reference parses");
            prop_assert_eq!(repo.owner(), owner.as_str());
            prop_assert_eq!(repo.name(), name.as_str());
            prop_assert_eq!(repo.shape(), shape);
        }
    }

    /// Display output parses back to the same parts.
    #[test]
    fn display_round_trips(owner in strategies::token(), name in strategies::token()) {
        let repo = parse_repo_ref(Some(&format!("{owner}/{name}"))).expect("parses");
        let again = parse_repo_ref(Some(&repo.to_string())).expect("re-parses");
        prop_assert_eq!(repo.owner(), again.owner());
        prop_assert_eq!(repo.name(), again.name());
    }

    /// Whatever is accepted is safe to place into a URL path.
    #[test]
    fn accepted_parts_are_url_safe(input in strategies::noise()) {
        if let Ok(repo) = parse_repo_ref(Some(&input)) {
            prop_assert!(is_valid_token(repo.owner()), "owner {:?}", repo.owner());
            prop_assert!(is_valid_token(repo.name()), "name {:?}", repo.name());
        }
    }

    /// Foreign hosts never parse, whatever the path looks like.
    #[test]
    fn other_hosts_are_rejected(owner in strategies::token(), name in strategies::token()) {
        for host in ["gitlab.com", "github.com.evil.test", "evilgithub.com"] {
            let input = format!("https://{host}/{owner}/{name}");
            prop_assert!(parse_repo_ref(Some(&input)).is_err(), "{}", input);
        }
    }
}
