//! GitHub tool tests with a scripted API fake.

use coding_tools::test_support::{FakeGitHub, TestWorkspace, comment, issue, pull};
use coding_tools::tools::call_tool;
use serde_json::json;

const UNPARSEABLE: &str = "Could not parse repository. Provide repo in 'owner/repo' format.";

#[test]
fn create_pr_returns_number_and_url() {
    let ws = TestWorkspace::new().expect("workspace");
    let fake = FakeGitHub::new();
    let calls = fake.calls();
    let ctx = ws.context_with_github(fake);

    let output = call_tool(
        &ctx,
        "github_create_pr",
        &json!({
            "title": "Add feature",
            "body": "Details",
            "head": "feature/x",
            "repo": "https://github.com/owner/repo.git"
        }),
    )
    .expect("call");

    assert!(output.is_success(), "{:?}", output.error());
    assert_eq!(output.get("pr_number"), Some(&json!(42)));
    assert_eq!(output.get("base"), Some(&json!("main")));
    assert_eq!(
        output.get("pr_url"),
        Some(&json!("https://github.com/owner/repo/pull/42"))
    );
    assert_eq!(
        calls.lock().expect("calls").as_slice(),
        ["create_pull owner/repo"]
    );
}

#[test]
fn create_pr_without_repo_is_unparseable() {
    let ws = TestWorkspace::new().expect("workspace");
    let ctx = ws.context_with_github(FakeGitHub::new());

    let output = call_tool(
        &ctx,
        "github_create_pr",
        &json!({"title": "t", "head": "feature"}),
    )
    .expect("call");
    assert_eq!(output.error(), Some(UNPARSEABLE));
}

#[test]
fn list_prs_summarizes_and_limits() {
    let ws = TestWorkspace::new().expect("workspace");
    let fake = FakeGitHub::new().with_pulls(vec![
        pull(3, "Third", "c"),
        pull(2, "Second", "b"),
        pull(1, "First", "a"),
    ]);
    let ctx = ws.context_with_github(fake);

    let output = call_tool(
        &ctx,
        "github_list_prs",
        &json!({"repo": "owner/repo", "limit": 2}),
    )
    .expect("call");

    assert!(output.is_success(), "{:?}", output.error());
    assert_eq!(output.get("repo"), Some(&json!("owner/repo")));
    assert_eq!(output.get("state"), Some(&json!("open")));
    assert_eq!(output.get("count"), Some(&json!(2)));
    let first = &output.get("pull_requests").expect("pulls")[0];
    assert_eq!(first["number"], 3);
    assert_eq!(first["author"], "octocat");
    assert_eq!(first["head"], "c");
    assert_eq!(first["url"], "https://github.com/owner/repo/pull/3");
}

#[test]
fn list_prs_clamps_oversized_limit() {
    let ws = TestWorkspace::new().expect("workspace");
    let pulls = (1..=120).map(|n| pull(n, "PR", "branch")).collect();
    let ctx = ws.context_with_github(FakeGitHub::new().with_pulls(pulls));

    let output = call_tool(
        &ctx,
        "github_list_prs",
        &json!({"repo": "owner/repo", "limit": 1000}),
    )
    .expect("call");
    assert_eq!(output.get("count"), Some(&json!(100)));
}

#[test]
fn get_issue_without_comments_omits_them() {
    let ws = TestWorkspace::new().expect("workspace");
    let fake = FakeGitHub::new().with_issue(issue(123, 2), vec![comment(1, "first")]);
    let calls = fake.calls();
    let ctx = ws.context_with_github(fake);

    let output = call_tool(
        &ctx,
        "github_get_issue",
        &json!({"repo": "owner/repo", "issue_number": 123}),
    )
    .expect("call");

    assert!(output.is_success(), "{:?}", output.error());
    assert_eq!(output.get("title"), Some(&json!("Test Issue")));
    assert_eq!(output.get("labels"), Some(&json!(["bug"])));
    assert_eq!(output.get("comments_count"), Some(&json!(2)));
    assert!(output.get("comments").is_none());
    assert_eq!(calls.lock().expect("calls").len(), 1);
}

#[test]
fn get_issue_with_comments_caps_count() {
    let ws = TestWorkspace::new().expect("workspace");
    let fake = FakeGitHub::new().with_issue(
        issue(7, 3),
        vec![comment(1, "one"), comment(2, "two"), comment(3, "three")],
    );
    let ctx = ws.context_with_github(fake);

    let output = call_tool(
        &ctx,
        "github_get_issue",
        &json!({
            "repo": "git@github.com:owner/repo.git",
            "issue_number": 7,
            "include_comments": true,
            "max_comments": 2
        }),
    )
    .expect("call");

    let comments = output.get("comments").and_then(|c| c.as_array()).expect("comments");
    assert_eq!(comments.len(), 2);
    assert_eq!(comments[0]["body"], "one");
    assert_eq!(comments[0]["author"], "unknown");
}

#[test]
fn get_issue_with_no_comments_omits_them_even_when_requested() {
    let ws = TestWorkspace::new().expect("workspace");
    let fake = FakeGitHub::new().with_issue(issue(9, 0), Vec::new());
    let calls = fake.calls();
    let ctx = ws.context_with_github(fake);

    let output = call_tool(
        &ctx,
        "github_get_issue",
        &json!({"repo": "owner/repo", "issue_number": 9, "include_comments": true}),
    )
    .expect("call");

    assert!(output.is_success(), "{:?}", output.error());
    assert_eq!(output.get("comments_count"), Some(&json!(0)));
    assert!(output.get("comments").is_none());
    assert_eq!(calls.lock().expect("calls").len(), 1);
}

#[test]
fn api_errors_carry_status() {
    let ws = TestWorkspace::new().expect("workspace");
    let ctx = ws.context_with_github(FakeGitHub::new().failing(404, "Not Found"));

    let output = call_tool(
        &ctx,
        "github_get_issue",
        &json!({"repo": "owner/repo", "issue_number": 1}),
    )
    .expect("call");

    assert_eq!(output.error(), Some("GitHub API error: Not Found"));
    assert_eq!(output.get("status"), Some(&json!(404)));
}

#[test]
fn bad_repo_never_reaches_the_api() {
    let ws = TestWorkspace::new().expect("workspace");
    let fake = FakeGitHub::new();
    let calls = fake.calls();
    let ctx = ws.context_with_github(fake);

    for repo in ["owner", "../../etc/passwd", "https://gitlab.com/o/r", "./.."] {
        let output =
            call_tool(&ctx, "github_list_prs", &json!({"repo": repo})).expect("call");
        assert_eq!(output.error(), Some(UNPARSEABLE), "{repo}");
    }
    assert!(calls.lock().expect("calls").is_empty());
}

#[test]
fn missing_token_is_reported_before_parsing() {
    let ws = TestWorkspace::new().expect("workspace");
    let output = call_tool(
        &ws.context(),
        "github_get_issue",
        &json!({"repo": "not a repo", "issue_number": 1}),
    )
    .expect("call");
    assert_eq!(
        output.error(),
        Some("GITHUB_TOKEN environment variable not set. Please configure it.")
    );
}
