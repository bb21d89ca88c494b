//! CLI tests: spawn the binary and check output and exit codes.

use std::process::Command;

use coding_tools::exit_codes;

fn bin() -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_coding-tools"));
    cmd.env_remove("RUST_LOG");
    cmd
}

#[test]
fn confine_prints_path_inside_base() {
    let output = bin()
        .args(["confine", "my-repo", "--base", "/workspace"])
        .output()
        .expect("run confine");
    assert_eq!(output.status.code(), Some(exit_codes::OK));
    assert_eq!(String::from_utf8_lossy(&output.stdout).trim(), "/workspace/my-repo");
}

#[test]
fn confine_rejects_traversal_and_absolute() {
    for target in ["../escape", "/etc/passwd"] {
        let output = bin()
            .args(["confine", target, "--base", "/workspace"])
            .output()
            .expect("run confine");
        assert_eq!(output.status.code(), Some(exit_codes::REJECTED), "{target}");
        assert!(output.stdout.is_empty());
        assert!(!output.stderr.is_empty());
    }
}

#[test]
fn confine_defaults_to_workspace_env() {
    let temp = tempfile::tempdir().expect("tempdir");
    let output = bin()
        .env("WORKSPACE_DIR", temp.path())
        .args(["confine", "repo"])
        .output()
        .expect("run confine");
    assert_eq!(output.status.code(), Some(exit_codes::OK));
    let printed = String::from_utf8_lossy(&output.stdout);
    assert!(printed.trim().ends_with("repo"));
    assert!(printed.trim().starts_with(&*temp.path().to_string_lossy()));
}

#[test]
fn parse_repo_prints_owner_and_name() {
    let output = bin()
        .args(["parse-repo", "git@github.com:owner/repo.git"])
        .output()
        .expect("run parse-repo");
    assert_eq!(output.status.code(), Some(exit_codes::OK));
    assert_eq!(String::from_utf8_lossy(&output.stdout).trim(), "owner/repo");
}

#[test]
fn parse_repo_json_includes_clone_url() {
    let output = bin()
        .args(["parse-repo", "--json", "owner/repo"])
        .output()
        .expect("run parse-repo");
    let value: serde_json::Value = serde_json::from_slice(&output.stdout).expect("json");
    assert_eq!(value["shape"], "bare");
    assert_eq!(value["clone_url"], "https://github.com/owner/repo.git");
}

#[test]
fn parse_repo_rejects_foreign_host() {
    let output = bin()
        .args(["parse-repo", "https://gitlab.com/owner/repo"])
        .output()
        .expect("run parse-repo");
    assert_eq!(output.status.code(), Some(exit_codes::REJECTED));
}

#[test]
fn tools_lists_nine_definitions() {
    let output = bin().arg("tools").output().expect("run tools");
    assert_eq!(output.status.code(), Some(exit_codes::OK));
    let value: serde_json::Value = serde_json::from_slice(&output.stdout).expect("json");
    assert_eq!(value["tools"].as_array().expect("tools").len(), 9);
}

#[test]
fn invalid_config_exits_with_invalid() {
    let temp = tempfile::tempdir().expect("tempdir");
    let config = temp.path().join("tools.toml");
    std::fs::write(&config, "git_timeout_secs = 0\n").expect("write config");
    let output = bin()
        .args(["confine", "repo", "--config"])
        .arg(&config)
        .output()
        .expect("run confine");
    assert_eq!(output.status.code(), Some(exit_codes::INVALID));
}
