use assert_cmd::Command;
use predicates::prelude::*;

#[test]
fn test_help_output() {
    let mut cmd = Command::cargo_bin("mcpsync").unwrap();
    cmd.arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "MCP Configuration Synchronization Tool",
        ))
        .stdout(predicate::str::contains("sync"))
        .stdout(predicate::str::contains("validate"))
        .stdout(predicate::str::contains("apps"))
        .stdout(predicate::str::contains("watch"));
}

#[test]
fn test_version_output() {
    let mut cmd = Command::cargo_bin("mcpsync").unwrap();
    cmd.arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("0.1.0"));
}

#[test]
fn test_apps_command_succeeds() {
    // Succeeds whether or not any application is installed.
    let mut cmd = Command::cargo_bin("mcpsync").unwrap();
    cmd.arg("apps").assert().success();
}

#[test]
fn test_sync_from_missing_source_fails() {
    // Fails either because no applications are installed or because the
    // source path does not exist.
    let mut cmd = Command::cargo_bin("mcpsync").unwrap();
    cmd.args(["sync", "/nonexistent/mcp-config.json"])
        .assert()
        .failure();
}

#[test]
fn test_validate_against_missing_source_fails() {
    let mut cmd = Command::cargo_bin("mcpsync").unwrap();
    cmd.args(["validate", "--source", "/nonexistent/mcp-config.json"])
        .assert()
        .failure();
}

#[test]
fn test_sync_requires_source_argument() {
    let mut cmd = Command::cargo_bin("mcpsync").unwrap();
    cmd.arg("sync")
        .assert()
        .failure()
        .stderr(predicate::str::contains("required"));
}

#[test]
fn test_unknown_subcommand() {
    let mut cmd = Command::cargo_bin("mcpsync").unwrap();
    cmd.arg("unknown")
        .assert()
        .failure()
        .stderr(predicate::str::contains("unrecognized subcommand"));
}

#[test]
fn test_no_subcommand() {
    let mut cmd = Command::cargo_bin("mcpsync").unwrap();
    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("Usage"));
}

#[test]
fn test_watch_rejects_non_numeric_debounce() {
    let mut cmd = Command::cargo_bin("mcpsync").unwrap();
    cmd.args(["watch", "--debounce", "soon"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid value"));
}

#[test]
fn test_help_for_subcommands() {
    for subcommand in &["sync", "validate", "apps", "watch"] {
        let mut cmd = Command::cargo_bin("mcpsync").unwrap();
        cmd.args([*subcommand, "--help"])
            .assert()
            .success()
            .stdout(predicate::str::contains("Usage"));
    }
}
