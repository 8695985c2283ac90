//! CLI tests for cross-profiles: offline paths only.

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn cross_profiles(config_path: &str) -> Command {
    let mut cmd = Command::cargo_bin("cross-profiles").unwrap();
    cmd.env("CROSSPOST_CONFIG", config_path)
        .env_remove("CROSSPOST_API_KEY");
    cmd
}

#[test]
fn test_help_lists_subcommands() {
    let mut cmd = Command::cargo_bin("cross-profiles").unwrap();
    cmd.arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("list"))
        .stdout(predicate::str::contains("create"))
        .stdout(predicate::str::contains("delete"));
}

#[test]
fn test_missing_api_key_exits_1() {
    let dir = TempDir::new().unwrap();
    let absent = dir.path().join("absent.toml");
    cross_profiles(&absent.to_string_lossy())
        .arg("list")
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("api.key"));
}

#[test]
fn test_create_requires_title() {
    let dir = TempDir::new().unwrap();
    let absent = dir.path().join("absent.toml");
    cross_profiles(&absent.to_string_lossy())
        .arg("create")
        .assert()
        .failure()
        .stderr(predicate::str::contains("TITLE"));
}
