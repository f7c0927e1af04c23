use std::path::Path;

use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::Value;
use tempfile::{tempdir, TempDir};

const ROLES: &str = r#"
[[roles]]
id = "default"
auto_assign = true

[[roles.data.cooldowns]]
command = "heal"
cooldown = "1h"
"#;

fn workspace() -> TempDir {
    let dir = tempdir().unwrap();
    std::fs::write(dir.path().join("roles.toml"), ROLES).unwrap();
    dir
}

fn cooldowns(root: &Path) -> Command {
    let mut cmd = Command::cargo_bin("cooldowns").unwrap();
    cmd.env("HOME", root)
        .env("XDG_CONFIG_HOME", root.join(".config"))
        .env_remove("COOLDOWNS_CONFIG")
        .env_remove("COOLDOWNS_PERSISTENCE_ENABLED")
        .env_remove("COOLDOWNS_PERSISTENCE_DIR")
        .env_remove("COOLDOWNS_ROLES_FILE")
        .env_remove("RUST_LOG")
        .arg("--root")
        .arg(root);
    cmd
}

#[test]
fn test_cli_help() {
    let mut cmd = Command::cargo_bin("cooldowns").unwrap();
    cmd.arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Usage:"));
}

#[test]
fn test_cli_version() {
    let mut cmd = Command::cargo_bin("cooldowns").unwrap();
    cmd.arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn test_parse_robot() {
    let dir = tempdir().unwrap();
    let output = cooldowns(dir.path())
        .args(["--robot", "parse", "1h30m"])
        .output()
        .unwrap();
    assert!(output.status.success());
    let json: Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["status"], "ok");
    assert_eq!(json["data"]["seconds"], 5400);
}

#[test]
fn test_parse_invalid_duration_fails() {
    let dir = tempdir().unwrap();
    cooldowns(dir.path())
        .args(["parse", "bogus"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid duration format"));
}

#[test]
fn test_check_record_then_blocked() {
    let dir = workspace();

    cooldowns(dir.path())
        .args(["check", "--actor", "player.1", "--command", "heal", "--record"])
        .assert()
        .success()
        .stdout(predicate::str::contains("ready"));

    cooldowns(dir.path())
        .args(["check", "--actor", "player.1", "--command", "HEAL"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("You must wait"));

    let output = cooldowns(dir.path())
        .args(["--robot", "check", "--actor", "player.1", "--command", "heal"])
        .output()
        .unwrap();
    assert!(!output.status.success());
    let json: Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["status"]["error"]["code"], "COOLDOWN_ACTIVE");
    assert_eq!(json["status"]["error"]["numeric_code"], 201);
}

#[test]
fn test_check_without_record_consumes_nothing() {
    let dir = workspace();
    for _ in 0..2 {
        cooldowns(dir.path())
            .args(["check", "--actor", "player.1", "--command", "heal"])
            .assert()
            .success();
    }
}

#[test]
fn test_records_lists_recorded_commands() {
    let dir = workspace();
    cooldowns(dir.path())
        .args(["record", "--actor", "player.1", "--command", "kit"])
        .assert()
        .success();

    let output = cooldowns(dir.path())
        .args(["--robot", "records", "--actor", "player.1"])
        .output()
        .unwrap();
    assert!(output.status.success());
    let json: Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["data"]["records"][0]["command"], "kit");
    assert!(dir.path().join("records/player.1.yaml").exists());
}

#[test]
fn test_disabled_persistence_forgets_between_runs() {
    let dir = workspace();
    for _ in 0..2 {
        cooldowns(dir.path())
            .env("COOLDOWNS_PERSISTENCE_ENABLED", "false")
            .args(["check", "--actor", "player.1", "--command", "heal", "--record"])
            .assert()
            .success();
    }
    assert!(!dir.path().join("records").exists());
}

#[test]
fn test_resolve_reports_winning_role() {
    let dir = workspace();
    let output = cooldowns(dir.path())
        .args(["--robot", "resolve", "--actor", "player.1", "--command", "heal"])
        .output()
        .unwrap();
    assert!(output.status.success());
    let json: Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["data"]["cooldown"]["seconds"], 3600);
    assert_eq!(json["data"]["cooldown"]["role"], "default");
    assert_eq!(json["data"]["exempt"], false);
}

#[test]
fn test_console_is_exempt() {
    let dir = workspace();
    for _ in 0..2 {
        cooldowns(dir.path())
            .args(["check", "--actor", "console.console", "--command", "heal", "--record"])
            .assert()
            .success();
    }
}

#[test]
fn test_project_config_overrides_messages() {
    let dir = workspace();
    std::fs::write(
        dir.path().join("config.toml"),
        "[messages]\ncooldown = \"Hold on, {seconds} seconds left\"\n",
    )
    .unwrap();

    cooldowns(dir.path())
        .args(["record", "--actor", "player.1", "--command", "heal"])
        .assert()
        .success();
    cooldowns(dir.path())
        .args(["check", "--actor", "player.1", "--command", "heal"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Hold on,"));
}

#[test]
fn test_invalid_actor_is_rejected() {
    let dir = workspace();
    cooldowns(dir.path())
        .args(["check", "--actor", "nobody", "--command", "heal"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("kind"));
}
