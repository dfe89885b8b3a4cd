//! Smoke tests -- verify the binary runs and every subcommand is wired up.

use assert_cmd::Command;
use predicates::prelude::*;

#[test]
fn test_cli_help() {
    Command::cargo_bin("benchpack")
        .unwrap()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicates::str::contains("Quick performance probes"));
}

#[test]
fn test_cli_version() {
    Command::cargo_bin("benchpack")
        .unwrap()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicates::str::contains("benchpack"));
}

#[test]
fn test_subcommands_exist() {
    for sub in ["menu", "speed", "video", "disk", "render", "all", "providers"] {
        Command::cargo_bin("benchpack")
            .unwrap()
            .args([sub, "--help"])
            .assert()
            .success();
    }
}

#[test]
fn test_unknown_provider_is_rejected() {
    Command::cargo_bin("benchpack")
        .unwrap()
        .args(["speed", "--provider", "carrier-pigeon"])
        .assert()
        .failure()
        .stderr(predicates::str::contains("unknown speed test provider"));
}

#[test]
fn test_providers_lists_native_provider() {
    Command::cargo_bin("benchpack")
        .unwrap()
        .arg("providers")
        .assert()
        .success()
        .stdout(predicates::str::contains("cloudflare").and(predicates::str::contains("ookla-cli")));
}

#[test]
fn test_menu_quits_on_q() {
    Command::cargo_bin("benchpack")
        .unwrap()
        .arg("menu")
        .write_stdin("q\n")
        .assert()
        .success()
        .stdout(predicates::str::contains("Benchmark Pack"))
        .stdout(predicates::str::contains("4) OpenGL FPS"));
}

#[test]
fn test_disk_subcommand_plain_output() {
    let dir = tempfile::tempdir().unwrap();
    Command::cargo_bin("benchpack")
        .unwrap()
        .args(["disk", "--plain", "--size-mb", "2", "--dir"])
        .arg(dir.path())
        .assert()
        .success()
        .stdout(predicates::str::contains("Write test (2 MB):"))
        .stdout(predicates::str::contains("Read time:"));
}

#[test]
fn test_failing_probe_exits_nonzero_with_error_text() {
    let dir = tempfile::tempdir().unwrap();
    Command::cargo_bin("benchpack")
        .unwrap()
        .args(["disk", "--plain", "--size-mb", "1", "--dir"])
        .arg(dir.path().join("missing"))
        .assert()
        .failure()
        .stdout(predicates::str::starts_with("Error: "));
}

#[test]
fn test_json_output() {
    let dir = tempfile::tempdir().unwrap();
    let output = Command::cargo_bin("benchpack")
        .unwrap()
        .args(["disk", "--json", "--size-mb", "1", "--dir"])
        .arg(dir.path())
        .output()
        .unwrap();
    assert!(output.status.success());
    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["status"], "success");
    assert_eq!(json["report"]["kind"], "disk");
    assert_eq!(json["report"]["metrics"]["size_mb"], 1.0);
}
