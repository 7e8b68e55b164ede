//! Integration tests for the `powerscore` binary.
//!
//! Argument parsing, offline calculation, config handling and error
//! exit codes, all without a live analysis backend.
#![allow(clippy::unwrap_used)]

use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;

// ── Helpers ─────────────────────────────────────────────────────────

/// Build a command with env isolation: no `POWERSCORE_*` variables and
/// config/cache directories pointed at a nonexistent path.
fn powerscore_cmd() -> assert_cmd::Command {
    let mut cmd = cargo_bin_cmd!("powerscore");
    cmd.env("HOME", "/tmp/powerscore-cli-test-nonexistent")
        .env("XDG_CONFIG_HOME", "/tmp/powerscore-cli-test-nonexistent")
        .env("XDG_CACHE_HOME", "/tmp/powerscore-cli-test-nonexistent")
        .env_remove("POWERSCORE_CONFIG")
        .env_remove("POWERSCORE_ENV")
        .env_remove("POWERSCORE_BASE_URL")
        .env_remove("POWERSCORE_OUTPUT")
        .env_remove("POWERSCORE_TIMEOUT")
        .env_remove("RUST_LOG");
    cmd
}

fn combined_output(output: &std::process::Output) -> String {
    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);
    format!("{stdout}{stderr}")
}

// ── Basic invocation ────────────────────────────────────────────────

#[test]
fn test_no_args_shows_help() {
    let output = powerscore_cmd().output().unwrap();
    assert_eq!(output.status.code(), Some(2));
    assert!(combined_output(&output).contains("Usage"));
}

#[test]
fn test_help_flag() {
    powerscore_cmd().arg("--help").assert().success().stdout(
        predicate::str::contains("analyze")
            .and(predicate::str::contains("calculate"))
            .and(predicate::str::contains("config")),
    );
}

#[test]
fn test_version_flag() {
    powerscore_cmd()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("powerscore"));
}

#[test]
fn test_completions() {
    powerscore_cmd()
        .args(["completions", "zsh"])
        .assert()
        .success()
        .stdout(predicate::str::contains("#compdef"));
    powerscore_cmd()
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::is_empty().not());
}

// ── Calculate ───────────────────────────────────────────────────────

#[test]
fn test_calculate_json() {
    let output = powerscore_cmd()
        .args(["calculate", "-o", "json", "--layouts", "10", "--blocks", "20", "--commerce"])
        .output()
        .unwrap();
    assert!(output.status.success(), "{}", combined_output(&output));

    let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(report["codeComplexity"], 30.0);
    assert_eq!(report["pages"], 1);
    assert_eq!(report["trafficRank"], 5_000_000);
    assert_eq!(report["cdn"]["id"], "unknown");
    assert!(report["errors"].as_object().unwrap().is_empty());
}

#[test]
fn test_calculate_plain_prints_overall() {
    powerscore_cmd()
        .args(["calculate", "-o", "plain", "--query", "#layouts=10&blocks=20&commerce=true"])
        .assert()
        .success()
        .stdout(predicate::str::diff("33\n"));
}

#[test]
fn test_calculate_table() {
    powerscore_cmd()
        .args(["calculate", "--color", "never", "--cdn", "akamai"])
        .assert()
        .success()
        .stdout(
            predicate::str::contains("Power score:")
                .and(predicate::str::contains("Akamai"))
                .and(predicate::str::contains("Site complexity")),
        );
}

#[test]
fn test_calculate_bad_query_is_usage_error() {
    powerscore_cmd()
        .args(["calculate", "--query", "pages=lots"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("pages"));
}

// ── Config ──────────────────────────────────────────────────────────

#[test]
fn test_config_show_without_file() {
    powerscore_cmd()
        .args(["config", "show", "-o", "json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"target_url_count\": 50"));
}

#[test]
fn test_config_init_then_show() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.toml");
    let path_arg = path.to_str().unwrap();

    powerscore_cmd()
        .args(["config", "init", "--config", path_arg])
        .assert()
        .success();
    assert!(path.exists());

    powerscore_cmd()
        .args(["config", "init", "--config", path_arg])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("already exists"));

    powerscore_cmd()
        .args(["config", "path", "--config", path_arg])
        .assert()
        .success()
        .stdout(predicate::str::contains("config.toml"));

    powerscore_cmd()
        .args(["config", "show", "--config", path_arg])
        .assert()
        .success()
        .stdout(predicate::str::contains("[polling.sitemap]"));
}

// ── Error cases ─────────────────────────────────────────────────────

#[test]
fn test_invalid_output_format() {
    let output = powerscore_cmd()
        .args(["--output", "invalid", "calculate"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(2));
    assert!(combined_output(&output).contains("possible values"));
}

#[test]
fn test_analyze_rejects_bad_url() {
    powerscore_cmd()
        .args(["analyze", "http://"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("url"));
}

#[test]
fn test_analyze_unreachable_backend_reports_failures() {
    powerscore_cmd()
        .args([
            "analyze",
            "www.example.com",
            "--no-cache",
            "-q",
            "--base-url",
            "http://127.0.0.1:9/api/v1/web/powerscore",
        ])
        .timeout(std::time::Duration::from_secs(60))
        .assert()
        .code(9)
        .stderr(predicate::str::contains("setup"));
}
