//! Basic CLI E2E tests.
//!
//! Tests invoke CLI commands via cargo run against the dev data directory
//! and verify exit codes and output shape.

use std::process::Command;

/// Run a CLI command against the dev data dir and return output.
fn run_cli(args: &[&str]) -> (String, String, i32) {
    let output = Command::new("cargo")
        .args(["run", "-p", "thinkfirst-cli", "--"])
        .args(args)
        .env("THINKFIRST_ENV", "dev")
        .output()
        .expect("Failed to execute CLI command");

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    let code = output.status.code().unwrap_or(-1);

    (stdout, stderr, code)
}

#[test]
fn test_stats_summary() {
    let (stdout, _, code) = run_cli(&["stats", "summary"]);
    assert_eq!(code, 0, "stats summary failed");
    let parsed: serde_json::Value = serde_json::from_str(&stdout).expect("summary is JSON");
    assert!(parsed["today"].is_number());
    assert!(parsed["week"].is_number());
}

#[test]
fn test_mode_set_and_get() {
    let (_, _, code) = run_cli(&["mode", "set", "relaxed"]);
    assert_eq!(code, 0, "mode set failed");

    let (stdout, _, code) = run_cli(&["mode", "get"]);
    assert_eq!(code, 0, "mode get failed");
    assert!(stdout.contains("relaxed") || stdout.contains("normal") || stdout.contains("strict"));
}

#[test]
fn test_mode_set_rejects_unknown_mode() {
    let (_, stderr, code) = run_cli(&["mode", "set", "chaotic"]);
    assert_ne!(code, 0, "unknown mode should fail");
    assert!(stderr.contains("unknown mode"));
}

#[test]
fn test_goal_set() {
    let (stdout, _, code) = run_cli(&["goal", "set", "7"]);
    assert_eq!(code, 0, "goal set failed");
    assert!(stdout.contains("7"));
}

#[test]
fn test_points_show() {
    let (stdout, _, code) = run_cli(&["points", "show"]);
    assert_eq!(code, 0, "points show failed");
    let parsed: serde_json::Value = serde_json::from_str(&stdout).expect("points is JSON");
    assert!(parsed["level"].is_number());
}

#[test]
fn test_reset_all() {
    let (stdout, _, code) = run_cli(&["reset", "all"]);
    assert_eq!(code, 0, "reset all failed");
    let parsed: serde_json::Value = serde_json::from_str(&stdout).expect("reset output is JSON");
    assert_eq!(parsed["today"], 0);
    assert_eq!(parsed["thinking_points"], 0);
}

#[test]
fn test_config_path() {
    let (stdout, _, code) = run_cli(&["config", "path"]);
    assert_eq!(code, 0, "config path failed");
    assert!(stdout.contains("thinkfirst-dev"));
}
