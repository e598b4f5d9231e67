//! Basic CLI E2E tests.
//!
//! Each test runs the built binary against its own data directory.

use std::path::Path;
use std::process::Command;

/// Run a CLI command and return (stdout, stderr, exit code).
fn run_cli(data_dir: &Path, args: &[&str]) -> (String, String, i32) {
    let output = Command::new(env!("CARGO_BIN_EXE_balance"))
        .args(args)
        .env("BALANCE_DATA_DIR", data_dir)
        .env_remove("RUST_LOG")
        .output()
        .expect("Failed to execute CLI command");

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    let code = output.status.code().unwrap_or(-1);

    (stdout, stderr, code)
}

fn run_ok(data_dir: &Path, args: &[&str]) -> String {
    let (stdout, stderr, code) = run_cli(data_dir, args);
    assert_eq!(code, 0, "{args:?} failed: {stderr}");
    stdout
}

fn json(stdout: &str) -> serde_json::Value {
    serde_json::from_str(stdout).expect("Failed to parse JSON output")
}

#[test]
fn test_fresh_install_is_not_onboarded() {
    let dir = tempfile::tempdir().unwrap();
    let status = json(&run_ok(dir.path(), &["status", "--json"]));
    assert_eq!(status["onboarding_completed"], false);
    assert!(dir.path().join("balance.db").exists());
}

#[test]
fn test_onboard_then_status() {
    let dir = tempfile::tempdir().unwrap();
    run_ok(
        dir.path(),
        &["onboard", "--track", "water,meditation", "--goal", "Read:60"],
    );

    let status = json(&run_ok(dir.path(), &["status", "--json"]));
    assert_eq!(status["onboarding_completed"], true);
    assert_eq!(status["metrics"].as_array().unwrap().len(), 2);
    assert_eq!(status["custom_goals"][0]["name"], "Read");
    assert_eq!(status["custom_goals"][0]["target"], 60);

    let again = run_ok(dir.path(), &["onboard"]);
    assert!(again.contains("already completed"));
}

#[test]
fn test_onboard_with_bad_goal_changes_nothing() {
    let dir = tempfile::tempdir().unwrap();
    for bad in [
        ["onboard", "--track", "water", "--goal", "Read:60", "--goal", "Bad:0"],
        ["onboard", "--track", "water", "--goal", "Read:60", "--check-goal", "  "],
    ] {
        let (_, stderr, code) = run_cli(dir.path(), &bad);
        assert_eq!(code, 1);
        assert!(stderr.contains("error: "));
    }

    let status = json(&run_ok(dir.path(), &["status", "--json"]));
    assert_eq!(status["onboarding_completed"], false);
    assert!(status["metrics"].as_array().unwrap().is_empty());
    assert!(status["custom_goals"].as_array().unwrap().is_empty());

    run_ok(dir.path(), &["onboard", "--track", "water", "--goal", "Read:60"]);
    let goals = json(&run_ok(dir.path(), &["goal", "list", "--json"]));
    assert_eq!(goals.as_array().unwrap().len(), 1);
}

#[test]
fn test_metric_tap_updates_value_and_streak() {
    let dir = tempfile::tempdir().unwrap();
    run_ok(dir.path(), &["metric", "tap", "water"]);

    let streak = json(&run_ok(dir.path(), &["streak", "show", "water", "--json"]));
    assert_eq!(streak["current"], 1);
    assert_eq!(streak["longest"], 1);

    let metrics = json(&run_ok(dir.path(), &["metric", "list", "--json"]));
    let water = metrics
        .as_array()
        .unwrap()
        .iter()
        .find(|m| m["metric"] == "water")
        .unwrap();
    assert_eq!(water["value"], 4);
}

#[test]
fn test_streak_record_and_reset() {
    let dir = tempfile::tempdir().unwrap();
    for _ in 0..3 {
        run_ok(dir.path(), &["streak", "record", "meditation"]);
    }
    run_ok(dir.path(), &["streak", "record", "meditation", "--missed"]);

    let streak = json(&run_ok(dir.path(), &["streak", "show", "meditation", "--json"]));
    assert_eq!(streak["current"], 0);
    assert_eq!(streak["longest"], 3);
}

#[test]
fn test_custom_goal_lifecycle() {
    let dir = tempfile::tempdir().unwrap();
    run_ok(dir.path(), &["goal", "add", "Stretch", "--checkable"]);

    let goals = json(&run_ok(dir.path(), &["goal", "list", "--json"]));
    let id = goals[0]["id"].as_str().unwrap().to_string();
    assert_eq!(goals[0]["progress"], 0);

    run_ok(dir.path(), &["goal", "tap", &id]);
    let goals = json(&run_ok(dir.path(), &["goal", "list", "--json"]));
    assert_eq!(goals[0]["progress"], 1);

    run_ok(dir.path(), &["goal", "delete", &id]);
    let goals = json(&run_ok(dir.path(), &["goal", "list", "--json"]));
    assert!(goals.as_array().unwrap().is_empty());

    let (_, stderr, code) = run_cli(dir.path(), &["goal", "delete", &id]);
    assert_eq!(code, 1);
    assert!(stderr.contains("error:"));
}

#[test]
fn test_blank_goal_name_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let (_, stderr, code) = run_cli(dir.path(), &["goal", "add", "   ", "--target", "5"]);
    assert_eq!(code, 1);
    assert!(stderr.contains("error: "));
}

#[test]
fn test_unknown_metric_fails() {
    let dir = tempfile::tempdir().unwrap();
    let (_, _, code) = run_cli(dir.path(), &["metric", "tap", "waterIntake"]);
    assert_ne!(code, 0);
}

#[test]
fn test_config_set_and_get() {
    let dir = tempfile::tempdir().unwrap();
    run_ok(dir.path(), &["config", "set", "targets.water", "8"]);
    let value = run_ok(dir.path(), &["config", "get", "targets.water"]);
    assert_eq!(value.trim(), "8");

    let (_, stderr, code) = run_cli(dir.path(), &["config", "get", "targets.nope"]);
    assert_eq!(code, 1);
    assert!(stderr.contains("unknown config key"));
}

#[test]
fn test_reset_requires_confirmation() {
    let dir = tempfile::tempdir().unwrap();
    run_ok(dir.path(), &["onboard"]);

    let (_, _, code) = run_cli(dir.path(), &["reset"]);
    assert_eq!(code, 1);

    run_ok(dir.path(), &["reset", "--yes"]);
    let status = json(&run_ok(dir.path(), &["status", "--json"]));
    assert_eq!(status["onboarding_completed"], false);
}

#[test]
fn test_timer_counts_one_period() {
    let dir = tempfile::tempdir().unwrap();
    run_ok(dir.path(), &["config", "set", "timer.tick_seconds", "1"]);
    run_ok(dir.path(), &["timer", "run", "stretching", "--periods", "1"]);

    let metrics = json(&run_ok(dir.path(), &["metric", "list", "--json"]));
    let stretching = metrics
        .as_array()
        .unwrap()
        .iter()
        .find(|m| m["metric"] == "stretching")
        .unwrap();
    assert_eq!(stretching["value"], 1);
}

#[test]
fn test_timer_rejects_untimed_metric() {
    let dir = tempfile::tempdir().unwrap();
    let (_, stderr, code) = run_cli(dir.path(), &["timer", "run", "water"]);
    assert_eq!(code, 1);
    assert!(stderr.contains("not a timed activity"));
}

#[test]
fn test_health_without_provider_is_unavailable() {
    let dir = tempfile::tempdir().unwrap();
    let snapshot = json(&run_ok(dir.path(), &["health", "--json"]));
    assert!(snapshot["steps"].is_null());
}
