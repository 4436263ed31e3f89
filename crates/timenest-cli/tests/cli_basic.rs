//! Basic CLI E2E tests.
//!
//! Each test runs the built binary against its own temporary home directory,
//! so config and database files never touch the real profile.

use std::process::Command;

use tempfile::TempDir;

/// Run a CLI command and return (stdout, stderr, exit code).
fn run_cli(home: &TempDir, args: &[&str]) -> (String, String, i32) {
    let output = Command::new(env!("CARGO_BIN_EXE_timenest"))
        .args(args)
        .env("HOME", home.path())
        .env_remove("TIMENEST_ENV")
        .env_remove("TIMENEST_PROFILE")
        .env_remove("TIMENEST_TOKEN")
        .output()
        .expect("Failed to execute CLI command");

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    let code = output.status.code().unwrap_or(-1);

    (stdout, stderr, code)
}

fn run_ok(home: &TempDir, args: &[&str]) -> String {
    let (stdout, stderr, code) = run_cli(home, args);
    assert_eq!(code, 0, "{args:?} failed: {stderr}");
    stdout
}

fn json(stdout: &str) -> serde_json::Value {
    serde_json::from_str(stdout).expect("stdout should be JSON")
}

#[test]
fn focus_tools_lists_catalog() {
    let home = TempDir::new().unwrap();
    let tools = json(&run_ok(&home, &["focus", "tools"]));
    let ids: Vec<&str> = tools
        .as_array()
        .unwrap()
        .iter()
        .map(|t| t["id"].as_str().unwrap())
        .collect();
    assert_eq!(ids, ["pomodoro", "deep-focus", "break-reminders", "ambient-sounds"]);
    assert_eq!(tools[0]["default_duration_minutes"], 25);
}

#[test]
fn config_defaults_and_updates() {
    let home = TempDir::new().unwrap();
    assert_eq!(run_ok(&home, &["config", "get", "reminders.poll_interval_secs"]).trim(), "30");
    assert!(home.path().join(".config/timenest/config.toml").exists());

    run_ok(&home, &["config", "set", "reminders.poll_interval_secs", "60"]);
    assert_eq!(run_ok(&home, &["config", "get", "reminders.poll_interval_secs"]).trim(), "60");

    let listing = run_ok(&home, &["config", "list"]);
    assert!(listing.contains("task_store.base_url = http://127.0.0.1:5000/api"));

    run_ok(&home, &["config", "reset"]);
    assert_eq!(run_ok(&home, &["config", "get", "reminders.poll_interval_secs"]).trim(), "30");
}

#[test]
fn config_rejects_bad_input() {
    let home = TempDir::new().unwrap();

    let (_, stderr, code) = run_cli(&home, &["config", "get", "reminders.nope"]);
    assert_eq!(code, 1);
    assert!(stderr.contains("unknown key"));

    let (_, _, code) = run_cli(&home, &["config", "set", "reminders.poll_interval_secs", "soon"]);
    assert_eq!(code, 1);
}

#[test]
fn focus_session_lifecycle() {
    let home = TempDir::new().unwrap();

    let started = json(&run_ok(&home, &["focus", "start", "pomodoro"]));
    assert_eq!(started["type"], "focus_started");

    let status = json(&run_ok(&home, &["focus", "status"]));
    assert_eq!(status["running"]["tool_id"], "pomodoro");

    let paused = json(&run_ok(&home, &["focus", "pause", "pomodoro"]));
    assert_eq!(paused["type"], "focus_paused");

    // Short sessions still bank one minute.
    let stopped = json(&run_ok(&home, &["focus", "stop", "pomodoro"]));
    assert_eq!(stopped["type"], "focus_completed");
    assert_eq!(stopped["minutes"], 1);

    let status = json(&run_ok(&home, &["focus", "status"]));
    assert_eq!(status["today_minutes"], 1);
    assert!(status["running"].is_null());
}

#[test]
fn unknown_focus_tool_fails() {
    let home = TempDir::new().unwrap();
    let (_, stderr, code) = run_cli(&home, &["focus", "start", "juggling"]);
    assert_eq!(code, 1);
    assert!(stderr.contains("juggling"));
}
