//! Basic CLI E2E tests.
//!
//! Tests invoke the built binary against a throwaway data directory and
//! verify its JSON output.

use std::io::Write;
use std::path::Path;
use std::process::{Command, Stdio};

/// Run a CLI command and return (stdout, stderr, exit code).
fn run_cli(data_dir: &Path, args: &[&str]) -> (String, String, i32) {
    let output = Command::new(env!("CARGO_BIN_EXE_studybuddy"))
        .args(args)
        .env("STUDYBUDDY_DATA_DIR", data_dir)
        .env("STUDYBUDDY_LOG", "warn")
        .output()
        .expect("Failed to execute CLI command");

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    let code = output.status.code().unwrap_or(-1);

    (stdout, stderr, code)
}

fn run_json(data_dir: &Path, args: &[&str]) -> serde_json::Value {
    let (stdout, stderr, code) = run_cli(data_dir, args);
    assert_eq!(code, 0, "{args:?} failed: {stderr}");
    serde_json::from_str(&stdout).expect("Failed to parse JSON output")
}

#[test]
fn test_status_on_fresh_install() {
    let dir = tempfile::tempdir().unwrap();
    let status = run_json(dir.path(), &["timer", "status"]);
    assert_eq!(status["timerState"]["running"], false);
    assert_eq!(status["timerState"]["mode"], "focus");
    assert_eq!(status["timerState"]["timeRemainingSeconds"], 1500);
    assert_eq!(status["stats"]["sessionsToday"], 0);
    assert!(dir.path().join("studybuddy.db").exists());
    assert!(dir.path().join("config.toml").exists());
}

#[test]
fn test_start_pause_persists_between_runs() {
    let dir = tempfile::tempdir().unwrap();
    let started = run_json(dir.path(), &["timer", "start"]);
    assert_eq!(started["running"], true);
    assert!(started["endEpochMs"].is_u64());

    let paused = run_json(dir.path(), &["timer", "pause"]);
    assert_eq!(paused["running"], false);
    assert!(paused["endEpochMs"].is_null());
    let remaining = paused["timeRemainingSeconds"].as_u64().unwrap();
    assert!(remaining <= 1500 && remaining >= 1490);
}

#[test]
fn test_skip_and_preset() {
    let dir = tempfile::tempdir().unwrap();
    let skipped = run_json(dir.path(), &["timer", "skip"]);
    assert_eq!(skipped["mode"], "break");
    assert_eq!(skipped["timeRemainingSeconds"], 300);

    let preset = run_json(dir.path(), &["timer", "preset", "ninety-twenty"]);
    assert_eq!(preset["mode"], "focus");
    assert_eq!(preset["activePresetId"], "ninety-twenty");
    assert_eq!(preset["timeRemainingSeconds"], 5400);
}

#[test]
fn test_unknown_preset_fails() {
    let dir = tempfile::tempdir().unwrap();
    let (_, stderr, code) = run_cli(dir.path(), &["timer", "preset", "marathon"]);
    assert_eq!(code, 1);
    assert!(stderr.contains("error:"));
    assert!(stderr.contains("marathon"));
}

#[test]
fn test_custom_preset_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    run_json(
        dir.path(),
        &["timer", "custom", "--focus-min", "1", "--focus-sec", "30", "--break-min", "0", "--break-sec", "30"],
    );
    let selected = run_json(dir.path(), &["timer", "preset", "custom"]);
    assert_eq!(selected["timeRemainingSeconds"], 90);

    let presets = run_json(dir.path(), &["timer", "presets"]);
    let custom = presets
        .as_array()
        .unwrap()
        .iter()
        .find(|p| p["id"] == "custom")
        .unwrap();
    assert_eq!(custom["focus"], "1:30");
    assert_eq!(custom["break"], "0:30");
    assert_eq!(custom["active"], true);
}

#[test]
fn test_prefs_validation() {
    let dir = tempfile::tempdir().unwrap();
    let prefs = run_json(dir.path(), &["prefs", "goal", "200"]);
    assert_eq!(prefs["dailyGoalMinutes"], 200);

    let (_, _, code) = run_cli(dir.path(), &["prefs", "goal", "5"]);
    assert_eq!(code, 1);
    let (_, _, code) = run_cli(dir.path(), &["prefs", "volume", "2"]);
    assert_eq!(code, 1);

    let prefs = run_json(dir.path(), &["prefs", "dark-mode", "true"]);
    assert_eq!(prefs["darkMode"], true);
    assert_eq!(prefs["dailyGoalMinutes"], 200);
}

#[test]
fn test_stats_reports_goal_progress() {
    let dir = tempfile::tempdir().unwrap();
    let stats = run_json(dir.path(), &["stats"]);
    assert_eq!(stats["dailyGoal"], 120);
    assert_eq!(stats["goalProgressPercent"], 0);
    assert_eq!(stats["currentStreak"], 0);
}

#[test]
fn test_config_get_set() {
    let dir = tempfile::tempdir().unwrap();
    let (stdout, _, code) = run_cli(dir.path(), &["config", "get", "ui.popup_width"]);
    assert_eq!(code, 0);
    assert_eq!(stdout.trim(), "370");

    let (_, _, code) = run_cli(dir.path(), &["config", "set", "timer.final_countdown_secs", "3"]);
    assert_eq!(code, 0);
    let (stdout, _, _) = run_cli(dir.path(), &["config", "get", "timer.final_countdown_secs"]);
    assert_eq!(stdout.trim(), "3");

    let (_, stderr, code) = run_cli(dir.path(), &["config", "get", "no.such.key"]);
    assert_eq!(code, 1);
    assert!(stderr.contains("unknown key"));
}

#[test]
fn test_serve_answers_commands_over_stdio() {
    let dir = tempfile::tempdir().unwrap();
    let mut child = Command::new(env!("CARGO_BIN_EXE_studybuddy"))
        .arg("serve")
        .env("STUDYBUDDY_DATA_DIR", dir.path())
        .env("STUDYBUDDY_LOG", "warn")
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .spawn()
        .expect("Failed to spawn serve");

    {
        let stdin = child.stdin.as_mut().unwrap();
        writeln!(stdin, r#"{{"action":"startTimer"}}"#).unwrap();
        writeln!(stdin, r#"{{"action":"selectPreset"}}"#).unwrap();
        writeln!(stdin, "not json").unwrap();
        writeln!(stdin, r#"{{"action":"getTimerState"}}"#).unwrap();
    }
    // Closing stdin ends the process.
    drop(child.stdin.take());
    let output = child.wait_with_output().unwrap();
    assert!(output.status.success());

    let lines: Vec<serde_json::Value> = String::from_utf8_lossy(&output.stdout)
        .lines()
        .map(|l| serde_json::from_str(l).unwrap())
        .collect();
    let responses: Vec<&serde_json::Value> =
        lines.iter().filter(|l| l["type"] == "response").collect();
    assert_eq!(responses.len(), 4);
    assert_eq!(responses[0]["success"], true);
    assert_eq!(responses[1]["success"], false);
    assert_eq!(responses[1]["error"], "No preset ID provided");
    assert_eq!(responses[2]["success"], false);
    assert_eq!(responses[3]["timerState"]["running"], true);

    assert!(lines
        .iter()
        .any(|l| l["type"] == "broadcast" && l["eventKind"] == "timerUpdate"));
}

#[test]
fn test_serve_survives_non_utf8_input() {
    let dir = tempfile::tempdir().unwrap();
    let mut child = Command::new(env!("CARGO_BIN_EXE_studybuddy"))
        .arg("serve")
        .env("STUDYBUDDY_DATA_DIR", dir.path())
        .env("STUDYBUDDY_LOG", "warn")
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .spawn()
        .expect("Failed to spawn serve");

    {
        let stdin = child.stdin.as_mut().unwrap();
        stdin.write_all(b"\xff\xfe garbage\n").unwrap();
        writeln!(stdin, r#"{{"action":"getTimerState"}}"#).unwrap();
    }
    drop(child.stdin.take());
    let output = child.wait_with_output().unwrap();
    assert!(output.status.success());

    let responses: Vec<serde_json::Value> = String::from_utf8_lossy(&output.stdout)
        .lines()
        .map(|l| serde_json::from_str::<serde_json::Value>(l).unwrap())
        .filter(|l| l["type"] == "response")
        .collect();
    assert_eq!(responses.len(), 2);
    assert_eq!(responses[0]["success"], false);
    assert!(responses[0]["error"]
        .as_str()
        .unwrap()
        .starts_with("invalid command"));
    assert_eq!(responses[1]["timerState"]["mode"], "focus");
}
