//! End-to-end tests against the built binary.
//!
//! Every test points `TODOPRO_DATA_DIR` at its own temp directory so runs
//! never touch the real config or database. A running timer catches up on
//! wall-clock seconds between invocations, so counts taken while running
//! allow a little slack.

use std::path::Path;
use std::process::Command;

use serde_json::Value;

fn run_cli(dir: &Path, args: &[&str]) -> (String, String, i32) {
    let output = Command::new(env!("CARGO_BIN_EXE_todopro"))
        .args(args)
        .env("TODOPRO_DATA_DIR", dir)
        .env_remove("RUST_LOG")
        .output()
        .expect("failed to execute todopro");

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    let code = output.status.code().unwrap_or(-1);
    (stdout, stderr, code)
}

fn run_ok(dir: &Path, args: &[&str]) -> String {
    let (stdout, stderr, code) = run_cli(dir, args);
    assert_eq!(code, 0, "{args:?} failed: {stderr}");
    stdout
}

/// The last JSON document printed, for commands that may print catch-up
/// events first.
fn last_json(stdout: &str) -> Value {
    let de = serde_json::Deserializer::from_str(stdout).into_iter::<Value>();
    de.map(|v| v.expect("invalid JSON output"))
        .last()
        .expect("no JSON output")
}

fn all_json(stdout: &str) -> Vec<Value> {
    serde_json::Deserializer::from_str(stdout)
        .into_iter::<Value>()
        .map(|v| v.expect("invalid JSON output"))
        .collect()
}

#[test]
fn fresh_status_is_idle_focus() {
    let dir = tempfile::tempdir().unwrap();
    let status = last_json(&run_ok(dir.path(), &["timer", "status"]));
    assert_eq!(status["type"], "StateSnapshot");
    assert_eq!(status["mode"], "focus");
    assert_eq!(status["phase"], "idle");
    assert_eq!(status["remaining_secs"], 1500);
    assert!(dir.path().join("config.toml").exists());
}

#[test]
fn start_opens_session_and_reset_discards_it() {
    let dir = tempfile::tempdir().unwrap();
    let started = last_json(&run_ok(dir.path(), &["timer", "start"]));
    assert_eq!(started["type"], "TimerStarted");
    let id = started["session_id"].as_str().unwrap().to_string();

    let sessions = last_json(&run_ok(dir.path(), &["sessions", "list"]));
    assert_eq!(sessions.as_array().unwrap().len(), 1);
    assert_eq!(sessions[0]["id"], id.as_str());
    assert_eq!(sessions[0]["completed"], false);

    let reset = last_json(&run_ok(dir.path(), &["timer", "reset"]));
    assert_eq!(reset["type"], "TimerReset");
    assert_eq!(reset["discarded_session_id"], id.as_str());

    let sessions = last_json(&run_ok(dir.path(), &["sessions", "list"]));
    assert!(sessions.as_array().unwrap().is_empty());
}

#[test]
fn ticking_through_focus_completes_session() {
    let dir = tempfile::tempdir().unwrap();
    run_ok(dir.path(), &["timer", "start"]);
    let out = run_ok(dir.path(), &["timer", "tick", "-n", "1500"]);
    let events = all_json(&out);

    let completed = events
        .iter()
        .find(|e| e["type"] == "IntervalCompleted")
        .expect("no completion event");
    assert_eq!(completed["finished"], "focus");
    assert_eq!(completed["next"], "break");

    let status = events.last().unwrap();
    assert_eq!(status["mode"], "break");
    assert_eq!(status["phase"], "running");

    let stats = last_json(&run_ok(dir.path(), &["stats", "--json"]));
    assert_eq!(stats["total_completed"], 1);
    assert_eq!(stats["today_completed"], 1);
    assert_eq!(stats["total_focus_time_secs"], 1500);
}

#[test]
fn skip_break_credits_elapsed_time() {
    let dir = tempfile::tempdir().unwrap();
    run_ok(dir.path(), &["timer", "start"]);
    run_ok(dir.path(), &["timer", "tick", "-n", "600"]);
    let skipped = last_json(&run_ok(dir.path(), &["timer", "skip-break"]));
    assert_eq!(skipped["type"], "SkippedToBreak");
    let elapsed = skipped["elapsed_secs"].as_u64().unwrap();
    assert!((600..=610).contains(&elapsed), "elapsed {elapsed}");

    let status = last_json(&run_ok(dir.path(), &["timer", "status"]));
    assert_eq!(status["mode"], "break");
    // Skipping keeps the timer running.
    assert_eq!(status["phase"], "running");

    let sessions = last_json(&run_ok(dir.path(), &["sessions", "list", "--completed"]));
    assert_eq!(sessions[0]["elapsedSeconds"], elapsed);
}

#[test]
fn pause_stops_ticks() {
    let dir = tempfile::tempdir().unwrap();
    run_ok(dir.path(), &["timer", "start"]);
    run_ok(dir.path(), &["timer", "tick", "-n", "10"]);
    let paused = last_json(&run_ok(dir.path(), &["timer", "pause"]));
    assert_eq!(paused["type"], "TimerPaused");
    let remaining = paused["remaining_secs"].as_u64().unwrap();
    assert!(remaining <= 1490);

    let status = last_json(&run_ok(dir.path(), &["timer", "tick", "-n", "5"]));
    assert_eq!(status["phase"], "paused");
    assert_eq!(status["remaining_secs"], remaining);
}

#[test]
fn config_set_get_roundtrip() {
    let dir = tempfile::tempdir().unwrap();
    let out = run_ok(dir.path(), &["config", "set", "focus.focus_time", "50"]);
    assert!(out.contains("ok"));
    let value = run_ok(dir.path(), &["config", "get", "focus.focus_time"]);
    assert_eq!(value.trim(), "50");

    let status = last_json(&run_ok(dir.path(), &["timer", "status"]));
    assert_eq!(status["remaining_secs"], 3000);
}

#[test]
fn config_rejects_out_of_range_values() {
    let dir = tempfile::tempdir().unwrap();
    let (_, stderr, code) = run_cli(dir.path(), &["config", "set", "focus.focus_time", "7"]);
    assert_ne!(code, 0);
    assert!(stderr.contains("error"));

    let (_, _, code) = run_cli(dir.path(), &["config", "set", "focus.nope", "1"]);
    assert_ne!(code, 0);

    let value = run_ok(dir.path(), &["config", "get", "focus.focus_time"]);
    assert_eq!(value.trim(), "25");
}

#[test]
fn human_stats_output() {
    let dir = tempfile::tempdir().unwrap();
    let out = run_ok(dir.path(), &["stats"]);
    assert!(out.contains("Today:"));
    assert!(out.contains("Focus time:"));
}

#[test]
fn completions_generate() {
    let dir = tempfile::tempdir().unwrap();
    let out = run_ok(dir.path(), &["completions", "bash"]);
    assert!(out.contains("todopro"));
}

#[test]
fn corrupt_timer_snapshot_keeps_one_open_session() {
    let dir = tempfile::tempdir().unwrap();
    run_ok(dir.path(), &["timer", "start"]);
    todopro_core::Database::open_at(&dir.path().join("todopro.db"))
        .unwrap()
        .kv_set("timer_state", "garbage")
        .unwrap();
    run_ok(dir.path(), &["timer", "start"]);

    let sessions = last_json(&run_ok(dir.path(), &["sessions", "list"]));
    let open = sessions
        .as_array()
        .unwrap()
        .iter()
        .filter(|s| s["completed"] == false)
        .count();
    assert_eq!(open, 1);
}
