//! End-to-End Tests for the Atomic Pomodoro binary.
//!
//! These tests run the compiled binary against a temporary settings file:
//! - `settings` subcommands read and write the store
//! - The window reads commands from stdin and exits on `q` or end of input
//! - Completions are generated

use std::path::PathBuf;

use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::Value;

// ============================================================================
// Test Helpers
// ============================================================================

struct Workspace {
    _dir: tempfile::TempDir,
    store: PathBuf,
}

fn create_workspace() -> Workspace {
    let dir = tempfile::tempdir().unwrap();
    let store = dir.path().join("window-state-main.json");
    Workspace { _dir: dir, store }
}

fn pomodoro(ws: &Workspace) -> Command {
    let mut cmd = Command::cargo_bin("atomic-pomodoro").unwrap();
    cmd.arg("--store").arg(&ws.store);
    cmd.env_remove("RUST_LOG");
    cmd
}

fn read_store(ws: &Workspace) -> Value {
    serde_json::from_str(&std::fs::read_to_string(&ws.store).unwrap()).unwrap()
}

// ============================================================================
// Settings Subcommands
// ============================================================================

#[test]
fn test_settings_show_seeds_defaults() {
    let ws = create_workspace();
    pomodoro(&ws)
        .args(["settings", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("focus     25:00"))
        .stdout(predicate::str::contains("break     5:00"))
        .stdout(predicate::str::contains("progress  off"));

    let stored = read_store(&ws);
    assert_eq!(stored["TIME"]["focus"]["minute"], 25);
    assert_eq!(stored["PROGRESS_IN_TASKBAR"], false);
}

#[test]
fn test_settings_set_persists() {
    let ws = create_workspace();
    pomodoro(&ws)
        .args(["settings", "set", "break", "10", "30"])
        .assert()
        .success()
        .stdout(predicate::str::contains("break     10:30"));

    pomodoro(&ws)
        .args(["settings", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("break     10:30"))
        .stdout(predicate::str::contains("focus     25:00"));
}

#[test]
fn test_settings_progress_and_reset() {
    let ws = create_workspace();
    pomodoro(&ws)
        .args(["settings", "progress", "on"])
        .assert()
        .success()
        .stdout(predicate::str::contains("progress  on"));
    assert_eq!(read_store(&ws)["PROGRESS_IN_TASKBAR"], true);

    pomodoro(&ws)
        .args(["settings", "reset"])
        .assert()
        .success()
        .stdout(predicate::str::contains("progress  off"));
    assert_eq!(read_store(&ws)["PROGRESS_IN_TASKBAR"], false);
}

#[test]
fn test_settings_set_rejects_bad_mode() {
    let ws = create_workspace();
    pomodoro(&ws)
        .args(["settings", "set", "nap", "5"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown mode"));
}

#[test]
fn test_ephemeral_writes_nothing() {
    let ws = create_workspace();
    Command::cargo_bin("atomic-pomodoro")
        .unwrap()
        .args(["--ephemeral", "settings", "set", "focus", "1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("focus     1:00"));
    assert!(!ws.store.exists());
}

// ============================================================================
// Window
// ============================================================================

#[test]
fn test_window_quits_on_q() {
    let ws = create_workspace();
    pomodoro(&ws)
        .args(["run", "--no-sound", "--no-notify"])
        .write_stdin("h\nq\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("Atomic Pomodoro v"))
        .stdout(predicate::str::contains("25:00"))
        .stdout(predicate::str::contains("progress <on|off>"));
}

#[test]
fn test_window_edit_persists() {
    let ws = create_workspace();
    pomodoro(&ws)
        .args(["run", "--no-sound", "--no-notify"])
        .write_stdin("set focus minute 12\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("12:00"));

    assert_eq!(read_store(&ws)["TIME"]["focus"]["minute"], 12);
}

#[test]
fn test_window_reports_rejected_command() {
    let ws = create_workspace();
    pomodoro(&ws)
        .args(["run", "--no-sound", "--no-notify"])
        .write_stdin("resume\nq\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("cannot resume while the timer is idle"));
}

// ============================================================================
// Completions
// ============================================================================

#[test]
fn test_completions_bash() {
    Command::cargo_bin("atomic-pomodoro")
        .unwrap()
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("atomic-pomodoro"));
}
