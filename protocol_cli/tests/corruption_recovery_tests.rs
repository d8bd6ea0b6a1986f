//! Corruption recovery tests for milprot.
//!
//! These tests verify the system can handle:
//! - Corrupted state files (refused, never silently reset)
//! - Corrupted or partially written WAL lines

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::io::Write as IoWrite;
use std::path::Path;
use tempfile::TempDir;

fn setup_test_dir() -> TempDir {
    tempfile::tempdir().expect("Failed to create temp dir")
}

fn cli(data_dir: &Path) -> Command {
    let mut cmd = Command::cargo_bin("milprot").expect("Failed to find milprot binary");
    cmd.env("XDG_CONFIG_HOME", data_dir.join("config"))
        .arg("--data-dir")
        .arg(data_dir);
    cmd
}

fn init(data_dir: &Path) {
    cli(data_dir)
        .args(["init", "--bench", "60", "--squat", "80", "--deadlift", "100", "--ohp", "40"])
        .assert()
        .success();
}

#[test]
fn test_corrupted_state_file_is_refused() {
    let temp_dir = setup_test_dir();
    let state_path = temp_dir.path().join("state.json");
    fs::write(&state_path, "{ invalid json }}}}").expect("Failed to write corrupted state");

    cli(temp_dir.path())
        .args(["log", "--auto-complete"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to parse protocol state"));

    // The broken file is left for manual repair
    assert_eq!(
        fs::read_to_string(&state_path).unwrap(),
        "{ invalid json }}}}"
    );
}

#[test]
fn test_corrupted_wal_lines_skipped_in_history() {
    let temp_dir = setup_test_dir();
    init(temp_dir.path());

    cli(temp_dir.path())
        .args(["log", "--auto-complete"])
        .assert()
        .success();

    let wal_path = temp_dir.path().join("wal/training.wal");
    let mut file = fs::OpenOptions::new().append(true).open(&wal_path).unwrap();
    writeln!(file, "{{ invalid json }}").unwrap();
    // Partial last line, as after a crash mid-write
    write!(file, r#"{{"id":"00000000-0000-0000-0000-000000000000","day":"#).unwrap();
    drop(file);

    cli(temp_dir.path())
        .arg("history")
        .assert()
        .success()
        .stdout(predicate::str::contains("1 workouts"));
}

#[test]
fn test_log_appends_after_partial_line() {
    let temp_dir = setup_test_dir();
    init(temp_dir.path());

    let wal_path = temp_dir.path().join("wal/training.wal");
    fs::create_dir_all(wal_path.parent().unwrap()).unwrap();
    fs::write(&wal_path, "{ truncated\n").unwrap();

    cli(temp_dir.path())
        .args(["log", "--auto-complete"])
        .assert()
        .success();

    cli(temp_dir.path())
        .args(["rollup"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Rolled up 1 sessions"));
}
