//! Integration tests for the plankflow binary.
//!
//! These tests verify end-to-end behavior including:
//! - A full accelerated workout and its summary
//! - Aborting from the keyboard
//! - Preferences persistence and corruption recovery
//! - The informational subcommands

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

/// Helper to create a test data directory
fn setup_test_dir() -> TempDir {
    tempfile::tempdir().expect("Failed to create temp dir")
}

/// Helper to get the path to the CLI binary
fn cli() -> Command {
    Command::new(assert_cmd::cargo::cargo_bin!("plankflow"))
}

/// A workout with 4-tick holds and 1ms ticks
fn quick_workout(data_dir: &std::path::Path) -> Command {
    let mut cmd = cli();
    cmd.arg("start")
        .arg("--data-dir")
        .arg(data_dir)
        .arg("--level")
        .arg("0")
        .arg("--time-scale")
        .arg("0.1")
        .arg("--tick-ms")
        .arg("1");
    cmd
}

#[test]
fn test_cli_help() {
    cli()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Guided plank workout timer"));
}

#[test]
fn test_quick_workout_completes_with_summary() {
    let temp_dir = setup_test_dir();

    quick_workout(temp_dir.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("Difficulty: Beginner"))
        .stdout(predicate::str::contains("Hold steady: Simple Elbow Plank"))
        .stdout(predicate::str::contains("[10/10] Hold steady: Plank Jacks"))
        .stdout(predicate::str::contains("Switch sides"))
        .stdout(predicate::str::contains("Workout complete!"))
        .stdout(predicate::str::contains("Total plank time:"))
        .stdout(predicate::str::contains("Estimated calories burned:"));
}

#[test]
fn test_double_quit_aborts() {
    let temp_dir = setup_test_dir();

    cli()
        .arg("start")
        .arg("--data-dir")
        .arg(temp_dir.path())
        .write_stdin("q\nq\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("Press q again"))
        .stdout(predicate::str::contains("Workout ended early."))
        .stdout(predicate::str::contains("Session summary").not());
}

#[test]
fn test_invalid_level_fails() {
    let temp_dir = setup_test_dir();

    cli()
        .arg("start")
        .arg("--data-dir")
        .arg(temp_dir.path())
        .arg("--level")
        .arg("7")
        .assert()
        .failure();
}

#[test]
fn test_levels_table() {
    cli()
        .arg("levels")
        .assert()
        .success()
        .stdout(predicate::str::contains("Beginner"))
        .stdout(predicate::str::contains("Intermediate"))
        .stdout(predicate::str::contains("(default)"))
        .stdout(predicate::str::contains("Expert"));
}

#[test]
fn test_plan_lists_all_exercises() {
    cli()
        .arg("plan")
        .assert()
        .success()
        .stdout(predicate::str::contains("1. Simple Elbow Plank"))
        .stdout(predicate::str::contains("Side Plank (both sides)"))
        .stdout(predicate::str::contains("10. Plank Jacks"));
}

#[test]
fn test_prefs_defaults() {
    let temp_dir = setup_test_dir();

    cli()
        .arg("prefs")
        .arg("--data-dir")
        .arg(temp_dir.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("Vibration: on"))
        .stdout(predicate::str::contains("Sound: off"))
        .stdout(predicate::str::contains("Weight: 70 kg"))
        .stdout(predicate::str::contains("Height: 170 cm"));
}

#[test]
fn test_prefs_set_persists() {
    let temp_dir = setup_test_dir();
    let data_dir = temp_dir.path();

    cli()
        .args(["prefs", "set", "--weight", "82.5", "--sound", "true"])
        .arg("--data-dir")
        .arg(data_dir)
        .assert()
        .success()
        .stdout(predicate::str::contains("Preferences saved"));

    let raw = fs::read_to_string(data_dir.join("preferences.json")).unwrap();
    let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
    assert_eq!(value["weightKg"], 82.5);
    assert_eq!(value["sound"], true);
    assert_eq!(value["vibration"], true);

    cli()
        .args(["prefs", "show"])
        .arg("--data-dir")
        .arg(data_dir)
        .assert()
        .success()
        .stdout(predicate::str::contains("Weight: 82.5 kg"))
        .stdout(predicate::str::contains("Sound: on"));
}

#[test]
fn test_prefs_rejects_non_positive_weight() {
    let temp_dir = setup_test_dir();

    cli()
        .args(["prefs", "set", "--weight", "0"])
        .arg("--data-dir")
        .arg(temp_dir.path())
        .assert()
        .failure();

    assert!(!temp_dir.path().join("preferences.json").exists());
}

#[test]
fn test_corrupted_preferences_fall_back_to_defaults() {
    let temp_dir = setup_test_dir();
    let data_dir = temp_dir.path();
    fs::write(data_dir.join("preferences.json"), "{ invalid json }}}}").unwrap();

    cli()
        .arg("prefs")
        .arg("--data-dir")
        .arg(data_dir)
        .assert()
        .success()
        .stdout(predicate::str::contains("Weight: 70 kg"));

    quick_workout(data_dir)
        .assert()
        .success()
        .stdout(predicate::str::contains("Workout complete!"));
}
