//! Integration tests for the `timetable` CLI binary.
//!
//! These tests use `assert_cmd` and `predicates` to exercise the list, facets,
//! and move subcommands through the actual binary. Moves run against a copy of
//! the fixture in a temporary directory so the fixture itself never changes.

// `Command::cargo_bin` was deprecated in assert_cmd 2.1.2 in favor of
// `cargo::cargo_bin_cmd!`. Allow it until we migrate.
#![allow(deprecated)]

use std::path::{Path, PathBuf};

use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::Value;
use tempfile::TempDir;

/// Helper: path to the schedule.json fixture.
fn schedule_path() -> &'static str {
    concat!(env!("CARGO_MANIFEST_DIR"), "/tests/fixtures/schedule.json")
}

/// Helper: copy the fixture into a fresh temp dir and return (dir, path).
fn scratch_schedule() -> (TempDir, PathBuf) {
    let dir = tempfile::tempdir().expect("temp dir");
    let path = dir.path().join("schedule.json");
    std::fs::copy(schedule_path(), &path).expect("copy fixture");
    (dir, path)
}

fn read_json(path: &Path) -> Value {
    serde_json::from_str(&std::fs::read_to_string(path).unwrap()).unwrap()
}

/// Helper: the (start, end) stored for one section in a schedule file.
fn stored_times(path: &Path, section: &str) -> (String, String) {
    let json = read_json(path);
    let row = json["sections"]
        .as_array()
        .unwrap()
        .iter()
        .find(|r| r["section_id"] == section)
        .unwrap()
        .clone();
    (
        row["start_time"].as_str().unwrap().to_string(),
        row["end_time"].as_str().unwrap().to_string(),
    )
}

fn timetable() -> Command {
    Command::cargo_bin("timetable").unwrap()
}

// ─────────────────────────────────────────────────────────────────────────────
// list
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn list_shows_every_occurrence() {
    timetable()
        .args(["list", "-i", schedule_path(), "--week", "2026-03-18"])
        .assert()
        .success()
        .stdout(predicate::str::contains("A-M"))
        .stdout(predicate::str::contains("A-W"))
        .stdout(predicate::str::contains("B-M"))
        .stdout(predicate::str::contains("C-T"))
        .stdout(predicate::str::contains("C-R"))
        .stdout(predicate::str::contains("13:00:00-14:15:00"));
}

#[test]
fn list_filters_by_professor() {
    timetable()
        .args([
            "list",
            "-i",
            schedule_path(),
            "--week",
            "2026-03-16",
            "--professor",
            "Lee",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("A-M"))
        .stdout(predicate::str::contains("A-W"))
        .stdout(predicate::str::contains("B-M").not())
        .stdout(predicate::str::contains("C-T").not());
}

#[test]
fn list_facets_combine_with_and() {
    timetable()
        .args([
            "list",
            "-i",
            schedule_path(),
            "--room",
            "Room 101",
            "--grade",
            "11",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("B-M"))
        .stdout(predicate::str::contains("A-M").not());
}

#[test]
fn list_json_is_anchored_to_requested_week() {
    let output = timetable()
        .args(["list", "-i", schedule_path(), "--week", "2026-03-22", "--json"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let parsed: Value = serde_json::from_slice(&output.stdout).expect("stdout should be JSON");
    let items = parsed.as_array().unwrap();
    assert_eq!(items.len(), 5);

    // 2026-03-22 is a Sunday; its week starts Monday 2026-03-16.
    let a_mon = items.iter().find(|o| o["id"] == "A-M").unwrap();
    assert_eq!(a_mon["start"], "2026-03-16T09:00:00");
    assert_eq!(a_mon["grade_level"], "9");
    assert_eq!(a_mon["time_slot_id"], "101");
}

// ─────────────────────────────────────────────────────────────────────────────
// facets
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn facets_lists_distinct_values() {
    timetable()
        .args(["facets", "-i", schedule_path()])
        .assert()
        .success()
        .stdout(predicate::str::contains("Professors:   Kim, Lee, Park"))
        .stdout(predicate::str::contains("Rooms:        Lab 2, Room 101"))
        .stdout(predicate::str::contains("Grade levels: 10, 11, 9"));
}

// ─────────────────────────────────────────────────────────────────────────────
// move
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn clean_move_updates_every_day_of_the_slot() {
    let (_dir, path) = scratch_schedule();

    timetable()
        .args(["move", "-i", path.to_str().unwrap(), "--week", "2026-03-16"])
        .args(["--occurrence", "C-R", "--start", "15:00", "--end", "16:15"])
        .write_stdin("")
        .assert()
        .success()
        .stdout(predicate::str::contains("Moved C-T, C-R to 15:00:00-16:15:00"))
        .stdout(predicate::str::contains("conflict").not());

    assert_eq!(
        stored_times(&path, "C"),
        ("15:00:00".to_string(), "16:15:00".to_string())
    );
    assert_eq!(
        stored_times(&path, "A"),
        ("09:00:00".to_string(), "10:00:00".to_string())
    );
}

#[test]
fn declined_conflict_leaves_file_untouched() {
    let (_dir, path) = scratch_schedule();
    let before = read_json(&path);

    timetable()
        .args(["move", "-i", path.to_str().unwrap(), "--week", "2026-03-16"])
        .args(["--occurrence", "A-M", "--start", "09:30", "--end", "10:30"])
        .write_stdin("n\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("Room conflict"))
        .stdout(predicate::str::contains("Professor conflict").not())
        .stdout(predicate::str::contains("Move cancelled"));

    assert_eq!(read_json(&path), before);
}

#[test]
fn accepted_conflict_moves_both_days() {
    let (_dir, path) = scratch_schedule();

    timetable()
        .args(["move", "-i", path.to_str().unwrap(), "--week", "2026-03-16"])
        .args(["--occurrence", "A-M", "--start", "09:30", "--end", "10:30"])
        .write_stdin("y\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("Moved A-M, A-W to 09:30:00-10:30:00"))
        .stdout(predicate::str::contains("Overrode 1 conflict(s)"));

    assert_eq!(
        stored_times(&path, "A"),
        ("09:30:00".to_string(), "10:30:00".to_string())
    );
    assert_eq!(
        stored_times(&path, "B"),
        ("09:30:00".to_string(), "10:30:00".to_string())
    );
}

#[test]
fn move_keeps_raw_values_and_leaves_no_staging_file() {
    let (dir, path) = scratch_schedule();

    timetable()
        .args(["move", "-i", path.to_str().unwrap(), "--week", "2026-03-16"])
        .args(["--occurrence", "A-W", "--start", "14:00", "--end", "15:00"])
        .assert()
        .success();

    let json = read_json(&path);
    let a = &json["sections"][0];
    assert_eq!(a["start_time"], "14:00:00");
    assert_eq!(a["time_slot_id"], 101);
    assert_eq!(a["pattern_slot_id"], 11);
    assert_eq!(a["grade_level"], 9);
    assert_eq!(a["notes"], "Overflow seating in Room 103");
    assert_eq!(json["sections"][1]["grade_level"], "11");

    let leftovers: Vec<_> = std::fs::read_dir(dir.path())
        .unwrap()
        .map(|e| e.unwrap().file_name())
        .collect();
    assert_eq!(leftovers, vec![std::ffi::OsString::from("schedule.json")]);
}

#[test]
fn yes_flag_skips_the_prompt() {
    let (_dir, path) = scratch_schedule();

    timetable()
        .args(["move", "-i", path.to_str().unwrap(), "--week", "2026-03-16", "--yes"])
        .args(["--occurrence", "A-M", "--start", "09:30", "--end", "10:30"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Apply anyway").not())
        .stdout(predicate::str::contains("Moved A-M, A-W"));
}

#[test]
fn moving_to_another_day_is_rejected() {
    let (_dir, path) = scratch_schedule();
    let before = read_json(&path);

    timetable()
        .args(["move", "-i", path.to_str().unwrap(), "--week", "2026-03-16"])
        .args(["--occurrence", "A-M", "--start", "14:00", "--end", "15:00"])
        .args(["--date", "2026-03-17"])
        .write_stdin("y\n")
        .assert()
        .failure()
        .stderr(predicate::str::contains("different day"));

    assert_eq!(read_json(&path), before);
}

#[test]
fn moving_into_another_week_is_rejected() {
    let (_dir, path) = scratch_schedule();
    let before = read_json(&path);

    timetable()
        .args(["move", "-i", path.to_str().unwrap(), "--week", "2026-03-16"])
        .args(["--occurrence", "A-M", "--start", "09:30", "--end", "10:30"])
        .args(["--date", "2026-03-23"])
        .write_stdin("n\n")
        .assert()
        .failure()
        .stderr(predicate::str::contains("displayed week"));

    assert_eq!(read_json(&path), before);
}

#[test]
fn unknown_occurrence_fails() {
    timetable()
        .args(["move", "-i", schedule_path()])
        .args(["--occurrence", "Z-M", "--start", "09:00", "--end", "10:00"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unknown occurrence: Z-M"));
}

#[test]
fn invalid_time_fails() {
    timetable()
        .args(["move", "-i", schedule_path()])
        .args(["--occurrence", "A-M", "--start", "nine", "--end", "10:00"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid --start"));
}

// ─────────────────────────────────────────────────────────────────────────────
// Errors and configuration
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn missing_schedule_file_fails() {
    timetable()
        .args(["list", "-i", "/nonexistent/schedule.json"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to load schedule"));
}

#[test]
fn no_input_and_no_config_fails() {
    timetable()
        .arg("list")
        .assert()
        .failure()
        .stderr(predicate::str::contains("No schedule file"));
}

#[test]
fn config_supplies_schedule_file_and_default_day() {
    let dir = tempfile::tempdir().unwrap();
    let schedule = dir.path().join("schedule.json");
    std::fs::write(
        &schedule,
        r#"{"sections":[{"section_id":"E","pattern_slot_id":"P","time_slot_id":"T",
            "day_pattern":"","start_time":"08:00","end_time":"09:00","course":"ART 1",
            "instructor":"Diaz","room":"Studio","grade_level":12}]}"#,
    )
    .unwrap();
    let config = dir.path().join("timetable.toml");
    std::fs::write(
        &config,
        format!(
            "timezone = \"America/New_York\"\ndefault_day = \"F\"\nschedule_file = {:?}\n",
            schedule.to_str().unwrap()
        ),
    )
    .unwrap();

    timetable()
        .args(["list", "--config", config.to_str().unwrap(), "--week", "2026-03-16"])
        .assert()
        .success()
        .stdout(predicate::str::contains("E-F"))
        .stdout(predicate::str::contains("Friday"));
}

#[test]
fn unknown_timezone_in_config_fails() {
    let dir = tempfile::tempdir().unwrap();
    let config = dir.path().join("timetable.toml");
    std::fs::write(&config, "timezone = \"Mars/Olympus\"\n").unwrap();

    timetable()
        .args(["list", "-i", schedule_path(), "--config", config.to_str().unwrap()])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unknown timezone"));
}

#[test]
fn unknown_config_key_fails() {
    let dir = tempfile::tempdir().unwrap();
    let config = dir.path().join("timetable.toml");
    std::fs::write(&config, "colour = \"blue\"\n").unwrap();

    timetable()
        .args(["list", "-i", schedule_path(), "--config", config.to_str().unwrap()])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid config file"));
}
