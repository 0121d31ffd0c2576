//! Integration tests for the `slots` CLI binary.
//!
//! These use `assert_cmd` and `predicates` to exercise the day, availability,
//! validate and book subcommands through the actual binary, against JSON
//! fixtures and temporary copies of them.

// `Command::cargo_bin` was deprecated in assert_cmd 2.1.2 in favor of
// `cargo::cargo_bin_cmd!`. Allow it until we migrate.
#![allow(deprecated)]

use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::Value;

/// Helper: path to the events.json fixture.
fn events_path() -> &'static str {
    concat!(env!("CARGO_MANIFEST_DIR"), "/tests/fixtures/events.json")
}

/// Helper: path to the config.json fixture (3-day horizon).
fn config_path() -> &'static str {
    concat!(env!("CARGO_MANIFEST_DIR"), "/tests/fixtures/config.json")
}

/// Helper: path to a fixture holding the same opening twice.
fn duplicate_path() -> &'static str {
    concat!(env!("CARGO_MANIFEST_DIR"), "/tests/fixtures/duplicate.json")
}

/// Helper: a `slots` command with a clean environment.
fn slots() -> Command {
    let mut cmd = Command::cargo_bin("slots").unwrap();
    cmd.env_remove("SLOT_ENGINE_TZ").env_remove("RUST_LOG");
    cmd
}

/// Helper: copy the events fixture into a temp dir and return (dir, path).
fn scratch_events() -> (tempfile::TempDir, String) {
    let dir = tempfile::tempdir().expect("temp dir");
    let path = dir.path().join("events.json");
    std::fs::copy(events_path(), &path).expect("copy fixture");
    (dir, path.to_string_lossy().into_owned())
}

fn stdout_json(output: &std::process::Output) -> Value {
    serde_json::from_slice(&output.stdout).expect("stdout must be JSON")
}

// ─────────────────────────────────────────────────────────────────────────────
// Reading availability
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn day_prints_available_slots() {
    slots()
        .args(["day", "--events", events_path(), "--date", "2014-08-10"])
        .assert()
        .success()
        .stdout("[\"13:30\"]\n");
}

#[test]
fn day_before_recurrence_start_is_empty() {
    slots()
        .args(["day", "--events", events_path(), "--date", "2014-07-28"])
        .assert()
        .success()
        .stdout("[]\n");
}

#[test]
fn availability_prints_seven_days() {
    let output = slots()
        .args(["availability", "--events", events_path(), "--from", "2014-08-10"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let week = stdout_json(&output);
    let week = week.as_array().unwrap();
    assert_eq!(week.len(), 7);
    assert_eq!(week[0]["date"], "2014-08-10");
    assert_eq!(week[0]["slots"], serde_json::json!(["13:30"]));
    assert_eq!(week[1]["slots"], serde_json::json!(["12:00"]));
    assert_eq!(week[2]["slots"], serde_json::json!([]));
    assert_eq!(week[6]["date"], "2014-08-16");
}

#[test]
fn config_file_sets_horizon() {
    let output = slots()
        .args([
            "--config",
            config_path(),
            "availability",
            "--events",
            events_path(),
            "--from",
            "2014-08-10",
        ])
        .output()
        .unwrap();
    assert!(output.status.success());
    assert_eq!(stdout_json(&output).as_array().unwrap().len(), 3);
}

#[test]
fn local_timestamps_follow_timezone_flag() {
    // Naive fixture times are read as Paris wall clock, and rendered back the same.
    slots()
        .args([
            "--timezone",
            "Europe/Paris",
            "day",
            "--events",
            events_path(),
            "--date",
            "2014-08-10",
        ])
        .assert()
        .success()
        .stdout("[\"13:30\"]\n");
}

#[test]
fn missing_events_file_is_an_empty_calendar() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("none.json");
    slots()
        .args(["day", "--events", path.to_str().unwrap(), "--date", "2014-08-10"])
        .assert()
        .success()
        .stdout("[]\n");
}

// ─────────────────────────────────────────────────────────────────────────────
// Validation and booking
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn validate_bookable_appointment() {
    slots()
        .args([
            "validate",
            "--events",
            events_path(),
            "--kind",
            "appointment",
            "--starts-at",
            "2014-08-11 12:00",
            "--ends-at",
            "2014-08-11 12:30",
        ])
        .assert()
        .success()
        .stdout("{\"valid\":true,\"errors\":[]}\n");
}

#[test]
fn validate_booked_appointment_fails() {
    slots()
        .args([
            "validate",
            "--events",
            events_path(),
            "--kind",
            "appointment",
            "--starts-at",
            "2014-08-11 09:30",
            "--ends-at",
            "2014-08-11 10:00",
        ])
        .assert()
        .code(1)
        .stdout(predicate::str::contains("appointment is not bookable"));
}

#[test]
fn validate_duplicate_opening_fails() {
    slots()
        .args([
            "validate",
            "--events",
            events_path(),
            "--kind",
            "opening",
            "--starts-at",
            "2014-08-10 13:30",
            "--ends-at",
            "2014-08-10 14:30",
        ])
        .assert()
        .code(1)
        .stdout(predicate::str::contains("opening already exists"));
}

#[test]
fn validate_reports_missing_fields() {
    slots()
        .args(["validate", "--events", events_path(), "--kind", "meeting"])
        .assert()
        .code(1)
        .stdout(predicate::str::contains("kind: is not included in the list"))
        .stdout(predicate::str::contains("starts_at: can't be blank"))
        .stdout(predicate::str::contains("ends_at: can't be blank"));
}

#[test]
fn book_appends_and_consumes_slot() {
    let (_dir, path) = scratch_events();
    let book = |expect_ok: bool| {
        let assert = slots()
            .args([
                "book",
                "--events",
                &path,
                "--kind",
                "appointment",
                "--starts-at",
                "2014-08-10 13:30",
                "--ends-at",
                "2014-08-10 14:00",
            ])
            .assert();
        if expect_ok {
            assert.success();
        } else {
            assert.code(1);
        }
    };

    book(true);
    let stored: Value = serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(stored.as_array().unwrap().len(), 7);

    slots()
        .args(["day", "--events", &path, "--date", "2014-08-10"])
        .assert()
        .success()
        .stdout("[]\n");

    // Second booking of the same slot is rejected and nothing is written.
    book(false);
    let stored: Value = serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(stored.as_array().unwrap().len(), 7);
}

#[test]
fn book_weekly_opening() {
    let (_dir, path) = scratch_events();
    slots()
        .args([
            "book",
            "--events",
            &path,
            "--kind",
            "opening",
            "--weekly",
            "--starts-at",
            "2014-08-05 15:00",
            "--ends-at",
            "2014-08-05 16:00",
        ])
        .assert()
        .success();

    slots()
        .args(["day", "--events", &path, "--date", "2014-08-12"])
        .assert()
        .success()
        .stdout("[\"15:00\",\"15:30\"]\n");
}

#[test]
fn concurrent_bookings_are_all_kept() {
    let (dir, path) = scratch_events();
    let hours = [9, 10, 11, 12, 13, 14];

    let handles: Vec<_> = hours
        .iter()
        .map(|hour| {
            let path = path.clone();
            let starts_at = format!("2014-08-20 {}:00", hour);
            let ends_at = format!("2014-08-20 {}:30", hour);
            std::thread::spawn(move || {
                slots()
                    .args([
                        "book",
                        "--events",
                        &path,
                        "--kind",
                        "opening",
                        "--starts-at",
                        &starts_at,
                        "--ends-at",
                        &ends_at,
                    ])
                    .output()
                    .unwrap()
            })
        })
        .collect();
    for handle in handles {
        assert!(handle.join().unwrap().status.success());
    }

    let stored: Value = serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(stored.as_array().unwrap().len(), 6 + hours.len());

    // Labels follow booking order, which the race decides.
    let output = slots()
        .args(["day", "--events", &path, "--date", "2014-08-20"])
        .output()
        .unwrap();
    let mut labels: Vec<String> = serde_json::from_value(stdout_json(&output)).unwrap();
    labels.sort();
    assert_eq!(labels, vec!["10:00", "11:00", "12:00", "13:00", "14:00", "9:00"]);

    // Only the events file and its lock remain; temp files were renamed away.
    let mut names: Vec<_> = std::fs::read_dir(dir.path())
        .unwrap()
        .map(|entry| entry.unwrap().file_name().into_string().unwrap())
        .collect();
    names.sort();
    assert_eq!(names, vec!["events.json", "events.json.lock"]);
}

// ─────────────────────────────────────────────────────────────────────────────
// Errors
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn invalid_date_fails() {
    slots()
        .args(["day", "--events", events_path(), "--date", "10/08/2014"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid date"));
}

#[test]
fn invalid_timezone_fails() {
    slots()
        .args([
            "--timezone",
            "Mars/Olympus",
            "day",
            "--events",
            events_path(),
            "--date",
            "2014-08-10",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid timezone"));
}

#[test]
fn invalid_timestamp_fails() {
    slots()
        .args([
            "validate",
            "--events",
            events_path(),
            "--kind",
            "opening",
            "--starts-at",
            "soon",
            "--ends-at",
            "2014-08-10 14:30",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid --starts-at"));
}

#[test]
fn duplicate_openings_in_events_file_fail_to_load() {
    slots()
        .args(["day", "--events", duplicate_path(), "--date", "2014-08-04"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to load event #1"));
}

#[test]
fn no_subcommand_shows_usage() {
    slots()
        .assert()
        .failure()
        .stderr(predicate::str::contains("Usage"));
}
