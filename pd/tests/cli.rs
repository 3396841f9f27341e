//! Integration tests for the pd binary
//!
//! These exercise the CLI surface that needs no network or credential.

use assert_cmd::Command;
use predicates::prelude::*;

fn pd() -> Command {
    let mut cmd = Command::cargo_bin("pd").expect("pd binary should build");
    cmd.env_remove("GEMINI_API_KEY");
    cmd
}

#[test]
fn sections_lists_the_full_catalog() {
    pd().arg("sections")
        .assert()
        .success()
        .stdout(
            predicate::str::contains("general-info")
                .and(predicate::str::contains("overview"))
                .and(predicate::str::contains("problem"))
                .and(predicate::str::contains("solution"))
                .and(predicate::str::contains("growth"))
                .and(predicate::str::contains("team")),
        )
        .stdout(predicate::str::contains("30~35점"));
}

#[test]
fn chat_without_credential_is_a_configuration_error() {
    pd().args(["chat", "--section", "problem", "--start"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("GEMINI_API_KEY"));
}

#[test]
fn conflicting_mode_flags_still_hit_the_credential_check_first() {
    // Start wins over draft, but the credential precondition fires before
    // any composition either way.
    pd().args(["chat", "--section", "team", "--start", "--draft"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("GEMINI_API_KEY"));
}

#[test]
fn malformed_history_file_is_reported() {
    let dir = tempfile::tempdir().expect("tempdir");
    let history = dir.path().join("history.json");
    std::fs::write(&history, "not json").expect("write history");

    pd().env("GEMINI_API_KEY", "dummy-key-for-parsing-only")
        .args(["chat", "--section", "team"])
        .arg("--history")
        .arg(&history)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to parse history file"));
}

#[test]
fn unknown_section_does_not_fail_before_the_credential_check() {
    // The catalog degrades unknown sections to an empty block instead of
    // failing; without a credential the request still stops at validation,
    // not at a section lookup error.
    pd().args(["chat", "--section", "no-such-section", "--start"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("GEMINI_API_KEY").and(predicate::str::contains("no-such-section").not()));
}
