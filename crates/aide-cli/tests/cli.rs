mod common;

use common::{SESSION_ID, TestFixture};
use predicates::prelude::*;

#[test]
fn test_help_lists_both_commands() {
    let fixture = TestFixture::new();
    fixture
        .command()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("ingest"))
        .stdout(predicate::str::contains("diagnose"));
}

#[test]
fn test_ingest_prints_summary() {
    let fixture = TestFixture::new();
    fixture.copy_sample("malformed.jsonl");
    fixture.copy_sample("session_basic.jsonl");

    fixture
        .command()
        .arg("ingest")
        .assert()
        .success()
        .stdout(predicate::str::contains("Ingest complete"))
        .stdout(predicate::str::contains("2 discovered, 2 parsed"))
        .stdout(predicate::str::contains("1 persisted"))
        .stdout(predicate::str::contains("skipped   1 lines"));
}

#[test]
fn test_ingest_json_and_second_run() {
    let fixture = TestFixture::new();
    fixture.copy_sample("session_basic.jsonl");
    fixture.ingest();

    let output = fixture
        .command()
        .args(["ingest", "--json"])
        .output()
        .expect("Failed to run ingest");
    assert!(output.status.success());

    let summary: serde_json::Value =
        serde_json::from_slice(&output.stdout).expect("Ingest output should be JSON");
    assert_eq!(summary["files_unchanged"], 1);
    assert_eq!(summary["files_parsed"], 0);
}

#[test]
fn test_full_rebuild() {
    let fixture = TestFixture::new();
    fixture.copy_sample("session_basic.jsonl");
    fixture.ingest();

    fixture
        .command()
        .args(["ingest", "--full"])
        .assert()
        .success()
        .stdout(predicate::str::contains("1 discovered, 1 parsed, 0 unchanged"));
}

#[test]
fn test_diagnose_text_report() {
    let fixture = TestFixture::new();
    fixture.copy_sample("session_basic.jsonl");
    fixture.ingest();

    fixture
        .command()
        .args(["diagnose", SESSION_ID])
        .assert()
        .success()
        .stdout(predicate::str::contains(format!("Session {}", SESSION_ID)))
        .stdout(predicate::str::contains("project   shop"))
        .stdout(predicate::str::contains("Spend: $"))
        .stdout(predicate::str::contains("Cost by category"))
        .stdout(predicate::str::contains("13,180 tokens"))
        .stdout(predicate::str::contains("Recommendations\n  none"));
}

#[test]
fn test_diagnose_subscription_label() {
    let fixture = TestFixture::new();
    fixture.copy_sample("session_basic.jsonl");
    fixture.ingest();

    let current = std::fs::read_to_string(fixture.config_path()).unwrap();
    fixture.write_config(&format!("{}subscription_user = true\n", current));

    fixture
        .command()
        .args(["diagnose", SESSION_ID])
        .assert()
        .success()
        .stdout(predicate::str::contains("Est. API equivalent: $"));
}

#[test]
fn test_diagnose_json() {
    let fixture = TestFixture::new();
    fixture.copy_sample("session_basic.jsonl");
    fixture.ingest();

    let output = fixture
        .command()
        .args(["diagnose", SESSION_ID, "--json"])
        .output()
        .expect("Failed to run diagnose");
    assert!(output.status.success());

    let diagnosis: serde_json::Value =
        serde_json::from_slice(&output.stdout).expect("Diagnose output should be JSON");
    assert_eq!(diagnosis["report"]["session"]["session_id"], SESSION_ID);
    assert_eq!(diagnosis["report"]["context"]["peak_tokens"], 13_180);
    assert_eq!(diagnosis["report"]["categories"].as_array().map(|a| a.len()), Some(5));
    assert!(diagnosis["report"]["cache"]["hit_rate"].is_number());
    assert!(diagnosis["recommendations"].as_array().unwrap().is_empty());
}

#[test]
fn test_diagnose_unknown_session_fails() {
    let fixture = TestFixture::new();
    fixture.copy_sample("session_basic.jsonl");
    fixture.ingest();

    fixture
        .command()
        .args(["diagnose", "missing-session"])
        .assert()
        .failure()
        .code(1)
        .stdout(predicate::str::is_empty())
        .stderr(predicate::str::contains("Session not found: missing-session"));
}

#[test]
fn test_diagnose_before_ingest_fails() {
    let fixture = TestFixture::new();

    fixture
        .command()
        .args(["diagnose", SESSION_ID])
        .assert()
        .failure()
        .stderr(predicate::str::contains("run `aide ingest` first"));
}

#[test]
fn test_invalid_config_fails() {
    let fixture = TestFixture::new();
    fixture.write_config("[diagnostics]\ncompaction_drop_fraction = 2.0\n");

    fixture
        .command()
        .arg("ingest")
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("compaction_drop_fraction"));
}
