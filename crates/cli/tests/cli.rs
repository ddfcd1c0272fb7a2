// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]

mod common;
use common::*;
use yare::parameterized;

#[test]
fn init_creates_state_dir() {
    let temp = TempDir::new().unwrap();

    tally(&temp)
        .args(["init", "--url", "https://sync.example.com"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Initialized tally"))
        .stdout(predicate::str::contains("https://sync.example.com"));

    assert!(temp.path().join("config.toml").exists());
    assert!(temp.path().join("queue.db").exists());
}

#[test]
fn init_defaults_to_localhost() {
    let temp = TempDir::new().unwrap();

    tally(&temp).arg("init").assert().success();

    let config = std::fs::read_to_string(temp.path().join("config.toml")).unwrap();
    assert!(config.contains("url = \"http://localhost:5000\""));
    assert!(config.contains("sync_interval_secs = 30"));
}

#[test]
fn init_fails_if_already_initialized() {
    let temp = init_offline();

    tally(&temp)
        .arg("init")
        .assert()
        .failure()
        .stderr(predicate::str::contains("already initialized"));
}

#[test]
fn init_rejects_non_http_url() {
    let temp = TempDir::new().unwrap();

    tally(&temp)
        .args(["init", "--url", "ws://localhost:5000"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("http://"));
}

#[test]
fn state_dir_flag_overrides_env() {
    let temp = TempDir::new().unwrap();
    let other = TempDir::new().unwrap();

    tally(&temp)
        .arg("--state-dir")
        .arg(other.path())
        .arg("init")
        .assert()
        .success();

    assert!(other.path().join("config.toml").exists());
    assert!(!temp.path().join("config.toml").exists());
}

#[parameterized(
    add = { &["add", "transaction", "{}"] },
    pending = { &["pending"] },
    status = { &["status"] },
    sync = { &["sync"] },
)]
fn commands_require_init(args: &[&str]) {
    let temp = TempDir::new().unwrap();

    tally(&temp)
        .args(args)
        .assert()
        .failure()
        .stderr(predicate::str::contains("tally init"));
}

#[test]
fn add_prints_sequential_ids() {
    let temp = init_offline();

    let first = add_record(&temp, "transaction", r#"{"amount": 1}"#);
    let second = add_record(&temp, "transaction", r#"{"amount": 2}"#);
    let other = add_record(&temp, "balance-item", r#"{"name": "cash"}"#);

    assert!(second > first);
    assert_eq!(other, 1);
}

#[test]
fn add_rejects_non_object_payload() {
    let temp = init_offline();

    tally(&temp)
        .args(["add", "investment", "[1, 2, 3]"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("expected object"));
}

#[test]
fn add_rejects_unknown_kind() {
    let temp = init_offline();

    tally(&temp)
        .args(["add", "widget", "{}"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid value"));
}

#[test]
fn pending_lists_records_in_drain_order() {
    let temp = init_offline();
    add_record(&temp, "balance-item", r#"{"name": "cash"}"#);
    add_record(&temp, "transaction", r#"{"amount": 12}"#);

    let output = tally(&temp).arg("pending").output().unwrap();
    let stdout = String::from_utf8_lossy(&output.stdout);
    let lines: Vec<&str> = stdout.lines().collect();

    assert_eq!(lines.len(), 2);
    assert!(lines[0].starts_with("transaction"));
    assert!(lines[0].contains("pending"));
    assert!(lines[0].contains("\"amount\":12"));
    assert!(lines[1].starts_with("balance_item"));
}

#[test]
fn pending_filters_by_kind() {
    let temp = init_offline();
    add_record(&temp, "transaction", r#"{"amount": 12}"#);
    add_record(&temp, "investment", r#"{"symbol": "VTI"}"#);

    tally(&temp)
        .args(["pending", "investment"])
        .assert()
        .success()
        .stdout(predicate::str::contains("VTI"))
        .stdout(predicate::str::contains("amount").not());
}

#[test]
fn pending_empty_queue() {
    let temp = init_offline();

    tally(&temp)
        .arg("pending")
        .assert()
        .success()
        .stdout(predicate::str::contains("No pending records"));
}

#[test]
fn pending_json_output() {
    let temp = init_offline();
    let id = add_record(&temp, "investment", r#"{"symbol": "VTI"}"#);

    let output = tally(&temp)
        .args(["pending", "-o", "json"])
        .output()
        .unwrap();
    let records: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();

    assert_eq!(records.as_array().unwrap().len(), 1);
    assert_eq!(records[0]["id"], id);
    assert_eq!(records[0]["kind"], "investment");
    assert_eq!(records[0]["sync_status"], "pending");
    assert_eq!(records[0]["payload"]["symbol"], "VTI");
}

#[test]
fn status_reports_offline_with_pending_count() {
    let temp = init_offline();
    add_record(&temp, "transaction", r#"{"amount": 1}"#);
    add_record(&temp, "investment", r#"{"symbol": "VTI"}"#);

    tally(&temp)
        .arg("status")
        .assert()
        .success()
        .stdout(predicate::str::contains("Status: offline (2 pending)"))
        .stdout(predicate::str::contains("Pending: 2"));
}

#[test]
fn status_json_output() {
    let temp = init_offline();
    add_record(&temp, "transaction", r#"{"amount": 1}"#);

    let output = tally(&temp)
        .args(["status", "--output", "json"])
        .output()
        .unwrap();
    let status: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();

    assert_eq!(
        status,
        serde_json::json!({ "isOnline": false, "isSyncing": false, "pendingCount": 1 })
    );
}

#[test]
fn sync_offline_fails_and_keeps_records() {
    let temp = init_offline();
    add_record(&temp, "transaction", r#"{"amount": 1}"#);

    tally(&temp)
        .arg("sync")
        .assert()
        .failure()
        .stderr(predicate::str::contains("cannot sync while offline"));

    tally(&temp)
        .arg("pending")
        .assert()
        .success()
        .stdout(predicate::str::contains("transaction"));
}
