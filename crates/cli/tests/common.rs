// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

// Allow unused items: test helpers are shared across multiple test binaries,
// and not every test file uses every helper.
#![allow(dead_code)]
#![allow(unused_imports)]

use assert_cmd::cargo::cargo_bin_cmd;
use assert_cmd::Command;

pub use predicates::prelude::*;
pub use tempfile::TempDir;

/// Remote URL nothing listens on, so every probe fails fast.
pub const UNREACHABLE_URL: &str = "http://127.0.0.1:9";

/// `tally` with its state directory pinned to `temp` and a quiet log filter.
pub fn tally(temp: &TempDir) -> Command {
    let mut cmd = cargo_bin_cmd!("tally");
    cmd.env("TALLY_STATE_DIR", temp.path())
        .env("RUST_LOG", "warn")
        .env_remove("XDG_STATE_HOME");
    cmd
}

/// Helper to create an initialized state directory pointing at an unreachable remote.
pub fn init_offline() -> TempDir {
    let temp = TempDir::new().unwrap();
    tally(&temp)
        .args(["init", "--url", UNREACHABLE_URL])
        .assert()
        .success();
    temp
}

/// Helper to queue a record and return its id.
pub fn add_record(temp: &TempDir, kind: &str, payload: &str) -> i64 {
    let output = tally(temp).args(["add", kind, payload]).output().unwrap();
    assert!(output.status.success(), "add failed: {:?}", output);

    String::from_utf8_lossy(&output.stdout)
        .split_whitespace()
        .last()
        .unwrap()
        .parse()
        .unwrap()
}
