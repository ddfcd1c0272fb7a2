// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Shared test helpers for sync module tests.

#![allow(clippy::unwrap_used)]

use std::sync::Arc;

use serde_json::json;
use tally_core::{payload_from_value, Payload, RecordStore};
use tokio::sync::Mutex;

use super::connectivity::ConnectivityMonitor;
use super::engine::{SyncConfig, SyncEngine};
use super::transport_tests::MockTransport;

/// Create a payload with the given amount.
pub fn make_payload(amount: i64) -> Payload {
    payload_from_value(json!({ "amount": amount, "note": format!("entry {amount}") })).unwrap()
}

/// Create an engine over an in-memory store.
pub fn make_engine(transport: MockTransport, online: bool) -> SyncEngine<MockTransport> {
    let store = Arc::new(Mutex::new(RecordStore::open_in_memory().unwrap()));
    let monitor = Arc::new(ConnectivityMonitor::new(online));
    SyncEngine::with_transport(SyncConfig::default(), transport, store, monitor)
}
