// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! End-to-end tests: on-disk store, HTTP transport and a local remote.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tally_core::{EntityKind, RecordStore, SyncStatus};
use tempfile::TempDir;
use tokio::io::AsyncWriteExt;
use tokio::net::TcpListener;

use super::connectivity::ConnectivityMonitor;
use super::engine::{SyncConfig, SyncEngine, SyncOutcome};
use super::status::SyncStatusSnapshot;
use super::test_helpers::make_payload;
use super::transport_tests::read_request;

/// Local remote answering each request with the next scripted status (201 once exhausted).
struct Remote {
    url: String,
    requests: Arc<Mutex<Vec<String>>>,
}

impl Remote {
    async fn start(statuses: impl IntoIterator<Item = u16>) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let url = format!("http://{}", listener.local_addr().unwrap());
        let script: Arc<Mutex<VecDeque<u16>>> =
            Arc::new(Mutex::new(statuses.into_iter().collect()));
        let requests = Arc::new(Mutex::new(Vec::new()));

        let seen = Arc::clone(&requests);
        tokio::spawn(async move {
            loop {
                let Ok((mut socket, _)) = listener.accept().await else {
                    break;
                };
                let request = read_request(&mut socket).await;
                if request.is_empty() {
                    continue;
                }
                seen.lock().unwrap().push(request);
                let status = script.lock().unwrap().pop_front().unwrap_or(201);
                let response = format!(
                    "HTTP/1.1 {status} Test\r\ncontent-length: 0\r\nconnection: close\r\n\r\n"
                );
                let _ = socket.write_all(response.as_bytes()).await;
                let _ = socket.shutdown().await;
            }
        });

        Remote { url, requests }
    }

    fn request_lines(&self) -> Vec<String> {
        self.requests
            .lock()
            .unwrap()
            .iter()
            .filter_map(|r| r.lines().next().map(str::to_string))
            .collect()
    }
}

fn http_engine(dir: &TempDir, url: &str, online: bool) -> SyncEngine {
    let store = RecordStore::open(&dir.path().join("queue.db")).unwrap();
    let config = SyncConfig {
        interval: Duration::from_secs(30),
        request_timeout: Duration::from_secs(5),
    };
    SyncEngine::new(
        config,
        url,
        Arc::new(tokio::sync::Mutex::new(store)),
        Arc::new(ConnectivityMonitor::new(online)),
    )
    .unwrap()
}

#[tokio::test]
async fn offline_transactions_drain_after_reconnect() {
    let remote = Remote::start([]).await;
    let dir = TempDir::new().unwrap();
    let engine = http_engine(&dir, &remote.url, false);

    for amount in [10, 20, 30] {
        engine
            .enqueue(EntityKind::Transaction, &make_payload(amount))
            .await
            .unwrap();
    }
    assert_eq!(
        engine.sync_all().await.unwrap(),
        SyncOutcome::Skipped(super::engine::SkipReason::Offline)
    );
    assert!(remote.request_lines().is_empty());

    engine.monitor().set_online(true);
    let outcome = engine.sync_all().await.unwrap();

    assert!(matches!(outcome, SyncOutcome::Completed(ref r) if r.synced == 3 && r.purged == 3));
    assert_eq!(
        remote.request_lines(),
        vec!["POST /api/sync/transaction HTTP/1.1"; 3]
    );
    assert!(engine
        .store()
        .lock()
        .await
        .list_all(EntityKind::Transaction)
        .unwrap()
        .is_empty());
    assert_eq!(
        engine.snapshot().await.unwrap(),
        SyncStatusSnapshot {
            is_online: true,
            is_syncing: false,
            pending_count: 0
        }
    );
}

#[tokio::test]
async fn rejected_investment_stays_pending() {
    let remote = Remote::start([201, 422]).await;
    let dir = TempDir::new().unwrap();
    let engine = http_engine(&dir, &remote.url, true);

    let first = engine
        .enqueue(EntityKind::Investment, &make_payload(100))
        .await
        .unwrap();
    let second = engine
        .enqueue(EntityKind::Investment, &make_payload(200))
        .await
        .unwrap();

    let outcome = engine.sync_all().await.unwrap();

    let SyncOutcome::PartiallyFailed(report) = outcome else {
        panic!("expected PartiallyFailed, got {outcome:?}");
    };
    assert_eq!(report.synced, 1);
    assert_eq!(report.purged, 1);
    assert_eq!(report.rejected[0].id, second);

    let store = engine.store().lock().await;
    assert!(store.get(EntityKind::Investment, first).unwrap().is_none());
    let left = store.get(EntityKind::Investment, second).unwrap().unwrap();
    assert_eq!(left.sync_status, SyncStatus::Pending);
    assert_eq!(store.count_pending().unwrap(), 1);
}

#[tokio::test]
async fn unreachable_remote_loses_nothing_across_restart() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let dead_url = format!("http://{}", listener.local_addr().unwrap());
    drop(listener);
    let dir = TempDir::new().unwrap();

    {
        // The monitor is stale: it claims online but the remote is gone
        let engine = http_engine(&dir, &dead_url, true);
        engine
            .enqueue(EntityKind::Transaction, &make_payload(1))
            .await
            .unwrap();
        engine
            .enqueue(EntityKind::BalanceItem, &make_payload(2))
            .await
            .unwrap();

        let outcome = engine.sync_all().await.unwrap();
        assert!(matches!(outcome, SyncOutcome::Aborted { .. }));
    }

    let remote = Remote::start([]).await;
    let engine = http_engine(&dir, &remote.url, true);
    assert_eq!(engine.snapshot().await.unwrap().pending_count, 2);

    let outcome = engine.sync_all().await.unwrap();

    assert!(matches!(outcome, SyncOutcome::Completed(ref r) if r.synced == 2));
    assert_eq!(
        remote.request_lines(),
        vec![
            "POST /api/sync/transaction HTTP/1.1",
            "POST /api/sync/balance_item HTTP/1.1"
        ]
    );
    assert_eq!(engine.snapshot().await.unwrap().pending_count, 0);
}
