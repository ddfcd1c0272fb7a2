// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Tests for the connectivity module.

#![allow(clippy::unwrap_used)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use yare::parameterized;

use super::connectivity::{
    probe_address, probe_reachable, spawn_reachability_watch, ConnectivityMonitor,
};

fn counter() -> (Arc<AtomicUsize>, impl Fn() + Send + Sync + 'static) {
    let count = Arc::new(AtomicUsize::new(0));
    let handle = Arc::clone(&count);
    (count, move || {
        handle.fetch_add(1, Ordering::SeqCst);
    })
}

#[test]
fn new_monitor_reports_seeded_state() {
    assert!(ConnectivityMonitor::new(true).is_online());
    assert!(!ConnectivityMonitor::new(false).is_online());
}

#[test]
fn callbacks_fire_once_per_transition() {
    let monitor = ConnectivityMonitor::new(false);
    let (online_count, on_online) = counter();
    let (offline_count, on_offline) = counter();
    monitor.on_transition_to_online(on_online);
    monitor.on_transition_to_offline(on_offline);

    assert!(monitor.set_online(true));
    assert!(monitor.is_online());
    assert!(monitor.set_online(false));
    assert!(monitor.set_online(true));

    assert_eq!(online_count.load(Ordering::SeqCst), 2);
    assert_eq!(offline_count.load(Ordering::SeqCst), 1);
}

#[test]
fn redundant_signals_are_swallowed() {
    let monitor = ConnectivityMonitor::new(true);
    let (online_count, on_online) = counter();
    let (offline_count, on_offline) = counter();
    monitor.on_transition_to_online(on_online);
    monitor.on_transition_to_offline(on_offline);

    assert!(!monitor.set_online(true));
    assert!(!monitor.set_online(true));
    assert!(monitor.set_online(false));
    assert!(!monitor.set_online(false));

    assert_eq!(online_count.load(Ordering::SeqCst), 0);
    assert_eq!(offline_count.load(Ordering::SeqCst), 1);
}

#[test]
fn callbacks_run_in_registration_order() {
    let monitor = ConnectivityMonitor::new(false);
    let order = Arc::new(std::sync::Mutex::new(Vec::new()));
    for i in 0..3 {
        let order = Arc::clone(&order);
        monitor.on_transition_to_online(move || order.lock().unwrap().push(i));
    }

    monitor.set_online(true);

    assert_eq!(*order.lock().unwrap(), vec![0, 1, 2]);
}

#[tokio::test]
async fn subscribers_observe_transitions_only() {
    let monitor = ConnectivityMonitor::new(false);
    let mut rx = monitor.subscribe();

    monitor.set_online(false);
    assert!(!rx.has_changed().unwrap());

    monitor.set_online(true);
    assert!(rx.has_changed().unwrap());
    rx.changed().await.unwrap();
    assert!(*rx.borrow_and_update());
}

#[parameterized(
    http_default_port = { "http://example.com", Some("example.com:80") },
    https_default_port = { "https://example.com/api", Some("example.com:443") },
    explicit_port = { "http://localhost:5000", Some("localhost:5000") },
    ip_with_path = { "http://127.0.0.1:8080/base/", Some("127.0.0.1:8080") },
    not_a_url = { "localhost:5000", None },
    garbage = { "::::", None },
)]
fn probe_address_from_url(url: &str, expected: Option<&str>) {
    assert_eq!(probe_address(url).as_deref(), expected);
}

#[tokio::test]
async fn probe_reachable_detects_listener() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let url = format!("http://{}", listener.local_addr().unwrap());

    assert!(probe_reachable(&url, Duration::from_secs(2)).await);

    drop(listener);
    assert!(!probe_reachable(&url, Duration::from_secs(2)).await);
}

#[tokio::test]
async fn probe_reachable_rejects_unparseable_url() {
    assert!(!probe_reachable("not a url", Duration::from_millis(100)).await);
}

#[tokio::test]
async fn reachability_watch_feeds_monitor() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let url = format!("http://{}", listener.local_addr().unwrap());
    let monitor = Arc::new(ConnectivityMonitor::new(false));
    let mut rx = monitor.subscribe();
    let shutdown = CancellationToken::new();

    let handle = spawn_reachability_watch(
        Arc::clone(&monitor),
        url,
        Duration::from_millis(20),
        Duration::from_secs(1),
        shutdown.clone(),
    );

    tokio::time::timeout(Duration::from_secs(5), rx.changed())
        .await
        .unwrap()
        .unwrap();
    assert!(monitor.is_online());

    shutdown.cancel();
    handle.await.unwrap();
}
