// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Aggregated sync status for presentation layers.

use std::fmt;
use std::sync::Arc;

use serde::Serialize;
use tokio::sync::Mutex;

use tally_core::RecordStore;

use super::connectivity::ConnectivityMonitor;
use super::engine::SharedEngineState;

/// Point-in-time view of connectivity, engine activity and queue depth.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncStatusSnapshot {
    pub is_online: bool,
    pub is_syncing: bool,
    pub pending_count: usize,
}

impl fmt::Display for SyncStatusSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.is_online, self.is_syncing, self.pending_count) {
            (false, _, 0) => write!(f, "offline"),
            (false, _, n) => write!(f, "offline ({n} pending)"),
            (true, true, _) => write!(f, "online, syncing"),
            (true, false, 0) => write!(f, "online, synced"),
            (true, false, n) => write!(f, "online ({n} pending)"),
        }
    }
}

/// Subscriber callback for published snapshots.
pub type StatusCallback = Box<dyn Fn(&SyncStatusSnapshot) + Send + Sync>;

/// Computes snapshots and delivers them to subscribers.
pub struct StatusReporter {
    store: Arc<Mutex<RecordStore>>,
    monitor: Arc<ConnectivityMonitor>,
    state: Arc<SharedEngineState>,
    subscribers: std::sync::Mutex<Vec<StatusCallback>>,
    /// Held from snapshot to delivery so subscribers see publication order.
    publishing: Mutex<()>,
}

impl StatusReporter {
    pub fn new(
        store: Arc<Mutex<RecordStore>>,
        monitor: Arc<ConnectivityMonitor>,
        state: Arc<SharedEngineState>,
    ) -> Self {
        StatusReporter {
            store,
            monitor,
            state,
            subscribers: std::sync::Mutex::new(Vec::new()),
            publishing: Mutex::new(()),
        }
    }

    /// Derive a fresh snapshot.
    pub async fn snapshot(&self) -> tally_core::Result<SyncStatusSnapshot> {
        let pending_count = self.store.lock().await.count_pending()?;
        Ok(SyncStatusSnapshot {
            is_online: self.monitor.is_online(),
            is_syncing: self.state.is_syncing(),
            pending_count,
        })
    }

    /// Register a subscriber. Callbacks must not register further subscribers.
    pub fn on_status_change(&self, callback: impl Fn(&SyncStatusSnapshot) + Send + Sync + 'static) {
        self.subscribers
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(Box::new(callback));
    }

    /// Recompute the snapshot and deliver it to every subscriber in order.
    ///
    /// A failed count skips this publication; status never drives correctness.
    pub async fn publish(&self) -> Option<SyncStatusSnapshot> {
        let _publishing = self.publishing.lock().await;
        let snapshot = match self.snapshot().await {
            Ok(snapshot) => snapshot,
            Err(e) => {
                tracing::warn!("failed to compute sync status: {}", e);
                return None;
            }
        };

        let subscribers = self.subscribers.lock().unwrap_or_else(|e| e.into_inner());
        for callback in subscribers.iter() {
            callback(&snapshot);
        }
        Some(snapshot)
    }
}
