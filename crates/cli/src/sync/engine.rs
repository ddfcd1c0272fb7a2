// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Sync engine: drains the record store to the remote system.
//!
//! The engine is a two-state machine (`Idle`, `Syncing`). A pass walks every
//! [`EntityKind`] in fixed order, transmits each pending record, and marks it
//! synced on acknowledgment. A remote rejection only skips that record; a
//! transport failure aborts the pass and leaves everything unconfirmed
//! pending for the next trigger. Synced records are purged only after a pass
//! that saw no transport failure.

use std::fmt;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;

use tally_core::{EntityKind, Payload, Record, RecordStore, Result};

use super::connectivity::ConnectivityMonitor;
use super::status::{StatusReporter, SyncStatusSnapshot};
use super::transport::{Delivery, HttpTransport, Transport, TransportError, TransportResult};

/// Store handle shared between the engine, the reporter and enqueue callers.
pub type SharedStore = Arc<Mutex<RecordStore>>;

/// Configuration for the sync engine.
#[derive(Debug, Clone)]
pub struct SyncConfig {
    /// Period of the background trigger.
    pub interval: Duration,
    /// Upper bound on one transmission before it counts as a transport failure.
    pub request_timeout: Duration,
}

impl Default for SyncConfig {
    fn default() -> Self {
        SyncConfig {
            interval: Duration::from_secs(30),
            request_timeout: Duration::from_secs(30),
        }
    }
}

/// State of the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineState {
    Idle,
    Syncing,
}

/// Engine state visible to the engine and the status reporter.
///
/// The flag is checked-and-set atomically, so at most one pass runs.
#[derive(Debug, Default)]
pub struct SharedEngineState {
    syncing: AtomicBool,
}

impl SharedEngineState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Move `Idle -> Syncing`. Returns false if a pass is already running.
    pub fn try_begin(&self) -> bool {
        self.syncing
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }

    /// Move back to `Idle`.
    pub fn finish(&self) {
        self.syncing.store(false, Ordering::Release);
    }

    pub fn get(&self) -> EngineState {
        if self.is_syncing() {
            EngineState::Syncing
        } else {
            EngineState::Idle
        }
    }

    pub fn is_syncing(&self) -> bool {
        self.syncing.load(Ordering::Acquire)
    }
}

/// Returns the engine to `Idle` however the pass future ends, including drop.
struct PassGuard<'a>(&'a SharedEngineState);

impl Drop for PassGuard<'_> {
    fn drop(&mut self) {
        self.0.finish();
    }
}

/// Why a trigger did not start a pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// Another pass holds the engine.
    AlreadySyncing,
    /// The remote is unreachable.
    Offline,
}

/// A record the remote declined during a pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rejection {
    pub kind: EntityKind,
    pub id: i64,
    pub status: u16,
}

/// Counters collected over one pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PassReport {
    /// Records acknowledged and marked synced.
    pub synced: usize,
    /// Records the remote declined; they remain pending.
    pub rejected: Vec<Rejection>,
    /// Synced records deleted during cleanup.
    pub purged: usize,
}

/// Outcome of one trigger.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncOutcome {
    Skipped(SkipReason),
    /// Every pending record was accepted.
    Completed(PassReport),
    /// The pass finished but the remote rejected at least one record.
    PartiallyFailed(PassReport),
    /// A transport failure ended the pass early; nothing was purged.
    Aborted { report: PassReport, reason: String },
}

impl SyncOutcome {
    /// The pass report, if a pass ran.
    pub fn report(&self) -> Option<&PassReport> {
        match self {
            SyncOutcome::Skipped(_) => None,
            SyncOutcome::Completed(report)
            | SyncOutcome::PartiallyFailed(report)
            | SyncOutcome::Aborted { report, .. } => Some(report),
        }
    }

    /// Returns true if a pass ran to the end.
    pub fn ran_to_end(&self) -> bool {
        matches!(
            self,
            SyncOutcome::Completed(_) | SyncOutcome::PartiallyFailed(_)
        )
    }
}

impl fmt::Display for SyncOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SyncOutcome::Skipped(SkipReason::AlreadySyncing) => {
                write!(f, "skipped: a sync is already in progress")
            }
            SyncOutcome::Skipped(SkipReason::Offline) => write!(f, "cannot sync while offline"),
            SyncOutcome::Completed(report) => {
                write!(f, "all data synced ({} records)", report.synced)
            }
            SyncOutcome::PartiallyFailed(report) => write!(
                f,
                "synced {} records, {} rejected by the remote",
                report.synced,
                report.rejected.len()
            ),
            SyncOutcome::Aborted { report, reason } => write!(
                f,
                "sync aborted after {} records: {}; will retry automatically",
                report.synced, reason
            ),
        }
    }
}

/// Drains queued records to the remote system.
pub struct SyncEngine<T: Transport = HttpTransport> {
    config: SyncConfig,
    transport: T,
    store: SharedStore,
    monitor: Arc<ConnectivityMonitor>,
    state: Arc<SharedEngineState>,
    status: StatusReporter,
    passes: AtomicU64,
}

impl SyncEngine<HttpTransport> {
    /// Create an engine that posts to `base_url` over HTTP.
    pub fn new(
        config: SyncConfig,
        base_url: &str,
        store: SharedStore,
        monitor: Arc<ConnectivityMonitor>,
    ) -> TransportResult<Self> {
        let transport = HttpTransport::new(base_url, config.request_timeout)?;
        Ok(Self::with_transport(config, transport, store, monitor))
    }
}

impl<T: Transport> SyncEngine<T> {
    /// Create an engine with a custom transport (for testing).
    pub fn with_transport(
        config: SyncConfig,
        transport: T,
        store: SharedStore,
        monitor: Arc<ConnectivityMonitor>,
    ) -> Self {
        let state = Arc::new(SharedEngineState::new());
        let status = StatusReporter::new(Arc::clone(&store), Arc::clone(&monitor), Arc::clone(&state));
        SyncEngine {
            config,
            transport,
            store,
            monitor,
            state,
            status,
            passes: AtomicU64::new(0),
        }
    }

    pub fn state(&self) -> EngineState {
        self.state.get()
    }

    pub fn is_syncing(&self) -> bool {
        self.state.is_syncing()
    }

    pub fn monitor(&self) -> &Arc<ConnectivityMonitor> {
        &self.monitor
    }

    pub fn store(&self) -> &SharedStore {
        &self.store
    }

    /// Number of passes that actually started.
    pub fn passes_run(&self) -> u64 {
        self.passes.load(Ordering::Acquire)
    }

    /// Current status snapshot.
    pub async fn snapshot(&self) -> Result<SyncStatusSnapshot> {
        self.status.snapshot().await
    }

    /// Register a status subscriber.
    pub fn on_status_change(&self, callback: impl Fn(&SyncStatusSnapshot) + Send + Sync + 'static) {
        self.status.on_status_change(callback);
    }

    /// Queue a record for delivery, whatever the connectivity.
    pub async fn enqueue(&self, kind: EntityKind, payload: &Payload) -> Result<i64> {
        let id = self.store.lock().await.enqueue(kind, payload)?;
        tracing::debug!("queued {} {}", kind, id);
        self.status.publish().await;
        Ok(id)
    }

    /// User-initiated sync. Refused while offline.
    pub async fn manual_sync(&self) -> Result<SyncOutcome> {
        if !self.monitor.is_online() {
            tracing::warn!("cannot sync while offline");
            return Ok(SyncOutcome::Skipped(SkipReason::Offline));
        }
        tracing::info!("starting manual sync");
        self.sync_all().await
    }

    /// Run one pass over every kind unless offline or already syncing.
    ///
    /// Storage failures are returned as errors; transport failures and remote
    /// rejections are folded into the outcome.
    pub async fn sync_all(&self) -> Result<SyncOutcome> {
        if !self.monitor.is_online() {
            return Ok(SyncOutcome::Skipped(SkipReason::Offline));
        }
        if !self.state.try_begin() {
            tracing::debug!("sync already in progress, ignoring trigger");
            return Ok(SyncOutcome::Skipped(SkipReason::AlreadySyncing));
        }
        let guard = PassGuard(&self.state);
        self.passes.fetch_add(1, Ordering::AcqRel);
        self.status.publish().await;

        let result = self.run_pass().await;

        drop(guard);
        self.status.publish().await;

        match &result {
            Ok(outcome @ SyncOutcome::Completed(_)) => tracing::info!("sync completed: {}", outcome),
            Ok(outcome @ SyncOutcome::PartiallyFailed(_)) => {
                tracing::warn!("sync finished with rejections: {}", outcome)
            }
            Ok(outcome) => tracing::warn!("{}", outcome),
            Err(e) if e.is_storage_unavailable() => {
                tracing::error!("local store unavailable, sync stopped: {}", e)
            }
            Err(e) => tracing::error!("sync failed: {}", e),
        }
        result
    }

    async fn run_pass(&self) -> Result<SyncOutcome> {
        let mut report = PassReport::default();

        for kind in EntityKind::ALL {
            if let Err(e) = self.sync_kind(kind, &mut report).await? {
                return Ok(SyncOutcome::Aborted {
                    report,
                    reason: e.to_string(),
                });
            }
        }

        self.cleanup_synced(&mut report).await?;

        if report.rejected.is_empty() {
            Ok(SyncOutcome::Completed(report))
        } else {
            Ok(SyncOutcome::PartiallyFailed(report))
        }
    }

    /// Sync every pending record of one kind.
    ///
    /// The inner result is `Err` when a transport failure should abort the pass.
    async fn sync_kind(
        &self,
        kind: EntityKind,
        report: &mut PassReport,
    ) -> Result<std::result::Result<(), TransportError>> {
        let pending = self.store.lock().await.list_pending(kind)?;
        if pending.is_empty() {
            return Ok(Ok(()));
        }

        tracing::info!("syncing {} {} records", pending.len(), kind);

        for record in pending {
            match self.transmit(&record).await? {
                Ok(delivery) if delivery.is_accepted() => {
                    self.store.lock().await.mark_synced(kind, record.id)?;
                    report.synced += 1;
                    self.status.publish().await;
                }
                Ok(delivery) => {
                    let status = delivery.status();
                    tracing::warn!("remote rejected {} {} (status {})", kind, record.id, status);
                    report.rejected.push(Rejection {
                        kind,
                        id: record.id,
                        status,
                    });
                }
                Err(e) => {
                    tracing::warn!("transport failure syncing {} {}: {}", kind, record.id, e);
                    return Ok(Err(e));
                }
            }
        }
        Ok(Ok(()))
    }

    /// Transmit one record, bounding the wait by the request timeout.
    async fn transmit(&self, record: &Record) -> Result<TransportResult<Delivery>> {
        let body = record.to_wire()?;
        let timeout = self.config.request_timeout;
        Ok(
            match tokio::time::timeout(timeout, self.transport.post(record.kind, body)).await {
                Ok(delivery) => delivery,
                Err(_) => Err(TransportError::Timeout(timeout)),
            },
        )
    }

    async fn cleanup_synced(&self, report: &mut PassReport) -> Result<()> {
        for kind in EntityKind::ALL {
            let purged = self.store.lock().await.purge_synced(kind)?;
            if purged > 0 {
                tracing::debug!("purged {} synced {} records", purged, kind);
                report.purged += purged;
                self.status.publish().await;
            }
        }
        Ok(())
    }

    /// Drive the engine until `shutdown` is cancelled.
    ///
    /// Triggers a pass at startup when online, on every transition to online,
    /// and on each tick of the periodic timer while online and idle.
    pub async fn run(self: Arc<Self>, shutdown: CancellationToken) {
        let mut online_rx = self.monitor.subscribe();
        let mut ticker = tokio::time::interval(self.config.interval);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
        // The first tick completes immediately; the startup sync covers it.
        ticker.tick().await;

        if self.monitor.is_online() {
            self.trigger().await;
        }
        self.status.publish().await;

        loop {
            tokio::select! {
                _ = shutdown.cancelled() => break,
                _ = ticker.tick() => {
                    if self.monitor.is_online() && !self.is_syncing() {
                        self.trigger().await;
                    }
                }
                changed = online_rx.changed() => {
                    if changed.is_err() {
                        break;
                    }
                    let online = *online_rx.borrow_and_update();
                    if online {
                        tracing::info!("connection restored, syncing offline data");
                        self.status.publish().await;
                        self.trigger().await;
                    } else {
                        tracing::info!("connection lost, entering offline mode");
                        self.status.publish().await;
                    }
                }
            }
        }
        tracing::info!("sync engine stopped");
    }

    async fn trigger(&self) {
        // Outcomes are logged by sync_all; storage errors are retried on the next trigger.
        let _ = self.sync_all().await;
    }
}
