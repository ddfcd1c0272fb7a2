// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Online/offline tracking.
//!
//! The monitor is fed by an environment signal (a TCP reachability probe in
//! [`spawn_reachability_watch`]) and notifies observers only on real
//! transitions. Redundant same-state signals are swallowed.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::net::TcpStream;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// Callback invoked on a connectivity transition.
pub type TransitionCallback = Box<dyn Fn() + Send + Sync>;

/// Tracks whether the remote is reachable.
pub struct ConnectivityMonitor {
    state: watch::Sender<bool>,
    on_online: Mutex<Vec<TransitionCallback>>,
    on_offline: Mutex<Vec<TransitionCallback>>,
}

impl ConnectivityMonitor {
    /// Create a monitor seeded with the current reachability.
    pub fn new(initially_online: bool) -> Self {
        let (state, _) = watch::channel(initially_online);
        ConnectivityMonitor {
            state,
            on_online: Mutex::new(Vec::new()),
            on_offline: Mutex::new(Vec::new()),
        }
    }

    /// Current connectivity.
    pub fn is_online(&self) -> bool {
        *self.state.borrow()
    }

    /// Record a reachability signal from the environment.
    ///
    /// Returns true if this signal was a transition. Callbacks for the new
    /// direction run once per transition, in registration order.
    pub fn set_online(&self, online: bool) -> bool {
        let changed = self.state.send_if_modified(|current| {
            if *current == online {
                false
            } else {
                *current = online;
                true
            }
        });

        if changed {
            let callbacks = if online {
                &self.on_online
            } else {
                &self.on_offline
            };
            let callbacks = callbacks.lock().unwrap_or_else(|e| e.into_inner());
            for callback in callbacks.iter() {
                callback();
            }
        }
        changed
    }

    /// Register a callback for offline -> online transitions.
    pub fn on_transition_to_online(&self, callback: impl Fn() + Send + Sync + 'static) {
        self.on_online
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(Box::new(callback));
    }

    /// Register a callback for online -> offline transitions.
    pub fn on_transition_to_offline(&self, callback: impl Fn() + Send + Sync + 'static) {
        self.on_offline
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(Box::new(callback));
    }

    /// Watch channel that changes on every transition.
    pub fn subscribe(&self) -> watch::Receiver<bool> {
        self.state.subscribe()
    }
}

/// Derive the `host:port` a reachability probe should dial.
pub fn probe_address(url: &str) -> Option<String> {
    let parsed = reqwest::Url::parse(url).ok()?;
    let host = parsed.host_str()?;
    let port = parsed.port_or_known_default()?;
    Some(format!("{host}:{port}"))
}

/// Probe whether the remote accepts TCP connections within `timeout`.
pub async fn probe_reachable(url: &str, timeout: Duration) -> bool {
    let Some(addr) = probe_address(url) else {
        tracing::warn!("cannot probe unparseable remote url {}", url);
        return false;
    };

    matches!(
        tokio::time::timeout(timeout, TcpStream::connect(&addr)).await,
        Ok(Ok(_))
    )
}

/// Poll reachability in the background and feed the monitor until cancelled.
pub fn spawn_reachability_watch(
    monitor: Arc<ConnectivityMonitor>,
    url: String,
    interval: Duration,
    timeout: Duration,
    shutdown: CancellationToken,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                _ = shutdown.cancelled() => break,
                _ = ticker.tick() => {
                    let online = probe_reachable(&url, timeout).await;
                    if monitor.set_online(online) {
                        tracing::debug!("reachability of {} changed: online={}", url, online);
                    }
                }
            }
        }
    })
}
