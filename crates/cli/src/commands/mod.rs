// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

pub mod add;
pub mod init;
pub mod pending;
pub mod run;
pub mod status;
pub mod sync;

use std::fs::{File, OpenOptions};
use std::path::Path;
use std::sync::Arc;

use tally_core::RecordStore;

use crate::config::{db_path, load_initialized, Config};
use crate::error::{Error, Result};
use crate::sync::{probe_reachable, ConnectivityMonitor, SyncEngine};

/// Helper to open the record store of an initialized state directory.
pub fn open_store(state_dir: &Path) -> Result<(RecordStore, Config)> {
    let config = load_initialized(state_dir)?;
    let store = RecordStore::open(&db_path(state_dir))?;
    Ok((store, config))
}

/// Create the tokio runtime for commands that talk to the remote.
pub fn runtime() -> Result<tokio::runtime::Runtime> {
    tokio::runtime::Runtime::new()
        .map_err(|e| Error::Io(std::io::Error::other(format!("tokio: {}", e))))
}

/// Take the exclusive engine lock for a state directory.
///
/// Only one engine may drain a given store at a time.
pub fn acquire_lock(lock_path: &Path) -> Result<File> {
    use fs2::FileExt;

    let file = OpenOptions::new()
        .create(true)
        .write(true)
        .truncate(true)
        .open(lock_path)?;
    file.try_lock_exclusive().map_err(|_| {
        Error::Io(std::io::Error::other(
            "another tally engine is already running for this state directory",
        ))
    })?;
    Ok(file)
}

/// Probe the remote once and build an engine seeded with the result.
pub async fn connect_engine(state_dir: &Path, config: &Config) -> Result<SyncEngine> {
    let remote = &config.remote;
    let online = probe_reachable(&remote.url, remote.probe_timeout()).await;
    tracing::debug!("initial probe of {}: online={}", remote.url, online);

    let store = RecordStore::open(&db_path(state_dir))?;
    let monitor = Arc::new(ConnectivityMonitor::new(online));
    let engine = SyncEngine::new(
        remote.sync_config(),
        &remote.url,
        Arc::new(tokio::sync::Mutex::new(store)),
        monitor,
    )?;
    Ok(engine)
}

#[cfg(test)]
#[path = "mod_tests.rs"]
mod tests;
