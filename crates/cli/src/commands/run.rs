// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Foreground sync loop.
//!
//! Holds the engine lock, polls reachability in the background and lets the
//! engine drain the queue on every reconnect and timer tick until Ctrl-C.

use std::path::Path;
use std::sync::{Arc, Mutex};

use tokio_util::sync::CancellationToken;

use super::{acquire_lock, connect_engine, runtime};
use crate::config::{load_initialized, lock_path, log_path, Config};
use crate::error::Result;
use crate::logging;
use crate::sync::{spawn_reachability_watch, SyncStatusSnapshot};

pub fn run(state_dir: &Path) -> Result<()> {
    let config = load_initialized(state_dir)?;
    logging::init_file(&log_path(state_dir));

    let lock_file = acquire_lock(&lock_path(state_dir))?;
    tracing::info!("tally run starting, state_dir={}", state_dir.display());

    let rt = runtime()?;
    let result = rt.block_on(run_async(state_dir, &config));

    drop(lock_file);
    tracing::info!("tally run stopped");
    result
}

async fn run_async(state_dir: &Path, config: &Config) -> Result<()> {
    let remote = &config.remote;
    let engine = Arc::new(connect_engine(state_dir, config).await?);

    // Print only when the visible status actually changes
    let last: Mutex<Option<SyncStatusSnapshot>> = Mutex::new(None);
    engine.on_status_change(move |snapshot| {
        let mut last = last.lock().unwrap_or_else(|e| e.into_inner());
        if last.as_ref() != Some(snapshot) {
            println!("{}", snapshot);
            *last = Some(*snapshot);
        }
    });

    let shutdown = CancellationToken::new();
    let watch = spawn_reachability_watch(
        Arc::clone(engine.monitor()),
        remote.url.clone(),
        remote.probe_interval(),
        remote.probe_timeout(),
        shutdown.clone(),
    );
    let runner = tokio::spawn(Arc::clone(&engine).run(shutdown.clone()));

    println!("Syncing to {} (Ctrl-C to stop)", remote.url);

    let signal = tokio::signal::ctrl_c().await;
    tracing::info!("shutdown requested");
    shutdown.cancel();

    if let Err(e) = watch.await {
        tracing::warn!("reachability watch ended abnormally: {}", e);
    }
    if let Err(e) = runner.await {
        tracing::warn!("sync engine ended abnormally: {}", e);
    }
    signal?;
    Ok(())
}
