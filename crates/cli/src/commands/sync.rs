// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! One-shot manual sync.

use std::path::Path;

use super::{acquire_lock, connect_engine, runtime};
use crate::config::{load_initialized, lock_path};
use crate::error::{Error, Result};
use crate::sync::SyncOutcome;

pub fn run(state_dir: &Path) -> Result<()> {
    let config = load_initialized(state_dir)?;
    let _lock = acquire_lock(&lock_path(state_dir))?;
    let rt = runtime()?;

    let outcome = rt.block_on(async {
        let engine = connect_engine(state_dir, &config).await?;
        Ok::<_, Error>(engine.manual_sync().await?)
    })?;

    report(&outcome)
}

/// Print the outcome; anything short of a finished pass is an error.
fn report(outcome: &SyncOutcome) -> Result<()> {
    if !outcome.ran_to_end() {
        return Err(Error::SyncIncomplete(outcome.to_string()));
    }

    println!("{}", outcome);
    if let Some(report) = outcome.report() {
        for rejection in &report.rejected {
            println!(
                "  rejected: {} {} (status {})",
                rejection.kind, rejection.id, rejection.status
            );
        }
        if report.purged > 0 {
            println!("Purged {} synced records", report.purged);
        }
    }
    Ok(())
}

#[cfg(test)]
#[path = "sync_tests.rs"]
mod tests;
