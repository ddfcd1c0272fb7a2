// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! One-shot status: probe the remote, then report the snapshot.

use std::path::Path;

use super::{connect_engine, runtime};
use crate::cli::OutputFormat;
use crate::config::load_initialized;
use crate::error::Result;

pub fn run(state_dir: &Path, output: OutputFormat) -> Result<()> {
    let config = load_initialized(state_dir)?;
    let rt = runtime()?;

    let snapshot = rt.block_on(async {
        let engine = connect_engine(state_dir, &config).await?;
        Ok::<_, crate::error::Error>(engine.snapshot().await?)
    })?;

    match output {
        OutputFormat::Text => {
            println!("Status: {}", snapshot);
            println!("Remote: {}", config.remote.url);
            println!("Pending: {}", snapshot.pending_count);
        }
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&snapshot)?);
        }
    }
    Ok(())
}
