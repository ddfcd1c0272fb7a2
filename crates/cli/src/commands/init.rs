// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use std::path::Path;

use tally_core::RecordStore;

use crate::config::{db_path, init_state_dir, DEFAULT_REMOTE_URL};
use crate::error::Result;

pub fn run(state_dir: &Path, url: Option<&str>) -> Result<()> {
    let config = init_state_dir(state_dir, url.unwrap_or(DEFAULT_REMOTE_URL))?;

    // Create the database and its schema up front
    RecordStore::open(&db_path(state_dir))?;

    println!("Initialized tally at {}", state_dir.display());
    println!("Remote: {}", config.remote.url);
    Ok(())
}
