// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use std::path::Path;

use tally_core::{payload_from_value, EntityKind, Payload};

use super::open_store;
use crate::error::{Error, Result};

pub fn run(state_dir: &Path, kind: EntityKind, payload: &str) -> Result<()> {
    let payload = parse_payload(payload)?;
    let (store, _) = open_store(state_dir)?;
    let id = store.enqueue(kind, &payload)?;
    println!("Queued {} {}", kind, id);
    Ok(())
}

/// Parse a command-line payload, which must be a JSON object.
pub(crate) fn parse_payload(input: &str) -> Result<Payload> {
    let value: serde_json::Value = serde_json::from_str(input)
        .map_err(|e| Error::InvalidInput(format!("invalid JSON payload: {}", e)))?;
    Ok(payload_from_value(value)?)
}

#[cfg(test)]
#[path = "add_tests.rs"]
mod tests;
