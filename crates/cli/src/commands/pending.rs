// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use std::path::Path;

use tally_core::{EntityKind, Record};

use super::open_store;
use crate::cli::OutputFormat;
use crate::error::Result;

pub fn run(
    state_dir: &Path,
    kind: Option<EntityKind>,
    all: bool,
    output: OutputFormat,
) -> Result<()> {
    let (store, _) = open_store(state_dir)?;
    let kinds = match kind {
        Some(kind) => vec![kind],
        None => EntityKind::ALL.to_vec(),
    };

    let mut records = Vec::new();
    for kind in kinds {
        if all {
            records.extend(store.list_all(kind)?);
        } else {
            records.extend(store.list_pending(kind)?);
        }
    }

    match output {
        OutputFormat::Text => {
            if records.is_empty() {
                println!("No pending records");
            }
            for record in &records {
                println!("{}", format_record_line(record));
            }
        }
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&records)?);
        }
    }
    Ok(())
}

/// Format a record as one line: `kind id status created payload`.
pub(crate) fn format_record_line(record: &Record) -> String {
    format!(
        "{:<12} {:>5}  {:<7}  {}  {}",
        record.kind.as_str(),
        record.id,
        record.sync_status.as_str(),
        record.created_at.format("%Y-%m-%d %H:%M:%S"),
        serde_json::Value::Object(record.payload.clone())
    )
}

#[cfg(test)]
#[path = "pending_tests.rs"]
mod tests;
