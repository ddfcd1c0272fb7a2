// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use tally_core::EntityKind;

/// Parse a string that must not be empty or whitespace-only.
fn non_empty_string(s: &str) -> Result<String, String> {
    if s.trim().is_empty() {
        Err("cannot be empty".to_string())
    } else {
        Ok(s.to_string())
    }
}

/// Output format for commands supporting structured output.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// Record kind as spelled on the command line.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum KindArg {
    Transaction,
    Investment,
    #[value(alias = "balance_item")]
    BalanceItem,
}

impl From<KindArg> for EntityKind {
    fn from(kind: KindArg) -> Self {
        match kind {
            KindArg::Transaction => EntityKind::Transaction,
            KindArg::Investment => EntityKind::Investment,
            KindArg::BalanceItem => EntityKind::BalanceItem,
        }
    }
}

#[derive(Parser)]
#[command(name = "tally")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Offline-first mutation queue that syncs to a remote service")]
#[command(
    long_about = "Offline-first mutation queue that syncs to a remote service.\n\n\
    Records are always written locally first and drained to the remote in the \
    background once it is reachable."
)]
pub struct Cli {
    /// Use <path> as the state directory
    #[arg(long = "state-dir", global = true, value_name = "path")]
    pub state_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Create the state directory, config and queue database
    #[command(after_help = "\
Examples:
  tally init                                   Use http://localhost:5000
  tally init --url https://sync.example.com    Use a custom remote")]
    Init {
        /// Remote base URL (http:// or https://)
        #[arg(long)]
        url: Option<String>,
    },

    /// Queue a record for delivery
    #[command(after_help = "\
Examples:
  tally add transaction '{\"amount\": 12.5, \"note\": \"lunch\"}'
  tally add balance-item '{\"name\": \"savings\", \"value\": 1000}'")]
    Add {
        /// Record kind
        #[arg(value_enum)]
        kind: KindArg,

        /// Record payload as a JSON object
        #[arg(value_parser = non_empty_string)]
        payload: String,
    },

    /// List queued records
    Pending {
        /// Only list records of this kind
        #[arg(value_enum)]
        kind: Option<KindArg>,

        /// Include records already synced but not yet purged
        #[arg(long)]
        all: bool,

        /// Output format
        #[arg(long, short, value_enum, default_value_t = OutputFormat::Text)]
        output: OutputFormat,
    },

    /// Show connectivity, sync activity and queue depth
    Status {
        /// Output format
        #[arg(long, short, value_enum, default_value_t = OutputFormat::Text)]
        output: OutputFormat,
    },

    /// Sync queued records now
    Sync,

    /// Keep syncing in the foreground until interrupted
    Run,
}

#[cfg(test)]
#[path = "cli_tests.rs"]
mod tests;
