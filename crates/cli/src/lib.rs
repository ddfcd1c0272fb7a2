// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! tallyrs - Offline-first mutation queue with background sync.
//!
//! This crate provides the `tally` CLI: it queues records locally with
//! [`tally_core::RecordStore`] and drains them to a remote HTTP service with
//! the [`sync::SyncEngine`] once the remote is reachable.
//!
//! # Main Components
//!
//! - [`sync`] - Connectivity monitor, sync engine, status reporter and transport
//! - [`config`] - State directory resolution and `config.toml`
//! - [`Error`] - Error types for all CLI operations
//!
//! # Embedding the engine
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use tallyrs::sync::{ConnectivityMonitor, SyncConfig, SyncEngine};
//!
//! let store = Arc::new(tokio::sync::Mutex::new(RecordStore::open(&db_path)?));
//! let monitor = Arc::new(ConnectivityMonitor::new(true));
//! let engine = Arc::new(SyncEngine::new(SyncConfig::default(), url, store, monitor)?);
//! engine.on_status_change(|status| println!("{status}"));
//! tokio::spawn(Arc::clone(&engine).run(shutdown));
//! ```

mod cli;
mod commands;
mod env;
mod logging;

pub mod config;
pub mod error;
pub mod sync;

pub use cli::{Cli, Command, KindArg, OutputFormat};
pub use config::{Config, RemoteConfig};
pub use error::{Error, Result};

/// Execute a parsed CLI invocation. This is the main entry point for library
/// users and provides a testable way to run commands without process execution.
pub fn run(cli: Cli) -> Result<()> {
    let state_dir = config::resolve_state_dir(cli.state_dir.as_deref());

    if !matches!(cli.command, Command::Run) {
        logging::init_stderr();
    }

    match cli.command {
        Command::Init { url } => commands::init::run(&state_dir, url.as_deref()),
        Command::Add { kind, payload } => commands::add::run(&state_dir, kind.into(), &payload),
        Command::Pending { kind, all, output } => {
            commands::pending::run(&state_dir, kind.map(Into::into), all, output)
        }
        Command::Status { output } => commands::status::run(&state_dir, output),
        Command::Sync => commands::sync::run(&state_dir),
        Command::Run => commands::run::run(&state_dir),
    }
}
