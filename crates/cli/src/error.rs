// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use thiserror::Error;

use crate::sync::TransportError;

/// All possible errors that can occur in the tally CLI.
///
/// Errors provide user-friendly messages with hints for common issues.
#[derive(Debug, Error)]
pub enum Error {
    #[error("not initialized at {0}\n  hint: run 'tally init' first")]
    NotInitialized(String),

    #[error("already initialized at {0}")]
    AlreadyInitialized(String),

    #[error(transparent)]
    Core(#[from] tally_core::Error),

    #[error("transport error: {0}")]
    Transport(#[from] TransportError),

    #[error("sync incomplete: {0}")]
    SyncIncomplete(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("config error: {0}")]
    Config(String),

    #[error("failed to parse config: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("failed to serialize config: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    #[error("{0}")]
    InvalidInput(String),
}

/// A specialized Result type for tally CLI operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
