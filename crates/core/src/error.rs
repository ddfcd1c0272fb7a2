// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Error types for tally-core operations.

use thiserror::Error;

/// All possible errors that can occur in tally-core operations.
#[derive(Debug, Error)]
pub enum Error {
    /// The local store could not be read or written.
    #[error("storage unavailable: {0}")]
    StorageUnavailable(#[from] rusqlite::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid entity kind: '{0}'\n  hint: valid kinds are: transaction, investment, balance_item")]
    InvalidKind(String),

    #[error("invalid sync status: '{0}'\n  hint: valid statuses are: pending, synced")]
    InvalidSyncStatus(String),

    #[error("invalid payload: {0}\n  hint: a payload must be a JSON object")]
    InvalidPayload(String),

    #[error("corrupted data: {0}")]
    CorruptedData(String),
}

impl Error {
    /// Returns true if this error means the store itself failed.
    pub fn is_storage_unavailable(&self) -> bool {
        matches!(self, Error::StorageUnavailable(_))
    }
}

/// A specialized Result type for tally-core operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
