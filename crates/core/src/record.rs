// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Record types for the offline queue.
//!
//! A [`Record`] is one queued mutation: an opaque JSON payload of a given
//! [`EntityKind`], plus the local metadata the sync engine needs.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::str::FromStr;

use crate::error::{Error, Result};

/// Application fields of a record. Never inspected by the queue.
pub type Payload = Map<String, Value>;

/// The closed set of entity kinds the remote system accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    /// Income or expense entry.
    Transaction,
    /// Portfolio position.
    Investment,
    /// Asset or liability line on the balance sheet.
    BalanceItem,
}

impl EntityKind {
    /// All kinds, in the order a sync pass drains them.
    pub const ALL: [EntityKind; 3] = [
        EntityKind::Transaction,
        EntityKind::Investment,
        EntityKind::BalanceItem,
    ];

    /// Returns the string representation used in storage, URLs and display.
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityKind::Transaction => "transaction",
            EntityKind::Investment => "investment",
            EntityKind::BalanceItem => "balance_item",
        }
    }

    /// Name of the store partition (table) holding this kind.
    pub fn table(&self) -> &'static str {
        match self {
            EntityKind::Transaction => "transactions",
            EntityKind::Investment => "investments",
            EntityKind::BalanceItem => "balance_items",
        }
    }

    /// Remote endpoint path, relative to the server base URL.
    pub fn endpoint(&self) -> String {
        format!("/api/sync/{}", self.as_str())
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for EntityKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().replace('-', "_").as_str() {
            "transaction" | "transactions" => Ok(EntityKind::Transaction),
            "investment" | "investments" => Ok(EntityKind::Investment),
            "balance_item" | "balance_items" => Ok(EntityKind::BalanceItem),
            _ => Err(Error::InvalidKind(s.to_string())),
        }
    }
}

/// Synchronization status of a record.
///
/// The only legal transition is `Pending -> Synced`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncStatus {
    /// Not yet acknowledged by the remote system.
    Pending,
    /// Acknowledged by the remote system, awaiting purge.
    Synced,
}

impl SyncStatus {
    /// Returns the string representation used in storage and display.
    pub fn as_str(&self) -> &'static str {
        match self {
            SyncStatus::Pending => "pending",
            SyncStatus::Synced => "synced",
        }
    }
}

impl fmt::Display for SyncStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for SyncStatus {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "pending" => Ok(SyncStatus::Pending),
            "synced" => Ok(SyncStatus::Synced),
            _ => Err(Error::InvalidSyncStatus(s.to_string())),
        }
    }
}

/// One queued mutation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    /// Locally unique, monotonic identifier within the kind's partition.
    pub id: i64,
    pub kind: EntityKind,
    pub payload: Payload,
    pub sync_status: SyncStatus,
    pub created_at: DateTime<Utc>,
}

/// Request body sent to the remote: the payload flattened with local metadata.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct WireBody<'a> {
    #[serde(flatten)]
    payload: &'a Payload,
    id: i64,
    kind: EntityKind,
    sync_status: SyncStatus,
    timestamp: String,
}

impl Record {
    /// Returns true if the remote has not yet acknowledged this record.
    pub fn is_pending(&self) -> bool {
        self.sync_status == SyncStatus::Pending
    }

    /// Builds the JSON body transmitted to the kind's sync endpoint.
    ///
    /// Metadata keys override payload keys of the same name.
    pub fn to_wire(&self) -> Result<Value> {
        let mut payload = self.payload.clone();
        for key in ["id", "kind", "syncStatus", "timestamp"] {
            payload.remove(key);
        }
        let body = WireBody {
            payload: &payload,
            id: self.id,
            kind: self.kind,
            sync_status: self.sync_status,
            timestamp: self.created_at.to_rfc3339(),
        };
        Ok(serde_json::to_value(body)?)
    }
}

/// Converts an arbitrary JSON value into a payload, rejecting non-objects.
pub fn payload_from_value(value: Value) -> Result<Payload> {
    match value {
        Value::Object(map) => Ok(map),
        other => Err(Error::InvalidPayload(format!(
            "expected object, got {}",
            json_type_name(&other)
        ))),
    }
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
#[path = "record_tests.rs"]
mod tests;
