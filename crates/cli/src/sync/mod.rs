// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Offline queue synchronization.
//!
//! Drains records queued in the [`RecordStore`](tally_core::RecordStore) to
//! the remote system whenever it is reachable.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────┐     ┌─────────────┐     ┌─────────────┐
//! │  SyncEngine  │────►│  Transport  │────►│   Remote    │
//! │ (Idle/Sync)  │◄────│   (trait)   │◄────│   Server    │
//! └──────────────┘     └─────────────┘     └─────────────┘
//!    ▲       │
//!    │       ▼
//! ┌──────────────┐     ┌──────────────┐
//! │ Connectivity │     │ RecordStore  │  (pending / synced)
//! │   Monitor    │     └──────────────┘
//! └──────────────┘            │
//!                             ▼
//!                     ┌──────────────┐
//!                     │StatusReporter│  (snapshots to subscribers)
//!                     └──────────────┘
//! ```
//!
//! # Features
//!
//! - HTTP delivery, one endpoint per entity kind
//! - Per-record rejection isolation, pass abort on transport failure
//! - Triggers on reconnect, on a periodic timer, and on demand
//! - At most one pass at a time
//! - Injectable transport trait for testing

mod connectivity;
mod engine;
mod status;
mod transport;

pub use connectivity::{
    probe_address, probe_reachable, spawn_reachability_watch, ConnectivityMonitor,
};
pub use engine::{
    EngineState, PassReport, Rejection, SharedStore, SkipReason, SyncConfig, SyncEngine,
    SyncOutcome,
};
pub use status::{StatusReporter, SyncStatusSnapshot};
pub use transport::{Delivery, HttpTransport, Transport, TransportError, TransportResult};

#[cfg(test)]
mod test_helpers;

#[cfg(test)]
mod connectivity_tests;


#[cfg(test)]
mod integration_tests;
