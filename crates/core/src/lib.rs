// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! tally-core: Shared library for the tally offline queue
//!
//! This crate provides the record data model, the error taxonomy, and the
//! SQLite-backed [`RecordStore`] that holds every mutation not yet confirmed
//! by the remote system.

pub mod clock;
pub mod error;
pub mod record;
pub mod store;

pub use clock::{Clock, SystemClock};
pub use error::{Error, Result};
pub use record::{payload_from_value, EntityKind, Payload, Record, SyncStatus};
pub use store::RecordStore;
