// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! kvs-storage: transaction log backends
//!
//! ```text
//! TransactionLog<J> ── queue, sequencing, phases, error cell
//!        │
//!        ├── FileJournal    tab-separated records in an append-only file
//!        └── SqliteJournal  one row per event in a SQLite table
//! ```

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

mod file;
mod journal;
pub mod record;
mod sqlite;
mod transaction_log;

pub use file::{FileJournal, FileTransactionLogger};
pub use journal::Journal;
pub use sqlite::{SqliteJournal, SqliteTransactionLogger, DEFAULT_TABLE};
pub use transaction_log::TransactionLog;
