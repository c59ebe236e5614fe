// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Error types for the transaction log and the key-value store

use crate::logger::Phase;
use thiserror::Error;

/// Errors raised by a transaction log backend
///
/// Every variant except the lifecycle and validation errors is fatal: the
/// backend stops and the owning process must not keep accepting writes.
#[derive(Debug, Error)]
pub enum LogError {
    #[error("cannot open transaction log {target}: {reason}")]
    Open { target: String, reason: String },
    #[error("input parse error at record {record}: {reason}")]
    Parse { record: u64, reason: String },
    #[error("transaction numbers out of sequence: {found} after {last}")]
    OutOfSequence { last: u64, found: u64 },
    #[error("transaction log read failure: {0}")]
    Read(#[source] std::io::Error),
    #[error("transaction log write failure: {0}")]
    Write(#[source] std::io::Error),
    #[error("database error: {0}")]
    Database(String),
    #[error("cannot {operation} while transaction log is {phase}")]
    Phase {
        operation: &'static str,
        phase: Phase,
    },
    #[error("invalid event: {0}")]
    InvalidEvent(String),
    #[error("transaction log writer has stopped")]
    WriterStopped,
    #[error("replay abandoned by consumer")]
    ReplayAbandoned,
}

/// Errors raised by the in-memory key-value store
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("no such key")]
    NoSuchKey,
}
