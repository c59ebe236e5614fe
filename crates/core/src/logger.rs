// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Capability contract shared by every transaction log backend
//!
//! ```text
//! write_put / write_delete → intake queue (16) → writer task → backend
//!                                                    ↓ (fatal)
//!                                                  err()
//!
//! backend → replay task → read_events() → bootstrap → Store
//! ```

use crate::error::LogError;
use crate::event::Event;
use async_trait::async_trait;
use std::fmt;
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot, watch};

/// Capacity of the write intake queue
pub const INTAKE_CAPACITY: usize = 16;

/// Stream of replayed events, closed when replay ends
pub type EventStream = mpsc::Receiver<Event>;

/// Terminal replay error; dropped without a value when replay succeeds
pub type ReplayErrors = oneshot::Receiver<LogError>;

/// Lifecycle of a backend instance
///
/// `Created → Replaying → {Failed | Ready}`, `Ready → Writing` on `run()`,
/// `Writing → Failed` on any append error. `Failed` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Created,
    Replaying,
    Ready,
    Writing,
    Failed,
}

impl Phase {
    pub fn is_terminal(self) -> bool {
        matches!(self, Phase::Failed)
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Phase::Created => "created",
            Phase::Replaying => "replaying",
            Phase::Ready => "ready",
            Phase::Writing => "writing",
            Phase::Failed => "failed",
        };
        f.write_str(name)
    }
}

/// Create the single-slot fatal error cell and its first observer
pub fn error_slot() -> (ErrorSlot, ErrorWatch) {
    let (tx, rx) = watch::channel(None);
    (ErrorSlot { tx }, ErrorWatch { rx })
}

/// Write side of the fatal error cell
///
/// Only the first published error is kept.
#[derive(Debug)]
pub struct ErrorSlot {
    tx: watch::Sender<Option<Arc<LogError>>>,
}

impl ErrorSlot {
    /// Publish a fatal error; returns false if one was already recorded
    pub fn publish(&self, error: LogError) -> bool {
        let mut error = Some(error);
        self.tx.send_if_modified(|slot| {
            if slot.is_some() {
                return false;
            }
            *slot = error.take().map(Arc::new);
            true
        })
    }

    pub fn is_set(&self) -> bool {
        self.tx.borrow().is_some()
    }

    pub fn subscribe(&self) -> ErrorWatch {
        ErrorWatch {
            rx: self.tx.subscribe(),
        }
    }
}

/// Read-only observer of a backend's fatal error cell
#[derive(Debug, Clone)]
pub struct ErrorWatch {
    rx: watch::Receiver<Option<Arc<LogError>>>,
}

impl ErrorWatch {
    /// Wait until a fatal error is published
    ///
    /// Returns `None` if the backend is dropped without ever failing.
    pub async fn recv(&mut self) -> Option<Arc<LogError>> {
        match self.rx.wait_for(Option::is_some).await {
            Ok(slot) => slot.clone(),
            Err(_) => None,
        }
    }

    /// The fatal error, if one has been published
    pub fn current(&self) -> Option<Arc<LogError>> {
        self.rx.borrow().clone()
    }
}

/// A durable, append-only log of key-value mutations
#[async_trait]
pub trait TransactionLogger: Send + Sync {
    /// Queue a put; waits only while the intake queue is full
    async fn write_put(&self, key: &str, value: &str) -> Result<(), LogError>;

    /// Queue a delete; waits only while the intake queue is full
    async fn write_delete(&self, key: &str) -> Result<(), LogError>;

    /// Observer for fatal write failures
    fn err(&self) -> ErrorWatch;

    /// Start replaying the stored events; legal once, before `run()`
    fn read_events(&self) -> Result<(EventStream, ReplayErrors), LogError>;

    /// Start the background writer; legal once, after a clean replay
    fn run(&self) -> Result<(), LogError>;

    /// Stop accepting writes and wait for queued events to be appended
    async fn close(&self);

    /// Highest sequence number issued or observed
    fn last_sequence(&self) -> u64;

    fn phase(&self) -> Phase;
}

#[cfg(test)]
#[path = "logger_tests.rs"]
mod tests;
