// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Transaction log driver shared by every journal
//!
//! Owns the intake queue, the sequence counter, the lifecycle phase and the
//! fatal error cell. Both background tasks run on tokio's blocking pool since
//! journals do synchronous I/O; they are never active at the same time.

use crate::journal::Journal;
use async_trait::async_trait;
use kvs_core::{
    error_slot, ErrorSlot, ErrorWatch, Event, EventStream, LogError, Phase, ReplayErrors,
    TransactionLogger, INTAKE_CAPACITY,
};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

/// State shared with the replay and writer tasks
///
/// The journal lock is held for a whole replay, so the phase and the
/// sequence counter live outside it and stay readable meanwhile.
struct Inner<J> {
    journal: Mutex<J>,
    last_sequence: AtomicU64,
    phase: Mutex<Phase>,
}

impl<J: Journal> Inner<J> {
    fn journal(&self) -> MutexGuard<'_, J> {
        self.journal.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn phase(&self) -> Phase {
        *self.phase.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn set_phase(&self, phase: Phase) {
        *self.phase.lock().unwrap_or_else(|e| e.into_inner()) = phase;
    }

    /// Move from `from` to `to`, or report the phase that blocked `operation`
    fn transition(&self, operation: &'static str, from: Phase, to: Phase) -> Result<(), LogError> {
        let mut phase = self.phase.lock().unwrap_or_else(|e| e.into_inner());
        if *phase != from {
            return Err(LogError::Phase {
                operation,
                phase: *phase,
            });
        }
        *phase = to;
        Ok(())
    }
}

/// A transaction log over any [`Journal`]
///
/// Must be driven from inside a tokio runtime: `read_events` and `run` spawn
/// blocking tasks.
pub struct TransactionLog<J: Journal> {
    inner: Arc<Inner<J>>,
    intake: Mutex<Option<mpsc::Sender<Event>>>,
    writer: Mutex<Option<JoinHandle<()>>>,
    errors: Arc<ErrorSlot>,
}

impl<J: Journal> TransactionLog<J> {
    pub fn new(journal: J) -> Self {
        let (errors, _) = error_slot();
        Self {
            inner: Arc::new(Inner {
                journal: Mutex::new(journal),
                last_sequence: AtomicU64::new(0),
                phase: Mutex::new(Phase::Created),
            }),
            intake: Mutex::new(None),
            writer: Mutex::new(None),
            errors: Arc::new(errors),
        }
    }

    async fn enqueue(&self, event: Event) -> Result<(), LogError> {
        event.validate()?;
        if self.errors.is_set() {
            return Err(LogError::WriterStopped);
        }

        let intake = self
            .intake
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone();
        let Some(intake) = intake else {
            return Err(match self.inner.phase() {
                Phase::Writing => LogError::WriterStopped,
                phase => LogError::Phase {
                    operation: "write",
                    phase,
                },
            });
        };

        intake.send(event).await.map_err(|_| LogError::WriterStopped)
    }
}

#[async_trait]
impl<J: Journal> TransactionLogger for TransactionLog<J> {
    async fn write_put(&self, key: &str, value: &str) -> Result<(), LogError> {
        self.enqueue(Event::put(key, value)).await
    }

    async fn write_delete(&self, key: &str) -> Result<(), LogError> {
        self.enqueue(Event::delete(key)).await
    }

    fn err(&self) -> ErrorWatch {
        self.errors.subscribe()
    }

    fn read_events(&self) -> Result<(EventStream, ReplayErrors), LogError> {
        self.inner.transition("replay", Phase::Created, Phase::Replaying)?;
        info!(location = %self.inner.journal().target(), "replaying transaction log");

        // Single slot: the scan only advances as fast as the consumer applies
        let (event_tx, event_rx) = mpsc::channel(1);
        let (error_tx, error_rx) = oneshot::channel();
        let inner = Arc::clone(&self.inner);
        tokio::task::spawn_blocking(move || replay(&inner, event_tx, error_tx));

        Ok((event_rx, error_rx))
    }

    fn run(&self) -> Result<(), LogError> {
        self.inner.transition("run", Phase::Ready, Phase::Writing)?;
        info!(
            location = %self.inner.journal().target(),
            last_sequence = self.last_sequence(),
            "transaction log writer starting"
        );

        let (tx, rx) = mpsc::channel(INTAKE_CAPACITY);
        let inner = Arc::clone(&self.inner);
        let errors = Arc::clone(&self.errors);
        let handle = tokio::task::spawn_blocking(move || drain(&inner, rx, &errors));

        *self.intake.lock().unwrap_or_else(|e| e.into_inner()) = Some(tx);
        *self.writer.lock().unwrap_or_else(|e| e.into_inner()) = Some(handle);
        Ok(())
    }

    async fn close(&self) {
        // Dropping the last sender lets the writer drain the queue and exit
        let intake = self.intake.lock().unwrap_or_else(|e| e.into_inner()).take();
        drop(intake);

        let writer = self.writer.lock().unwrap_or_else(|e| e.into_inner()).take();
        if let Some(writer) = writer {
            if let Err(e) = writer.await {
                warn!(error = %e, "transaction log writer ended abnormally");
            }
        }
    }

    fn last_sequence(&self) -> u64 {
        self.inner.last_sequence.load(Ordering::Acquire)
    }

    fn phase(&self) -> Phase {
        self.inner.phase()
    }
}

/// Replay task: scan the journal, check sequencing, hand events to the consumer
///
/// Whatever the outcome, the phase is settled and any error is sent before
/// `events` drops and closes the stream.
fn replay<J: Journal>(
    inner: &Inner<J>,
    events: mpsc::Sender<Event>,
    errors: oneshot::Sender<LogError>,
) {
    let mut last_sequence = inner.last_sequence.load(Ordering::Acquire);
    let mut replayed = 0u64;

    let result = inner.journal().scan(&mut |event: Event| {
        if last_sequence >= event.sequence {
            return Err(LogError::OutOfSequence {
                last: last_sequence,
                found: event.sequence,
            });
        }
        last_sequence = event.sequence;
        inner.last_sequence.store(last_sequence, Ordering::Release);
        replayed += 1;
        debug!(sequence = event.sequence, kind = %event.kind, "replayed event");
        events
            .blocking_send(event)
            .map_err(|_| LogError::ReplayAbandoned)
    });

    match result {
        Ok(()) => {
            inner.set_phase(Phase::Ready);
            info!(replayed, last_sequence, "transaction log replay complete");
        }
        Err(e) => {
            inner.set_phase(Phase::Failed);
            error!(replayed, error = %e, "transaction log replay aborted");
            let _ = errors.send(e);
        }
    }
}

/// Writer task: stamp and append queued events until the queue closes
///
/// The first append failure is fatal: it is published on the error cell and
/// nothing further is drained.
fn drain<J: Journal>(inner: &Inner<J>, mut intake: mpsc::Receiver<Event>, errors: &ErrorSlot) {
    while let Some(event) = intake.blocking_recv() {
        let sequence = inner.last_sequence.fetch_add(1, Ordering::AcqRel) + 1;
        let event = event.with_sequence(sequence);

        if let Err(e) = inner.journal().append(&event) {
            inner.set_phase(Phase::Failed);
            error!(sequence, error = %e, "append failed, writer stopping");
            errors.publish(e);
            return;
        }
        debug!(sequence, kind = %event.kind, "appended event");
    }
    info!("transaction log writer stopped");
}

#[cfg(test)]
#[path = "transaction_log_tests.rs"]
mod tests;
