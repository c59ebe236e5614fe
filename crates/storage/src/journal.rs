// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Physical media behind a transaction log

use kvs_core::{Event, LogError};

/// Storage medium for stamped events
///
/// A journal only moves records in and out. Sequencing, integrity checks,
/// queuing and lifecycle live in [`crate::TransactionLog`], which calls a
/// journal from one blocking task at a time.
pub trait Journal: Send + 'static {
    /// Human-readable location, for logs
    fn target(&self) -> String;

    /// Durably store one event whose sequence is already assigned
    fn append(&mut self, event: &Event) -> Result<(), LogError>;

    /// Visit every stored event in stored order
    ///
    /// Stops at the first decode failure or the first error returned by
    /// `visit`, and returns that error.
    fn scan(
        &mut self,
        visit: &mut dyn FnMut(Event) -> Result<(), LogError>,
    ) -> Result<(), LogError>;
}
