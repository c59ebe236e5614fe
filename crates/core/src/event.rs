// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Mutation events recorded in the transaction log

use crate::error::LogError;
use std::fmt;

/// The kind of mutation an event records
///
/// The discriminant is the persisted integer code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum EventKind {
    Delete = 1,
    Put = 2,
}

impl EventKind {
    /// Integer code used by every persisted representation
    pub fn code(self) -> u8 {
        self as u8
    }

    /// Map a persisted integer code back to a kind
    pub fn from_code(code: i64) -> Option<Self> {
        match code {
            1 => Some(Self::Delete),
            2 => Some(Self::Put),
            _ => None,
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Delete => write!(f, "delete"),
            Self::Put => write!(f, "put"),
        }
    }
}

/// A single committed mutation
///
/// Events built by callers carry sequence 0; the backend stamps the real
/// sequence number when it appends the event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Event {
    pub sequence: u64,
    pub kind: EventKind,
    pub key: String,
    /// Only meaningful for puts; empty for deletes
    pub value: String,
}

impl Event {
    pub fn put(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            sequence: 0,
            kind: EventKind::Put,
            key: key.into(),
            value: value.into(),
        }
    }

    pub fn delete(key: impl Into<String>) -> Self {
        Self {
            sequence: 0,
            kind: EventKind::Delete,
            key: key.into(),
            value: String::new(),
        }
    }

    /// Return a copy of this event stamped with `sequence`
    pub fn with_sequence(mut self, sequence: u64) -> Self {
        self.sequence = sequence;
        self
    }

    /// Check that the event can be stored in every backend
    ///
    /// Neither keys nor values may contain tabs or line breaks; the file
    /// format separates fields with tabs and records with newlines.
    pub fn validate(&self) -> Result<(), LogError> {
        if self.key.is_empty() {
            return Err(LogError::InvalidEvent("key is empty".to_string()));
        }
        if self.key.contains(['\t', '\n', '\r']) {
            return Err(LogError::InvalidEvent(format!(
                "key {:?} contains a tab or line break",
                self.key
            )));
        }
        if self.value.contains(['\t', '\n', '\r']) {
            return Err(LogError::InvalidEvent(format!(
                "value for key {:?} contains a tab or line break",
                self.key
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "event_tests.rs"]
mod tests;
