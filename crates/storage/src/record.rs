// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Line codec for the file-backed transaction log
//!
//! One record per line, four tab-separated fields:
//!
//! ```text
//! sequence \t kind \t key \t value \n
//! ```
//!
//! `kind` is the integer code of [`EventKind`]. No field may contain a tab, so
//! a record with any other field count is corrupt.

use kvs_core::{Event, EventKind, LogError};

const SEPARATOR: char = '\t';

/// Serialize an event to a newline-terminated record
pub fn encode(event: &Event) -> String {
    format!(
        "{}{SEPARATOR}{}{SEPARATOR}{}{SEPARATOR}{}\n",
        event.sequence,
        event.kind.code(),
        event.key,
        event.value
    )
}

/// Parse one record (without its line terminator)
///
/// `record` is the 1-based line number, used only for error reporting.
pub fn decode(line: &str, record: u64) -> Result<Event, LogError> {
    let parse_error = |reason: String| LogError::Parse { record, reason };

    let fields: Vec<&str> = line.split(SEPARATOR).collect();
    let [sequence, kind, key, value] = fields[..] else {
        return Err(parse_error(format!("expected 4 fields, found {}", fields.len())));
    };

    let sequence: u64 = sequence
        .parse()
        .map_err(|e| parse_error(format!("bad sequence {sequence:?}: {e}")))?;
    let code: i64 = kind
        .parse()
        .map_err(|e| parse_error(format!("bad event type {kind:?}: {e}")))?;
    let kind = EventKind::from_code(code)
        .ok_or_else(|| parse_error(format!("unknown event type {code}")))?;
    if key.is_empty() {
        return Err(parse_error("empty key".to_string()));
    }

    Ok(Event {
        sequence,
        kind,
        key: key.to_string(),
        value: value.to_string(),
    })
}

#[cfg(test)]
#[path = "record_tests.rs"]
mod tests;
