// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Append-only file journal

use crate::journal::Journal;
use crate::record;
use crate::transaction_log::TransactionLog;
use kvs_core::{Event, LogError};
use std::fs::{File, OpenOptions};
use std::io::{self, BufRead, BufReader, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};
use tracing::info;

/// Transaction log backed by a flat file
pub type FileTransactionLogger = TransactionLog<FileJournal>;

impl TransactionLog<FileJournal> {
    /// Open or create the log file at `path`
    pub fn open_file(path: &Path) -> Result<Self, LogError> {
        Ok(Self::new(FileJournal::open(path)?))
    }
}

/// Newline-delimited, tab-separated records in one file
///
/// The file is opened for read and append: replay reads it from the start,
/// appends always land at the end, nothing is ever truncated.
pub struct FileJournal {
    path: PathBuf,
    file: File,
}

impl FileJournal {
    /// Open or create a journal file
    pub fn open(path: &Path) -> Result<Self, LogError> {
        let open_error = |e: io::Error| LogError::Open {
            target: path.display().to_string(),
            reason: e.to_string(),
        };

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(open_error)?;
            }
        }

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .read(true)
            .open(path)
            .map_err(open_error)?;

        info!(path = %path.display(), "opened transaction log file");
        Ok(Self {
            path: path.to_path_buf(),
            file,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Journal for FileJournal {
    fn target(&self) -> String {
        self.path.display().to_string()
    }

    fn append(&mut self, event: &Event) -> Result<(), LogError> {
        let line = record::encode(event);
        self.file
            .write_all(line.as_bytes())
            .map_err(LogError::Write)?;

        // Durable before the next event is taken
        self.file.sync_all().map_err(LogError::Write)
    }

    fn scan(
        &mut self,
        visit: &mut dyn FnMut(Event) -> Result<(), LogError>,
    ) -> Result<(), LogError> {
        self.file.seek(SeekFrom::Start(0)).map_err(LogError::Read)?;
        let mut reader = BufReader::new(&self.file);
        let mut buf = Vec::new();
        let mut number = 0u64;

        loop {
            buf.clear();
            if reader.read_until(b'\n', &mut buf).map_err(LogError::Read)? == 0 {
                return Ok(());
            }
            number += 1;

            // A record without its terminator is torn; appending after it
            // would merge the next record into this one
            if buf.pop() != Some(b'\n') {
                return Err(LogError::Parse {
                    record: number,
                    reason: "record is not newline-terminated".to_string(),
                });
            }
            if buf.is_empty() {
                continue;
            }

            let line = std::str::from_utf8(&buf).map_err(|_| LogError::Parse {
                record: number,
                reason: "record is not valid UTF-8".to_string(),
            })?;
            visit(record::decode(line, number)?)?;
        }
    }
}

#[cfg(test)]
#[path = "file_tests.rs"]
mod tests;
