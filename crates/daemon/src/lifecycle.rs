// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Daemon lifecycle management: backend construction, replay, shutdown.

use std::sync::Arc;
use std::time::Instant;

use kvs_core::{LogError, Store, StoreError, TransactionLogger};
use kvs_storage::{FileTransactionLogger, SqliteTransactionLogger};
use thiserror::Error;
use tracing::{debug, error, info};

use crate::config::{BackendConfig, Config, ConfigError};
use crate::service::KeyValueService;

/// Outcome of a successful replay
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReplayStats {
    /// Events applied to the store
    pub applied: u64,
    /// Highest sequence number seen in the log
    pub last_sequence: u64,
}

/// Daemon state during operation
pub struct DaemonState {
    /// Configuration
    pub config: Config,
    /// Front door for reads and writes
    pub service: KeyValueService,
    /// What bootstrap found in the log
    pub replay: ReplayStats,
    /// When daemon started
    pub start_time: Instant,
}

impl DaemonState {
    /// Shutdown the daemon gracefully
    ///
    /// Stops intake and waits for every queued event to reach the journal.
    pub async fn shutdown(&self) {
        info!("Shutting down daemon...");
        self.service.logger().close().await;
        info!(
            last_sequence = self.service.logger().last_sequence(),
            "Daemon shutdown complete"
        );
    }
}

/// Lifecycle errors
#[derive(Debug, Error)]
pub enum LifecycleError {
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    #[error("Failed to create event logger: {0}")]
    Log(#[source] LogError),

    #[error("Transaction log replay failed: {0}")]
    Replay(#[source] LogError),

    #[error("Failed to apply replayed event {sequence}: {source}")]
    Apply {
        sequence: u64,
        #[source]
        source: StoreError,
    },

    #[error("Failed to start transaction log writer: {0}")]
    Run(#[source] LogError),

    #[error("Transaction log failed: {0}")]
    Fatal(Arc<LogError>),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Start the daemon: rebuild the store from the log, then open it for writes
pub async fn startup(config: &Config) -> Result<DaemonState, LifecycleError> {
    let store = Arc::new(Store::new());
    let (logger, replay) = initialize_transaction_log(&config.backend, &store).await?;

    info!(
        backend = %config.backend,
        keys = store.len(),
        applied = replay.applied,
        last_sequence = replay.last_sequence,
        "Daemon started"
    );

    Ok(DaemonState {
        config: config.clone(),
        service: KeyValueService::new(store, logger),
        replay,
        start_time: Instant::now(),
    })
}

/// Construct the configured backend
pub fn open_logger(backend: &BackendConfig) -> Result<Arc<dyn TransactionLogger>, LogError> {
    let logger: Arc<dyn TransactionLogger> = match backend {
        BackendConfig::File { path } => Arc::new(FileTransactionLogger::open_file(path)?),
        BackendConfig::Sqlite { path, table } => {
            Arc::new(SqliteTransactionLogger::open_sqlite(path, table)?)
        }
    };
    Ok(logger)
}

/// Open the backend, replay it into `store`, and switch it to write mode
///
/// Nothing may write to the store concurrently; this runs before any live
/// traffic is accepted.
pub async fn initialize_transaction_log(
    backend: &BackendConfig,
    store: &Store,
) -> Result<(Arc<dyn TransactionLogger>, ReplayStats), LifecycleError> {
    let logger = open_logger(backend).map_err(LifecycleError::Log)?;

    let stats = match replay_into(logger.as_ref(), store).await {
        Ok(stats) => stats,
        Err(e) => {
            error!(backend = %backend, error = %e, "replay failed, refusing to start");
            return Err(e);
        }
    };

    logger.run().map_err(LifecycleError::Run)?;
    Ok((logger, stats))
}

/// Drain the logger's replay streams into `store`
///
/// Stops at the first error. Events already handed over are applied before
/// the error is taken, so everything ahead of a violation lands in the
/// store and nothing after it does.
pub async fn replay_into(
    logger: &dyn TransactionLogger,
    store: &Store,
) -> Result<ReplayStats, LifecycleError> {
    let (mut events, mut errors) = logger.read_events().map_err(LifecycleError::Replay)?;
    let mut applied = 0;
    let mut errors_open = true;

    loop {
        tokio::select! {
            biased;

            event = events.recv() => match event {
                Some(event) => {
                    debug!(sequence = event.sequence, kind = %event.kind, "replaying event");
                    store.apply(&event).map_err(|source| LifecycleError::Apply {
                        sequence: event.sequence,
                        source,
                    })?;
                    applied += 1;
                }
                None => break,
            },

            result = &mut errors, if errors_open => match result {
                Ok(e) => return Err(LifecycleError::Replay(e)),
                // Replay finished cleanly; events may still be buffered
                Err(_) => errors_open = false,
            },
        }
    }

    // The event stream can close before a late error is observed
    if errors_open {
        if let Ok(e) = errors.await {
            return Err(LifecycleError::Replay(e));
        }
    }

    let stats = ReplayStats {
        applied,
        last_sequence: logger.last_sequence(),
    };
    info!(
        applied = stats.applied,
        last_sequence = stats.last_sequence,
        "Replayed transaction log"
    );
    Ok(stats)
}

#[cfg(test)]
#[path = "lifecycle_tests.rs"]
mod tests;
