// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Key-value operations backed by the store and the transaction log

use std::sync::Arc;

use kvs_core::{ErrorWatch, LogError, Store, StoreError, TransactionLogger};
use thiserror::Error;
use tracing::warn;

/// Errors surfaced to callers of the key-value operations
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error(transparent)]
    Store(#[from] StoreError),

    /// The log has stopped persisting; writes are refused until restart
    #[error("transaction log failed: {0}")]
    LogFailed(Arc<LogError>),

    #[error("transaction log rejected write: {0}")]
    Log(#[from] LogError),
}

/// Store mutations paired with their log records
///
/// An event is queued for the log before the store changes, so a write the
/// log refuses is never visible. Once the log reports a fatal error every
/// later mutation is refused.
#[derive(Clone)]
pub struct KeyValueService {
    store: Arc<Store>,
    logger: Arc<dyn TransactionLogger>,
    errors: ErrorWatch,
}

impl KeyValueService {
    pub fn new(store: Arc<Store>, logger: Arc<dyn TransactionLogger>) -> Self {
        let errors = logger.err();
        Self {
            store,
            logger,
            errors,
        }
    }

    pub async fn put(&self, key: &str, value: &str) -> Result<(), ServiceError> {
        self.ensure_healthy()?;
        self.logger
            .write_put(key, value)
            .await
            .map_err(|e| self.refusal(e))?;
        self.store.put(key, value)?;
        Ok(())
    }

    pub async fn delete(&self, key: &str) -> Result<(), ServiceError> {
        self.ensure_healthy()?;
        self.logger
            .write_delete(key)
            .await
            .map_err(|e| self.refusal(e))?;
        self.store.delete(key)?;
        Ok(())
    }

    pub fn get(&self, key: &str) -> Result<String, ServiceError> {
        Ok(self.store.get(key)?)
    }

    pub fn store(&self) -> &Arc<Store> {
        &self.store
    }

    pub fn logger(&self) -> &Arc<dyn TransactionLogger> {
        &self.logger
    }

    /// Observer for the log's fatal error
    pub fn errors(&self) -> ErrorWatch {
        self.errors.clone()
    }

    /// A writer that stopped after a fatal error is reported as that error
    fn refusal(&self, error: LogError) -> ServiceError {
        match (error, self.errors.current()) {
            (LogError::WriterStopped, Some(fatal)) => ServiceError::LogFailed(fatal),
            (error, _) => ServiceError::Log(error),
        }
    }

    fn ensure_healthy(&self) -> Result<(), ServiceError> {
        match self.errors.current() {
            Some(e) => {
                warn!(error = %e, "refusing write after transaction log failure");
                Err(ServiceError::LogFailed(e))
            }
            None => Ok(()),
        }
    }
}

#[cfg(test)]
#[path = "service_tests.rs"]
mod tests;
