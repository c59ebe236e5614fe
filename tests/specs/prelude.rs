//! Shared fixtures for the behavioral specs

#![allow(dead_code)]

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

pub use kvs_core::{LogError, StoreError};
pub use kvs_daemon::{
    lifecycle, BackendConfig, Config, DaemonState, LifecycleError, ServiceError,
};
use tempfile::TempDir;

/// Backends every scenario is checked against
pub const BACKENDS: [Backend; 2] = [Backend::File, Backend::Sqlite];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backend {
    File,
    Sqlite,
}

/// A state directory that outlives individual daemon runs
pub struct Node {
    dir: TempDir,
    config: Config,
}

impl Node {
    pub fn new(backend: Backend) -> Self {
        let dir = TempDir::new().unwrap();
        let mut config = Config::for_state_dir(dir.path());
        if backend == Backend::Sqlite {
            config.backend = BackendConfig::default_sqlite(dir.path());
        }
        Self { dir, config }
    }

    pub fn state_dir(&self) -> &Path {
        self.dir.path()
    }

    pub fn log_path(&self) -> PathBuf {
        self.config.backend.path().to_path_buf()
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Boot the daemon; panics if startup fails
    pub async fn start(&self) -> DaemonState {
        match lifecycle::startup(&self.config).await {
            Ok(daemon) => daemon,
            Err(e) => panic!("daemon failed to start: {e}"),
        }
    }

    /// Boot the daemon expecting startup to fail
    pub async fn start_fails(&self) -> LifecycleError {
        match lifecycle::startup(&self.config).await {
            Ok(_) => panic!("daemon started on a log that should have been refused"),
            Err(e) => e,
        }
    }

    /// Gracefully stop `daemon` and boot a fresh one on the same state
    pub async fn restart(&self, daemon: DaemonState) -> DaemonState {
        daemon.shutdown().await;
        drop(daemon);
        self.start().await
    }
}

/// Everything the store holds right now
pub fn snapshot(daemon: &DaemonState) -> BTreeMap<String, String> {
    daemon.service.store().snapshot()
}

/// Build an expected snapshot from pairs
pub fn entries(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}
