// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Daemon configuration: state directory, backend selection, log location.
//!
//! Resolution order: built-in defaults, then an optional TOML file, then
//! environment overrides.

use std::fmt;
use std::path::{Path, PathBuf};

use kvs_storage::DEFAULT_TABLE;
use serde::Deserialize;
use thiserror::Error;

/// Default file backend location, relative to the state directory
pub const DEFAULT_LOG_FILE: &str = "transactions.log";

/// Default SQLite database location, relative to the state directory
pub const DEFAULT_DATABASE: &str = "transactions.db";

/// Config file looked up in the state directory when `KVS_CONFIG` is unset
pub const CONFIG_FILE: &str = "kvs.toml";

/// Which journal backs the transaction log
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase", deny_unknown_fields)]
pub enum BackendConfig {
    File {
        path: PathBuf,
    },
    Sqlite {
        path: PathBuf,
        #[serde(default = "default_table")]
        table: String,
    },
}

fn default_table() -> String {
    DEFAULT_TABLE.to_string()
}

impl BackendConfig {
    /// File backend at the default location
    pub fn default_file(state_dir: &Path) -> Self {
        BackendConfig::File {
            path: state_dir.join(DEFAULT_LOG_FILE),
        }
    }

    /// SQLite backend at the default location
    pub fn default_sqlite(state_dir: &Path) -> Self {
        BackendConfig::Sqlite {
            path: state_dir.join(DEFAULT_DATABASE),
            table: default_table(),
        }
    }

    pub fn path(&self) -> &Path {
        match self {
            BackendConfig::File { path } | BackendConfig::Sqlite { path, .. } => path,
        }
    }

    fn path_mut(&mut self) -> &mut PathBuf {
        match self {
            BackendConfig::File { path } | BackendConfig::Sqlite { path, .. } => path,
        }
    }
}

impl fmt::Display for BackendConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BackendConfig::File { path } => write!(f, "file:{}", path.display()),
            BackendConfig::Sqlite { path, table } => {
                write!(f, "sqlite:{}#{}", path.display(), table)
            }
        }
    }
}

/// Daemon configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Root for everything the daemon persists
    pub state_dir: PathBuf,
    /// Transaction log backend
    pub backend: BackendConfig,
    /// Path to daemon log file
    pub log_path: PathBuf,
}

/// On-disk shape of `kvs.toml`
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct ConfigFile {
    backend: Option<BackendConfig>,
    log_path: Option<PathBuf>,
}

impl Config {
    /// Resolve configuration from the process environment
    pub fn load() -> Result<Self, ConfigError> {
        Self::resolve(|name| std::env::var(name).ok())
    }

    /// Defaults rooted at `state_dir`, with no file or environment input
    pub fn for_state_dir(state_dir: &Path) -> Self {
        Self {
            state_dir: state_dir.to_path_buf(),
            backend: BackendConfig::default_file(state_dir),
            log_path: state_dir.join("kvsd.log"),
        }
    }

    /// Resolve configuration using `var` to look up environment variables
    pub fn resolve<F>(var: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let state_dir = state_dir(&var)?;
        let mut config = Self::for_state_dir(&state_dir);

        let file = match var("KVS_CONFIG") {
            Some(path) => Some(read_config_file(Path::new(&path))?),
            None => {
                let path = state_dir.join(CONFIG_FILE);
                if path.exists() {
                    Some(read_config_file(&path)?)
                } else {
                    None
                }
            }
        };
        if let Some(file) = file {
            if let Some(backend) = file.backend {
                config.backend = backend;
            }
            if let Some(log_path) = file.log_path {
                config.log_path = log_path;
            }
        }

        if let Some(kind) = var("KVS_BACKEND") {
            config.backend = match (kind.as_str(), config.backend) {
                ("file", backend @ BackendConfig::File { .. }) => backend,
                ("file", BackendConfig::Sqlite { .. }) => BackendConfig::default_file(&state_dir),
                ("sqlite", backend @ BackendConfig::Sqlite { .. }) => backend,
                ("sqlite", BackendConfig::File { .. }) => BackendConfig::default_sqlite(&state_dir),
                _ => return Err(ConfigError::UnknownBackend(kind.clone())),
            };
        }
        if let Some(path) = var("KVS_TRANSACTION_LOG") {
            *config.backend.path_mut() = PathBuf::from(path);
        }
        if let Some(name) = var("KVS_SQLITE_TABLE") {
            if let BackendConfig::Sqlite { table, .. } = &mut config.backend {
                *table = name;
            }
        }

        // Relative paths are anchored at the state directory
        let path = config.backend.path_mut();
        if path.is_relative() {
            *path = state_dir.join(&*path);
        }
        if config.log_path.is_relative() {
            config.log_path = state_dir.join(&config.log_path);
        }

        Ok(config)
    }
}

fn read_config_file(path: &Path) -> Result<ConfigFile, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    toml::from_str(&content).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

/// Get the state directory for kvs
fn state_dir<F>(var: &F) -> Result<PathBuf, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(dir) = var("KVS_STATE_DIR") {
        return Ok(PathBuf::from(dir));
    }

    // Use XDG_STATE_HOME or default to ~/.local/state
    if let Some(xdg) = var("XDG_STATE_HOME") {
        return Ok(PathBuf::from(xdg).join("kvs"));
    }

    let home = var("HOME")
        .map(PathBuf::from)
        .or_else(dirs::home_dir)
        .ok_or(ConfigError::NoStateDir)?;
    Ok(home.join(".local/state/kvs"))
}

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Could not determine state directory")]
    NoStateDir,

    #[error("Failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("Unknown backend {0:?} (expected \"file\" or \"sqlite\")")]
    UnknownBackend(String),
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
