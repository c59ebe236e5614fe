// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! kvs daemon internals: configuration, bootstrap, and the key-value service.

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

pub mod config;
pub mod lifecycle;
pub mod service;

pub use config::{BackendConfig, Config, ConfigError};
pub use lifecycle::{
    initialize_transaction_log, open_logger, replay_into, startup, DaemonState, LifecycleError,
    ReplayStats,
};
pub use service::{KeyValueService, ServiceError};
