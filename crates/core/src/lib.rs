// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! kvs-core: event model and capability contract for the kvs transaction log
//!
//! This crate provides:
//! - The `Event` record every backend persists
//! - The `TransactionLogger` trait and its lifecycle `Phase`
//! - The single-slot fatal error cell (`ErrorSlot` / `ErrorWatch`)
//! - The in-memory `Store` that replay rebuilds

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

pub mod error;
pub mod event;
pub mod logger;
pub mod store;

pub use error::{LogError, StoreError};
pub use event::{Event, EventKind};
pub use logger::{
    error_slot, ErrorSlot, ErrorWatch, EventStream, Phase, ReplayErrors, TransactionLogger,
    INTAKE_CAPACITY,
};
pub use store::Store;
