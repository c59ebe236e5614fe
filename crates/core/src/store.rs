// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! In-memory key-value map rebuilt from the transaction log

use crate::error::StoreError;
use crate::event::{Event, EventKind};
use std::collections::{BTreeMap, HashMap};
use std::sync::RwLock;

/// Thread-safe key-value map
///
/// Puts and deletes take the write lock, gets share the read lock.
#[derive(Debug, Default)]
pub struct Store {
    map: RwLock<HashMap<String, String>>,
}

impl Store {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn put(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let mut map = self.map.write().unwrap_or_else(|e| e.into_inner());
        map.insert(key.to_string(), value.to_string());
        Ok(())
    }

    pub fn get(&self, key: &str) -> Result<String, StoreError> {
        let map = self.map.read().unwrap_or_else(|e| e.into_inner());
        map.get(key).cloned().ok_or(StoreError::NoSuchKey)
    }

    /// Remove a key; deleting a missing key is not an error
    pub fn delete(&self, key: &str) -> Result<(), StoreError> {
        let mut map = self.map.write().unwrap_or_else(|e| e.into_inner());
        map.remove(key);
        Ok(())
    }

    /// Apply a replayed event
    pub fn apply(&self, event: &Event) -> Result<(), StoreError> {
        match event.kind {
            EventKind::Put => self.put(&event.key, &event.value),
            EventKind::Delete => self.delete(&event.key),
        }
    }

    pub fn len(&self) -> usize {
        self.map.read().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Ordered copy of the current contents
    pub fn snapshot(&self) -> BTreeMap<String, String> {
        let map = self.map.read().unwrap_or_else(|e| e.into_inner());
        map.iter().map(|(k, v)| (k.clone(), v.clone())).collect()
    }
}

#[cfg(test)]
#[path = "store_tests.rs"]
mod tests;
