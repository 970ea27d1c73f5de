//! Key-value storage mirror for the browser's `localStorage`.
//!
//! The WASM module cannot rely on touching `localStorage` itself (it may run
//! inside a Web Worker), so it keeps an in-memory mirror:
//!
//! - **Startup:** the JS bridge calls `hydrate_storage` with every relevant
//!   key, or `null` when storage is disabled (private browsing, blocked).
//! - **Every write:** applied to the mirror and queued in a journal.
//! - **After each request:** the bridge calls `drain_storage_writes` and
//!   replays the journal into `localStorage`, in order.
//!
//! Callers treat every `StorageError` as "no data" / "accept the loss".

use serde::Serialize;
use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;

use crate::error::StorageError;

/// Minimal key-value capability, mirroring the `Storage` web API.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;
    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError>;
    fn remove(&mut self, key: &str) -> Result<(), StorageError>;
}

/// Storage handle shared by the monster store and the session gate.
pub type SharedStorage = Rc<RefCell<dyn KeyValueStore>>;

/// One journaled write, serialized for the JS bridge.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "op", rename_all = "lowercase")]
pub enum StorageWrite {
    Set { key: String, value: String },
    Remove { key: String },
}

/// In-memory `localStorage` mirror with a write journal and a byte quota.
#[derive(Debug)]
pub struct BridgeStorage {
    values: BTreeMap<String, String>,
    journal: Vec<StorageWrite>,
    quota: usize,
    available: bool,
}

impl BridgeStorage {
    pub fn new(quota: usize) -> Self {
        Self {
            values: BTreeMap::new(),
            journal: Vec::new(),
            quota,
            available: true,
        }
    }

    /// A mirror whose every access fails, as when the browser blocks storage.
    pub fn unavailable() -> Self {
        Self {
            available: false,
            ..Self::new(0)
        }
    }

    /// Replace the mirror with values read from the browser. Does not journal.
    pub fn hydrate(&mut self, entries: BTreeMap<String, String>) {
        self.values = entries;
        self.journal.clear();
        self.available = true;
    }

    pub fn set_available(&mut self, available: bool) {
        self.available = available;
    }

    /// Take every queued write, oldest first.
    pub fn drain_writes(&mut self) -> Vec<StorageWrite> {
        std::mem::take(&mut self.journal)
    }

    /// Bytes in use, counted as key plus value length.
    fn usage_with(&self, key: &str, value: &str) -> usize {
        self.values
            .iter()
            .filter(|(k, _)| k.as_str() != key)
            .map(|(k, v)| k.len() + v.len())
            .sum::<usize>()
            + key.len()
            + value.len()
    }
}

impl KeyValueStore for BridgeStorage {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        if !self.available {
            return Err(StorageError::Unavailable);
        }
        Ok(self.values.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        if !self.available {
            return Err(StorageError::Unavailable);
        }
        let needed = self.usage_with(key, value);
        if needed > self.quota {
            return Err(StorageError::QuotaExceeded {
                key: key.to_string(),
                needed,
                quota: self.quota,
            });
        }
        self.values.insert(key.to_string(), value.to_string());
        self.journal.push(StorageWrite::Set {
            key: key.to_string(),
            value: value.to_string(),
        });
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), StorageError> {
        if !self.available {
            return Err(StorageError::Unavailable);
        }
        self.values.remove(key);
        self.journal.push(StorageWrite::Remove { key: key.to_string() });
        Ok(())
    }
}
