//! Optional local persistence for UTXO caches.
//!
//! Callers supply any store honoring [`KeyValueStore`]; the facades use it
//! to cache fetched UTXO sets between runs. [`MemoryStore`] is the
//! in-process implementation used in tests and as a default.

use std::collections::HashMap;

use crate::error::WalletError;
use crate::utxo_set::MergeRule;

/// Minimal key-value capability.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Option<String>;

    /// Store a value. Refuses to replace an existing entry unless
    /// `overwrite` is set; returns whether the value was written.
    fn set(&mut self, key: &str, value: String, overwrite: bool) -> Result<bool, WalletError>;

    fn has(&self, key: &str) -> bool;
}

/// How a freshly fetched UTXO set combines with the stored one.
#[derive(Clone, Debug)]
pub struct PersistenceOptions {
    /// Storage key.
    pub name: String,
    /// Whether the merged result replaces the stored entry.
    pub overwrite: bool,
    /// Rule applied between the stored set (`self`) and the fetched set.
    pub merge_rule: MergeRule,
}

impl PersistenceOptions {
    pub fn new(name: impl Into<String>, overwrite: bool, merge_rule: MergeRule) -> Self {
        Self {
            name: name.into(),
            overwrite,
            merge_rule,
        }
    }
}

/// An in-memory store.
#[derive(Default)]
pub struct MemoryStore {
    entries: HashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: String, overwrite: bool) -> Result<bool, WalletError> {
        if self.entries.contains_key(key) && !overwrite {
            return Ok(false);
        }
        self.entries.insert(key.to_string(), value);
        Ok(true)
    }

    fn has(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }
}
