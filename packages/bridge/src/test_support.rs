//! Shared fixtures for unit tests.

use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};

use assetfs_store::{InMemoryPreferences, PreferenceStore, Result};

/// In-memory preferences that count every call per key.
#[derive(Debug, Default)]
pub(crate) struct CountingPrefs {
    inner: InMemoryPreferences,
    gets: Mutex<HashMap<String, usize>>,
    puts: Mutex<HashMap<String, usize>>,
}

impl CountingPrefs {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Total reads across all keys.
    pub(crate) fn total_gets(&self) -> usize {
        self.gets
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .values()
            .sum()
    }

    /// Writes to `key`.
    pub(crate) fn puts_to(&self, key: &str) -> usize {
        self.puts
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .copied()
            .unwrap_or(0)
    }

    fn bump(counter: &Mutex<HashMap<String, usize>>, key: &str) {
        *counter
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .entry(key.to_string())
            .or_default() += 1;
    }
}

impl PreferenceStore for CountingPrefs {
    fn get_string(&self, key: &str) -> Result<Option<String>> {
        Self::bump(&self.gets, key);
        self.inner.get_string(key)
    }

    fn put_string(&self, key: &str, value: &str) -> Result<()> {
        Self::bump(&self.puts, key);
        self.inner.put_string(key, value)
    }

    fn remove(&self, key: &str) -> Result<()> {
        self.inner.remove(key)
    }
}
