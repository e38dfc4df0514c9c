//! The recently-opened documents ledger.
//!
//! The ledger keeps a bounded, most-recent-first list of document
//! identifiers in a [`PreferenceStore`] as one comma-delimited string. It
//! holds no copy of the list between calls: every read parses the stored
//! string, and every update is a read-modify-write under the ledger's lock
//! that returns only after the store accepted the new value.

use std::sync::{Arc, Mutex, PoisonError};

use assetfs_store::PreferenceStore;
use chrono::{DateTime, TimeZone, Utc};

use crate::config::DEFAULT_RECENTS_CAPACITY;
use crate::document_id::DocumentId;
use crate::{Error, Result};

/// Delimiter between identifiers in the persisted list.
///
/// Not escaped; identifiers containing it cannot be recorded.
pub const DELIMITER: char = ',';

/// Key prefix for per-document last-access timestamps.
const LAST_ACCESSED_PREFIX: &str = "lastAccessed/";

/// Bounded, deduplicated, most-recent-first list of accessed documents.
pub struct RecentsLedger {
    prefs: Arc<dyn PreferenceStore>,
    key: String,
    capacity: usize,
    lock: Mutex<()>,
}

impl RecentsLedger {
    /// Create a ledger persisting under `key`, keeping at most `capacity`
    /// entries.
    pub fn new(prefs: Arc<dyn PreferenceStore>, key: impl Into<String>, capacity: usize) -> Self {
        Self {
            prefs,
            key: key.into(),
            capacity: capacity.max(1),
            lock: Mutex::new(()),
        }
    }

    /// Create a ledger with the default key and capacity.
    pub fn with_defaults(prefs: Arc<dyn PreferenceStore>) -> Self {
        Self::new(prefs, "recents", DEFAULT_RECENTS_CAPACITY)
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// The recorded identifiers, most recent first.
    pub fn list(&self) -> Result<Vec<DocumentId>> {
        let raw = self.prefs.get_string(&self.key)?;
        Ok(self.parse(raw.as_deref().unwrap_or("")))
    }

    /// Record an access to `id` now.
    pub fn record_access(&self, id: &DocumentId) -> Result<()> {
        self.record_access_at(id, Utc::now())
    }

    /// Record an access to `id` at `when`.
    ///
    /// A previous occurrence of `id` is removed before it is inserted at the
    /// front, and the list is truncated to capacity by dropping the oldest
    /// entries. Dropped entries lose their access time as well, so the
    /// number of stored timestamps never exceeds the capacity.
    pub fn record_access_at(&self, id: &DocumentId, when: DateTime<Utc>) -> Result<()> {
        if id.is_store_root() {
            return Err(Error::invalid_argument(
                "the store root cannot be recorded as a recent document",
            ));
        }
        if id.as_str().contains(DELIMITER) {
            return Err(Error::invalid_argument(format!(
                "identifier '{}' contains the recents delimiter '{}'",
                id, DELIMITER
            )));
        }

        let _guard = self.lock.lock().unwrap_or_else(PoisonError::into_inner);

        let raw = self.prefs.get_string(&self.key)?;
        let current = self.parse(raw.as_deref().unwrap_or(""));
        let updated = promote(current.clone(), id, self.capacity);
        let serialized = join(&updated);

        self.prefs.put_string(&self.key, &serialized)?;
        log::debug!("Recorded access to '{}' ({} recents)", id, updated.len());

        if let Err(e) = self.prefs.put_string(
            &last_accessed_key(id),
            &when.timestamp_millis().to_string(),
        ) {
            log::warn!("Failed to store last access time of '{}': {}", id, e);
        }

        // Access times live only as long as their entry in the list.
        for evicted in current.iter().filter(|old| !updated.contains(old)) {
            if let Err(e) = self.prefs.remove(&last_accessed_key(evicted)) {
                log::warn!("Failed to drop last access time of '{}': {}", evicted, e);
            }
        }

        Ok(())
    }

    /// When `id` was last recorded, if ever.
    pub fn last_accessed(&self, id: &DocumentId) -> Result<Option<DateTime<Utc>>> {
        let Some(raw) = self.prefs.get_string(&last_accessed_key(id))? else {
            return Ok(None);
        };
        match raw.trim().parse::<i64>() {
            Ok(millis) => Ok(Utc.timestamp_millis_opt(millis).single()),
            Err(e) => {
                log::warn!("Ignoring malformed access time '{}' for '{}': {}", raw, id, e);
                Ok(None)
            }
        }
    }

    fn parse(&self, raw: &str) -> Vec<DocumentId> {
        let mut ids: Vec<DocumentId> = Vec::new();
        for entry in raw.split(DELIMITER).filter(|e| !e.is_empty()) {
            match DocumentId::parse(entry) {
                Ok(id) if id.is_store_root() => {}
                Ok(id) => {
                    if !ids.contains(&id) {
                        ids.push(id);
                    }
                }
                Err(e) => log::warn!("Dropping malformed recents entry '{}': {}", entry, e),
            }
            if ids.len() == self.capacity {
                break;
            }
        }
        ids
    }
}

impl std::fmt::Debug for RecentsLedger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RecentsLedger")
            .field("key", &self.key)
            .field("capacity", &self.capacity)
            .finish_non_exhaustive()
    }
}

fn last_accessed_key(id: &DocumentId) -> String {
    format!("{}{}", LAST_ACCESSED_PREFIX, id)
}

/// Move `id` to the front of `list`, without duplicates, keeping at most
/// `capacity` entries.
fn promote(mut list: Vec<DocumentId>, id: &DocumentId, capacity: usize) -> Vec<DocumentId> {
    list.retain(|existing| existing != id);
    list.insert(0, id.clone());
    list.truncate(capacity);
    list
}

fn join(list: &[DocumentId]) -> String {
    let mut out = String::new();
    for (i, id) in list.iter().enumerate() {
        if i > 0 {
            out.push(DELIMITER);
        }
        out.push_str(id.as_str());
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use assetfs_store::{InMemoryPreferences, StoreError};

    fn id(s: &str) -> DocumentId {
        DocumentId::parse(s).unwrap()
    }

    fn ledger() -> (Arc<InMemoryPreferences>, RecentsLedger) {
        let prefs = Arc::new(InMemoryPreferences::new());
        let ledger = RecentsLedger::with_defaults(prefs.clone());
        (prefs, ledger)
    }

    #[test]
    fn empty_until_recorded() {
        let (_, ledger) = ledger();
        assert!(ledger.list().unwrap().is_empty());
    }

    #[test]
    fn reaccess_promotes_without_duplicates() {
        let (prefs, ledger) = ledger();
        ledger.record_access(&id("a")).unwrap();
        ledger.record_access(&id("b")).unwrap();
        ledger.record_access(&id("a")).unwrap();

        assert_eq!(ledger.list().unwrap(), vec![id("a"), id("b")]);
        assert_eq!(prefs.get_string("recents").unwrap().as_deref(), Some("a,b"));
    }

    #[test]
    fn capacity_drops_oldest() {
        let (_, ledger) = ledger();
        for i in 0..65 {
            ledger.record_access(&id(&format!("doc{}.png", i))).unwrap();
        }

        let list = ledger.list().unwrap();
        assert_eq!(list.len(), 64);
        assert_eq!(list[0], id("doc64.png"));
        assert_eq!(list[63], id("doc1.png"));
        assert!(!list.contains(&id("doc0.png")));
    }

    #[test]
    fn promote_at_capacity_does_not_grow() {
        let prefs = Arc::new(InMemoryPreferences::new());
        let ledger = RecentsLedger::new(prefs, "recents", 3);
        for name in ["a", "b", "c", "b"] {
            ledger.record_access(&id(name)).unwrap();
        }
        assert_eq!(ledger.list().unwrap(), vec![id("b"), id("c"), id("a")]);
    }

    #[test]
    fn rejects_delimiter_and_root() {
        let (_, ledger) = ledger();
        assert!(matches!(
            ledger.record_access(&id("Cats/a,b.jpg")),
            Err(Error::InvalidArgument { .. })
        ));
        assert!(matches!(
            ledger.record_access(&DocumentId::store_root()),
            Err(Error::InvalidArgument { .. })
        ));
        assert!(ledger.list().unwrap().is_empty());
    }

    #[test]
    fn parse_tolerates_garbage() {
        let (prefs, ledger) = ledger();
        prefs.put_string("recents", ",a,,b,a,../x,").unwrap();
        assert_eq!(ledger.list().unwrap(), vec![id("a"), id("b")]);
    }

    #[test]
    fn last_access_time_is_recorded() {
        let (_, ledger) = ledger();
        let when = Utc.timestamp_millis_opt(1_600_000_000_123).unwrap();
        ledger.record_access_at(&id("Cats/Grumpy Cat.jpg"), when).unwrap();

        assert_eq!(
            ledger.last_accessed(&id("Cats/Grumpy Cat.jpg")).unwrap(),
            Some(when)
        );
        assert_eq!(ledger.last_accessed(&id("Dogs/Doge.png")).unwrap(), None);
    }

    #[test]
    fn evicted_entries_lose_access_time() {
        let prefs = Arc::new(InMemoryPreferences::new());
        let ledger = RecentsLedger::new(prefs.clone(), "recents", 2);
        for name in ["a.png", "b.png", "c.png"] {
            ledger.record_access(&id(name)).unwrap();
        }

        assert_eq!(ledger.last_accessed(&id("a.png")).unwrap(), None);
        assert!(ledger.last_accessed(&id("c.png")).unwrap().is_some());
        let timestamps = prefs
            .entries()
            .keys()
            .filter(|k| k.starts_with(LAST_ACCESSED_PREFIX))
            .count();
        assert_eq!(timestamps, 2);
    }

    #[test]
    fn malformed_access_time_reads_as_none() {
        let (prefs, ledger) = ledger();
        prefs.put_string("lastAccessed/x.png", "yesterday").unwrap();
        assert_eq!(ledger.last_accessed(&id("x.png")).unwrap(), None);
    }

    struct FailingPrefs;

    impl PreferenceStore for FailingPrefs {
        fn get_string(&self, _key: &str) -> assetfs_store::Result<Option<String>> {
            Ok(None)
        }

        fn put_string(&self, _key: &str, _value: &str) -> assetfs_store::Result<()> {
            Err(StoreError::Io(std::io::Error::other("read-only")))
        }

        fn remove(&self, _key: &str) -> assetfs_store::Result<()> {
            Err(StoreError::Io(std::io::Error::other("read-only")))
        }
    }

    #[test]
    fn write_failure_is_reported() {
        let ledger = RecentsLedger::with_defaults(Arc::new(FailingPrefs));
        assert!(matches!(
            ledger.record_access(&id("a.png")),
            Err(Error::Io(_))
        ));
    }

    #[test]
    fn concurrent_updates_are_not_lost() {
        let (_, ledger) = ledger();
        let ledger = Arc::new(ledger);

        let handles: Vec<_> = (0..16)
            .map(|t| {
                let ledger = ledger.clone();
                std::thread::spawn(move || {
                    for i in 0..4 {
                        ledger
                            .record_access(&id(&format!("t{}/doc{}.png", t, i)))
                            .unwrap();
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(ledger.list().unwrap().len(), 64);
    }
}
