//! Key-value preference stores.
//!
//! Preferences are flat string-to-string records. Every read goes to the
//! backing storage, so a value written by an earlier process is visible to
//! the next one without any warm-up.

use std::collections::BTreeMap;
use std::fs;
use std::io::{self, Write as IoWrite};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};

use serde_json::{Map, Value as JsonValue};

use crate::{Result, StoreError};

/// A persistent string-keyed, string-valued store.
pub trait PreferenceStore: Send + Sync {
    /// Read the value stored under `key`, or `None` if unset.
    fn get_string(&self, key: &str) -> Result<Option<String>>;

    /// Store `value` under `key`.
    ///
    /// Returns only once the value is durable, or with the error that
    /// prevented it.
    fn put_string(&self, key: &str, value: &str) -> Result<()>;

    /// Delete `key`. Removing an unset key is not an error.
    fn remove(&self, key: &str) -> Result<()>;
}

impl<T: PreferenceStore + ?Sized> PreferenceStore for &T {
    fn get_string(&self, key: &str) -> Result<Option<String>> {
        (**self).get_string(key)
    }

    fn put_string(&self, key: &str, value: &str) -> Result<()> {
        (**self).put_string(key, value)
    }

    fn remove(&self, key: &str) -> Result<()> {
        (**self).remove(key)
    }
}

impl<T: PreferenceStore + ?Sized> PreferenceStore for Box<T> {
    fn get_string(&self, key: &str) -> Result<Option<String>> {
        self.as_ref().get_string(key)
    }

    fn put_string(&self, key: &str, value: &str) -> Result<()> {
        self.as_ref().put_string(key, value)
    }

    fn remove(&self, key: &str) -> Result<()> {
        self.as_ref().remove(key)
    }
}

impl<T: PreferenceStore + ?Sized> PreferenceStore for Arc<T> {
    fn get_string(&self, key: &str) -> Result<Option<String>> {
        self.as_ref().get_string(key)
    }

    fn put_string(&self, key: &str, value: &str) -> Result<()> {
        self.as_ref().put_string(key, value)
    }

    fn remove(&self, key: &str) -> Result<()> {
        self.as_ref().remove(key)
    }
}

/// Preferences held in process memory.
#[derive(Debug, Default)]
pub struct InMemoryPreferences {
    values: Mutex<BTreeMap<String, String>>,
}

impl InMemoryPreferences {
    /// Create an empty preference store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of every stored entry.
    pub fn entries(&self) -> BTreeMap<String, String> {
        self.values
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl PreferenceStore for InMemoryPreferences {
    fn get_string(&self, key: &str) -> Result<Option<String>> {
        let values = self.values.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(values.get(key).cloned())
    }

    fn put_string(&self, key: &str, value: &str) -> Result<()> {
        let mut values = self.values.lock().unwrap_or_else(PoisonError::into_inner);
        values.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        let mut values = self.values.lock().unwrap_or_else(PoisonError::into_inner);
        values.remove(key);
        Ok(())
    }
}

/// Preferences persisted as a JSON object in a single file.
///
/// Writes replace the file atomically: the new content goes to a sibling
/// temporary file which is then renamed over the original. A missing file
/// reads as an empty store.
#[derive(Debug)]
pub struct JsonFilePreferences {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl JsonFilePreferences {
    /// Use the file at `path`, creating its parent directory if needed.
    pub fn new(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        Ok(Self {
            path,
            write_lock: Mutex::new(()),
        })
    }

    /// The backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load(&self) -> Result<Map<String, JsonValue>> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Map::new()),
            Err(e) => return Err(e.into()),
        };

        if content.trim().is_empty() {
            return Ok(Map::new());
        }

        match serde_json::from_str::<JsonValue>(&content)? {
            JsonValue::Object(map) => Ok(map),
            other => Err(StoreError::CorruptPreferences {
                path: self.path.clone(),
                message: format!("expected a JSON object, found {}", json_kind(&other)),
            }),
        }
    }

    fn save(&self, map: &Map<String, JsonValue>) -> Result<()> {
        let serialized = serde_json::to_string_pretty(map)?;
        let tmp_path = self.path.with_extension("json.tmp");

        let mut tmp = fs::File::create(&tmp_path)?;
        tmp.write_all(serialized.as_bytes())?;
        tmp.sync_all()?;
        drop(tmp);

        fs::rename(&tmp_path, &self.path)?;
        log::debug!("Wrote {} preference entries to {}", map.len(), self.path.display());
        Ok(())
    }
}

fn json_kind(value: &JsonValue) -> &'static str {
    match value {
        JsonValue::Null => "null",
        JsonValue::Bool(_) => "a boolean",
        JsonValue::Number(_) => "a number",
        JsonValue::String(_) => "a string",
        JsonValue::Array(_) => "an array",
        JsonValue::Object(_) => "an object",
    }
}

impl PreferenceStore for JsonFilePreferences {
    fn get_string(&self, key: &str) -> Result<Option<String>> {
        let map = self.load()?;
        match map.get(key) {
            None | Some(JsonValue::Null) => Ok(None),
            Some(JsonValue::String(s)) => Ok(Some(s.clone())),
            Some(other) => Err(StoreError::CorruptPreferences {
                path: self.path.clone(),
                message: format!("value for '{}' is {}, not a string", key, json_kind(other)),
            }),
        }
    }

    fn put_string(&self, key: &str, value: &str) -> Result<()> {
        let _guard = self
            .write_lock
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        let mut map = self.load()?;
        map.insert(key.to_string(), JsonValue::String(value.to_string()));
        self.save(&map)
    }

    fn remove(&self, key: &str) -> Result<()> {
        let _guard = self
            .write_lock
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        let mut map = self.load()?;
        if map.remove(key).is_none() {
            return Ok(());
        }
        self.save(&map)
    }
}
