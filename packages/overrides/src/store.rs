//! # Override Store
//!
//! Durable key/value store for style, content and layout overrides.
//!
//! Values are JSON. `set` shallow-merges object patches into the stored
//! object, so a later edit of one field never drops the others. Entries
//! only disappear through `remove` or `clear`.
//!
//! The store is single-threaded: last write wins and no locking is done.

use crate::{OverrideError, OverrideKey};
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Backing storage for the store
#[derive(Debug, Clone)]
pub enum StoreStorage {
    /// In-memory only (tests, previews)
    Memory,

    /// JSON object file on disk
    File { path: PathBuf },
}

#[derive(Debug, Clone)]
pub struct OverrideStore {
    entries: BTreeMap<String, Value>,
    storage: StoreStorage,
    dirty: bool,
}

impl OverrideStore {
    pub fn in_memory() -> Self {
        Self {
            entries: BTreeMap::new(),
            storage: StoreStorage::Memory,
            dirty: false,
        }
    }

    /// Open a file-backed store. A missing file is an empty store.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, OverrideError> {
        let path = path.into();
        let entries = if path.exists() {
            read_entries(&path)?
        } else {
            BTreeMap::new()
        };

        debug!(path = %path.display(), entries = entries.len(), "Opened override store");

        Ok(Self {
            entries,
            storage: StoreStorage::File { path },
            dirty: false,
        })
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.entries.get(key)
    }

    /// Typed lookup falling back to the caller's default.
    ///
    /// A stored value that does not decode as `T` also yields the default.
    pub fn get_or<T: DeserializeOwned>(&self, key: &str, default: T) -> T {
        match self.entries.get(key) {
            Some(value) => match serde_json::from_value(value.clone()) {
                Ok(decoded) => decoded,
                Err(e) => {
                    warn!(key, error = %e, "Stored override does not match expected shape");
                    default
                }
            },
            None => default,
        }
    }

    /// Merge `patch` into the entry at `key`.
    ///
    /// Object patches are shallow-merged into an existing object; any other
    /// combination replaces the stored value.
    pub fn set(&mut self, key: impl Into<String>, patch: Value) {
        let key = key.into();
        debug!(key = %key, "Setting override");

        match self.entries.get_mut(&key) {
            Some(Value::Object(existing)) if patch.is_object() => {
                if let Value::Object(fields) = patch {
                    existing.extend(fields);
                }
            }
            _ => {
                self.entries.insert(key, patch);
            }
        }

        self.dirty = true;
    }

    pub fn set_key(&mut self, key: &OverrideKey, patch: Value) {
        self.set(key.to_string(), patch);
    }

    pub fn remove(&mut self, key: &str) -> Option<Value> {
        let removed = self.entries.remove(key);
        if removed.is_some() {
            self.dirty = true;
        }
        removed
    }

    /// Drop every override
    pub fn clear(&mut self) {
        if !self.entries.is_empty() {
            self.dirty = true;
        }
        self.entries.clear();
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn entries(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Entries stored under `property:tag:hashN` keys
    pub fn derived_entries(&self) -> impl Iterator<Item = (OverrideKey, &Value)> {
        self.entries.iter().filter_map(|(k, v)| {
            let key = OverrideKey::parse(k);
            key.is_derived().then_some((key, v))
        })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn storage(&self) -> &StoreStorage {
        &self.storage
    }

    /// Persist a file-backed store. No-op for in-memory stores.
    ///
    /// The JSON is written to a sibling temp file first and renamed over
    /// the target.
    pub fn save(&mut self) -> Result<(), OverrideError> {
        let path = match &self.storage {
            StoreStorage::Memory => {
                self.dirty = false;
                return Ok(());
            }
            StoreStorage::File { path } => path.clone(),
        };

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let object: Map<String, Value> = self
            .entries
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();
        let json = serde_json::to_string_pretty(&Value::Object(object))?;

        let tmp = path.with_extension("json.tmp");
        std::fs::write(&tmp, json)?;
        std::fs::rename(&tmp, &path)?;

        debug!(path = %path.display(), entries = self.entries.len(), "Saved override store");
        self.dirty = false;
        Ok(())
    }
}

impl Default for OverrideStore {
    fn default() -> Self {
        Self::in_memory()
    }
}

fn read_entries(path: &Path) -> Result<BTreeMap<String, Value>, OverrideError> {
    let content = std::fs::read_to_string(path)?;
    let value: Value = serde_json::from_str(&content).map_err(|source| OverrideError::InvalidJson {
        path: path.to_path_buf(),
        source,
    })?;

    match value {
        Value::Object(map) => Ok(map.into_iter().collect()),
        _ => Err(OverrideError::NotAnObject(path.to_path_buf())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use serde_json::json;

    #[test]
    fn test_set_merges_objects() {
        let mut store = OverrideStore::in_memory();
        store.set("event-1", json!({ "title": "Kickoff", "date": "2024-01-01" }));
        store.set("event-1", json!({ "title": "Kickoff Night" }));

        assert_eq!(
            store.get("event-1"),
            Some(&json!({ "title": "Kickoff Night", "date": "2024-01-01" }))
        );
    }

    #[test]
    fn test_scalar_values_replace() {
        let mut store = OverrideStore::in_memory();
        store.set("textColor:h1:hash5", json!("#000"));
        store.set("textColor:h1:hash5", json!("#fff"));
        assert_eq!(store.get("textColor:h1:hash5"), Some(&json!("#fff")));

        store.set("textColor:h1:hash5", json!({ "value": "#abc" }));
        assert_eq!(store.get("textColor:h1:hash5"), Some(&json!({ "value": "#abc" })));
    }

    #[test]
    fn test_get_or_defaults() {
        #[derive(Debug, Deserialize, PartialEq)]
        struct Hero {
            title: String,
        }

        let mut store = OverrideStore::in_memory();
        let fallback = || Hero {
            title: "Default".to_string(),
        };

        assert_eq!(store.get_or("hero", fallback()), fallback());

        store.set("hero", json!({ "title": 42 }));
        assert_eq!(store.get_or("hero", fallback()), fallback());

        store.set("hero", json!({ "title": "Edited" }));
        assert_eq!(store.get_or("hero", fallback()).title, "Edited");
    }

    #[test]
    fn test_derived_entries() {
        let mut store = OverrideStore::in_memory();
        store.set("mentor-1", json!({ "name": "Ada" }));
        store.set("fontSize:p:hash-12", json!("18px"));

        let derived: Vec<_> = store.derived_entries().collect();
        assert_eq!(derived.len(), 1);
        assert_eq!(derived[0].0.to_string(), "fontSize:p:hash-12");
    }

    #[test]
    fn test_remove_and_clear_mark_dirty() {
        let mut store = OverrideStore::in_memory();
        store.set("a", json!(1));
        store.save().unwrap();
        assert!(!store.is_dirty());

        assert!(store.remove("missing").is_none());
        assert!(!store.is_dirty());

        store.clear();
        assert!(store.is_dirty());
        assert!(store.is_empty());
    }

    #[test]
    fn test_file_backed_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state").join("overrides.json");

        let mut store = OverrideStore::open(&path).unwrap();
        assert!(store.is_empty());
        store.set("hero", json!({ "title": "Hello" }));
        store.save().unwrap();
        assert!(path.exists());
        assert!(!path.with_extension("json.tmp").exists());

        let reopened = OverrideStore::open(&path).unwrap();
        assert_eq!(reopened.get("hero"), Some(&json!({ "title": "Hello" })));
    }

    #[test]
    fn test_open_rejects_non_object() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("overrides.json");
        std::fs::write(&path, "[1, 2]").unwrap();

        let err = OverrideStore::open(&path).unwrap_err();
        assert!(matches!(err, OverrideError::NotAnObject(_)));
    }
}
