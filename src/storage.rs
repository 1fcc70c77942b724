use std::cell::RefCell;
use std::collections::HashMap;
use std::fs::{self, OpenOptions};
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use serde::de::DeserializeOwned;
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info, warn};
use crate::models::Task;

/// Key under which the task collection is persisted.
pub const TODOS_KEY: &str = "todos";

/// Failure of a storage operation.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Reading, writing, or removing the payload failed.
    #[error("storage error for '{key}': {source}")]
    Io {
        key: String,
        #[source]
        source: io::Error,
    },

    /// The stored payload is not valid JSON for the expected type.
    #[error("stored data for '{key}' is malformed: {source}")]
    Malformed {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    /// The value could not be serialized.
    #[error("failed to serialize data: {0}")]
    Serialize(#[from] serde_json::Error),

    /// The key contains characters that cannot name a stored payload.
    #[error("invalid storage key '{0}'")]
    InvalidKey(String),

    /// The caller passed a value that cannot be stored.
    #[error("invalid input: {0}")]
    InvalidInput(String),
}

/// Local key-value persistence for text payloads.
pub trait KeyValueStore {
    /// Returns the payload stored under `key`, or `None` if nothing was stored.
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;
    /// Replaces the payload stored under `key`.
    fn set(&self, key: &str, value: &str) -> Result<(), StoreError>;
    /// Removes the payload stored under `key`. Removing an absent key succeeds.
    fn remove(&self, key: &str) -> Result<(), StoreError>;
}

impl<S: KeyValueStore + ?Sized> KeyValueStore for &S {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        (**self).set(key, value)
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        (**self).remove(key)
    }
}

fn check_key(key: &str) -> Result<(), StoreError> {
    let valid = !key.is_empty()
        && key.chars().all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
    if valid {
        Ok(())
    } else {
        Err(StoreError::InvalidKey(key.to_string()))
    }
}

/// Stores each key as `<key>.json` inside a data directory.
#[derive(Debug, Clone)]
pub struct FileStore {
    root: PathBuf,
}

impl FileStore {
    /// Creates a store rooted at `root`. The directory is created on first write.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path of the file backing `key`.
    pub fn path_for(&self, key: &str) -> PathBuf {
        self.root.join(format!("{key}.json"))
    }

    fn io_err(key: &str) -> impl FnOnce(io::Error) -> StoreError + '_ {
        move |source| StoreError::Io { key: key.to_string(), source }
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        check_key(key)?;
        let path = self.path_for(key);
        if !path.exists() {
            return Ok(None);
        }
        let mut f = OpenOptions::new().read(true).open(&path).map_err(Self::io_err(key))?;
        let mut s = String::new();
        f.read_to_string(&mut s).map_err(Self::io_err(key))?;
        Ok(Some(s))
    }

    /// Writes a sibling temporary file and renames it over the target, so a
    /// reader never observes a partially written payload.
    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        check_key(key)?;
        fs::create_dir_all(&self.root).map_err(Self::io_err(key))?;
        let path = self.path_for(key);
        let tmp = self.root.join(format!(".{key}.json.tmp"));
        let mut f = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(&tmp)
            .map_err(Self::io_err(key))?;
        f.write_all(value.as_bytes()).map_err(Self::io_err(key))?;
        f.sync_all().map_err(Self::io_err(key))?;
        drop(f);
        fs::rename(&tmp, &path).map_err(Self::io_err(key))?;
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        check_key(key)?;
        let path = self.path_for(key);
        if path.exists() {
            fs::remove_file(&path).map_err(Self::io_err(key))?;
        }
        Ok(())
    }
}

/// In-process store, used for tests and dry runs.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: RefCell<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        check_key(key)?;
        Ok(self.entries.borrow().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        check_key(key)?;
        self.entries.borrow_mut().insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        check_key(key)?;
        self.entries.borrow_mut().remove(key);
        Ok(())
    }
}

/// Reads and deserializes the JSON payload under `key`.
pub(crate) fn read_json<T, S>(store: &S, key: &str) -> Result<Option<T>, StoreError>
where
    T: DeserializeOwned,
    S: KeyValueStore + ?Sized,
{
    let Some(raw) = store.get(key)? else {
        return Ok(None);
    };
    match serde_json::from_str(&raw) {
        Ok(value) => Ok(Some(value)),
        Err(source) => {
            warn!(key, error = %source, "stored payload is malformed");
            Err(StoreError::Malformed { key: key.to_string(), source })
        }
    }
}

/// Serializes `value` and stores it under `key`.
pub(crate) fn write_json<T, S>(store: &S, key: &str, value: &T) -> Result<(), StoreError>
where
    T: Serialize + ?Sized,
    S: KeyValueStore + ?Sized,
{
    let s = serde_json::to_string_pretty(value)?;
    store.set(key, &s)
}

/// Whole-collection persistence of task records.
///
/// Every save overwrites the entire collection; there is no per-record path.
#[derive(Debug)]
pub struct TaskStore<S> {
    kv: S,
}

impl<S: KeyValueStore> TaskStore<S> {
    pub fn new(kv: S) -> Self {
        Self { kv }
    }

    /// The underlying key-value store.
    pub fn kv(&self) -> &S {
        &self.kv
    }

    /// Loads all tasks.
    ///
    /// Returns an empty vector if nothing has been persisted yet.
    pub fn load_all(&self) -> Result<Vec<Task>, StoreError> {
        let tasks: Vec<Task> = read_json(&self.kv, TODOS_KEY)?.unwrap_or_default();
        debug!(count = tasks.len(), "loaded tasks");
        Ok(tasks)
    }

    /// Saves the given list of tasks, replacing whatever was stored.
    pub fn save_all(&self, tasks: &[Task]) -> Result<(), StoreError> {
        write_json(&self.kv, TODOS_KEY, tasks).inspect_err(|e| {
            warn!(error = %e, count = tasks.len(), "failed to save tasks");
        })?;
        debug!(count = tasks.len(), "saved tasks");
        Ok(())
    }

    /// Removes the persisted collection entirely.
    pub fn clear_all(&self) -> Result<(), StoreError> {
        self.kv.remove(TODOS_KEY)?;
        info!("cleared all tasks");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_path_like_keys() {
        let store = MemoryStore::new();
        assert!(matches!(store.set("../x", "1"), Err(StoreError::InvalidKey(_))));
        assert!(matches!(store.get(""), Err(StoreError::InvalidKey(_))));
    }

    #[test]
    fn file_store_round_trips_and_removes() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path().join("nested"));
        assert_eq!(store.get("todos").unwrap(), None);
        store.set("todos", "[]").unwrap();
        assert_eq!(store.get("todos").unwrap().as_deref(), Some("[]"));
        assert!(!dir.path().join("nested").join(".todos.json.tmp").exists());
        store.remove("todos").unwrap();
        store.remove("todos").unwrap();
        assert_eq!(store.get("todos").unwrap(), None);
    }

    #[test]
    fn malformed_payload_is_reported() {
        let store = TaskStore::new(MemoryStore::new());
        store.kv().set(TODOS_KEY, "{not json").unwrap();
        assert!(matches!(store.load_all(), Err(StoreError::Malformed { .. })));
    }
}
