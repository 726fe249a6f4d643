//! Best-effort persistent key-value storage.
//!
//! The session token and cached user profile are the only values that
//! survive a restart. All operations are best-effort by contract: any
//! underlying failure (unwritable path, corrupted file) is logged and
//! treated as "no value" on read or a silent no-op on write. Nothing here
//! ever returns an error to callers.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use serde::Serialize;
use serde::de::DeserializeOwned;

/// Well-known storage keys.
pub mod keys {
    /// Bearer token for the current session.
    pub const TOKEN: &str = "marketfront_token";
    /// Cached profile of the logged-in user.
    pub const USER: &str = "marketfront_user";
}

/// String-keyed, string-valued persistent store.
pub trait Storage: Send + Sync {
    /// Read a value, or `None` when absent or unreadable.
    fn get(&self, key: &str) -> Option<String>;
    /// Write a value; failures are swallowed.
    fn set(&self, key: &str, value: &str);
    /// Remove a value; absent keys are a no-op.
    fn remove(&self, key: &str);
    /// Remove every value.
    fn clear(&self);
}

/// Read a value and decode it from its JSON representation.
pub fn get_json<T: DeserializeOwned>(storage: &dyn Storage, key: &str) -> Option<T> {
    let raw = storage.get(key)?;
    match serde_json::from_str(&raw) {
        Ok(value) => Some(value),
        Err(error) => {
            tracing::warn!(key, %error, "Discarding undecodable stored value");
            None
        }
    }
}

/// Encode a value as JSON and write it.
pub fn set_json<T: Serialize>(storage: &dyn Storage, key: &str, value: &T) {
    match serde_json::to_string(value) {
        Ok(raw) => storage.set(key, &raw),
        Err(error) => {
            tracing::warn!(key, %error, "Failed to encode value for storage");
        }
    }
}

/// File-backed storage: one JSON object per file, keys as fields.
///
/// Reads and writes go through a whole-file read-modify-write under a
/// mutex. A missing or corrupt file reads as empty.
pub struct FileStorage {
    path: PathBuf,
    lock: Mutex<()>,
}

impl FileStorage {
    /// Create a store backed by the given file path.
    ///
    /// The file is created lazily on first write.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    /// The backing file path.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_map(&self) -> BTreeMap<String, String> {
        let raw = match std::fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(error) if error.kind() == std::io::ErrorKind::NotFound => return BTreeMap::new(),
            Err(error) => {
                tracing::warn!(path = %self.path.display(), %error, "Failed to read storage file");
                return BTreeMap::new();
            }
        };
        match serde_json::from_str(&raw) {
            Ok(map) => map,
            Err(error) => {
                tracing::warn!(path = %self.path.display(), %error, "Storage file is corrupt; treating as empty");
                BTreeMap::new()
            }
        }
    }

    fn write_map(&self, map: &BTreeMap<String, String>) {
        let raw = match serde_json::to_string_pretty(map) {
            Ok(raw) => raw,
            Err(error) => {
                tracing::warn!(%error, "Failed to encode storage file");
                return;
            }
        };
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
            && let Err(error) = std::fs::create_dir_all(parent)
        {
            tracing::warn!(path = %parent.display(), %error, "Failed to create storage directory");
            return;
        }
        if let Err(error) = std::fs::write(&self.path, raw) {
            tracing::warn!(path = %self.path.display(), %error, "Failed to write storage file");
        }
    }
}

impl Storage for FileStorage {
    fn get(&self, key: &str) -> Option<String> {
        let _guard = self.lock.lock().unwrap_or_else(PoisonError::into_inner);
        self.read_map().get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) {
        let _guard = self.lock.lock().unwrap_or_else(PoisonError::into_inner);
        let mut map = self.read_map();
        map.insert(key.to_string(), value.to_string());
        self.write_map(&map);
    }

    fn remove(&self, key: &str) {
        let _guard = self.lock.lock().unwrap_or_else(PoisonError::into_inner);
        let mut map = self.read_map();
        if map.remove(key).is_some() {
            self.write_map(&map);
        }
    }

    fn clear(&self) {
        let _guard = self.lock.lock().unwrap_or_else(PoisonError::into_inner);
        self.write_map(&BTreeMap::new());
    }
}

/// In-memory storage for tests and ephemeral sessions.
#[derive(Default)]
pub struct MemoryStorage {
    map: Mutex<BTreeMap<String, String>>,
}

impl MemoryStorage {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl Storage for MemoryStorage {
    fn get(&self, key: &str) -> Option<String> {
        self.map
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .cloned()
    }

    fn set(&self, key: &str, value: &str) {
        self.map
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key.to_string(), value.to_string());
    }

    fn remove(&self, key: &str) {
        self.map
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(key);
    }

    fn clear(&self) {
        self.map
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }
}
