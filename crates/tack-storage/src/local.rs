//! Durable store backed by a single JSON document on disk.
//!
//! The whole store is one JSON object of `key -> encoded value` strings. It is
//! loaded on first use and written through on every mutation via a temp file
//! and rename, so a crash mid-write leaves the previous document intact.

use std::collections::BTreeMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

use crate::{Result, StorageBackend, StorageError};

/// Overrides [`LocalStorageConfig::dir`] when read through
/// [`LocalStorageConfig::from_env`].
pub const STORAGE_DIR_ENV: &str = "TACK_STORAGE_DIR";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LocalStorageConfig {
    /// Directory holding the store file. Created on first write.
    pub dir: PathBuf,
    pub file_name: String,
}

impl Default for LocalStorageConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from(".tack"),
            file_name: "local_storage.json".to_string(),
        }
    }
}

impl LocalStorageConfig {
    pub fn in_dir(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            ..Self::default()
        }
    }

    /// Defaults, with the directory taken from `TACK_STORAGE_DIR` if set.
    pub fn from_env() -> Self {
        match std::env::var_os(STORAGE_DIR_ENV) {
            Some(dir) if !dir.is_empty() => Self::in_dir(dir),
            _ => Self::default(),
        }
    }

    pub fn path(&self) -> PathBuf {
        self.dir.join(&self.file_name)
    }
}

/// Durable cross-session store. Clones share the same cached document.
#[derive(Clone)]
pub struct LocalStorage {
    path: PathBuf,
    cache: Arc<Mutex<Option<BTreeMap<String, String>>>>,
}

impl LocalStorage {
    pub fn open(config: &LocalStorageConfig) -> Self {
        Self {
            path: config.path(),
            cache: Arc::new(Mutex::new(None)),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Forget the cached document; the next access reloads from disk.
    pub fn reload(&self) {
        *self.cache.lock() = None;
    }

    fn with_entries<R>(&self, f: impl FnOnce(&mut BTreeMap<String, String>) -> R) -> Result<R> {
        let mut cache = self.cache.lock();
        if cache.is_none() {
            *cache = Some(load(&self.path)?);
        }
        Ok(f(cache.get_or_insert_with(BTreeMap::new)))
    }

    fn mutate(&self, f: impl FnOnce(&mut BTreeMap<String, String>) -> bool) -> Result<()> {
        let mut cache = self.cache.lock();
        if cache.is_none() {
            *cache = Some(load(&self.path)?);
        }
        let entries = cache.get_or_insert_with(BTreeMap::new);
        if f(entries)
            && let Err(e) = persist(&self.path, entries)
        {
            // Drop the cache so it cannot drift from what is on disk.
            *cache = None;
            return Err(e);
        }
        Ok(())
    }
}

fn load(path: &Path) -> Result<BTreeMap<String, String>> {
    match fs::read_to_string(path) {
        Ok(text) if text.trim().is_empty() => Ok(BTreeMap::new()),
        Ok(text) => serde_json::from_str(&text).map_err(|source| StorageError::Corrupt {
            path: path.to_path_buf(),
            source,
        }),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(BTreeMap::new()),
        Err(e) => Err(StorageError::io(path, e)),
    }
}

fn persist(path: &Path, entries: &BTreeMap<String, String>) -> Result<()> {
    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        fs::create_dir_all(dir).map_err(|e| StorageError::io(dir, e))?;
    }
    let text = serde_json::to_string_pretty(entries).map_err(|source| StorageError::Encode {
        key: path.display().to_string(),
        source,
    })?;
    let tmp = path.with_extension("json.tmp");
    fs::write(&tmp, text).map_err(|e| StorageError::io(&tmp, e))?;
    fs::rename(&tmp, path).map_err(|e| StorageError::io(path, e))?;
    log::trace!("persisted {} entries to {}", entries.len(), path.display());
    Ok(())
}

impl StorageBackend for LocalStorage {
    fn get(&self, key: &str) -> Result<Option<String>> {
        self.with_entries(|entries| entries.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.mutate(|entries| {
            if entries.get(key).map(String::as_str) == Some(value) {
                return false;
            }
            entries.insert(key.to_string(), value.to_string());
            true
        })
    }

    fn remove(&self, key: &str) -> Result<()> {
        self.mutate(|entries| entries.remove(key).is_some())
    }

    fn keys(&self) -> Result<Vec<String>> {
        self.with_entries(|entries| entries.keys().cloned().collect())
    }

    /// Overwrites the file even if it was corrupt.
    fn clear(&self) -> Result<()> {
        let mut cache = self.cache.lock();
        let empty = BTreeMap::new();
        persist(&self.path, &empty)?;
        *cache = Some(empty);
        Ok(())
    }
}

impl std::fmt::Debug for LocalStorage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LocalStorage")
            .field("path", &self.path)
            .finish()
    }
}
