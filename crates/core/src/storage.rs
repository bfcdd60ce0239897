//! Durable key/value storage for session tokens

use crate::error::{CoreError, CoreResult};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// Storage key for the access token
pub const ACCESS_TOKEN_KEY: &str = "token";

/// Storage key for the refresh token
pub const REFRESH_TOKEN_KEY: &str = "refreshToken";

/// String key/value storage in the style of browser local storage
pub trait TokenStorage: Send + Sync {
    /// Read a value
    fn get(&self, key: &str) -> CoreResult<Option<String>>;

    /// Write a value, replacing any previous one
    fn set(&self, key: &str, value: &str) -> CoreResult<()>;

    /// Delete a value; deleting a missing key is not an error
    fn remove(&self, key: &str) -> CoreResult<()>;
}

/// In-process storage, lost when the process exits
#[derive(Debug, Default)]
pub struct MemoryStorage {
    values: Mutex<BTreeMap<String, String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> CoreResult<std::sync::MutexGuard<'_, BTreeMap<String, String>>> {
        self.values
            .lock()
            .map_err(|_| CoreError::storage_error("memory storage lock poisoned"))
    }
}

impl TokenStorage for MemoryStorage {
    fn get(&self, key: &str) -> CoreResult<Option<String>> {
        Ok(self.lock()?.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> CoreResult<()> {
        self.lock()?.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> CoreResult<()> {
        self.lock()?.remove(key);
        Ok(())
    }
}

/// Storage backed by a JSON object file
///
/// Every write rewrites the whole file through a temporary sibling so a crash
/// never leaves a half-written document behind.
#[derive(Debug)]
pub struct FileStorage {
    path: PathBuf,
    guard: Mutex<()>,
}

impl FileStorage {
    /// Open (or lazily create) the storage file at `path`
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            guard: Mutex::new(()),
        }
    }

    /// Storage file inside `data_dir`
    pub fn in_dir(data_dir: impl AsRef<Path>) -> Self {
        Self::new(data_dir.as_ref().join("session.json"))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_all(&self) -> CoreResult<BTreeMap<String, String>> {
        match std::fs::read_to_string(&self.path) {
            Ok(content) if content.trim().is_empty() => Ok(BTreeMap::new()),
            Ok(content) => Ok(serde_json::from_str(&content)?),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(BTreeMap::new()),
            Err(err) => Err(err.into()),
        }
    }

    fn write_all(&self, values: &BTreeMap<String, String>) -> CoreResult<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let tmp = self.path.with_extension("json.tmp");
        std::fs::write(&tmp, serde_json::to_string_pretty(values)?)?;
        std::fs::rename(&tmp, &self.path)?;
        Ok(())
    }

    fn update<F>(&self, f: F) -> CoreResult<()>
    where
        F: FnOnce(&mut BTreeMap<String, String>),
    {
        let _guard = self
            .guard
            .lock()
            .map_err(|_| CoreError::storage_error("file storage lock poisoned"))?;
        let mut values = self.read_all()?;
        f(&mut values);
        self.write_all(&values)
    }
}

impl TokenStorage for FileStorage {
    fn get(&self, key: &str) -> CoreResult<Option<String>> {
        Ok(self.read_all()?.remove(key))
    }

    fn set(&self, key: &str, value: &str) -> CoreResult<()> {
        self.update(|values| {
            values.insert(key.to_string(), value.to_string());
        })
    }

    fn remove(&self, key: &str) -> CoreResult<()> {
        self.update(|values| {
            values.remove(key);
        })
    }
}
