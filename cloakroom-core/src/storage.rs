//! Key/value storage for session identity.
//!
//! Storage layout:
//! ```text
//! ~/.local/share/cloakroom/
//! ├── session.json     # {"cloakroom_owner_id": "12", "cloakroom_owner_email": "..."}
//! └── closet.db        # cached items (owned by the CLI)
//! ```

use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// Filename of the session file inside the data directory.
pub const SESSION_FILE: &str = "session.json";

/// Errors from key/value storage.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("I/O error for '{}': {1}", .0.display())]
    Io(PathBuf, #[source] io::Error),

    #[error("Corrupt session file '{}': {1}", .0.display())]
    Parse(PathBuf, #[source] serde_json::Error),

    #[error("Session store lock poisoned")]
    Poisoned,
}

/// A durable string-to-string store.
///
/// Implementations must make a completed `set` visible to later `get`s,
/// including after a process restart for durable stores.
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;
    fn remove(&self, key: &str) -> Result<(), StorageError>;
}

/// Key/value store persisted as a JSON object in a single file.
#[derive(Debug)]
pub struct FileKeyValueStore {
    path: PathBuf,
    lock: Mutex<()>,
}

impl FileKeyValueStore {
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            lock: Mutex::new(()),
        }
    }

    /// Store at `<data_dir>/session.json`.
    pub fn in_data_dir(data_dir: &Path) -> Self {
        Self::new(data_dir.join(SESSION_FILE))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_all(&self) -> Result<BTreeMap<String, String>, StorageError> {
        match fs::read(&self.path) {
            Ok(bytes) if bytes.iter().all(u8::is_ascii_whitespace) => Ok(BTreeMap::new()),
            Ok(bytes) => serde_json::from_slice(&bytes)
                .map_err(|e| StorageError::Parse(self.path.clone(), e)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(BTreeMap::new()),
            Err(e) => Err(StorageError::Io(self.path.clone(), e)),
        }
    }

    fn write_all(&self, values: &BTreeMap<String, String>) -> Result<(), StorageError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|e| StorageError::Io(parent.to_path_buf(), e))?;
        }

        let bytes = serde_json::to_vec_pretty(values)
            .map_err(|e| StorageError::Parse(self.path.clone(), e))?;

        // Replace via rename; readers never see a partial file.
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, bytes).map_err(|e| StorageError::Io(tmp.clone(), e))?;
        fs::rename(&tmp, &self.path).map_err(|e| StorageError::Io(self.path.clone(), e))?;
        Ok(())
    }
}

impl KeyValueStore for FileKeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let _guard = self.lock.lock().map_err(|_| StorageError::Poisoned)?;
        Ok(self.read_all()?.remove(key))
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let _guard = self.lock.lock().map_err(|_| StorageError::Poisoned)?;
        let mut values = self.read_all()?;
        values.insert(key.to_string(), value.to_string());
        self.write_all(&values)
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        let _guard = self.lock.lock().map_err(|_| StorageError::Poisoned)?;
        let mut values = self.read_all()?;
        if values.remove(key).is_some() {
            self.write_all(&values)?;
        }
        Ok(())
    }
}

/// Process-local store, mainly for tests.
#[derive(Debug, Default)]
pub struct MemoryKeyValueStore {
    values: Mutex<HashMap<String, String>>,
}

impl MemoryKeyValueStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryKeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let values = self.values.lock().map_err(|_| StorageError::Poisoned)?;
        Ok(values.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let mut values = self.values.lock().map_err(|_| StorageError::Poisoned)?;
        values.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        let mut values = self.values.lock().map_err(|_| StorageError::Poisoned)?;
        values.remove(key);
        Ok(())
    }
}
