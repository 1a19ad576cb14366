//! Storage Abstraction Layer
//!
//! Durable key-value storage for the configurator's JSON blobs (settings
//! presets and recorded clips). Native builds keep one JSON file per key in
//! the user data directory; the browser build keeps them in `localStorage`,
//! falling back to memory for the session when the page may not use it.
//!
//! Reads are forgiving: a missing or corrupt blob reads as "nothing saved".
//! Writes report their errors so the UI can say what went wrong.

#[cfg(not(target_arch = "wasm32"))]
pub mod local;
#[cfg(any(test, target_arch = "wasm32"))]
pub mod memory;
pub mod presets;
pub mod recordings;
#[cfg(target_arch = "wasm32")]
pub mod web;

#[cfg(not(target_arch = "wasm32"))]
pub use local::FileStore;
#[cfg(any(test, target_arch = "wasm32"))]
pub use memory::MemoryStore;
pub use presets::PresetStore;
pub use recordings::{Recorder, Recording, RecordingStore};
#[cfg(target_arch = "wasm32")]
pub use web::{trigger_download, WebStore};

use serde::de::DeserializeOwned;
use serde::Serialize;
use thiserror::Error;

/// Storage error types
#[derive(Debug, Clone, PartialEq, Error)]
pub enum StorageError {
    #[error("not found: {0}")]
    NotFound(String),
    #[error("permission denied: {0}")]
    PermissionDenied(String),
    #[error("I/O error: {0}")]
    Io(String),
    #[error("serialization error: {0}")]
    Serde(String),
    #[error("{0}")]
    Other(String),
}

impl From<std::io::Error> for StorageError {
    fn from(e: std::io::Error) -> Self {
        match e.kind() {
            std::io::ErrorKind::NotFound => StorageError::NotFound(e.to_string()),
            std::io::ErrorKind::PermissionDenied => StorageError::PermissionDenied(e.to_string()),
            _ => StorageError::Io(e.to_string()),
        }
    }
}

impl From<serde_json::Error> for StorageError {
    fn from(e: serde_json::Error) -> Self {
        StorageError::Serde(e.to_string())
    }
}

/// String key-value store
pub trait KeyValueStore {
    /// Stored value, or None when nothing was saved under `key`
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;
    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError>;
}

/// Keys become file names and page storage keys, so only a safe alphabet is allowed
pub fn check_key(key: &str) -> Result<(), StorageError> {
    let valid = !key.is_empty()
        && key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
    if valid {
        Ok(())
    } else {
        Err(StorageError::Other(format!("invalid storage key '{}'", key)))
    }
}

/// Read a JSON list, treating missing or unreadable data as empty
pub fn read_list<T: DeserializeOwned>(store: &dyn KeyValueStore, key: &str) -> Vec<T> {
    let text = match store.get(key) {
        Ok(Some(text)) => text,
        Ok(None) => return Vec::new(),
        Err(e) => {
            log::warn!("Could not read '{}': {}", key, e);
            return Vec::new();
        }
    };
    match serde_json::from_str(&text) {
        Ok(list) => list,
        Err(e) => {
            log::warn!("Ignoring corrupt '{}': {}", key, e);
            Vec::new()
        }
    }
}

/// Persist a whole list as JSON
pub fn write_list<T: Serialize>(
    store: &mut dyn KeyValueStore,
    key: &str,
    list: &[T],
) -> Result<(), StorageError> {
    let text = serde_json::to_string(list)?;
    store.set(key, &text)
}

/// The store the app persists to on this platform
///
/// Native: `storage_dir` if given, else the per-user data dir, else
/// `./userdata`. Web: the page's localStorage, else an in-memory store.
#[cfg(not(target_arch = "wasm32"))]
pub fn open_default(storage_dir: Option<&str>) -> Box<dyn KeyValueStore> {
    let dir = storage_dir
        .map(std::path::PathBuf::from)
        .or_else(|| dirs::data_dir().map(|d| d.join("drape")))
        .unwrap_or_else(|| std::path::PathBuf::from("userdata"));
    log::info!("Storage: {}", dir.display());
    Box::new(FileStore::new(dir))
}

#[cfg(target_arch = "wasm32")]
pub fn open_default(_storage_dir: Option<&str>) -> Box<dyn KeyValueStore> {
    match WebStore::open() {
        Some(store) => Box::new(store),
        None => {
            log::warn!("localStorage unavailable, presets last for this session only");
            Box::new(MemoryStore::new())
        }
    }
}
