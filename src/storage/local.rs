//! Local filesystem storage backend
//!
//! One `<key>.json` file per key under a base directory. Writes go to a
//! temporary sibling first and are renamed into place, so a crash mid-write
//! leaves the previous value intact.

use super::{check_key, KeyValueStore, StorageError};
use std::path::PathBuf;

#[derive(Debug, Clone)]
pub struct FileStore {
    base_dir: PathBuf,
}

impl FileStore {
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
        }
    }

    fn resolve(&self, key: &str) -> Result<PathBuf, StorageError> {
        check_key(key)?;
        Ok(self.base_dir.join(format!("{}.json", key)))
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let path = self.resolve(key)?;
        match std::fs::read_to_string(&path) {
            Ok(text) => Ok(Some(text)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(StorageError::from(e)),
        }
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        let path = self.resolve(key)?;
        std::fs::create_dir_all(&self.base_dir)?;
        let tmp = path.with_extension("json.tmp");
        std::fs::write(&tmp, value)?;
        std::fs::rename(&tmp, &path)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn setup_test_dir() -> (TempDir, FileStore) {
        let dir = TempDir::new().unwrap();
        let store = FileStore::new(dir.path().join("nested"));
        (dir, store)
    }

    #[test]
    fn test_set_and_get() {
        let (dir, mut store) = setup_test_dir();
        assert_eq!(store.get("presets").unwrap(), None);

        store.set("presets", "[1,2]").unwrap();
        assert_eq!(store.get("presets").unwrap().as_deref(), Some("[1,2]"));
        assert!(dir.path().join("nested/presets.json").exists());
        assert!(!dir.path().join("nested/presets.json.tmp").exists());

        store.set("presets", "[]").unwrap();
        assert_eq!(store.get("presets").unwrap().as_deref(), Some("[]"));
    }

    #[test]
    fn test_overwrite_replaces_value() {
        let (_dir, mut store) = setup_test_dir();
        store.set("recordings", "[1]").unwrap();
        store.set("recordings", "[]").unwrap();
        assert_eq!(store.get("recordings").unwrap().as_deref(), Some("[]"));
    }

    #[test]
    fn test_rejects_unsafe_keys() {
        let (_dir, mut store) = setup_test_dir();
        assert!(store.set("../escape", "x").is_err());
        assert!(store.get("").is_err());
        assert!(store.set("a/b", "x").is_err());
    }
}
