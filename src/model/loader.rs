//! Asset loading
//!
//! `AssetLoader` is the seam between the swap controller and wherever model
//! bytes come from. Loads are fire-and-poll: `load` returns immediately and
//! the controller polls the pending task each frame.
//!
//! Native builds read and parse on a worker thread. Browsers cannot read
//! files synchronously, so the web build preloads every catalog path at
//! startup and parses from that cache.

use super::obj::{parse_obj, ModelGeometry, ObjError};
use crate::async_ops::Task;
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ModelLoadError {
    #[error("could not read {path}: {reason}")]
    Io { path: String, reason: String },
    #[error("could not decode {path}: {source}")]
    Decode { path: String, source: ObjError },
    #[error("loading {path} took longer than {secs}s")]
    Timeout { path: String, secs: f64 },
    #[error("loading {path} was cancelled")]
    Cancelled { path: String },
}

impl ModelLoadError {
    /// Asset path the failure belongs to
    pub fn path(&self) -> &str {
        match self {
            ModelLoadError::Io { path, .. }
            | ModelLoadError::Decode { path, .. }
            | ModelLoadError::Timeout { path, .. }
            | ModelLoadError::Cancelled { path } => path,
        }
    }
}

/// A load in flight
pub type PendingModel = Task<Result<ModelGeometry, ModelLoadError>>;

pub trait AssetLoader {
    /// Start loading `path`; never blocks
    fn load(&self, path: &str) -> PendingModel;
}

fn decode(path: &str, bytes: &[u8]) -> Result<ModelGeometry, ModelLoadError> {
    let text = std::str::from_utf8(bytes).map_err(|e| ModelLoadError::Io {
        path: path.to_string(),
        reason: e.to_string(),
    })?;
    parse_obj(text).map_err(|source| ModelLoadError::Decode {
        path: path.to_string(),
        source,
    })
}

/// Loads OBJ files from disk (native) or from preloaded bytes (web)
#[derive(Default)]
pub struct FileAssetLoader {
    preloaded: HashMap<String, Arc<Vec<u8>>>,
}

impl FileAssetLoader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fetch every path up front through macroquad's file API
    ///
    /// Missing files are skipped with a warning; requesting them later fails
    /// through the normal load-failure path.
    #[cfg(target_arch = "wasm32")]
    pub async fn preload(paths: &[String]) -> Self {
        let mut loader = Self::new();
        for path in paths {
            match macroquad::file::load_file(path).await {
                Ok(bytes) => {
                    loader.insert(path, bytes);
                }
                Err(e) => log::warn!("Preload of {} failed: {}", path, e),
            }
        }
        log::info!("Preloaded {} of {} model files", loader.preloaded.len(), paths.len());
        loader
    }

    #[cfg(any(test, target_arch = "wasm32"))]
    pub fn insert(&mut self, path: &str, bytes: Vec<u8>) {
        self.preloaded.insert(path.to_string(), Arc::new(bytes));
    }
}

impl AssetLoader for FileAssetLoader {
    fn load(&self, path: &str) -> PendingModel {
        let path = path.to_string();
        if let Some(bytes) = self.preloaded.get(&path).cloned() {
            return Task::spawn(move || decode(&path, &bytes));
        }
        load_from_disk(path)
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn load_from_disk(path: String) -> PendingModel {
    Task::spawn(move || {
        let bytes = std::fs::read(&path).map_err(|e| ModelLoadError::Io {
            path: path.clone(),
            reason: e.to_string(),
        })?;
        decode(&path, &bytes)
    })
}

#[cfg(target_arch = "wasm32")]
fn load_from_disk(path: String) -> PendingModel {
    Task::ready(Err(ModelLoadError::Io {
        reason: "not preloaded".to_string(),
        path,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::async_ops::TaskPoll;
    use std::time::{Duration, Instant};

    const TRI: &str = "v 0 0 0\nv 1 0 0\nv 0 1 0\no body\nf 1 2 3\n";

    fn finish(mut pending: PendingModel) -> Result<ModelGeometry, ModelLoadError> {
        let start = Instant::now();
        loop {
            match pending.poll() {
                TaskPoll::Ready(result) => return result,
                TaskPoll::Pending if start.elapsed() < Duration::from_secs(5) => {
                    std::thread::sleep(Duration::from_millis(1))
                }
                _ => panic!("load did not finish"),
            }
        }
    }

    #[test]
    fn test_loads_preloaded_bytes() {
        let mut loader = FileAssetLoader::new();
        loader.insert("mem/tri.obj", TRI.as_bytes().to_vec());
        let model = finish(loader.load("mem/tri.obj")).unwrap();
        assert_eq!(model.part_names(), vec!["body".to_string()]);
    }

    #[test]
    fn test_loads_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tri.obj");
        std::fs::write(&path, TRI).unwrap();
        let model = finish(FileAssetLoader::new().load(&path.to_string_lossy())).unwrap();
        assert_eq!(model.triangle_count(), 1);
    }

    #[test]
    fn test_missing_and_malformed_files_fail() {
        let loader = FileAssetLoader::new();
        assert!(matches!(
            finish(loader.load("/definitely/not/here.obj")),
            Err(ModelLoadError::Io { .. })
        ));

        let mut loader = FileAssetLoader::new();
        loader.insert("bad.obj", b"v 0 0\n".to_vec());
        assert!(matches!(
            finish(loader.load("bad.obj")),
            Err(ModelLoadError::Decode { .. })
        ));
    }
}
