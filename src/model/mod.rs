//! Garment models: OBJ decoding, loading and the loaded resource

pub mod loader;
pub mod obj;
pub mod resource;

pub use loader::{AssetLoader, FileAssetLoader, ModelLoadError, PendingModel};
pub use resource::{LoadedModel, ModelPart};
