//! Loaded model resources
//!
//! A `LoadedModel` is everything one asset path puts on the GPU: per-part
//! geometry plus the material textures bound to each part. Exactly one is
//! active at a time and it is owned by the swap controller.

use super::obj::{ModelGeometry, PartGeometry};
use crate::material::PartMaterial;

/// One renderable part
#[derive(Debug, Clone)]
pub struct ModelPart {
    pub geometry: PartGeometry,
    pub material: PartMaterial,
}

impl ModelPart {
    pub fn name(&self) -> &str {
        &self.geometry.name
    }
}

#[derive(Debug)]
pub struct LoadedModel {
    path: String,
    parts: Vec<ModelPart>,
    byte_size: usize,
    disposed: bool,
}

impl LoadedModel {
    pub fn new(path: &str, geometry: ModelGeometry) -> Self {
        let byte_size = geometry.byte_size();
        let parts = geometry
            .parts
            .into_iter()
            .map(|geometry| ModelPart {
                geometry,
                material: PartMaterial::default(),
            })
            .collect();
        Self {
            path: path.to_string(),
            parts,
            byte_size,
            disposed: false,
        }
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn parts(&self) -> &[ModelPart] {
        &self.parts
    }

    pub fn parts_mut(&mut self) -> &mut [ModelPart] {
        &mut self.parts
    }

    pub fn part(&self, name: &str) -> Option<&ModelPart> {
        self.parts.iter().find(|p| p.name() == name)
    }

    /// Part names in file order
    pub fn part_names(&self) -> Vec<String> {
        self.parts.iter().map(|p| p.name().to_string()).collect()
    }

    pub fn triangle_count(&self) -> usize {
        self.parts.iter().map(|p| p.geometry.triangle_count()).sum()
    }

    pub fn byte_size(&self) -> usize {
        self.byte_size
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed
    }

    /// Release geometry buffers and material textures
    ///
    /// Safe to call any number of times; only the first call frees anything.
    /// Returns whether this call did the release.
    pub fn dispose(&mut self) -> bool {
        if self.disposed {
            return false;
        }
        let parts = std::mem::take(&mut self.parts);
        log::debug!(
            "Disposing {} ({} parts, {} bytes)",
            self.path,
            parts.len(),
            self.byte_size
        );
        drop(parts);
        self.byte_size = 0;
        self.disposed = true;
        true
    }
}
