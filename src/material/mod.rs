//! Fabric material presets
//!
//! A preset is a named bundle of PBR texture maps plus a tint. Maps are
//! decoded once at startup (CPU side, testable without a GPU) and uploaded to
//! textures lazily the first time a part binds the preset.
//!
//! `PartMaterial` is the capability a renderable part exposes: every map is
//! an optional slot, so a preset that only ships a base color map is as valid
//! as a full set.

use macroquad::prelude::{Color, FilterMode, Texture2D};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum MaterialError {
    #[error("could not decode texture map: {0}")]
    Decode(#[from] image::ImageError),
}

/// Texture map slots a part material can carry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MapSlot {
    BaseColor,
    Normal,
    Roughness,
    Metallic,
    Ao,
    Height,
    Emissive,
}

impl MapSlot {
    pub const ALL: [MapSlot; 7] = [
        MapSlot::BaseColor,
        MapSlot::Normal,
        MapSlot::Roughness,
        MapSlot::Metallic,
        MapSlot::Ao,
        MapSlot::Height,
        MapSlot::Emissive,
    ];

    /// Conventional file stem inside a preset directory
    pub fn file_stem(&self) -> &'static str {
        match self {
            MapSlot::BaseColor => "basecolor",
            MapSlot::Normal => "normal",
            MapSlot::Roughness => "roughness",
            MapSlot::Metallic => "metallic",
            MapSlot::Ao => "ao",
            MapSlot::Height => "height",
            MapSlot::Emissive => "emissive",
        }
    }
}

/// Asset paths of a preset's maps (any may be absent)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TextureMapSet {
    pub base_color: Option<String>,
    pub normal: Option<String>,
    pub roughness: Option<String>,
    pub metallic: Option<String>,
    pub ao: Option<String>,
    pub height: Option<String>,
    pub emissive: Option<String>,
}

impl TextureMapSet {
    /// All seven slots following the `<dir>/<slot>.png` convention
    pub fn in_dir(dir: &str) -> Self {
        let path = |slot: MapSlot| Some(format!("{}/{}.png", dir, slot.file_stem()));
        Self {
            base_color: path(MapSlot::BaseColor),
            normal: path(MapSlot::Normal),
            roughness: path(MapSlot::Roughness),
            metallic: path(MapSlot::Metallic),
            ao: path(MapSlot::Ao),
            height: path(MapSlot::Height),
            emissive: path(MapSlot::Emissive),
        }
    }

    pub fn get(&self, slot: MapSlot) -> Option<&str> {
        let path = match slot {
            MapSlot::BaseColor => &self.base_color,
            MapSlot::Normal => &self.normal,
            MapSlot::Roughness => &self.roughness,
            MapSlot::Metallic => &self.metallic,
            MapSlot::Ao => &self.ao,
            MapSlot::Height => &self.height,
            MapSlot::Emissive => &self.emissive,
        };
        path.as_deref()
    }
}

/// Catalog entry for a fabric preset
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MaterialPresetEntry {
    pub key: String,
    pub label: String,
    /// Default tint, copied into the shared state's preset colors
    pub tint: String,
    #[serde(default)]
    pub maps: TextureMapSet,
}

/// A decoded map kept on the CPU until first use
#[derive(Debug, Clone)]
pub struct DecodedMap {
    pub slot: MapSlot,
    pub width: u16,
    pub height: u16,
    pub rgba: Vec<u8>,
    /// Per-channel mean in [0, 1]
    pub mean: [f32; 4],
}

/// Largest edge a map may have after decoding
const MAX_MAP_SIZE: u32 = 1024;

/// Decode PNG/JPEG/BMP bytes into an RGBA map
pub fn decode_map(slot: MapSlot, bytes: &[u8]) -> Result<DecodedMap, MaterialError> {
    let mut img = image::load_from_memory(bytes)?;
    if img.width() > MAX_MAP_SIZE || img.height() > MAX_MAP_SIZE {
        img = img.resize(MAX_MAP_SIZE, MAX_MAP_SIZE, image::imageops::FilterType::Triangle);
    }
    let rgba = img.to_rgba8();
    let (width, height) = rgba.dimensions();

    let mut sums = [0u64; 4];
    for pixel in rgba.pixels() {
        for (sum, channel) in sums.iter_mut().zip(pixel.0.iter()) {
            *sum += *channel as u64;
        }
    }
    let count = (width as u64 * height as u64).max(1) as f32;
    let mean = sums.map(|s| s as f32 / count / 255.0);

    Ok(DecodedMap {
        slot,
        width: width as u16,
        height: height as u16,
        rgba: rgba.into_raw(),
        mean,
    })
}

/// Scalar surface response derived from the map means
///
/// The fixed-function renderer shades per vertex, so scalar maps contribute
/// their average while the base color map is sampled as a texture.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SurfaceStats {
    pub roughness: f32,
    pub metallic: f32,
    pub ao: f32,
    pub emissive: [f32; 3],
    /// Mean normal-map tilt away from +Z (0 = flat)
    pub bumpiness: f32,
}

impl Default for SurfaceStats {
    fn default() -> Self {
        Self {
            roughness: 0.9,
            metallic: 0.0,
            ao: 1.0,
            emissive: [0.0; 3],
            bumpiness: 0.0,
        }
    }
}

impl SurfaceStats {
    pub fn from_maps(maps: &[DecodedMap]) -> Self {
        let mut stats = Self::default();
        for map in maps {
            match map.slot {
                MapSlot::Roughness => stats.roughness = map.mean[0],
                MapSlot::Metallic => stats.metallic = map.mean[0],
                MapSlot::Ao => stats.ao = map.mean[0],
                MapSlot::Emissive => stats.emissive = [map.mean[0], map.mean[1], map.mean[2]],
                MapSlot::Normal => {
                    // Tangent-space blue channel: 1.0 means straight up
                    stats.bumpiness = (1.0 - map.mean[2]).clamp(0.0, 1.0);
                }
                MapSlot::BaseColor | MapSlot::Height => {}
            }
        }
        stats
    }
}

/// Material slots bound to one renderable part
#[derive(Debug, Clone, Default)]
pub struct PartMaterial {
    pub preset: Option<String>,
    pub base_color_map: Option<Texture2D>,
    pub normal_map: Option<Texture2D>,
    pub roughness_map: Option<Texture2D>,
    pub metallic_map: Option<Texture2D>,
    pub ao_map: Option<Texture2D>,
    pub height_map: Option<Texture2D>,
    pub emissive_map: Option<Texture2D>,
    pub stats: SurfaceStats,
}

impl PartMaterial {
    pub fn set_map(&mut self, slot: MapSlot, texture: Option<Texture2D>) {
        let target = match slot {
            MapSlot::BaseColor => &mut self.base_color_map,
            MapSlot::Normal => &mut self.normal_map,
            MapSlot::Roughness => &mut self.roughness_map,
            MapSlot::Metallic => &mut self.metallic_map,
            MapSlot::Ao => &mut self.ao_map,
            MapSlot::Height => &mut self.height_map,
            MapSlot::Emissive => &mut self.emissive_map,
        };
        *target = texture;
    }

    pub fn map(&self, slot: MapSlot) -> Option<&Texture2D> {
        match slot {
            MapSlot::BaseColor => self.base_color_map.as_ref(),
            MapSlot::Normal => self.normal_map.as_ref(),
            MapSlot::Roughness => self.roughness_map.as_ref(),
            MapSlot::Metallic => self.metallic_map.as_ref(),
            MapSlot::Ao => self.ao_map.as_ref(),
            MapSlot::Height => self.height_map.as_ref(),
            MapSlot::Emissive => self.emissive_map.as_ref(),
        }
    }

    /// Number of occupied map slots
    pub fn bound_maps(&self) -> usize {
        MapSlot::ALL.iter().filter(|slot| self.map(**slot).is_some()).count()
    }
}

struct PresetMaps {
    decoded: Vec<DecodedMap>,
    uploaded: Option<PartMaterial>,
}

/// Decoded presets keyed by preset key
#[derive(Default)]
pub struct MaterialLibrary {
    presets: HashMap<String, PresetMaps>,
}

impl MaterialLibrary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Read and decode every preset's maps; missing or broken maps are
    /// skipped with a warning
    pub async fn load(entries: &[MaterialPresetEntry]) -> Self {
        let mut library = Self::new();
        for entry in entries {
            let mut decoded = Vec::new();
            for slot in MapSlot::ALL {
                let Some(path) = entry.maps.get(slot) else {
                    continue;
                };
                let bytes = match macroquad::file::load_file(path).await {
                    Ok(bytes) => bytes,
                    Err(e) => {
                        log::warn!("Material '{}': {} missing ({})", entry.key, path, e);
                        continue;
                    }
                };
                match decode_map(slot, &bytes) {
                    Ok(map) => decoded.push(map),
                    Err(e) => log::warn!("Material '{}': {}: {}", entry.key, path, e),
                }
            }
            log::info!("Material '{}': {} maps", entry.key, decoded.len());
            library.insert_decoded(&entry.key, decoded);
        }
        library
    }

    pub fn insert_decoded(&mut self, key: &str, decoded: Vec<DecodedMap>) {
        self.presets.insert(
            key.to_string(),
            PresetMaps {
                decoded,
                uploaded: None,
            },
        );
    }

    pub fn contains(&self, key: &str) -> bool {
        self.presets.contains_key(key)
    }

    /// Material for a preset, uploading its textures on first use
    ///
    /// Requires a live graphics context. Unknown keys yield a plain material.
    pub fn material_for(&mut self, key: &str) -> PartMaterial {
        let Some(preset) = self.presets.get_mut(key) else {
            return PartMaterial::default();
        };

        if preset.uploaded.is_none() {
            let mut material = PartMaterial {
                preset: Some(key.to_string()),
                stats: SurfaceStats::from_maps(&preset.decoded),
                ..Default::default()
            };
            for map in &preset.decoded {
                let texture = Texture2D::from_rgba8(map.width, map.height, &map.rgba);
                texture.set_filter(FilterMode::Linear);
                material.set_map(map.slot, Some(texture));
            }
            preset.uploaded = Some(material);
        }

        preset.uploaded.clone().unwrap_or_default()
    }
}

/// Parts a preset change applies to
pub fn preset_targets<'a>(
    parts: impl IntoIterator<Item = &'a String>,
    decal_target: &str,
    apply_to_target_only: bool,
) -> Vec<String> {
    parts
        .into_iter()
        .filter(|part| !apply_to_target_only || part.as_str() == decal_target)
        .cloned()
        .collect()
}

/// Multiply a part color by a preset tint
pub fn tinted(color: Color, tint: Color) -> Color {
    Color::new(color.r * tint.r, color.g * tint.g, color.b * tint.b, color.a)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn png(width: u32, height: u32, pixel: [u8; 4]) -> Vec<u8> {
        let img = image::RgbaImage::from_pixel(width, height, image::Rgba(pixel));
        let mut bytes = Vec::new();
        img.write_to(&mut std::io::Cursor::new(&mut bytes), image::ImageFormat::Png)
            .unwrap();
        bytes
    }

    #[test]
    fn test_decode_map_computes_mean() {
        let map = decode_map(MapSlot::Roughness, &png(4, 2, [128, 0, 255, 255])).unwrap();
        assert_eq!((map.width, map.height), (4, 2));
        assert_eq!(map.rgba.len(), 4 * 2 * 4);
        assert!((map.mean[0] - 128.0 / 255.0).abs() < 1e-4);
        assert_eq!(map.mean[1], 0.0);
        assert_eq!(map.mean[2], 1.0);
    }

    #[test]
    fn test_decode_rejects_garbage() {
        assert!(matches!(
            decode_map(MapSlot::BaseColor, b"not an image"),
            Err(MaterialError::Decode(_))
        ));
    }

    #[test]
    fn test_surface_stats_from_maps() {
        let maps = vec![
            decode_map(MapSlot::Roughness, &png(2, 2, [51, 51, 51, 255])).unwrap(),
            decode_map(MapSlot::Ao, &png(2, 2, [204, 204, 204, 255])).unwrap(),
            decode_map(MapSlot::Normal, &png(2, 2, [128, 128, 255, 255])).unwrap(),
        ];
        let stats = SurfaceStats::from_maps(&maps);
        assert!((stats.roughness - 0.2).abs() < 1e-3);
        assert!((stats.ao - 0.8).abs() < 1e-3);
        assert_eq!(stats.metallic, 0.0);
        assert!(stats.bumpiness < 1e-4);
    }

    #[test]
    fn test_map_set_convention() {
        let maps = TextureMapSet::in_dir("assets/materials/denim");
        assert_eq!(maps.get(MapSlot::Ao), Some("assets/materials/denim/ao.png"));
        assert_eq!(
            maps.get(MapSlot::BaseColor),
            Some("assets/materials/denim/basecolor.png")
        );
        assert_eq!(TextureMapSet::default().get(MapSlot::Normal), None);
    }

    #[test]
    fn test_preset_targets() {
        let parts: Vec<String> = ["body", "hood", "pocket"].iter().map(|s| s.to_string()).collect();
        assert_eq!(preset_targets(&parts, "hood", false).len(), 3);
        assert_eq!(preset_targets(&parts, "hood", true), vec!["hood".to_string()]);
        assert!(preset_targets(&parts, "", true).is_empty());
    }

    #[test]
    fn test_library_knows_inserted_presets() {
        let mut library = MaterialLibrary::new();
        library.insert_decoded("denim", Vec::new());
        library.insert_decoded("cotton", Vec::new());
        assert!(library.contains("denim"));
        assert!(library.contains("cotton"));
        assert!(!library.contains("silk"));
    }
}
