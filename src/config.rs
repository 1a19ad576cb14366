//! Configurator settings loaded from `assets/configurator.ron`
//!
//! The file lists the model catalog (per-tier asset paths and LOD
//! thresholds), fabric presets, and tuning knobs for the camera, the model
//! swap and clip recording. Anything missing takes the built-in default; a
//! file that fails to parse or validate is reported and replaced wholesale by
//! the defaults so the configurator always starts.

use crate::lod::{LodError, LodThresholds};
use crate::material::{MaterialPresetEntry, TextureMapSet};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;

/// Location of the config file (relative to the working dir / web root)
pub const CONFIG_PATH: &str = "assets/configurator.ron";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read config: {0}")]
    Io(String),
    #[error("could not parse config: {0}")]
    Parse(#[from] ron::error::SpannedError),
    #[error("invalid config: {0}")]
    Invalid(String),
}

impl From<LodError> for ConfigError {
    fn from(e: LodError) -> Self {
        ConfigError::Invalid(e.to_string())
    }
}

/// One entry of the model catalog
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelEntry {
    pub name: String,
    /// Asset path per quality tier
    pub paths: BTreeMap<u8, String>,
    pub thresholds: LodThresholds,
}

impl ModelEntry {
    fn validate(&self) -> Result<(), ConfigError> {
        if self.name.trim().is_empty() {
            return Err(ConfigError::Invalid("model with empty name".into()));
        }
        for tier in self.thresholds.tiers() {
            if !self.paths.contains_key(&tier) {
                return Err(ConfigError::Invalid(format!(
                    "model '{}' has a threshold for tier {} but no asset path",
                    self.name, tier
                )));
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    pub fov_deg: f32,
    pub start_distance: f32,
    pub min_distance: f32,
    pub max_distance: f32,
    /// Radians of yaw per pixel of right-drag
    pub orbit_speed: f32,
    /// Fraction of distance per wheel notch
    pub zoom_speed: f32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            fov_deg: 30.0,
            start_distance: 4.0,
            min_distance: 2.0,
            max_distance: 80.0,
            orbit_speed: 0.008,
            zoom_speed: 0.1,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SwapConfig {
    /// Loads still pending after this long are treated as failed
    pub load_timeout_secs: f64,
    /// Settling time between installing a model and re-applying selection
    pub restore_delay_secs: f64,
}

impl Default for SwapConfig {
    fn default() -> Self {
        Self {
            load_timeout_secs: 10.0,
            restore_delay_secs: 0.05,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RecordingConfig {
    pub duration_secs: f64,
    pub fps: u32,
    /// Captured frames are downscaled to at most this width
    pub max_width: u32,
}

impl Default for RecordingConfig {
    fn default() -> Self {
        Self {
            duration_secs: 8.0,
            fps: 12,
            max_width: 480,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConfiguratorConfig {
    /// Model catalog; the first entry loads at startup
    pub models: Vec<ModelEntry>,
    pub materials: Vec<MaterialPresetEntry>,
    pub decal_image: String,
    /// Override for the native storage directory
    pub storage_dir: Option<String>,
    pub camera: CameraConfig,
    pub swap: SwapConfig,
    pub recording: RecordingConfig,
}

impl Default for ConfiguratorConfig {
    fn default() -> Self {
        Self {
            models: default_models(),
            materials: default_materials(),
            decal_image: "assets/decal.png".to_string(),
            storage_dir: None,
            camera: CameraConfig::default(),
            swap: SwapConfig::default(),
            recording: RecordingConfig::default(),
        }
    }
}

impl ConfiguratorConfig {
    /// Parse and validate RON text
    pub fn from_ron_str(text: &str) -> Result<Self, ConfigError> {
        let config: ConfiguratorConfig = ron::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.models.is_empty() {
            return Err(ConfigError::Invalid("model catalog is empty".into()));
        }
        for (i, model) in self.models.iter().enumerate() {
            model.validate()?;
            if self.models[..i].iter().any(|m| m.name == model.name) {
                return Err(ConfigError::Invalid(format!("duplicate model '{}'", model.name)));
            }
        }

        let cam = &self.camera;
        if !(cam.min_distance > 0.0 && cam.min_distance <= cam.max_distance) {
            return Err(ConfigError::Invalid(format!(
                "camera distance range {}..{} is invalid",
                cam.min_distance, cam.max_distance
            )));
        }
        if self.recording.fps == 0 || self.recording.duration_secs <= 0.0 {
            return Err(ConfigError::Invalid("recording needs a positive fps and duration".into()));
        }
        if self.swap.load_timeout_secs <= 0.0 {
            return Err(ConfigError::Invalid("load timeout must be positive".into()));
        }
        Ok(())
    }

    pub fn model(&self, name: &str) -> Option<&ModelEntry> {
        self.models.iter().find(|m| m.name == name)
    }

    /// Startup model (validation guarantees the catalog is non-empty)
    pub fn default_model(&self) -> Option<&ModelEntry> {
        self.models.first()
    }

    /// Every asset path the catalog can request
    #[cfg(any(test, target_arch = "wasm32"))]
    pub fn all_model_paths(&self) -> Vec<String> {
        let mut paths: Vec<String> = self
            .models
            .iter()
            .flat_map(|m| m.paths.values().cloned())
            .collect();
        paths.sort();
        paths.dedup();
        paths
    }
}

async fn read_config() -> Result<ConfiguratorConfig, ConfigError> {
    let text = macroquad::file::load_string(CONFIG_PATH)
        .await
        .map_err(|e| ConfigError::Io(e.to_string()))?;
    ConfiguratorConfig::from_ron_str(&text)
}

/// Load the config file, falling back to defaults on any failure
pub async fn load_config() -> ConfiguratorConfig {
    match read_config().await {
        Ok(config) => {
            log::info!("Loaded {} ({} models)", CONFIG_PATH, config.models.len());
            config
        }
        Err(e) => {
            log::warn!("{}: {}, using defaults", CONFIG_PATH, e);
            ConfiguratorConfig::default()
        }
    }
}

fn default_models() -> Vec<ModelEntry> {
    let hoodie_thresholds: BTreeMap<u8, f32> =
        [(0, 15.0), (1, 44.0), (2, 55.0), (3, 66.0)].into_iter().collect();
    let crew_thresholds: BTreeMap<u8, f32> = [(0, 20.0), (1, 60.0)].into_iter().collect();

    let mut models = Vec::new();
    if let Ok(thresholds) = LodThresholds::new(hoodie_thresholds) {
        models.push(ModelEntry {
            name: "Hoodie".to_string(),
            paths: (0..=3)
                .map(|tier| (tier, format!("assets/models/hoodie_lod{}.obj", tier)))
                .collect(),
            thresholds,
        });
    }
    if let Ok(thresholds) = LodThresholds::new(crew_thresholds) {
        models.push(ModelEntry {
            name: "Crewneck".to_string(),
            paths: (0..=1)
                .map(|tier| (tier, format!("assets/models/crewneck_lod{}.obj", tier)))
                .collect(),
            thresholds,
        });
    }
    models
}

fn default_materials() -> Vec<MaterialPresetEntry> {
    let preset = |key: &str, label: &str, tint: &str| MaterialPresetEntry {
        key: key.to_string(),
        label: label.to_string(),
        tint: tint.to_string(),
        maps: TextureMapSet::in_dir(&format!("assets/materials/{}", key)),
    };
    vec![
        preset("cotton", "Cotton", "#ffffff"),
        preset("fleece", "Fleece", "#f2efe8"),
        preset("denim", "Denim", "#c9d6ec"),
        preset("leather", "Leather", "#e6d3c2"),
    ]
}
