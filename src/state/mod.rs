//! Configurator State
//!
//! Single source of truth for every configurator parameter. UI panels, the
//! scene renderer, the LOD tracker and the swap controller all read and write
//! this one tree through `StateStore`; nothing keeps a private copy.
//!
//! Writes made during a model transition replace whole subtrees (`items`,
//! the selection triple) so a reader never sees a half-rebuilt map.

pub mod decal;
pub mod lights;
pub mod store;

pub use decal::DecalTransform;
pub use lights::{LightRig, ShadowSettings};
pub use store::{StateStore, SubscriptionId, Topic};

use crate::color::WHITE_HEX;
use crate::config::{ConfiguratorConfig, ModelEntry};
use crate::lod::{select_tier, LodThresholds};
use crate::material::MaterialPresetEntry;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// The model the configurator is showing (or about to show)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurrentModel {
    pub name: String,
    pub lod: u8,
    pub paths: BTreeMap<u8, String>,
    pub thresholds: LodThresholds,
}

impl CurrentModel {
    pub fn from_entry(entry: &ModelEntry, lod: u8) -> Self {
        Self {
            name: entry.name.clone(),
            lod,
            paths: entry.paths.clone(),
            thresholds: entry.thresholds.clone(),
        }
    }

    /// Asset path of the current tier
    pub fn path(&self) -> Option<&str> {
        self.path_for(self.lod)
    }

    pub fn path_for(&self, tier: u8) -> Option<&str> {
        self.paths.get(&tier).map(|s| s.as_str())
    }
}

/// Fabric preset selection and per-part assignment
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MaterialSelection {
    /// Preset the next apply uses
    pub current: String,
    /// Tint per preset key
    pub colors: BTreeMap<String, String>,
    pub apply_to_target_only: bool,
    /// Preset bound to each part of the loaded model
    pub assigned: BTreeMap<String, String>,
}

impl MaterialSelection {
    fn from_presets(presets: &[MaterialPresetEntry]) -> Self {
        Self {
            current: presets.first().map(|p| p.key.clone()).unwrap_or_default(),
            colors: presets
                .iter()
                .map(|p| (p.key.clone(), p.tint.clone()))
                .collect(),
            apply_to_target_only: false,
            assigned: BTreeMap::new(),
        }
    }

    /// Tint of the preset assigned to a part
    pub fn tint_for_part(&self, part: &str) -> Option<&str> {
        let key = self.assigned.get(part)?;
        self.colors.get(key).map(|s| s.as_str())
    }
}

/// The subset of state a settings preset captures
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneSettings {
    pub lights: LightRig,
    pub shadows: ShadowSettings,
    pub decal: DecalTransform,
}

/// Everything the configurator controls
#[derive(Debug, Clone, PartialEq)]
pub struct ConfiguratorState {
    pub model: CurrentModel,
    pub camera_distance: f32,
    /// Part receiving the decal; empty until a model has loaded
    pub decal_target: String,
    pub decal: DecalTransform,
    /// Whether dragging on the target part moves the decal
    pub decal_drag_enabled: bool,
    pub selected_mesh: Option<String>,
    pub outlined_mesh: Option<String>,
    pub material: MaterialSelection,
    /// Part name -> hex color
    pub items: BTreeMap<String, String>,
    pub lights: LightRig,
    pub shadows: ShadowSettings,
    pub orbit_enabled: bool,
    pub float_enabled: bool,
    /// Follow camera distance (off = `forced_lod`)
    pub auto_lod: bool,
    pub forced_lod: Option<u8>,
}

impl ConfiguratorState {
    /// Initial state for the catalog's startup model (None for an empty catalog)
    pub fn from_config(config: &ConfiguratorConfig) -> Option<Self> {
        let entry = config.default_model()?;
        let distance = config.camera.start_distance;
        Some(Self {
            model: CurrentModel::from_entry(entry, select_tier(distance, &entry.thresholds)),
            camera_distance: distance,
            decal_target: String::new(),
            decal: DecalTransform::default(),
            decal_drag_enabled: true,
            selected_mesh: None,
            outlined_mesh: None,
            material: MaterialSelection::from_presets(&config.materials),
            items: BTreeMap::new(),
            lights: LightRig::default(),
            shadows: ShadowSettings::default(),
            orbit_enabled: true,
            float_enabled: true,
            auto_lod: true,
            forced_lod: None,
        })
    }

    /// Point the state at another catalog model
    ///
    /// The tier is re-derived from the current camera distance; manual LOD
    /// overrides do not carry over between models.
    pub fn switch_model(&mut self, entry: &ModelEntry) {
        let lod = select_tier(self.camera_distance, &entry.thresholds);
        self.model = CurrentModel::from_entry(entry, lod);
        self.forced_lod = None;
        self.auto_lod = true;
    }

    pub fn has_part(&self, part: &str) -> bool {
        self.items.contains_key(part)
    }

    /// Replace `items` for a freshly loaded part list
    ///
    /// With `keep_colors`, parts that existed before keep their color; every
    /// other part starts white.
    pub fn rebuild_items(&mut self, parts: &[String], keep_colors: bool) {
        let items = parts
            .iter()
            .map(|part| {
                let color = keep_colors
                    .then(|| self.items.get(part).cloned())
                    .flatten()
                    .unwrap_or_else(|| WHITE_HEX.to_string());
                (part.clone(), color)
            })
            .collect();
        self.items = items;
    }

    /// Replace preset assignments for a freshly loaded part list
    ///
    /// Surviving parts keep their preset (when `keep` is set), new parts take
    /// the current preset.
    pub fn rebuild_assignments(&mut self, parts: &[String], keep: bool) {
        let current = self.material.current.clone();
        let assigned = parts
            .iter()
            .map(|part| {
                let key = keep
                    .then(|| self.material.assigned.get(part).cloned())
                    .flatten()
                    .unwrap_or_else(|| current.clone());
                (part.clone(), key)
            })
            .collect();
        self.material.assigned = assigned;
    }

    /// Drop selection references that do not name a loaded part
    pub fn drop_missing_selection(&mut self) {
        let keep = |name: Option<String>, items: &BTreeMap<String, String>| {
            name.filter(|n| items.contains_key(n))
        };
        self.selected_mesh = keep(self.selected_mesh.take(), &self.items);
        self.outlined_mesh = keep(self.outlined_mesh.take(), &self.items);
        if !self.items.contains_key(&self.decal_target) {
            self.decal_target.clear();
        }
    }

    /// Select a part from the mesh list: selection, outline and decal target
    /// all follow it
    pub fn focus_part(&mut self, part: &str) {
        if !self.has_part(part) {
            return;
        }
        self.selected_mesh = Some(part.to_string());
        self.outlined_mesh = Some(part.to_string());
        self.decal_target = part.to_string();
    }

    pub fn set_part_color(&mut self, part: &str, hex: String) {
        if let Some(color) = self.items.get_mut(part) {
            *color = hex;
        }
    }

    pub fn settings(&self) -> SceneSettings {
        SceneSettings {
            lights: self.lights.clone(),
            shadows: self.shadows.clone(),
            decal: self.decal.clone(),
        }
    }

    /// Replace lights, shadows and decal transform wholesale
    pub fn apply_settings(&mut self, settings: SceneSettings) {
        self.lights = settings.lights;
        self.shadows = settings.shadows;
        self.decal = settings.decal;
    }

    /// Tier requested by the LOD override, if manual
    pub fn lod_override(&self) -> Option<u8> {
        if self.auto_lod {
            None
        } else {
            Some(self.forced_lod.unwrap_or(self.model.lod))
        }
    }
}
