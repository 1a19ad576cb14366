//! What the panels ask for
//!
//! Panels never touch state directly. They return `PanelAction`s and the app
//! applies them: state edits go through `apply_to_state` (one topic per
//! edit), the rest (presets, recordings) are handled by the app itself.

use crate::config::ConfiguratorConfig;
use crate::material::preset_targets;
use crate::state::{DecalTransform, ShadowSettings, StateStore, Topic};

#[derive(Debug, Clone, PartialEq)]
pub enum PanelAction {
    SelectModel(String),
    SetAutoLod(bool),
    ForceLod(u8),
    FocusPart(String),
    SetPartColor { part: String, hex: String },
    SetDecalTarget(String),
    /// Pick a new decal image from disk
    ImportDecal,
    SetDecal(DecalTransform),
    SetDecalFlipped(bool),
    SetDecalDrag(bool),
    SetOrbit(bool),
    SetFloat(bool),
    SelectMaterial(String),
    SetMaterialTint { key: String, hex: String },
    SetApplyToTargetOnly(bool),
    ApplyMaterial,
    SetAmbient(f32),
    SetLightEnabled(usize, bool),
    SetLightIntensity(usize, f32),
    SetShadows(ShadowSettings),
    SavePreset(String),
    LoadPreset(u64),
    DeletePreset(u64),
    StartRecording,
    StopRecording,
    ExportRecording(u64),
    DeleteRecording(u64),
}

/// Apply a state edit; returns false for actions the app handles itself
/// (and for edits that name something that does not exist)
pub fn apply_to_state(action: &PanelAction, store: &mut StateStore, config: &ConfiguratorConfig) -> bool {
    match action {
        PanelAction::SelectModel(name) => {
            let Some(entry) = config.model(name) else {
                log::warn!("Unknown model '{}'", name);
                return false;
            };
            if store.read().model.name == entry.name {
                return false;
            }
            store.mutate_all(&[Topic::Model, Topic::Lod], |s| s.switch_model(entry));
            true
        }
        PanelAction::SetAutoLod(auto) => {
            store.mutate(Topic::Lod, |s| {
                s.auto_lod = *auto;
                if *auto {
                    s.forced_lod = None;
                }
            });
            true
        }
        PanelAction::ForceLod(tier) => {
            if !store.read().model.thresholds.contains(*tier) {
                return false;
            }
            store.mutate(Topic::Lod, |s| {
                s.auto_lod = false;
                s.forced_lod = Some(*tier);
            });
            true
        }
        PanelAction::FocusPart(part) => {
            if !store.read().has_part(part) {
                return false;
            }
            store.mutate(Topic::Selection, |s| s.focus_part(part));
            true
        }
        PanelAction::SetPartColor { part, hex } => {
            if !store.read().has_part(part) {
                return false;
            }
            store.mutate(Topic::Items, |s| s.set_part_color(part, hex.clone()));
            true
        }
        PanelAction::SetDecalTarget(part) => {
            if !store.read().has_part(part) {
                return false;
            }
            store.mutate(Topic::Decal, |s| s.decal_target = part.clone());
            true
        }
        PanelAction::SetDecal(decal) => {
            store.mutate(Topic::Decal, |s| {
                let mut decal = decal.clone();
                decal.set_scale(decal.scale);
                decal.set_opacity(decal.opacity);
                s.decal = decal;
            });
            true
        }
        PanelAction::SetDecalFlipped(flipped) => {
            store.mutate(Topic::Decal, |s| s.decal.set_flipped(*flipped));
            true
        }
        PanelAction::SetDecalDrag(enabled) => {
            store.mutate(Topic::Decal, |s| s.decal_drag_enabled = *enabled);
            true
        }
        PanelAction::SetOrbit(enabled) => {
            store.mutate(Topic::Scene, |s| s.orbit_enabled = *enabled);
            true
        }
        PanelAction::SetFloat(enabled) => {
            store.mutate(Topic::Scene, |s| s.float_enabled = *enabled);
            true
        }
        PanelAction::SelectMaterial(key) => {
            if !store.read().material.colors.contains_key(key) {
                return false;
            }
            store.mutate(Topic::Material, |s| s.material.current = key.clone());
            true
        }
        PanelAction::SetMaterialTint { key, hex } => {
            if !store.read().material.colors.contains_key(key) {
                return false;
            }
            store.mutate(Topic::Material, |s| {
                s.material.colors.insert(key.clone(), hex.clone());
            });
            true
        }
        PanelAction::SetApplyToTargetOnly(only) => {
            store.mutate(Topic::Material, |s| s.material.apply_to_target_only = *only);
            true
        }
        PanelAction::ApplyMaterial => {
            let state = store.read();
            let targets = preset_targets(
                state.items.keys(),
                &state.decal_target,
                state.material.apply_to_target_only,
            );
            if targets.is_empty() {
                return false;
            }
            store.mutate(Topic::Material, |s| {
                let key = s.material.current.clone();
                for part in targets {
                    s.material.assigned.insert(part, key.clone());
                }
            });
            true
        }
        PanelAction::SetAmbient(intensity) => {
            store.mutate(Topic::Lights, |s| s.lights.ambient.intensity = intensity.max(0.0));
            true
        }
        PanelAction::SetLightEnabled(index, enabled) => {
            if *index >= store.read().lights.lights.len() {
                return false;
            }
            store.mutate(Topic::Lights, |s| s.lights.lights[*index].enabled = *enabled);
            true
        }
        PanelAction::SetLightIntensity(index, intensity) => {
            if *index >= store.read().lights.lights.len() {
                return false;
            }
            store.mutate(Topic::Lights, |s| s.lights.lights[*index].intensity = intensity.max(0.0));
            true
        }
        PanelAction::SetShadows(shadows) => {
            store.mutate(Topic::Scene, |s| s.shadows = shadows.clone());
            true
        }
        PanelAction::ImportDecal
        | PanelAction::SavePreset(_)
        | PanelAction::LoadPreset(_)
        | PanelAction::DeletePreset(_)
        | PanelAction::StartRecording
        | PanelAction::StopRecording
        | PanelAction::ExportRecording(_)
        | PanelAction::DeleteRecording(_) => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::ConfiguratorState;

    fn setup() -> (ConfiguratorConfig, StateStore) {
        let config = ConfiguratorConfig::default();
        let mut store = StateStore::new(ConfiguratorState::from_config(&config).unwrap());
        store.mutate(Topic::Items, |s| {
            let parts = vec!["body".to_string(), "hood".to_string(), "pocket".to_string()];
            s.rebuild_items(&parts, false);
            s.rebuild_assignments(&parts, false);
            s.decal_target = "body".into();
        });
        (config, store)
    }

    #[test]
    fn test_select_model_switches_and_notifies() {
        let (config, mut store) = setup();
        let sub = store.subscribe(&[Topic::Model]);
        assert!(apply_to_state(&PanelAction::SelectModel("Crewneck".into()), &mut store, &config));
        assert_eq!(store.read().model.name, "Crewneck");
        assert_eq!(store.drain(sub).len(), 1);

        // Same model again is a no-op
        assert!(!apply_to_state(&PanelAction::SelectModel("Crewneck".into()), &mut store, &config));
        assert!(!apply_to_state(&PanelAction::SelectModel("Parka".into()), &mut store, &config));
        assert!(!store.has_pending(sub));
    }

    #[test]
    fn test_force_lod_checks_tier() {
        let (config, mut store) = setup();
        assert!(apply_to_state(&PanelAction::ForceLod(2), &mut store, &config));
        assert_eq!(store.read().lod_override(), Some(2));
        assert!(!apply_to_state(&PanelAction::ForceLod(9), &mut store, &config));
        assert!(apply_to_state(&PanelAction::SetAutoLod(true), &mut store, &config));
        assert_eq!(store.read().forced_lod, None);
        assert_eq!(store.read().lod_override(), None);
    }

    #[test]
    fn test_part_edits_need_a_loaded_part() {
        let (config, mut store) = setup();
        let color = PanelAction::SetPartColor {
            part: "hood".into(),
            hex: "#123456".into(),
        };
        assert!(apply_to_state(&color, &mut store, &config));
        assert_eq!(store.read().items["hood"], "#123456");

        let ghost = PanelAction::SetPartColor {
            part: "cuff".into(),
            hex: "#123456".into(),
        };
        assert!(!apply_to_state(&ghost, &mut store, &config));
        assert!(!apply_to_state(&PanelAction::FocusPart("cuff".into()), &mut store, &config));
        assert!(!apply_to_state(&PanelAction::SetDecalTarget("cuff".into()), &mut store, &config));
        assert_eq!(store.read().decal_target, "body");
    }

    #[test]
    fn test_apply_material_to_target_only() {
        let (config, mut store) = setup();
        apply_to_state(&PanelAction::SelectMaterial("denim".into()), &mut store, &config);
        apply_to_state(&PanelAction::SetApplyToTargetOnly(true), &mut store, &config);
        assert!(apply_to_state(&PanelAction::ApplyMaterial, &mut store, &config));
        let assigned = &store.read().material.assigned;
        assert_eq!(assigned["body"], "denim");
        assert_eq!(assigned["hood"], "cotton");

        apply_to_state(&PanelAction::SetApplyToTargetOnly(false), &mut store, &config);
        apply_to_state(&PanelAction::SelectMaterial("leather".into()), &mut store, &config);
        apply_to_state(&PanelAction::ApplyMaterial, &mut store, &config);
        assert!(store.read().material.assigned.values().all(|k| k == "leather"));
    }

    #[test]
    fn test_decal_edit_clamps() {
        let (config, mut store) = setup();
        let mut decal = store.read().decal.clone();
        decal.scale = -3.0;
        decal.opacity = 2.0;
        apply_to_state(&PanelAction::SetDecal(decal), &mut store, &config);
        assert!(store.read().decal.scale > 0.0);
        assert_eq!(store.read().decal.opacity, 1.0);
    }

    #[test]
    fn test_light_index_checked() {
        let (config, mut store) = setup();
        assert!(apply_to_state(&PanelAction::SetLightEnabled(2, true), &mut store, &config));
        assert!(store.read().lights.lights[2].enabled);
        assert!(!apply_to_state(&PanelAction::SetLightIntensity(7, 1.0), &mut store, &config));
    }

    #[test]
    fn test_app_actions_are_not_state_edits() {
        let (config, mut store) = setup();
        let before = store.revision();
        assert!(!apply_to_state(&PanelAction::StartRecording, &mut store, &config));
        assert!(!apply_to_state(&PanelAction::SavePreset("x".into()), &mut store, &config));
        assert_eq!(store.revision(), before);
    }
}
