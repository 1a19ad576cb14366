//! Settings presets
//!
//! A preset is a named copy of the lights, shadows and decal transform. The
//! whole list is persisted as one JSON blob under `presets` on every change.

use super::{read_list, write_list, KeyValueStore, StorageError};
use crate::state::{SceneSettings, StateStore, Topic};
use serde::{Deserialize, Serialize};

pub const PRESETS_KEY: &str = "presets";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Preset {
    /// Creation timestamp in milliseconds, bumped to stay unique
    pub id: u64,
    pub name: String,
    pub settings: SceneSettings,
}

#[derive(Debug, Default)]
pub struct PresetStore {
    presets: Vec<Preset>,
    current: Option<u64>,
}

impl PresetStore {
    /// Read the saved list (empty if nothing or nothing readable was saved)
    pub fn load(kv: &dyn KeyValueStore) -> Self {
        let presets: Vec<Preset> = read_list(kv, PRESETS_KEY);
        log::info!("Loaded {} presets", presets.len());
        Self {
            presets,
            current: None,
        }
    }

    pub fn list(&self) -> &[Preset] {
        &self.presets
    }

    pub fn get(&self, id: u64) -> Option<&Preset> {
        self.presets.iter().find(|p| p.id == id)
    }

    /// Preset last saved or loaded
    pub fn current(&self) -> Option<u64> {
        self.current
    }

    fn next_id(&self, now_ms: u64) -> u64 {
        let last = self.presets.iter().map(|p| p.id).max();
        match last {
            Some(last) if now_ms <= last => last + 1,
            _ => now_ms,
        }
    }

    /// Append a snapshot and persist the list; the new preset becomes current
    pub fn save_preset(
        &mut self,
        kv: &mut dyn KeyValueStore,
        name: &str,
        settings: SceneSettings,
        now_ms: u64,
    ) -> Result<u64, StorageError> {
        let id = self.next_id(now_ms);
        let name = if name.trim().is_empty() {
            format!("Preset {}", self.presets.len() + 1)
        } else {
            name.trim().to_string()
        };
        self.presets.push(Preset { id, name, settings });

        if let Err(e) = write_list(kv, PRESETS_KEY, &self.presets) {
            self.presets.pop();
            log::error!("Saving preset failed: {}", e);
            return Err(e);
        }
        self.current = Some(id);
        Ok(id)
    }

    /// Copy a preset's settings into the shared state, replacing lights,
    /// shadows and decal transform wholesale
    pub fn load_preset(&mut self, id: u64, store: &mut StateStore) -> bool {
        let Some(preset) = self.get(id) else {
            log::warn!("No preset with id {}", id);
            return false;
        };
        let settings = preset.settings.clone();
        store.mutate_all(&[Topic::Lights, Topic::Scene, Topic::Decal], |s| {
            s.apply_settings(settings)
        });
        self.current = Some(id);
        true
    }

    /// Remove a preset; deleting the current one clears the pointer
    pub fn delete_preset(&mut self, kv: &mut dyn KeyValueStore, id: u64) -> Result<bool, StorageError> {
        let Some(index) = self.presets.iter().position(|p| p.id == id) else {
            return Ok(false);
        };
        let removed = self.presets.remove(index);
        if let Err(e) = write_list(kv, PRESETS_KEY, &self.presets) {
            self.presets.insert(index, removed);
            log::error!("Deleting preset failed: {}", e);
            return Err(e);
        }
        if self.current == Some(id) {
            self.current = None;
        }
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ConfiguratorConfig;
    use crate::state::lights::LightKind;
    use crate::state::ConfiguratorState;
    use crate::storage::MemoryStore;

    fn store() -> StateStore {
        StateStore::new(ConfiguratorState::from_config(&ConfiguratorConfig::default()).unwrap())
    }

    /// Backend that refuses every write
    struct ReadOnly;

    impl KeyValueStore for ReadOnly {
        fn get(&self, _key: &str) -> Result<Option<String>, StorageError> {
            Ok(None)
        }
        fn set(&mut self, _key: &str, _value: &str) -> Result<(), StorageError> {
            Err(StorageError::PermissionDenied("read-only".into()))
        }
    }

    #[test]
    fn test_save_then_load_restores_settings() {
        let mut kv = MemoryStore::new();
        let mut state = store();
        let mut presets = PresetStore::load(&kv);

        state.mutate(Topic::Lights, |s| {
            s.lights.ambient.intensity = 0.3;
            s.lights.lights[0].kind = LightKind::Point { range: 4.0 };
        });
        state.mutate(Topic::Decal, |s| s.decal.set_flipped(true));
        let saved = state.read().settings();
        let id = presets.save_preset(&mut kv, "Studio", saved.clone(), 1000).unwrap();

        // Wander off, then come back
        state.mutate_all(&[Topic::Lights, Topic::Scene, Topic::Decal], |s| {
            s.lights.lights.clear();
            s.shadows.enabled = false;
            s.decal.set_scale(1.7);
        });
        assert!(presets.load_preset(id, &mut state));
        assert_eq!(state.read().settings(), saved);
        assert_eq!(presets.current(), Some(id));

        // And it survived persistence
        let reloaded = PresetStore::load(&kv);
        assert_eq!(reloaded.get(id).map(|p| &p.settings), Some(&saved));
        assert_eq!(reloaded.get(id).map(|p| p.name.as_str()), Some("Studio"));
    }

    #[test]
    fn test_ids_are_monotonic() {
        let mut kv = MemoryStore::new();
        let mut presets = PresetStore::default();
        let settings = store().read().settings();
        let a = presets.save_preset(&mut kv, "a", settings.clone(), 5000).unwrap();
        let b = presets.save_preset(&mut kv, "b", settings.clone(), 5000).unwrap();
        let c = presets.save_preset(&mut kv, "c", settings.clone(), 10).unwrap();
        let d = presets.save_preset(&mut kv, "", settings, 9000).unwrap();
        assert_eq!((a, b, c, d), (5000, 5001, 5002, 9000));
        assert_eq!(presets.get(d).unwrap().name, "Preset 4");
    }

    #[test]
    fn test_delete_current_clears_pointer() {
        let mut kv = MemoryStore::new();
        let mut presets = PresetStore::default();
        let settings = store().read().settings();
        let a = presets.save_preset(&mut kv, "a", settings.clone(), 1).unwrap();
        let b = presets.save_preset(&mut kv, "b", settings, 2).unwrap();
        assert_eq!(presets.current(), Some(b));

        // Deleting another preset leaves the pointer alone
        assert!(presets.delete_preset(&mut kv, a).unwrap());
        assert_eq!(presets.current(), Some(b));

        assert!(presets.delete_preset(&mut kv, b).unwrap());
        assert_eq!(presets.current(), None);
        assert!(!presets.delete_preset(&mut kv, b).unwrap());
        assert!(PresetStore::load(&kv).list().is_empty());
    }

    #[test]
    fn test_failed_write_rolls_back() {
        let mut kv = ReadOnly;
        let mut presets = PresetStore::default();
        let settings = store().read().settings();
        assert!(presets.save_preset(&mut kv, "a", settings, 1).is_err());
        assert!(presets.list().is_empty());
        assert_eq!(presets.current(), None);
    }

    #[test]
    fn test_load_unknown_id() {
        let mut presets = PresetStore::default();
        let mut state = store();
        assert!(!presets.load_preset(42, &mut state));
        assert_eq!(state.revision(), 0);
    }
}
