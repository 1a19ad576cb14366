//! User selection carried across a model swap

use crate::state::ConfiguratorState;

/// Decal target, selected part and outlined part at the start of a swap
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SelectionSnapshot {
    pub decal_target: String,
    pub selected_mesh: Option<String>,
    pub outlined_mesh: Option<String>,
}

impl SelectionSnapshot {
    pub fn capture(state: &ConfiguratorState) -> Self {
        Self {
            decal_target: state.decal_target.clone(),
            selected_mesh: state.selected_mesh.clone(),
            outlined_mesh: state.outlined_mesh.clone(),
        }
    }

    /// Decal target right after install: the old target if the new model
    /// still has it, otherwise the first part
    pub fn install_target(&self, parts: &[String]) -> String {
        if parts.contains(&self.decal_target) {
            self.decal_target.clone()
        } else {
            parts.first().cloned().unwrap_or_default()
        }
    }

    /// Re-apply the snapshot, dropping names the new model lacks
    pub fn restore(&self, state: &mut ConfiguratorState, parts: &[String]) {
        let valid = |name: &Option<String>| name.clone().filter(|n| parts.contains(n));
        state.selected_mesh = valid(&self.selected_mesh);
        state.outlined_mesh = valid(&self.outlined_mesh);
        if parts.contains(&self.decal_target) {
            state.decal_target = self.decal_target.clone();
        } else if !parts.contains(&state.decal_target) {
            state.decal_target = parts.first().cloned().unwrap_or_default();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ConfiguratorConfig;

    fn parts(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    fn snapshot(target: &str, selected: Option<&str>) -> SelectionSnapshot {
        SelectionSnapshot {
            decal_target: target.to_string(),
            selected_mesh: selected.map(String::from),
            outlined_mesh: selected.map(String::from),
        }
    }

    #[test]
    fn test_install_target_prefers_previous() {
        let new_parts = parts(&["body", "hood", "pocket"]);
        assert_eq!(snapshot("hood", None).install_target(&new_parts), "hood");
        assert_eq!(snapshot("cuff", None).install_target(&new_parts), "body");
        assert_eq!(snapshot("", None).install_target(&new_parts), "body");
        assert_eq!(snapshot("hood", None).install_target(&[]), "");
    }

    #[test]
    fn test_restore_filters_missing_parts() {
        let mut state = ConfiguratorState::from_config(&ConfiguratorConfig::default()).unwrap();
        state.decal_target = "body".into();

        snapshot("pocket", Some("pocket")).restore(&mut state, &parts(&["body", "hood"]));
        assert_eq!(state.selected_mesh, None);
        assert_eq!(state.outlined_mesh, None);
        assert_eq!(state.decal_target, "body");

        snapshot("hood", Some("hood")).restore(&mut state, &parts(&["body", "hood"]));
        assert_eq!(state.selected_mesh.as_deref(), Some("hood"));
        assert_eq!(state.decal_target, "hood");
    }
}
