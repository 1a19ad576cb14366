//! Decal dragging
//!
//! Pointer-down on the decal's target part starts a drag; every pointer move
//! that still hits the mesh writes the hit point, converted into the target
//! part's local frame, as the new decal position. Pointer-up ends the drag no
//! matter where it happens. Drag state lives here only and is never saved.

use crate::state::{StateStore, Topic};
use macroquad::math::{Mat4, Vec3};

/// Determinant below which a transform is treated as singular
const SINGULAR_EPSILON: f32 = 1e-8;

/// World-space point expressed in a part's local frame
///
/// Returns None for a degenerate (non-invertible) transform.
pub fn world_to_local(point: Vec3, part_to_world: Mat4) -> Option<Vec3> {
    if part_to_world.determinant().abs() < SINGULAR_EPSILON {
        return None;
    }
    Some(part_to_world.inverse().transform_point3(point))
}

#[derive(Debug, Default)]
pub struct DecalPlacer {
    dragging: bool,
}

impl DecalPlacer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_dragging(&self) -> bool {
        self.dragging
    }

    /// Pointer pressed over `hit_part` (None when the pointer missed the mesh)
    ///
    /// Returns whether a drag started.
    pub fn pointer_down(&mut self, hit_part: Option<&str>, store: &StateStore) -> bool {
        let target = &store.read().decal_target;
        let on_target = matches!(hit_part, Some(part) if !target.is_empty() && part == target);
        if on_target {
            self.dragging = true;
        }
        on_target
    }

    /// Pointer moved while over the mesh at `world_point`
    ///
    /// Writes the decal position only while dragging with movement enabled.
    pub fn pointer_move(
        &mut self,
        world_point: Vec3,
        part_to_world: Mat4,
        store: &mut StateStore,
    ) -> bool {
        if !self.dragging || !store.read().decal_drag_enabled {
            return false;
        }
        let Some(local) = world_to_local(world_point, part_to_world) else {
            return false;
        };
        store.mutate(Topic::Decal, |s| s.decal.position = local.to_array());
        true
    }

    /// Pointer released anywhere
    pub fn pointer_up(&mut self) {
        self.dragging = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ConfiguratorConfig;
    use crate::state::ConfiguratorState;
    use macroquad::math::Quat;

    fn store_with_target(target: &str) -> StateStore {
        let mut state = ConfiguratorState::from_config(&ConfiguratorConfig::default()).unwrap();
        state.rebuild_items(&["body".to_string(), "hood".to_string()], false);
        state.decal_target = target.to_string();
        StateStore::new(state)
    }

    fn approx(a: [f32; 3], b: [f32; 3]) -> bool {
        a.iter().zip(b.iter()).all(|(x, y)| (x - y).abs() < 1e-4)
    }

    #[test]
    fn test_world_to_local_inverts_transform() {
        let transform = Mat4::from_scale_rotation_translation(
            Vec3::splat(2.0),
            Quat::from_rotation_y(std::f32::consts::FRAC_PI_2),
            Vec3::new(0.0, 1.0, 0.0),
        );
        let local = Vec3::new(0.25, 0.5, -0.1);
        let world = transform.transform_point3(local);
        let back = world_to_local(world, transform).unwrap();
        assert!(approx(back.to_array(), local.to_array()));

        assert!(world_to_local(world, Mat4::ZERO).is_none());
    }

    #[test]
    fn test_drag_only_starts_on_target() {
        let store = store_with_target("body");
        let mut placer = DecalPlacer::new();
        assert!(!placer.pointer_down(Some("hood"), &store));
        assert!(!placer.pointer_down(None, &store));
        assert!(!placer.is_dragging());
        assert!(placer.pointer_down(Some("body"), &store));
        assert!(placer.is_dragging());
    }

    #[test]
    fn test_no_drag_without_target() {
        let store = store_with_target("");
        let mut placer = DecalPlacer::new();
        assert!(!placer.pointer_down(Some(""), &store));
    }

    #[test]
    fn test_move_writes_local_position() {
        let mut store = store_with_target("body");
        let mut placer = DecalPlacer::new();
        let lifted = Mat4::from_translation(Vec3::new(0.0, 0.2, 0.0));

        // Not dragging yet: ignored
        assert!(!placer.pointer_move(Vec3::new(0.1, 0.5, 0.4), lifted, &mut store));
        assert_eq!(store.read().decal.position, [0.0, 0.1, 0.5]);

        placer.pointer_down(Some("body"), &store);
        assert!(placer.pointer_move(Vec3::new(0.1, 0.5, 0.4), lifted, &mut store));
        assert!(approx(store.read().decal.position, [0.1, 0.3, 0.4]));

        placer.pointer_up();
        assert!(!placer.pointer_move(Vec3::ZERO, lifted, &mut store));
        assert!(approx(store.read().decal.position, [0.1, 0.3, 0.4]));
    }

    #[test]
    fn test_movement_flag_blocks_writes() {
        let mut store = store_with_target("body");
        store.mutate(Topic::Decal, |s| s.decal_drag_enabled = false);
        let mut placer = DecalPlacer::new();
        placer.pointer_down(Some("body"), &store);
        assert!(!placer.pointer_move(Vec3::ONE, Mat4::IDENTITY, &mut store));
        assert_eq!(store.read().decal.position, [0.0, 0.1, 0.5]);
        // Releasing still ends the drag
        placer.pointer_up();
        assert!(!placer.is_dragging());
    }
}
