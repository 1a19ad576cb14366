//! 3D viewport: orbit camera, picking, lighting and drawing
//!
//! The garment sits at the origin. When floating is on it bobs and sways
//! gently around that point; the same transform feeds rendering, picking
//! and decal placement so all three agree.

pub mod camera;
pub mod lighting;
pub mod picking;
pub mod render;

pub use camera::OrbitCamera;
pub use lighting::ResolvedLights;
pub use picking::{pick_parts, screen_to_ray, PickHit};
pub use render::{draw_scene, SceneView};

use macroquad::math::{EulerRot, Mat4, Quat, Vec3};

/// Model-to-world transform of the floating garment at time `t` (seconds)
pub fn float_transform(t: f32, enabled: bool) -> Mat4 {
    if !enabled {
        return Mat4::IDENTITY;
    }
    let rotation = Quat::from_euler(
        EulerRot::XYZ,
        (t / 4.0).cos() / 8.0,
        (t / 4.0).sin() / 8.0,
        -0.2 - (1.0 + (t / 1.5).sin()) / 20.0,
    );
    let lift = (1.0 + (t / 1.5).sin()) / 10.0;
    Mat4::from_rotation_translation(rotation, Vec3::new(0.0, lift, 0.0))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_float_disabled_is_identity() {
        assert_eq!(float_transform(12.3, false), Mat4::IDENTITY);
    }

    #[test]
    fn test_float_stays_small() {
        for step in 0..200 {
            let t = step as f32 * 0.37;
            let m = float_transform(t, true);
            let (_, rotation, translation) = m.to_scale_rotation_translation();
            assert!(translation.y >= -1e-5 && translation.y <= 0.2 + 1e-5);
            assert_eq!(translation.x, 0.0);
            // Never tips more than ~20 degrees
            assert!(rotation.angle_between(Quat::IDENTITY) < 0.4);
        }
    }

    #[test]
    fn test_float_varies_over_time() {
        assert_ne!(float_transform(0.0, true), float_transform(1.0, true));
    }
}
