//! Orbit camera
//!
//! Horizontal orbit around the origin: the polar angle is pinned to the
//! equator, right-drag spins around Y and the wheel dollies in and out
//! within the configured distance range. No panning.

use crate::config::CameraConfig;
use macroquad::math::{Mat4, Vec3};
use macroquad::prelude::Camera3D;

/// Height of the orbit target (the garment's chest)
const TARGET: Vec3 = Vec3::ZERO;
const Z_NEAR: f32 = 0.01;
const Z_FAR: f32 = 10000.0;

#[derive(Debug, Clone)]
pub struct OrbitCamera {
    /// Angle around Y in radians; 0 looks at the front (+Z side)
    yaw: f32,
    distance: f32,
    fov: f32,
    min_distance: f32,
    max_distance: f32,
    orbit_speed: f32,
    zoom_speed: f32,
}

impl OrbitCamera {
    pub fn new(config: &CameraConfig) -> Self {
        Self {
            yaw: 0.0,
            distance: config
                .start_distance
                .clamp(config.min_distance, config.max_distance),
            fov: config.fov_deg.to_radians(),
            min_distance: config.min_distance,
            max_distance: config.max_distance,
            orbit_speed: config.orbit_speed,
            zoom_speed: config.zoom_speed,
        }
    }

    pub fn position(&self) -> Vec3 {
        TARGET + Vec3::new(self.yaw.sin(), 0.0, self.yaw.cos()) * self.distance
    }

    /// Camera-to-origin distance (drives LOD selection)
    pub fn distance(&self) -> f32 {
        self.position().length()
    }

    /// Spin by a horizontal mouse delta in pixels
    pub fn orbit(&mut self, dx: f32) {
        self.yaw = (self.yaw - dx * self.orbit_speed).rem_euclid(std::f32::consts::TAU);
    }

    /// Dolly by wheel notches (positive zooms in)
    pub fn zoom(&mut self, notches: f32) {
        let factor = (1.0 - notches * self.zoom_speed).max(0.05);
        self.set_distance(self.distance * factor);
    }

    pub fn set_distance(&mut self, distance: f32) {
        if distance.is_finite() {
            self.distance = distance.clamp(self.min_distance, self.max_distance);
        }
    }

    /// Projection times view, matching what `camera_3d` renders with
    pub fn view_proj(&self, aspect: f32) -> Mat4 {
        let proj = Mat4::perspective_rh_gl(self.fov, aspect, Z_NEAR, Z_FAR);
        let view = Mat4::look_at_rh(self.position(), TARGET, Vec3::Y);
        proj * view
    }

    /// macroquad camera for this frame
    pub fn camera_3d(&self, aspect: f32) -> Camera3D {
        Camera3D {
            position: self.position(),
            target: TARGET,
            up: Vec3::Y,
            fovy: self.fov,
            aspect: Some(aspect),
            ..Default::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn camera() -> OrbitCamera {
        OrbitCamera::new(&CameraConfig::default())
    }

    #[test]
    fn test_starts_in_front() {
        let cam = camera();
        assert!((cam.position() - Vec3::new(0.0, 0.0, 4.0)).length() < 1e-5);
        assert!((cam.distance() - 4.0).abs() < 1e-5);
    }

    #[test]
    fn test_orbit_keeps_height_and_distance() {
        let mut cam = camera();
        cam.orbit(200.0);
        let p = cam.position();
        assert_eq!(p.y, 0.0);
        assert!((cam.distance() - 4.0).abs() < 1e-4);
        assert!(p.x.abs() > 0.1);
    }

    #[test]
    fn test_zoom_is_clamped() {
        let mut cam = camera();
        for _ in 0..100 {
            cam.zoom(1.0);
        }
        assert!((cam.distance() - 2.0).abs() < 1e-4);
        for _ in 0..200 {
            cam.zoom(-1.0);
        }
        assert!((cam.distance() - 80.0).abs() < 1e-3);
        cam.set_distance(f32::NAN);
        assert!((cam.distance() - 80.0).abs() < 1e-3);
    }

    #[test]
    fn test_view_proj_centers_origin() {
        let cam = camera();
        let clip = cam.view_proj(16.0 / 9.0).project_point3(Vec3::ZERO);
        assert!(clip.x.abs() < 1e-5 && clip.y.abs() < 1e-5);
        assert!(clip.z > -1.0 && clip.z < 1.0);
    }
}
