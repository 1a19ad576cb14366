//! Decal transform and surface tweakables

use serde::{Deserialize, Serialize};
use std::f32::consts::PI;

/// Smallest scale the decal may take (scale must stay positive)
pub const MIN_DECAL_SCALE: f32 = 0.01;

/// Placement of the decal in the target part's local frame
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DecalTransform {
    pub position: [f32; 3],
    /// Euler angles in radians (XYZ)
    pub rotation: [f32; 3],
    pub scale: f32,
    pub opacity: f32,
    pub roughness: f32,
    /// Push-out along the decal normal, keeps the quad off the surface
    pub height_offset: f32,
}

impl Default for DecalTransform {
    fn default() -> Self {
        Self {
            position: [0.0, 0.1, 0.5],
            rotation: [0.0, 0.0, 0.0],
            scale: 0.3,
            opacity: 1.0,
            roughness: 0.8,
            height_offset: 0.004,
        }
    }
}

impl DecalTransform {
    /// Horizontal flip is a half turn around Y
    pub fn is_flipped(&self) -> bool {
        (self.rotation[1] - PI).abs() < 1e-4
    }

    pub fn set_flipped(&mut self, flipped: bool) {
        self.rotation[1] = if flipped { PI } else { 0.0 };
    }

    pub fn set_scale(&mut self, scale: f32) {
        self.scale = if scale.is_finite() {
            scale.max(MIN_DECAL_SCALE)
        } else {
            MIN_DECAL_SCALE
        };
    }

    pub fn set_opacity(&mut self, opacity: f32) {
        self.opacity = opacity.clamp(0.0, 1.0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flip_toggles_half_turn() {
        let mut decal = DecalTransform::default();
        assert!(!decal.is_flipped());
        decal.set_flipped(true);
        assert!(decal.is_flipped());
        assert_eq!(decal.rotation[1], PI);
        decal.set_flipped(false);
        assert_eq!(decal.rotation[1], 0.0);
    }

    #[test]
    fn test_scale_stays_positive() {
        let mut decal = DecalTransform::default();
        decal.set_scale(-3.0);
        assert_eq!(decal.scale, MIN_DECAL_SCALE);
        decal.set_scale(f32::NAN);
        assert_eq!(decal.scale, MIN_DECAL_SCALE);
        decal.set_scale(1.5);
        assert_eq!(decal.scale, 1.5);
    }
}
