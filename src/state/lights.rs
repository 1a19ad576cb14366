//! Scene illumination settings
//!
//! Defaults mirror the studio setup the configurator ships with: a strong
//! ambient term, one narrow key spot up and to the right, and a soft fill.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum LightKind {
    /// Parallel rays travelling from `position` toward the origin
    Directional,
    /// Cone aimed at the origin; `angle` is the half-angle in radians,
    /// `penumbra` the fraction of the cone that fades out
    Spot { angle: f32, penumbra: f32 },
    /// Omni light with linear falloff to zero at `range`
    Point { range: f32 },
}

impl LightKind {
    pub fn label(&self) -> &'static str {
        match self {
            LightKind::Directional => "Directional",
            LightKind::Spot { .. } => "Spot",
            LightKind::Point { .. } => "Point",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Light {
    pub name: String,
    pub kind: LightKind,
    pub position: [f32; 3],
    pub color: String,
    pub intensity: f32,
    pub enabled: bool,
    pub cast_shadow: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AmbientLight {
    pub color: String,
    pub intensity: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LightRig {
    pub ambient: AmbientLight,
    pub lights: Vec<Light>,
}

impl Default for LightRig {
    fn default() -> Self {
        Self {
            ambient: AmbientLight {
                color: "#ffffff".to_string(),
                intensity: 0.7,
            },
            lights: vec![
                Light {
                    name: "Key".to_string(),
                    kind: LightKind::Spot { angle: 0.1, penumbra: 1.0 },
                    position: [10.0, 15.0, 10.0],
                    color: "#ffffff".to_string(),
                    intensity: 0.5,
                    enabled: true,
                    cast_shadow: true,
                },
                Light {
                    name: "Fill".to_string(),
                    kind: LightKind::Directional,
                    position: [-6.0, 4.0, 8.0],
                    color: "#dfe8ff".to_string(),
                    intensity: 0.25,
                    enabled: true,
                    cast_shadow: false,
                },
                Light {
                    name: "Rim".to_string(),
                    kind: LightKind::Point { range: 12.0 },
                    position: [0.0, 3.0, -5.0],
                    color: "#ffe2c0".to_string(),
                    intensity: 0.4,
                    enabled: false,
                    cast_shadow: false,
                },
            ],
        }
    }
}

/// Contact shadow under the garment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShadowSettings {
    pub enabled: bool,
    /// Height of the shadow plane
    pub position_y: f32,
    pub opacity: f32,
    pub scale: f32,
    pub blur: f32,
    /// How far above the plane geometry still darkens it
    pub far: f32,
}

impl Default for ShadowSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            position_y: -0.8,
            opacity: 0.25,
            scale: 10.0,
            blur: 1.5,
            far: 0.8,
        }
    }
}
