//! Per-vertex lighting
//!
//! Gouraud shading on the CPU: every vertex gets ambient (scaled by the
//! material's occlusion) plus the diffuse and Blinn-Phong specular response
//! of each enabled light, then the emissive term. The GPU only interpolates
//! the resulting vertex colors.

use crate::color::parse_hex_or_white;
use crate::material::SurfaceStats;
use crate::state::lights::{LightKind, LightRig};
use macroquad::math::Vec3;

/// Light converted into world-space terms, color premultiplied by intensity
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ResolvedLight {
    Directional {
        /// Unit vector from the surface toward the light
        to_light: Vec3,
        radiance: Vec3,
    },
    Spot {
        position: Vec3,
        /// Unit vector the cone points along (light to origin)
        axis: Vec3,
        cos_outer: f32,
        cos_inner: f32,
        radiance: Vec3,
    },
    Point {
        position: Vec3,
        range: f32,
        radiance: Vec3,
    },
}

fn rgb(hex: &str) -> Vec3 {
    let c = parse_hex_or_white(hex);
    Vec3::new(c.r, c.g, c.b)
}

fn smoothstep(edge0: f32, edge1: f32, x: f32) -> f32 {
    if (edge1 - edge0).abs() < f32::EPSILON {
        return if x >= edge0 { 1.0 } else { 0.0 };
    }
    let t = ((x - edge0) / (edge1 - edge0)).clamp(0.0, 1.0);
    t * t * (3.0 - 2.0 * t)
}

/// The light rig in a form ready for shading
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedLights {
    pub ambient: Vec3,
    pub lights: Vec<ResolvedLight>,
}

impl ResolvedLights {
    pub fn from_rig(rig: &LightRig) -> Self {
        let ambient = rgb(&rig.ambient.color) * rig.ambient.intensity.max(0.0);
        let lights = rig
            .lights
            .iter()
            .filter(|light| light.enabled && light.intensity > 0.0)
            .filter_map(|light| {
                let position = Vec3::from_array(light.position);
                let radiance = rgb(&light.color) * light.intensity;
                match light.kind {
                    LightKind::Directional => {
                        let to_light = position.try_normalize()?;
                        Some(ResolvedLight::Directional { to_light, radiance })
                    }
                    LightKind::Spot { angle, penumbra } => {
                        let axis = (-position).try_normalize()?;
                        let angle = angle.clamp(0.0, std::f32::consts::FRAC_PI_2);
                        let penumbra = penumbra.clamp(0.0, 1.0);
                        Some(ResolvedLight::Spot {
                            position,
                            axis,
                            cos_outer: angle.cos(),
                            cos_inner: (angle * (1.0 - penumbra)).cos(),
                            radiance,
                        })
                    }
                    LightKind::Point { range } => (range > 0.0).then_some(ResolvedLight::Point {
                        position,
                        range,
                        radiance,
                    }),
                }
            })
            .collect();
        Self { ambient, lights }
    }

    /// Direction and radiance arriving at `position`, None if unlit
    fn incoming(light: &ResolvedLight, position: Vec3) -> Option<(Vec3, Vec3)> {
        match *light {
            ResolvedLight::Directional { to_light, radiance } => Some((to_light, radiance)),
            ResolvedLight::Spot {
                position: light_pos,
                axis,
                cos_outer,
                cos_inner,
                radiance,
            } => {
                let to_light = (light_pos - position).try_normalize()?;
                let cos_theta = (-to_light).dot(axis);
                let cone = smoothstep(cos_outer, cos_inner, cos_theta);
                (cone > 0.0).then_some((to_light, radiance * cone))
            }
            ResolvedLight::Point {
                position: light_pos,
                range,
                radiance,
            } => {
                let offset = light_pos - position;
                let dist = offset.length();
                if dist > range || dist < 0.001 {
                    return None;
                }
                let attenuation = 1.0 - dist / range;
                Some((offset / dist, radiance * attenuation * attenuation))
            }
        }
    }
}

/// Surface response for one part
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Surface {
    pub albedo: Vec3,
    pub roughness: f32,
    pub metallic: f32,
    pub ao: f32,
    pub emissive: Vec3,
}

impl Surface {
    pub fn new(albedo: Vec3, stats: &SurfaceStats) -> Self {
        Self {
            albedo,
            roughness: stats.roughness.clamp(0.0, 1.0),
            metallic: stats.metallic.clamp(0.0, 1.0),
            ao: stats.ao.clamp(0.0, 1.0),
            emissive: Vec3::from_array(stats.emissive),
        }
    }

    /// Blinn-Phong exponent for this roughness
    fn shininess(&self) -> f32 {
        let smooth = 1.0 - self.roughness;
        2.0 + smooth * smooth * 126.0
    }
}

/// Lit RGB (0..1) of a vertex seen from `eye`
pub fn shade_vertex(
    lights: &ResolvedLights,
    surface: &Surface,
    position: Vec3,
    normal: Vec3,
    eye: Vec3,
) -> Vec3 {
    let normal = normal.normalize_or_zero();
    let view = (eye - position).normalize_or_zero();
    let diffuse_albedo = surface.albedo * (1.0 - surface.metallic);
    let spec_color = Vec3::ONE.lerp(surface.albedo, surface.metallic);
    let spec_strength = 1.0 - surface.roughness;
    let shininess = surface.shininess();

    let mut total = lights.ambient * surface.ao * surface.albedo;
    for light in &lights.lights {
        let Some((to_light, radiance)) = ResolvedLights::incoming(light, position) else {
            continue;
        };
        let n_dot_l = normal.dot(to_light);
        if n_dot_l <= 0.0 {
            continue;
        }
        total += diffuse_albedo * radiance * n_dot_l;

        if spec_strength > 0.0 {
            if let Some(half) = (to_light + view).try_normalize() {
                let spec = normal.dot(half).max(0.0).powf(shininess) * spec_strength;
                total += spec_color * radiance * spec;
            }
        }
    }
    (total + surface.emissive).clamp(Vec3::ZERO, Vec3::ONE)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::lights::{AmbientLight, Light};

    fn rig(kind: LightKind, position: [f32; 3]) -> LightRig {
        LightRig {
            ambient: AmbientLight {
                color: "#ffffff".into(),
                intensity: 0.0,
            },
            lights: vec![Light {
                name: "test".into(),
                kind,
                position,
                color: "#ffffff".into(),
                intensity: 1.0,
                enabled: true,
                cast_shadow: false,
            }],
        }
    }

    fn matte() -> Surface {
        Surface {
            albedo: Vec3::ONE,
            roughness: 1.0,
            metallic: 0.0,
            ao: 1.0,
            emissive: Vec3::ZERO,
        }
    }

    const EYE: Vec3 = Vec3::new(0.0, 0.0, 10.0);

    #[test]
    fn test_ambient_only_scales_by_ao() {
        let mut rig = LightRig::default();
        rig.lights.clear();
        rig.ambient.intensity = 0.5;
        let lights = ResolvedLights::from_rig(&rig);
        let surface = Surface { ao: 0.5, ..matte() };
        let lit = shade_vertex(&lights, &surface, Vec3::ZERO, Vec3::Z, EYE);
        assert!((lit - Vec3::splat(0.25)).length() < 1e-5);
    }

    #[test]
    fn test_directional_lambert() {
        let lights = ResolvedLights::from_rig(&rig(LightKind::Directional, [0.0, 0.0, 5.0]));
        let facing = shade_vertex(&lights, &matte(), Vec3::ZERO, Vec3::Z, EYE);
        assert!((facing.x - 1.0).abs() < 1e-5);
        let away = shade_vertex(&lights, &matte(), Vec3::ZERO, -Vec3::Z, EYE);
        assert_eq!(away, Vec3::ZERO);
        let tilted = shade_vertex(&lights, &matte(), Vec3::ZERO, Vec3::new(1.0, 0.0, 1.0), EYE);
        assert!((tilted.x - std::f32::consts::FRAC_1_SQRT_2).abs() < 1e-4);
    }

    #[test]
    fn test_spot_cone_edge() {
        let spot = LightKind::Spot {
            angle: 0.2,
            penumbra: 0.5,
        };
        let lights = ResolvedLights::from_rig(&rig(spot, [0.0, 0.0, 10.0]));
        // On axis: full strength
        let centre = shade_vertex(&lights, &matte(), Vec3::ZERO, Vec3::Z, EYE);
        assert!(centre.x > 0.99);
        // Far outside the cone: dark
        let outside = shade_vertex(&lights, &matte(), Vec3::new(5.0, 0.0, 0.0), Vec3::Z, EYE);
        assert_eq!(outside, Vec3::ZERO);
        // In the penumbra: partially lit
        let edge = shade_vertex(&lights, &matte(), Vec3::new(1.5, 0.0, 0.0), Vec3::Z, EYE);
        assert!(edge.x > 0.0 && edge.x < centre.x);
    }

    #[test]
    fn test_point_falloff() {
        let lights = ResolvedLights::from_rig(&rig(LightKind::Point { range: 4.0 }, [0.0, 0.0, 2.0]));
        let near = shade_vertex(&lights, &matte(), Vec3::ZERO, Vec3::Z, EYE);
        assert!((near.x - 0.25).abs() < 1e-4);
        let out_of_range = shade_vertex(&lights, &matte(), Vec3::new(0.0, 0.0, -3.0), Vec3::Z, EYE);
        assert_eq!(out_of_range, Vec3::ZERO);
    }

    #[test]
    fn test_specular_needs_smooth_surface() {
        let lights = ResolvedLights::from_rig(&rig(LightKind::Directional, [0.0, 0.0, 5.0]));
        let dark = Surface {
            albedo: Vec3::splat(0.2),
            ..matte()
        };
        let glossy = Surface { roughness: 0.2, ..dark };
        let rough_lit = shade_vertex(&lights, &dark, Vec3::ZERO, Vec3::Z, EYE);
        let glossy_lit = shade_vertex(&lights, &glossy, Vec3::ZERO, Vec3::Z, EYE);
        assert!(glossy_lit.x > rough_lit.x);
    }

    #[test]
    fn test_disabled_and_degenerate_lights_skipped() {
        let mut rig = LightRig::default();
        for light in &mut rig.lights {
            light.enabled = false;
        }
        assert!(ResolvedLights::from_rig(&rig).lights.is_empty());

        let at_origin = rig_with_origin_directional();
        assert!(ResolvedLights::from_rig(&at_origin).lights.is_empty());
    }

    fn rig_with_origin_directional() -> LightRig {
        rig(LightKind::Directional, [0.0, 0.0, 0.0])
    }

    #[test]
    fn test_emissive_adds_and_clamps() {
        let lights = ResolvedLights::from_rig(&rig(LightKind::Directional, [0.0, 0.0, 5.0]));
        let glowing = Surface {
            emissive: Vec3::new(0.5, 0.0, 0.0),
            ..matte()
        };
        let lit = shade_vertex(&lights, &glowing, Vec3::ZERO, Vec3::Z, EYE);
        assert_eq!(lit.x, 1.0);
        assert!((lit.y - 1.0).abs() < 1e-5);
    }
}
