//! Scene drawing
//!
//! Everything is transformed and lit on the CPU, then handed to macroquad as
//! colored, optionally textured meshes:
//! - contact shadow (the mesh flattened onto the shadow plane)
//! - garment parts (item color x preset tint x base color map)
//! - outline edges on the outlined part
//! - the decal quad on its target part

use super::lighting::{shade_vertex, ResolvedLights, Surface};
use super::picking::{ray_triangle_intersect, Ray};
use crate::color::parse_hex_or_white;
use crate::material::{tinted, SurfaceStats};
use crate::model::{LoadedModel, ModelPart};
use crate::state::{ConfiguratorState, DecalTransform, ShadowSettings};
use macroquad::math::{EulerRot, Mat4, Quat, Vec2, Vec3};
use macroquad::models::{draw_line_3d, draw_mesh, Mesh, Vertex};
use macroquad::prelude::{Color, Texture2D};
use std::collections::HashSet;

/// Outline color for the highlighted part
const OUTLINE_COLOR: Color = Color::new(1.0, 0.78, 0.2, 0.9);
/// How much hover lightens a part
const HOVER_MIX: f32 = 0.18;
/// Keeps the shadow from z-fighting with anything sitting on the plane
const SHADOW_LIFT: f32 = 0.002;

/// Per-frame inputs that do not live in the shared state
pub struct SceneView<'a> {
    pub model_to_world: Mat4,
    pub eye: Vec3,
    pub hovered: Option<&'a str>,
    pub decal_texture: Option<&'a Texture2D>,
}

/// Item color of a part multiplied by its preset tint
pub fn part_color(state: &ConfiguratorState, part: &str) -> Color {
    let base = state
        .items
        .get(part)
        .map(|hex| parse_hex_or_white(hex))
        .unwrap_or(macroquad::prelude::WHITE);
    match state.material.tint_for_part(part) {
        Some(tint) => tinted(base, parse_hex_or_white(tint)),
        None => base,
    }
}

/// Shadow darkness for geometry `height` above the plane
pub fn shadow_alpha(height: f32, settings: &ShadowSettings) -> f32 {
    if settings.far <= 0.0 || height < 0.0 {
        return 0.0;
    }
    settings.opacity.clamp(0.0, 1.0) * (1.0 - height / settings.far).clamp(0.0, 1.0)
}

fn decal_rotation(decal: &DecalTransform) -> Quat {
    let [rx, ry, rz] = decal.rotation;
    Quat::from_euler(EulerRot::XYZ, rx, ry, rz)
}

/// Decal quad frame in the target part's local space: unit quad in XY facing +Z
pub fn decal_matrix(decal: &DecalTransform) -> Mat4 {
    decal_frame(decal, Vec3::from_array(decal.position))
}

fn decal_frame(decal: &DecalTransform, origin: Vec3) -> Mat4 {
    Mat4::from_translation(origin)
        * Mat4::from_quat(decal_rotation(decal))
        * Mat4::from_translation(Vec3::new(0.0, 0.0, decal.height_offset))
        * Mat4::from_scale(Vec3::new(decal.scale, decal.scale, 1.0))
}

/// Where the decal lands on `part`
///
/// The position is a projector origin: the nearest surface along the decal
/// axis (either side) wins. Falls back to the raw position on a miss.
pub fn decal_anchor(decal: &DecalTransform, part: &ModelPart) -> Vec3 {
    let origin = Vec3::from_array(decal.position);
    let axis = decal_rotation(decal) * Vec3::Z;

    let mut best: Option<(f32, Vec3)> = None;
    for ray in [Ray::new(origin, -axis), Ray::new(origin, axis)] {
        for [v0, v1, v2] in part.geometry.triangles() {
            if let Some(t) = ray_triangle_intersect(&ray, v0, v1, v2) {
                if best.map_or(true, |(best_t, _)| t < best_t) {
                    best = Some((t, ray.at(t)));
                }
            }
        }
    }
    best.map_or(origin, |(_, hit)| hit)
}

fn to_color(rgb: Vec3, alpha: f32) -> Color {
    Color::new(rgb.x, rgb.y, rgb.z, alpha)
}

fn draw_part(part: &ModelPart, color: Color, lights: &ResolvedLights, view: &SceneView) {
    let geometry = &part.geometry;
    let albedo = Vec3::new(color.r, color.g, color.b);
    let surface = Surface::new(albedo, &part.material.stats);

    let vertices = geometry
        .positions
        .iter()
        .enumerate()
        .map(|(i, p)| {
            let world = view.model_to_world.transform_point3(*p);
            let normal = geometry
                .normals
                .get(i)
                .map(|n| view.model_to_world.transform_vector3(*n))
                .unwrap_or(Vec3::Y);
            let lit = shade_vertex(lights, &surface, world, normal, view.eye);
            let uv = geometry.uvs.get(i).copied().unwrap_or(Vec2::ZERO);
            Vertex::new(world.x, world.y, world.z, uv.x, uv.y, to_color(lit, color.a))
        })
        .collect();

    draw_mesh(&Mesh {
        vertices,
        indices: geometry.indices.clone(),
        texture: part.material.base_color_map.clone(),
    });
}

fn draw_outline(part: &ModelPart, model_to_world: Mat4) {
    let geometry = &part.geometry;
    let mut edges = HashSet::new();
    for tri in geometry.indices.chunks_exact(3) {
        for (a, b) in [(tri[0], tri[1]), (tri[1], tri[2]), (tri[2], tri[0])] {
            edges.insert((a.min(b), a.max(b)));
        }
    }
    for (a, b) in edges {
        let start = model_to_world.transform_point3(geometry.positions[a as usize]);
        let end = model_to_world.transform_point3(geometry.positions[b as usize]);
        draw_line_3d(start, end, OUTLINE_COLOR);
    }
}

fn draw_contact_shadow(model: &LoadedModel, settings: &ShadowSettings, model_to_world: Mat4) {
    let half = settings.scale.max(0.0) / 2.0;
    let plane_y = settings.position_y + SHADOW_LIFT;

    for part in model.parts() {
        let vertices = part
            .geometry
            .positions
            .iter()
            .map(|p| {
                let world = model_to_world.transform_point3(*p);
                let inside = world.x.abs() <= half && world.z.abs() <= half;
                let alpha = if inside {
                    shadow_alpha(world.y - settings.position_y, settings)
                } else {
                    0.0
                };
                Vertex::new(world.x, plane_y, world.z, 0.0, 0.0, Color::new(0.0, 0.0, 0.0, alpha))
            })
            .collect();
        draw_mesh(&Mesh {
            vertices,
            indices: part.geometry.indices.clone(),
            texture: None,
        });
    }
}

fn draw_decal(
    decal: &DecalTransform,
    target: &ModelPart,
    texture: Option<&Texture2D>,
    lights: &ResolvedLights,
    view: &SceneView,
) {
    let frame = view.model_to_world * decal_frame(decal, decal_anchor(decal, target));
    let normal = frame.transform_vector3(Vec3::Z);
    let centre = frame.transform_point3(Vec3::ZERO);

    let stats = SurfaceStats {
        roughness: decal.roughness,
        ..SurfaceStats::default()
    };
    let lit = shade_vertex(lights, &Surface::new(Vec3::ONE, &stats), centre, normal, view.eye);
    let color = to_color(lit, decal.opacity.clamp(0.0, 1.0));

    let corners = [
        (Vec3::new(-0.5, 0.5, 0.0), Vec2::new(0.0, 0.0)),
        (Vec3::new(0.5, 0.5, 0.0), Vec2::new(1.0, 0.0)),
        (Vec3::new(0.5, -0.5, 0.0), Vec2::new(1.0, 1.0)),
        (Vec3::new(-0.5, -0.5, 0.0), Vec2::new(0.0, 1.0)),
    ];
    let vertices = corners
        .iter()
        .map(|(local, uv)| {
            let p = frame.transform_point3(*local);
            Vertex::new(p.x, p.y, p.z, uv.x, uv.y, color)
        })
        .collect();

    draw_mesh(&Mesh {
        vertices,
        indices: vec![0, 1, 2, 0, 2, 3],
        texture: texture.cloned(),
    });
}

/// Draw the active model with everything the state asks for
///
/// Call inside a `set_camera` scope for the orbit camera.
pub fn draw_scene(
    model: &LoadedModel,
    state: &ConfiguratorState,
    lights: &ResolvedLights,
    view: &SceneView,
) {
    if model.is_disposed() {
        return;
    }

    if state.shadows.enabled {
        draw_contact_shadow(model, &state.shadows, view.model_to_world);
    }

    for part in model.parts() {
        let mut color = part_color(state, part.name());
        if view.hovered == Some(part.name()) {
            color = Color::new(
                color.r + (1.0 - color.r) * HOVER_MIX,
                color.g + (1.0 - color.g) * HOVER_MIX,
                color.b + (1.0 - color.b) * HOVER_MIX,
                color.a,
            );
        }
        draw_part(part, color, lights, view);
    }

    if let Some(outlined) = state.outlined_mesh.as_deref().and_then(|name| model.part(name)) {
        draw_outline(outlined, view.model_to_world);
    }

    if let Some(target) = model.part(&state.decal_target) {
        draw_decal(&state.decal, target, view.decal_texture, lights, view);
    }
}
