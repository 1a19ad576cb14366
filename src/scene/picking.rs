//! Ray casting for mesh picking
//!
//! Screen coordinates are unprojected through the inverse view-projection
//! into a world ray, which is then carried into the model's local frame
//! (direction left unnormalized so `t` stays a world-space parameter).

use crate::model::ModelPart;
use macroquad::math::{Mat4, Vec2, Vec3};

/// A 3D ray with origin and direction
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ray {
    pub origin: Vec3,
    pub direction: Vec3,
}

impl Ray {
    /// Create a new ray, normalizing the direction
    pub fn new(origin: Vec3, direction: Vec3) -> Self {
        Self {
            origin,
            direction: direction.normalize_or_zero(),
        }
    }

    /// Get point at distance t along ray
    pub fn at(&self, t: f32) -> Vec3 {
        self.origin + self.direction * t
    }

    /// Same ray seen from another frame; the direction keeps its scale
    pub fn transformed(&self, matrix: Mat4) -> Ray {
        Ray {
            origin: matrix.transform_point3(self.origin),
            direction: matrix.transform_vector3(self.direction),
        }
    }
}

/// Closest intersection with the loaded model
#[derive(Debug, Clone, PartialEq)]
pub struct PickHit {
    pub part: String,
    pub t: f32,
    pub world_point: Vec3,
}

/// Ray from a pixel through the camera
///
/// Returns None when the view-projection is singular or the viewport is empty.
pub fn screen_to_ray(mouse: Vec2, viewport: Vec2, view_proj: Mat4) -> Option<Ray> {
    if viewport.x <= 0.0 || viewport.y <= 0.0 || view_proj.determinant().abs() < f32::EPSILON {
        return None;
    }
    let ndc_x = mouse.x / viewport.x * 2.0 - 1.0;
    let ndc_y = 1.0 - mouse.y / viewport.y * 2.0;

    let inverse = view_proj.inverse();
    let near = inverse.project_point3(Vec3::new(ndc_x, ndc_y, -1.0));
    let far = inverse.project_point3(Vec3::new(ndc_x, ndc_y, 1.0));
    let direction = far - near;
    if !direction.is_finite() || direction.length_squared() < f32::EPSILON {
        return None;
    }
    Some(Ray::new(near, direction))
}

/// Ray-triangle intersection using Möller–Trumbore algorithm
///
/// Returns the ray parameter of the hit. Both faces count.
pub fn ray_triangle_intersect(ray: &Ray, v0: Vec3, v1: Vec3, v2: Vec3) -> Option<f32> {
    const EPSILON: f32 = 0.0000001;

    let edge1 = v1 - v0;
    let edge2 = v2 - v0;
    let h = ray.direction.cross(edge2);
    let a = edge1.dot(h);

    // Ray is parallel to triangle
    if a.abs() < EPSILON {
        return None;
    }

    let f = 1.0 / a;
    let s = ray.origin - v0;
    let u = f * s.dot(h);
    if !(0.0..=1.0).contains(&u) {
        return None;
    }

    let q = s.cross(edge1);
    let v = f * ray.direction.dot(q);
    if v < 0.0 || u + v > 1.0 {
        return None;
    }

    let t = f * edge2.dot(q);
    (t > EPSILON).then_some(t)
}

/// Slab test against an axis-aligned box
pub fn ray_aabb_intersect(ray: &Ray, min: Vec3, max: Vec3) -> bool {
    let mut t_near = f32::NEG_INFINITY;
    let mut t_far = f32::INFINITY;

    for axis in 0..3 {
        let origin = ray.origin[axis];
        let dir = ray.direction[axis];
        if dir.abs() < f32::EPSILON {
            if origin < min[axis] || origin > max[axis] {
                return false;
            }
            continue;
        }
        let t1 = (min[axis] - origin) / dir;
        let t2 = (max[axis] - origin) / dir;
        t_near = t_near.max(t1.min(t2));
        t_far = t_far.min(t1.max(t2));
        if t_near > t_far {
            return false;
        }
    }
    t_far >= 0.0
}

/// Nearest part hit by a world ray
pub fn pick_parts(ray: &Ray, parts: &[ModelPart], model_to_world: Mat4) -> Option<PickHit> {
    if model_to_world.determinant().abs() < f32::EPSILON {
        return None;
    }
    let local = ray.transformed(model_to_world.inverse());

    let mut best: Option<(usize, f32)> = None;
    for (index, part) in parts.iter().enumerate() {
        let (min, max) = part.geometry.bounds();
        if !ray_aabb_intersect(&local, min, max) {
            continue;
        }
        for [v0, v1, v2] in part.geometry.triangles() {
            if let Some(t) = ray_triangle_intersect(&local, v0, v1, v2) {
                if best.map_or(true, |(_, best_t)| t < best_t) {
                    best = Some((index, t));
                }
            }
        }
    }

    best.map(|(index, t)| PickHit {
        part: parts[index].name().to_string(),
        t,
        world_point: ray.at(t),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::obj::parse_obj;
    use crate::model::LoadedModel;

    /// Two unit quads facing +Z: "front" at z=0.5, "back" at z=-0.5
    fn model() -> LoadedModel {
        let obj = "\
v -1 -1 0.5
v 1 -1 0.5
v 1 1 0.5
v -1 1 0.5
v -1 -1 -0.5
v 1 -1 -0.5
v 1 1 -0.5
v -1 1 -0.5
o back
f 5 6 7 8
o front
f 1 2 3 4
";
        LoadedModel::new("quads.obj", parse_obj(obj).unwrap())
    }

    #[test]
    fn test_triangle_hit_and_miss() {
        let ray = Ray::new(Vec3::new(0.2, 0.2, 5.0), Vec3::new(0.0, 0.0, -1.0));
        let (a, b, c) = (Vec3::new(0.0, 0.0, 0.0), Vec3::new(1.0, 0.0, 0.0), Vec3::new(0.0, 1.0, 0.0));
        let t = ray_triangle_intersect(&ray, a, b, c).unwrap();
        assert!((t - 5.0).abs() < 1e-5);

        let away = Ray::new(Vec3::new(0.2, 0.2, 5.0), Vec3::new(0.0, 0.0, 1.0));
        assert_eq!(ray_triangle_intersect(&away, a, b, c), None);
        let outside = Ray::new(Vec3::new(2.0, 2.0, 5.0), Vec3::new(0.0, 0.0, -1.0));
        assert_eq!(ray_triangle_intersect(&outside, a, b, c), None);
    }

    #[test]
    fn test_aabb() {
        let ray = Ray::new(Vec3::new(0.0, 0.0, 5.0), Vec3::new(0.0, 0.0, -1.0));
        assert!(ray_aabb_intersect(&ray, Vec3::splat(-1.0), Vec3::splat(1.0)));
        let beside = Ray::new(Vec3::new(3.0, 0.0, 5.0), Vec3::new(0.0, 0.0, -1.0));
        assert!(!ray_aabb_intersect(&beside, Vec3::splat(-1.0), Vec3::splat(1.0)));
        let behind = Ray::new(Vec3::new(0.0, 0.0, 5.0), Vec3::new(0.0, 0.0, 1.0));
        assert!(!ray_aabb_intersect(&behind, Vec3::splat(-1.0), Vec3::splat(1.0)));
    }

    #[test]
    fn test_pick_nearest_part() {
        let model = model();
        let ray = Ray::new(Vec3::new(0.0, 0.0, 5.0), Vec3::new(0.0, 0.0, -1.0));
        let hit = pick_parts(&ray, model.parts(), Mat4::IDENTITY).unwrap();
        assert_eq!(hit.part, "front");
        assert!((hit.world_point.z - 0.5).abs() < 1e-5);

        let reverse = Ray::new(Vec3::new(0.0, 0.0, -5.0), Vec3::new(0.0, 0.0, 1.0));
        assert_eq!(pick_parts(&reverse, model.parts(), Mat4::IDENTITY).unwrap().part, "back");
    }

    #[test]
    fn test_pick_respects_model_transform() {
        let model = model();
        let lifted = Mat4::from_translation(Vec3::new(0.0, 3.0, 0.0));
        let ray = Ray::new(Vec3::new(0.0, 0.0, 5.0), Vec3::new(0.0, 0.0, -1.0));
        assert_eq!(pick_parts(&ray, model.parts(), lifted), None);

        let ray = Ray::new(Vec3::new(0.0, 3.0, 5.0), Vec3::new(0.0, 0.0, -1.0));
        let hit = pick_parts(&ray, model.parts(), lifted).unwrap();
        assert!((hit.world_point - Vec3::new(0.0, 3.0, 0.5)).length() < 1e-4);

        // Scaled frame: t is still a world distance
        let scaled = Mat4::from_scale(Vec3::splat(2.0));
        let hit = pick_parts(&ray.transformed(Mat4::IDENTITY), model.parts(), scaled);
        assert_eq!(hit, None);
        let centre = Ray::new(Vec3::new(0.0, 0.0, 5.0), Vec3::new(0.0, 0.0, -1.0));
        let hit = pick_parts(&centre, model.parts(), scaled).unwrap();
        assert!((hit.t - 4.0).abs() < 1e-4);
    }

    #[test]
    fn test_screen_center_ray_hits_origin_direction() {
        let proj = Mat4::perspective_rh_gl(0.5, 1.0, 0.01, 100.0);
        let view = Mat4::look_at_rh(Vec3::new(0.0, 0.0, 4.0), Vec3::ZERO, Vec3::Y);
        let ray = screen_to_ray(Vec2::new(50.0, 50.0), Vec2::new(100.0, 100.0), proj * view).unwrap();
        assert!((ray.direction - Vec3::new(0.0, 0.0, -1.0)).length() < 1e-3);
        assert!(ray.origin.x.abs() < 1e-4 && ray.origin.y.abs() < 1e-4);

        // Upper half of the screen looks up
        let up = screen_to_ray(Vec2::new(50.0, 10.0), Vec2::new(100.0, 100.0), proj * view).unwrap();
        assert!(up.direction.y > 0.0);
        assert_eq!(screen_to_ray(Vec2::ZERO, Vec2::ZERO, proj * view), None);
    }
}
