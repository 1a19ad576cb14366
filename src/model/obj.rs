//! OBJ parsing into named parts
//!
//! Supports positions (v), texture coords (vt), normals (vn), faces (f) and
//! part names from `o` / `g`. Faces before any name land in a part called
//! "default". Parts keep the order they first appear in, which is the order
//! the mesh list shows and the order the first-part fallback uses.

use macroquad::math::{Vec2, Vec3};
use std::collections::HashMap;
use thiserror::Error;

/// Name given to faces that appear before any `o` / `g` line
pub const DEFAULT_PART: &str = "default";

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ObjError {
    #[error("line {line}: {message}")]
    Parse { line: usize, message: String },
    #[error("OBJ contains no faces")]
    Empty,
    #[error("part '{0}' exceeds 65535 vertices")]
    TooManyVertices(String),
}

fn parse_error(line_num: usize, message: impl Into<String>) -> ObjError {
    ObjError::Parse {
        line: line_num + 1,
        message: message.into(),
    }
}

/// Geometry of one named part, ready for indexed drawing
#[derive(Debug, Clone, PartialEq)]
pub struct PartGeometry {
    pub name: String,
    pub positions: Vec<Vec3>,
    pub normals: Vec<Vec3>,
    pub uvs: Vec<Vec2>,
    pub indices: Vec<u16>,
}

impl PartGeometry {
    fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            positions: Vec::new(),
            normals: Vec::new(),
            uvs: Vec::new(),
            indices: Vec::new(),
        }
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Triangles as position triples
    pub fn triangles(&self) -> impl Iterator<Item = [Vec3; 3]> + '_ {
        self.indices.chunks_exact(3).map(move |tri| {
            [
                self.positions[tri[0] as usize],
                self.positions[tri[1] as usize],
                self.positions[tri[2] as usize],
            ]
        })
    }

    /// Axis-aligned bounds (zero box for an empty part)
    pub fn bounds(&self) -> (Vec3, Vec3) {
        let mut iter = self.positions.iter();
        let Some(first) = iter.next() else {
            return (Vec3::ZERO, Vec3::ZERO);
        };
        iter.fold((*first, *first), |(min, max), p| (min.min(*p), max.max(*p)))
    }
}

/// Parsed model: parts in file order
#[derive(Debug, Clone, PartialEq)]
pub struct ModelGeometry {
    pub parts: Vec<PartGeometry>,
}

impl ModelGeometry {
    /// Approximate GPU footprint in bytes (positions, normals, uvs, indices)
    pub fn byte_size(&self) -> usize {
        self.parts
            .iter()
            .map(|p| p.positions.len() * 32 + p.indices.len() * 2)
            .sum()
    }
}

#[cfg(test)]
impl ModelGeometry {
    pub fn part_names(&self) -> Vec<String> {
        self.parts.iter().map(|p| p.name.clone()).collect()
    }

    pub fn part(&self, name: &str) -> Option<&PartGeometry> {
        self.parts.iter().find(|p| p.name == name)
    }

    pub fn triangle_count(&self) -> usize {
        self.parts.iter().map(|p| p.triangle_count()).sum()
    }
}

/// Part under construction plus its vertex dedup cache
struct PartBuilder {
    geometry: PartGeometry,
    cache: HashMap<(usize, Option<usize>, Option<usize>), u16>,
    has_normals: bool,
}

impl PartBuilder {
    fn new(name: &str) -> Self {
        Self {
            geometry: PartGeometry::new(name),
            cache: HashMap::new(),
            has_normals: true,
        }
    }
}

/// Parse OBJ text
pub fn parse_obj(contents: &str) -> Result<ModelGeometry, ObjError> {
    let mut positions: Vec<Vec3> = Vec::new();
    let mut tex_coords: Vec<Vec2> = Vec::new();
    let mut normals: Vec<Vec3> = Vec::new();

    let mut parts: Vec<PartBuilder> = Vec::new();
    let mut current: Option<usize> = None;

    for (line_num, line) in contents.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let fields: Vec<&str> = line.split_whitespace().collect();
        match fields[0] {
            "v" => positions.push(parse_vec3(&fields, line_num, "vertex position")?),
            "vn" => normals.push(parse_vec3(&fields, line_num, "normal")?),
            "vt" => {
                if fields.len() < 3 {
                    return Err(parse_error(line_num, "texture coordinate needs 2 values"));
                }
                let u = parse_float(fields[1], line_num)?;
                let v = parse_float(fields[2], line_num)?;
                // OBJ has v pointing up; textures are stored top row first
                tex_coords.push(Vec2::new(u, 1.0 - v));
            }
            "o" | "g" => {
                let name = fields[1..].join(" ");
                let name = if name.is_empty() { DEFAULT_PART } else { name.as_str() };
                current = Some(match parts.iter().position(|p| p.geometry.name == name) {
                    Some(index) => index,
                    None => {
                        parts.push(PartBuilder::new(name));
                        parts.len() - 1
                    }
                });
            }
            "f" => {
                if fields.len() < 4 {
                    return Err(parse_error(line_num, "face needs at least 3 vertices"));
                }
                let index = match current {
                    Some(index) => index,
                    None => {
                        parts.push(PartBuilder::new(DEFAULT_PART));
                        let index = parts.len() - 1;
                        current = Some(index);
                        index
                    }
                };
                let part = &mut parts[index];

                let mut face = Vec::with_capacity(fields.len() - 1);
                for spec in &fields[1..] {
                    face.push(face_vertex(spec, line_num, &positions, &tex_coords, &normals, part)?);
                }
                // Fan triangulation keeps the file's CCW winding
                for i in 1..face.len() - 1 {
                    part.geometry
                        .indices
                        .extend_from_slice(&[face[0], face[i], face[i + 1]]);
                }
            }
            _ => {
                // s, usemtl, mtllib and friends carry nothing we render
            }
        }
    }

    let parts: Vec<PartGeometry> = parts
        .into_iter()
        .filter(|p| !p.geometry.indices.is_empty())
        .map(|mut p| {
            if !p.has_normals {
                compute_normals(&mut p.geometry);
            }
            p.geometry
        })
        .collect();

    if parts.is_empty() {
        return Err(ObjError::Empty);
    }
    Ok(ModelGeometry { parts })
}

fn parse_vec3(fields: &[&str], line_num: usize, what: &str) -> Result<Vec3, ObjError> {
    if fields.len() < 4 {
        return Err(parse_error(line_num, format!("{} needs 3 values", what)));
    }
    Ok(Vec3::new(
        parse_float(fields[1], line_num)?,
        parse_float(fields[2], line_num)?,
        parse_float(fields[3], line_num)?,
    ))
}

fn parse_float(s: &str, line_num: usize) -> Result<f32, ObjError> {
    s.parse()
        .map_err(|_| parse_error(line_num, format!("invalid float '{}'", s)))
}

/// Resolve a 1-based (or negative, relative) OBJ index
fn parse_index(s: &str, count: usize, line_num: usize) -> Result<usize, ObjError> {
    let idx: i64 = s
        .parse()
        .map_err(|_| parse_error(line_num, format!("invalid index '{}'", s)))?;

    let resolved = match idx {
        0 => return Err(parse_error(line_num, "index cannot be 0")),
        i if i > 0 => i - 1,
        i => count as i64 + i,
    };
    if resolved < 0 || resolved as usize >= count {
        return Err(parse_error(
            line_num,
            format!("index {} out of range (have {})", idx, count),
        ));
    }
    Ok(resolved as usize)
}

/// Parse "p", "p/t", "p//n" or "p/t/n" and return the part-local vertex index
fn face_vertex(
    spec: &str,
    line_num: usize,
    positions: &[Vec3],
    tex_coords: &[Vec2],
    normals: &[Vec3],
    part: &mut PartBuilder,
) -> Result<u16, ObjError> {
    let mut refs = spec.split('/');
    let pos = match refs.next() {
        Some(s) if !s.is_empty() => parse_index(s, positions.len(), line_num)?,
        _ => return Err(parse_error(line_num, "face vertex without position")),
    };
    let tc = match refs.next() {
        Some(s) if !s.is_empty() => Some(parse_index(s, tex_coords.len(), line_num)?),
        _ => None,
    };
    let norm = match refs.next() {
        Some(s) if !s.is_empty() => Some(parse_index(s, normals.len(), line_num)?),
        _ => None,
    };

    let key = (pos, tc, norm);
    if let Some(&index) = part.cache.get(&key) {
        return Ok(index);
    }

    let geometry = &mut part.geometry;
    let index = u16::try_from(geometry.positions.len())
        .map_err(|_| ObjError::TooManyVertices(geometry.name.clone()))?;
    geometry.positions.push(positions[pos]);
    geometry.uvs.push(tc.map(|i| tex_coords[i]).unwrap_or(Vec2::ZERO));
    match norm {
        Some(i) => geometry.normals.push(normals[i]),
        None => {
            part.has_normals = false;
            geometry.normals.push(Vec3::ZERO);
        }
    }
    part.cache.insert(key, index);
    Ok(index)
}

/// Area-weighted vertex normals from faces
fn compute_normals(geometry: &mut PartGeometry) {
    let mut accumulated = vec![Vec3::ZERO; geometry.positions.len()];
    for tri in geometry.indices.chunks_exact(3) {
        let [a, b, c] = [tri[0] as usize, tri[1] as usize, tri[2] as usize];
        let face = (geometry.positions[b] - geometry.positions[a])
            .cross(geometry.positions[c] - geometry.positions[a]);
        for i in [a, b, c] {
            accumulated[i] += face;
        }
    }
    geometry.normals = accumulated
        .into_iter()
        .map(|n| n.try_normalize().unwrap_or(Vec3::Y))
        .collect();
}
