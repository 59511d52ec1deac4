//! Triangle primitive and the buffer adapter that produces it.
//!
//! Intersection uses the Moller-Trumbore algorithm against precomputed
//! edges, reporting distance plus barycentric weights.

use glint_core::{Color, Shape, Vertex};
use glint_math::{Aabb, Ray, Vec3};

use crate::error::GeometryError;

/// Determinants smaller than this reject the ray as parallel. Degenerate
/// triangles have a zero determinant for every ray, so they fail this test
/// unconditionally.
pub const PARALLEL_EPSILON: f32 = 1e-8;

/// Distance and barycentric weights of a confirmed intersection.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Intersection {
    pub t: f32,
    /// Weights of vertices `(a, b, c)`, summing to one.
    pub bary: Vec3,
}

/// Intersection-ready triangle with baked shading attributes.
///
/// Vertex positions keep their buffer order; `bary` weights from an
/// [`Intersection`] line up with `(a, b, c)` and with `(na, nb, nc)`.
#[derive(Debug, Copy, Clone)]
pub struct Triangle {
    pub a: Vec3,
    pub b: Vec3,
    pub c: Vec3,
    // Edges from `a`, precomputed for the intersection test.
    ba: Vec3,
    ca: Vec3,
    pub na: Vec3,
    pub nb: Vec3,
    pub nc: Vec3,
    pub ambient: Color,
    pub diffuse: Color,
    pub emissive: Color,
}

impl Triangle {
    /// Material colors are taken from the first vertex; the loader bakes the
    /// same material into every vertex of a shape.
    pub fn from_vertices(a: &Vertex, b: &Vertex, c: &Vertex) -> Self {
        Triangle {
            a: a.position,
            b: b.position,
            c: c.position,
            ba: b.position - a.position,
            ca: c.position - a.position,
            na: a.normal,
            nb: b.normal,
            nc: c.normal,
            ambient: a.ambient,
            diffuse: a.diffuse,
            emissive: a.emissive,
        }
    }

    /// Moller-Trumbore ray-triangle intersection.
    ///
    /// Returns a hit only for `t` strictly inside `(t_min, t_max)`.
    pub fn intersect(&self, ray: &Ray, t_min: f32, t_max: f32) -> Option<Intersection> {
        let h = ray.direction().cross(self.ca);
        let det = self.ba.dot(h);

        // Ray parallel to the triangle plane, or degenerate triangle.
        if det.abs() < PARALLEL_EPSILON {
            return None;
        }

        let inv_det = 1.0 / det;
        let s = ray.origin() - self.a;
        let u = inv_det * s.dot(h);
        if !(0.0..=1.0).contains(&u) {
            return None;
        }

        let q = s.cross(self.ba);
        let v = inv_det * ray.direction().dot(q);
        if v < 0.0 || u + v > 1.0 {
            return None;
        }

        let t = inv_det * self.ca.dot(q);
        if t <= t_min || t >= t_max {
            return None;
        }

        Some(Intersection {
            t,
            bary: Vec3::new(1.0 - u - v, u, v),
        })
    }

    /// True when the vertices are collinear enough that no ray can pass the
    /// determinant test.
    pub fn is_degenerate(&self) -> bool {
        self.ba.cross(self.ca).length_squared() < PARALLEL_EPSILON * PARALLEL_EPSILON
    }

    pub fn bounding_box(&self) -> Aabb {
        Aabb::from_corners(self.a.min(self.b).min(self.c), self.a.max(self.b).max(self.c))
    }

    pub fn centroid(&self) -> Vec3 {
        (self.a + self.b + self.c) / 3.0
    }
}

/// Flatten a shape's vertex and index buffers into triangles.
///
/// Structural defects fail fast: an index past the vertex buffer or a
/// trailing partial triangle aborts the build. Degenerate triangles are kept
/// (the intersector can never report them) and counted in a warning.
pub fn build_triangles(shape: &Shape, shape_id: usize) -> Result<Vec<Triangle>, GeometryError> {
    if shape.indices.len() % 3 != 0 {
        return Err(GeometryError::PartialTriangle {
            shape: shape_id,
            index_count: shape.indices.len(),
        });
    }

    let mut triangles = Vec::with_capacity(shape.indices.len() / 3);
    let mut degenerate = 0usize;
    for (tri_id, tri) in shape.indices.chunks_exact(3).enumerate() {
        for (corner, &index) in tri.iter().enumerate() {
            if index as usize >= shape.vertices.len() {
                return Err(GeometryError::IndexOutOfRange {
                    shape: shape_id,
                    position: tri_id * 3 + corner,
                    index,
                    vertex_count: shape.vertices.len(),
                });
            }
        }

        let triangle = Triangle::from_vertices(
            &shape.vertices[tri[0] as usize],
            &shape.vertices[tri[1] as usize],
            &shape.vertices[tri[2] as usize],
        );
        if triangle.is_degenerate() {
            degenerate += 1;
        }
        triangles.push(triangle);
    }

    if degenerate > 0 {
        log::warn!(
            "shape {shape_id} ({:?}): {degenerate} degenerate triangles can never be hit",
            shape.name
        );
    }
    Ok(triangles)
}
