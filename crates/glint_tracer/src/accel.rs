//! Two-level acceleration structure.
//!
//! Each shape gets its own BVH built by median split on the longest centroid
//! axis; a query walks every shape BVH and keeps the best answer. Triangles
//! are reordered in place during the build so leaves index contiguous runs.

use glint_core::Shape;
use glint_math::{Aabb, Ray, Vec3};

use crate::error::GeometryError;
use crate::triangle::{build_triangles, Intersection, Triangle};

/// Maximum triangles per leaf node before splitting.
const LEAF_MAX_SIZE: usize = 4;

/// Nearest or first intersection found by a scene query.
#[derive(Debug, Copy, Clone)]
pub struct TriangleHit<'a> {
    pub t: f32,
    pub bary: Vec3,
    pub triangle: &'a Triangle,
}

#[derive(Debug)]
enum BvhNode {
    Branch {
        left: Box<BvhNode>,
        right: Box<BvhNode>,
        bbox: Aabb,
    },
    /// Contiguous run of triangles in the owning [`ShapeBvh`].
    Leaf {
        start: usize,
        count: usize,
        bbox: Aabb,
    },
    Empty,
}

impl BvhNode {
    /// Median-split construction: sort the run by centroid on the longest
    /// axis of the centroid bounds, split in half, recurse.
    fn build(triangles: &mut [Triangle], offset: usize) -> Self {
        let bounds = triangles
            .iter()
            .fold(Aabb::EMPTY, |acc, tri| acc.merge(&tri.bounding_box()));

        if triangles.len() <= LEAF_MAX_SIZE {
            return BvhNode::Leaf {
                start: offset,
                count: triangles.len(),
                bbox: bounds,
            };
        }

        let mut centroid_bounds = Aabb::EMPTY;
        for tri in triangles.iter() {
            centroid_bounds.include(tri.centroid());
        }
        let axis = centroid_bounds.longest_axis();

        triangles.sort_unstable_by(|a, b| {
            a.centroid()[axis]
                .partial_cmp(&b.centroid()[axis])
                .unwrap_or(std::cmp::Ordering::Equal)
        });

        let mid = triangles.len() / 2;
        let (left_run, right_run) = triangles.split_at_mut(mid);

        BvhNode::Branch {
            left: Box::new(BvhNode::build(left_run, offset)),
            right: Box::new(BvhNode::build(right_run, offset + mid)),
            bbox: bounds,
        }
    }

    fn bounding_box(&self) -> Aabb {
        match self {
            BvhNode::Branch { bbox, .. } => *bbox,
            BvhNode::Leaf { bbox, .. } => *bbox,
            BvhNode::Empty => Aabb::EMPTY,
        }
    }
}

/// BVH over one shape's triangles.
#[derive(Debug)]
pub struct ShapeBvh {
    triangles: Vec<Triangle>,
    root: BvhNode,
}

impl ShapeBvh {
    pub fn build(mut triangles: Vec<Triangle>) -> Self {
        let root = if triangles.is_empty() {
            BvhNode::Empty
        } else {
            BvhNode::build(&mut triangles, 0)
        };
        ShapeBvh { triangles, root }
    }

    pub fn triangle_count(&self) -> usize {
        self.triangles.len()
    }

    pub fn bounding_box(&self) -> Aabb {
        self.root.bounding_box()
    }

    /// Nearest intersection with `t` strictly inside `(t_min, t_max)`.
    pub fn nearest_hit(&self, ray: &Ray, t_min: f32, t_max: f32) -> Option<TriangleHit<'_>> {
        let mut best: Option<(usize, Intersection)> = None;
        self.visit_nearest(&self.root, ray, t_min, t_max, &mut best);
        best.map(|(index, hit)| TriangleHit {
            t: hit.t,
            bary: hit.bary,
            triangle: &self.triangles[index],
        })
    }

    /// First intersection found, in traversal order rather than by distance.
    /// Returns as soon as any triangle passes the interval test.
    pub fn any_hit(&self, ray: &Ray, t_min: f32, t_max: f32) -> Option<TriangleHit<'_>> {
        self.visit_any(&self.root, ray, t_min, t_max)
            .map(|(index, hit)| TriangleHit {
                t: hit.t,
                bary: hit.bary,
                triangle: &self.triangles[index],
            })
    }

    fn visit_nearest(
        &self,
        node: &BvhNode,
        ray: &Ray,
        t_min: f32,
        t_max: f32,
        best: &mut Option<(usize, Intersection)>,
    ) {
        // Every box and triangle test is capped by the closest hit so far.
        let closest = best.as_ref().map_or(t_max, |(_, hit)| hit.t);
        match node {
            BvhNode::Empty => {}
            BvhNode::Leaf { start, count, bbox } => {
                if !bbox.hit(ray, t_min, closest) {
                    return;
                }
                for (i, tri) in self.triangles[*start..*start + *count].iter().enumerate() {
                    let limit = best.as_ref().map_or(t_max, |(_, hit)| hit.t);
                    if let Some(hit) = tri.intersect(ray, t_min, limit) {
                        *best = Some((start + i, hit));
                    }
                }
            }
            BvhNode::Branch { left, right, bbox } => {
                if !bbox.hit(ray, t_min, closest) {
                    return;
                }
                self.visit_nearest(left, ray, t_min, t_max, best);
                self.visit_nearest(right, ray, t_min, t_max, best);
            }
        }
    }

    fn visit_any(
        &self,
        node: &BvhNode,
        ray: &Ray,
        t_min: f32,
        t_max: f32,
    ) -> Option<(usize, Intersection)> {
        match node {
            BvhNode::Empty => None,
            BvhNode::Leaf { start, count, bbox } => {
                if !bbox.hit(ray, t_min, t_max) {
                    return None;
                }
                self.triangles[*start..*start + *count]
                    .iter()
                    .enumerate()
                    .find_map(|(i, tri)| {
                        tri.intersect(ray, t_min, t_max).map(|hit| (start + i, hit))
                    })
            }
            BvhNode::Branch { left, right, bbox } => {
                if !bbox.hit(ray, t_min, t_max) {
                    return None;
                }
                self.visit_any(left, ray, t_min, t_max)
                    .or_else(|| self.visit_any(right, ray, t_min, t_max))
            }
        }
    }
}

/// Top level of the structure: one BVH per shape.
#[derive(Debug)]
pub struct AccelerationStructure {
    shapes: Vec<ShapeBvh>,
}

impl AccelerationStructure {
    /// Adapt and index every shape. Fails fast on the first structural
    /// defect; an empty shape list builds an empty structure that misses
    /// every ray.
    pub fn build(shapes: &[Shape]) -> Result<Self, GeometryError> {
        let mut built = Vec::with_capacity(shapes.len());
        for (shape_id, shape) in shapes.iter().enumerate() {
            let triangles = build_triangles(shape, shape_id)?;
            built.push(ShapeBvh::build(triangles));
        }

        let accel = AccelerationStructure { shapes: built };
        log::debug!(
            "acceleration structure: {} shapes, {} triangles",
            accel.shapes.len(),
            accel.triangle_count()
        );
        Ok(accel)
    }

    pub fn shape_count(&self) -> usize {
        self.shapes.len()
    }

    pub fn triangle_count(&self) -> usize {
        self.shapes.iter().map(|bvh| bvh.triangle_count()).sum()
    }

    /// Nearest intersection across all shapes.
    pub fn nearest_hit(&self, ray: &Ray, t_min: f32, t_max: f32) -> Option<TriangleHit<'_>> {
        let mut best: Option<TriangleHit<'_>> = None;
        for bvh in &self.shapes {
            let limit = best.as_ref().map_or(t_max, |hit| hit.t);
            if let Some(hit) = bvh.nearest_hit(ray, t_min, limit) {
                best = Some(hit);
            }
        }
        best
    }

    /// First intersection in any shape, stopping at the first one found.
    pub fn any_hit(&self, ray: &Ray, t_min: f32, t_max: f32) -> Option<TriangleHit<'_>> {
        self.shapes
            .iter()
            .find_map(|bvh| bvh.any_hit(ray, t_min, t_max))
    }

    /// Whether anything blocks `ray` inside `(t_min, t_max)`.
    pub fn occluded(&self, ray: &Ray, t_min: f32, t_max: f32) -> bool {
        self.any_hit(ray, t_min, t_max).is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glint_core::Vertex;

    // Row of `count` unit-ish triangles along +X, each facing +Z.
    fn triangle_row(count: usize) -> Vec<Triangle> {
        (0..count)
            .map(|i| {
                let x = i as f32 * 2.0;
                Triangle::from_vertices(
                    &Vertex::at(Vec3::new(x - 0.5, -0.5, 0.0)),
                    &Vertex::at(Vec3::new(x + 0.5, -0.5, 0.0)),
                    &Vertex::at(Vec3::new(x, 0.5, 0.0)),
                )
            })
            .collect()
    }

    fn shape_from(vertices: Vec<Vertex>, indices: Vec<u32>) -> Shape {
        Shape {
            name: "test".to_string(),
            vertices,
            indices,
        }
    }

    #[test]
    fn test_build_reorders_without_losing_triangles() {
        let bvh = ShapeBvh::build(triangle_row(33));
        assert_eq!(bvh.triangle_count(), 33);

        // Every original triangle is still findable through its centroid.
        for i in 0..33 {
            let x = i as f32 * 2.0;
            let ray = Ray::new(Vec3::new(x, 0.0, 2.0), Vec3::NEG_Z);
            let hit = bvh.nearest_hit(&ray, 1e-3, f32::INFINITY).unwrap();
            assert!((hit.t - 2.0).abs() < 1e-4);
            assert_eq!(hit.triangle.centroid().x, x);
        }
    }

    #[test]
    fn test_empty_bvh_misses() {
        let bvh = ShapeBvh::build(Vec::new());
        let ray = Ray::new(Vec3::ZERO, Vec3::NEG_Z);
        assert!(bvh.nearest_hit(&ray, 1e-3, f32::INFINITY).is_none());
        assert!(bvh.any_hit(&ray, 1e-3, f32::INFINITY).is_none());
    }

    #[test]
    fn test_nearest_hit_prefers_smaller_t() {
        // Two triangles stacked along the ray, nearer one at z = -1.
        let near = Triangle::from_vertices(
            &Vertex::at(Vec3::new(-1.0, -1.0, -1.0)),
            &Vertex::at(Vec3::new(1.0, -1.0, -1.0)),
            &Vertex::at(Vec3::new(0.0, 1.0, -1.0)),
        );
        let far = Triangle::from_vertices(
            &Vertex::at(Vec3::new(-1.0, -1.0, -3.0)),
            &Vertex::at(Vec3::new(1.0, -1.0, -3.0)),
            &Vertex::at(Vec3::new(0.0, 1.0, -3.0)),
        );
        // Insertion order must not matter.
        for triangles in [vec![near, far], vec![far, near]] {
            let bvh = ShapeBvh::build(triangles);
            let ray = Ray::new(Vec3::ZERO, Vec3::NEG_Z);
            let hit = bvh.nearest_hit(&ray, 1e-3, f32::INFINITY).unwrap();
            assert!((hit.t - 1.0).abs() < 1e-5);
        }
    }

    #[test]
    fn test_nearest_hit_respects_t_max() {
        let bvh = ShapeBvh::build(triangle_row(1));
        let ray = Ray::new(Vec3::new(0.0, 0.0, 10.0), Vec3::NEG_Z);
        assert!(bvh.nearest_hit(&ray, 1e-3, 5.0).is_none());
        assert!(bvh.nearest_hit(&ray, 1e-3, 10.5).is_some());
    }

    #[test]
    fn test_any_hit_finds_an_occluder() {
        let bvh = ShapeBvh::build(triangle_row(9));
        let blocked = Ray::new(Vec3::new(4.0, 0.0, 3.0), Vec3::NEG_Z);
        assert!(bvh.any_hit(&blocked, 1e-3, f32::INFINITY).is_some());

        let between = Ray::new(Vec3::new(1.0, 0.0, 3.0), Vec3::NEG_Z);
        assert!(bvh.any_hit(&between, 1e-3, f32::INFINITY).is_none());
    }

    #[test]
    fn test_top_level_walks_all_shapes() {
        let near = shape_from(
            vec![
                Vertex::at(Vec3::new(-1.0, -1.0, -1.0)),
                Vertex::at(Vec3::new(1.0, -1.0, -1.0)),
                Vertex::at(Vec3::new(0.0, 1.0, -1.0)),
            ],
            vec![0, 1, 2],
        );
        let far = shape_from(
            vec![
                Vertex::at(Vec3::new(-1.0, -1.0, -4.0)),
                Vertex::at(Vec3::new(1.0, -1.0, -4.0)),
                Vertex::at(Vec3::new(0.0, 1.0, -4.0)),
            ],
            vec![0, 1, 2],
        );

        let accel = AccelerationStructure::build(&[far, near]).unwrap();
        assert_eq!(accel.shape_count(), 2);
        assert_eq!(accel.triangle_count(), 2);

        let ray = Ray::new(Vec3::ZERO, Vec3::NEG_Z);
        let hit = accel.nearest_hit(&ray, 1e-3, f32::INFINITY).unwrap();
        assert!((hit.t - 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_build_propagates_geometry_errors() {
        let bad = shape_from(vec![Vertex::at(Vec3::ZERO)], vec![0, 0, 9]);
        let err = AccelerationStructure::build(&[bad]).unwrap_err();
        assert!(matches!(err, GeometryError::IndexOutOfRange { index: 9, .. }));
    }

    #[test]
    fn test_empty_structure_misses() {
        let accel = AccelerationStructure::build(&[]).unwrap();
        let ray = Ray::new(Vec3::ZERO, Vec3::NEG_Z);
        assert!(accel.nearest_hit(&ray, 1e-3, f32::INFINITY).is_none());
        assert!(accel.any_hit(&ray, 1e-3, f32::INFINITY).is_none());
    }

    #[test]
    fn test_occluded_respects_the_interval() {
        let shape = shape_from(
            vec![
                Vertex::at(Vec3::new(-1.0, -1.0, -2.0)),
                Vertex::at(Vec3::new(1.0, -1.0, -2.0)),
                Vertex::at(Vec3::new(0.0, 1.0, -2.0)),
            ],
            vec![0, 1, 2],
        );
        let accel = AccelerationStructure::build(&[shape]).unwrap();
        let ray = Ray::new(Vec3::ZERO, Vec3::NEG_Z);
        assert!(accel.occluded(&ray, 1e-3, f32::INFINITY));
        // The blocker sits at t = 2, past this interval's end.
        assert!(!accel.occluded(&ray, 1e-3, 1.5));
    }
}
