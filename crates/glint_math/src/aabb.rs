use crate::{Ray, Vec3};

/// Minimum extent of a box along any axis. Flat geometry (an axis-aligned
/// triangle has a zero-thickness box) is padded up to this so the slab test
/// cannot reject it.
const MIN_EXTENT: f32 = 1e-4;

/// Axis-aligned bounding box stored as two corner points.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Aabb {
    pub min: Vec3,
    pub max: Vec3,
}

impl Aabb {
    /// The empty box: contains nothing, identity for [`Aabb::merge`].
    pub const EMPTY: Aabb = Aabb {
        min: Vec3::splat(f32::INFINITY),
        max: Vec3::splat(f32::NEG_INFINITY),
    };

    /// Box spanning two corner points (in any order), thin axes padded.
    pub fn from_corners(a: Vec3, b: Vec3) -> Self {
        let mut aabb = Self {
            min: a.min(b),
            max: a.max(b),
        };
        aabb.pad_thin_axes();
        aabb
    }

    /// Smallest box containing both `self` and `other`.
    pub fn merge(&self, other: &Aabb) -> Aabb {
        Aabb {
            min: self.min.min(other.min),
            max: self.max.max(other.max),
        }
    }

    /// Grow the box to contain a point. Does not pad.
    pub fn include(&mut self, point: Vec3) {
        self.min = self.min.min(point);
        self.max = self.max.max(point);
    }

    pub fn centroid(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    /// Index of the axis with the largest extent (0 = X, 1 = Y, 2 = Z).
    pub fn longest_axis(&self) -> usize {
        let extent = self.max - self.min;
        if extent.x > extent.y && extent.x > extent.z {
            0
        } else if extent.y > extent.z {
            1
        } else {
            2
        }
    }

    /// Slab test: does `ray` pass through the box anywhere in `(t_min, t_max)`?
    pub fn hit(&self, ray: &Ray, mut t_min: f32, mut t_max: f32) -> bool {
        let origin = ray.origin().to_array();
        let dir = ray.direction().to_array();
        let min = self.min.to_array();
        let max = self.max.to_array();

        for axis in 0..3 {
            let inv = 1.0 / dir[axis];
            let mut t0 = (min[axis] - origin[axis]) * inv;
            let mut t1 = (max[axis] - origin[axis]) * inv;
            if inv < 0.0 {
                std::mem::swap(&mut t0, &mut t1);
            }
            t_min = t_min.max(t0);
            t_max = t_max.min(t1);
            if t_max <= t_min {
                return false;
            }
        }
        true
    }

    fn pad_thin_axes(&mut self) {
        let extent = self.max - self.min;
        for axis in 0..3 {
            if extent[axis] < MIN_EXTENT {
                self.min[axis] -= MIN_EXTENT * 0.5;
                self.max[axis] += MIN_EXTENT * 0.5;
            }
        }
    }
}
