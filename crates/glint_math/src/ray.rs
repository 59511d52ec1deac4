use crate::Vec3;

/// A ray in 3D space.
///
/// The direction is normalized on construction, so the `t` parameter of
/// every query along the ray is a distance in world units. Callers may pass
/// any non-zero vector as the direction; a zero vector stays zero and such a
/// ray can never hit anything.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Ray {
    origin: Vec3,
    direction: Vec3,
}

impl Ray {
    /// Create a ray from an origin and a (not necessarily unit) direction.
    #[inline]
    pub fn new(origin: Vec3, direction: Vec3) -> Self {
        Self {
            origin,
            direction: direction.normalize_or_zero(),
        }
    }

    #[inline]
    pub fn origin(&self) -> Vec3 {
        self.origin
    }

    /// Unit direction vector.
    #[inline]
    pub fn direction(&self) -> Vec3 {
        self.direction
    }

    /// Point along the ray at distance `t`: origin + t * direction.
    #[inline]
    pub fn at(&self, t: f32) -> Vec3 {
        self.origin + self.direction * t
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_direction_is_normalized() {
        let ray = Ray::new(Vec3::ZERO, Vec3::new(0.0, 0.0, -4.0));
        assert!((ray.direction().length() - 1.0).abs() < 1e-6);
        assert_eq!(ray.direction(), Vec3::new(0.0, 0.0, -1.0));
    }

    #[test]
    fn test_at_walks_in_world_units() {
        let ray = Ray::new(Vec3::new(1.0, 0.0, 0.0), Vec3::new(10.0, 0.0, 0.0));
        assert_eq!(ray.at(0.0), Vec3::new(1.0, 0.0, 0.0));
        assert_eq!(ray.at(2.5), Vec3::new(3.5, 0.0, 0.0));
    }

    #[test]
    fn test_zero_direction_stays_zero() {
        let ray = Ray::new(Vec3::ONE, Vec3::ZERO);
        assert_eq!(ray.direction(), Vec3::ZERO);
        assert_eq!(ray.at(5.0), Vec3::ONE);
    }
}
