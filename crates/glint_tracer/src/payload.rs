use glint_core::Color;
use glint_math::Vec3;

/// Result of tracing one ray.
///
/// `t` doubles as the hit flag: any negative value means the ray escaped and
/// only `color` is meaningful. On a hit, `t` is the distance along the ray in
/// world units and `bary` holds the barycentric weights of the hit point in
/// triangle vertex order `(a, b, c)`.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Payload {
    pub color: Color,
    pub t: f32,
    pub bary: Vec3,
}

impl Payload {
    /// True when the ray escaped the scene without hitting anything.
    #[inline]
    pub fn is_miss(&self) -> bool {
        self.t < 0.0
    }
}

impl Default for Payload {
    /// A miss with a black color: `t` starts at the `-1` sentinel.
    fn default() -> Self {
        Payload {
            color: Color::ZERO,
            t: -1.0,
            bary: Vec3::ZERO,
        }
    }
}
