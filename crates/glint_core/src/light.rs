use crate::color::Color;
use glam::Vec3;

/// Point light with no falloff. Shading treats `color` as the full
/// contribution when the light is visible from the shaded point.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct PointLight {
    pub position: Vec3,
    pub color: Color,
}

impl PointLight {
    pub fn new(position: Vec3, color: Color) -> Self {
        PointLight { position, color }
    }
}
