use crate::color::Color;
use glam::{Vec2, Vec3};

/// Mesh vertex with the per-vertex material colors the shading paths read.
///
/// Material colors are baked per vertex at load time, so shaders never look
/// up a material table while tracing.
#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub struct Vertex {
    pub position: Vec3,
    pub normal: Vec3,
    pub uv: Vec2,
    pub ambient: Color,
    pub diffuse: Color,
    pub emissive: Color,
}

impl Vertex {
    /// Vertex at `position` with a zero normal and black material colors.
    pub fn at(position: Vec3) -> Self {
        Vertex {
            position,
            ..Default::default()
        }
    }
}
