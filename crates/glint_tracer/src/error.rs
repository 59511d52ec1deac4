use thiserror::Error;

/// Structural defect found while adapting vertex and index buffers into
/// triangles. Any of these aborts the acceleration structure build.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum GeometryError {
    #[error(
        "shape {shape}: index {index} at position {position} is out of range \
         for {vertex_count} vertices"
    )]
    IndexOutOfRange {
        shape: usize,
        position: usize,
        index: u32,
        vertex_count: usize,
    },

    #[error("shape {shape}: {index_count} indices do not form whole triangles")]
    PartialTriangle { shape: usize, index_count: usize },
}

/// Invalid render setup, reported before any rays are traced.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigurationError {
    #[error("viewport dimensions must be non-zero, got {width}x{height}")]
    EmptyViewport { width: u32, height: u32 },

    #[error(
        "render target is {target_width}x{target_height} but the viewport \
         is {width}x{height}"
    )]
    TargetMismatch {
        width: u32,
        height: u32,
        target_width: u32,
        target_height: u32,
    },

    #[error("ray depth must be at least 1")]
    ZeroDepth,

    #[error("samples per pixel must be at least 1")]
    ZeroSamples,
}
