//! Glint Raster - a software rasterizer over the shared scene types.
//!
//! The draw path mirrors a fixed-function pipeline with two programmable
//! stages: a vertex shader mapping positions into clip space and a pixel
//! shader turning interpolated vertex data into color. Depth testing uses a
//! `[0, 1]` buffer, smaller is closer.

mod rasterizer;

pub use rasterizer::{PixelShader, RasterError, Rasterizer, VertexShader};
