//! Glint Core - Scene data shared by the ray tracing and raster pipelines.
//!
//! This crate provides:
//!
//! - **Geometry**: `Vertex`, `Shape`, `Model` (OBJ loading via tobj)
//! - **Render targets**: `FrameBuffer<T>` with linear and 8-bit pixel types
//! - **Scene setup**: `Camera`, `PointLight`
//!
//! # Example
//!
//! ```ignore
//! use glint_core::{FrameBuffer, Model, Rgb8};
//!
//! let model = Model::load_obj("bunny.obj")?;
//! let mut target = FrameBuffer::<Rgb8>::new(640, 480);
//! target.save_png("out.png")?;
//! ```

pub mod camera;
pub mod color;
pub mod framebuffer;
pub mod light;
pub mod model;
pub mod vertex;

// Re-export commonly used types
pub use camera::Camera;
pub use color::{Color, RenderPixel, Rgb8};
pub use framebuffer::FrameBuffer;
pub use light::PointLight;
pub use model::{LoadError, Model, Shape};
pub use vertex::Vertex;
