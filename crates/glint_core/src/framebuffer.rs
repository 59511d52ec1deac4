use std::path::Path;

use crate::color::{RenderPixel, Rgb8};

/// Row-major 2D pixel store. `(x, y)` maps to `data[y * width + x]` with the
/// origin in the top-left corner.
///
/// Holds any plain value type; render passes use [`RenderPixel`] formats
/// while the raster path also keeps its depth values in one.
#[derive(Debug, Clone)]
pub struct FrameBuffer<T> {
    width: u32,
    height: u32,
    data: Vec<T>,
}

impl<T: Copy + Default> FrameBuffer<T> {
    pub fn new(width: u32, height: u32) -> Self {
        FrameBuffer {
            width,
            height,
            data: vec![T::default(); (width as usize) * (height as usize)],
        }
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn aspect_ratio(&self) -> f32 {
        self.width as f32 / self.height as f32
    }

    /// Set every pixel to `value`.
    pub fn fill(&mut self, value: T) {
        self.data.fill(value);
    }

    /// Panics if `(x, y)` is outside the buffer.
    #[inline]
    pub fn get(&self, x: u32, y: u32) -> T {
        assert!(x < self.width && y < self.height);
        self.data[(y * self.width + x) as usize]
    }

    /// Panics if `(x, y)` is outside the buffer.
    #[inline]
    pub fn set(&mut self, x: u32, y: u32, value: T) {
        assert!(x < self.width && y < self.height);
        self.data[(y * self.width + x) as usize] = value;
    }

    pub fn pixels(&self) -> &[T] {
        &self.data
    }

    pub fn pixels_mut(&mut self) -> &mut [T] {
        &mut self.data
    }
}

impl<T: RenderPixel> FrameBuffer<T> {
    /// Convert every pixel through linear color into another pixel format.
    pub fn convert<U: RenderPixel>(&self) -> FrameBuffer<U> {
        FrameBuffer {
            width: self.width,
            height: self.height,
            data: self
                .data
                .iter()
                .map(|px| U::from_color(px.to_color()))
                .collect(),
        }
    }
}

impl<T: Copy + Default> Default for FrameBuffer<T> {
    fn default() -> Self {
        FrameBuffer::new(0, 0)
    }
}

impl FrameBuffer<Rgb8> {
    /// Write the buffer as an 8-bit RGB PNG.
    pub fn save_png<P: AsRef<Path>>(&self, path: P) -> image::ImageResult<()> {
        image::save_buffer(
            path,
            bytemuck::cast_slice(&self.data),
            self.width,
            self.height,
            image::ColorType::Rgb8,
        )
    }
}
