use glam::{Vec2, Vec3, Vec4};
use glint_core::{Color, FrameBuffer, RenderPixel, Vertex};
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RasterError {
    #[error("viewport dimensions must be non-zero, got {width}x{height}")]
    EmptyViewport { width: u32, height: u32 },

    #[error("render target is {target_width}x{target_height}, depth buffer is {depth_width}x{depth_height}")]
    BufferMismatch {
        target_width: u32,
        target_height: u32,
        depth_width: u32,
        depth_height: u32,
    },

    #[error("index {index} at position {position} is out of range for {vertex_count} vertices")]
    IndexOutOfRange {
        position: usize,
        index: u32,
        vertex_count: usize,
    },

    #[error("{index_count} indices do not form whole triangles")]
    PartialTriangle { index_count: usize },

    #[error("no vertex shader is bound")]
    MissingVertexShader,

    #[error("no pixel shader is bound")]
    MissingPixelShader,
}

/// Maps an object-space position (w = 1) and its vertex data to clip space.
pub type VertexShader = Box<dyn Fn(Vec4, Vertex) -> (Vec4, Vertex) + Send + Sync>;

/// Shades one covered pixel from barycentric-interpolated vertex data and
/// its depth.
pub type PixelShader = Box<dyn Fn(&Vertex, f32) -> Color + Send + Sync>;

/// Software rasterizer with a depth buffer.
///
/// Interpolation uses screen-space barycentric weights without perspective
/// correction. There is no clipping: a triangle with any vertex at or behind
/// the near plane is dropped whole.
pub struct Rasterizer<P: RenderPixel> {
    width: u32,
    height: u32,
    render_target: FrameBuffer<P>,
    depth_buffer: FrameBuffer<f32>,
    vertex_shader: Option<VertexShader>,
    pixel_shader: Option<PixelShader>,
}

impl<P: RenderPixel> Rasterizer<P> {
    pub fn new() -> Self {
        Rasterizer {
            width: 0,
            height: 0,
            render_target: FrameBuffer::default(),
            depth_buffer: FrameBuffer::default(),
            vertex_shader: None,
            pixel_shader: None,
        }
    }

    pub fn set_viewport(&mut self, width: u32, height: u32) -> Result<(), RasterError> {
        if width == 0 || height == 0 {
            return Err(RasterError::EmptyViewport { width, height });
        }
        self.width = width;
        self.height = height;
        Ok(())
    }

    /// Adopt a color target and a matching depth buffer. The depth buffer is
    /// reset to the far plane.
    pub fn set_render_target(
        &mut self,
        target: FrameBuffer<P>,
        mut depth: FrameBuffer<f32>,
    ) -> Result<(), RasterError> {
        if target.width() != depth.width() || target.height() != depth.height() {
            return Err(RasterError::BufferMismatch {
                target_width: target.width(),
                target_height: target.height(),
                depth_width: depth.width(),
                depth_height: depth.height(),
            });
        }
        depth.fill(1.0);
        self.render_target = target;
        self.depth_buffer = depth;
        Ok(())
    }

    pub fn take_render_target(&mut self) -> FrameBuffer<P> {
        std::mem::take(&mut self.render_target)
    }

    pub fn render_target(&self) -> &FrameBuffer<P> {
        &self.render_target
    }

    /// Reset color to `value` and depth to the far plane.
    pub fn clear_render_target(&mut self, value: P) {
        self.render_target.fill(value);
        self.depth_buffer.fill(1.0);
    }

    pub fn set_vertex_shader<F>(&mut self, shader: F)
    where
        F: Fn(Vec4, Vertex) -> (Vec4, Vertex) + Send + Sync + 'static,
    {
        self.vertex_shader = Some(Box::new(shader));
    }

    pub fn set_pixel_shader<F>(&mut self, shader: F)
    where
        F: Fn(&Vertex, f32) -> Color + Send + Sync + 'static,
    {
        self.pixel_shader = Some(Box::new(shader));
    }

    /// Rasterize an indexed triangle list into the render target.
    pub fn draw(&mut self, vertices: &[Vertex], indices: &[u32]) -> Result<(), RasterError> {
        let vertex_shader = self
            .vertex_shader
            .as_ref()
            .ok_or(RasterError::MissingVertexShader)?;
        let pixel_shader = self
            .pixel_shader
            .as_ref()
            .ok_or(RasterError::MissingPixelShader)?;
        if self.width == 0 || self.height == 0 {
            return Err(RasterError::EmptyViewport {
                width: self.width,
                height: self.height,
            });
        }
        if self.render_target.width() != self.width || self.render_target.height() != self.height
        {
            return Err(RasterError::BufferMismatch {
                target_width: self.render_target.width(),
                target_height: self.render_target.height(),
                depth_width: self.depth_buffer.width(),
                depth_height: self.depth_buffer.height(),
            });
        }
        if indices.len() % 3 != 0 {
            return Err(RasterError::PartialTriangle {
                index_count: indices.len(),
            });
        }
        for (position, &index) in indices.iter().enumerate() {
            if index as usize >= vertices.len() {
                return Err(RasterError::IndexOutOfRange {
                    position,
                    index,
                    vertex_count: vertices.len(),
                });
            }
        }

        let (width, height) = (self.width as f32, self.height as f32);
        let mut covered = 0usize;

        for tri in indices.chunks_exact(3) {
            let corners = [
                vertices[tri[0] as usize],
                vertices[tri[1] as usize],
                vertices[tri[2] as usize],
            ];

            let mut clip = [Vec4::ZERO; 3];
            let mut data = corners;
            for (slot, vertex) in corners.iter().enumerate() {
                let (position, out) =
                    vertex_shader(Vec4::from((vertex.position, 1.0)), *vertex);
                clip[slot] = position;
                data[slot] = out;
            }

            // No clipping: drop triangles touching the near plane.
            if clip.iter().any(|c| c.w <= 0.0) {
                continue;
            }

            let ndc = [clip[0] / clip[0].w, clip[1] / clip[1].w, clip[2] / clip[2].w];
            let screen = [
                to_screen(ndc[0], width, height),
                to_screen(ndc[1], width, height),
                to_screen(ndc[2], width, height),
            ];

            let area = edge(screen[0], screen[1], screen[2]);
            if area.abs() < f32::EPSILON {
                continue;
            }

            let min_x = screen.iter().map(|p| p.x).fold(f32::INFINITY, f32::min);
            let max_x = screen.iter().map(|p| p.x).fold(f32::NEG_INFINITY, f32::max);
            let min_y = screen.iter().map(|p| p.y).fold(f32::INFINITY, f32::min);
            let max_y = screen.iter().map(|p| p.y).fold(f32::NEG_INFINITY, f32::max);

            let x_lo = (min_x.floor().max(0.0)) as u32;
            let x_hi = (max_x.ceil().min(width - 1.0)).max(0.0) as u32;
            let y_lo = (min_y.floor().max(0.0)) as u32;
            let y_hi = (max_y.ceil().min(height - 1.0)).max(0.0) as u32;

            for y in y_lo..=y_hi {
                for x in x_lo..=x_hi {
                    let p = Vec2::new(x as f32 + 0.5, y as f32 + 0.5);
                    let weights = Vec3::new(
                        edge(screen[1], screen[2], p),
                        edge(screen[2], screen[0], p),
                        edge(screen[0], screen[1], p),
                    ) / area;
                    if weights.x < 0.0 || weights.y < 0.0 || weights.z < 0.0 {
                        continue;
                    }

                    let depth =
                        weights.x * ndc[0].z + weights.y * ndc[1].z + weights.z * ndc[2].z;
                    if depth >= self.depth_buffer.get(x, y) {
                        continue;
                    }

                    let vertex = interpolate(&data[0], &data[1], &data[2], weights);
                    let color = pixel_shader(&vertex, depth);
                    self.render_target.set(x, y, P::from_color(color));
                    self.depth_buffer.set(x, y, depth);
                    covered += 1;
                }
            }
        }

        log::trace!(
            "draw: {} triangles, {} pixels covered",
            indices.len() / 3,
            covered
        );
        Ok(())
    }
}

impl<P: RenderPixel> Default for Rasterizer<P> {
    fn default() -> Self {
        Self::new()
    }
}

/// NDC to pixel coordinates, with image y growing downward.
fn to_screen(ndc: Vec4, width: f32, height: f32) -> Vec2 {
    Vec2::new(
        (ndc.x + 1.0) * 0.5 * width,
        (1.0 - ndc.y) * 0.5 * height,
    )
}

/// Signed parallelogram area of `(b - a) x (p - a)`.
fn edge(a: Vec2, b: Vec2, p: Vec2) -> f32 {
    (b.x - a.x) * (p.y - a.y) - (b.y - a.y) * (p.x - a.x)
}

fn interpolate(a: &Vertex, b: &Vertex, c: &Vertex, w: Vec3) -> Vertex {
    Vertex {
        position: a.position * w.x + b.position * w.y + c.position * w.z,
        normal: a.normal * w.x + b.normal * w.y + c.normal * w.z,
        uv: a.uv * w.x + b.uv * w.y + c.uv * w.z,
        ambient: a.ambient * w.x + b.ambient * w.y + c.ambient * w.z,
        diffuse: a.diffuse * w.x + b.diffuse * w.y + c.diffuse * w.z,
        emissive: a.emissive * w.x + b.emissive * w.y + c.emissive * w.z,
    }
}
