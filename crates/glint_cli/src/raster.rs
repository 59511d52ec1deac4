//! Rasterized backend: transforms each shape through the camera matrices and
//! shades pixels with the interpolated ambient color.

use std::time::Instant;

use anyhow::Result;
use glam::Vec4;
use glint_core::{FrameBuffer, Model, Rgb8, Vertex};
use glint_raster::Rasterizer;

use crate::settings::RenderSettings;

const CLEAR_COLOR: Rgb8 = Rgb8 {
    r: 100,
    g: 0,
    b: 100,
};

pub fn render(settings: &RenderSettings) -> Result<FrameBuffer<Rgb8>> {
    let model = Model::load_obj(&settings.model)?;
    render_model(&model, settings)
}

fn render_model(model: &Model, settings: &RenderSettings) -> Result<FrameBuffer<Rgb8>> {
    let mut rasterizer = Rasterizer::<Rgb8>::new();
    rasterizer.set_viewport(settings.width, settings.height)?;
    rasterizer.set_render_target(
        FrameBuffer::new(settings.width, settings.height),
        FrameBuffer::new(settings.width, settings.height),
    )?;
    rasterizer.clear_render_target(CLEAR_COLOR);

    let camera = settings.camera();
    let matrix = camera.projection_matrix(settings.aspect_ratio()) * camera.view_matrix();
    rasterizer.set_vertex_shader(move |position: Vec4, vertex: Vertex| (matrix * position, vertex));
    rasterizer.set_pixel_shader(|vertex: &Vertex, _depth: f32| vertex.ambient);

    let start = Instant::now();
    for shape in &model.shapes {
        rasterizer.draw(&shape.vertices, &shape.indices)?;
    }
    log::info!(
        "Rasterization took {:.1} ms",
        start.elapsed().as_secs_f64() * 1000.0
    );

    Ok(rasterizer.take_render_target())
}
