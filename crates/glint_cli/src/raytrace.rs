//! Ray traced backend: camera rays, diffuse shading with shadow rays and a
//! gradient sky.

use std::sync::Arc;
use std::time::Instant;

use anyhow::Result;
use glint_core::{FrameBuffer, Model, Rgb8};
use glint_tracer::{
    diffuse_closest_hit, gradient_miss, shadow_tracer, AccelerationStructure, Raytracer,
};

use crate::settings::RenderSettings;

pub fn render(settings: &RenderSettings) -> Result<FrameBuffer<Rgb8>> {
    let model = Model::load_obj(&settings.model)?;
    render_model(&model, settings)
}

fn render_model(model: &Model, settings: &RenderSettings) -> Result<FrameBuffer<Rgb8>> {
    let start = Instant::now();
    let accel = Arc::new(AccelerationStructure::build(&model.shapes)?);
    log::info!(
        "Built acceleration structure over {} shapes, {} triangles in {:.1} ms",
        accel.shape_count(),
        accel.triangle_count(),
        start.elapsed().as_secs_f64() * 1000.0
    );

    // Shadow rays reuse the scene geometry but only ask whether anything
    // blocks the light.
    let shadow = Arc::new(shadow_tracer::<Rgb8>(accel.clone()));

    let mut raytracer = Raytracer::<Rgb8>::new();
    raytracer.set_viewport(settings.width, settings.height)?;
    raytracer.set_render_target(FrameBuffer::new(settings.width, settings.height));
    raytracer.set_acceleration_structure(accel);
    raytracer.set_miss_shader(gradient_miss);
    raytracer.set_closest_hit_shader(diffuse_closest_hit(settings.light_rig(), shadow));

    let camera = settings.camera();
    let start = Instant::now();
    raytracer.ray_generation(
        camera.position(),
        camera.direction(),
        camera.right(),
        camera.up(),
        settings.depth,
        settings.samples,
    )?;
    log::info!(
        "Ray tracing took {:.1} ms",
        start.elapsed().as_secs_f64() * 1000.0
    );

    Ok(raytracer.take_render_target())
}
