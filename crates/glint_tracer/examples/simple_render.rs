//! Simple ray traced scene example.
//!
//! Builds a small scene in code, renders it with shadowed diffuse lighting
//! and saves the result as a PNG.

use std::sync::Arc;
use std::time::Instant;

use glint_core::{Camera, Color, FrameBuffer, PointLight, Rgb8, Shape, Vertex};
use glint_tracer::{
    diffuse_closest_hit, gradient_miss, shadow_tracer, AccelerationStructure, Raytracer, Vec3,
};

const WIDTH: u32 = 800;
const HEIGHT: u32 = 450;
const SAMPLES_PER_PIXEL: u32 = 16;
const MAX_DEPTH: u32 = 4;

fn main() {
    println!("Glint Ray Tracer - Simple Example");
    println!("=================================");

    // Build the scene
    let start = Instant::now();
    let shapes = build_scene();
    let accel =
        Arc::new(AccelerationStructure::build(&shapes).expect("scene indices are in range"));
    println!("Scene built in {:?}", start.elapsed());

    let camera = Camera::new(Vec3::new(0.0, 1.6, 4.5)).with_angles(0.0, -0.25);
    let lights = vec![
        PointLight::new(Vec3::new(2.0, 3.0, 2.0), Color::splat(0.8)),
        PointLight::new(Vec3::new(-2.5, 2.5, -1.0), Color::splat(0.35)),
    ];

    // The shadow tracer shares the scene and answers the visibility queries
    // the lighting shader issues.
    let shadow = Arc::new(shadow_tracer::<Rgb8>(accel.clone()));

    let mut tracer = Raytracer::<Rgb8>::new();
    tracer.set_viewport(WIDTH, HEIGHT).expect("viewport is non-zero");
    tracer.set_render_target(FrameBuffer::new(WIDTH, HEIGHT));
    tracer.set_acceleration_structure(accel);
    tracer.set_miss_shader(gradient_miss);
    tracer.set_closest_hit_shader(diffuse_closest_hit(lights, shadow));

    println!(
        "Rendering {}x{} @ {} spp...",
        WIDTH, HEIGHT, SAMPLES_PER_PIXEL
    );

    let start = Instant::now();
    tracer
        .ray_generation(
            camera.position(),
            camera.direction(),
            camera.right(),
            camera.up(),
            MAX_DEPTH,
            SAMPLES_PER_PIXEL,
        )
        .expect("render target matches the viewport");
    println!("Rendered in {:?}", start.elapsed());

    let image = tracer.take_render_target();
    let filename = "simple_render.png";
    image.save_png(filename).expect("Failed to save image");
    println!("Saved to {}", filename);
}

fn build_scene() -> Vec<Shape> {
    let shapes = vec![
        floor(4.0, Color::splat(0.7)),
        pyramid(
            "red_pyramid",
            Vec3::new(-0.9, 0.0, 0.0),
            0.8,
            1.4,
            Color::new(0.7, 0.3, 0.2),
        ),
        pyramid(
            "blue_pyramid",
            Vec3::new(1.1, 0.0, -0.6),
            0.5,
            0.9,
            Color::new(0.2, 0.4, 0.7),
        ),
    ];

    let triangles: usize = shapes.iter().map(Shape::triangle_count).sum();
    println!("Created {} shapes, {} triangles", shapes.len(), triangles);
    shapes
}

/// Append one triangle with a flat face normal.
fn push_triangle(shape: &mut Shape, corners: [Vec3; 3], diffuse: Color) {
    let normal = (corners[1] - corners[0])
        .cross(corners[2] - corners[0])
        .normalize_or_zero();
    let base = shape.vertices.len() as u32;
    for position in corners {
        shape.vertices.push(Vertex {
            position,
            normal,
            diffuse,
            ..Default::default()
        });
    }
    shape.indices.extend([base, base + 1, base + 2]);
}

/// Square ground plane at y = 0 spanning `half_size` in each direction.
fn floor(half_size: f32, diffuse: Color) -> Shape {
    let mut shape = Shape {
        name: "floor".to_string(),
        vertices: Vec::new(),
        indices: Vec::new(),
    };
    let s = half_size;
    push_triangle(
        &mut shape,
        [Vec3::new(-s, 0.0, s), Vec3::new(s, 0.0, s), Vec3::new(s, 0.0, -s)],
        diffuse,
    );
    push_triangle(
        &mut shape,
        [Vec3::new(-s, 0.0, s), Vec3::new(s, 0.0, -s), Vec3::new(-s, 0.0, -s)],
        diffuse,
    );
    shape
}

/// Four-sided pyramid standing on the floor at `center`.
fn pyramid(name: &str, center: Vec3, half_width: f32, height: f32, diffuse: Color) -> Shape {
    let mut shape = Shape {
        name: name.to_string(),
        vertices: Vec::new(),
        indices: Vec::new(),
    };
    let apex = center + Vec3::new(0.0, height, 0.0);
    // Base corners ordered so every side face winds with an outward normal.
    let base = [
        center + Vec3::new(-half_width, 0.0, half_width),
        center + Vec3::new(half_width, 0.0, half_width),
        center + Vec3::new(half_width, 0.0, -half_width),
        center + Vec3::new(-half_width, 0.0, -half_width),
    ];
    for i in 0..4 {
        push_triangle(&mut shape, [base[i], base[(i + 1) % 4], apex], diffuse);
    }
    shape
}
