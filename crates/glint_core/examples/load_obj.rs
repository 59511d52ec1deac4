//! Example: Load and inspect an OBJ file.
//!
//! Run with: cargo run --example load_obj -- path/to/model.obj

use std::env;

use glam::Vec3;
use glint_core::{Model, Shape};

fn main() {
    env_logger::init();

    let args: Vec<String> = env::args().collect();

    if args.len() < 2 {
        println!("Usage: load_obj <path-to-obj-file>");
        return;
    }

    let path = &args[1];
    println!("Loading OBJ file: {}", path);

    match Model::load_obj(path) {
        Ok(model) => {
            println!("\n=== Model ===");
            println!("Shapes: {}", model.shapes.len());
            println!("Vertices: {}", model.vertex_count());
            println!("Triangles: {}", model.triangle_count());

            println!("\n--- Shapes ---");
            for shape in &model.shapes {
                println!(
                    "  {:?} - {} vertices, {} triangles",
                    shape.name,
                    shape.vertices.len(),
                    shape.triangle_count()
                );
                let (min, max) = bounds(shape);
                println!(
                    "       Bounds: ({:.2}, {:.2}, {:.2}) to ({:.2}, {:.2}, {:.2})",
                    min.x, min.y, min.z, max.x, max.y, max.z
                );
                if let Some(vertex) = shape.vertices.first() {
                    println!(
                        "       Diffuse: ({:.2}, {:.2}, {:.2})  Emissive: ({:.2}, {:.2}, {:.2})",
                        vertex.diffuse.x,
                        vertex.diffuse.y,
                        vertex.diffuse.z,
                        vertex.emissive.x,
                        vertex.emissive.y,
                        vertex.emissive.z
                    );
                }
            }
        }
        Err(e) => {
            eprintln!("Error loading OBJ file: {}", e);
        }
    }
}

fn bounds(shape: &Shape) -> (Vec3, Vec3) {
    let mut min = Vec3::splat(f32::INFINITY);
    let mut max = Vec3::splat(f32::NEG_INFINITY);
    for vertex in &shape.vertices {
        min = min.min(vertex.position);
        max = max.max(vertex.position);
    }
    (min, max)
}
