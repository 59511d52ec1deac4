//! Stock shaders for the common wiring: a sky gradient miss, the shadow
//! tracer pair, and a Lambert diffuse closest-hit with shadow rays.

use std::sync::Arc;

use glint_core::{Color, PointLight, RenderPixel};
use glint_math::Ray;

use crate::accel::AccelerationStructure;
use crate::payload::Payload;
use crate::raytracer::{Raytracer, MIN_HIT_DISTANCE};
use crate::triangle::Triangle;

/// Sky gradient miss: black toward the ground fading to blue overhead.
pub fn gradient_miss(ray: &Ray) -> Payload {
    Payload {
        color: Color::new(0.0, 0.0, (ray.direction().y + 1.0) * 0.5),
        ..Default::default()
    }
}

/// Miss shader returning one fixed color.
pub fn solid_miss(color: Color) -> impl Fn(&Ray) -> Payload {
    move |_| Payload {
        color,
        ..Default::default()
    }
}

/// Shadow-path miss: leaves the payload at the miss sentinel, which marks
/// the light as visible.
pub fn shadow_miss(_ray: &Ray) -> Payload {
    Payload::default()
}

/// Shadow-path any-hit: accepts the first hit unchanged. The returned
/// `t >= 0` marks the light as occluded.
pub fn occluder_any_hit(_ray: &Ray, _triangle: &Triangle, payload: Payload) -> Payload {
    payload
}

/// Assemble a shadow sub-tracer over a shared acceleration structure. It
/// answers only the binary visibility question, so it carries just
/// [`shadow_miss`] and [`occluder_any_hit`] and never owns a render target.
pub fn shadow_tracer<P: RenderPixel>(accel: Arc<AccelerationStructure>) -> Raytracer<P> {
    let mut tracer = Raytracer::new();
    tracer.set_acceleration_structure(accel);
    tracer.set_miss_shader(shadow_miss);
    tracer.set_any_hit_shader(occluder_any_hit);
    tracer
}

/// Closest-hit shader with Lambert diffuse lighting and shadow rays.
///
/// For each light a shadow ray runs on `shadow`, capped at the distance to
/// the light, and only unoccluded lights contribute `diffuse * light color *
/// max(N dot L, 0)`. The normal is interpolated from the vertex normals with
/// the hit's barycentric weights. Emissive is added unconditionally. The
/// shadow tracer is expected to share this scene's acceleration structure
/// and carry [`shadow_miss`] and [`occluder_any_hit`].
pub fn diffuse_closest_hit<P: RenderPixel + 'static>(
    lights: Vec<PointLight>,
    shadow: Arc<Raytracer<P>>,
) -> impl Fn(&Raytracer<P>, &Ray, Payload, &Triangle, u32) -> Payload {
    move |_, ray, payload, triangle, _| {
        let position = ray.at(payload.t);
        let normal = (payload.bary.x * triangle.na
            + payload.bary.y * triangle.nb
            + payload.bary.z * triangle.nc)
            .normalize_or_zero();

        let mut color = triangle.emissive;
        for light in &lights {
            let to_light = light.position - position;
            let shadow_ray = Ray::new(position, to_light);
            let occlusion =
                shadow.trace_ray(&shadow_ray, 1, MIN_HIT_DISTANCE, to_light.length());
            if occlusion.is_miss() {
                color +=
                    triangle.diffuse * light.color * normal.dot(shadow_ray.direction()).max(0.0);
            }
        }

        Payload { color, ..payload }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glint_core::{Shape, Vertex};
    use glint_math::Vec3;

    #[test]
    fn test_gradient_miss_tracks_ray_height() {
        let up = gradient_miss(&Ray::new(Vec3::ZERO, Vec3::Y));
        assert!(up.is_miss());
        assert!((up.color.z - 1.0).abs() < 1e-6);

        let down = gradient_miss(&Ray::new(Vec3::ZERO, Vec3::NEG_Y));
        assert!(down.color.z.abs() < 1e-6);

        let level = gradient_miss(&Ray::new(Vec3::ZERO, Vec3::X));
        assert!((level.color.z - 0.5).abs() < 1e-6);
        assert_eq!(level.color.x, 0.0);
        assert_eq!(level.color.y, 0.0);
    }

    #[test]
    fn test_solid_miss_returns_the_color() {
        let miss = solid_miss(Color::new(0.2, 0.4, 0.6));
        let payload = miss(&Ray::new(Vec3::ZERO, Vec3::X));
        assert!(payload.is_miss());
        assert_eq!(payload.color, Color::new(0.2, 0.4, 0.6));
    }

    // Floor triangle in the XZ plane with +Y normals and white diffuse.
    fn floor_triangle() -> Triangle {
        let vertex = |x: f32, z: f32| Vertex {
            position: Vec3::new(x, 0.0, z),
            normal: Vec3::Y,
            diffuse: Color::ONE,
            ..Default::default()
        };
        Triangle::from_vertices(&vertex(-5.0, -5.0), &vertex(5.0, -5.0), &vertex(0.0, 5.0))
    }

    // Small horizontal blocker above the origin.
    fn blocker_shape(y: f32) -> Shape {
        Shape {
            name: "blocker".to_string(),
            vertices: vec![
                Vertex::at(Vec3::new(-1.0, y, -1.0)),
                Vertex::at(Vec3::new(1.0, y, -1.0)),
                Vertex::at(Vec3::new(0.0, y, 1.0)),
            ],
            indices: vec![0, 1, 2],
        }
    }

    fn shadow_over(shapes: &[Shape]) -> Arc<Raytracer<Color>> {
        let accel = Arc::new(AccelerationStructure::build(shapes).unwrap());
        Arc::new(shadow_tracer(accel))
    }

    // Shade the origin of the floor triangle through the closest-hit shader,
    // as if a primary ray from (0, 1, 0) straight down had hit it.
    fn shade(lights: Vec<PointLight>, shadow: Arc<Raytracer<Color>>) -> Color {
        let shader = diffuse_closest_hit(lights, shadow);
        let tracer = Raytracer::<Color>::new();
        let ray = Ray::new(Vec3::Y, Vec3::NEG_Y);
        let payload = Payload {
            color: Color::ZERO,
            t: 1.0,
            bary: Vec3::new(1.0 / 3.0, 1.0 / 3.0, 1.0 / 3.0),
        };
        shader(&tracer, &ray, payload, &floor_triangle(), 1).color
    }

    #[test]
    fn test_visible_light_contributes_once() {
        let light = PointLight::new(Vec3::new(0.0, 3.0, 0.0), Color::ONE);
        let color = shade(vec![light], shadow_over(&[]));
        // Straight overhead: N dot L = 1, so exactly one full contribution.
        assert!(color.abs_diff_eq(Color::ONE, 1e-5));
    }

    #[test]
    fn test_occluded_light_contributes_nothing() {
        let light = PointLight::new(Vec3::new(0.0, 3.0, 0.0), Color::ONE);
        let color = shade(vec![light], shadow_over(&[blocker_shape(1.5)]));
        assert_eq!(color, Color::ZERO);
    }

    #[test]
    fn test_blocker_behind_the_light_does_not_occlude() {
        // The shadow ray is capped at the light distance, so geometry past
        // the light must not darken the surface.
        let light = PointLight::new(Vec3::new(0.0, 3.0, 0.0), Color::ONE);
        let color = shade(vec![light], shadow_over(&[blocker_shape(5.0)]));
        assert!(color.abs_diff_eq(Color::ONE, 1e-5));
    }

    #[test]
    fn test_light_below_the_surface_adds_nothing() {
        let light = PointLight::new(Vec3::new(0.0, -3.0, 0.0), Color::ONE);
        let color = shade(vec![light], shadow_over(&[]));
        assert_eq!(color, Color::ZERO);
    }

    #[test]
    fn test_lights_accumulate() {
        let lights = vec![
            PointLight::new(Vec3::new(0.0, 3.0, 0.0), Color::splat(0.25)),
            PointLight::new(Vec3::new(0.0, 4.0, 0.0), Color::splat(0.25)),
        ];
        let color = shade(lights, shadow_over(&[]));
        assert!(color.abs_diff_eq(Color::splat(0.5), 1e-5));
    }
}
