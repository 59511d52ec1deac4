//! Ray dispatch core.
//!
//! A [`Raytracer`] owns a render target, an acceleration structure and up to
//! three shader stages. `trace_ray` resolves one ray against the scene and
//! dispatches the right stage; `ray_generation` fires camera rays for every
//! pixel in parallel and writes the averaged result.

use std::sync::Arc;

use glint_core::{Color, FrameBuffer, RenderPixel, Shape};
use glint_math::{Ray, Vec3};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;

use crate::accel::AccelerationStructure;
use crate::error::{ConfigurationError, GeometryError};
use crate::payload::Payload;
use crate::triangle::Triangle;

/// Lower bound on hit distances. Keeps secondary rays from re-hitting the
/// surface they start on.
pub const MIN_HIT_DISTANCE: f32 = 1e-3;

/// Shader run when a ray escapes the scene, and when the recursion budget
/// runs out.
pub type MissShader = Box<dyn Fn(&Ray) -> Payload + Send + Sync>;

/// Shader run on the nearest hit. Receives the tracer so it can spawn
/// secondary rays, and the depth of the ray being shaded.
pub type ClosestHitShader<P> =
    Box<dyn Fn(&Raytracer<P>, &Ray, Payload, &Triangle, u32) -> Payload + Send + Sync>;

/// Shader run on the first hit found when no closest-hit shader is bound.
/// Traversal stops at that hit, which makes this the occlusion path.
pub type AnyHitShader = Box<dyn Fn(&Ray, &Triangle, Payload) -> Payload + Send + Sync>;

pub struct Raytracer<P: RenderPixel> {
    width: u32,
    height: u32,
    render_target: FrameBuffer<P>,
    accel: Option<Arc<AccelerationStructure>>,
    miss_shader: Option<MissShader>,
    closest_hit_shader: Option<ClosestHitShader<P>>,
    any_hit_shader: Option<AnyHitShader>,
    max_depth: u32,
}

impl<P: RenderPixel> Raytracer<P> {
    pub fn new() -> Self {
        Raytracer {
            width: 0,
            height: 0,
            render_target: FrameBuffer::default(),
            accel: None,
            miss_shader: None,
            closest_hit_shader: None,
            any_hit_shader: None,
            max_depth: 1,
        }
    }

    /// Set the pixel dimensions rays are generated for. Rejects empty
    /// viewports before any allocation happens downstream.
    pub fn set_viewport(&mut self, width: u32, height: u32) -> Result<(), ConfigurationError> {
        if width == 0 || height == 0 {
            return Err(ConfigurationError::EmptyViewport { width, height });
        }
        self.width = width;
        self.height = height;
        Ok(())
    }

    pub fn set_render_target(&mut self, target: FrameBuffer<P>) {
        self.render_target = target;
    }

    /// Take the render target out, leaving an empty buffer behind.
    pub fn take_render_target(&mut self) -> FrameBuffer<P> {
        std::mem::take(&mut self.render_target)
    }

    pub fn render_target(&self) -> &FrameBuffer<P> {
        &self.render_target
    }

    pub fn clear_render_target(&mut self, value: P) {
        self.render_target.fill(value);
    }

    /// Build a fresh acceleration structure over `shapes`.
    pub fn build_acceleration_structure(
        &mut self,
        shapes: &[Shape],
    ) -> Result<(), GeometryError> {
        self.accel = Some(Arc::new(AccelerationStructure::build(shapes)?));
        Ok(())
    }

    /// Adopt an already built structure. This is how a shadow tracer shares
    /// the scene with the tracer that built it.
    pub fn set_acceleration_structure(&mut self, accel: Arc<AccelerationStructure>) {
        self.accel = Some(accel);
    }

    pub fn acceleration_structure(&self) -> Option<Arc<AccelerationStructure>> {
        self.accel.clone()
    }

    pub fn set_miss_shader<F>(&mut self, shader: F)
    where
        F: Fn(&Ray) -> Payload + Send + Sync + 'static,
    {
        self.miss_shader = Some(Box::new(shader));
    }

    pub fn set_closest_hit_shader<F>(&mut self, shader: F)
    where
        F: Fn(&Raytracer<P>, &Ray, Payload, &Triangle, u32) -> Payload + Send + Sync + 'static,
    {
        self.closest_hit_shader = Some(Box::new(shader));
    }

    pub fn set_any_hit_shader<F>(&mut self, shader: F)
    where
        F: Fn(&Ray, &Triangle, Payload) -> Payload + Send + Sync + 'static,
    {
        self.any_hit_shader = Some(Box::new(shader));
    }

    /// Recursion budget consulted by `trace_ray`. `ray_generation` overwrites
    /// this with its depth argument.
    pub fn set_max_depth(&mut self, max_depth: u32) {
        self.max_depth = max_depth;
    }

    pub fn max_depth(&self) -> u32 {
        self.max_depth
    }

    /// Resolve one ray against the scene.
    ///
    /// `depth` counts up from 1 for camera rays; a shader spawning a
    /// secondary ray passes `depth + 1`. Rays past the budget resolve through
    /// the miss shader, which bounds recursion.
    ///
    /// Dispatch on a hit prefers the closest-hit shader. When only an
    /// any-hit shader is bound the query stops at the first hit found
    /// instead of searching for the nearest, so occlusion tests stay cheap.
    pub fn trace_ray(&self, ray: &Ray, depth: u32, t_min: f32, t_max: f32) -> Payload {
        if depth > self.max_depth {
            return self.miss(ray);
        }

        let hit = match &self.accel {
            Some(accel) if self.closest_hit_shader.is_none() && self.any_hit_shader.is_some() => {
                accel.any_hit(ray, t_min, t_max)
            }
            Some(accel) => accel.nearest_hit(ray, t_min, t_max),
            None => None,
        };

        match hit {
            Some(found) => {
                let payload = Payload {
                    color: Color::ZERO,
                    t: found.t,
                    bary: found.bary,
                };
                if let Some(closest_hit) = &self.closest_hit_shader {
                    closest_hit(self, ray, payload, found.triangle, depth)
                } else if let Some(any_hit) = &self.any_hit_shader {
                    any_hit(ray, found.triangle, payload)
                } else {
                    payload
                }
            }
            None => self.miss(ray),
        }
    }

    fn miss(&self, ray: &Ray) -> Payload {
        match &self.miss_shader {
            Some(miss) => miss(ray),
            None => Payload::default(),
        }
    }

    /// Fire `samples_per_pixel` camera rays per pixel and write the averaged
    /// color into the render target.
    ///
    /// The camera is given as a position plus an orthonormal basis. A pixel's
    /// ray direction is `direction + u * right - v * up` with `u` and `v`
    /// spanning `[-1, 1]` across the viewport (`u` scaled by the aspect
    /// ratio, `v` flipped so image y grows downward). With more than one
    /// sample, rays are jittered inside the pixel; a single sample goes
    /// through the pixel center deterministically.
    pub fn ray_generation(
        &mut self,
        position: Vec3,
        direction: Vec3,
        right: Vec3,
        up: Vec3,
        depth: u32,
        samples_per_pixel: u32,
    ) -> Result<(), ConfigurationError> {
        if self.width == 0 || self.height == 0 {
            return Err(ConfigurationError::EmptyViewport {
                width: self.width,
                height: self.height,
            });
        }
        if depth == 0 {
            return Err(ConfigurationError::ZeroDepth);
        }
        if samples_per_pixel == 0 {
            return Err(ConfigurationError::ZeroSamples);
        }
        if self.render_target.width() != self.width || self.render_target.height() != self.height
        {
            return Err(ConfigurationError::TargetMismatch {
                width: self.width,
                height: self.height,
                target_width: self.render_target.width(),
                target_height: self.render_target.height(),
            });
        }

        self.max_depth = depth;

        let width = self.width;
        let aspect = self.width as f32 / self.height as f32;
        // Denominators for the [-1, 1] pixel mapping; a 1-wide or 1-tall
        // viewport still gets a finite coordinate.
        let span_x = (self.width - 1).max(1) as f32;
        let span_y = (self.height - 1).max(1) as f32;

        log::debug!(
            "ray generation: {}x{} px, {} spp, depth {}",
            self.width,
            self.height,
            samples_per_pixel,
            depth
        );

        let mut target = std::mem::take(&mut self.render_target);
        {
            let tracer = &*self;
            target
                .pixels_mut()
                .par_iter_mut()
                .enumerate()
                .for_each(|(i, pixel)| {
                    let x = (i % width as usize) as f32;
                    let y = (i / width as usize) as f32;
                    let mut rng = StdRng::seed_from_u64(i as u64);

                    let mut accumulated = Color::ZERO;
                    for _ in 0..samples_per_pixel {
                        let (jx, jy) = if samples_per_pixel > 1 {
                            (rng.gen::<f32>() - 0.5, rng.gen::<f32>() - 0.5)
                        } else {
                            (0.0, 0.0)
                        };
                        let u = aspect * (2.0 * (x + jx) / span_x - 1.0);
                        let v = 2.0 * (y + jy) / span_y - 1.0;
                        let ray = Ray::new(position, direction + u * right - v * up);
                        accumulated +=
                            tracer.trace_ray(&ray, 1, MIN_HIT_DISTANCE, f32::INFINITY).color;
                    }
                    *pixel = P::from_color(accumulated / samples_per_pixel as f32);
                });
        }
        self.render_target = target;
        Ok(())
    }
}

impl<P: RenderPixel> Default for Raytracer<P> {
    fn default() -> Self {
        Self::new()
    }
}
