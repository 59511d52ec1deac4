//! Glint Tracer - CPU ray tracing with assignable shader stages.
//!
//! The pipeline mirrors a hardware ray tracing API in miniature: geometry is
//! baked into per-shape BVHs, and a [`Raytracer`] dispatches rays to
//! assignable miss, closest-hit and any-hit shaders. Shadow queries run on a
//! second tracer that shares the same acceleration structure.

mod accel;
mod error;
mod payload;
mod raytracer;
mod shaders;
mod triangle;

pub use accel::{AccelerationStructure, ShapeBvh, TriangleHit};
pub use error::{ConfigurationError, GeometryError};
pub use payload::Payload;
pub use raytracer::{
    AnyHitShader, ClosestHitShader, MissShader, Raytracer, MIN_HIT_DISTANCE,
};
pub use shaders::{
    diffuse_closest_hit, gradient_miss, occluder_any_hit, shadow_miss, shadow_tracer, solid_miss,
};
pub use triangle::{build_triangles, Intersection, Triangle, PARALLEL_EPSILON};

/// Re-export math types that appear in shader signatures
pub use glint_math::{Aabb, Ray, Vec3};
