use glam::{Mat4, Vec3};

/// Pitch is kept shy of the poles so the view basis stays well formed.
const MAX_PITCH: f32 = 1.55334; // 89 degrees

/// Free-look camera: a position plus yaw/pitch angles.
///
/// The ray tracing path consumes the orthonormal basis from
/// [`direction`](Camera::direction), [`right`](Camera::right) and
/// [`up`](Camera::up); the raster path consumes
/// [`view_matrix`](Camera::view_matrix) and
/// [`projection_matrix`](Camera::projection_matrix). With both angles at
/// zero the camera looks down `-Z` with `+Y` up.
#[derive(Debug, Copy, Clone)]
pub struct Camera {
    position: Vec3,
    phi: f32,
    theta: f32,
    fov_y: f32,
    z_near: f32,
    z_far: f32,
}

impl Camera {
    pub fn new(position: Vec3) -> Self {
        Camera {
            position,
            phi: 0.0,
            theta: 0.0,
            fov_y: 60f32.to_radians(),
            z_near: 0.001,
            z_far: 100.0,
        }
    }

    /// Yaw and pitch in radians. Pitch is clamped to just under +/-90 degrees.
    pub fn with_angles(mut self, phi: f32, theta: f32) -> Self {
        self.phi = phi;
        self.theta = theta.clamp(-MAX_PITCH, MAX_PITCH);
        self
    }

    /// Vertical field of view in radians, used by the projection matrix.
    pub fn with_fov_y(mut self, fov_y: f32) -> Self {
        self.fov_y = fov_y;
        self
    }

    pub fn with_clip(mut self, z_near: f32, z_far: f32) -> Self {
        self.z_near = z_near;
        self.z_far = z_far;
        self
    }

    #[inline]
    pub fn position(&self) -> Vec3 {
        self.position
    }

    pub fn direction(&self) -> Vec3 {
        Vec3::new(
            self.phi.sin() * self.theta.cos(),
            self.theta.sin(),
            -self.phi.cos() * self.theta.cos(),
        )
    }

    pub fn right(&self) -> Vec3 {
        self.direction().cross(Vec3::Y).normalize()
    }

    pub fn up(&self) -> Vec3 {
        self.right().cross(self.direction())
    }

    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.position, self.position + self.direction(), self.up())
    }

    /// Right-handed perspective projection with depth in `[0, 1]`.
    pub fn projection_matrix(&self, aspect_ratio: f32) -> Mat4 {
        Mat4::perspective_rh(self.fov_y, aspect_ratio, self.z_near, self.z_far)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec4;

    #[test]
    fn test_default_basis_looks_down_negative_z() {
        let camera = Camera::new(Vec3::new(0.0, 0.0, 5.0));
        assert!(camera.direction().abs_diff_eq(Vec3::NEG_Z, 1e-6));
        assert!(camera.right().abs_diff_eq(Vec3::X, 1e-6));
        assert!(camera.up().abs_diff_eq(Vec3::Y, 1e-6));
    }

    #[test]
    fn test_yaw_quarter_turn() {
        let camera = Camera::new(Vec3::ZERO).with_angles(std::f32::consts::FRAC_PI_2, 0.0);
        assert!(camera.direction().abs_diff_eq(Vec3::X, 1e-6));
        assert!(camera.right().abs_diff_eq(Vec3::Z, 1e-6));
        assert!(camera.up().abs_diff_eq(Vec3::Y, 1e-6));
    }

    #[test]
    fn test_basis_is_orthonormal_when_pitched() {
        let camera = Camera::new(Vec3::ZERO).with_angles(0.7, 0.4);
        let (d, r, u) = (camera.direction(), camera.right(), camera.up());
        assert!((d.length() - 1.0).abs() < 1e-5);
        assert!((r.length() - 1.0).abs() < 1e-5);
        assert!((u.length() - 1.0).abs() < 1e-5);
        assert!(d.dot(r).abs() < 1e-5);
        assert!(d.dot(u).abs() < 1e-5);
        assert!(r.dot(u).abs() < 1e-5);
    }

    #[test]
    fn test_pitch_is_clamped() {
        let camera = Camera::new(Vec3::ZERO).with_angles(0.0, std::f32::consts::PI);
        assert!(camera.right().is_finite());
    }

    #[test]
    fn test_view_matrix_centers_look_target() {
        let camera = Camera::new(Vec3::new(0.0, 0.0, 5.0));
        let view = camera.view_matrix();
        // A point straight ahead of the camera lands on the view-space -Z axis.
        let p = view * Vec4::new(0.0, 0.0, -5.0, 1.0);
        assert!(p.x.abs() < 1e-5 && p.y.abs() < 1e-5);
        assert!(p.z < 0.0);
    }
}
