//! Orbit camera and its uniform.

use cgmath::{Deg, Matrix4, Point3, Vector3, perspective};

use crate::config::CameraConfig;

#[rustfmt::skip]
pub const OPENGL_TO_WGPU_MATRIX: Matrix4<f32> = Matrix4::new(
    1.0, 0.0, 0.0, 0.0,
    0.0, 1.0, 0.0, 0.0,
    0.0, 0.0, 0.5, 0.0,
    0.0, 0.0, 0.5, 1.0,
);

/// Circles the target at a fixed radius and height.
#[derive(Clone, Copy, Debug)]
pub struct OrbitCamera {
    config: CameraConfig,
    aspect: f32,
}

impl OrbitCamera {
    pub fn new(config: CameraConfig, width: u32, height: u32) -> Self {
        let mut camera = Self {
            config,
            aspect: 1.0,
        };
        camera.resize(width, height);
        camera
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        self.aspect = width.max(1) as f32 / height.max(1) as f32;
    }

    /// Eye position `seconds` after start.
    pub fn eye(&self, seconds: f32) -> Point3<f32> {
        let angle = seconds * self.config.angular_speed;
        Point3::new(
            angle.sin() * self.config.radius,
            self.config.height,
            angle.cos() * self.config.radius,
        )
    }

    pub fn view_proj(&self, seconds: f32) -> Matrix4<f32> {
        let view = Matrix4::look_at_rh(
            self.eye(seconds),
            Point3::from(self.config.target),
            Vector3::unit_y(),
        );
        let proj = perspective(
            Deg(self.config.fovy_degrees),
            self.aspect,
            self.config.znear,
            self.config.zfar,
        );
        OPENGL_TO_WGPU_MATRIX * proj * view
    }

    pub fn model_matrix(&self) -> Matrix4<f32> {
        Matrix4::from_scale(self.config.model_scale)
    }
}

#[repr(C)]
#[derive(Debug, Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
pub struct CameraUniform {
    view_proj: [[f32; 4]; 4],
    model: [[f32; 4]; 4],
    view_position: [f32; 4],
}

impl CameraUniform {
    pub fn new() -> Self {
        use cgmath::SquareMatrix;
        Self {
            view_proj: Matrix4::identity().into(),
            model: Matrix4::identity().into(),
            view_position: [0.0; 4],
        }
    }

    pub fn update(&mut self, camera: &OrbitCamera, seconds: f32) {
        let eye = camera.eye(seconds);
        self.view_position = [eye.x, eye.y, eye.z, 1.0];
        self.view_proj = camera.view_proj(seconds).into();
        self.model = camera.model_matrix().into();
    }
}

impl Default for CameraUniform {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn orbit_starts_on_positive_z() {
        let camera = OrbitCamera::new(CameraConfig::default(), 1280, 720);
        let eye = camera.eye(0.0);
        assert_eq!((eye.x, eye.y, eye.z), (0.0, 1.5, 5.0));
    }

    #[test]
    fn orbit_keeps_its_radius() {
        let camera = OrbitCamera::new(CameraConfig::default(), 1280, 720);
        let eye = camera.eye(7.3);
        let radius = (eye.x * eye.x + eye.z * eye.z).sqrt();
        assert!((radius - 5.0).abs() < 1e-4);
    }
}
