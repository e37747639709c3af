//! Orbit camera, projection and the camera uniform.
//!
//! The camera orbits a target point on a sphere described by two angles and a
//! radius:
//!
//! - `alpha` is the longitudinal angle around the Y axis
//! - `beta` is the latitudinal angle measured from +Y
//! - `radius` is the distance to the target
//!
//! Right-dragging orbits, the mouse wheel zooms. The camera also turns pointer
//! coordinates into world rays for picking.

use cgmath::{InnerSpace, Matrix4, Point3, Rad, SquareMatrix, Vector3, Vector4, perspective};
use instant::Duration;
use winit::{
    dpi::PhysicalPosition,
    event::{MouseScrollDelta, WindowEvent},
};

use crate::{config::CameraConfig, pick::Ray};

#[rustfmt::skip]
pub const OPENGL_TO_WGPU_MATRIX: Matrix4<f32> = Matrix4::new(
    1.0, 0.0, 0.0, 0.0,
    0.0, 1.0, 0.0, 0.0,
    0.0, 0.0, 0.5, 0.0,
    0.0, 0.0, 0.5, 1.0,
);

const MIN_BETA: f32 = 0.01;
const MAX_BETA: f32 = std::f32::consts::PI - 0.01;

#[derive(Debug, Clone, PartialEq)]
pub struct OrbitCamera {
    pub alpha: f32,
    pub beta: f32,
    pub radius: f32,
    pub target: Point3<f32>,
}

impl OrbitCamera {
    pub fn new(alpha: f32, beta: f32, radius: f32, target: Point3<f32>) -> Self {
        Self {
            alpha,
            beta: beta.clamp(MIN_BETA, MAX_BETA),
            radius,
            target,
        }
    }

    /// Eye position on the orbit sphere.
    ///
    /// Z is mirrored so that the default `alpha = -PI/2` looks down -Z with +X
    /// pointing right.
    pub fn position(&self) -> Point3<f32> {
        let (sin_a, cos_a) = self.alpha.sin_cos();
        let (sin_b, cos_b) = self.beta.sin_cos();
        self.target
            + Vector3::new(
                self.radius * cos_a * sin_b,
                self.radius * cos_b,
                -self.radius * sin_a * sin_b,
            )
    }

    pub fn calc_matrix(&self) -> Matrix4<f32> {
        Matrix4::look_at_rh(self.position(), self.target, Vector3::unit_y())
    }

    /// Turn window coordinates into a world-space ray through the pixel.
    ///
    /// The ray starts on the near plane. If the view-projection can't be
    /// inverted the ray simply looks from the eye to the target.
    pub fn cast_ray_from_mouse(
        &self,
        mouse: PhysicalPosition<f64>,
        width: f32,
        height: f32,
        projection: &Projection,
    ) -> Ray {
        let ndc_x = 2.0 * mouse.x as f32 / width.max(1.0) - 1.0;
        let ndc_y = 1.0 - 2.0 * mouse.y as f32 / height.max(1.0);
        let view_proj = projection.calc_matrix() * self.calc_matrix();
        let Some(inverse) = view_proj.invert() else {
            return Ray::new(self.position(), self.target - self.position());
        };
        let unproject = |depth: f32| {
            let p = inverse * Vector4::new(ndc_x, ndc_y, depth, 1.0);
            Point3::new(p.x / p.w, p.y / p.w, p.z / p.w)
        };
        let near = unproject(0.0);
        let far = unproject(1.0);
        Ray::new(near, far - near)
    }
}

impl From<&CameraConfig> for OrbitCamera {
    fn from(config: &CameraConfig) -> Self {
        Self::new(config.alpha, config.beta, config.radius, config.target.into())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Projection {
    aspect: f32,
    fovy: Rad<f32>,
    znear: f32,
    zfar: f32,
}

impl Projection {
    pub fn new<F: Into<Rad<f32>>>(width: u32, height: u32, fovy: F, znear: f32, zfar: f32) -> Self {
        Self {
            aspect: width as f32 / height.max(1) as f32,
            fovy: fovy.into(),
            znear,
            zfar,
        }
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        self.aspect = width as f32 / height.max(1) as f32;
    }

    pub fn calc_matrix(&self) -> Matrix4<f32> {
        OPENGL_TO_WGPU_MATRIX * perspective(self.fovy, self.aspect, self.znear, self.zfar)
    }
}

/// Collects orbit and zoom input between frames and applies it in `update`.
#[derive(Debug)]
pub struct CameraController {
    rotate_horizontal: f32,
    rotate_vertical: f32,
    scroll: f32,
    sensitivity: f32,
    zoom_speed: f32,
    min_radius: f32,
    max_radius: f32,
}

impl CameraController {
    pub fn new(sensitivity: f32, zoom_speed: f32, min_radius: f32, max_radius: f32) -> Self {
        Self {
            rotate_horizontal: 0.0,
            rotate_vertical: 0.0,
            scroll: 0.0,
            sensitivity,
            zoom_speed,
            min_radius,
            max_radius,
        }
    }

    pub fn handle_mouse(&mut self, mouse_dx: f64, mouse_dy: f64) {
        self.rotate_horizontal += mouse_dx as f32;
        self.rotate_vertical += mouse_dy as f32;
    }

    pub fn handle_window_events(&mut self, event: &WindowEvent) {
        if let WindowEvent::MouseWheel { delta, .. } = event {
            self.scroll += match delta {
                MouseScrollDelta::LineDelta(_, scroll) => *scroll,
                MouseScrollDelta::PixelDelta(PhysicalPosition { y, .. }) => *y as f32 / 100.0,
            };
        }
    }

    pub fn update(&mut self, camera: &mut OrbitCamera, _dt: Duration) {
        camera.alpha -= self.rotate_horizontal * self.sensitivity;
        camera.beta = (camera.beta - self.rotate_vertical * self.sensitivity).clamp(MIN_BETA, MAX_BETA);
        camera.radius =
            (camera.radius - self.scroll * self.zoom_speed).clamp(self.min_radius, self.max_radius);

        self.rotate_horizontal = 0.0;
        self.rotate_vertical = 0.0;
        self.scroll = 0.0;
    }
}

impl From<&CameraConfig> for CameraController {
    fn from(config: &CameraConfig) -> Self {
        Self::new(
            config.orbit_sensitivity,
            config.zoom_sensitivity,
            config.min_radius,
            config.max_radius,
        )
    }
}

#[repr(C)]
#[derive(Debug, Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
pub struct CameraUniform {
    view_position: [f32; 4],
    view_proj: [[f32; 4]; 4],
}

impl CameraUniform {
    pub fn new() -> Self {
        Self {
            view_position: [0.0; 4],
            view_proj: Matrix4::identity().into(),
        }
    }

    pub fn update_view_proj(&mut self, camera: &OrbitCamera, projection: &Projection) {
        self.view_position = camera.position().to_homogeneous().into();
        self.view_proj = (projection.calc_matrix() * camera.calc_matrix()).into();
    }
}

impl Default for CameraUniform {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug)]
pub struct CameraResources {
    pub camera: OrbitCamera,
    pub controller: CameraController,
    pub uniform: CameraUniform,
    pub buffer: wgpu::Buffer,
    pub bind_group: wgpu::BindGroup,
    pub bind_group_layout: wgpu::BindGroupLayout,
}

#[cfg(test)]
mod tests {
    use cgmath::Deg;

    use super::*;

    fn default_camera() -> OrbitCamera {
        OrbitCamera::from(&CameraConfig::default())
    }

    #[test]
    fn default_camera_sits_in_front_of_and_above_target() {
        let camera = default_camera();
        let eye = camera.position();
        assert!(eye.x.abs() < 1e-5);
        assert!(eye.y > camera.target.y);
        assert!(eye.z > 0.0);
        assert!(((eye - camera.target).magnitude() - 3.0).abs() < 1e-5);
    }

    #[test]
    fn ray_through_screen_center_hits_target() {
        let camera = default_camera();
        let projection = Projection::new(800, 600, Deg(45.0), 0.1, 500.0);
        let ray = camera.cast_ray_from_mouse((400.0, 300.0).into(), 800.0, 600.0, &projection);
        let to_target = (camera.target - ray.origin).normalize();
        assert!((ray.direction - to_target).magnitude() < 1e-3);
    }

    #[test]
    fn pointer_on_the_right_casts_to_positive_x() {
        let camera = default_camera();
        let projection = Projection::new(800, 600, Deg(45.0), 0.1, 500.0);
        let ray = camera.cast_ray_from_mouse((700.0, 300.0).into(), 800.0, 600.0, &projection);
        assert!(ray.direction.x > 0.0);
    }

    #[test]
    fn controller_clamps_zoom_and_elevation() {
        let mut camera = default_camera();
        let mut controller = CameraController::from(&CameraConfig::default());
        controller.handle_mouse(0.0, -100_000.0);
        controller.scroll = 1_000.0;
        controller.update(&mut camera, Duration::from_millis(16));
        assert_eq!(camera.beta, MAX_BETA);
        assert_eq!(camera.radius, CameraConfig::default().min_radius);

        // Deltas are consumed by the update.
        let before = camera.clone();
        controller.update(&mut camera, Duration::from_millis(16));
        assert_eq!(camera, before);
    }
}
