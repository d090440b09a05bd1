use cgmath::*;

use super::camera_utils::{convert_matrix4_to_array, Camera, CameraUniform, OPENGL_TO_WGPU_MATRIX};
use crate::config::CameraConfig;

/// Perspective camera looking from `position` at `target`, Y up
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PerspectiveCamera {
    pub position: Point3<f32>,
    pub target: Point3<f32>,
    pub up: Vector3<f32>,
    /// Vertical field of view
    pub fovy: Deg<f32>,
    pub aspect: f32,
    pub znear: f32,
    pub zfar: f32,
}

impl Camera for PerspectiveCamera {
    fn build_view_projection_matrix(&self) -> Matrix4<f32> {
        self.projection_matrix() * self.view_matrix()
    }
}

impl PerspectiveCamera {
    pub fn new(fovy: Deg<f32>, aspect: f32, znear: f32, zfar: f32) -> Self {
        Self {
            position: Point3::new(0.0, 0.0, 1.0),
            target: Point3::origin(),
            up: Vector3::unit_y(),
            fovy,
            aspect,
            znear,
            zfar,
        }
    }

    pub fn from_config(config: &CameraConfig, aspect: f32) -> Self {
        let mut camera = Self::new(Deg(config.fov_degrees), aspect, config.near, config.far);
        camera.position = Point3::from(config.position);
        camera.target = Point3::from(config.target);
        camera
    }

    pub fn set_aspect(&mut self, aspect: f32) {
        if aspect.is_finite() && aspect > 0.0 {
            self.aspect = aspect;
        }
    }

    pub fn view_matrix(&self) -> Matrix4<f32> {
        Matrix4::look_at_rh(self.position, self.target, self.up)
    }

    pub fn projection_matrix(&self) -> Matrix4<f32> {
        OPENGL_TO_WGPU_MATRIX * perspective(self.fovy, self.aspect, self.znear, self.zfar)
    }

    /// Distance from the eye to the point it orbits
    pub fn distance_to_target(&self) -> f32 {
        self.position.distance(self.target)
    }

    pub fn uniform(&self) -> CameraUniform {
        CameraUniform {
            view_position: self.position.to_homogeneous().into(),
            view_proj: convert_matrix4_to_array(self.build_view_projection_matrix()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_from_config_uses_reference_values() {
        let camera = PerspectiveCamera::from_config(&CameraConfig::default(), 1.5);
        assert_eq!(camera.fovy, Deg(75.0));
        assert_eq!(camera.znear, 0.1);
        assert_eq!(camera.zfar, 100.0);
        assert_eq!(camera.position, Point3::new(4.0, 2.0, 5.0));
        assert_eq!(camera.aspect, 1.5);
    }

    #[test]
    fn test_target_projects_to_screen_centre() {
        let camera = PerspectiveCamera::from_config(&CameraConfig::default(), 16.0 / 9.0);
        let clip = camera.build_view_projection_matrix() * camera.target.to_homogeneous();
        assert_abs_diff_eq!(clip.x / clip.w, 0.0, epsilon = 1e-5);
        assert_abs_diff_eq!(clip.y / clip.w, 0.0, epsilon = 1e-5);
        let depth = clip.z / clip.w;
        assert!((0.0..=1.0).contains(&depth));
    }

    #[test]
    fn test_invalid_aspect_is_ignored() {
        let mut camera = PerspectiveCamera::new(Deg(60.0), 2.0, 0.1, 10.0);
        camera.set_aspect(0.0);
        camera.set_aspect(f32::NAN);
        assert_eq!(camera.aspect, 2.0);
    }

    #[test]
    fn test_uniform_carries_eye_position() {
        let camera = PerspectiveCamera::from_config(&CameraConfig::default(), 1.0);
        assert_eq!(camera.uniform().view_position, [4.0, 2.0, 5.0, 1.0]);
    }
}
