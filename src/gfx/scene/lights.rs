//! Light sources and fog.

use cgmath::*;

use crate::animation::OrbitPath;
use crate::config::Color;
use crate::gfx::camera::camera_utils::OPENGL_TO_WGPU_MATRIX;

/// Half width of the square the moon's shadow map covers
const SHADOW_HALF_EXTENT: f32 = 11.0;
/// Distance of the shadow camera from the origin along the moon direction
const SHADOW_EYE_DISTANCE: f32 = 20.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AmbientLight {
    pub color: Color,
    pub intensity: f32,
}

/// Directional light shining from `position` towards the origin
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DirectionalLight {
    pub color: Color,
    pub intensity: f32,
    pub position: Vector3<f32>,
    pub cast_shadow: bool,
}

impl DirectionalLight {
    /// Unit vector from the light towards the origin
    pub fn direction(&self) -> Vector3<f32> {
        if self.position.magnitude2() <= f32::EPSILON {
            return -Vector3::unit_y();
        }
        -self.position.normalize()
    }

    /// Orthographic view-projection used to render the shadow map
    pub fn view_projection(&self) -> Matrix4<f32> {
        let direction = self.direction();
        let eye = Point3::from_vec(-direction * SHADOW_EYE_DISTANCE);
        let up = if direction.y.abs() > 0.99 {
            Vector3::unit_z()
        } else {
            Vector3::unit_y()
        };
        let view = Matrix4::look_at_rh(eye, Point3::origin(), up);
        let proj = ortho(
            -SHADOW_HALF_EXTENT,
            SHADOW_HALF_EXTENT,
            -SHADOW_HALF_EXTENT,
            SHADOW_HALF_EXTENT,
            1.0,
            SHADOW_EYE_DISTANCE * 2.0,
        );
        OPENGL_TO_WGPU_MATRIX * proj * view
    }
}

/// Point light with a finite range
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointLight {
    pub color: Color,
    pub intensity: f32,
    pub position: Vector3<f32>,
    /// Distance at which the contribution reaches zero
    pub range: f32,
}

/// Point light entry of the global uniform; MUST match `PointLight` in the shader
#[repr(C)]
#[derive(Copy, Clone, Debug, Default, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct PointLightUniform {
    /// xyz = position, w = range
    pub position: [f32; 4],
    /// rgb = linear colour, w = intensity
    pub color: [f32; 4],
}

impl PointLight {
    pub fn uniform(&self) -> PointLightUniform {
        let [r, g, b] = self.color.to_linear();
        PointLightUniform {
            position: self.position.extend(self.range).into(),
            color: [r, g, b, self.intensity],
        }
    }
}

/// Exponential-squared fog
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Fog {
    pub color: Color,
    pub density: f32,
}

impl Fog {
    /// Share of the fog colour at `distance` from the eye, in `[0, 1]`
    pub fn factor(&self, distance: f32) -> f32 {
        let d = self.density * distance;
        1.0 - (-d * d).exp()
    }
}

/// A point light that follows an orbit
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ghost {
    pub light: PointLight,
    pub orbit: OrbitPath,
}

impl Ghost {
    /// Creates the ghost already placed at its `t = 0` position
    pub fn new(light: PointLight, orbit: OrbitPath) -> Self {
        let mut ghost = Self { light, orbit };
        ghost.follow(0.0);
        ghost
    }

    pub fn follow(&mut self, elapsed: f64) {
        self.light.position = self.orbit.position_at(elapsed);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn moon() -> DirectionalLight {
        DirectionalLight {
            color: Color::WHITE,
            intensity: 1.0,
            position: Vector3::new(3.0, 2.0, -8.0),
            cast_shadow: true,
        }
    }

    #[test]
    fn test_moon_points_at_origin() {
        let direction = moon().direction();
        assert_abs_diff_eq!(direction.magnitude(), 1.0, epsilon = 1e-6);
        assert!(direction.z > 0.0 && direction.y < 0.0);
    }

    #[test]
    fn test_shadow_projection_contains_the_scene() {
        let light_view_proj = moon().view_projection();
        for corner in [
            Point3::new(-7.0, 0.0, -7.0),
            Point3::new(7.0, 0.0, 7.0),
            Point3::new(0.0, 4.0, 0.0),
        ] {
            let clip = light_view_proj * corner.to_homogeneous();
            let ndc = clip.truncate() / clip.w;
            assert!(ndc.x.abs() <= 1.0 && ndc.y.abs() <= 1.0, "{corner:?} -> {ndc:?}");
            assert!((0.0..=1.0).contains(&ndc.z), "{corner:?} depth {}", ndc.z);
        }
    }

    #[test]
    fn test_overhead_moon_has_valid_view() {
        let mut light = moon();
        light.position = Vector3::new(0.0, 10.0, 0.0);
        let m = light.view_projection();
        assert!(m.x.x.is_finite() && m.w.w.is_finite());
    }

    #[test]
    fn test_fog_factor_range() {
        let fog = Fog {
            color: Color::WHITE,
            density: 0.1,
        };
        assert_eq!(fog.factor(0.0), 0.0);
        assert!(fog.factor(5.0) > 0.0 && fog.factor(5.0) < fog.factor(10.0));
        assert_abs_diff_eq!(fog.factor(1000.0), 1.0);
    }

    #[test]
    fn test_ghost_starts_on_its_orbit() {
        let light = PointLight {
            color: Color::WHITE,
            intensity: 6.0,
            position: Vector3::zero(),
            range: 10.0,
        };
        let ghost = Ghost::new(light, OrbitPath::new(5.0, -0.38));
        assert_eq!(ghost.light.position, Vector3::new(5.0, 0.0, 0.0));

        let uniform = ghost.light.uniform();
        assert_eq!(uniform.position, [5.0, 0.0, 0.0, 10.0]);
        assert_eq!(uniform.color[3], 6.0);
    }
}
