//! Global uniform bindings for camera and scene lighting
//!
//! Everything shared by all objects in a frame lives in one uniform buffer
//! bound to group 0: camera matrices, the moon and its shadow projection, the
//! ambient term, fog and the point lights.

use crate::{
    config::MAX_POINT_LIGHTS,
    gfx::{
        camera::{camera_utils::convert_matrix4_to_array, PerspectiveCamera},
        scene::{PointLightUniform, Scene},
    },
    wgpu_utils::{
        binding_types, BindGroupBuilder, BindGroupLayoutBuilder, BindGroupLayoutWithDesc,
        UniformBuffer,
    },
};

/// Global uniform buffer content
///
/// MUST match the `Globals` struct in the shaders exactly.
#[repr(C)]
#[derive(Copy, Clone, Debug, bytemuck::Pod, bytemuck::Zeroable)]
pub struct GlobalUniform {
    pub view_proj: [[f32; 4]; 4],
    pub light_view_proj: [[f32; 4]; 4],
    /// xyz = eye position
    pub camera_position: [f32; 4],
    /// rgb = linear colour, w = intensity
    pub ambient: [f32; 4],
    /// xyz = direction the moonlight travels, w = 1 when shadows are enabled
    pub moon_direction: [f32; 4],
    /// rgb = linear colour, w = intensity
    pub moon_color: [f32; 4],
    /// rgb = linear colour, w = exp² density
    pub fog: [f32; 4],
    pub point_lights: [PointLightUniform; MAX_POINT_LIGHTS],
    /// x = number of valid entries in `point_lights`
    pub point_light_count: [u32; 4],
}
// 2 * 64 + 5 * 16 + 8 * 32 + 16 = 480 bytes

impl GlobalUniform {
    pub fn new(scene: &Scene, camera: &PerspectiveCamera) -> Self {
        let camera_uniform = camera.uniform();

        let mut point_lights = [PointLightUniform::default(); MAX_POINT_LIGHTS];
        let mut count = 0;
        for (slot, light) in point_lights.iter_mut().zip(scene.point_lights()) {
            *slot = light.uniform();
            count += 1;
        }

        let with = |rgb: [f32; 3], w: f32| [rgb[0], rgb[1], rgb[2], w];
        let direction = scene.moon.direction();

        Self {
            view_proj: camera_uniform.view_proj,
            light_view_proj: convert_matrix4_to_array(scene.moon.view_projection()),
            camera_position: camera_uniform.view_position,
            ambient: with(scene.ambient.color.to_linear(), scene.ambient.intensity),
            moon_direction: with(direction.into(), scene.moon.cast_shadow as u32 as f32),
            moon_color: with(scene.moon.color.to_linear(), scene.moon.intensity),
            fog: with(scene.fog.color.to_linear(), scene.fog.density),
            point_lights,
            point_light_count: [count, 0, 0, 0],
        }
    }
}

/// Type alias for the global uniform buffer
pub type GlobalUBO = UniformBuffer<GlobalUniform>;

/// Bind group layout and bind group for the global uniforms (group 0)
pub struct GlobalBindings {
    bind_group_layout: BindGroupLayoutWithDesc,
    bind_group: wgpu::BindGroup,
}

impl GlobalBindings {
    pub fn new(device: &wgpu::Device, ubo: &GlobalUBO) -> Self {
        let bind_group_layout = BindGroupLayoutBuilder::new()
            .next_binding_rendering(binding_types::uniform())
            .create(device, "Globals Bind Group Layout");

        let bind_group = BindGroupBuilder::new(&bind_group_layout)
            .resource(ubo.binding_resource())
            .create(device, "Globals Bind Group");

        GlobalBindings {
            bind_group_layout,
            bind_group,
        }
    }

    pub fn bind_group_layout(&self) -> &wgpu::BindGroupLayout {
        &self.bind_group_layout.layout
    }

    pub fn bind_group(&self) -> &wgpu::BindGroup {
        &self.bind_group
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SceneConfig;
    use crate::context::SceneContext;
    use crate::viewport::Viewport;
    use approx::assert_abs_diff_eq;

    fn reference() -> SceneContext {
        SceneContext::from_config(&SceneConfig::default(), Viewport::new(800.0, 600.0, 1.0))
    }

    #[test]
    fn test_layout_size_matches_shader() {
        assert_eq!(std::mem::size_of::<GlobalUniform>(), 480);
        assert_eq!(std::mem::size_of::<PointLightUniform>(), 32);
    }

    #[test]
    fn test_reference_scene_lights() {
        let context = reference();
        let globals = GlobalUniform::new(&context.scene, &context.camera);

        assert_eq!(globals.point_light_count[0], 4);
        // Door light first, then the ghosts in order
        assert_eq!(globals.point_lights[0].position, [0.0, 2.2, 2.7, 7.0]);
        assert_eq!(globals.point_lights[1].position, [4.0, 0.0, 0.0, 10.0]);
        assert_eq!(globals.point_lights[4], PointLightUniform::default());

        assert_abs_diff_eq!(globals.ambient[3], 0.275);
        assert_abs_diff_eq!(globals.fog[3], 0.1);
        assert_eq!(globals.moon_direction[3], 1.0);
        assert_eq!(globals.camera_position, [4.0, 2.0, 5.0, 1.0]);
    }

    #[test]
    fn test_shadow_flag_follows_moon() {
        let mut context = reference();
        context.scene.moon.cast_shadow = false;
        let globals = GlobalUniform::new(&context.scene, &context.camera);
        assert_eq!(globals.moon_direction[3], 0.0);
    }
}
